use alloy::{
    network::EthereumWallet,
    primitives::{Address, Bytes, FixedBytes, TxHash, U256},
    providers::ProviderBuilder,
    rpc::types::Log,
    signers::local::PrivateKeySigner,
    sol_types::SolEvent,
};
use tracing::{info, warn};

use crate::bindings::{ICoreRelayer, IMockIntegration, IWormhole};
use crate::config::ChainConfig;
use crate::vaa::{emitter_address_hex, GuardianClient, VaaPollResult};

/// Gas budget quoted for delivery on the target chain.
const DELIVERY_GAS_LIMIT: u32 = 2_000_000;
/// Fixed safety margin on top of the fee quote; on-chain quotes can be
/// stale or underestimate execution cost.
const FEE_MARGIN: u64 = 10_000_000_000;
/// Gas limit of the sendMessage transaction itself.
const SEND_GAS_LIMIT: u64 = 1_000_000;
const TEST_PAYLOAD: &[u8] = b"Hello World";

const MESSAGE_PUBLISHED_TOPIC: Option<&FixedBytes<32>> =
    Some(&IWormhole::LogMessagePublished::SIGNATURE_HASH);

/// One `LogMessagePublished` event recovered from a send receipt.
#[derive(Debug)]
pub struct PublishedMessage {
    pub emitter: Address,
    pub sequence: u64,
}

#[derive(Debug)]
pub struct SendResult {
    pub tx_hash: TxHash,
    pub messages: Vec<PublishedMessage>,
}

pub fn funded_value(quote: U256) -> U256 {
    quote + U256::from(FEE_MARGIN)
}

/// Extracts the core bridge's published messages from receipt logs, in
/// log order. A decodable-looking log from the bridge address that fails
/// to decode is a fatal error, not a skip.
pub fn published_messages(logs: &[Log], wormhole: Address) -> eyre::Result<Vec<PublishedMessage>> {
    logs.iter()
        .filter(|log| log.inner.address == wormhole && log.topic0() == MESSAGE_PUBLISHED_TOPIC)
        .map(|log| {
            let IWormhole::LogMessagePublished {
                sender, sequence, ..
            } = log.log_decode()?.inner.data;
            Ok(PublishedMessage {
                emitter: sender,
                sequence,
            })
        })
        .collect()
}

/// Sends the test message from `source` to `target` through the core
/// relayer and waits for the confirmed receipt. With a guardian client,
/// additionally polls for the signed VAA of every published message.
pub async fn send_message(
    signer: &PrivateKeySigner,
    source: &ChainConfig,
    target: &ChainConfig,
    guardian: Option<&GuardianClient>,
) -> eyre::Result<SendResult> {
    info!(
        source = source.chain_id,
        target = target.chain_id,
        "sending message"
    );

    let wallet = EthereumWallet::from(signer.clone());
    let provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(wallet)
        .on_http(source.rpc_url.clone());

    let relayer = ICoreRelayer::new(source.core_relayer, &provider);

    // The source chain should be registered to itself.
    let registered = relayer
        .registeredCoreRelayerContract(source.chain_id)
        .call()
        .await?
        ._0;
    info!(
        onchain = %registered,
        configured = %source.core_relayer,
        "relayer self-registration"
    );

    // The default provider should be this chain's configured relay provider.
    let default_provider = relayer.getDefaultRelayProvider().call().await?._0;
    info!(
        onchain = %default_provider,
        configured = %source.relay_provider,
        "default relay provider"
    );

    let quote = relayer
        .quoteGasDeliveryFee(target.chain_id, DELIVERY_GAS_LIMIT, default_provider)
        .call()
        .await?
        ._0;
    let value = funded_value(quote);
    info!(%quote, %value, "delivery fee quote");

    let mock = IMockIntegration::new(source.mock_integration, &provider);
    let receipt = mock
        .sendMessage(
            Bytes::from_static(TEST_PAYLOAD),
            target.chain_id,
            target.mock_integration,
            target.mock_integration,
        )
        .value(value)
        .gas(SEND_GAS_LIMIT)
        .send()
        .await?
        .get_receipt()
        .await?;

    let messages = published_messages(receipt.inner.logs(), source.wormhole)?;
    println!("tx hash: {}", receipt.transaction_hash);
    println!(
        "sequences: {:?}",
        messages.iter().map(|m| m.sequence).collect::<Vec<_>>()
    );

    if let Some(guardian) = guardian {
        for message in &messages {
            let emitter = emitter_address_hex(message.emitter);
            match guardian
                .poll_signed_vaa(source.chain_id, &emitter, message.sequence)
                .await
            {
                VaaPollResult::Signed(vaa) => println!(
                    "signed vaa {}/{}: 0x{}",
                    source.chain_id,
                    message.sequence,
                    hex::encode(vaa)
                ),
                VaaPollResult::Exhausted { attempts } => warn!(
                    sequence = message.sequence,
                    attempts, "gave up waiting for signed vaa"
                ),
            }
        }
    }

    Ok(SendResult {
        tx_hash: receipt.transaction_hash,
        messages,
    })
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, LogData, B256};

    use super::*;

    const BRIDGE: Address = address!("c89ce4735882c9f0f0fe26686c53074e09b0d550");
    const EMITTER: Address = address!("3bb1f7d0dba23daff31e7d60ccd6e10e7266e6a4");

    fn published_log(bridge: Address, emitter: Address, sequence: u64) -> Log {
        let event = IWormhole::LogMessagePublished {
            sender: emitter,
            sequence,
            nonce: 0,
            payload: Bytes::from_static(TEST_PAYLOAD),
            consistencyLevel: 1,
        };
        Log {
            inner: alloy::primitives::Log {
                address: bridge,
                data: event.encode_log_data(),
            },
            ..Default::default()
        }
    }

    fn foreign_log(address: Address) -> Log {
        Log {
            inner: alloy::primitives::Log {
                address,
                data: LogData::new_unchecked(vec![B256::ZERO], Bytes::new()),
            },
            ..Default::default()
        }
    }

    #[test]
    fn sequences_extracted_in_log_order() {
        let logs = vec![
            published_log(BRIDGE, EMITTER, 7),
            foreign_log(BRIDGE),
            published_log(BRIDGE, EMITTER, 8),
        ];
        let messages = published_messages(&logs, BRIDGE).unwrap();
        let sequences: Vec<u64> = messages.iter().map(|m| m.sequence).collect();
        assert_eq!(sequences, vec![7, 8]);
        assert!(messages.iter().all(|m| m.emitter == EMITTER));
    }

    #[test]
    fn logs_from_other_contracts_ignored() {
        let logs = vec![published_log(EMITTER, EMITTER, 99)];
        assert!(published_messages(&logs, BRIDGE).unwrap().is_empty());
    }

    #[test]
    fn empty_receipt_yields_no_messages() {
        assert!(published_messages(&[], BRIDGE).unwrap().is_empty());
    }

    #[test]
    fn malformed_bridge_log_is_fatal() {
        let truncated = Log {
            inner: alloy::primitives::Log {
                address: BRIDGE,
                data: LogData::new_unchecked(
                    vec![IWormhole::LogMessagePublished::SIGNATURE_HASH, B256::ZERO],
                    Bytes::new(),
                ),
            },
            ..Default::default()
        };
        assert!(published_messages(&[truncated], BRIDGE).is_err());
    }

    #[test]
    fn funded_value_adds_fixed_margin() {
        assert_eq!(funded_value(U256::ZERO), U256::from(FEE_MARGIN));
        assert_eq!(
            funded_value(U256::from(1234)),
            U256::from(FEE_MARGIN) + U256::from(1234)
        );
    }
}
