use std::collections::HashSet;
use std::path::Path;

use alloy::primitives::Address;
use eyre::WrapErr;
use serde::Deserialize;
use url::Url;

/// One chain entry from the chain file. Addresses are the deployed
/// relay contracts on that chain; `wormhole` is the core bridge that
/// emits `LogMessagePublished`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u16,
    pub rpc_url: Url,
    pub core_relayer: Address,
    pub relay_provider: Address,
    pub mock_integration: Address,
    pub wormhole: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the guardian REST API serving signed VAAs.
    pub guardian_rpc: String,
    /// Hex private key of the test wallet funding every send.
    pub private_key: String,
    pub chains: Vec<ChainConfig>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read chain file {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .wrap_err_with(|| format!("failed to parse chain file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> eyre::Result<()> {
        eyre::ensure!(!self.chains.is_empty(), "chain file lists no chains");
        let mut seen = HashSet::new();
        for chain in &self.chains {
            eyre::ensure!(
                seen.insert(chain.chain_id),
                "duplicate chain id {} in chain file",
                chain.chain_id
            );
        }
        Ok(())
    }

    pub fn chain(&self, chain_id: u16) -> eyre::Result<&ChainConfig> {
        self.chains
            .iter()
            .find(|c| c.chain_id == chain_id)
            .ok_or_else(|| eyre::eyre!("chain id {chain_id} not configured"))
    }
}
