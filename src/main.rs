//! Manual smoke test for the core relayer: sends a test message between
//! configured chains and optionally waits for the guardians to sign it.

use std::path::PathBuf;

use clap::Parser;
use eyre::ensure;
use tracing::info;

use config::{ChainConfig, Config};
use sender::send_message;
use vaa::GuardianClient;

mod bindings;
mod config;
mod sender;
mod vaa;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the chain configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "chains.toml")]
    config: PathBuf,

    /// Source chain id for a single send.
    #[arg(long, requires = "to")]
    from: Option<u16>,

    /// Target chain id for a single send.
    #[arg(long, requires = "from")]
    to: Option<u16>,

    /// Send from every configured chain: chain 0 to the last chain,
    /// every other chain back to chain 0.
    #[arg(long, conflicts_with_all = ["from", "to", "matrix"])]
    per_chain: bool,

    /// Send between every ordered pair of configured chains.
    #[arg(long, conflicts_with_all = ["from", "to", "per_chain"])]
    matrix: bool,

    /// Poll the guardian API for the signed VAA of each published message.
    #[arg(long = "fetchSignedVaa")]
    fetch_signed_vaa: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Pair { from: u16, to: u16 },
    PerChain,
    Matrix,
    FirstPair,
}

impl Args {
    fn mode(&self) -> Mode {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Mode::Pair { from, to },
            _ if self.per_chain => Mode::PerChain,
            _ if self.matrix => Mode::Matrix,
            _ => Mode::FirstPair,
        }
    }
}

/// Resolves the selected mode against the chain list before any network
/// activity, so an unknown chain id fails the run up front.
fn plan(mode: Mode, config: &Config) -> eyre::Result<Vec<(&ChainConfig, &ChainConfig)>> {
    let chains = &config.chains;
    let pairs = match mode {
        Mode::Pair { from, to } => vec![(config.chain(from)?, config.chain(to)?)],
        Mode::PerChain => {
            let last = chains.len() - 1;
            (0..chains.len())
                .map(|i| (&chains[i], &chains[if i == 0 { last } else { 0 }]))
                .collect()
        }
        Mode::Matrix => {
            let mut pairs = Vec::with_capacity(chains.len() * chains.len());
            for source in chains {
                for target in chains {
                    pairs.push((source, target));
                }
            }
            pairs
        }
        Mode::FirstPair => {
            ensure!(
                chains.len() >= 2,
                "default mode needs at least two configured chains"
            );
            vec![(&chains[0], &chains[1])]
        }
    };
    Ok(pairs)
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;
    let signer = config.private_key.parse()?;
    let guardian = args
        .fetch_signed_vaa
        .then(|| GuardianClient::new(&config.guardian_rpc));

    let pairs = plan(args.mode(), &config)?;
    info!(sends = pairs.len(), "starting");

    for (source, target) in pairs {
        let result = send_message(&signer, source, target, guardian.as_ref()).await?;
        info!(
            tx = %result.tx_hash,
            messages = result.messages.len(),
            "send complete"
        );
    }

    println!("Done!");
    Ok(())
}
