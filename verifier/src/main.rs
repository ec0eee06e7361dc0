use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Read as _;

use zktrie_core::trie::{Address, Word};
use zktrie_verifier::{Blake3Oracle, HashOracle, Options, Sha2Oracle, Verifier};

mod logging;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify an account proof against a state root.
    ///
    /// Prints the decoded account and its storage root, which is zero if the account does not
    /// exist or has no code.
    Account(AccountParams),
    /// Verify a storage proof against a storage root.
    ///
    /// Prints the stored value, which is zero if the slot is empty.
    Storage(StorageParams),
}

#[derive(Clone, Debug, Args)]
pub struct AccountParams {
    /// The 20-byte account address, hex encoded.
    #[arg(long, value_parser = parse_address)]
    pub address: Address,

    #[clap(flatten)]
    pub common: CommonParams,
}

#[derive(Clone, Debug, Args)]
pub struct StorageParams {
    /// The 32-byte storage slot, hex encoded.
    #[arg(long, value_parser = parse_word)]
    pub slot: Word,

    #[clap(flatten)]
    pub common: CommonParams,
}

#[derive(Clone, Debug, Args)]
pub struct CommonParams {
    /// The 32-byte root the proof is checked against, hex encoded.
    #[arg(long, value_parser = parse_word)]
    pub root: Word,

    /// The ABI-encoded `bytes[]` proof, hex encoded.
    ///
    /// Read from stdin if omitted.
    #[arg(long)]
    pub proof: Option<String>,

    /// The hash oracle the trie was built with.
    #[clap(default_value = "blake3")]
    #[arg(long, value_enum)]
    pub oracle: Oracle,

    /// The depth at which proofs are rejected as malformed.
    #[clap(default_value = "256")]
    #[arg(long)]
    pub max_depth: usize,

    /// Require the trailing magic node and canonical leaf compression flags.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Oracle {
    Blake3,
    Sha2,
}

fn strip_hex(s: &str) -> &str {
    s.trim().trim_start_matches("0x")
}

fn parse_word(s: &str) -> Result<Word> {
    let mut word = [0u8; 32];
    hex::decode_to_slice(strip_hex(s), &mut word).context("expected 32 hex-encoded bytes")?;
    Ok(word)
}

fn parse_address(s: &str) -> Result<Address> {
    let mut address = [0u8; 20];
    hex::decode_to_slice(strip_hex(s), &mut address)
        .context("expected 20 hex-encoded bytes")?;
    Ok(address)
}

impl CommonParams {
    fn options(&self) -> Options {
        let mut o = Options::new();
        o.max_depth(self.max_depth);
        o.strict_framing(self.strict);
        o
    }

    fn proof(&self) -> Result<Vec<u8>> {
        let encoded = match self.proof {
            Some(ref proof) => proof.clone(),
            None => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("reading proof from stdin")?;
                buf
            }
        };
        hex::decode(strip_hex(&encoded)).context("proof is not hex encoded")
    }
}

fn account<O: HashOracle>(oracle: O, params: &AccountParams) -> Result<()> {
    let verifier = Verifier::new(oracle, params.common.options());
    let proof = params.common.proof()?;
    let verified = verifier.prove_account(&params.common.root, &params.address, &proof)?;

    tracing::info!(exists = verified.exists, depth = verified.depth, "account proof valid");
    if let Some(leaf) = verified.found() {
        println!("nonce: {}", leaf.nonce());
        println!("balance: {}", leaf.balance());
        println!("code_size: {}", leaf.code_size());
        println!("code_hash: 0x{}", hex::encode(leaf.code_hash));
        println!("poseidon_code_hash: 0x{}", hex::encode(leaf.poseidon_code_hash));
    }
    println!("storage_root: 0x{}", hex::encode(verified.storage_root()));
    Ok(())
}

fn storage<O: HashOracle>(oracle: O, params: &StorageParams) -> Result<()> {
    let verifier = Verifier::new(oracle, params.common.options());
    let proof = params.common.proof()?;
    let verified = verifier.prove_storage(&params.common.root, &params.slot, &proof)?;

    tracing::info!(exists = verified.exists, depth = verified.depth, "storage proof valid");
    println!("value: 0x{}", hex::encode(verified.value()));
    Ok(())
}

fn main() -> Result<()> {
    logging::init()?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Account(ref params) => match params.common.oracle {
            Oracle::Blake3 => account(Blake3Oracle::new(), params),
            Oracle::Sha2 => account(Sha2Oracle::new(), params),
        },
        Commands::Storage(ref params) => match params.common.oracle {
            Oracle::Blake3 => storage(Blake3Oracle::new(), params),
            Oracle::Sha2 => storage(Sha2Oracle::new(), params),
        },
    }
}
