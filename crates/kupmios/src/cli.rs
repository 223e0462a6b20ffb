use clap::{Args, Parser, Subcommand};
use kupmios_core::{AddressOrCredential, Credential, CredentialKind, OutRef};

/// Kupmios: query Cardano ledger state through Kupo and Ogmios.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Kupo indexer URL.
    #[arg(
        long,
        global = true,
        default_value = "http://127.0.0.1:1442",
        env = "KUPMIOS_KUPO_URL"
    )]
    pub kupo_url: String,

    /// Ogmios node bridge URL.
    #[arg(
        long,
        global = true,
        default_value = "http://127.0.0.1:1337",
        env = "KUPMIOS_OGMIOS_URL"
    )]
    pub ogmios_url: String,

    /// Budget for a single provider call, in seconds.
    #[arg(long, global = true, default_value = "10", env = "KUPMIOS_CALL_TIMEOUT_SECS")]
    pub call_timeout_secs: u64,

    /// Overall budget for `await-tx`, in seconds.
    #[arg(long, global = true, default_value = "160", env = "KUPMIOS_AWAIT_TIMEOUT_SECS")]
    pub await_timeout_secs: u64,

    /// Maximum concurrent datum/script lookups per call.
    #[arg(long, global = true, default_value = "16")]
    pub aux_concurrency: usize,

    /// Datum/script cache entries (0 disables the cache).
    #[arg(long, global = true, default_value = "1024")]
    pub cache_capacity: usize,

    /// Outbound requests per second per backend (unlimited if omitted).
    #[arg(long, global = true, env = "KUPMIOS_REQUESTS_PER_SECOND")]
    pub requests_per_second: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Current protocol parameters.
    Params,

    /// Unspent outputs at an address or payment credential.
    Utxos {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Unspent outputs at an address or payment credential holding a unit.
    UtxosWithUnit {
        #[command(flatten)]
        target: TargetArgs,

        /// Policy id, optionally followed by the hex asset name.
        #[arg(long)]
        unit: String,
    },

    /// The single unspent output holding a unit.
    UtxoByUnit {
        /// Policy id, optionally followed by the hex asset name.
        unit: String,
    },

    /// Unspent outputs by reference, given as `<tx_hash>#<index>`.
    UtxosByOutRef {
        #[arg(required = true, value_parser = parse_out_ref)]
        out_refs: Vec<OutRef>,
    },

    /// Pool delegation and reward balance of a reward address.
    Delegation { reward_address: String },

    /// Datum CBOR by hash.
    Datum { datum_hash: String },

    /// Wait until outputs of a transaction are visible.
    AwaitTx {
        tx_hash: String,

        /// First back-off delay in seconds, non-zero (doubles after every empty check).
        #[arg(long)]
        check_interval_secs: Option<u64>,
    },

    /// Submit a signed transaction given as CBOR hex.
    Submit { cbor: String },

    /// Execution budgets of every redeemer of a transaction given as CBOR hex.
    Evaluate { cbor: String },
}

/// Exactly one of an address or a payment credential.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// Bech32 (or Byron base58) address.
    #[arg(long)]
    pub address: Option<String>,

    /// Payment verification-key hash (hex).
    #[arg(long)]
    pub key_hash: Option<String>,

    /// Payment script hash (hex).
    #[arg(long)]
    pub script_hash: Option<String>,
}

impl TargetArgs {
    pub fn target(&self) -> eyre::Result<AddressOrCredential> {
        let credential = |kind, hash: &String| {
            AddressOrCredential::Credential(Credential {
                kind,
                hash: hash.clone(),
            })
        };
        match (&self.address, &self.key_hash, &self.script_hash) {
            (Some(address), None, None) => Ok(AddressOrCredential::Address(address.clone())),
            (None, Some(hash), None) => Ok(credential(CredentialKind::Key, hash)),
            (None, None, Some(hash)) => Ok(credential(CredentialKind::Script, hash)),
            _ => Err(eyre::eyre!(
                "pass exactly one of --address, --key-hash or --script-hash"
            )),
        }
    }
}

fn parse_out_ref(raw: &str) -> Result<OutRef, String> {
    let (tx_hash, index) = raw
        .split_once('#')
        .ok_or_else(|| format!("`{raw}` is not of the form <tx_hash>#<index>"))?;
    let index = index
        .parse::<u32>()
        .map_err(|e| format!("invalid output index in `{raw}`: {e}"))?;
    Ok(OutRef::new(tx_hash, index))
}
