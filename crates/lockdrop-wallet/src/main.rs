//! lockdrop-wallet
//!
//! CLI for Bitcoin lockdrop participants: compile the lock address, derive
//! and submit the claim, poll its status, and spend the lock once matured.
//!
//! Usage:
//!   lockdrop-wallet address      --days <n> --public-key <hex>
//!   lockdrop-wallet claim-id     --txid <hex> --public-key <hex> --days <n> --value <sat>
//!   lockdrop-wallet submit-claim --txid <hex> --public-key <hex> --days <n> --value <sat> [--rpc <url>]
//!   lockdrop-wallet claim-status --claim-id <hex> [--rpc <url>]
//!   lockdrop-wallet unlock       --txid <hex> --vout <n> --value <sat> --days <n> --to <address> --fee <sat> [--wif <key>]
//!   lockdrop-wallet convert      --amount <decimal> --from <sat|btc|femto|plm>
//!   lockdrop-wallet recover-key  --address <p2pkh> --signature <base64>

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use lockdrop_core::units::{Denomination, BITCOIN, PLM};
use lockdrop_core::{
    ClaimId, LockNetwork, LockParameter, LockdropConfig, TxHash, UnspentLock,
};
use lockdrop_crypto::{claim_id, mine_pow_nonce, LockSigner, SoftwareSigner};
use lockdrop_timelock::{
    build_unlock_transaction, claim_status, compile_lock, network_from_address,
    recover_locker_key, request_claim, to_raw_hex,
};

mod rpc_client;
use rpc_client::RpcLedgerClient;

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "lockdrop-wallet",
    version,
    about = "Bitcoin lockdrop wallet: lock, claim, unlock"
)]
struct Args {
    /// JSON config file; flags below override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Source-chain network (mainnet, testnet, regtest).
    #[arg(long, global = true)]
    network: Option<LockNetwork>,

    /// Destination ledger RPC endpoint.
    #[arg(long, global = true)]
    rpc: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Identifies one funding output of a lock.
#[derive(clap::Args, Debug)]
struct LockArgs {
    /// Funding transaction id (hex, display order).
    #[arg(long)]
    txid: String,
    /// Locker public key (hex, compressed or uncompressed).
    #[arg(long)]
    public_key: String,
    /// Lock duration in days.
    #[arg(long)]
    days: u32,
    /// Locked amount in satoshi.
    #[arg(long)]
    value: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile the lock script and print its P2SH address.
    Address {
        #[arg(long)]
        days: u32,
        /// Locker public key (hex, compressed or uncompressed).
        #[arg(long)]
        public_key: String,
    },

    /// Print the claim id of a lock and its proof-of-work nonce.
    ClaimId {
        #[command(flatten)]
        lock: LockArgs,
    },

    /// Request the lockdrop reward for a lock on the destination ledger.
    SubmitClaim {
        #[command(flatten)]
        lock: LockArgs,
    },

    /// Show the ledger's vote tally and payout for a claim.
    ClaimStatus {
        #[arg(long)]
        claim_id: String,
    },

    /// Sign the transaction that spends a matured lock. Prints raw hex.
    Unlock {
        /// Funding transaction id (hex, display order).
        #[arg(long)]
        txid: String,
        /// Output index of the lock in the funding transaction.
        #[arg(long)]
        vout: u32,
        /// Locked amount in satoshi.
        #[arg(long)]
        value: u64,
        #[arg(long)]
        days: u32,
        /// Recipient address.
        #[arg(long)]
        to: String,
        /// Fee in satoshi, deducted from the locked value.
        #[arg(long)]
        fee: u64,
        /// Input sequence; defaults to the lock's own CSV value.
        #[arg(long)]
        sequence: Option<u32>,
        /// Locker private key (WIF).
        #[arg(long, env = "LOCKDROP_WIF", hide_env_values = true)]
        wif: String,
    },

    /// Convert an amount between smallest and display units.
    Convert {
        /// Decimal amount.
        #[arg(long)]
        amount: String,
        /// Unit the amount is given in.
        #[arg(long, value_enum)]
        from: Unit,
    },

    /// Recover the locker public key from a signed lock message.
    RecoverKey {
        /// P2PKH address the message was signed with.
        #[arg(long)]
        address: String,
        /// Base64 signed-message signature.
        #[arg(long)]
        signature: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Unit {
    Sat,
    Btc,
    Femto,
    Plm,
}

// ── Main ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,lockdrop=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref(), args.network, args.rpc)?;
    let network = config.network;

    match args.command {
        Command::Address { days, public_key } => {
            let pk = decode_hex(&public_key, "public key")?;
            let lock = compile_lock(days, &pk, network)?;
            println!("Address:   {}", lock.address);
            println!("Script:    {}", lock.redeem_script_hex());
            println!("Sequence:  {} blocks", lock.sequence);
            println!("Network:   {}", network);
            Ok(())
        }

        Command::ClaimId { lock } => {
            let param = lock_parameter(&lock, network)?;
            let id = claim_id(&param);
            let nonce = mine_pow_nonce(&id, &config.pow)?;
            println!("Claim ID:  0x{}", id);
            println!("Nonce:     {}", nonce);
            Ok(())
        }

        Command::SubmitClaim { lock } => {
            let param = lock_parameter(&lock, network)?;
            let client = RpcLedgerClient::new(&config.ledger_rpc);
            let submission = request_claim(&client, &param, &config.pow)
                .await
                .with_context(|| format!("submitting claim to {}", config.ledger_rpc))?;
            println!("Claim ID:  0x{}", submission.claim_id);
            println!("Nonce:     {}", submission.nonce);
            println!("Submitted: {}", submission.receipt.transaction_hash);
            Ok(())
        }

        Command::ClaimStatus { claim_id } => {
            let id = ClaimId::from_hex(&claim_id).context("parsing claim id")?;
            let client = RpcLedgerClient::new(&config.ledger_rpc);
            let status = claim_status(&client, &id)
                .await
                .with_context(|| format!("querying {}", config.ledger_rpc))?;
            println!("{}", status.describe(&id));
            Ok(())
        }

        Command::Unlock {
            txid,
            vout,
            value,
            days,
            to,
            fee,
            sequence,
            wif,
        } => {
            let signer = SoftwareSigner::from_wif(&wif).context("loading locker key")?;
            let redemption = compile_lock(days, &signer.public_key().serialize(), network)?;
            let lock = UnspentLock {
                txid: TxHash::from_hex(&txid).context("parsing funding txid")?,
                output_index: vout,
                value,
                confirmed_height: None,
            };
            info!(address = %redemption.address, "spending lock");
            let tx = build_unlock_transaction(
                &signer,
                network,
                &lock,
                &redemption,
                sequence.unwrap_or(redemption.sequence),
                &to,
                fee,
            )?;
            println!("{}", to_raw_hex(&tx));
            Ok(())
        }

        Command::Convert { amount, from } => {
            println!("{}", convert(&amount, from)?);
            Ok(())
        }

        Command::RecoverKey { address, signature } => {
            let key = recover_locker_key(&address, &signature)?;
            println!("Public key: {}", key);
            println!("Network:    {}", network_from_address(&address)?);
            Ok(())
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn load_config(
    path: Option<&Path>,
    network: Option<LockNetwork>,
    rpc: Option<String>,
) -> anyhow::Result<LockdropConfig> {
    let mut config = match path {
        Some(p) => {
            let p = expand_tilde(p);
            LockdropConfig::load(&p).with_context(|| format!("loading config {}", p.display()))?
        }
        None => LockdropConfig::default(),
    };
    if let Some(network) = network {
        config.network = network;
    }
    if let Some(rpc) = rpc {
        config.ledger_rpc = rpc;
    }
    Ok(config)
}

/// Record for the lock script compiled from `lock`, so the claimed duration
/// is always one `compile_lock` accepts.
fn lock_parameter(lock: &LockArgs, network: LockNetwork) -> anyhow::Result<LockParameter> {
    let txid = TxHash::from_hex(&lock.txid).context("parsing funding txid")?;
    let pk = decode_hex(&lock.public_key, "public key")?;
    let redemption = compile_lock(lock.days, &pk, network)?;
    Ok(redemption.lock_parameter(txid, lock.value))
}

fn decode_hex(s: &str, what: &str) -> anyhow::Result<Vec<u8>> {
    hex::decode(s.trim().trim_start_matches("0x")).with_context(|| format!("decoding {what} hex"))
}

/// Converts to the other unit of the same chain.
fn convert(amount: &str, from: Unit) -> anyhow::Result<String> {
    let (denom, to_smallest): (&Denomination, bool) = match from {
        Unit::Sat => (&BITCOIN, false),
        Unit::Btc => (&BITCOIN, true),
        Unit::Femto => (&PLM, false),
        Unit::Plm => (&PLM, true),
    };
    if to_smallest {
        let smallest = denom.parse_display(amount)?;
        Ok(format!("{} {}", smallest, denom.base_unit))
    } else {
        let smallest: u128 = amount
            .trim()
            .parse()
            .with_context(|| format!("{amount} is not a whole number of {}", denom.base_unit))?;
        Ok(format!("{} {}", denom.format(smallest), denom.display_unit))
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
