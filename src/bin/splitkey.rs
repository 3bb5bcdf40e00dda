use clap::{crate_version, Parser};
use rand::rngs::{OsRng, StdRng};
use rand::SeedableRng;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tokio::spawn;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use splitkey::committee::Committee;
use splitkey::config::SplitKeyConfig;
use splitkey::constants::DEFAULT_CONFIG_DIR;
use splitkey::dealer::Dealer;
use splitkey::keys::{Identity, PublicKey, SecretScalar, Share, ShareSet};
use splitkey::reconstruct::reconstruct_public_key;
use splitkey::selection::PolicyKind;
use splitkey::sss::split_secret;
use splitkey::subject::SubjectStore;
use splitkey::transport;
use splitkey::verifier::{verify, Verdict};

#[derive(Debug, Parser)]
#[command(name = "splitkey")]
#[command(version = crate_version!())]
#[command(
    about = "SPLITKEY - threshold custody of validator signing keys",
    long_about = "SPLITKEY splits a validator secret key into Shamir shares held by a fixed committee. Any threshold of members can rebuild the validator public key from their shares and compare it with the key committed in the minipool contract; fewer shares reveal nothing about the secret. A minipool can only start staking after the committee verified its key shares."
)]
enum CliArgument {
    /// Run the whole flow: create a minipool, split and distribute its key, verify the shares and start staking.
    Demo {
        /// Minipool address.
        #[clap(long, short, default_value = "0xdeadbeef")]
        address: String,

        /// Member selection policy: first, random or all. Defaults to the configured policy.
        #[clap(long, short)]
        policy: Option<String>,

        /// Seed for the random selection policy, to replay a run.
        #[clap(long, short)]
        seed: Option<u64>,

        /// Replace the share of this member with garbage before distribution.
        #[clap(long, short)]
        corrupt: Option<u64>,

        /// use embedded database for persistence
        /// otherwise use memory database
        #[clap(long, short)]
        db_path: Option<String>,
    },
    /// Split a secret key into shares.
    Split {
        /// Share threshold. Defaults to the configured threshold.
        #[clap(long, short)]
        threshold: Option<usize>,

        /// Number of shares to generate. Defaults to the configured committee size.
        #[clap(long, short)]
        shares: Option<usize>,

        /// Secret key as 32 little-endian hex bytes. A random key is used if omitted.
        #[clap(long)]
        secret: Option<String>,
    },
    /// Rebuild the public key from key shares.
    Reconstruct {
        /// Share threshold. Defaults to the configured threshold.
        #[clap(long, short)]
        threshold: Option<usize>,

        /// A share as `<id>:<hex>`; repeat for every share.
        #[clap(long, short)]
        share: Vec<String>,

        /// Public key (hex) the result must match.
        #[clap(long, short)]
        expected: Option<String>,
    },
}

#[derive(Parser, Debug)]
#[clap(name = "splitkey")]
struct Opt {
    /// Directory holding conf.toml.
    #[clap(long)]
    config: Option<String>,

    /// Subcommand to run.
    #[clap(subcommand)]
    argument: CliArgument,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let opt = Opt::parse();
    let config = SplitKeyConfig::new(opt.config.as_deref().unwrap_or(DEFAULT_CONFIG_DIR))?;
    debug!("Using config in {:?}: {:?}", config.config_path(), config);

    match opt.argument {
        CliArgument::Demo {
            address,
            policy,
            seed,
            corrupt,
            db_path,
        } => {
            let policy_kind = match policy {
                Some(name) => name.parse::<PolicyKind>()?,
                None => config.policy()?,
            };
            let db_path = db_path.or_else(|| config.db_path.clone());
            run_demo(&config, &address, policy_kind, seed, corrupt, db_path.as_deref()).await?;
        }
        CliArgument::Split {
            threshold,
            shares,
            secret,
        } => {
            let threshold = threshold.unwrap_or(config.threshold);
            let count = shares.unwrap_or(config.committee_size);
            let secret = match secret {
                Some(encoded) => SecretScalar::from_bytes(&hex::decode(encoded.trim_start_matches("0x"))?)?,
                None => SecretScalar::random(OsRng),
            };

            let shares = split_secret(&secret, threshold, count, &mut OsRng)?;
            println!("✂️  Secret has been split into {} shares.", shares.len());
            println!("    threshold: {}", threshold);
            println!("    public key: {}", secret.public_key());
            for (id, share) in &shares {
                println!("    {:>2}:{}", id, hex::encode(share.to_bytes()));
            }
        }
        CliArgument::Reconstruct {
            threshold,
            share,
            expected,
        } => {
            let threshold = threshold.unwrap_or(config.threshold);
            let shares = parse_shares(&share)?;
            let aggregate = reconstruct_public_key(&shares, threshold)?;
            println!("🔑 Recovered public key: {}", aggregate);

            if let Some(expected) = expected {
                let expected = PublicKey::from_hex(&expected)?;
                if aggregate != expected {
                    return Err(format!("recovered key does not match expected key {expected}").into());
                }
                println!("✅ Matches the expected public key.");
            }
        }
    }

    Ok(())
}

async fn run_demo(
    config: &SplitKeyConfig,
    address: &str,
    policy_kind: PolicyKind,
    seed: Option<u64>,
    corrupt: Option<u64>,
    db_path: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let committee = Arc::new(Committee::new(config.committee_size, db_path.map(Path::new))?);
    let subjects = SubjectStore::new();

    let (client, event_loop) = transport::new(Arc::clone(&committee));
    spawn(event_loop.run());

    let dealer = Dealer::create_minipool(
        address,
        config.threshold,
        config.committee_size,
        &subjects,
        &mut OsRng,
    )?;
    println!(
        "🚀 Created minipool. Address: {}, Validator pubkey: {}",
        address,
        dealer.validator_pubkey()
    );

    let threshold = subjects.threshold(address)?;
    let mut shares = dealer.split_validator_key(&mut OsRng)?;
    if let Some(id) = corrupt {
        let id = Identity::new(id)?;
        let garbage = SecretScalar::random(OsRng);
        shares.insert(id, Share::from_bytes(id, &garbage.to_bytes())?);
        println!("⚠️  Corrupted the share of member {}", id);
    }

    println!("Sending key shares to the committee...");
    let report = client.distribute(address, &shares, threshold).await;
    for (id, err) in &report.failures {
        println!("⚠️  Could not deliver share to member {}: {}", id, err);
    }

    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut policy = policy_kind.build(rng);
    let chosen = policy.select(&committee.identities(), threshold);
    println!(
        "Will try to recover validator key using the shares of members {:?}...",
        chosen.iter().map(Identity::value).collect::<Vec<_>>()
    );

    let gathered = client.gather(address, &chosen).await;
    let aggregate = reconstruct_public_key(&gathered, threshold)?;

    match verify(&subjects, address, &aggregate)? {
        Verdict::Accepted => {
            println!("✅ Successfully verified key shares.");
            println!("    Recovered key: {}", aggregate);
            subjects.stake(address)?;
            println!("💡 Successfully started staking on minipool '{}'", address);
        }
        Verdict::Rejected(mismatch) => {
            println!("❌ Unexpected validator public key.");
            println!("    Recovered key: {}", mismatch.reconstructed);
            println!("    Contract key:  {}", mismatch.expected);
            return Err(Box::new(splitkey::error::Error::from(mismatch)));
        }
    }

    Ok(())
}

fn parse_shares(encoded: &[String]) -> Result<ShareSet, Box<dyn Error>> {
    let mut shares = ShareSet::new();
    for item in encoded {
        let (id, value) = item
            .split_once(':')
            .ok_or_else(|| format!("share '{item}' is not of the form <id>:<hex>"))?;
        let id = Identity::new(id.trim().parse()?)?;
        let share = Share::from_bytes(id, &hex::decode(value.trim().trim_start_matches("0x"))?)?;
        if shares.insert(id, share).is_some() {
            return Err(format!("share for member {id} given twice").into());
        }
    }
    Ok(shares)
}
