use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use filecache::codec::StringCodec;
use filecache::config::Config;
use filecache::constants::DEFAULT_CONFIG_PATH;
use filecache::{FileCache, FileCacheFactory};
use std::path::PathBuf;

/// filecache - inspect and edit string-valued file caches
#[derive(Parser, Debug)]
#[command(name = "filecache")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the cached value
    Get { name: String },

    /// Store a value
    Set {
        name: String,
        value: String,

        /// Back-date the entry by this many seconds
        #[arg(long, default_value_t = 0)]
        age_seconds: i64,
    },

    /// Delete the entry
    Delete { name: String },

    /// Overwrite the entry with random data, then delete it
    Shred { name: String },

    /// Update the modification time only
    Touch { name: String },

    /// Print path, presence, modification time and age
    Info { name: String },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    config.validate()?;

    filecache::logging::init_subscriber(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!(
        config_file = %args.config.display(),
        base_dir = %config.cache.base_dir.display(),
        "Configuration loaded successfully"
    );

    let factory = FileCacheFactory::from_config(&config.cache);
    let open = |name: &str| -> FileCache<String> { factory.create(name, StringCodec) };

    match args.command {
        Command::Get { name } => {
            let value = open(&name)
                .get_value()
                .with_context(|| format!("Cannot read cache '{}'", name))?;
            println!("{}", value);
        }
        Command::Set {
            name,
            value,
            age_seconds,
        } => {
            let when = backdated(Utc::now(), age_seconds)?;
            open(&name).set_value_at(&value, when)?;
        }
        Command::Delete { name } => open(&name).delete()?,
        Command::Shred { name } => open(&name).shred()?,
        Command::Touch { name } => open(&name).touch()?,
        Command::Info { name } => {
            let cache = open(&name);
            println!("path: {}", cache.path().display());
            match cache.get_modification_time_or_absent()? {
                Some(modified) => {
                    let age = Utc::now().signed_duration_since(modified);
                    println!("present: true");
                    println!("modified: {}", modified.to_rfc3339());
                    println!("age_seconds: {}", age.num_seconds());
                }
                None => println!("present: false"),
            }
        }
    }

    Ok(())
}

/// `now` minus `age_seconds`, rejecting ages chrono cannot represent
fn backdated(now: DateTime<Utc>, age_seconds: i64) -> Result<DateTime<Utc>> {
    chrono::Duration::try_seconds(age_seconds)
        .and_then(|age| now.checked_sub_signed(age))
        .with_context(|| format!("--age-seconds {} is out of range", age_seconds))
}
