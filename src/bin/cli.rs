//! AtlasDict CLI
//!
//! Read-only inspection of committed dict files.

use std::path::{Path, PathBuf};
use std::process;

use atlasdict::{DictInfo, DictKey, DictType, KvDict, ListDict, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

/// AtlasDict CLI
#[derive(Parser, Debug)]
#[command(name = "atlasdict-cli")]
#[command(about = "Inspect AtlasDict files")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show header and index summary
    Info {
        /// Dict file
        path: PathBuf,
    },

    /// Print one list entry
    Get {
        /// List dict file
        path: PathBuf,

        /// Entry index
        index: u64,
    },

    /// Print list entries in append order
    Dump {
        /// List dict file
        path: PathBuf,

        /// Stop after this many entries
        #[arg(short, long)]
        limit: Option<u64>,
    },

    /// Look up a key in a keyed dict
    Lookup {
        /// Keyed dict file
        path: PathBuf,

        /// The key to look up
        key: String,

        /// Key type the dict was built with
        #[arg(short = 't', long, value_enum, default_value = "str")]
        key_type: KeyType,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KeyType {
    Str,
    Bytes,
    U32,
    U64,
    I32,
    I64,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,atlasdict=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args.command) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Info { path } => {
            let info = DictInfo::read(&path)?;
            println!("path:          {}", path.display());
            println!("type:          {}", info.dict_type);
            println!("entries:       {}", info.entries);
            println!("file size:     {}", info.file_size);
            println!("data size:     {}", info.data_size);
            println!("data padding:  {}", info.data_pad_size);
            println!("index size:    {}", info.index_size);
            if info.dict_type == DictType::List {
                let list = ListDict::open_readonly(&path)?;
                println!("32-bit offsets: {}", list.offset_32bits_num());
            }
        }
        Commands::Get { path, index } => {
            let list = ListDict::open_readonly(&path)?;
            print_payload(list.get(index)?);
        }
        Commands::Dump { path, limit } => {
            let list = ListDict::open_readonly(&path)?;
            let limit = limit.unwrap_or(u64::MAX);
            for (i, entry) in list.iter().enumerate() {
                if i as u64 >= limit {
                    break;
                }
                print!("{}\t", i);
                print_payload(entry?);
            }
        }
        Commands::Lookup {
            path,
            key,
            key_type,
        } => match key_type {
            KeyType::Str => lookup::<str>(&path, &key)?,
            KeyType::Bytes => lookup::<[u8]>(&path, key.as_bytes())?,
            KeyType::U32 => lookup::<u32>(&path, &parse_key::<u32>(&key)?)?,
            KeyType::U64 => lookup::<u64>(&path, &parse_key::<u64>(&key)?)?,
            KeyType::I32 => lookup::<i32>(&path, &parse_key::<i32>(&key)?)?,
            KeyType::I64 => lookup::<i64>(&path, &parse_key::<i64>(&key)?)?,
        },
    }
    Ok(())
}

fn lookup<K: DictKey + ?Sized>(path: &Path, key: &K) -> Result<()> {
    let dict = KvDict::<K>::open_readonly(path)?;
    match dict.get(key)? {
        Some(value) => print_payload(value),
        None => {
            eprintln!("(not found)");
            process::exit(2);
        }
    }
    Ok(())
}

fn parse_key<T: std::str::FromStr>(key: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    key.parse().map_err(|e: T::Err| {
        atlasdict::DictError::InvalidArgument(format!("invalid key {:?}: {}", key, e))
    })
}

fn print_payload(payload: &[u8]) {
    println!("{}", String::from_utf8_lossy(payload));
}
