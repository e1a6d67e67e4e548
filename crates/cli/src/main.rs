//! # CLI — interactive shell for the storage engine
//!
//! A REPL-style command-line interface over [`engine::Db`]. Reads commands
//! from stdin, executes them against whichever backend the configuration
//! selects, and prints results to stdout. Works both interactively and
//! scripted (pipe commands via stdin).
//!
//! ## Commands
//!
//! ```text
//! SET key value           Insert or update a key-value pair
//! GET key                 Look up a key (prints value or "(nil)")
//! DEL key                 Delete a key (writes a tombstone)
//! FUZZY key max_distance   Levenshtein-filtered scan (LSM only)
//! FLUSH                   Force flush memtable to a segment (LSM only)
//! COMPACT                 Trigger manual compaction (LSM only)
//! STATS                   Print engine debug info
//! EXIT / QUIT             Shut down gracefully
//! ```
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use config::{EngineConfig, EngineType};
use engine::Db;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EngineArg {
    Btree,
    Lsmtree,
}

impl From<EngineArg> for EngineType {
    fn from(value: EngineArg) -> Self {
        match value {
            EngineArg::Btree => EngineType::BTree,
            EngineArg::Lsmtree => EngineType::LsmTree,
        }
    }
}

/// Interactive shell over the embedded key-value storage engine.
#[derive(Debug, Parser)]
#[command(name = "kvctl", about = "Interactive shell over the embedded storage engine")]
struct Cli {
    /// Which backend to open.
    #[arg(long, value_enum, default_value = "btree")]
    engine: EngineArg,

    /// Directory the engine owns exclusively while open.
    #[arg(long, default_value = "data_dir")]
    directory: PathBuf,

    /// LSM only: entries the memtable may hold before it is flushed.
    #[arg(long, default_value_t = 1000)]
    memtable_threshold: usize,

    /// Minimum degree of the backing B-Tree (both backends).
    #[arg(long, default_value_t = 3)]
    btree_min_degree: usize,

    /// LSM only: target false-positive rate for each segment's bloom filter.
    #[arg(long, default_value_t = 0.01)]
    bloom_false_positive_rate: f64,

    /// LSM only: records between consecutive sparse index entries.
    #[arg(long, default_value_t = 100)]
    sparse_index_stride: usize,

    /// fsync every WAL append.
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    wal_sync: bool,

    /// LSM only: back the memtable with its own WAL.
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    lsm_wal: bool,
}

impl Cli {
    fn into_config(self) -> EngineConfig {
        EngineConfig {
            engine_type: self.engine.into(),
            directory: self.directory.display().to_string(),
            memtable_threshold: self.memtable_threshold,
            btree_min_degree: self.btree_min_degree,
            bloom_false_positive_rate: self.bloom_false_positive_rate,
            sparse_index_stride: self.sparse_index_stride,
            wal_sync: self.wal_sync,
            lsm_wal: self.lsm_wal,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let directory = cli.directory.clone();
    let config = cli.into_config();
    config.validate()?;

    let mut db = Db::open(&directory, &config)?;

    println!(
        "storage engine started (engine={}, directory={})",
        config.engine_type,
        directory.display()
    );
    println!("Commands: SET key value | GET key | DEL key | FUZZY key max_distance");
    println!("          COMPACT | FLUSH | STATS | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd.to_uppercase().as_str() {
                "SET" => {
                    if let Some(k) = parts.next() {
                        let v: String = parts.collect::<Vec<&str>>().join(" ");
                        if v.is_empty() {
                            println!("ERR usage: SET key value");
                        } else {
                            match db.put(k.as_bytes().to_vec(), v.as_bytes().to_vec()) {
                                Ok(()) => println!("OK"),
                                Err(e) => println!("ERR set failed: {}", e),
                            }
                        }
                    } else {
                        println!("ERR usage: SET key value");
                    }
                }
                "GET" => {
                    if let Some(k) = parts.next() {
                        match db.get(k.as_bytes()) {
                            Ok(Some(v)) => println!("{}", String::from_utf8_lossy(&v)),
                            Ok(None) => println!("(nil)"),
                            Err(e) => println!("ERR read failed: {}", e),
                        }
                    } else {
                        println!("ERR usage: GET key");
                    }
                }
                "DEL" => {
                    if let Some(k) = parts.next() {
                        match db.delete(k.as_bytes().to_vec()) {
                            Ok(()) => println!("OK"),
                            Err(e) => println!("ERR del failed: {}", e),
                        }
                    } else {
                        println!("ERR usage: DEL key");
                    }
                }
                "FUZZY" => {
                    let key = parts.next();
                    let max_distance = parts.next().and_then(|s| s.parse::<usize>().ok());
                    match (key, max_distance) {
                        (Some(k), Some(d)) => match db.fuzzy_get(k.as_bytes(), d) {
                            Ok(results) => {
                                if results.is_empty() {
                                    println!("(empty)");
                                } else {
                                    for (k, v) in &results {
                                        println!(
                                            "{} -> {}",
                                            String::from_utf8_lossy(k),
                                            String::from_utf8_lossy(v)
                                        );
                                    }
                                    println!("({} entries)", results.len());
                                }
                            }
                            Err(e) => println!("ERR fuzzy failed: {}", e),
                        },
                        _ => println!("ERR usage: FUZZY key max_distance"),
                    }
                }
                "COMPACT" => match db.compact() {
                    Ok(()) => println!("OK"),
                    Err(e) => println!("ERR compact failed: {}", e),
                },
                "FLUSH" => match db.force_flush() {
                    Ok(()) => println!("OK"),
                    Err(e) => println!("ERR flush failed: {}", e),
                },
                "STATS" => {
                    println!("{}", db.stats());
                }
                "EXIT" | "QUIT" => {
                    println!("bye");
                    break;
                }
                other => {
                    println!("unknown command: {}", other);
                }
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    db.close()?;
    Ok(())
}
