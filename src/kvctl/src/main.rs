mod client;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Instant;

use crate::client::{KeyClient, parse_entries};

#[derive(Debug, Parser)]
#[command(name = "kvctl", version, about = "Command line client for a keystore server")]
struct Cli {
    /// Base URL of the keystore server
    #[arg(long, env = "KVCTL_SERVER", default_value = "http://127.0.0.1:8080")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store one or more KEY=VALUE pairs in a single batch
    Put {
        #[arg(required = true)]
        entries: Vec<String>,
    },
    /// Print one key, or the whole store when no key is given
    Get { key: Option<String> },
    /// Remove a key
    Delete { key: String },
    /// Write random keys from concurrent tasks and check they are all listed afterwards
    Stress {
        #[arg(long, default_value_t = 8)]
        tasks: usize,
        #[arg(long, default_value_t = 100)]
        keys_per_task: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = KeyClient::new(&cli.server);

    match cli.command {
        Command::Put { entries } => {
            let entries = parse_entries(&entries)?;
            let count = entries.len();
            client.put(entries).await?;
            println!("Stored {count} key(s)");
        }
        Command::Get { key: Some(key) } => {
            let value = client.get(&key).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::Get { key: None } => {
            let entries = client.list().await?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Command::Delete { key } => {
            client.delete(&key).await?;
            println!("Deleted {key}");
        }
        Command::Stress { tasks, keys_per_task } => {
            stress(client, tasks, keys_per_task).await?;
        }
    }
    Ok(())
}

// Random prefix so repeated runs against the same server don't collide
fn run_prefix() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}

async fn stress(client: KeyClient, tasks: usize, keys_per_task: usize) -> Result<()> {
    let client = Arc::new(client);
    let prefix = run_prefix();
    println!("Writing {} keys from {tasks} tasks (prefix {prefix})", tasks * keys_per_task);

    let start = Instant::now();
    let mut handles = Vec::with_capacity(tasks);
    for task in 0..tasks {
        let client = Arc::clone(&client);
        let prefix = prefix.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..keys_per_task {
                let mut entry = Map::new();
                entry.insert(format!("{prefix}-{task}-{i}"), json!({ "task": task, "seq": i }));
                client.put(entry).await?;
            }
            anyhow::Ok(())
        }));
    }
    for handle in handles {
        handle.await??;
    }
    let written = start.elapsed();

    let listed = client.list().await?;
    let mut missing = 0;
    for task in 0..tasks {
        for i in 0..keys_per_task {
            let expected: Value = json!({ "task": task, "seq": i });
            if listed.get(&format!("{prefix}-{task}-{i}")) != Some(&expected) {
                missing += 1;
            }
        }
    }

    println!(
        "Wrote {} keys in {:?}, store now holds {} keys",
        tasks * keys_per_task,
        written,
        listed.len()
    );
    if missing > 0 {
        bail!("{missing} written key(s) missing or wrong in listing");
    }
    println!("All keys present");
    Ok(())
}
