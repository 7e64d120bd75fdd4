use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ledger_core::{validate_successor, Block};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "CLI client for the proof-of-work ledger node")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the node's current head block
    Head {
        /// Node base URL (e.g. http://127.0.0.1:8080)
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        node: String,
    },
    /// Ask the node to mine a block carrying DATA
    Mine {
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        node: String,
        /// JSON payload; anything that is not valid JSON is sent as a string
        #[arg(long)]
        data: String,
    },
    /// Hand a serialized block to the node as if it came from a peer
    Submit {
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        node: String,
        /// File holding the serialized block
        #[arg(long)]
        file: PathBuf,
    },
    /// Print the genesis block
    Genesis,
    /// Check offline that BLOCK extends PREVIOUS
    Verify {
        #[arg(long)]
        previous: PathBuf,
        #[arg(long)]
        block: PathBuf,
    },
}

#[derive(Serialize)]
struct MineRequest {
    data: Value,
}

fn parse_data(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

fn read_block(path: &Path) -> Result<Block> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Block::from_json(&raw).with_context(|| format!("parsing {}", path.display()))
}

async fn print_response(res: reqwest::Response) -> Result<()> {
    let status = res.status();
    let body = res.text().await?;
    println!("status: {}", status);
    println!("{body}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let client = reqwest::Client::new();
    match cli.cmd {
        Command::Head { node } => {
            let res = client.get(format!("{node}/blocks/head")).send().await?;
            print_response(res).await?;
        }
        Command::Mine { node, data } => {
            let req = MineRequest {
                data: parse_data(data),
            };
            let res = client.post(format!("{node}/mine")).json(&req).send().await?;
            print_response(res).await?;
        }
        Command::Submit { node, file } => {
            let block = read_block(&file)?;
            let res = client
                .post(format!("{node}/blocks"))
                .json(&block.serialize())
                .send()
                .await?;
            print_response(res).await?;
        }
        Command::Genesis => {
            println!("{}", serde_json::to_string_pretty(&Block::genesis().serialize())?);
        }
        Command::Verify { previous, block } => {
            let previous = read_block(&previous)?;
            let block = read_block(&block)?;
            match validate_successor(&previous, &block) {
                Ok(()) => println!("valid: {} extends {}", block.hash(), previous.hash()),
                Err(e) => anyhow::bail!("invalid ({}): {e}", e.reason()),
            }
        }
    }
    Ok(())
}
