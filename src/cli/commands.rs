use crate::cli::shell;
use crate::config::Config;
use crate::wallet::Wallet;
use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "minicoind")]
#[command(version = "0.1.0")]
#[command(about = "Minicoin - a single-process UTXO ledger with proof-of-work admission")]
#[command(long_about = "
Minicoin simulates a tiny cryptocurrency for a single user: minting,
transferring and validating value without a network. The ledger lives in
memory and dies with the process.

Features:
- UTXO transaction model with secp256k1 signatures
- SHA-256 proof-of-work admission at a fixed difficulty
- Hash-linked chain with full integrity re-validation
- Named accounts with derived balances
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(long, help = "Enable debug logging")]
    pub debug: bool,

    #[arg(long, help = "Configuration file path")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive shell (the default)
    Shell,
    /// Run a scripted mint-and-transfer demonstration
    Demo,
}

pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => shell::run(config),
        Commands::Demo => run_demo(config),
    }
}

fn run_demo(config: Config) -> Result<()> {
    println!("{}", style("minicoin demo: mint, then transfer").bold());

    let mut wallet = Wallet::in_memory(config.chain)?;

    let alice_owner = wallet.create_account("Alice", "password123")?.owner_id();
    println!("created Alice (owner {})", alice_owner);
    let bob_owner = wallet.create_account("Bob", "password456")?.owner_id();
    println!("created Bob   (owner {})", bob_owner);

    wallet.mint("Alice", "password123", 100)?;
    println!(
        "minted 100 to Alice, balance {}",
        wallet.balance_of("Alice", "password123")?
    );

    wallet.transfer("Alice", "password123", "Bob", 30)?;
    println!(
        "sent 30 Alice -> Bob, balances {} / {}",
        wallet.balance_of("Alice", "password123")?,
        wallet.balance_of("Bob", "password456")?
    );

    println!(
        "chain of {} blocks, integrity {}",
        wallet.chain().blocks().len(),
        if wallet.is_valid() {
            style("OK").green()
        } else {
            style("BROKEN").red()
        }
    );

    for (i, block) in wallet.chain().blocks().iter().enumerate() {
        println!("{}", style(format!("--- block {} ---", i)).dim());
        print!("{}", block);
    }

    Ok(())
}
