use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ftl",
    about = "Fungible Token Ledger: an ERC20-style token ledger over a local state file",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Ledger state file (created on first write)
    #[arg(long, global = true, default_value = "ledger.json")]
    pub state: PathBuf,

    /// Host configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Who is calling. A certificate subject takes precedence over `--as`.
#[derive(Args, Clone, Debug, Default)]
pub struct CallerArgs {
    /// Caller identity, taken as already verified
    #[arg(long = "as", value_name = "ACCOUNT")]
    pub caller: Option<String>,

    /// Caller certificate subject, e.g. "CN=alice,O=Org1"
    #[arg(long, value_name = "SUBJECT")]
    pub subject: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Mint the total supply to an owner
    Init(InitArgs),
    /// Show the total supply
    TotalSupply,
    /// Show an account balance
    BalanceOf(BalanceOfArgs),
    /// Show how much a spender may move on an owner's behalf
    Allowance(AllowanceArgs),
    /// Move tokens from the caller to another account
    Transfer(TransferArgs),
    /// Set the caller's allowance for a spender
    Approve(ApproveArgs),
    /// Move tokens from an owner using the caller's allowance
    TransferFrom(TransferFromArgs),
    /// Invoke an operation by raw name and arguments
    Invoke(InvokeArgs),
    /// List every account with a balance record
    Holders,
}

#[derive(Args)]
pub struct InitArgs {
    pub owner: String,
}

#[derive(Args)]
pub struct BalanceOfArgs {
    pub account: String,
}

#[derive(Args)]
pub struct AllowanceArgs {
    pub owner: String,
    pub spender: String,
}

#[derive(Args)]
pub struct TransferArgs {
    pub to: String,
    pub value: String,
    #[command(flatten)]
    pub caller: CallerArgs,
}

#[derive(Args)]
pub struct ApproveArgs {
    pub spender: String,
    pub value: String,
    #[command(flatten)]
    pub caller: CallerArgs,
}

#[derive(Args)]
pub struct TransferFromArgs {
    pub from: String,
    pub to: String,
    pub value: String,
    #[command(flatten)]
    pub caller: CallerArgs,
}

#[derive(Args)]
pub struct InvokeArgs {
    /// Operation name (case-sensitive)
    pub name: String,
    pub args: Vec<String>,
    /// Use the instantiate entry point instead of invoke
    #[arg(long)]
    pub instantiate: bool,
    #[command(flatten)]
    pub caller: CallerArgs,
}
