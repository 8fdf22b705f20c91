use clap::{Parser, Subcommand};

use self::{
    filter_transactions::FilterTransactionsArg, recommend::RecommendArg, revenue::RevenueArg,
};

mod filter_transactions;
mod recommend;
mod revenue;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Recommend channels to close based on their uptime
    Recommend(#[clap(flatten)] RecommendArg),
    /// Filter confirmed on-chain transactions by time range
    FilterTransactions(#[clap(flatten)] FilterTransactionsArg),
    /// Attribute forwarding revenue to channels
    Revenue(#[clap(flatten)] RevenueArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Recommend(arg) => recommend::run(&arg)?,
        Mode::FilterTransactions(arg) => filter_transactions::run(&arg)?,
        Mode::Revenue(arg) => revenue::run(&arg)?,
    }
    Ok(())
}
