use std::path::PathBuf;

use clap::Args;
use terminator_accounting::filter::{
    DEFAULT_MIN_CONFIRMATIONS, OnChainTransaction, filter_on_chain,
};

use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct FilterTransactionsArg {
    /// Path to a JSON array of on-chain transactions
    transactions: PathBuf,
    /// Start of the range as a Unix timestamp (inclusive)
    #[arg(long)]
    start: i64,
    /// End of the range as a Unix timestamp (exclusive)
    #[arg(long)]
    end: i64,
    /// Minimum number of confirmations
    #[arg(long, default_value_t = DEFAULT_MIN_CONFIRMATIONS)]
    min_confirmations: u32,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &FilterTransactionsArg) -> anyhow::Result<()> {
    let start = util::unix_time(arg.start)?;
    let end = util::unix_time(arg.end)?;
    anyhow::ensure!(start <= end, "Start time {start} is after end time {end}");

    let transactions: Vec<OnChainTransaction> =
        util::read_json_file("transactions", &arg.transactions)?;
    let total = transactions.len();
    let filtered = filter_on_chain(start, end, arg.min_confirmations, transactions);
    eprintln!("Kept {} of {} transactions", filtered.len(), total);

    Output::save_json(&filtered, arg.output.as_deref())
}
