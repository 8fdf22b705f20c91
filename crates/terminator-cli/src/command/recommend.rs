use std::{path::PathBuf, time::Duration};

use clap::Args;
use terminator_recommend::{ChannelRecord, CloseRecommendationConfig, close_recommendations};
use terminator_stats::dataset::Sensitivity;

use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct RecommendArg {
    /// Path to a JSON array of open channels
    channels: PathBuf,
    /// Minimum time in seconds a channel must have been monitored to be considered
    #[arg(long)]
    minimum_monitored: u64,
    /// Only recommend strong outliers (3 x IQR instead of 1.5 x IQR)
    #[arg(long)]
    strong: bool,
    /// Consider private channels as well
    #[arg(long)]
    include_private: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &RecommendArg) -> anyhow::Result<()> {
    let config = CloseRecommendationConfig {
        sensitivity: Sensitivity::from_strong(arg.strong),
        minimum_monitored: Duration::from_secs(arg.minimum_monitored),
        exclude_private: !arg.include_private,
    };
    tracing::debug!(?config, "computing close recommendations");

    let report = close_recommendations(&config, || {
        util::read_json_file::<Vec<ChannelRecord>, _>("channels", &arg.channels)
    })?;

    eprintln!(
        "Considered {} of {} channels, {} recommended for close",
        report.considered_channels,
        report.total_channels,
        report.recommendations.len()
    );
    Output::save_json(&report, arg.output.as_deref())
}
