use std::{collections::BTreeMap, convert::Infallible, path::PathBuf};

use anyhow::Context;
use chrono::{TimeDelta, Utc};
use clap::Args;
use terminator_accounting::revenue::{
    InMemoryForwardingLog, ShortChannelId, list_forwarding_events, revenue_report,
};
use terminator_recommend::outpoint::OutPoint;

use crate::{
    schema::ledger::Ledger,
    util::{self, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct RevenueArg {
    /// Path to the ledger JSON file (channels and forwarding events)
    ledger: PathBuf,
    /// How far back from now to include forwarding events, in hours
    #[arg(long, default_value_t = 24)]
    lookback_hours: i64,
    /// Number of events fetched per page
    #[arg(long, default_value_t = 1000)]
    page_size: u32,
    /// Share of each fee attributed to the incoming channel
    #[arg(long, default_value_t = 0.5)]
    attribute_incoming: f64,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &RevenueArg) -> anyhow::Result<()> {
    let ledger: Ledger = util::read_json_file("ledger", &arg.ledger)?;

    let channel_ids = ledger
        .channels
        .iter()
        .map(|channel| -> anyhow::Result<_> {
            let outpoint = channel
                .channel_point
                .parse::<OutPoint>()
                .with_context(|| format!("Invalid channel point: {}", channel.channel_point))?;
            Ok((ShortChannelId(channel.chan_id), outpoint))
        })
        .collect::<anyhow::Result<BTreeMap<_, _>>>()?;

    let end = Utc::now();
    let lookback = TimeDelta::try_hours(arg.lookback_hours)
        .with_context(|| format!("Lookback out of range: {} hours", arg.lookback_hours))?;
    let start = end - lookback;

    let log = InMemoryForwardingLog::new(ledger.events);
    let events = list_forwarding_events(
        |offset, max_events| Ok::<_, Infallible>(log.query(start, end, offset, max_events)),
        arg.page_size,
    )?;
    eprintln!("Fetched {} forwarding events since {start}", events.len());

    let report = revenue_report(&channel_ids, &events, arg.attribute_incoming)?;
    Output::save_json(&report, arg.output.as_deref())
}
