//! Forwarding revenue per channel.
//!
//! Forwarding history is fetched page by page through a query function
//! `(offset, max_events) -> ForwardingSlice`. Paging starts at offset 0, moves
//! to the offset reported with each page, and stops at the first page that
//! holds fewer than `max_events` events.

use std::{collections::BTreeMap, error::Error, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use terminator_recommend::outpoint::OutPoint;

use crate::filter::in_range;

type BoxError = Box<dyn Error + Send + Sync>;

/// Compact channel identifier: block height, transaction index and output
/// index packed into 24, 24 and 16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ShortChannelId(pub u64);

impl ShortChannelId {
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn block_height(self) -> u32 {
        (self.0 >> 40) as u32
    }

    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn tx_index(self) -> u32 {
        ((self.0 >> 16) & 0xFF_FFFF) as u32
    }

    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn output_index(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

impl fmt::Display for ShortChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.block_height(),
            self.tx_index(),
            self.output_index()
        )
    }
}

/// A single HTLC forwarded through the node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ForwardingEvent {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub incoming: ShortChannelId,
    pub outgoing: ShortChannelId,
    pub amount_in_msat: u64,
    pub amount_out_msat: u64,
}

impl ForwardingEvent {
    /// Fee earned for the forward.
    #[must_use]
    pub fn fee_msat(&self) -> u64 {
        self.amount_in_msat.saturating_sub(self.amount_out_msat)
    }
}

/// One page of forwarding history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardingSlice {
    pub events: Vec<ForwardingEvent>,
    /// Offset to request the next page from.
    pub last_offset: u32,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PagingError {
    #[display("max events per page must be non-zero")]
    ZeroPageSize,
    #[display("forwarding history query failed: {cause}")]
    Query { cause: BoxError },
    #[display("full page of forwarding events did not advance past offset {offset}")]
    OffsetNotAdvancing { offset: u32 },
}

/// Fetches every forwarding event reachable through `query`.
pub fn list_forwarding_events<F, E>(
    mut query: F,
    max_events: u32,
) -> Result<Vec<ForwardingEvent>, PagingError>
where
    F: FnMut(u32, u32) -> Result<ForwardingSlice, E>,
    E: Into<BoxError>,
{
    if max_events == 0 {
        return Err(PagingError::ZeroPageSize);
    }

    let mut events = vec![];
    let mut offset = 0;
    loop {
        let slice = query(offset, max_events).map_err(|e| PagingError::Query { cause: e.into() })?;
        let count = slice.events.len();
        tracing::debug!(offset, count, "fetched forwarding events");
        events.extend(slice.events);

        if count < max_events as usize {
            break;
        }
        if slice.last_offset <= offset {
            return Err(PagingError::OffsetNotAdvancing { offset });
        }
        offset = slice.last_offset;
    }

    Ok(events)
}

/// Forwarding history held in memory, served in pages over a time window.
#[derive(Debug, Clone, Default)]
pub struct InMemoryForwardingLog {
    events: Vec<ForwardingEvent>,
}

impl InMemoryForwardingLog {
    /// Creates a log, ordering the events by timestamp.
    #[must_use]
    pub fn new(mut events: Vec<ForwardingEvent>) -> Self {
        events.sort_by_key(|event| event.timestamp);
        Self { events }
    }

    /// Returns up to `max_events` events in `[start, end)`, skipping the first
    /// `offset` entries of the log.
    #[must_use]
    pub fn query(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        offset: u32,
        max_events: u32,
    ) -> ForwardingSlice {
        let mut last_offset = offset;
        let events = self
            .events
            .iter()
            .enumerate()
            .skip(offset as usize)
            .filter(|(_, event)| in_range(event.timestamp, start, end))
            .take(max_events as usize)
            .map(|(index, event)| {
                last_offset = u32::try_from(index + 1).unwrap_or(u32::MAX);
                event.clone()
            })
            .collect();
        ForwardingSlice {
            events,
            last_offset,
        }
    }
}

/// Forwarding volume and fees attributed to one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Revenue {
    pub amount_incoming_msat: u64,
    pub amount_outgoing_msat: u64,
    pub fees_incoming_msat: u64,
    pub fees_outgoing_msat: u64,
}

impl Revenue {
    #[must_use]
    pub fn total_fees_msat(&self) -> u64 {
        self.fees_incoming_msat + self.fees_outgoing_msat
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RevenueReport {
    pub channels: BTreeMap<OutPoint, Revenue>,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum RevenueError {
    #[display("incoming fee attribution must be within [0, 1], got {value}")]
    InvalidAttribution { value: f64 },
    #[display("forwarding event references unknown channel {channel}")]
    UnknownChannel { channel: ShortChannelId },
}

/// Attributes forwarding volume and fees to the channels involved.
///
/// Each event credits `attribute_incoming` of its fee to the incoming channel
/// and the remainder to the outgoing channel.
pub fn revenue_report(
    channel_ids: &BTreeMap<ShortChannelId, OutPoint>,
    events: &[ForwardingEvent],
    attribute_incoming: f64,
) -> Result<RevenueReport, RevenueError> {
    if !(0.0..=1.0).contains(&attribute_incoming) {
        return Err(RevenueError::InvalidAttribution {
            value: attribute_incoming,
        });
    }

    let lookup = |channel: ShortChannelId| {
        channel_ids
            .get(&channel)
            .copied()
            .ok_or(RevenueError::UnknownChannel { channel })
    };

    let mut channels = BTreeMap::<OutPoint, Revenue>::new();
    for event in events {
        let incoming = lookup(event.incoming)?;
        let outgoing = lookup(event.outgoing)?;

        let fee = event.fee_msat();
        let incoming_fee = split_fee(fee, attribute_incoming);

        let revenue = channels.entry(incoming).or_default();
        revenue.amount_incoming_msat += event.amount_in_msat;
        revenue.fees_incoming_msat += incoming_fee;

        let revenue = channels.entry(outgoing).or_default();
        revenue.amount_outgoing_msat += event.amount_out_msat;
        revenue.fees_outgoing_msat += fee - incoming_fee;
    }

    Ok(RevenueReport { channels })
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn split_fee(fee: u64, share: f64) -> u64 {
    ((fee as f64 * share).round() as u64).min(fee)
}
