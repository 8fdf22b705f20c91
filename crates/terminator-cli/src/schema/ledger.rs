use serde::{Deserialize, Serialize};
use terminator_accounting::revenue::ForwardingEvent;

/// Channels and forwarding history exported from a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    /// Open and closed channels, used to resolve forwarding events
    pub channels: Vec<LedgerChannel>,
    pub events: Vec<ForwardingEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerChannel {
    /// Short channel id in its integer form
    pub chan_id: u64,
    /// Funding outpoint in `<txid>:<index>` form
    pub channel_point: String,
}
