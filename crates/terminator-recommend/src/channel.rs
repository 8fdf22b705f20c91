use std::time::Duration;

use serde::{Deserialize, Serialize};

/// An open channel as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChannelRecord {
    /// Funding outpoint in `<txid>:<index>` form.
    pub channel_point: String,
    /// Seconds the remote peer was online while the channel was monitored.
    pub uptime: u64,
    /// Seconds the channel has been monitored.
    pub lifetime: u64,
    /// Whether the channel is unannounced.
    #[serde(default)]
    pub private: bool,
}

impl ChannelRecord {
    /// How long the channel has been monitored.
    #[must_use]
    pub fn monitored(&self) -> Duration {
        Duration::from_secs(self.lifetime)
    }

    /// Fraction of the monitored lifetime that the peer was online.
    ///
    /// A channel that has not been monitored at all has a ratio of zero.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn uptime_ratio(&self) -> f64 {
        if self.lifetime == 0 {
            return 0.0;
        }
        self.uptime as f64 / self.lifetime as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_ratio() {
        let channel = ChannelRecord {
            channel_point: "a:0".to_owned(),
            uptime: 30,
            lifetime: 120,
            private: false,
        };
        assert_eq!(channel.uptime_ratio(), 0.25);
        assert_eq!(channel.monitored(), Duration::from_secs(120));

        let unmonitored = ChannelRecord {
            lifetime: 0,
            ..channel
        };
        assert_eq!(unmonitored.uptime_ratio(), 0.0);
    }

    #[test]
    fn test_private_defaults_to_false() {
        let channel: ChannelRecord =
            serde_json::from_str(r#"{"channel_point":"a:0","uptime":1,"lifetime":2}"#).unwrap();
        assert!(!channel.private);
    }
}
