use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of confirmations a transaction needs to be counted.
pub const DEFAULT_MIN_CONFIRMATIONS: u32 = 1;

/// An on-chain wallet transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OnChainTransaction {
    pub tx_hash: String,
    /// Net amount in satoshis; negative for spends.
    pub amount_sat: i64,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub num_confirmations: u32,
}

/// Returns whether `timestamp` lies in `[start, end)`.
#[must_use]
pub fn in_range(timestamp: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    start <= timestamp && timestamp < end
}

/// Keeps transactions with at least `min_confirmations` confirmations whose
/// timestamp lies in `[start, end)`, preserving their order.
pub fn filter_on_chain<I>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    min_confirmations: u32,
    transactions: I,
) -> Vec<OnChainTransaction>
where
    I: IntoIterator<Item = OnChainTransaction>,
{
    transactions
        .into_iter()
        .filter(|tx| {
            let keep =
                in_range(tx.timestamp, start, end) && tx.num_confirmations >= min_confirmations;
            if !keep {
                tracing::trace!(tx_hash = %tx.tx_hash, "transaction filtered out");
            }
            keep
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_TIME: i64 = 100_000;
    const IN_RANGE_TIME: i64 = 200_000;
    const END_TIME: i64 = 300_000;

    fn time(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn tx(tx_hash: &str, timestamp: i64, num_confirmations: u32) -> OnChainTransaction {
        OnChainTransaction {
            tx_hash: tx_hash.to_owned(),
            amount_sat: 1000,
            timestamp: time(timestamp),
            num_confirmations,
        }
    }

    #[test]
    fn test_in_range() {
        let cases = [
            ("before start time", START_TIME - 100, false),
            ("equals start time", START_TIME, true),
            ("between start and end", IN_RANGE_TIME, true),
            ("equals end time", END_TIME, false),
            ("after end time", END_TIME + 10, false),
        ];

        for (name, timestamp, expected) in cases {
            assert_eq!(
                in_range(time(timestamp), time(START_TIME), time(END_TIME)),
                expected,
                "{name}"
            );
        }
    }

    #[test]
    fn test_filter_on_chain() {
        let confirmed_out_of_range = tx("out-of-range", START_TIME - 10, 1);
        let confirmed = tx("confirmed", IN_RANGE_TIME, 1);
        let unconfirmed = tx("unconfirmed", IN_RANGE_TIME, 0);

        let filtered = filter_on_chain(
            time(START_TIME),
            time(END_TIME),
            DEFAULT_MIN_CONFIRMATIONS,
            [confirmed.clone(), unconfirmed, confirmed_out_of_range],
        );
        assert_eq!(filtered, vec![confirmed]);
    }

    #[test]
    fn test_filter_on_chain_higher_threshold() {
        let filtered = filter_on_chain(
            time(START_TIME),
            time(END_TIME),
            6,
            [
                tx("a", START_TIME, 6),
                tx("b", IN_RANGE_TIME, 5),
                tx("c", END_TIME - 1, 100),
            ],
        );
        let hashes = filtered.iter().map(|tx| tx.tx_hash.as_str()).collect::<Vec<_>>();
        assert_eq!(hashes, ["a", "c"]);
    }

    #[test]
    fn test_timestamp_serialized_as_unix_seconds() {
        let json = serde_json::to_value(tx("a", IN_RANGE_TIME, 1)).unwrap();
        assert_eq!(json["timestamp"], IN_RANGE_TIME);
    }
}
