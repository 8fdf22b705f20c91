use std::{collections::BTreeMap, convert::Infallible, error::Error, time::Duration};

use serde::{Deserialize, Serialize};
use terminator_stats::dataset::{Dataset, OutlierClass, Sensitivity, TooFewValuesError};

use crate::{
    channel::ChannelRecord,
    outpoint::{OutPoint, ParseOutPointError},
};

/// Error type produced by channel sources.
pub type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum RecommendError {
    #[display("must provide a non-zero minimum monitored duration for channel exclusion")]
    ZeroMinimumMonitored,
    #[display("failed to list open channels: {cause}")]
    ListChannels { cause: BoxError },
    #[display("malformed channel point {channel_point:?}: {source}")]
    MalformedChannelPoint {
        channel_point: String,
        source: ParseOutPointError,
    },
    #[display("too few eligible channels to compare uptime: {_0}")]
    TooFewChannels(TooFewValuesError),
}

/// Parameters for [`close_recommendations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseRecommendationConfig {
    /// How far below the uptime distribution a channel must be to be closed.
    pub sensitivity: Sensitivity,
    /// Minimum time a channel must have been monitored to be considered.
    pub minimum_monitored: Duration,
    /// Leave private channels out of consideration.
    pub exclude_private: bool,
}

/// Close recommendations and the number of channels they were drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Report {
    /// Number of open channels.
    pub total_channels: usize,
    /// Number of channels that passed the eligibility filter.
    pub considered_channels: usize,
    /// Channels recommended for closing. Only lower outliers are present, each
    /// mapped to `true`.
    pub recommendations: BTreeMap<OutPoint, bool>,
}

/// Recommends channels to close because their uptime ratio is a lower outlier
/// among all eligible channels.
///
/// `open_channels` is called once to fetch the channels. Its error is passed
/// through unchanged inside [`RecommendError::ListChannels`].
pub fn close_recommendations<F, E>(
    config: &CloseRecommendationConfig,
    open_channels: F,
) -> Result<Report, RecommendError>
where
    F: FnOnce() -> Result<Vec<ChannelRecord>, E>,
    E: Into<BoxError>,
{
    if config.minimum_monitored.is_zero() {
        return Err(RecommendError::ZeroMinimumMonitored);
    }

    let channels = open_channels().map_err(|e| RecommendError::ListChannels { cause: e.into() })?;
    let stats = ChannelStats::collect(&channels, config)?;

    let recommendations = close_recs(&stats.channel_uptimes, |uptime| {
        stats.uptime_dataset.is_outlier(uptime, config.sensitivity)
    });

    Ok(Report {
        total_channels: stats.total,
        considered_channels: stats.channel_uptimes.len(),
        recommendations,
    })
}

/// Runs [`close_recommendations`] over an already fetched channel list.
pub fn close_recommendations_from(
    config: &CloseRecommendationConfig,
    channels: Vec<ChannelRecord>,
) -> Result<Report, RecommendError> {
    close_recommendations(config, || Ok::<_, Infallible>(channels))
}

/// Maps every lower outlier to `true`; all other channels are left out.
fn close_recs<K, F>(uptimes: &BTreeMap<K, f64>, classify: F) -> BTreeMap<K, bool>
where
    K: Ord + Clone,
    F: Fn(f64) -> OutlierClass,
{
    uptimes
        .iter()
        .filter(|&(_, &uptime)| classify(uptime).is_lower())
        .map(|(channel, _)| (channel.clone(), true))
        .collect()
}

#[derive(Debug)]
struct ChannelStats {
    total: usize,
    /// Uptime ratio of every eligible channel.
    channel_uptimes: BTreeMap<OutPoint, f64>,
    uptime_dataset: Dataset,
}

impl ChannelStats {
    fn collect(
        channels: &[ChannelRecord],
        config: &CloseRecommendationConfig,
    ) -> Result<Self, RecommendError> {
        let mut channel_uptimes = BTreeMap::new();

        for channel in channels {
            let outpoint = channel.channel_point.parse::<OutPoint>().map_err(|source| {
                RecommendError::MalformedChannelPoint {
                    channel_point: channel.channel_point.clone(),
                    source,
                }
            })?;

            if channel.monitored() < config.minimum_monitored {
                tracing::trace!(
                    %outpoint,
                    "channel has not been monitored for long enough, excluding it from consideration"
                );
                continue;
            }
            if config.exclude_private && channel.private {
                tracing::trace!(%outpoint, "private channel excluded from consideration");
                continue;
            }

            let uptime = channel.uptime_ratio();
            tracing::trace!(%outpoint, uptime, "channel uptime ratio");
            if channel_uptimes.insert(outpoint, uptime).is_some() {
                tracing::warn!(%outpoint, "duplicate channel point, keeping the last record");
            }
        }

        tracing::debug!(
            considered = channel_uptimes.len(),
            total = channels.len(),
            "channels considered for close"
        );

        let uptime_dataset = Dataset::new(channel_uptimes.values().copied())
            .map_err(RecommendError::TooFewChannels)?;

        Ok(Self {
            total: channels.len(),
            channel_uptimes,
            uptime_dataset,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Debug, derive_more::Display, derive_more::Error)]
    #[display("intentional test error")]
    struct TestError;

    const HOUR: u64 = 60 * 60;

    fn channel(channel_point: &str, uptime_ratio: f64, lifetime: u64) -> ChannelRecord {
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_precision_loss,
            clippy::cast_sign_loss
        )]
        let uptime = (uptime_ratio * lifetime as f64).round() as u64;
        ChannelRecord {
            channel_point: channel_point.to_owned(),
            uptime,
            lifetime,
            private: false,
        }
    }

    fn config(minimum_monitored: Duration) -> CloseRecommendationConfig {
        CloseRecommendationConfig {
            sensitivity: Sensitivity::Weak,
            minimum_monitored,
            exclude_private: true,
        }
    }

    fn outpoint(s: &str) -> OutPoint {
        s.parse().unwrap()
    }

    #[test]
    fn test_zero_minimum_monitored() {
        let called = Cell::new(false);
        let err = close_recommendations(&config(Duration::ZERO), || {
            called.set(true);
            Ok::<_, Infallible>(vec![])
        })
        .unwrap_err();
        assert!(matches!(err, RecommendError::ZeroMinimumMonitored));
        assert!(!called.get());
    }

    #[test]
    fn test_list_channels_error_is_passed_through() {
        let err = close_recommendations(&config(Duration::from_secs(HOUR)), || {
            Err::<Vec<ChannelRecord>, _>(TestError)
        })
        .unwrap_err();
        match err {
            RecommendError::ListChannels { cause } => {
                assert!(cause.downcast_ref::<TestError>().is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_channels() {
        let err = close_recommendations_from(&config(Duration::from_secs(HOUR)), vec![]).unwrap_err();
        assert!(matches!(
            err,
            RecommendError::TooFewChannels(TooFewValuesError { count: 0 })
        ));
    }

    #[test]
    fn test_too_few_monitored_channels() {
        let channels = vec![
            channel("a:1", 0.9, 2 * HOUR),
            channel("b:2", 0.9, 2 * HOUR),
            channel("c:3", 0.1, HOUR / 2),
        ];
        let err = close_recommendations_from(&config(Duration::from_secs(HOUR)), channels)
            .unwrap_err();
        assert!(matches!(
            err,
            RecommendError::TooFewChannels(TooFewValuesError { count: 2 })
        ));
    }

    #[test]
    fn test_malformed_channel_point_aborts() {
        let channels = vec![
            channel("a:1", 0.9, 2 * HOUR),
            channel("b:2", 0.9, 2 * HOUR),
            channel("c:3", 0.9, 2 * HOUR),
            // Not yet eligible, but still rejected.
            channel("d", 0.9, 0),
        ];
        let err = close_recommendations_from(&config(Duration::from_secs(HOUR)), channels)
            .unwrap_err();
        match err {
            RecommendError::MalformedChannelPoint {
                channel_point,
                source,
            } => {
                assert_eq!(channel_point, "d");
                assert_eq!(source, ParseOutPointError::PartCount { found: 1 });
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_three_channels_have_no_lower_outlier() {
        // With three values the lowest one is the lower quartile itself.
        let channels = vec![
            channel("a:1", 0.9, 2 * HOUR),
            channel("b:2", 0.9, 2 * HOUR),
            channel("c:3", 0.1, 2 * HOUR),
        ];
        let report =
            close_recommendations_from(&config(Duration::from_secs(HOUR)), channels).unwrap();
        assert_eq!(report.total_channels, 3);
        assert_eq!(report.considered_channels, 3);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_lower_outlier_recommended() {
        let mut channels = ["a:1", "b:2", "d:4", "e:5", "f:6", "ab:7"]
            .into_iter()
            .zip([0.9, 0.91, 0.92, 0.93, 0.94, 0.95])
            .map(|(point, uptime)| channel(point, uptime, 2 * HOUR))
            .collect::<Vec<_>>();
        channels.push(channel("c:3", 0.1, 2 * HOUR));
        // Monitored too briefly to count, despite zero uptime.
        channels.push(channel("ee:8", 0.0, HOUR - 1));

        for sensitivity in [Sensitivity::Weak, Sensitivity::Strong] {
            let config = CloseRecommendationConfig {
                sensitivity,
                ..config(Duration::from_secs(HOUR))
            };
            let report = close_recommendations_from(&config, channels.clone()).unwrap();
            assert_eq!(report.total_channels, 8);
            assert_eq!(report.considered_channels, 7);
            assert_eq!(
                report.recommendations,
                BTreeMap::from([(outpoint("c:3"), true)])
            );
        }
    }

    #[test]
    fn test_private_channels() {
        let mut channels = vec![
            channel("a:1", 0.9, 2 * HOUR),
            channel("b:2", 0.9, 2 * HOUR),
            channel("c:3", 0.9, 2 * HOUR),
            channel("d:4", 0.9, 2 * HOUR),
        ];
        channels[3].private = true;

        let minimum = Duration::from_secs(HOUR);
        let report = close_recommendations_from(&config(minimum), channels.clone()).unwrap();
        assert_eq!(report.considered_channels, 3);

        let include_private = CloseRecommendationConfig {
            exclude_private: false,
            ..config(minimum)
        };
        let report = close_recommendations_from(&include_private, channels).unwrap();
        assert_eq!(report.considered_channels, 4);
    }

    #[test]
    fn test_identical_inputs_give_identical_reports() {
        let channels = ["a:1", "b:2", "c:3", "d:4", "e:5"]
            .into_iter()
            .zip([0.2, 0.9, 0.85, 0.95, 0.88])
            .map(|(point, uptime)| channel(point, uptime, 3 * HOUR))
            .collect::<Vec<_>>();
        let config = config(Duration::from_secs(HOUR));

        let first = close_recommendations(&config, || Ok::<_, Infallible>(channels.clone()));
        let second = close_recommendations(&config, || Ok::<_, Infallible>(channels.clone()));
        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[test]
    fn test_close_recs_only_lower_outliers() {
        let uptimes = BTreeMap::from([(1, 0.1), (2, 0.5), (3, 0.99)]);
        let recs = close_recs(&uptimes, |uptime| {
            if uptime < 0.2 {
                OutlierClass::Lower
            } else if uptime > 0.9 {
                OutlierClass::Upper
            } else {
                OutlierClass::Inlier
            }
        });
        assert_eq!(recs, BTreeMap::from([(1, true)]));

        let recs = close_recs(&uptimes, |_| OutlierClass::Inlier);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_report_json_shape() {
        let report = Report {
            total_channels: 4,
            considered_channels: 3,
            recommendations: BTreeMap::from([(outpoint("1:2"), true)]),
        };
        let json = serde_json::to_value(&report).unwrap();
        let key = format!("{}01:2", "0".repeat(62));
        assert_eq!(json["total_channels"], 4);
        assert_eq!(json["considered_channels"], 3);
        assert_eq!(json["recommendations"][&key], true);
    }
}
