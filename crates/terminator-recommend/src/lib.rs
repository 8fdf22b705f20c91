//! Channel close recommendations based on uptime outliers.
//!
//! Only channels that have been monitored for a sane period of time are
//! considered. Their uptime ratios form a [`Dataset`](terminator_stats::dataset::Dataset),
//! and channels whose uptime is a lower outlier within it are recommended for
//! closing.
//!
//! ```
//! use std::time::Duration;
//!
//! use terminator_recommend::{
//!     ChannelRecord, CloseRecommendationConfig, close_recommendations_from, outpoint::OutPoint,
//! };
//! use terminator_stats::dataset::Sensitivity;
//!
//! let channels = ["a:0", "b:0", "c:0", "d:0", "e:0", "f:0", "10:1"]
//!     .into_iter()
//!     .zip([90, 91, 92, 93, 94, 95, 10])
//!     .map(|(point, uptime)| ChannelRecord {
//!         channel_point: point.to_owned(),
//!         uptime,
//!         lifetime: 100,
//!         private: false,
//!     })
//!     .collect();
//!
//! let config = CloseRecommendationConfig {
//!     sensitivity: Sensitivity::Weak,
//!     minimum_monitored: Duration::from_secs(60),
//!     exclude_private: true,
//! };
//! let report = close_recommendations_from(&config, channels).unwrap();
//! assert_eq!(report.considered_channels, 7);
//! assert_eq!(report.recommendations.len(), 1);
//! let closing: OutPoint = "10:1".parse().unwrap();
//! assert!(report.recommendations[&closing]);
//! ```

pub use self::{channel::*, pipeline::*};

mod channel;
pub mod outpoint;
mod pipeline;
