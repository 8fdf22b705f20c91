//! Robust order statistics for the terminator project.
//!
//! This crate summarizes a one-dimensional set of observations with its median
//! and quartiles, and classifies individual values against that summary using
//! the inter-quartile range (IQR) method.
//!
//! # Modules
//!
//! - [`dataset`]: Median / quartile computation and IQR outlier classification
//!
//! # Examples
//!
//! ```
//! use terminator_stats::dataset::{Dataset, Sensitivity};
//!
//! let dataset = Dataset::new([0.9, 0.91, 0.92, 0.93, 0.94, 0.95, 0.1]).unwrap();
//! assert_eq!(dataset.median(), 0.92);
//!
//! let class = dataset.is_outlier(0.1, Sensitivity::Weak);
//! assert!(class.is_lower());
//! ```

pub mod dataset;
