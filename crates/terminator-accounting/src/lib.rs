//! Accounting helpers for a node's on-chain and forwarding activity.
//!
//! - [`filter`]: Select confirmed on-chain transactions within a time range
//! - [`revenue`]: Page through forwarding history and attribute fees to channels

pub mod filter;
pub mod revenue;
