//! fxboard Library
//!
//! USD/JPY vs KRW rate board: bank notice boards, a reference market rate
//! and an exchange ticker merged into one snapshot, rendered as a chat report
//! or served as JSON.

pub mod config;
pub mod notify;
pub mod oracle;
pub mod report;
pub mod types;

#[cfg(feature = "dashboard")]
pub mod dashboard;
