//! Data models for configuration and reports.

pub mod config;
pub mod report;
