//! Inspection analytics for the QCForge dashboard.
//!
//! Raw backend records flow one way: [`normalize`] turns them into uniform
//! `(timestamp, category, score)` tuples, [`rollup`] groups those by
//! category or calendar day, and [`format`] maps the rollups to display
//! rows. Every step is a pure function of its input.

pub mod config;
pub mod db;
pub mod drawback;
pub mod error;
pub mod format;
pub mod models;
pub mod normalize;
pub mod report;
pub mod rollup;
pub mod stats;

pub use error::{AnalyticsError, Result};
pub use format::{assign_display_color, with_percentage_of_total, Palette};
pub use rollup::{group_by_category, group_by_day, weekly_trend};
