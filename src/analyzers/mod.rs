//! Grade normalization, conversion and aggregation.
//!
//! This module turns raw transcript scores into typed values, converts them
//! to grade points, computes credit-weighted averages per period and overall,
//! ranks courses within each period, and bins percentages into a histogram.
//! [`analyzer::analyze`] runs the whole pipeline in one pass.

pub mod aggregate;
pub mod analyzer;
pub mod distribution;
pub mod grade;
pub mod normalize;
pub mod rank;
pub mod types;
