//! Comparative bar charts from I/O scheduler benchmark reports.
//!
//! A report compares how I/O schedulers affect the throughput or latency of
//! a target workload while other workloads interfere. The pipeline runs
//! report parsing ([`report`]), matrix building ([`matrix`]), per-subplot
//! geometry and label placement ([`layout`]), chart composition with a
//! unified axis range ([`chart`]) and finally plotters-backed output
//! ([`render`]). Everything up to `render` is a pure transformation over
//! in-memory data.

pub mod chart;
pub mod error;
pub mod layout;
pub mod matrix;
pub mod render;
pub mod report;
