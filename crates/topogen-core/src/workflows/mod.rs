//! # Workflows Module
//!
//! High-level entry points that take a parsed input, run the full graph
//! build and hand back the derived internal coordinates.
//!
//! ## Overview
//!
//! - **Topology Workflow** ([`topology`]) - One molecule from coordinates or a bond
//!   list, or a batch of independent molecules built in parallel when the
//!   `parallel` feature is enabled.
//!
//! Workflows report phases and per-stage counts through a
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter) and log
//! their progress with `tracing`.

pub mod topology;
