//! Shared numerical helpers used by bond inference and improper detection.

pub mod geometry;
