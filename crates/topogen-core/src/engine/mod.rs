//! # Engine Module
//!
//! The stateful graph-derivation engine.
//!
//! ## Overview
//!
//! [`graph::MoleculeGraph`] owns one molecule's connectivity and walks it
//! through a fixed sequence of build stages. Each stage delegates to a
//! focused component:
//!
//! - **Bond Inference** ([`bonding`]) - Distance-based bonds for inputs without connectivity
//! - **Chain Extension** ([`chains`]) - Bonds to angles and angles to dihedrals
//! - **Ring Analysis** ([`rings`]) - Ring membership and ring-closing bonds for 1-4 filtering
//! - **Improper Detection** ([`impropers`]) - Planar trivalent ring centres
//!
//! Supporting modules hold the [`config`], [`error`] types and [`progress`]
//! reporting shared with the workflows.

pub mod bonding;
pub mod chains;
pub mod config;
pub mod error;
pub mod graph;
pub mod impropers;
pub mod progress;
pub mod rings;
