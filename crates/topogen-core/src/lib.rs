//! # TopoGen Core Library
//!
//! Derives the bonded internal coordinates of a molecule (bonds, angles,
//! proper dihedrals, 1-4 pairs and optionally improper dihedrals) from its
//! connectivity, and writes them out for molecular mechanics setups.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three-layer split throughout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Molecule`, `Chain`,
//!   `InternalCoordinates`), element data, geometry helpers and file I/O.
//!
//! - **[`engine`]: The Logic Core.** The stateful `MoleculeGraph` and the
//!   algorithms it runs while moving through its build states: bond inference,
//!   ring analysis, chain extension and improper detection.
//!
//! - **[`workflows`]: The Public API.** Complete procedures that read an input,
//!   build the graph, report progress and write the requested outputs, for one
//!   molecule or a batch of them.

pub mod core;
pub mod engine;
pub mod workflows;
