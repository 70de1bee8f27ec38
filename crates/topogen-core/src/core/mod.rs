//! # Core Module
//!
//! Stateless building blocks shared by the rest of the library.
//!
//! ## Overview
//!
//! Nothing in this module knows about graph construction order or build
//! states. It holds plain data and pure functions:
//!
//! - **Molecular Representation** ([`models`]) - Atoms, molecules, periodic boxes and
//!   the canonical chain types (bonds, angles, dihedrals, 1-4 pairs, impropers)
//! - **Element Data** ([`elements`]) - Periodic table lookups and van der Waals radii
//!   with user overrides
//! - **File I/O** ([`io`]) - PDB and bond-list readers, graph dump and GROMACS writers
//! - **Geometry** ([`utils`]) - Dihedral angles and minimum-image displacements

pub mod elements;
pub mod io;
pub mod models;
pub mod utils;
