//! Provides input/output functionality for molecular file formats.
//!
//! Readers turn PDB structures and bare bond lists into the in-memory
//! models consumed by the engine. Writers format a derived set of internal
//! coordinates, either as the plain graph dump or as a GROMACS topology.
//! Both directions go through the traits in [`traits`].

pub mod bond_list;
pub mod error;
pub mod graph_dump;
pub mod gromacs;
pub mod pdb;
pub mod traits;
