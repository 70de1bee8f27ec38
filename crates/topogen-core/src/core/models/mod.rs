//! # Core Models Module
//!
//! This module contains the data structures used to represent a molecule and
//! the internal coordinates derived from its connectivity.
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atom representation with coordinates, element and force-field columns
//! - [`molecule`] - A single molecule with explicit bonds and an optional periodic box
//! - [`topology`] - Canonical internal-coordinate value types (bonds, angles, dihedrals, impropers)
//!
//! ## Usage
//!
//! ```ignore
//! use topogen::core::models::{atom::Atom, molecule::Molecule};
//! use nalgebra::Point3;
//!
//! let mut molecule = Molecule::new();
//! molecule.atoms.push(Atom::new(1, "C1", "C", Point3::new(0.0, 0.0, 0.0)));
//! molecule.atoms.push(Atom::new(2, "C2", "C", Point3::new(1.54, 0.0, 0.0)));
//! molecule.bonds.push((1, 2));
//! ```

pub mod atom;
pub mod molecule;
pub mod topology;
