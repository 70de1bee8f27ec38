pub mod batch;
pub mod graph;
pub mod gromacs;

use crate::error::{CliError, Result};
use std::path::Path;
use topogen::core::io::bond_list::BondListFile;
use topogen::core::io::pdb::PdbFile;
use topogen::core::io::traits::MolecularFile;
use topogen::core::models::molecule::Molecule;
use topogen::core::models::topology::AtomIndex;
use tracing::info;

/// A parsed input file: coordinates or a bare bond list.
pub enum Input {
    Structure(Molecule),
    BondList(Vec<(AtomIndex, AtomIndex)>),
}

pub fn is_structure_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdb") || ext.eq_ignore_ascii_case("ent"))
}

pub fn read_structure(path: &Path) -> Result<Molecule> {
    info!("Loading input structure from {:?}", path);
    PdbFile::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

pub fn read_input(path: &Path) -> Result<Input> {
    if is_structure_file(path) {
        return read_structure(path).map(Input::Structure);
    }
    info!("Loading bond list from {:?}", path);
    BondListFile::read_from_path(path)
        .map(Input::BondList)
        .map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
}
