use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Force-field atom types are required but missing from the input structure")]
    MissingForceFieldTypes,
    #[error("Atom {atom} is referenced by the topology but the structure has only {atom_count} atoms")]
    AtomOutOfRange { atom: usize, atom_count: usize },
}
