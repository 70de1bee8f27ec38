use thiserror::Error;

use super::config::ConfigError;
use super::graph::GraphState;
use crate::core::io::error::WriteError;
use crate::core::models::topology::AtomIndex;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Missing connectivity: {reason}")]
    MissingConnectivity { reason: String },

    #[error(
        "Cannot extend {chain_len}-atom chains to {target_len} atoms from {input_count} input chain(s)"
    )]
    InsufficientChainLength {
        chain_len: usize,
        target_len: usize,
        input_count: usize,
    },

    #[error("Atom index {atom} is out of range (molecule has {atom_count} atoms)")]
    IndexOutOfRange { atom: AtomIndex, atom_count: usize },

    #[error("Atom {atom} is bonded to itself")]
    SelfBond { atom: AtomIndex },

    #[error("Atom {atom} has unknown element symbol '{symbol}'")]
    UnknownElement { atom: AtomIndex, symbol: String },

    #[error("Edge {i}-{j} is not present in the bond graph")]
    EdgeNotFound { i: AtomIndex, j: AtomIndex },

    #[error("Atom {atom} is not present in the bond graph")]
    UnknownAtom { atom: AtomIndex },

    #[error("Graph is not ready (current state: {state})")]
    NotReady { state: GraphState },

    #[error("Invalid build transition from {from} to {to}")]
    InvalidTransition { from: GraphState, to: GraphState },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to write graph: {0}")]
    Write(#[from] WriteError),
}
