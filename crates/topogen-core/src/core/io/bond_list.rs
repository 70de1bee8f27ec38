use crate::core::models::topology::AtomIndex;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BondListError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Line {line}: expected two atom indices, found '{content}'")]
    Malformed { line: usize, content: String },
    #[error("Line {line}: invalid atom index '{value}'")]
    InvalidIndex { line: usize, value: String },
}

/// Reader for bare bond lists: one `i j` pair of 1-based indices per line.
///
/// Blank lines and lines starting with `#` or `;` are skipped. Pairs are
/// returned as written; canonicalization and validation happen when the
/// graph is built.
pub struct BondListFile;

impl BondListFile {
    pub fn read_from(reader: &mut impl BufRead) -> Result<Vec<(AtomIndex, AtomIndex)>, BondListError> {
        let mut bonds = Vec::new();
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields.len() != 2 {
                return Err(BondListError::Malformed {
                    line: line_num,
                    content: trimmed.to_string(),
                });
            }
            let parse = |value: &str| {
                value
                    .parse::<AtomIndex>()
                    .map_err(|_| BondListError::InvalidIndex {
                        line: line_num,
                        value: value.to_string(),
                    })
            };
            bonds.push((parse(fields[0])?, parse(fields[1])?));
        }
        Ok(bonds)
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<(AtomIndex, AtomIndex)>, BondListError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}
