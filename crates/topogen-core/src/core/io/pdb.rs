use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::{Atom, element_from_atom_name};
use crate::core::models::molecule::{Molecule, PeriodicBox};
use nalgebra::{Point3, Vector3};
use std::collections::{HashMap, HashSet};
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::debug;

const RIGHT_ANGLE_TOLERANCE_DEGREES: f64 = 1e-3;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("CONECT record on line {line} references unknown atom serial {serial}")]
    UnknownSerial { line: usize, serial: usize },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
    #[error(
        "Only orthogonal boxes are supported (CRYST1 angles: {alpha}, {beta}, {gamma})"
    )]
    NonOrthogonalBox { alpha: f64, beta: f64, gamma: f64 },
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for this record (must be at least {min} chars)")]
    LineTooShort { min: usize },
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    line.get(start..end).unwrap_or("").trim()
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

fn parse_int<T: std::str::FromStr>(value: &str, line_num: usize, columns: &str) -> Result<T, PdbError> {
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidInt {
            columns: columns.into(),
            value: value.into(),
        },
    })
}

/// Reader for Protein Data Bank files.
///
/// Only the first model is read. Besides the standard columns, a
/// force-field atom type and optional partial charge may follow column 80 of
/// each ATOM/HETATM record; they are kept only when every atom has them.
pub struct PdbFile;

impl MolecularFile for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<Molecule, Self::Error> {
        let mut molecule = Molecule::new();
        let mut serial_to_index: HashMap<usize, usize> = HashMap::new();
        let mut extra_columns: Vec<Option<(String, Option<f64>)>> = Vec::new();
        let mut temp_conect: Vec<(usize, usize, usize)> = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            match slice_and_trim(&line, 0, 6) {
                "ATOM" | "HETATM" => {
                    if line.len() < 54 {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort { min: 54 },
                        });
                    }

                    let serial: usize = parse_int(slice_and_trim(&line, 6, 11), line_num, "7-11")?;
                    let name = slice_and_trim(&line, 12, 16);
                    if name.is_empty() {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::MissingRequiredField {
                                columns: "13-16".into(),
                            },
                        });
                    }
                    let res_name = slice_and_trim(&line, 17, 20);
                    let res_num_str = slice_and_trim(&line, 22, 26);
                    let residue_number: isize = if res_num_str.is_empty() {
                        0
                    } else {
                        parse_int(res_num_str, line_num, "23-26")?
                    };
                    let x = parse_float(&line, line_num, 30, 38)?;
                    let y = parse_float(&line, line_num, 38, 46)?;
                    let z = parse_float(&line, line_num, 46, 54)?;

                    let element_col = slice_and_trim(&line, 76, 78);
                    let element = if !element_col.is_empty()
                        && element_col.chars().all(|c| c.is_ascii_alphabetic())
                    {
                        element_col.to_string()
                    } else {
                        element_from_atom_name(name).ok_or_else(|| PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::MissingRequiredField {
                                columns: "77-78".into(),
                            },
                        })?
                    };

                    let index = molecule.atoms.len() + 1;
                    if serial_to_index.insert(serial, index).is_some() {
                        return Err(PdbError::Inconsistency(format!(
                            "Duplicate atom serial: {}",
                            serial
                        )));
                    }

                    let mut atom = Atom::new(serial, name, &element, Point3::new(x, y, z));
                    atom.residue_name = res_name.to_string();
                    atom.residue_number = residue_number;
                    molecule.atoms.push(atom);

                    extra_columns.push(parse_force_field_columns(&line, line_num)?);
                }
                "CONECT" => {
                    let parts: Vec<&str> = line.split_whitespace().collect();
                    if parts.len() < 3 {
                        continue;
                    }
                    let origin: usize = parse_int(parts[1], line_num, "7-11")?;
                    for part in &parts[2..] {
                        let target: usize = parse_int(part, line_num, "12-31")?;
                        temp_conect.push((line_num, origin, target));
                    }
                }
                "CRYST1" => {
                    molecule.periodic_box = Some(parse_cryst1(&line, line_num)?);
                }
                "END" | "ENDMDL" => break,
                _ => {}
            }
        }

        if molecule.atoms.is_empty() {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }

        if extra_columns.iter().all(Option::is_some) {
            for (atom, extra) in molecule.atoms.iter_mut().zip(extra_columns) {
                if let Some((ff_type, charge)) = extra {
                    atom.force_field_type = Some(ff_type);
                    atom.partial_charge = Some(charge.unwrap_or(0.0));
                }
            }
        } else {
            debug!("Force-field columns are missing for some atoms; ignoring them.");
        }

        let mut seen = HashSet::new();
        for (line_num, a_serial, b_serial) in temp_conect {
            let resolve = |serial: usize| {
                serial_to_index
                    .get(&serial)
                    .copied()
                    .ok_or(PdbError::UnknownSerial {
                        line: line_num,
                        serial,
                    })
            };
            let a = resolve(a_serial)?;
            let b = resolve(b_serial)?;
            if a == b {
                debug!(serial = a_serial, "Skipping self-referencing CONECT entry.");
                continue;
            }
            let key = (a.min(b), a.max(b));
            if seen.insert(key) {
                molecule.bonds.push(key);
            }
        }
        molecule.bonds.sort_unstable();

        Ok(molecule)
    }
}

fn parse_force_field_columns(
    line: &str,
    line_num: usize,
) -> Result<Option<(String, Option<f64>)>, PdbError> {
    let Some(suffix) = line.get(80..) else {
        return Ok(None);
    };
    let mut keys = suffix.split_whitespace();
    let Some(ff_type) = keys.next() else {
        return Ok(None);
    };
    let charge = match keys.next() {
        Some(value) => Some(value.parse().map_err(|_| PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::InvalidFloat {
                columns: "81-".into(),
                value: value.into(),
            },
        })?),
        None => None,
    };
    Ok(Some((ff_type.to_string(), charge)))
}

fn parse_cryst1(line: &str, line_num: usize) -> Result<PeriodicBox, PdbError> {
    if line.len() < 54 {
        return Err(PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::LineTooShort { min: 54 },
        });
    }
    let a = parse_float(line, line_num, 6, 15)?;
    let b = parse_float(line, line_num, 15, 24)?;
    let c = parse_float(line, line_num, 24, 33)?;
    let alpha = parse_float(line, line_num, 33, 40)?;
    let beta = parse_float(line, line_num, 40, 47)?;
    let gamma = parse_float(line, line_num, 47, 54)?;

    let is_right = |angle: f64| (angle - 90.0).abs() < RIGHT_ANGLE_TOLERANCE_DEGREES;
    if !(is_right(alpha) && is_right(beta) && is_right(gamma)) {
        return Err(PdbError::NonOrthogonalBox { alpha, beta, gamma });
    }
    Ok(PeriodicBox::new(Vector3::new(a, b, c)))
}
