use crate::core::models::molecule::Molecule;
use crate::core::models::topology::InternalCoordinates;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading molecular structure files.
///
/// Implementors handle format-specific parsing and always hand back a
/// complete [`Molecule`]; partially parsed records never reach the engine.
pub trait MolecularFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a molecule from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered reader to read from.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<Molecule, Self::Error>;

    /// Reads a molecule from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Molecule, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

/// Defines the interface for formatting derived internal coordinates.
pub trait TopologyWriter {
    /// The error type for write operations.
    type Error: Error + From<io::Error>;

    /// Writes the internal coordinates to a writer.
    ///
    /// # Arguments
    ///
    /// * `coordinates` - The derived internal coordinates of one molecule.
    /// * `writer` - The writer to output to.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or required data is missing.
    fn write_to(
        &self,
        coordinates: &InternalCoordinates,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes the internal coordinates to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        &self,
        coordinates: &InternalCoordinates,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(coordinates, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
