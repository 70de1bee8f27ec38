use super::error::WriteError;
use super::traits::TopologyWriter;
use crate::core::models::topology::{AtomIndex, InternalCoordinates};
use std::io::Write;

/// Plain columnar dump of every derived internal-coordinate set.
///
/// Each section starts with a count comment (`#nBonds: N`, `#nAngles: N`,
/// `#nDihedrals: N`, `#nImDihedrals: N`, `#n14s: N`) followed by one
/// whitespace-separated index tuple per line. The improper section is only
/// written for graphs built from a geometry source.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphDump {
    pub include_impropers: bool,
}

impl GraphDump {
    pub fn new(include_impropers: bool) -> Self {
        Self { include_impropers }
    }
}

fn write_rows<'a, W, I, const N: usize>(
    writer: &mut W,
    label: &str,
    count: usize,
    rows: I,
) -> Result<(), WriteError>
where
    W: Write,
    I: Iterator<Item = &'a [AtomIndex; N]>,
{
    writeln!(writer, "#{}: {}", label, count)?;
    for row in rows {
        let fields: Vec<String> = row.iter().map(|a| format!("{:>6}", a)).collect();
        writeln!(writer, "{}", fields.join("  "))?;
    }
    Ok(())
}

impl TopologyWriter for GraphDump {
    type Error = WriteError;

    fn write_to(
        &self,
        coordinates: &InternalCoordinates,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        write_rows(
            writer,
            "nBonds",
            coordinates.bonds.len(),
            coordinates.bonds.iter().map(|b| b.atoms()),
        )?;
        writeln!(writer)?;
        write_rows(
            writer,
            "nAngles",
            coordinates.angles.len(),
            coordinates.angles.iter().map(|a| a.atoms()),
        )?;
        writeln!(writer)?;
        write_rows(
            writer,
            "nDihedrals",
            coordinates.dihedrals.len(),
            coordinates.dihedrals.iter().map(|d| d.atoms()),
        )?;
        writeln!(writer)?;

        if self.include_impropers {
            let impropers: Vec<[AtomIndex; 4]> =
                coordinates.impropers.iter().map(|i| i.atoms()).collect();
            write_rows(writer, "nImDihedrals", impropers.len(), impropers.iter())?;
            writeln!(writer)?;
        }

        write_rows(
            writer,
            "n14s",
            coordinates.one_fours.len(),
            coordinates.one_fours.iter().map(|p| p.atoms()),
        )?;
        Ok(())
    }
}
