use super::error::WriteError;
use super::traits::TopologyWriter;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::{AtomIndex, InternalCoordinates};
use std::collections::HashSet;
use std::fmt::Display;
use std::io::Write;

/// Formatting options for a GROMACS topology file.
///
/// Function identifiers are optional; when `None` the corresponding `func`
/// column is omitted. Parameters themselves are never generated.
#[derive(Debug, Clone, PartialEq)]
pub struct GromacsOptions {
    pub molecule_name: String,
    pub nb_func: u8,
    pub comb_rule: u8,
    pub gen_pairs: bool,
    pub fudge_lj: f64,
    pub fudge_qq: f64,
    pub bond_func: Option<u8>,
    pub angle_func: Option<u8>,
    pub dihedral_func: Option<u8>,
    pub improper_func: Option<u8>,
    pub pair_func: Option<u8>,
}

impl Default for GromacsOptions {
    fn default() -> Self {
        Self {
            molecule_name: "MOL".to_string(),
            nb_func: 1,
            comb_rule: 2,
            gen_pairs: true,
            fudge_lj: 0.5,
            fudge_qq: 0.5,
            bond_func: None,
            angle_func: None,
            dihedral_func: None,
            improper_func: None,
            pair_func: None,
        }
    }
}

/// Writes a GROMACS `.top` file for a single molecule.
///
/// Atom types and charges come from the force-field columns of the input
/// structure; bonded type sections list each type tuple once, treating a
/// tuple and its reverse as the same type.
pub struct GromacsTopology<'a> {
    molecule: &'a Molecule,
    options: GromacsOptions,
}

impl<'a> GromacsTopology<'a> {
    pub fn new(molecule: &'a Molecule, options: GromacsOptions) -> Self {
        Self { molecule, options }
    }

    fn atom_types(&self) -> Result<Vec<&'a str>, WriteError> {
        self.molecule
            .atoms
            .iter()
            .map(|a| a.force_field_type.as_deref())
            .collect::<Option<Vec<_>>>()
            .ok_or(WriteError::MissingForceFieldTypes)
    }
}

fn column_header(n_atoms: usize, with_func: bool) -> String {
    let mut columns: Vec<String> = (1..=n_atoms).map(|i| format!("atom{}", i)).collect();
    if with_func {
        columns.push("func".to_string());
    }
    let mut line = format!(";{:>5}", columns[0]);
    for column in &columns[1..] {
        line.push_str(&format!("  {:>6}", column));
    }
    line
}

fn row<T: Display>(fields: &[T], func: Option<u8>) -> String {
    let mut parts: Vec<String> = fields.iter().map(|f| format!("{:>6}", f)).collect();
    if let Some(func) = func {
        parts.push(format!("{:>6}", func));
    }
    parts.join("  ")
}

fn unique_type_tuples<'t, const N: usize>(
    chains: impl Iterator<Item = [AtomIndex; N]>,
    types: &[&'t str],
) -> Vec<[&'t str; N]> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for chain in chains {
        let tuple = chain.map(|atom| types[atom - 1]);
        let mut reversed = tuple;
        reversed.reverse();
        let key = tuple.min(reversed);
        if seen.insert(key) {
            unique.push(tuple);
        }
    }
    unique
}

fn write_section<W: Write, T: Display, const N: usize>(
    writer: &mut W,
    heading: &str,
    rows: &[[T; N]],
    func: Option<u8>,
) -> Result<(), WriteError> {
    writeln!(writer)?;
    writeln!(writer, "{}", heading)?;
    writeln!(writer, "{}", column_header(N, func.is_some()))?;
    for fields in rows {
        writeln!(writer, "{}", row(fields, func))?;
    }
    Ok(())
}

impl TopologyWriter for GromacsTopology<'_> {
    type Error = WriteError;

    fn write_to(
        &self,
        coordinates: &InternalCoordinates,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let types = self.atom_types()?;
        let atom_count = self.molecule.atom_count();
        let out_of_range = coordinates
            .bonds
            .iter()
            .flat_map(|b| b.atoms().iter().copied())
            .chain(coordinates.impropers.iter().flat_map(|i| i.atoms()))
            .find(|&atom| atom == 0 || atom > atom_count);
        if let Some(atom) = out_of_range {
            return Err(WriteError::AtomOutOfRange { atom, atom_count });
        }

        let opts = &self.options;

        writeln!(writer, "[ defaults ]")?;
        writeln!(
            writer,
            ";{:>9}  {:>10}  {:>10}  {:>10}  {:>10}",
            "nbfunc", "comb-rule", "gen-pairs", "fudgeLJ", "fudgeQQ"
        )?;
        writeln!(
            writer,
            "{:>10}  {:>10}  {:>10}  {:>10.4}  {:>10.4}",
            opts.nb_func,
            opts.comb_rule,
            if opts.gen_pairs { "yes" } else { "no" },
            opts.fudge_lj,
            opts.fudge_qq
        )?;

        let mut distinct_types: Vec<&str> = types.clone();
        distinct_types.sort_unstable();
        distinct_types.dedup();
        writeln!(writer)?;
        writeln!(writer, "[ atomtypes ]  ;nAtomTypes:{:>3}", distinct_types.len())?;
        writeln!(
            writer,
            "; name  at.num      mass     charge   ptype     sigma     epsilon"
        )?;
        for atom_type in &distinct_types {
            writeln!(
                writer,
                "{:>6}       0   0.00000    0.00000       A   0.00000     0.00000",
                atom_type
            )?;
        }

        let bond_types = unique_type_tuples(coordinates.bonds.iter().map(|b| *b.atoms()), &types);
        let angle_types =
            unique_type_tuples(coordinates.angles.iter().map(|a| *a.atoms()), &types);
        let dihedral_types =
            unique_type_tuples(coordinates.dihedrals.iter().map(|d| *d.atoms()), &types);
        write_section(
            writer,
            &format!("[ bondtypes ]   ; nBondTypes: {}", bond_types.len()),
            &bond_types,
            opts.bond_func,
        )?;
        write_section(
            writer,
            &format!("[ angletypes ]   ; nAngleTypes: {}", angle_types.len()),
            &angle_types,
            opts.angle_func,
        )?;
        write_section(
            writer,
            &format!("[ dihedraltypes ]   ; nDihedralTypes: {}", dihedral_types.len()),
            &dihedral_types,
            opts.dihedral_func,
        )?;

        writeln!(writer)?;
        writeln!(writer, "[ moleculetype ]")?;
        writeln!(writer, ";name    nrexcl")?;
        writeln!(writer, "{:<8}3  ; Note: Adjust nrexcl", opts.molecule_name)?;

        writeln!(writer)?;
        writeln!(writer, "[ atoms ]   ; nAtoms: {}", atom_count)?;
        writeln!(writer, "; nr  type  resnr residue atom cgnr charge")?;
        for (i, atom) in self.molecule.atoms.iter().enumerate() {
            let id = i + 1;
            writeln!(
                writer,
                "{:>6} {:>10} {:>3} {:>8} {:>8} {:>6} {:>14.8}",
                id,
                types[i],
                atom.residue_number,
                atom.residue_name,
                atom.name,
                id,
                atom.partial_charge.unwrap_or(0.0)
            )?;
        }

        let bonds: Vec<[AtomIndex; 2]> = coordinates.bonds.iter().map(|b| *b.atoms()).collect();
        let angles: Vec<[AtomIndex; 3]> = coordinates.angles.iter().map(|a| *a.atoms()).collect();
        let dihedrals: Vec<[AtomIndex; 4]> =
            coordinates.dihedrals.iter().map(|d| *d.atoms()).collect();
        write_section(
            writer,
            &format!("[ bonds ]   ; nBonds: {}", bonds.len()),
            &bonds,
            opts.bond_func,
        )?;
        write_section(
            writer,
            &format!("[ angles ]   ; nAngles: {}", angles.len()),
            &angles,
            opts.angle_func,
        )?;
        write_section(
            writer,
            &format!("[ dihedrals ]   ; nDihedrals: {}", dihedrals.len()),
            &dihedrals,
            opts.dihedral_func,
        )?;

        if !coordinates.impropers.is_empty() {
            let impropers: Vec<[AtomIndex; 4]> =
                coordinates.impropers.iter().map(|i| i.atoms()).collect();
            writeln!(writer)?;
            writeln!(writer, ";Following are improper dihedrals")?;
            writeln!(writer, "[ dihedrals ]   ; nDihedrals: {}", impropers.len())?;
            writeln!(writer, "{}", column_header(4, opts.improper_func.is_some()))?;
            for fields in &impropers {
                writeln!(writer, "{}", row(fields, opts.improper_func))?;
            }
        }

        let pairs: Vec<[AtomIndex; 2]> =
            coordinates.one_fours.iter().map(|p| *p.atoms()).collect();
        write_section(
            writer,
            &format!("[ pairs ]   ; nPairs: {}", pairs.len()),
            &pairs,
            opts.pair_func,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::topology::{Angle, Bond, Dihedral, Improper, OneFourPair};
    use nalgebra::Point3;

    fn typed_butane() -> (Molecule, InternalCoordinates) {
        let mut molecule = Molecule::new();
        let types = ["CH3", "CH2", "CH2", "CH3"];
        for (i, ff_type) in types.iter().enumerate() {
            let mut atom = Atom::new(i + 1, &format!("C{}", i + 1), "C", Point3::origin());
            atom.residue_name = "BUT".to_string();
            atom.residue_number = 1;
            atom.force_field_type = Some(ff_type.to_string());
            atom.partial_charge = Some(0.0);
            molecule.atoms.push(atom);
        }

        let mut coords = InternalCoordinates::default();
        for (i, j) in [(1, 2), (2, 3), (3, 4)] {
            coords.bonds.insert(Bond::new([i, j]));
            molecule.bonds.push((i, j));
        }
        coords.angles.insert(Angle::new([1, 2, 3]));
        coords.angles.insert(Angle::new([2, 3, 4]));
        coords.dihedrals.insert(Dihedral::new([1, 2, 3, 4]));
        coords.one_fours.insert(OneFourPair::new([1, 4]));
        (molecule, coords)
    }

    fn render(molecule: &Molecule, coords: &InternalCoordinates, options: GromacsOptions) -> String {
        let mut buffer = Vec::new();
        GromacsTopology::new(molecule, options)
            .write_to(coords, &mut buffer)
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn type_tuples_are_deduplicated_under_reversal() {
        let (molecule, coords) = typed_butane();
        let output = render(&molecule, &coords, GromacsOptions::default());

        assert!(output.contains("[ bondtypes ]   ; nBondTypes: 2"));
        assert!(output.contains("[ angletypes ]   ; nAngleTypes: 1"));
        assert!(output.contains("[ dihedraltypes ]   ; nDihedralTypes: 1"));
        assert!(output.contains("[ atomtypes ]  ;nAtomTypes:  2"));
    }

    #[test]
    fn sections_appear_in_gromacs_order() {
        let (molecule, coords) = typed_butane();
        let output = render(&molecule, &coords, GromacsOptions::default());
        let order = [
            "[ defaults ]",
            "[ atomtypes ]",
            "[ bondtypes ]",
            "[ angletypes ]",
            "[ dihedraltypes ]",
            "[ moleculetype ]",
            "[ atoms ]",
            "[ bonds ]",
            "[ angles ]",
            "[ dihedrals ]",
            "[ pairs ]",
        ];
        let positions: Vec<usize> = order.iter().map(|s| output.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(!output.contains("improper"));
    }

    #[test]
    fn function_ids_add_func_column() {
        let (molecule, coords) = typed_butane();
        let options = GromacsOptions {
            bond_func: Some(1),
            pair_func: Some(1),
            ..Default::default()
        };
        let output = render(&molecule, &coords, options);
        assert!(output.contains(";atom1   atom2    func\n     1       2       1\n"));
        assert!(output.contains("[ pairs ]   ; nPairs: 1\n;atom1   atom2    func\n     1       4       1\n"));
    }

    #[test]
    fn atoms_section_lists_types_and_charges() {
        let (molecule, coords) = typed_butane();
        let output = render(&molecule, &coords, GromacsOptions::default());
        let expected = format!(
            "{:>6} {:>10} {:>3} {:>8} {:>8} {:>6} {:>14.8}",
            2, "CH2", 1, "BUT", "C2", 2, 0.0
        );
        assert!(output.contains(&expected));
        assert!(output.contains("MOL     3  ; Note: Adjust nrexcl"));
    }

    #[test]
    fn improper_block_is_written_when_present() {
        let (molecule, mut coords) = typed_butane();
        coords.impropers.push(Improper::new(2, [1, 3, 4]));
        let output = render(&molecule, &coords, GromacsOptions::default());
        assert!(output.contains(
            ";Following are improper dihedrals\n[ dihedrals ]   ; nDihedrals: 1\n"
        ));
        assert!(output.contains("     2       1       3       4\n"));
    }

    #[test]
    fn missing_force_field_types_is_an_error() {
        let (mut molecule, coords) = typed_butane();
        molecule.atoms[2].force_field_type = None;
        let mut buffer = Vec::new();
        let result = GromacsTopology::new(&molecule, GromacsOptions::default())
            .write_to(&coords, &mut buffer);
        assert!(matches!(result, Err(WriteError::MissingForceFieldTypes)));
    }

    #[test]
    fn atoms_beyond_structure_are_rejected() {
        let (molecule, mut coords) = typed_butane();
        coords.bonds.insert(Bond::new([4, 9]));
        let mut buffer = Vec::new();
        let result = GromacsTopology::new(&molecule, GromacsOptions::default())
            .write_to(&coords, &mut buffer);
        assert!(matches!(
            result,
            Err(WriteError::AtomOutOfRange { atom: 9, atom_count: 4 })
        ));
    }
}
