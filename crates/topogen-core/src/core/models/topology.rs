use std::collections::BTreeSet;
use std::fmt;

/// A 1-based atom index, the only atom identifier used by the graph engine.
pub type AtomIndex = usize;

/// An ordered tuple of bonded atoms stored in its canonical orientation.
///
/// A chain of `N` atoms describes one internal coordinate: two atoms form a
/// bond, three an angle and four a proper dihedral. The canonical orientation
/// keeps the first index no greater than the last one; any chain and its
/// reverse therefore compare equal after construction, which lets ordinary
/// sets perform orientation-independent deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Chain<const N: usize>([AtomIndex; N]);

/// A covalent bond between two atoms.
pub type Bond = Chain<2>;
/// A bond angle `i-j-k` centred on `j`.
pub type Angle = Chain<3>;
/// A proper dihedral along the bonded chain `i-j-k-l`.
pub type Dihedral = Chain<4>;
/// The two terminal atoms of a dihedral, tracked for scaled nonbonded terms.
pub type OneFourPair = Chain<2>;

impl<const N: usize> Chain<N> {
    /// Creates a chain in canonical orientation, reversing the atoms if the
    /// first index is greater than the last.
    pub fn new(mut atoms: [AtomIndex; N]) -> Self {
        if N > 1 && atoms[0] > atoms[N - 1] {
            atoms.reverse();
        }
        Self(atoms)
    }

    pub fn atoms(&self) -> &[AtomIndex; N] {
        &self.0
    }

    pub fn first(&self) -> AtomIndex {
        self.0[0]
    }

    pub fn last(&self) -> AtomIndex {
        self.0[N - 1]
    }

    pub fn contains(&self, atom: AtomIndex) -> bool {
        self.0.contains(&atom)
    }

    /// Returns the pair formed by the two terminal atoms.
    pub fn ends(&self) -> OneFourPair {
        Chain::new([self.first(), self.last()])
    }
}

impl Chain<4> {
    /// Returns the two central atoms `(j, k)` of a dihedral `i-j-k-l`.
    pub fn middle(&self) -> (AtomIndex, AtomIndex) {
        (self.0[1], self.0[2])
    }
}

impl<const N: usize> From<[AtomIndex; N]> for Chain<N> {
    fn from(atoms: [AtomIndex; N]) -> Self {
        Self::new(atoms)
    }
}

impl<const N: usize> fmt::Display for Chain<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(|a| a.to_string()).collect();
        write!(f, "{}", joined.join("-"))
    }
}

/// An improper dihedral around a trivalent, near-planar ring centre.
///
/// No canonical orientation is imposed: substituents keep the order in which
/// their bonds to the centre were first seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Improper {
    pub center: AtomIndex,
    pub substituents: [AtomIndex; 3],
}

impl Improper {
    pub fn new(center: AtomIndex, substituents: [AtomIndex; 3]) -> Self {
        Self {
            center,
            substituents,
        }
    }

    /// Returns the atoms in `(center, sub1, sub2, sub3)` order.
    pub fn atoms(&self) -> [AtomIndex; 4] {
        let [a, b, c] = self.substituents;
        [self.center, a, b, c]
    }
}

impl fmt::Display for Improper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.substituents;
        write!(f, "{}({}, {}, {})", self.center, a, b, c)
    }
}

/// Number of entries in each derived internal-coordinate set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinateCounts {
    pub bonds: usize,
    pub angles: usize,
    pub dihedrals: usize,
    pub impropers: usize,
    pub one_fours: usize,
}

/// The full set of internal coordinates derived for one molecule.
///
/// Chain-like sets are ordered by their canonical tuples, which is also the
/// order in which topology writers emit them. Impropers keep detection order
/// (ascending centre index).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InternalCoordinates {
    pub bonds: BTreeSet<Bond>,
    pub angles: BTreeSet<Angle>,
    pub dihedrals: BTreeSet<Dihedral>,
    pub one_fours: BTreeSet<OneFourPair>,
    pub impropers: Vec<Improper>,
}

impl InternalCoordinates {
    pub fn counts(&self) -> CoordinateCounts {
        CoordinateCounts {
            bonds: self.bonds.len(),
            angles: self.angles.len(),
            dihedrals: self.dihedrals.len(),
            impropers: self.impropers.len(),
            one_fours: self.one_fours.len(),
        }
    }
}
