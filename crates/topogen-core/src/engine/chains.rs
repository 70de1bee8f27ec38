use super::error::GraphError;
use crate::core::models::topology::{AtomIndex, Bond, Chain};
use std::collections::{BTreeMap, BTreeSet};

/// Atom index to bonded neighbours, in the order the bonds were first seen.
pub type Adjacency = BTreeMap<AtomIndex, Vec<AtomIndex>>;

/// Builds the adjacency list from a canonical bond set.
///
/// Bonds are visited in sorted order, so each neighbour list follows the
/// first-seen order of the sorted bond set.
pub fn build_adjacency(bonds: &BTreeSet<Bond>) -> Adjacency {
    let mut adjacency = Adjacency::new();
    for bond in bonds {
        let [i, j] = *bond.atoms();
        adjacency.entry(i).or_default().push(j);
        adjacency.entry(j).or_default().push(i);
    }
    adjacency
}

/// Extends every `N`-atom chain by one bonded atom at either end.
///
/// Neighbours already on the chain are skipped, so no output chain revisits
/// an atom. Results are canonicalized by [`Chain::new`] and collected into a
/// set, which makes the output independent of input order and free of
/// reversed duplicates. Bonds to angles and angles to dihedrals are the two
/// uses.
///
/// # Errors
///
/// Returns [`GraphError::InsufficientChainLength`] when `chains` is empty,
/// when `N < 2`, or when `M != N + 1`.
pub fn extend_chains<const N: usize, const M: usize>(
    chains: &BTreeSet<Chain<N>>,
    adjacency: &Adjacency,
) -> Result<BTreeSet<Chain<M>>, GraphError> {
    if chains.is_empty() || N < 2 || M != N + 1 {
        return Err(GraphError::InsufficientChainLength {
            chain_len: N,
            target_len: M,
            input_count: chains.len(),
        });
    }

    let neighbors = |atom: AtomIndex| adjacency.get(&atom).into_iter().flatten().copied();
    let mut extended = BTreeSet::new();
    for chain in chains {
        let atoms = chain.atoms();

        for next in neighbors(chain.last()).filter(|&n| !chain.contains(n)) {
            let mut longer = [0; M];
            longer[..N].copy_from_slice(atoms);
            longer[N] = next;
            extended.insert(Chain::new(longer));
        }

        for prev in neighbors(chain.first()).filter(|&n| !chain.contains(n)) {
            let mut longer = [0; M];
            longer[0] = prev;
            longer[1..].copy_from_slice(atoms);
            extended.insert(Chain::new(longer));
        }
    }
    Ok(extended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::topology::{Angle, Dihedral};

    fn bonds(pairs: &[(AtomIndex, AtomIndex)]) -> BTreeSet<Bond> {
        pairs.iter().map(|&(i, j)| Bond::new([i, j])).collect()
    }

    fn six_ring_bonds() -> BTreeSet<Bond> {
        bonds(&[(1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 1)])
    }

    #[test]
    fn adjacency_follows_sorted_bond_order() {
        let adjacency = build_adjacency(&bonds(&[(3, 1), (1, 2), (2, 3)]));
        assert_eq!(adjacency[&1], vec![2, 3]);
        assert_eq!(adjacency[&2], vec![1, 3]);
        assert_eq!(adjacency[&3], vec![1, 2]);
    }

    #[test]
    fn single_bond_yields_no_angles() {
        let bonds = bonds(&[(1, 2)]);
        let adjacency = build_adjacency(&bonds);
        let angles = extend_chains::<2, 3>(&bonds, &adjacency).unwrap();
        assert!(angles.is_empty());
    }

    #[test]
    fn propane_yields_one_angle() {
        let bonds = bonds(&[(1, 2), (2, 3)]);
        let adjacency = build_adjacency(&bonds);
        let angles = extend_chains::<2, 3>(&bonds, &adjacency).unwrap();
        assert_eq!(angles.into_iter().collect::<Vec<_>>(), vec![Angle::new([1, 2, 3])]);
    }

    #[test]
    fn six_ring_yields_six_angles_and_six_dihedrals() {
        let bonds = six_ring_bonds();
        let adjacency = build_adjacency(&bonds);
        let angles = extend_chains::<2, 3>(&bonds, &adjacency).unwrap();
        let dihedrals = extend_chains::<3, 4>(&angles, &adjacency).unwrap();

        assert_eq!(angles.len(), 6);
        assert!(angles.contains(&Angle::new([6, 1, 2])));
        assert_eq!(dihedrals.len(), 6);
        assert!(dihedrals.contains(&Dihedral::new([1, 2, 3, 4])));
        assert!(dihedrals.contains(&Dihedral::new([5, 6, 1, 2])));
    }

    #[test]
    fn outputs_are_canonical() {
        let bonds = six_ring_bonds();
        let adjacency = build_adjacency(&bonds);
        let angles = extend_chains::<2, 3>(&bonds, &adjacency).unwrap();
        let dihedrals = extend_chains::<3, 4>(&angles, &adjacency).unwrap();
        assert!(angles.iter().all(|a| a.first() <= a.last()));
        assert!(dihedrals.iter().all(|d| d.first() <= d.last()));
        for dihedral in &dihedrals {
            let mut reversed = *dihedral.atoms();
            reversed.reverse();
            assert_eq!(Dihedral::new(reversed), *dihedral);
        }
    }

    #[test]
    fn extension_is_independent_of_bond_order() {
        let forward = [(1, 2), (2, 3), (3, 4), (2, 5), (5, 6)];
        let mut shuffled = forward;
        shuffled.reverse();
        shuffled.swap(0, 2);
        let shuffled: Vec<_> = shuffled.iter().map(|&(i, j)| (j, i)).collect();

        let derive = |pairs: &[(AtomIndex, AtomIndex)]| {
            let bonds = bonds(pairs);
            let adjacency = build_adjacency(&bonds);
            let angles = extend_chains::<2, 3>(&bonds, &adjacency).unwrap();
            let dihedrals = extend_chains::<3, 4>(&angles, &adjacency).unwrap();
            (angles, dihedrals)
        };
        assert_eq!(derive(&forward[..]), derive(&shuffled[..]));
    }

    #[test]
    fn disconnected_fragments_never_mix() {
        let bonds = bonds(&[(1, 2), (2, 3), (10, 11), (11, 12)]);
        let adjacency = build_adjacency(&bonds);
        let angles = extend_chains::<2, 3>(&bonds, &adjacency).unwrap();
        assert_eq!(
            angles.into_iter().collect::<Vec<_>>(),
            vec![Angle::new([1, 2, 3]), Angle::new([10, 11, 12])]
        );
    }

    #[test]
    fn empty_input_is_rejected() {
        let empty: BTreeSet<Bond> = BTreeSet::new();
        let result = extend_chains::<2, 3>(&empty, &Adjacency::new());
        assert!(matches!(
            result,
            Err(GraphError::InsufficientChainLength {
                chain_len: 2,
                target_len: 3,
                input_count: 0
            })
        ));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let bonds = bonds(&[(1, 2), (2, 3)]);
        let adjacency = build_adjacency(&bonds);
        assert!(extend_chains::<2, 4>(&bonds, &adjacency).is_err());

        let singles: BTreeSet<Chain<1>> = [Chain::new([1])].into_iter().collect();
        assert!(extend_chains::<1, 2>(&singles, &adjacency).is_err());
    }
}
