use super::chains::Adjacency;
use super::error::GraphError;
use crate::core::models::topology::AtomIndex;
use std::collections::{HashSet, VecDeque};

/// Answers ring-membership and ring-closure queries over a bond graph.
///
/// The analyzer owns the adjacency list. Every query keeps its traversal
/// state local, so results do not depend on earlier queries or their order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RingAnalyzer {
    adjacency: Adjacency,
}

impl RingAnalyzer {
    pub fn new(adjacency: Adjacency) -> Self {
        Self { adjacency }
    }

    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Returns `true` if `atom` lies on at least one cycle.
    ///
    /// Depth-first traversal from `atom` that never steps back along the edge
    /// it just arrived by; the atom is a ring member iff the walk returns to
    /// it through some other edge.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownAtom`] if `atom` has no bonds.
    pub fn is_ring_member(&self, atom: AtomIndex) -> Result<bool, GraphError> {
        if !self.adjacency.contains_key(&atom) {
            return Err(GraphError::UnknownAtom { atom });
        }

        let mut visited = HashSet::new();
        let mut stack: Vec<(AtomIndex, Option<AtomIndex>)> = vec![(atom, None)];
        while let Some((node, parent)) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            for &next in self.neighbors(node) {
                if Some(next) == parent {
                    continue;
                }
                if next == atom {
                    return Ok(true);
                }
                if !visited.contains(&next) {
                    stack.push((next, Some(node)));
                }
            }
        }
        Ok(false)
    }

    /// Returns `true` if `j` stays reachable from `i` once the edge `i-j` is
    /// removed, i.e. the bond closes a ring.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EdgeNotFound`] if the two atoms are not bonded;
    /// the adjacency list is left untouched in that case.
    pub fn is_form_ring(&mut self, i: AtomIndex, j: AtomIndex) -> Result<bool, GraphError> {
        self.with_edge_removed(i, j, |adjacency| reachable(adjacency, i, j))
    }

    /// Runs `f` on the adjacency list with edge `i-j` temporarily removed.
    ///
    /// The edge is put back at its original positions when the guard drops,
    /// including when `f` panics.
    pub(crate) fn with_edge_removed<R>(
        &mut self,
        i: AtomIndex,
        j: AtomIndex,
        f: impl FnOnce(&Adjacency) -> R,
    ) -> Result<R, GraphError> {
        let guard = RemovedEdge::remove(&mut self.adjacency, i, j)?;
        Ok(f(&*guard.adjacency))
    }

    fn neighbors(&self, atom: AtomIndex) -> &[AtomIndex] {
        self.adjacency.get(&atom).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn reachable(adjacency: &Adjacency, from: AtomIndex, to: AtomIndex) -> bool {
    let mut visited = HashSet::from([from]);
    let mut queue = VecDeque::from([from]);
    while let Some(node) = queue.pop_front() {
        if node == to {
            return true;
        }
        for &next in adjacency.get(&node).into_iter().flatten() {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}

/// Holds an edge out of the adjacency list and restores it on drop.
struct RemovedEdge<'a> {
    adjacency: &'a mut Adjacency,
    i: AtomIndex,
    j: AtomIndex,
    pos_in_i: usize,
    pos_in_j: usize,
}

impl<'a> RemovedEdge<'a> {
    fn remove(adjacency: &'a mut Adjacency, i: AtomIndex, j: AtomIndex) -> Result<Self, GraphError> {
        let position = |from: AtomIndex, to: AtomIndex| {
            adjacency
                .get(&from)
                .and_then(|neighbors| neighbors.iter().position(|&n| n == to))
        };
        let (Some(pos_in_i), Some(pos_in_j)) = (position(i, j), position(j, i)) else {
            return Err(GraphError::EdgeNotFound { i, j });
        };

        if let Some(neighbors) = adjacency.get_mut(&i) {
            neighbors.remove(pos_in_i);
        }
        if let Some(neighbors) = adjacency.get_mut(&j) {
            neighbors.remove(pos_in_j);
        }
        Ok(Self {
            adjacency,
            i,
            j,
            pos_in_i,
            pos_in_j,
        })
    }
}

impl Drop for RemovedEdge<'_> {
    fn drop(&mut self) {
        if let Some(neighbors) = self.adjacency.get_mut(&self.i) {
            neighbors.insert(self.pos_in_i, self.j);
        }
        if let Some(neighbors) = self.adjacency.get_mut(&self.j) {
            neighbors.insert(self.pos_in_j, self.i);
        }
    }
}
