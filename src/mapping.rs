//! Partial mappings and how they grow.
//!
//! A partial mapping is a sequence of target atoms; its `i`-th entry is the
//! image of the `i`-th atom of the reference's breadth-first order. Mappings
//! are never modified in place: [`MappingProblem::extend`] yields new ones.

use std::{collections::BTreeMap, fmt::Display};

use crate::{molecule::MolecularGraph, utils::bfs_order};

/// A reference molecule, a target molecule and the fixed order in which
/// reference atoms are assigned.
#[derive(Debug, Clone)]
pub struct MappingProblem<'a, G> {
    pub(crate) reference: &'a G,
    pub(crate) target: &'a G,
    order: Vec<usize>,
}

/// Result of asking for the extensions of a partial mapping.
pub enum Extension<'m> {
    /// Every atom of the breadth-first order has already been assigned.
    Complete,
    /// One extended mapping per target atom that could take the next
    /// reference atom.
    Candidates(Candidates<'m>),
}

/// Lazily builds `prefix + [candidate]` for each remaining candidate.
pub struct Candidates<'m> {
    prefix: &'m [usize],
    remaining: std::vec::IntoIter<usize>,
}

impl Iterator for Candidates<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let candidate = self.remaining.next()?;
        let mut extended = Vec::with_capacity(self.prefix.len() + 1);
        extended.extend_from_slice(self.prefix);
        extended.push(candidate);
        Some(extended)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.remaining.size_hint()
    }
}

impl<'a, G: MolecularGraph> MappingProblem<'a, G> {
    /// Fix the assignment order as the breadth-first order of `reference`
    /// from `reference_seed`.
    pub fn new(reference: &'a G, target: &'a G, reference_seed: usize) -> Self {
        Self {
            reference,
            target,
            order: bfs_order(reference, reference_seed),
        }
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Return `true` iff `mapping` assigns every atom of the order.
    pub fn is_complete(&self, mapping: &[usize]) -> bool {
        mapping.len() == self.order.len()
    }

    /// Extend `mapping` by the next reference atom of the order. Candidates
    /// are all unmapped target atoms of the same element, in ascending order;
    /// bond compatibility is left to the cost model.
    pub fn extend<'m>(&self, mapping: &'m [usize]) -> Extension<'m> {
        let Some(&next_ref) = self.order.get(mapping.len()) else {
            return Extension::Complete;
        };

        let atomic_number = self.reference.atomic_number(next_ref);
        let unmapped = self.target.subgraph(mapping, true);
        let candidates: Vec<usize> = unmapped
            .nodes()
            .filter(|&node| self.target.atomic_number(node) == atomic_number)
            .collect();

        Extension::Candidates(Candidates {
            prefix: mapping,
            remaining: candidates.into_iter(),
        })
    }
}

/// A complete atom mapping from reference atoms to target atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    pairs: BTreeMap<usize, usize>,
    cost: f64,
}

impl Mapping {
    /// Pair up `order` and `mapping` position by position.
    pub(crate) fn new(order: &[usize], mapping: &[usize], cost: f64) -> Self {
        Self {
            pairs: order.iter().copied().zip(mapping.iter().copied()).collect(),
            cost,
        }
    }

    /// Target atom assigned to `reference_atom`.
    pub fn get(&self, reference_atom: usize) -> Option<usize> {
        self.pairs.get(&reference_atom).copied()
    }

    /// `(reference, target)` pairs in ascending reference order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs.iter().map(|(r, t)| (*r, *t))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Total mismatch cost of this mapping.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn as_map(&self) -> &BTreeMap<usize, usize> {
        &self.pairs
    }
}

impl Display for Mapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (r, t)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{r}: {t}")?;
        }
        write!(f, "}}")
    }
}
