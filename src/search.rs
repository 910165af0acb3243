//! Best-first (A*) search for all optimal atom mappings.
//!
//! Partial mappings are kept in a priority queue ordered by `f = g + h` (see
//! [`crate::cost`]); ties are broken by insertion order. The first complete
//! mapping popped sets the best total cost, and every later complete mapping
//! popped at the same cost is collected too. A complete mapping popped at a
//! lower cost replaces everything collected so far. The search stops as soon
//! as a state with a strictly larger `f` comes off the queue.
//!
//! Partial mappings whose accumulated cost exceeds the future cost of the
//! empty mapping are discarded on generation. That threshold is computed once
//! and acts as a global budget on `g`.

use std::{cmp::Ordering, collections::BinaryHeap};

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::{
    mapping::{Extension, Mapping, MappingProblem},
    molecule::MolecularGraph,
    utils::multiset_difference,
};

/// Reasons a pair of molecules and a seed cannot be searched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("{graph} seed {node} is not an atom of a molecule with {atoms} atoms")]
    SeedOutOfRange {
        graph: &'static str,
        node: usize,
        atoms: usize,
    },
    /// Atoms outside the seed's connected component can never be placed.
    #[error("only {reachable} of {atoms} reference atoms are connected to the seed")]
    Disconnected { reachable: usize, atoms: usize },
    #[error("reference has {reference} atoms but target has {target}")]
    AtomCountMismatch { reference: usize, target: usize },
    #[error("element compositions of reference and target differ by {difference} atoms")]
    CompositionMismatch { difference: usize },
}

/// Counters describing how much work a search did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    /// States taken off the priority queue.
    pub popped: usize,
    /// Incomplete states whose candidates were generated.
    pub expanded: usize,
    /// Extended mappings generated.
    pub generated: usize,
    /// Extended mappings discarded for exceeding the accumulated-cost budget.
    pub pruned: usize,
}

/// Everything a search produces.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// All optimal mappings, in the order they were found.
    pub mappings: Vec<Mapping>,
    /// Breadth-first order of the reference atoms used for the search.
    pub order: Vec<usize>,
    pub stats: SearchStats,
}

#[derive(Debug)]
struct SearchState {
    f: f64,
    seq: u64,
    g: usize,
    mapping: Vec<usize>,
}

impl Ord for SearchState {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the maximum: smallest f first, then oldest.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SearchState {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchState {}

/// Check that `reference` and `target` can be mapped onto each other at all:
/// equal atom counts and identical element compositions. The search itself
/// assumes this and does not check it again.
pub fn check_compatible<G: MolecularGraph>(reference: &G, target: &G) -> Result<(), MappingError> {
    let (r, t) = (reference.atom_count(), target.atom_count());
    if r != t {
        return Err(MappingError::AtomCountMismatch {
            reference: r,
            target: t,
        });
    }

    let difference = multiset_difference(
        reference.nodes().map(|n| reference.atomic_number(n)),
        target.nodes().map(|n| target.atomic_number(n)),
    );
    if difference != 0 {
        return Err(MappingError::CompositionMismatch { difference });
    }

    Ok(())
}

/// Return all optimal mappings of `reference` onto `target` that send
/// `seed.0` to `seed.1`.
pub fn map_atoms<G: MolecularGraph>(
    reference: &G,
    target: &G,
    seed: (usize, usize),
) -> Result<Vec<Mapping>, MappingError> {
    search(reference, target, seed, |_| {}).map(|outcome| outcome.mappings)
}

/// Like [`map_atoms`], but also report search statistics and call `progress`
/// with the number of optimal mappings found so far each time one is found.
/// The count restarts at 1 when a cheaper mapping replaces the ones found
/// before it.
pub fn search<G, F>(
    reference: &G,
    target: &G,
    seed: (usize, usize),
    mut progress: F,
) -> Result<SearchOutcome, MappingError>
where
    G: MolecularGraph,
    F: FnMut(usize),
{
    let (ref_seed, map_seed) = seed;
    for (graph, mol, node) in [("reference", reference, ref_seed), ("target", target, map_seed)] {
        if !mol.contains(node) {
            return Err(MappingError::SeedOutOfRange {
                graph,
                node,
                atoms: mol.atom_count(),
            });
        }
    }

    let problem = MappingProblem::new(reference, target, ref_seed);
    let atoms = reference.atom_count();
    if problem.order().len() != atoms {
        return Err(MappingError::Disconnected {
            reachable: problem.order().len(),
            atoms,
        });
    }

    let mut outcome = SearchOutcome {
        mappings: Vec::new(),
        order: problem.order().to_vec(),
        stats: SearchStats::default(),
    };

    // Skipped, not searched: the returned stats stay all zero.
    if reference.atomic_number(ref_seed) != target.atomic_number(map_seed) {
        warn!(ref_seed, map_seed, "seed atoms are different elements, no mapping exists");
        return Ok(outcome);
    }

    let ub_g = problem.future_cost(&[]);
    let mut ub_f = f64::INFINITY;
    debug!(order = ?problem.order(), ub_g, "starting search");

    let mut seq = 0;
    let mut queue = BinaryHeap::from([SearchState {
        f: 0.0,
        seq,
        g: 0,
        mapping: vec![map_seed],
    }]);

    while let Some(state) = queue.pop() {
        outcome.stats.popped += 1;
        if state.f > ub_f {
            break;
        }

        if problem.is_complete(&state.mapping) {
            // The future cost can overestimate, so a cheaper completion may
            // still turn up after more expensive ones were recorded.
            if state.f < ub_f {
                outcome.mappings.clear();
            }
            ub_f = state.f;
            outcome
                .mappings
                .push(Mapping::new(problem.order(), &state.mapping, state.f));
            info!(found = outcome.mappings.len(), cost = state.f, "optimal mapping");
            progress(outcome.mappings.len());
            continue;
        }

        let Extension::Candidates(candidates) = problem.extend(&state.mapping) else {
            continue;
        };
        outcome.stats.expanded += 1;
        trace!(depth = state.mapping.len(), f = state.f, g = state.g, "expanding");

        for extended in candidates {
            outcome.stats.generated += 1;
            let g = state.g + problem.accumulated_cost(&extended);
            if g as f64 > ub_g {
                outcome.stats.pruned += 1;
                continue;
            }
            let f = g as f64 + problem.future_cost(&extended);
            seq += 1;
            queue.push(SearchState {
                f,
                seq,
                g,
                mapping: extended,
            });
        }
    }

    info!(
        mappings = outcome.mappings.len(),
        popped = outcome.stats.popped,
        pruned = outcome.stats.pruned,
        "search finished"
    );
    Ok(outcome)
}
