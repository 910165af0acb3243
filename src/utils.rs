//! Shared primitives of the cost model and the search order.

use std::{
    collections::{HashMap, VecDeque},
    hash::Hash,
};

use bit_set::BitSet;

use crate::molecule::MolecularGraph;

/// Size of the symmetric difference of two multisets, i.e., the sum over all
/// distinct values of `|count_a(x) - count_b(x)|`.
pub fn multiset_difference<T, A, B>(a: A, b: B) -> usize
where
    T: Hash + Eq,
    A: IntoIterator<Item = T>,
    B: IntoIterator<Item = T>,
{
    let mut counts = HashMap::<T, isize>::new();
    for x in a {
        *counts.entry(x).or_default() += 1;
    }
    for x in b {
        *counts.entry(x).or_default() -= 1;
    }
    counts.values().map(|c| c.unsigned_abs()).sum()
}

/// Breadth-first order of the nodes reachable from `seed`. Siblings are
/// visited in the graph's neighbor order.
pub fn bfs_order<G: MolecularGraph>(graph: &G, seed: usize) -> Vec<usize> {
    let mut order = vec![seed];
    let mut visited: BitSet = [seed].into_iter().collect();
    let mut queue = VecDeque::from([seed]);
    while let Some(node) = queue.pop_front() {
        for neighbor in graph.neighbors(node) {
            if visited.insert(neighbor) {
                order.push(neighbor);
                queue.push_back(neighbor);
            }
        }
    }
    order
}
