//! Cost model of the mapping search.
//!
//! The accumulated cost `g` of a partial mapping is the sum, over every placed
//! reference atom, of the bonds to earlier-placed neighbors that its image
//! fails to realize in the target. It is charged one atom at a time in
//! breadth-first order, so each extension only pays for its last atom.
//!
//! The future cost `h` estimates what the unmapped remainders of both
//! molecules still have to pay, from two multiset comparisons: the local
//! environments of the remaining atoms and the types of the bonds among them.
//! Fixing one kind of mismatch can fix the other, so `h` is the larger of the
//! two and never their sum.

use std::collections::HashMap;

use bit_set::BitSet;

use crate::{
    mapping::MappingProblem,
    molecule::MolecularGraph,
    utils::multiset_difference,
};

impl<G: MolecularGraph> MappingProblem<'_, G> {
    /// Cost contributed by the last atom of `mapping`.
    pub fn accumulated_cost(&self, mapping: &[usize]) -> usize {
        let Some(placed_ref) = self.order().get(..mapping.len()) else {
            return 0;
        };
        let (Some(&last_ref), Some(&last_map)) = (placed_ref.last(), mapping.last()) else {
            return 0;
        };

        let mapped_ref = self.reference.subgraph(placed_ref, false);
        let mapped_map = self.target.subgraph(mapping, false);

        let translate: HashMap<usize, usize> = placed_ref
            .iter()
            .copied()
            .zip(mapping.iter().copied())
            .collect();
        let ref_neighbors: Vec<usize> = mapped_ref.neighbors(last_ref).collect();
        let map_neighbors: BitSet = mapped_map.neighbors(last_map).collect();

        // Bonds of the reference atom that its image actually has.
        let realized: Vec<usize> = ref_neighbors
            .iter()
            .filter_map(|n| translate.get(n).copied())
            .filter(|n| map_neighbors.contains(*n))
            .collect();

        let mut local_ref = ref_neighbors;
        local_ref.push(last_ref);
        let mut local_map = realized;
        local_map.push(last_map);

        multiset_difference(
            self.reference.subgraph(&local_ref, false).bond_types(),
            self.target.subgraph(&local_map, false).bond_types(),
        )
    }

    /// Lower-bound estimate of the cost still to be paid by the atoms that
    /// `mapping` leaves unassigned.
    pub fn future_cost(&self, mapping: &[usize]) -> f64 {
        let Some(placed_ref) = self.order().get(..mapping.len()) else {
            return 0.0;
        };
        let rest_ref = self.reference.subgraph(placed_ref, true);
        let rest_map = self.target.subgraph(mapping, true);

        // Each differing signature is counted once as missing and once as
        // excess.
        let h_atoms = multiset_difference(
            rest_ref.nodes().map(|n| rest_ref.atom_signature(n)),
            rest_map.nodes().map(|n| rest_map.atom_signature(n)),
        ) as f64
            / 2.0;
        let h_bonds = multiset_difference(rest_ref.bond_types(), rest_map.bond_types()) as f64;

        h_atoms.max(h_bonds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::molecule::{
        Element::{Carbon, Oxygen},
        Molecule,
    };

    // C-C-O
    fn ethanol_skeleton() -> Molecule {
        Molecule::from_atoms(&[Carbon, Carbon, Oxygen], [(0, 1), (1, 2)]).unwrap()
    }

    // C-O-C
    fn ether_skeleton() -> Molecule {
        Molecule::from_atoms(&[Carbon, Carbon, Oxygen], [(0, 2), (1, 2)]).unwrap()
    }

    #[test]
    fn identical_placement_costs_nothing() {
        let mol = ethanol_skeleton();
        let problem = MappingProblem::new(&mol, &mol, 0);
        assert_eq!(problem.accumulated_cost(&[0]), 0);
        assert_eq!(problem.accumulated_cost(&[0, 1]), 0);
        assert_eq!(problem.accumulated_cost(&[0, 1, 2]), 0);
        assert_eq!(problem.future_cost(&[]), 0.0);
        assert_eq!(problem.future_cost(&[0, 1]), 0.0);
    }

    #[test]
    fn missing_bond_is_charged_to_the_later_atom() {
        let reference = ethanol_skeleton();
        let target = ether_skeleton();
        let problem = MappingProblem::new(&reference, &target, 0);

        // The C-C bond does not exist between target atoms 0 and 1.
        assert_eq!(problem.accumulated_cost(&[0, 1]), 1);
        // The C-O bond does.
        assert_eq!(problem.accumulated_cost(&[0, 1, 2]), 0);
    }

    #[test]
    fn extra_target_bonds_are_free() {
        // The target's extra C-C bond is never charged.
        let reference = Molecule::from_atoms(&[Carbon, Carbon, Oxygen], [(0, 2), (1, 2)]).unwrap();
        let target = Molecule::from_atoms(&[Carbon, Carbon, Oxygen], [(0, 1), (0, 2), (1, 2)]).unwrap();
        let problem = MappingProblem::new(&reference, &target, 0);
        assert_eq!(problem.order(), &[0, 2, 1]);
        assert_eq!(problem.accumulated_cost(&[0, 2, 1]), 0);
    }

    #[test]
    fn future_cost_takes_the_larger_bound() {
        let reference = ethanol_skeleton();
        let target = ether_skeleton();
        let problem = MappingProblem::new(&reference, &target, 0);

        // Six differing signatures; bond types differ by two.
        assert_eq!(problem.future_cost(&[]), 3.0);
        // Only signatures differ once atom 0 is placed.
        assert_eq!(problem.future_cost(&[0]), 2.0);
        assert_eq!(problem.future_cost(&[0, 1, 2]), 0.0);
    }

    #[test]
    fn future_cost_can_be_fractional() {
        let reference = Molecule::from_atoms(&[Carbon, Carbon], [(0, 1)]).unwrap();
        let target = Molecule::from_atoms(&[Carbon, Carbon, Carbon], [(0, 1)]).unwrap();
        let problem = MappingProblem::new(&reference, &target, 0);
        // Remaining: reference {C[6]}, target {C[6], C[]}.
        assert_eq!(problem.future_cost(&[0]), 0.5);
    }
}
