//! Map the molecules under data/ onto reshuffled or isomeric copies and check
//! the optimal mappings against hand-counted symmetries.

use std::{collections::BTreeSet, path::Path};

use atom_mapping::{
    check_compatible,
    loader::{parse, BondInference},
    map_atoms, search, Mapping, MolecularGraph, Molecule,
};

fn load(name: &str) -> Molecule {
    let path = Path::new("data").join(name);
    parse(&path, &BondInference::default()).expect(&format!("Failed to parse {path:?}"))
}

/// Assert that `mapping` is a bijection from `reference` onto `target` that
/// keeps every atom's element.
fn assert_bijective(mapping: &Mapping, reference: &Molecule, target: &Molecule) {
    assert_eq!(mapping.len(), reference.atom_count());
    let images: BTreeSet<usize> = mapping.iter().map(|(_, t)| t).collect();
    assert_eq!(images.len(), target.atom_count());
    for (r, t) in mapping.iter() {
        assert_eq!(reference.element(r), target.element(t), "{r} -> {t}");
    }
}

fn assert_edge_preserving(mapping: &Mapping, reference: &Molecule, target: &Molecule) {
    let target_edges: BTreeSet<(usize, usize)> = target.edges().collect();
    for (u, v) in reference.edges() {
        let (a, b) = (mapping.get(u).unwrap(), mapping.get(v).unwrap());
        assert!(
            target_edges.contains(&(a.min(b), a.max(b))),
            "bond {u}-{v} maps to non-bond {a}-{b}"
        );
    }
}

#[test]
fn inferred_bond_counts() {
    assert_eq!(load("ethanol.xyz").bond_count(), 8);
    assert_eq!(load("ethanol_shuffled.xyz").bond_count(), 8);
    assert_eq!(load("benzene.xyz").bond_count(), 12);
    assert_eq!(load("benzene_shuffled.xyz").bond_count(), 12);
    assert_eq!(load("dimethyl_ether.xyz").bond_count(), 8);
    assert_eq!(load("ethanol.mol").bond_count(), 8);
}

#[test]
fn fixtures_are_compatible() {
    let ethanol = load("ethanol.xyz");
    for other in ["ethanol_shuffled.xyz", "dimethyl_ether.xyz", "ethanol.mol"] {
        assert_eq!(check_compatible(&ethanol, &load(other)), Ok(()), "{other}");
    }
    assert!(check_compatible(&ethanol, &load("benzene.xyz")).is_err());
}

#[test]
fn ethanol_shuffled() {
    let (reference, target) = (load("ethanol.xyz"), load("ethanol_shuffled.xyz"));
    let mappings = map_atoms(&reference, &target, (2, 1)).unwrap();

    // Three methyl hydrogens times two methylene hydrogens.
    assert_eq!(mappings.len(), 12);
    for mapping in &mappings {
        assert_eq!(mapping.cost(), 0.0);
        assert_eq!(mapping.get(2), Some(1));
        assert_bijective(mapping, &reference, &target);
        assert_edge_preserving(mapping, &reference, &target);
    }

    let distinct: BTreeSet<_> = mappings.iter().map(|m| m.as_map().clone()).collect();
    assert_eq!(distinct.len(), 12);
}

#[test]
fn benzene_shuffled() {
    let (reference, target) = (load("benzene.xyz"), load("benzene_shuffled.xyz"));
    let mappings = map_atoms(&reference, &target, (0, 2)).unwrap();

    // Fixing one carbon leaves only the mirror image.
    assert_eq!(mappings.len(), 2);
    assert_ne!(mappings[0], mappings[1]);
    for mapping in &mappings {
        assert_eq!(mapping.cost(), 0.0);
        assert_bijective(mapping, &reference, &target);
        assert_edge_preserving(mapping, &reference, &target);
    }
}

#[test]
fn ethanol_onto_dimethyl_ether() {
    let (reference, target) = (load("ethanol.xyz"), load("dimethyl_ether.xyz"));
    let outcome = search(&reference, &target, (2, 0), |_| {}).unwrap();

    assert_eq!(outcome.mappings.len(), 72);
    for mapping in &outcome.mappings {
        assert_eq!(mapping.cost(), 2.0);
        assert_bijective(mapping, &reference, &target);
    }
    assert_eq!(outcome.order.len(), 9);
    assert_eq!(outcome.order[0], 2);
}

#[test]
fn molfile_onto_xyz() {
    let (reference, target) = (load("ethanol.mol"), load("ethanol_shuffled.xyz"));
    let mappings = map_atoms(&reference, &target, (2, 1)).unwrap();

    assert_eq!(mappings.len(), 12);
    for mapping in &mappings {
        assert_eq!(mapping.cost(), 0.0);
        assert_edge_preserving(mapping, &reference, &target);
    }
}

#[test]
fn progress_counts_every_mapping() {
    let (reference, target) = (load("ethanol.xyz"), load("ethanol_shuffled.xyz"));
    let mut reported = Vec::new();
    let outcome = search(&reference, &target, (2, 1), |n| reported.push(n)).unwrap();

    assert_eq!(reported, (1..=12).collect::<Vec<_>>());
    assert_eq!(outcome.mappings.len(), 12);
    assert!(outcome.stats.popped >= 12);
}
