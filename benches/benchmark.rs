use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::path::Path;

use atom_mapping::{
    loader::{parse, BondInference},
    map_atoms,
    molecule::Molecule,
};

fn load(name: &str) -> Molecule {
    let path = Path::new("data").join(name);
    parse(&path, &BondInference::default()).expect(&format!("Failed to parse {path:?}"))
}

pub fn reference_mappings(c: &mut Criterion) {
    let mut group = c.benchmark_group("reference_mappings");

    // Reference, target, seed pair.
    let pairs = [
        ("ethanol.xyz", "ethanol_shuffled.xyz", (2, 1)),
        ("benzene.xyz", "benzene_shuffled.xyz", (0, 2)),
        ("ethanol.xyz", "dimethyl_ether.xyz", (2, 0)),
    ];

    for (reference, target, seed) in pairs {
        let molecules = (load(reference), load(target));
        group.bench_with_input(
            BenchmarkId::new(reference, target),
            &molecules,
            |b, (reference, target)| {
                b.iter(|| map_atoms(reference, target, seed).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group! {
    name = benchmark;
    config = Criterion::default().sample_size(20);
    targets = reference_mappings
}
criterion_main!(benchmark);
