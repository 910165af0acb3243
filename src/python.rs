use std::collections::BTreeMap;

use pyo3::{exceptions::PyValueError, prelude::*};

use crate::{
    loader::{parse_xyz_str, BondInference},
    search::{check_compatible, map_atoms as map_atoms_search},
};

/// Map the atoms of two molecules given as XYZ file contents. Returns one
/// `{reference_atom: target_atom}` dict per optimal mapping.
#[pyfunction]
#[pyo3(signature = (reference_xyz, target_xyz, seed, tolerance = 0.45))]
fn map_atoms(
    reference_xyz: &str,
    target_xyz: &str,
    seed: (usize, usize),
    tolerance: f64,
) -> PyResult<Vec<BTreeMap<usize, usize>>> {
    let inference = BondInference { tolerance };
    let to_py = |e: &dyn std::fmt::Display| PyValueError::new_err(e.to_string());

    let reference = parse_xyz_str(reference_xyz, &inference).map_err(|e| to_py(&e))?;
    let target = parse_xyz_str(target_xyz, &inference).map_err(|e| to_py(&e))?;
    check_compatible(&reference, &target).map_err(|e| to_py(&e))?;

    let mappings = map_atoms_search(&reference, &target, seed).map_err(|e| to_py(&e))?;
    Ok(mappings.into_iter().map(|m| m.as_map().clone()).collect())
}

/// A Python module implemented in Rust. The name of this function must match
/// the `lib.name` setting in the `Cargo.toml`, else Python will not be able to
/// import the module.
#[pymodule]
#[pyo3(name = "atom_mapping")]
fn _atom_mapping(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(map_atoms, m)?)?;

    Ok(())
}
