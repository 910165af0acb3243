//! Find all optimal atom-to-atom mappings between two molecular graphs.
//!
//! Given a reference and a target molecule and one atom of each that are known
//! to correspond, [`map_atoms`] returns every bijection between their atoms
//! that extends this seed pair at minimum bond-mismatch cost.
//!
//! ```
//! use atom_mapping::{map_atoms, molecule::{Element::Carbon, Molecule}};
//!
//! let triangle = Molecule::from_atoms(&[Carbon; 3], [(0, 1), (1, 2), (0, 2)]).unwrap();
//! let mappings = map_atoms(&triangle, &triangle, (0, 0)).unwrap();
//! assert_eq!(mappings.len(), 2);
//! ```

// Molecule definition and the graph interface used by the search
pub mod molecule;

// Data IO
pub mod loader;

// Multiset difference and breadth-first order
pub mod utils;

// Partial mappings and their extension
pub mod mapping;

// Accumulated and future cost
pub mod cost;

// The hard bit: A* over partial mappings
pub mod search;

// Python library
#[cfg(feature = "python")]
pub mod python;

pub use mapping::Mapping;
pub use molecule::{MolecularGraph, Molecule};
pub use search::{check_compatible, map_atoms, search, MappingError, SearchOutcome, SearchStats};
