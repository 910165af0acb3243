//! Graph-theoretic representation of a molecule.
//!
//! A [`Molecule`] is an immutable, loopless graph with [`Element`]s as nodes.
//! The mapping search only ever talks to molecules through the
//! [`MolecularGraph`] trait: atomic numbers, adjacency, edge enumeration,
//! local atom signatures and induced subgraphs.

use std::{
    collections::{BTreeMap, HashSet},
    fmt::Display,
    str::FromStr,
    sync::Arc,
};

use bit_set::BitSet;
use petgraph::{
    dot::{Config, Dot},
    graph::{Graph, NodeIndex},
    Undirected,
};
use thiserror::Error;

pub(crate) type Index = u32;
pub(crate) type MGraph = Graph<Atom, (), Undirected, Index>;

/// Thrown by [`Element::from_str`] if the string does not represent a valid
/// chemical element.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParseElementError;

macro_rules! periodic_table {
    ( $(($element:ident, $name:literal, $radius:expr),)* ) => {
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        /// Represents a chemical element.
        pub enum Element {
            $( $element, )*
        }

        impl Element {
            /// Every element, ordered by atomic number.
            pub const ALL: &'static [Element] = &[$( Element::$element, )*];

            /// Single-bond covalent radius in Ångström, if tabulated.
            pub fn covalent_radius(&self) -> Option<f64> {
                match &self {
                    $( Element::$element => $radius, )*
                }
            }
        }

        impl Display for Element {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match &self {
                    $( Element::$element => write!(f, "{}", $name), )*
                }
            }
        }

        impl FromStr for Element {
            type Err = ParseElementError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $name => Ok(Element::$element), )*
                    _ => Err(ParseElementError),
                }
            }
        }
    };
}

// Covalent radii from Cordero et al. (2008), doi:10.1039/B801115J. Low-spin
// values for Mn, Fe and Co; sp3 value for C.
periodic_table!(
    (Hydrogen, "H", Some(0.31)),
    (Helium, "He", Some(0.28)),
    (Lithium, "Li", Some(1.28)),
    (Beryllium, "Be", Some(0.96)),
    (Boron, "B", Some(0.84)),
    (Carbon, "C", Some(0.76)),
    (Nitrogen, "N", Some(0.71)),
    (Oxygen, "O", Some(0.66)),
    (Fluorine, "F", Some(0.57)),
    (Neon, "Ne", Some(0.58)),
    (Sodium, "Na", Some(1.66)),
    (Magnesium, "Mg", Some(1.41)),
    (Aluminum, "Al", Some(1.21)),
    (Silicon, "Si", Some(1.11)),
    (Phosphorus, "P", Some(1.07)),
    (Sulfur, "S", Some(1.05)),
    (Chlorine, "Cl", Some(1.02)),
    (Argon, "Ar", Some(1.06)),
    (Potassium, "K", Some(2.03)),
    (Calcium, "Ca", Some(1.76)),
    (Scandium, "Sc", Some(1.70)),
    (Titanium, "Ti", Some(1.60)),
    (Vanadium, "V", Some(1.53)),
    (Chromium, "Cr", Some(1.39)),
    (Manganese, "Mn", Some(1.39)),
    (Iron, "Fe", Some(1.32)),
    (Cobalt, "Co", Some(1.26)),
    (Nickel, "Ni", Some(1.24)),
    (Copper, "Cu", Some(1.32)),
    (Zinc, "Zn", Some(1.22)),
    (Gallium, "Ga", Some(1.22)),
    (Germanium, "Ge", Some(1.20)),
    (Arsenic, "As", Some(1.19)),
    (Selenium, "Se", Some(1.20)),
    (Bromine, "Br", Some(1.20)),
    (Krypton, "Kr", Some(1.16)),
    (Rubidium, "Rb", Some(2.20)),
    (Strontium, "Sr", Some(1.95)),
    (Yttrium, "Y", Some(1.90)),
    (Zirconium, "Zr", Some(1.75)),
    (Niobium, "Nb", Some(1.64)),
    (Molybdenum, "Mo", Some(1.54)),
    (Technetium, "Tc", Some(1.47)),
    (Ruthenium, "Ru", Some(1.46)),
    (Rhodium, "Rh", Some(1.42)),
    (Palladium, "Pd", Some(1.39)),
    (Silver, "Ag", Some(1.45)),
    (Cadmium, "Cd", Some(1.44)),
    (Indium, "In", Some(1.42)),
    (Tin, "Sn", Some(1.39)),
    (Antimony, "Sb", Some(1.39)),
    (Tellurium, "Te", Some(1.38)),
    (Iodine, "I", Some(1.39)),
    (Xenon, "Xe", Some(1.40)),
    (Cesium, "Cs", Some(2.44)),
    (Barium, "Ba", Some(2.15)),
    (Lanthanum, "La", Some(2.07)),
    (Cerium, "Ce", Some(2.04)),
    (Praseodymium, "Pr", Some(2.03)),
    (Neodymium, "Nd", Some(2.01)),
    (Promethium, "Pm", Some(1.99)),
    (Samarium, "Sm", Some(1.98)),
    (Europium, "Eu", Some(1.98)),
    (Gadolinium, "Gd", Some(1.96)),
    (Terbium, "Tb", Some(1.94)),
    (Dysprosium, "Dy", Some(1.92)),
    (Holmium, "Ho", Some(1.92)),
    (Erbium, "Er", Some(1.89)),
    (Thulium, "Tm", Some(1.90)),
    (Ytterbium, "Yb", Some(1.87)),
    (Lutetium, "Lu", Some(1.87)),
    (Hafnium, "Hf", Some(1.75)),
    (Tantalum, "Ta", Some(1.70)),
    (Wolfram, "W", Some(1.62)),
    (Rhenium, "Re", Some(1.51)),
    (Osmium, "Os", Some(1.44)),
    (Iridium, "Ir", Some(1.41)),
    (Platinum, "Pt", Some(1.36)),
    (Gold, "Au", Some(1.36)),
    (Mercury, "Hg", Some(1.32)),
    (Thallium, "Tl", Some(1.45)),
    (Lead, "Pb", Some(1.46)),
    (Bismuth, "Bi", Some(1.48)),
    (Polonium, "Po", Some(1.40)),
    (Astatine, "At", Some(1.50)),
    (Radon, "Rn", Some(1.50)),
    (Francium, "Fr", Some(2.60)),
    (Radium, "Ra", Some(2.21)),
    (Actinium, "Ac", Some(2.15)),
    (Thorium, "Th", Some(2.06)),
    (Protactinium, "Pa", Some(2.00)),
    (Uranium, "U", Some(1.96)),
    (Neptunium, "Np", Some(1.90)),
    (Plutonium, "Pu", Some(1.87)),
    (Americium, "Am", Some(1.80)),
    (Curium, "Cm", Some(1.69)),
    (Berkelium, "Bk", None),
    (Californium, "Cf", None),
    (Einsteinium, "Es", None),
    (Fermium, "Fm", None),
    (Mendelevium, "Md", None),
    (Nobelium, "No", None),
    (Lawrencium, "Lr", None),
    (Rutherfordium, "Rf", None),
    (Dubnium, "Db", None),
    (Seaborgium, "Sg", None),
    (Bohrium, "Bh", None),
    (Hassium, "Hs", None),
    (Meitnerium, "Mt", None),
    (Darmstadtium, "Ds", None),
    (Roentgenium, "Rg", None),
    (Copernicium, "Cn", None),
    (Nihonium, "Nh", None),
    (Flerovium, "Fl", None),
    (Moscovium, "Mc", None),
    (Livermorium, "Lv", None),
    (Tennessine, "Ts", None),
    (Oganesson, "Og", None),
);

impl Element {
    /// Return this element's atomic number.
    pub fn atomic_number(&self) -> u32 {
        *self as u32 + 1
    }

    /// Return the element with atomic number `z`, if there is one.
    pub fn from_atomic_number(z: u32) -> Option<Element> {
        let ix = usize::try_from(z).ok()?.checked_sub(1)?;
        Element::ALL.get(ix).copied()
    }
}

/// The nodes of a [`Molecule`] graph.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atom {
    element: Element,
}

impl Atom {
    /// Construct an [`Atom`] of type `element`.
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    /// Return this [`Atom`]'s element.
    pub fn element(&self) -> Element {
        self.element
    }
}

/// The chemical character of a bond: the atomic numbers of its two endpoints,
/// stored in ascending order so that `C-O` and `O-C` compare equal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BondType(u32, u32);

impl BondType {
    pub fn new(a: u32, b: u32) -> Self {
        Self(a.min(b), a.max(b))
    }
}

impl Display for BondType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

/// The local environment of an atom: its own atomic number and the sorted
/// atomic numbers of all of its neighbors. Two atoms with equal signatures are
/// chemically indistinguishable at radius one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AtomSignature {
    atomic_number: u32,
    neighbors: Vec<u32>,
}

impl AtomSignature {
    pub fn new(atomic_number: u32, mut neighbors: Vec<u32>) -> Self {
        neighbors.sort_unstable();
        Self {
            atomic_number,
            neighbors,
        }
    }
}

impl Display for AtomSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[", self.atomic_number)?;
        for (i, z) in self.neighbors.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{z}")?;
        }
        write!(f, "]")
    }
}

/// Everything the mapping search needs to know about a molecular graph.
///
/// Nodes are atom indices `0..n` of the full molecule. Subgraphs keep the
/// indices of the molecule they were taken from.
pub trait MolecularGraph: Sized {
    /// Nodes of this graph in ascending order.
    fn nodes(&self) -> impl Iterator<Item = usize> + '_;

    /// Return `true` iff `node` is a node of this graph.
    fn contains(&self, node: usize) -> bool;

    /// Atomic number of `node`.
    fn atomic_number(&self, node: usize) -> u32;

    /// Neighbors of `node` inside this graph, in ascending order.
    fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_;

    /// Every undirected edge `(u, v)` with `u < v` exactly once.
    fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_;

    /// Signature of `node` in the full molecule, regardless of which subgraph
    /// it is requested from.
    fn atom_signature(&self, node: usize) -> AtomSignature;

    /// Subgraph induced on `nodes`, or on every other node of the full
    /// molecule if `complement` is set.
    fn subgraph(&self, nodes: &[usize], complement: bool) -> Self;

    fn atom_count(&self) -> usize {
        self.nodes().count()
    }

    /// Bond type of every edge, in [`MolecularGraph::edges`] order.
    fn bond_types(&self) -> impl Iterator<Item = BondType> + '_ {
        self.edges()
            .map(move |(u, v)| BondType::new(self.atomic_number(u), self.atomic_number(v)))
    }
}

/// Thrown by [`Molecule::from_atoms`] when the bond list does not describe a
/// simple graph over the given atoms.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoleculeError {
    #[error("bond ({0}, {1}) refers to an atom outside 0..{2}")]
    BondOutOfRange(usize, usize, usize),
    #[error("atom {0} is bonded to itself")]
    SelfLoop(usize),
    #[error("atoms {0} and {1} are bonded more than once")]
    DuplicateBond(usize, usize),
}

/// A simple, loopless, undirected graph with [`Element`]s as nodes.
///
/// The underlying graph is shared between a molecule and all subgraphs taken
/// from it; a subgraph only records which nodes it keeps.
#[derive(Debug, Clone)]
pub struct Molecule {
    graph: Arc<MGraph>,
    nodes: BitSet,
}

impl Molecule {
    /// Construct a [`Molecule`] from an existing `MGraph`.
    pub(crate) fn from_graph(g: MGraph) -> Self {
        let nodes = (0..g.node_count()).collect();
        Self {
            graph: Arc::new(g),
            nodes,
        }
    }

    /// Construct a [`Molecule`] with one atom per entry of `elements` and an
    /// edge for each `(i, j)` in `bonds`.
    pub fn from_atoms(
        elements: &[Element],
        bonds: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self, MoleculeError> {
        let n = elements.len();
        let mut graph = MGraph::with_capacity(n, n);
        for &element in elements {
            graph.add_node(Atom::new(element));
        }

        let mut seen = HashSet::new();
        for (u, v) in bonds {
            if u >= n || v >= n {
                return Err(MoleculeError::BondOutOfRange(u, v, n));
            }
            if u == v {
                return Err(MoleculeError::SelfLoop(u));
            }
            if !seen.insert((u.min(v), u.max(v))) {
                return Err(MoleculeError::DuplicateBond(u.min(v), u.max(v)));
            }
            graph.add_edge(NodeIndex::new(u), NodeIndex::new(v), ());
        }

        Ok(Self::from_graph(graph))
    }

    /// Element of atom `node`.
    pub fn element(&self, node: usize) -> Element {
        self.graph[NodeIndex::new(node)].element()
    }

    /// Number of bonds in this (sub)graph.
    pub fn bond_count(&self) -> usize {
        self.edges().count()
    }

    /// Molecular formula in Hill order.
    pub fn formula(&self) -> String {
        let mut counts = BTreeMap::<String, usize>::new();
        for node in self.nodes.iter() {
            *counts.entry(self.element(node).to_string()).or_default() += 1;
        }

        let mut formula = String::new();
        let mut push = |symbol: &str, count: usize| {
            formula.push_str(symbol);
            if count > 1 {
                formula.push_str(&count.to_string());
            }
        };
        if let Some(c) = counts.remove("C") {
            push("C", c);
            if let Some(h) = counts.remove("H") {
                push("H", h);
            }
        }
        for (symbol, count) in counts {
            push(&symbol, count);
        }
        formula
    }

    /// Return a pretty-printable (Graphviz DOT) representation of this
    /// molecule. Nodes are labelled with element symbol and atom index.
    pub fn info(&self) -> String {
        let labelled = self.graph.filter_map(
            |ix, atom| {
                self.nodes
                    .contains(ix.index())
                    .then(|| format!("{}{}", atom.element(), ix.index()))
            },
            |_, _| Some(""),
        );
        let dot = Dot::with_config(&labelled, &[Config::EdgeNoLabel]);
        format!("{dot}")
    }
}

impl MolecularGraph for Molecule {
    fn nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.iter()
    }

    fn contains(&self, node: usize) -> bool {
        self.nodes.contains(node)
    }

    fn atomic_number(&self, node: usize) -> u32 {
        self.element(node).atomic_number()
    }

    fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        let mut neighbors: Vec<usize> = self
            .graph
            .neighbors(NodeIndex::new(node))
            .map(|ix| ix.index())
            .filter(|ix| self.nodes.contains(*ix))
            .collect();
        neighbors.sort_unstable();
        neighbors.into_iter()
    }

    fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes
            .iter()
            .flat_map(move |u| self.neighbors(u).filter(move |&v| v > u).map(move |v| (u, v)))
    }

    fn atom_signature(&self, node: usize) -> AtomSignature {
        let neighbors = self
            .graph
            .neighbors(NodeIndex::new(node))
            .map(|ix| self.graph[ix].element().atomic_number())
            .collect();
        AtomSignature::new(self.atomic_number(node), neighbors)
    }

    fn subgraph(&self, nodes: &[usize], complement: bool) -> Self {
        let selected: BitSet = nodes.iter().copied().collect();
        let kept = if complement {
            (0..self.graph.node_count())
                .filter(|ix| !selected.contains(*ix))
                .collect()
        } else {
            selected
                .iter()
                .filter(|ix| *ix < self.graph.node_count())
                .collect()
        };
        Self {
            graph: Arc::clone(&self.graph),
            nodes: kept,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use super::Element::{Carbon, Hydrogen, Oxygen};

    // H3C-CH2-OH without coordinates.
    fn ethanol() -> Molecule {
        let elements = [
            Carbon, Carbon, Oxygen, Hydrogen, Hydrogen, Hydrogen, Hydrogen, Hydrogen, Hydrogen,
        ];
        let bonds = [(0, 1), (1, 2), (0, 3), (0, 4), (0, 5), (1, 6), (1, 7), (2, 8)];
        Molecule::from_atoms(&elements, bonds).unwrap()
    }

    #[test]
    fn element_to_string() {
        assert!(Element::Hydrogen.to_string() == "H")
    }

    #[test]
    fn element_from_string() {
        assert!(str::parse("H") == Ok(Element::Hydrogen));
        assert!(str::parse::<Element>("Foo").is_err());
    }

    #[test]
    fn atomic_numbers_follow_the_periodic_table() {
        assert_eq!(Element::Hydrogen.atomic_number(), 1);
        assert_eq!(Element::Carbon.atomic_number(), 6);
        assert_eq!(Element::Oganesson.atomic_number(), 118);
        assert_eq!(Element::from_atomic_number(8), Some(Element::Oxygen));
        assert_eq!(Element::from_atomic_number(0), None);
        assert_eq!(Element::from_atomic_number(119), None);
    }

    #[test]
    fn rejects_malformed_bond_lists() {
        assert_eq!(
            Molecule::from_atoms(&[Carbon, Carbon], [(0, 2)]).unwrap_err(),
            MoleculeError::BondOutOfRange(0, 2, 2)
        );
        assert_eq!(
            Molecule::from_atoms(&[Carbon], [(0, 0)]).unwrap_err(),
            MoleculeError::SelfLoop(0)
        );
        assert_eq!(
            Molecule::from_atoms(&[Carbon, Oxygen], [(0, 1), (1, 0)]).unwrap_err(),
            MoleculeError::DuplicateBond(0, 1)
        );
    }

    #[test]
    fn edges_are_ordered_and_unique() {
        let mol = ethanol();
        let edges: Vec<_> = mol.edges().collect();
        assert_eq!(edges.len(), 8);
        assert!(edges.iter().all(|(u, v)| u < v));
        assert_eq!(edges[0], (0, 1));
        assert_eq!(mol.bond_count(), 8);
    }

    #[test]
    fn neighbors_are_ascending() {
        let mol = ethanol();
        assert_eq!(mol.neighbors(0).collect::<Vec<_>>(), vec![1, 3, 4, 5]);
        assert_eq!(mol.neighbors(2).collect::<Vec<_>>(), vec![1, 8]);
    }

    #[test]
    fn subgraph_keeps_indices_and_source() {
        let mol = ethanol();
        let heavy = mol.subgraph(&[0, 1, 2], false);
        assert_eq!(heavy.nodes().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(heavy.edges().collect::<Vec<_>>(), vec![(0, 1), (1, 2)]);
        assert_eq!(heavy.neighbors(0).collect::<Vec<_>>(), vec![1]);

        let hydrogens = mol.subgraph(&[0, 1, 2], true);
        assert_eq!(hydrogens.atom_count(), 6);
        assert_eq!(hydrogens.bond_count(), 0);

        // The source is untouched.
        assert_eq!(mol.atom_count(), 9);
        assert_eq!(mol.bond_count(), 8);
    }

    #[test]
    fn signatures_see_the_full_molecule() {
        let mol = ethanol();
        let alone = mol.subgraph(&[2], false);
        let expected = AtomSignature::new(8, vec![6, 1]);
        assert_eq!(alone.atom_signature(2), expected);
        assert_eq!(mol.atom_signature(2), expected);
        assert_eq!(expected.to_string(), "8[1,6]");
    }

    #[test]
    fn bond_types_are_unordered() {
        assert_eq!(BondType::new(8, 6), BondType::new(6, 8));
        let mol = ethanol();
        let types: Vec<_> = mol.subgraph(&[1, 2], false).bond_types().collect();
        assert_eq!(types, vec![BondType::new(6, 8)]);
        assert_eq!(BondType::new(8, 6).to_string(), "6-8");
    }

    #[test]
    fn hill_formula() {
        assert_eq!(ethanol().formula(), "C2H6O");
        let water = Molecule::from_atoms(&[Oxygen, Hydrogen, Hydrogen], [(0, 1), (0, 2)]).unwrap();
        assert_eq!(water.formula(), "H2O");
    }

    #[test]
    fn dot_output_lists_atoms() {
        let info = ethanol().subgraph(&[0, 1, 2], false).info();
        assert!(info.contains("C0"));
        assert!(info.contains("O2"));
        assert!(!info.contains("H3"));
    }
}
