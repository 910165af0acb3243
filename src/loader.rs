//! Load molecules from `.xyz` geometry files and `.mol` (V2000) files.
//!
//! XYZ files carry no bonds. Two atoms are bonded iff their distance is at
//! most the sum of their covalent radii plus a fixed tolerance; see
//! [`BondInference`].

use std::{fs, num::ParseIntError, path::Path};

use thiserror::Error;
use tracing::debug;

use crate::molecule::{Element, Molecule, MoleculeError};

/// Thrown when a molecule file cannot be read or makes no sense.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not read molecule file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported molecule file extension {0:?} (expected .xyz, .mol or .sdf)")]
    UnsupportedFormat(String),
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
    #[error("line {line}: unknown element {symbol:?}")]
    UnknownElement { line: usize, symbol: String },
    #[error("no covalent radius is known for {0}, cannot infer its bonds")]
    NoCovalentRadius(Element),
    #[error(transparent)]
    Molecule(#[from] MoleculeError),
}

impl ParseError {
    fn malformed(line: usize, message: impl Into<String>) -> Self {
        ParseError::Malformed {
            line,
            message: message.into(),
        }
    }
}

/// Distance criterion for bonds between atoms of an XYZ file.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BondInference {
    /// Slack in Ångström added to the sum of covalent radii.
    pub tolerance: f64,
}

impl Default for BondInference {
    fn default() -> Self {
        Self { tolerance: 0.45 }
    }
}

impl BondInference {
    fn bonded(&self, a: &XyzAtom, b: &XyzAtom) -> Result<bool, ParseError> {
        let ra = a
            .element
            .covalent_radius()
            .ok_or(ParseError::NoCovalentRadius(a.element))?;
        let rb = b
            .element
            .covalent_radius()
            .ok_or(ParseError::NoCovalentRadius(b.element))?;
        let d2: f64 = a.position.iter().zip(&b.position).map(|(x, y)| (x - y).powi(2)).sum();
        Ok(d2.sqrt() <= ra + rb + self.tolerance)
    }
}

struct XyzAtom {
    element: Element,
    position: [f64; 3],
}

/// Load a molecule from `p`, choosing the format by file extension.
pub fn parse(p: &Path, inference: &BondInference) -> Result<Molecule, ParseError> {
    let extension = p
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let mol = match extension.as_str() {
        "xyz" => parse_xyz_str(&fs::read_to_string(p)?, inference)?,
        "mol" | "sdf" => parse_molfile_str(&fs::read_to_string(p)?)?,
        _ => return Err(ParseError::UnsupportedFormat(extension)),
    };
    debug!(path = ?p, formula = mol.formula(), bonds = mol.bond_count(), "loaded molecule");
    Ok(mol)
}

/// Parse an element symbol in any capitalization, or an atomic number.
fn parse_element(symbol: &str, line: usize) -> Result<Element, ParseError> {
    let unknown = || ParseError::UnknownElement {
        line,
        symbol: symbol.to_string(),
    };
    if let Ok(z) = symbol.parse::<u32>() {
        return Element::from_atomic_number(z).ok_or_else(unknown);
    }
    let mut chars = symbol.chars();
    let normalized: String = match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    };
    normalized.parse().map_err(|_| unknown())
}

/// Parse the contents of an XYZ file: an atom count, a comment line and one
/// `symbol x y z` line per atom. Lines after the last atom are ignored.
pub fn parse_xyz_str(input: &str, inference: &BondInference) -> Result<Molecule, ParseError> {
    let mut lines = input.lines().enumerate().map(|(i, l)| (i + 1, l));

    let (_, count_line) = lines
        .next()
        .ok_or_else(|| ParseError::malformed(1, "empty file"))?;
    let count: usize = count_line
        .trim()
        .parse()
        .map_err(|e: ParseIntError| ParseError::malformed(1, format!("bad atom count: {e}")))?;
    lines
        .next()
        .ok_or_else(|| ParseError::malformed(2, "missing comment line"))?;

    let mut atoms = Vec::new();
    for _ in 0..count {
        let (line, text) = lines
            .next()
            .ok_or_else(|| ParseError::malformed(atoms.len() + 3, "fewer atoms than announced"))?;
        atoms.push(parse_xyz_atom(text, line)?);
    }

    let mut bonds = Vec::new();
    for i in 0..atoms.len() {
        for j in (i + 1)..atoms.len() {
            if inference.bonded(&atoms[i], &atoms[j])? {
                bonds.push((i, j));
            }
        }
    }

    let elements: Vec<Element> = atoms.iter().map(|a| a.element).collect();
    Ok(Molecule::from_atoms(&elements, bonds)?)
}

fn parse_xyz_atom(text: &str, line: usize) -> Result<XyzAtom, ParseError> {
    let mut fields = text.split_whitespace();
    let symbol = fields
        .next()
        .ok_or_else(|| ParseError::malformed(line, "empty atom line"))?;
    let element = parse_element(symbol, line)?;

    let mut position = [0.0; 3];
    for coordinate in position.iter_mut() {
        let field = fields
            .next()
            .ok_or_else(|| ParseError::malformed(line, "expected three coordinates"))?;
        *coordinate = field
            .parse()
            .map_err(|_| ParseError::malformed(line, format!("bad coordinate {field:?}")))?;
    }

    Ok(XyzAtom { element, position })
}

/// Parse the first molecule of a `.mol` or `.sdf` file (V2000 connection
/// table). Bond orders are read but not kept.
pub fn parse_molfile_str(input: &str) -> Result<Molecule, ParseError> {
    let mol_data: Vec<&str> = input
        .lines()
        .take_while(|line| !matches!(*line, "$$$$" | "M  END"))
        .collect();

    let counts_line = mol_data
        .get(3)
        .ok_or_else(|| ParseError::malformed(4, "missing counts line"))?;
    let (num_atoms, num_bonds) = parse_counts_line(counts_line)
        .map_err(|e| ParseError::malformed(4, format!("bad counts line: {e}")))?;

    let atom_start = 4;
    let bond_start = atom_start + num_atoms;

    let mut elements = Vec::with_capacity(num_atoms);
    for i in atom_start..bond_start {
        let line = mol_data
            .get(i)
            .ok_or_else(|| ParseError::malformed(i + 1, "fewer atoms than announced"))?;
        let symbol = parse_atom_line(line)
            .ok_or_else(|| ParseError::malformed(i + 1, "atom line too short"))?;
        elements.push(parse_element(symbol, i + 1)?);
    }

    let mut bonds = Vec::with_capacity(num_bonds);
    for i in bond_start..(bond_start + num_bonds) {
        let line = mol_data
            .get(i)
            .ok_or_else(|| ParseError::malformed(i + 1, "fewer bonds than announced"))?;
        let (atom_one, atom_two, _bond_type) = parse_bond_line(line)
            .map_err(|e| ParseError::malformed(i + 1, format!("bad bond line: {e}")))?;
        if atom_one == 0 || atom_two == 0 {
            return Err(ParseError::malformed(i + 1, "atom numbers start at 1"));
        }
        bonds.push((atom_one - 1, atom_two - 1));
    }

    Ok(Molecule::from_atoms(&elements, bonds)?)
}

fn field(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn parse_counts_line(counts_line: &str) -> Result<(usize, usize), ParseIntError> {
    Ok((
        field(counts_line, 0, 3).parse()?,
        field(counts_line, 3, 6).parse()?,
    ))
}

fn parse_atom_line(atom_line: &str) -> Option<&str> {
    let symbol = field(atom_line, 31, 34);
    (!symbol.is_empty()).then_some(symbol)
}

fn parse_bond_line(bond_line: &str) -> Result<(usize, usize, usize), ParseIntError> {
    Ok((
        field(bond_line, 0, 3).parse()?,
        field(bond_line, 3, 6).parse()?,
        field(bond_line, 6, 9).parse()?,
    ))
}
