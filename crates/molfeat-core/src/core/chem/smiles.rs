use super::elements::is_bracket_symbol;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Invalid SMILES '{smiles}' at position {position}: {kind}")]
pub struct SmilesError {
    pub smiles: String,
    pub position: usize,
    pub kind: SmilesErrorKind,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SmilesErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("unknown element symbol '{0}'")]
    UnknownElement(String),
    #[error("bracket atom is not closed")]
    UnterminatedBracket,
    #[error("unbalanced branch parenthesis")]
    UnbalancedBranch,
    #[error("ring bond {0} is never closed")]
    UnclosedRing(u32),
    #[error("'%' must be followed by two digits")]
    MalformedRingLabel,
}

struct BracketAtom {
    isotope: bool,
    symbol: String,
    charge: i32,
}

impl BracketAtom {
    // Plain hydrogens become implicit when explicit hydrogens are removed.
    fn is_plain_hydrogen(&self) -> bool {
        self.symbol == "H" && !self.isotope && self.charge == 0
    }
}

fn parse_bracket(body: &[char]) -> Result<BracketAtom, (usize, SmilesErrorKind)> {
    let mut i = 0;

    let isotope_start = i;
    while i < body.len() && body[i].is_ascii_digit() {
        i += 1;
    }
    let isotope = i > isotope_start;

    let symbol = match body.get(i) {
        Some('*') => {
            i += 1;
            "*".to_string()
        }
        Some(&first) if first.is_ascii_alphabetic() => {
            let two: Option<String> = body
                .get(i + 1)
                .filter(|c| c.is_ascii_lowercase())
                .map(|second| [first, *second].iter().collect());
            match two {
                Some(candidate) if is_bracket_symbol(&candidate) => {
                    i += 2;
                    candidate
                }
                _ => {
                    let single = first.to_string();
                    if !is_bracket_symbol(&single) {
                        return Err((i, SmilesErrorKind::UnknownElement(single)));
                    }
                    i += 1;
                    single
                }
            }
        }
        Some(&other) => return Err((i, SmilesErrorKind::UnexpectedCharacter(other))),
        None => return Err((i, SmilesErrorKind::UnknownElement(String::new()))),
    };

    if body.get(i) == Some(&'@') {
        i += 1;
        if body.get(i) == Some(&'@') {
            i += 1;
        } else if let Some(['T', 'H'] | ['A', 'L'] | ['S', 'P'] | ['T', 'B'] | ['O', 'H']) =
            body.get(i..i + 2)
        {
            i += 2;
            while i < body.len() && body[i].is_ascii_digit() {
                i += 1;
            }
        }
    }

    if body.get(i) == Some(&'H') {
        i += 1;
        while i < body.len() && body[i].is_ascii_digit() {
            i += 1;
        }
    }

    let mut charge = 0i32;
    if let Some(&sign) = body.get(i).filter(|c| **c == '+' || **c == '-') {
        let unit = if sign == '+' { 1 } else { -1 };
        i += 1;
        let digits_start = i;
        while i < body.len() && body[i].is_ascii_digit() {
            i += 1;
        }
        if i > digits_start {
            let magnitude: i32 = body[digits_start..i]
                .iter()
                .collect::<String>()
                .parse()
                .unwrap_or(0);
            charge = unit * magnitude;
        } else {
            charge = unit;
            while body.get(i) == Some(&sign) {
                charge += unit;
                i += 1;
            }
        }
    }

    if body.get(i) == Some(&':') {
        i += 1;
        while i < body.len() && body[i].is_ascii_digit() {
            i += 1;
        }
    }

    match body.get(i) {
        None => Ok(BracketAtom {
            isotope,
            symbol,
            charge,
        }),
        Some(&other) => Err((i, SmilesErrorKind::UnexpectedCharacter(other))),
    }
}

#[derive(Default)]
struct Graph {
    plain_hydrogen: Vec<bool>,
    neighbors: Vec<Vec<usize>>,
}

impl Graph {
    fn add_atom(&mut self, plain_hydrogen: bool, previous: Option<usize>) -> usize {
        let idx = self.plain_hydrogen.len();
        self.plain_hydrogen.push(plain_hydrogen);
        self.neighbors.push(Vec::new());
        if let Some(prev) = previous {
            self.bond(prev, idx);
        }
        idx
    }

    fn bond(&mut self, a: usize, b: usize) {
        self.neighbors[a].push(b);
        self.neighbors[b].push(a);
    }

    // A plain hydrogen is implicit when its single neighbour is not itself a hydrogen.
    fn is_removable(&self, idx: usize) -> bool {
        self.plain_hydrogen[idx]
            && matches!(self.neighbors[idx].as_slice(), [n] if !self.plain_hydrogen[*n])
    }

    fn count_retained(&self) -> usize {
        (0..self.plain_hydrogen.len())
            .filter(|&idx| !self.is_removable(idx))
            .count()
    }
}

/// Counts the atoms of a molecule written as SMILES after hydrogen removal.
///
/// The count follows the default hydrogen removal of chemistry toolkits such as
/// RDKit: organic-subset atoms, wildcards and bracket atoms each count once,
/// while a plain bracket hydrogen (`[H]` without isotope or charge) is dropped
/// when it is bonded to exactly one atom that is not a plain hydrogen.
/// Unbonded hydrogens, `H-H` pairs and bridging hydrogens are kept.
///
/// Only the syntax is checked; valences and aromaticity are not.
///
/// # Arguments
///
/// * `smiles` - The SMILES string.
///
/// # Return
///
/// Returns the number of atoms. An empty string has zero atoms.
///
/// # Errors
///
/// Returns a [`SmilesError`] locating the first syntax problem.
pub fn count_atoms(smiles: &str) -> Result<usize, SmilesError> {
    let fail = |position: usize, kind: SmilesErrorKind| SmilesError {
        smiles: smiles.to_string(),
        position,
        kind,
    };

    let chars: Vec<char> = smiles.chars().collect();
    let mut graph = Graph::default();
    let mut previous: Option<usize> = None;
    let mut branches: Vec<Option<usize>> = Vec::new();
    let mut open_rings: BTreeMap<u32, usize> = BTreeMap::new();

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let ring_label = match c {
            '[' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == ']')
                    .map(|offset| i + 1 + offset)
                    .ok_or_else(|| fail(i, SmilesErrorKind::UnterminatedBracket))?;
                let atom = parse_bracket(&chars[i + 1..close])
                    .map_err(|(offset, kind)| fail(i + 1 + offset, kind))?;
                previous = Some(graph.add_atom(atom.is_plain_hydrogen(), previous));
                i = close;
                None
            }
            'B' | 'C' => {
                if matches!(chars.get(i + 1), Some('r') if c == 'B')
                    || matches!(chars.get(i + 1), Some('l') if c == 'C')
                {
                    i += 1;
                }
                previous = Some(graph.add_atom(false, previous));
                None
            }
            'N' | 'O' | 'P' | 'S' | 'F' | 'I' | 'b' | 'c' | 'n' | 'o' | 'p' | 's' | '*' => {
                previous = Some(graph.add_atom(false, previous));
                None
            }
            '(' => {
                branches.push(previous);
                None
            }
            ')' => {
                previous = branches
                    .pop()
                    .ok_or_else(|| fail(i, SmilesErrorKind::UnbalancedBranch))?;
                None
            }
            '.' => {
                previous = None;
                None
            }
            '-' | '=' | '#' | '$' | ':' | '/' | '\\' => None,
            '0'..='9' => Some(c as u32 - '0' as u32),
            '%' => {
                let label: Option<u32> = chars
                    .get(i + 1..i + 3)
                    .filter(|d| d.iter().all(char::is_ascii_digit))
                    .and_then(|d| d.iter().collect::<String>().parse().ok());
                let label = label.ok_or_else(|| fail(i, SmilesErrorKind::MalformedRingLabel))?;
                i += 2;
                Some(label)
            }
            other => return Err(fail(i, SmilesErrorKind::UnexpectedCharacter(other))),
        };

        if let Some(label) = ring_label {
            let atom = previous.ok_or_else(|| fail(i, SmilesErrorKind::UnexpectedCharacter(c)))?;
            match open_rings.remove(&label) {
                Some(partner) => graph.bond(partner, atom),
                None => {
                    open_rings.insert(label, atom);
                }
            }
        }
        i += 1;
    }

    if !branches.is_empty() {
        return Err(fail(chars.len(), SmilesErrorKind::UnbalancedBranch));
    }
    if let Some(&label) = open_rings.keys().next() {
        return Err(fail(chars.len(), SmilesErrorKind::UnclosedRing(label)));
    }

    Ok(graph.count_retained())
}
