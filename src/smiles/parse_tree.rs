use crate::smiles::error::SmilesError;
use crate::smiles::tokenizer::{AtomToken, BondToken, Token};

#[derive(Debug, Clone)]
pub struct ParseTree {
    pub atoms: Vec<AtomToken>,
    pub edges: Vec<ParseEdge>,
}

#[derive(Debug, Clone, Copy)]
pub struct ParseEdge {
    pub a: usize,
    pub b: usize,
    pub bond: Option<BondToken>,
}

struct RingOpen {
    atom: usize,
    bond: Option<BondToken>,
}

pub fn build_parse_tree(tokens: &[Token]) -> Result<ParseTree, SmilesError> {
    let mut atoms: Vec<AtomToken> = Vec::new();
    let mut edges: Vec<ParseEdge> = Vec::new();
    let mut branch_stack: Vec<(usize, usize)> = Vec::new();
    let mut current: Option<usize> = None;
    let mut pending_bond: Option<BondToken> = None;
    let mut ring_opens: Vec<Option<RingOpen>> = (0..100).map(|_| None).collect();

    for token in tokens {
        match token {
            Token::Atom(atom) => {
                let idx = atoms.len();
                atoms.push(atom.clone());
                if let Some(prev) = current {
                    edges.push(ParseEdge {
                        a: prev,
                        b: idx,
                        bond: pending_bond.take(),
                    });
                } else if pending_bond.take().is_some() {
                    return Err(SmilesError::UnexpectedChar {
                        pos: atom.pos,
                        ch: '-',
                    });
                }
                current = Some(idx);
            }
            Token::Bond(b) => {
                if current.is_none() || pending_bond.is_some() {
                    return Err(SmilesError::UnexpectedEnd);
                }
                pending_bond = Some(*b);
            }
            Token::RingClosure { bond, digit, pos } => {
                let cur = current.ok_or(SmilesError::InvalidRingBond {
                    digit: *digit,
                    pos: *pos,
                })?;
                let slot = &mut ring_opens[usize::from(*digit)];
                match slot.take() {
                    Some(open) => {
                        if open.atom == cur {
                            return Err(SmilesError::InvalidRingBond {
                                digit: *digit,
                                pos: *pos,
                            });
                        }
                        let ring_bond = match (*bond, open.bond) {
                            (Some(b1), Some(b2)) if b1 != b2 => {
                                return Err(SmilesError::RingBondConflict { digit: *digit });
                            }
                            (b1, b2) => b1.or(b2),
                        };
                        edges.push(ParseEdge {
                            a: open.atom,
                            b: cur,
                            bond: ring_bond,
                        });
                    }
                    None => {
                        *slot = Some(RingOpen {
                            atom: cur,
                            bond: *bond,
                        });
                    }
                }
            }
            Token::OpenParen(pos) => {
                let cur = current.ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                branch_stack.push((cur, *pos));
            }
            Token::CloseParen(pos) => {
                let (atom, _) = branch_stack
                    .pop()
                    .ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                if pending_bond.is_some() {
                    return Err(SmilesError::UnexpectedChar { pos: *pos, ch: ')' });
                }
                current = Some(atom);
            }
            Token::Dot => {
                if pending_bond.is_some() {
                    return Err(SmilesError::UnexpectedEnd);
                }
                current = None;
            }
        }
    }

    if let Some(&(_, pos)) = branch_stack.last() {
        return Err(SmilesError::UnmatchedParen { pos });
    }
    if pending_bond.is_some() {
        return Err(SmilesError::UnexpectedEnd);
    }
    if let Some(digit) = ring_opens.iter().position(Option::is_some) {
        return Err(SmilesError::UnclosedRing {
            digit: digit as u16,
        });
    }

    let mut seen = std::collections::HashSet::new();
    for e in &edges {
        if !seen.insert((e.a.min(e.b), e.a.max(e.b))) {
            return Err(SmilesError::DuplicateBond { a: e.a, b: e.b });
        }
    }

    Ok(ParseTree { atoms, edges })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::tokenizer::tokenize;

    fn tree(s: &str) -> Result<ParseTree, SmilesError> {
        build_parse_tree(&tokenize(s).unwrap())
    }

    fn degree(t: &ParseTree, i: usize) -> usize {
        t.edges.iter().filter(|e| e.a == i || e.b == i).count()
    }

    #[test]
    fn ethane_tree() {
        let t = tree("CC").unwrap();
        assert_eq!(t.atoms.len(), 2);
        assert_eq!(t.edges.len(), 1);
    }

    #[test]
    fn cyclohexane_tree() {
        let t = tree("C1CCCCC1").unwrap();
        assert_eq!(t.atoms.len(), 6);
        for i in 0..6 {
            assert_eq!(degree(&t, i), 2);
        }
    }

    #[test]
    fn branch_tree() {
        let t = tree("CC(C)C").unwrap();
        assert_eq!(t.atoms.len(), 4);
        assert_eq!(degree(&t, 1), 3);
    }

    #[test]
    fn ring_bond_from_either_side() {
        let t = tree("C=1CCC1").unwrap();
        let closure = t.edges.last().unwrap();
        assert_eq!(closure.bond, Some(BondToken::Double));
        let t = tree("C1CCC=1").unwrap();
        assert_eq!(t.edges.last().unwrap().bond, Some(BondToken::Double));
    }

    #[test]
    fn ring_bond_conflict() {
        assert!(matches!(
            tree("C=1CCC#1"),
            Err(SmilesError::RingBondConflict { digit: 1 })
        ));
    }

    #[test]
    fn unclosed_ring_error() {
        assert!(matches!(tree("C1CC"), Err(SmilesError::UnclosedRing { digit: 1 })));
    }

    #[test]
    fn unmatched_paren_error() {
        assert!(tree("C(C").is_err());
        assert!(tree("CC)C").is_err());
    }

    #[test]
    fn duplicate_bond_error() {
        assert!(matches!(tree("C1C1"), Err(SmilesError::DuplicateBond { .. })));
    }

    #[test]
    fn dangling_bond_error() {
        assert!(tree("CC=").is_err());
        assert!(tree("=CC").is_err());
    }

    #[test]
    fn disconnected() {
        let t = tree("[Cl-].[Cl-]").unwrap();
        assert_eq!(t.atoms.len(), 2);
        assert!(t.edges.is_empty());
    }
}
