use crate::element::Element;
use crate::smiles::error::SmilesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Atom(AtomToken),
    Bond(BondToken),
    RingClosure {
        bond: Option<BondToken>,
        digit: u16,
        pos: usize,
    },
    OpenParen(usize),
    CloseParen(usize),
    Dot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomToken {
    pub element: Element,
    pub is_aromatic: bool,
    pub isotope: u16,
    /// `Some` only for bracket atoms; bare atoms get implicit hydrogens.
    pub hcount: Option<u8>,
    pub charge: i8,
    pub pos: usize,
}

impl AtomToken {
    pub fn is_bracket(&self) -> bool {
        self.hcount.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondToken {
    Single,
    Double,
    Triple,
    Aromatic,
    /// `/` or `\`. Stereo is not modelled, so these read as single bonds.
    Directional,
}

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn digits(&mut self) -> Option<u32> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(d @ b'0'..=b'9') = self.peek() {
            value = value.saturating_mul(10).saturating_add(u32::from(d - b'0'));
            self.pos += 1;
        }
        (self.pos > start).then_some(value)
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, SmilesError> {
    let mut sc = Scanner {
        bytes: input.as_bytes(),
        pos: 0,
    };
    let mut tokens = Vec::new();

    while let Some(b) = sc.peek() {
        let pos = sc.pos;
        match b {
            b' ' | b'\t' | b'\r' | b'\n' => sc.pos += 1,
            b'[' => tokens.push(Token::Atom(bracket_atom(&mut sc)?)),
            b'B' if sc.peek_at(1) == Some(b'r') => {
                tokens.push(Token::Atom(bare_atom(Element::Br, false, pos)));
                sc.pos += 2;
            }
            b'C' if sc.peek_at(1) == Some(b'l') => {
                tokens.push(Token::Atom(bare_atom(Element::Cl, false, pos)));
                sc.pos += 2;
            }
            b'B' | b'C' | b'N' | b'O' | b'P' | b'S' | b'F' | b'I' => {
                let element = organic_element(b.to_ascii_uppercase());
                tokens.push(Token::Atom(bare_atom(element, false, pos)));
                sc.pos += 1;
            }
            b'b' | b'c' | b'n' | b'o' | b'p' | b's' => {
                let element = organic_element(b.to_ascii_uppercase());
                tokens.push(Token::Atom(bare_atom(element, true, pos)));
                sc.pos += 1;
            }
            b'-' | b'=' | b'#' | b':' | b'/' | b'\\' => {
                let bond = match b {
                    b'-' => BondToken::Single,
                    b'=' => BondToken::Double,
                    b'#' => BondToken::Triple,
                    b':' => BondToken::Aromatic,
                    _ => BondToken::Directional,
                };
                tokens.push(Token::Bond(bond));
                sc.pos += 1;
            }
            b'(' => {
                tokens.push(Token::OpenParen(pos));
                sc.pos += 1;
            }
            b')' => {
                tokens.push(Token::CloseParen(pos));
                sc.pos += 1;
            }
            b'.' => {
                tokens.push(Token::Dot);
                sc.pos += 1;
            }
            b'%' => {
                sc.pos += 1;
                let (Some(d1 @ b'0'..=b'9'), Some(d2 @ b'0'..=b'9')) = (sc.peek(), sc.peek_at(1))
                else {
                    return Err(SmilesError::UnexpectedChar { pos, ch: '%' });
                };
                sc.pos += 2;
                let digit = u16::from(d1 - b'0') * 10 + u16::from(d2 - b'0');
                let bond = take_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure { bond, digit, pos });
            }
            d @ b'0'..=b'9' => {
                sc.pos += 1;
                let bond = take_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure {
                    bond,
                    digit: u16::from(d - b'0'),
                    pos,
                });
            }
            _ => {
                let ch = input[pos..].chars().next().unwrap_or('?');
                return Err(SmilesError::UnexpectedChar { pos, ch });
            }
        }
    }

    Ok(tokens)
}

fn organic_element(upper: u8) -> Element {
    match upper {
        b'B' => Element::B,
        b'C' => Element::C,
        b'N' => Element::N,
        b'O' => Element::O,
        b'P' => Element::P,
        b'S' => Element::S,
        b'F' => Element::F,
        _ => Element::I,
    }
}

fn bare_atom(element: Element, is_aromatic: bool, pos: usize) -> AtomToken {
    AtomToken {
        element,
        is_aromatic,
        isotope: 0,
        hcount: None,
        charge: 0,
        pos,
    }
}

/// A bond symbol directly before a ring digit belongs to the ring closure.
fn take_pending_bond(tokens: &mut Vec<Token>) -> Option<BondToken> {
    match tokens.last() {
        Some(Token::Bond(b)) => {
            let b = *b;
            tokens.pop();
            Some(b)
        }
        _ => None,
    }
}

fn bracket_atom(sc: &mut Scanner<'_>) -> Result<AtomToken, SmilesError> {
    let start = sc.pos;
    sc.pos += 1; // '['

    let isotope = match sc.digits() {
        Some(v) => u16::try_from(v).map_err(|_| SmilesError::InvalidIsotope { pos: start })?,
        None => 0,
    };

    let (element, is_aromatic) = bracket_element(sc, start)?;

    // Chirality is accepted and dropped.
    if sc.eat(b'@') {
        sc.eat(b'@');
    }

    let hcount = if sc.eat(b'H') {
        match sc.peek() {
            Some(d @ b'0'..=b'9') => {
                sc.pos += 1;
                d - b'0'
            }
            _ => 1,
        }
    } else {
        0
    };

    let charge = bracket_charge(sc, start)?;

    // Atom class, ignored.
    if sc.eat(b':') && sc.digits().is_none() {
        return Err(SmilesError::UnclosedBracket { pos: start });
    }

    if !sc.eat(b']') {
        return Err(match sc.peek() {
            None => SmilesError::UnclosedBracket { pos: start },
            Some(b) => SmilesError::UnexpectedChar {
                pos: sc.pos,
                ch: char::from(b),
            },
        });
    }

    Ok(AtomToken {
        element,
        is_aromatic,
        isotope,
        hcount: Some(hcount),
        charge,
        pos: start,
    })
}

fn bracket_element(sc: &mut Scanner<'_>, start: usize) -> Result<(Element, bool), SmilesError> {
    const AROMATIC: [(&[u8], Element); 9] = [
        (b"se", Element::Se),
        (b"te", Element::Te),
        (b"as", Element::As),
        (b"b", Element::B),
        (b"c", Element::C),
        (b"n", Element::N),
        (b"o", Element::O),
        (b"p", Element::P),
        (b"s", Element::S),
    ];

    let rest = &sc.bytes[sc.pos..];
    let Some(&first) = rest.first() else {
        return Err(SmilesError::UnclosedBracket { pos: start });
    };

    if first.is_ascii_lowercase() {
        if let Some((pat, e)) = AROMATIC.iter().find(|(pat, _)| rest.starts_with(pat)) {
            sc.pos += pat.len();
            return Ok((*e, true));
        }
    }

    if first.is_ascii_uppercase() {
        let len = if rest.get(1).is_some_and(u8::is_ascii_lowercase) {
            2
        } else {
            1
        };
        // Prefer the two-letter symbol; `[Sc]` is scandium, not S + c.
        for l in (1..=len).rev() {
            let sym = std::str::from_utf8(&rest[..l]).unwrap_or_default();
            if let Some(e) = Element::from_symbol(sym) {
                sc.pos += l;
                return Ok((e, false));
            }
            if l == 2 && rest.get(2).is_some_and(|b| matches!(b, b'@' | b'H' | b']' | b'+' | b'-' | b':')) {
                return Err(SmilesError::InvalidElement {
                    pos: sc.pos,
                    text: sym.to_string(),
                });
            }
        }
    }

    let text: String = rest
        .iter()
        .take_while(|b| b.is_ascii_alphabetic())
        .map(|&b| char::from(b))
        .collect();
    Err(SmilesError::InvalidElement { pos: sc.pos, text })
}

fn bracket_charge(sc: &mut Scanner<'_>, start: usize) -> Result<i8, SmilesError> {
    let sign: i8 = match sc.peek() {
        Some(b'+') => 1,
        Some(b'-') => -1,
        _ => return Ok(0),
    };
    let symbol = if sign > 0 { b'+' } else { b'-' };
    sc.pos += 1;

    let magnitude: i8 = if let Some(v) = sc.digits() {
        i8::try_from(v).map_err(|_| SmilesError::InvalidCharge { pos: start })?
    } else {
        let mut count: i8 = 1;
        while sc.eat(symbol) {
            count = count
                .checked_add(1)
                .ok_or(SmilesError::InvalidCharge { pos: start })?;
        }
        count
    };
    Ok(sign * magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_atom(s: &str) -> AtomToken {
        let tokens = tokenize(s).unwrap();
        assert_eq!(tokens.len(), 1, "{s}");
        match tokens.into_iter().next() {
            Some(Token::Atom(a)) => a,
            other => panic!("expected atom, got {other:?}"),
        }
    }

    #[test]
    fn tokenize_methane() {
        let a = only_atom("C");
        assert_eq!(a.element, Element::C);
        assert!(!a.is_bracket());
        assert!(!a.is_aromatic);
    }

    #[test]
    fn two_letter_organic() {
        assert_eq!(only_atom("Cl").element, Element::Cl);
        assert_eq!(only_atom("Br").element, Element::Br);
        assert_eq!(tokenize("CCl").unwrap().len(), 2);
    }

    #[test]
    fn tokenize_ethene() {
        let tokens = tokenize("C=C").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1], Token::Bond(BondToken::Double));
    }

    #[test]
    fn tokenize_bracket_atom() {
        let a = only_atom("[NH4+]");
        assert_eq!(a.element, Element::N);
        assert!(a.is_bracket());
        assert_eq!(a.hcount, Some(4));
        assert_eq!(a.charge, 1);
    }

    #[test]
    fn bracket_without_h_has_zero_hcount() {
        assert_eq!(only_atom("[C]").hcount, Some(0));
    }

    #[test]
    fn tokenize_isotope() {
        let a = only_atom("[13C]");
        assert_eq!(a.isotope, 13);
        assert_eq!(a.element, Element::C);
    }

    #[test]
    fn tokenize_ring_closure() {
        let tokens = tokenize("C1CC1").unwrap();
        assert_eq!(tokens.len(), 5);
        assert!(matches!(&tokens[1], Token::RingClosure { digit: 1, bond: None, .. }));
    }

    #[test]
    fn ring_closure_takes_bond() {
        let tokens = tokenize("C=1CC1").unwrap();
        assert!(matches!(
            &tokens[1],
            Token::RingClosure { digit: 1, bond: Some(BondToken::Double), .. }
        ));
    }

    #[test]
    fn tokenize_percent_ring() {
        let tokens = tokenize("C%10CC%10").unwrap();
        assert!(matches!(&tokens[1], Token::RingClosure { digit: 10, .. }));
    }

    #[test]
    fn chirality_is_dropped() {
        let a = only_atom("[C@@H]");
        assert_eq!(a.hcount, Some(1));
        assert_eq!(a.element, Element::C);
    }

    #[test]
    fn tokenize_aromatic() {
        let tokens = tokenize("c1ccccc1").unwrap();
        assert_eq!(tokens.len(), 8);
        let Token::Atom(a) = &tokens[0] else {
            panic!("expected atom")
        };
        assert!(a.is_aromatic);
        assert_eq!(a.element, Element::C);
    }

    #[test]
    fn bracket_aromatic_se() {
        let a = only_atom("[se]");
        assert!(a.is_aromatic);
        assert_eq!(a.element, Element::Se);
    }

    #[test]
    fn charge_variants() {
        assert_eq!(only_atom("[O-]").charge, -1);
        assert_eq!(only_atom("[O-2]").charge, -2);
        assert_eq!(only_atom("[O--]").charge, -2);
        assert_eq!(only_atom("[N+]").charge, 1);
        assert_eq!(only_atom("[C+2]").charge, 2);
    }

    #[test]
    fn atom_class_ignored() {
        let a = only_atom("[CH3:1]");
        assert_eq!(a.hcount, Some(3));
    }

    #[test]
    fn unsupported_element() {
        assert!(matches!(
            tokenize("[Fe]"),
            Err(SmilesError::InvalidElement { .. })
        ));
    }

    #[test]
    fn unclosed_bracket() {
        assert!(matches!(
            tokenize("[CH4"),
            Err(SmilesError::UnclosedBracket { pos: 0 })
        ));
    }

    #[test]
    fn unexpected_char() {
        assert!(matches!(
            tokenize("C$C"),
            Err(SmilesError::UnexpectedChar { pos: 1, ch: '$' })
        ));
    }
}
