//! The valence table: elements an agent can place, with the bonding
//! capacities the SMILES reader and the sanitizer agree on.

use std::fmt;

/// Elements that carry a usable default valence.
///
/// Metals and noble gases are deliberately absent: they have no implicit
/// hydrogen model, so they can never take part in a graph edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Element {
    H = 1,
    B = 5,
    C = 6,
    N = 7,
    O = 8,
    F = 9,
    Si = 14,
    P = 15,
    S = 16,
    Cl = 17,
    Ge = 32,
    As = 33,
    Se = 34,
    Br = 35,
    Te = 52,
    I = 53,
}

const ALL: [Element; 16] = [
    Element::H,
    Element::B,
    Element::C,
    Element::N,
    Element::O,
    Element::F,
    Element::Si,
    Element::P,
    Element::S,
    Element::Cl,
    Element::Ge,
    Element::As,
    Element::Se,
    Element::Br,
    Element::Te,
    Element::I,
];

impl Element {
    pub fn all() -> &'static [Element] {
        &ALL
    }

    pub fn from_atomic_num(n: u8) -> Option<Element> {
        ALL.iter().copied().find(|e| e.atomic_num() == n)
    }

    pub fn from_symbol(s: &str) -> Option<Element> {
        ALL.iter().copied().find(|e| e.symbol() == s)
    }

    pub fn atomic_num(self) -> u8 {
        self as u8
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Element::H => "H",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Si => "Si",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::Ge => "Ge",
            Element::As => "As",
            Element::Se => "Se",
            Element::Br => "Br",
            Element::Te => "Te",
            Element::I => "I",
        }
    }

    /// Valences tried in ascending order when assigning implicit hydrogens
    /// to a neutral atom.
    pub fn default_valences(self) -> &'static [u8] {
        match self {
            Element::H => &[1],
            Element::B => &[3],
            Element::C => &[4],
            Element::N => &[3, 5],
            Element::O => &[2],
            Element::F | Element::Cl | Element::Br => &[1],
            Element::Si | Element::Ge => &[4],
            Element::P | Element::As => &[3, 5],
            Element::S | Element::Se | Element::Te => &[2, 4, 6],
            Element::I => &[1, 3, 5, 7],
        }
    }

    /// Maximum number of new bonds an atom of this type can form when it is
    /// introduced by an edit: the first default valence.
    pub fn max_valence(self) -> u8 {
        self.default_valences()[0]
    }

    pub fn outer_shell_electrons(self) -> u8 {
        match self {
            Element::H => 1,
            Element::B => 3,
            Element::C | Element::Si | Element::Ge => 4,
            Element::N | Element::P | Element::As => 5,
            Element::O | Element::S | Element::Se | Element::Te => 6,
            Element::F | Element::Cl | Element::Br | Element::I => 7,
        }
    }

    /// Atoms that may be written without brackets in SMILES.
    pub fn is_organic_subset(self) -> bool {
        matches!(
            self,
            Element::B
                | Element::C
                | Element::N
                | Element::O
                | Element::P
                | Element::S
                | Element::F
                | Element::Cl
                | Element::Br
                | Element::I
        )
    }

    /// Atoms that can take part in an aromatic pi system.
    pub fn is_sp2_capable(self) -> bool {
        matches!(
            self,
            Element::B
                | Element::C
                | Element::N
                | Element::O
                | Element::P
                | Element::S
                | Element::As
                | Element::Se
                | Element::Te
        )
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_round_trip() {
        for &e in Element::all() {
            assert_eq!(Element::from_symbol(e.symbol()), Some(e));
        }
    }

    #[test]
    fn atomic_num_round_trip() {
        for &e in Element::all() {
            assert_eq!(Element::from_atomic_num(e.atomic_num()), Some(e));
        }
        assert!(Element::from_atomic_num(0).is_none());
        assert!(Element::from_atomic_num(26).is_none());
    }

    #[test]
    fn from_symbol_case_sensitive() {
        assert!(Element::from_symbol("cl").is_none());
        assert!(Element::from_symbol("CL").is_none());
        assert!(Element::from_symbol("").is_none());
        assert!(Element::from_symbol("Fe").is_none());
    }

    #[test]
    fn max_valence_table() {
        assert_eq!(Element::C.max_valence(), 4);
        assert_eq!(Element::N.max_valence(), 3);
        assert_eq!(Element::O.max_valence(), 2);
        assert_eq!(Element::S.max_valence(), 2);
        assert_eq!(Element::P.max_valence(), 3);
        assert_eq!(Element::F.max_valence(), 1);
        assert_eq!(Element::Cl.max_valence(), 1);
        assert_eq!(Element::B.max_valence(), 3);
    }

    #[test]
    fn default_valences_ascending() {
        for &e in Element::all() {
            let v = e.default_valences();
            assert!(!v.is_empty());
            assert!(v.windows(2).all(|w| w[0] < w[1]), "{e}");
        }
    }

    #[test]
    fn organic_subset() {
        assert!(Element::C.is_organic_subset());
        assert!(Element::Br.is_organic_subset());
        assert!(!Element::Se.is_organic_subset());
        assert!(!Element::H.is_organic_subset());
    }
}
