use crate::element::Element;

/// A heavy atom in a molecular graph.
///
/// Hydrogens are never graph nodes. They are split into two counts so the
/// sanitizer knows which ones it may recompute: `implicit_hydrogens` follow
/// the atom's bonding and are reassigned on every sanitize, while
/// `explicit_hydrogens` come from a bracket atom like `[nH]` and stay fixed.
///
/// # Examples
///
/// ```
/// use molenv::{Atom, Element};
///
/// let carbon = Atom::new(Element::C);
/// assert_eq!(carbon.element, Element::C);
/// assert_eq!(carbon.total_hydrogens(), 0);
/// assert!(!carbon.no_implicit);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub element: Element,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance.
    pub isotope: u16,
    pub explicit_hydrogens: u8,
    /// Free valence: bonding capacity the enumerator may spend on edits.
    pub implicit_hydrogens: u8,
    /// Set for bracket atoms, whose hydrogen count is part of the input and
    /// must not be recomputed.
    pub no_implicit: bool,
    pub is_aromatic: bool,
    pub is_in_ring: bool,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            formal_charge: 0,
            isotope: 0,
            explicit_hydrogens: 0,
            implicit_hydrogens: 0,
            no_implicit: false,
            is_aromatic: false,
            is_in_ring: false,
        }
    }

    pub fn total_hydrogens(&self) -> u8 {
        self.explicit_hydrogens + self.implicit_hydrogens
    }
}
