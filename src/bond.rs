/// Bond order as stored on a graph edge.
///
/// `Aromatic` is the backend's own representation of a delocalized bond.
/// It has no integer value; kekulize a molecule before doing arithmetic on
/// its bond orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Integer order for the standard bond types, `None` for aromatic.
    pub fn valence(self) -> Option<u8> {
        match self {
            BondOrder::Single => Some(1),
            BondOrder::Double => Some(2),
            BondOrder::Triple => Some(3),
            BondOrder::Aromatic => None,
        }
    }

    pub fn from_valence(order: u8) -> Option<BondOrder> {
        match order {
            1 => Some(BondOrder::Single),
            2 => Some(BondOrder::Double),
            3 => Some(BondOrder::Triple),
            _ => None,
        }
    }

    /// Contribution to an atom's bond-order sum as the SMILES reader counts
    /// it: an aromatic bond counts as one.
    pub(crate) fn reader_contribution(self) -> u8 {
        self.valence().unwrap_or(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bond {
    pub order: BondOrder,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self { order }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_orders() {
        for n in 1..=3 {
            assert_eq!(BondOrder::from_valence(n).and_then(BondOrder::valence), Some(n));
        }
        assert_eq!(BondOrder::from_valence(0), None);
        assert_eq!(BondOrder::from_valence(4), None);
        assert_eq!(BondOrder::Aromatic.valence(), None);
    }

    #[test]
    fn aromatic_reads_as_one() {
        assert_eq!(BondOrder::Aromatic.reader_contribution(), 1);
        assert_eq!(BondOrder::Triple.reader_contribution(), 3);
    }
}
