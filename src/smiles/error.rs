use thiserror::Error;

/// Errors produced when reading a SMILES string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmilesError {
    /// Input ended before a complete token could be read.
    #[error("unexpected end of SMILES")]
    UnexpectedEnd,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    /// An element symbol outside the valence table.
    #[error("unsupported element '{text}' at position {pos}")]
    InvalidElement { pos: usize, text: String },
    #[error("unclosed bracket atom starting at position {pos}")]
    UnclosedBracket { pos: usize },
    /// A ring-opening digit was never matched by a ring-closing digit.
    #[error("unclosed ring {digit}")]
    UnclosedRing { digit: u16 },
    #[error("unmatched parenthesis at position {pos}")]
    UnmatchedParen { pos: usize },
    #[error("invalid charge at position {pos}")]
    InvalidCharge { pos: usize },
    #[error("isotope overflow at position {pos}")]
    InvalidIsotope { pos: usize },
    /// A ring-closure digit with no atom before it, or closing on itself.
    #[error("invalid ring bond {digit} at position {pos}")]
    InvalidRingBond { digit: u16, pos: usize },
    /// Two ring-closure bonds on the same digit specify conflicting bond types.
    #[error("conflicting bond types on ring closure {digit}")]
    RingBondConflict { digit: u16 },
    /// Two atoms joined twice, by a ring closure that duplicates a bond.
    #[error("duplicate bond between atoms {a} and {b}")]
    DuplicateBond { a: usize, b: usize },
    #[error("empty SMILES string")]
    EmptyInput,
}
