// Copyright 2026 the Lineflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Error type for collation operations.
///
/// Carries a non-exhaustive [`ErrorKind`] plus, when relevant, the character
/// being collated and the offending expansion range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// The non-exhaustive category describing this error.
    kind: ErrorKind,

    /// The character whose element was being resolved, when known.
    ch: Option<char>,

    /// The expansion range that failed validation, when relevant.
    expansion: Option<ExpansionInfo>,
}

impl Error {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The character whose collating element was being resolved, if known.
    pub fn character(&self) -> Option<char> {
        self.ch
    }

    /// Details about the offending expansion range, if relevant.
    pub fn expansion(&self) -> Option<ExpansionInfo> {
        self.expansion
    }

    pub(crate) fn not_initialized() -> Self {
        Self {
            kind: ErrorKind::NotInitialized,
            ch: None,
            expansion: None,
        }
    }

    pub(crate) fn corrupt_expansion(ch: char, index: usize, count: usize, pool_len: usize) -> Self {
        Self {
            kind: ErrorKind::CorruptExpansion,
            ch: Some(ch),
            expansion: Some(ExpansionInfo {
                index,
                count,
                pool_len,
            }),
        }
    }

    pub(crate) fn expansion_too_large(ch: char, count: usize) -> Self {
        Self {
            kind: ErrorKind::ExpansionTooLarge,
            ch: Some(ch),
            expansion: Some(ExpansionInfo {
                index: 0,
                count,
                pool_len: 0,
            }),
        }
    }

    pub(crate) fn invalid_weight(ch: char) -> Self {
        Self {
            kind: ErrorKind::InvalidWeight,
            ch: Some(ch),
            expansion: None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            ErrorKind::NotInitialized => {
                write!(f, "collator has not been opened with an element table")
            }
            ErrorKind::CorruptExpansion => {
                let e = self.expansion.unwrap_or(ExpansionInfo {
                    index: 0,
                    count: 0,
                    pool_len: 0,
                });
                write!(
                    f,
                    "expansion {}..{} out of bounds for pool of {}",
                    e.index,
                    e.index + e.count,
                    e.pool_len,
                )?;
                if let Some(ch) = self.ch {
                    write!(f, " (while resolving {ch:?})")?;
                }
                Ok(())
            }
            ErrorKind::ExpansionTooLarge => {
                write!(f, "expansion does not fit the element table")?;
                if let Some(ch) = self.ch {
                    write!(f, " (for {ch:?})")?;
                }
                Ok(())
            }
            ErrorKind::InvalidWeight => {
                write!(f, "weight collides with the level separator")?;
                if let Some(ch) = self.ch {
                    write!(f, " (for {ch:?})")?;
                }
                Ok(())
            }
        }
    }
}

impl core::error::Error for Error {}

/// The non-exhaustive category of a collation error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The collator was queried before being given an element table.
    NotInitialized,

    /// An expansion indirection referenced weights outside the pool.
    ///
    /// This indicates a corrupted table and is unrecoverable; continuing
    /// would produce sort keys with no diagnostic trail.
    CorruptExpansion,

    /// An expansion registered at build time exceeds the table's index or
    /// count capacity.
    ExpansionTooLarge,

    /// A weight registered at build time collides with the reserved level
    /// separator value.
    InvalidWeight,
}

/// Details about an expansion range that failed validation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ExpansionInfo {
    /// The start index into the expansion pool.
    pub index: usize,

    /// The number of sub-elements claimed.
    pub count: usize,

    /// The length of the expansion pool at the time of failure.
    pub pool_len: usize,
}
