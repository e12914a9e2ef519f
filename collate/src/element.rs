// Copyright 2026 the Lineflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packed collating elements.

/// The three sort weights of a collating element.
///
/// A weight of zero at a level means the element is invisible at that level:
/// it contributes nothing to the corresponding section of a sort key. Nonzero
/// weights must be greater than [`LEVEL_SEPARATOR`].
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct Weights {
    /// Primary weight (base character identity).
    pub primary: u16,
    /// Secondary weight.
    pub secondary: u16,
    /// Tertiary weight (case and mark distinctions).
    pub tertiary: u16,
}

impl Weights {
    /// Creates a weight triple.
    pub const fn new(primary: u16, secondary: u16, tertiary: u16) -> Self {
        Self {
            primary,
            secondary,
            tertiary,
        }
    }

    /// Returns `true` if every level is zero.
    pub fn is_zero(self) -> bool {
        self.primary == 0 && self.secondary == 0 && self.tertiary == 0
    }

    pub(crate) fn level(self, level: Level) -> u16 {
        match level {
            Level::Primary => self.primary,
            Level::Secondary => self.secondary,
            Level::Tertiary => self.tertiary,
        }
    }
}

/// A comparison level within a sort key.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum Level {
    Primary,
    Secondary,
    Tertiary,
}

impl Level {
    pub(crate) const ALL: [Self; 3] = [Self::Primary, Self::Secondary, Self::Tertiary];
}

/// Separator written between sort key levels.
///
/// Strictly lower than any valid weight so a shorter string's key can never
/// compare greater purely because of truncation.
pub const LEVEL_SEPARATOR: u16 = 0x0001;

/// The lowest weight a table entry may carry at any level.
///
/// Also used as the placeholder weight contributed by variant elements when
/// variants are not being ignored.
pub const MIN_WEIGHT: u16 = 0x0002;

// Flag bits for `RawElement::flags`.
pub(crate) const ASSIGNED: u8 = 1 << 0;
pub(crate) const VARIANT: u8 = 1 << 1;
pub(crate) const EXPANSION: u8 = 1 << 2;
pub(crate) const REORDERED: u8 = 1 << 3;

/// Packed table entry for one character.
///
/// For expansion entries the weight fields are repurposed: `primary` holds
/// the start index into the expansion pool and `secondary` the sub-element
/// count. Expansion pool entries are always plain weight entries, so the
/// indirection is at most one level deep by construction.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub(crate) struct RawElement {
    pub(crate) primary: u16,
    pub(crate) secondary: u16,
    pub(crate) tertiary: u16,
    pub(crate) flags: u8,
}

impl RawElement {
    pub(crate) fn weights(w: Weights, flags: u8) -> Self {
        Self {
            primary: w.primary,
            secondary: w.secondary,
            tertiary: w.tertiary,
            flags: flags | ASSIGNED,
        }
    }

    pub(crate) fn expansion(index: u16, count: u16, flags: u8) -> Self {
        Self {
            primary: index,
            secondary: count,
            tertiary: 0,
            flags: flags | EXPANSION | ASSIGNED,
        }
    }

    pub(crate) fn is_assigned(self) -> bool {
        self.flags & ASSIGNED != 0
    }

    pub(crate) fn is_variant(self) -> bool {
        self.flags & VARIANT != 0
    }

    pub(crate) fn is_expansion(self) -> bool {
        self.flags & EXPANSION != 0
    }

    /// Reserved for tailorings that reverse secondary ordering. Carried in
    /// the table format but not consulted by the default comparator.
    #[allow(dead_code, reason = "table format carries the flag for tailorings")]
    pub(crate) fn is_reordered(self) -> bool {
        self.flags & REORDERED != 0
    }

    pub(crate) fn to_weights(self) -> Weights {
        debug_assert!(!self.is_expansion(), "expansion entries carry no weights");
        Weights {
            primary: self.primary,
            secondary: self.secondary,
            tertiary: self.tertiary,
        }
    }
}
