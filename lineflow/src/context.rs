// Copyright 2026 the Lineflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared engine context.

use crate::analysis::{CharacterProperties, UnicodeProperties};

/// Immutable context shared by breakers, segment builders and segments.
///
/// Constructed once by the host and passed by reference into the engine;
/// there is no hidden global state. The context owns the character-property
/// capability, which is read-only, so a context may be shared freely across
/// threads as long as the property implementation is.
#[derive(Debug, Default)]
pub struct EngineContext<P: CharacterProperties = UnicodeProperties> {
    props: P,
}

impl EngineContext<UnicodeProperties> {
    /// Creates a context over the compiled Unicode property data.
    pub fn new() -> Self {
        Self {
            props: UnicodeProperties::new(),
        }
    }
}

impl<P: CharacterProperties> EngineContext<P> {
    /// Creates a context over a custom property implementation.
    pub fn with_properties(props: P) -> Self {
        Self { props }
    }

    /// The character-property capability.
    pub fn properties(&self) -> &P {
        &self.props
    }
}
