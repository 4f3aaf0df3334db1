//! Names and the string interner behind them.
//!
//! A [`Name`] is either a regular identifier written by the user or a
//! *special* name the compiler invents for internal containers (`<module>`,
//! `<builtins>`, `<individual imports>`). The two flavors never compare equal,
//! even when their text matches.
//!
//! Names store their text as a `SmolStr`, so cloning never allocates. The
//! [`Interner`] additionally deduplicates text so names built from the same
//! identifier share one allocation.

use std::fmt;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
enum NameFlavor {
    Identifier,
    Special,
}

/// An identifier with identity semantics.
///
/// Equality and hashing use both the flavor and the text.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Name {
    flavor: NameFlavor,
    text: SmolStr,
}

impl Name {
    /// A regular, user-visible identifier.
    pub fn identifier(text: impl AsRef<str>) -> Self {
        Self {
            flavor: NameFlavor::Identifier,
            text: SmolStr::new(text),
        }
    }

    /// A synthetic name. Renders as `<debug_text>`.
    pub fn special(debug_text: impl AsRef<str>) -> Self {
        Self {
            flavor: NameFlavor::Special,
            text: SmolStr::new(debug_text),
        }
    }

    pub fn is_special(&self) -> bool {
        self.flavor == NameFlavor::Special
    }

    /// The identifier text, or the debug text of a special name.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.flavor {
            NameFlavor::Identifier => f.write_str(&self.text),
            NameFlavor::Special => write!(f, "<{}>", self.text),
        }
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({self})")
    }
}

// ============================================================================
// INTERNER
// ============================================================================

/// Deduplicates identifier text.
///
/// Interning is an allocation optimization only: two names built from equal
/// text are equal whether or not they came from the same interner.
#[derive(Debug, Default, Clone)]
pub struct Interner {
    strings: FxHashSet<SmolStr>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text` as a regular identifier.
    pub fn identifier(&mut self, text: &str) -> Name {
        Name {
            flavor: NameFlavor::Identifier,
            text: self.intern(text),
        }
    }

    /// Intern `debug_text` as a special name.
    pub fn special(&mut self, debug_text: &str) -> Name {
        Name {
            flavor: NameFlavor::Special,
            text: self.intern(debug_text),
        }
    }

    fn intern(&mut self, text: &str) -> SmolStr {
        if let Some(existing) = self.strings.get(text) {
            existing.clone()
        } else {
            let interned = SmolStr::new(text);
            self.strings.insert(interned.clone());
            interned
        }
    }

    /// Number of unique strings interned.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Returns true if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
