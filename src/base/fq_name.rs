//! Fully-qualified names and import paths.

use std::fmt;

use super::name::Name;

/// A dotted path of identifiers from the root namespace.
///
/// The root namespace has the empty path.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FqName {
    segments: Vec<Name>,
}

impl FqName {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse `a.b.c`. The empty string is the root.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::root();
        }
        Self::from_segments(text.split('.').map(Name::identifier))
    }

    pub fn from_segments(segments: impl IntoIterator<Item = Name>) -> Self {
        Self {
            segments: segments.into_iter().collect(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Name] {
        &self.segments
    }

    pub fn child(&self, name: Name) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name);
        Self { segments }
    }

    /// The enclosing path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.to_vec(),
        })
    }

    pub fn short_name(&self) -> Option<&Name> {
        self.segments.last()
    }

    /// All proper prefixes followed by the path itself, root first.
    pub fn ancestors_and_self(&self) -> impl Iterator<Item = FqName> + '_ {
        (0..=self.segments.len()).map(|len| Self {
            segments: self.segments[..len].to_vec(),
        })
    }
}

impl fmt::Display for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FqName({self})")
    }
}

// ============================================================================
// IMPORT PATH
// ============================================================================

/// The target of an import directive: `a.b.C`, `a.b.*` or `a.b.C as D`.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImportPath {
    fq_name: FqName,
    all_under: bool,
    alias: Option<Name>,
}

impl ImportPath {
    pub fn new(fq_name: FqName, all_under: bool) -> Self {
        Self {
            fq_name,
            all_under,
            alias: None,
        }
    }

    /// Parse `a.b.*`, `a.b.C` or `a.b.C as D`.
    pub fn parse(text: &str) -> Self {
        let (path, alias) = match text.split_once(" as ") {
            Some((path, alias)) => (path.trim(), Some(Name::identifier(alias.trim()))),
            None => (text.trim(), None),
        };
        match path.strip_suffix(".*") {
            Some(prefix) => Self::new(FqName::parse(prefix), true),
            None if path == "*" => Self::new(FqName::root(), true),
            None => Self {
                fq_name: FqName::parse(path),
                all_under: false,
                alias,
            },
        }
    }

    pub fn with_alias(mut self, alias: Name) -> Self {
        if !self.all_under {
            self.alias = Some(alias);
        }
        self
    }

    pub fn fq_name(&self) -> &FqName {
        &self.fq_name
    }

    pub fn is_all_under(&self) -> bool {
        self.all_under
    }

    pub fn alias(&self) -> Option<&Name> {
        self.alias.as_ref()
    }

    /// The name a single-name import binds in the importing scope.
    pub fn imported_name(&self) -> Option<&Name> {
        if self.all_under {
            return None;
        }
        self.alias.as_ref().or_else(|| self.fq_name.short_name())
    }
}

impl fmt::Display for ImportPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.all_under {
            if self.fq_name.is_root() {
                return f.write_str("*");
            }
            return write!(f, "{}.*", self.fq_name);
        }
        write!(f, "{}", self.fq_name)?;
        if let Some(alias) = &self.alias {
            write!(f, " as {alias}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ImportPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImportPath({self})")
    }
}
