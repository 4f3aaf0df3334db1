//! Intrinsic table: functions the code generator lowers specially.
//!
//! Lookup order for a function descriptor:
//!
//! ```text
//! name-specific patterns ──► "any member" patterns ──► factories ──► None
//! ```
//!
//! Results are memoized per descriptor. The table is owned by the
//! [`GlobalContext`](super::GlobalContext), never process-wide.

use std::fmt;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::trace;

use crate::base::{FqName, Name};
use crate::descriptors::{DescriptorArena, DescriptorId, DescriptorKind};

/// Code-generator handle for an intrinsic, e.g. `print-line`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Intrinsic(SmolStr);

impl Intrinsic {
    pub fn new(name: &str) -> Self {
        Self(SmolStr::new(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Which functions an intrinsic applies to.
///
/// A pattern without a member name matches every function in its container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntrinsicPattern {
    namespace: FqName,
    class: Option<Name>,
    member: Option<Name>,
}

impl IntrinsicPattern {
    /// Function `member` declared directly in `namespace`.
    pub fn member(namespace: &str, member: &str) -> Self {
        Self {
            namespace: FqName::parse(namespace),
            class: None,
            member: Some(Name::identifier(member)),
        }
    }

    /// Every function declared directly in `namespace`.
    pub fn any_member(namespace: &str) -> Self {
        Self {
            namespace: FqName::parse(namespace),
            class: None,
            member: None,
        }
    }

    /// Restrict the pattern to members of class `class` in the namespace.
    pub fn in_class(mut self, class: &str) -> Self {
        self.class = Some(Name::identifier(class));
        self
    }

    fn matches_container(&self, descriptors: &DescriptorArena, function: DescriptorId) -> bool {
        let Some(container) = descriptors.get(function).containing_declaration() else {
            return false;
        };
        let namespace = match &self.class {
            Some(class) => {
                if descriptors.kind(container) != DescriptorKind::Class
                    || descriptors.name(container) != class
                {
                    return false;
                }
                match descriptors.get(container).containing_declaration() {
                    Some(namespace) => namespace,
                    None => return false,
                }
            }
            None => container,
        };
        descriptors
            .get(namespace)
            .as_namespace()
            .is_some_and(|data| data.fq_name == self.namespace)
    }
}

/// Fallback predicate consulted after every pattern.
pub type IntrinsicFactory =
    Box<dyn Fn(&DescriptorArena, DescriptorId) -> Option<Intrinsic> + Send + Sync>;

#[derive(Default)]
pub struct IntrinsicTable {
    named: FxHashMap<Name, Vec<(IntrinsicPattern, Intrinsic)>>,
    any_member: Vec<(IntrinsicPattern, Intrinsic)>,
    factories: Vec<IntrinsicFactory>,
    memo: Mutex<FxHashMap<DescriptorId, Option<Intrinsic>>>,
}

impl fmt::Debug for IntrinsicTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntrinsicTable")
            .field("named", &self.named.len())
            .field("any_member", &self.any_member.len())
            .field("factories", &self.factories.len())
            .finish()
    }
}

impl IntrinsicTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, pattern: IntrinsicPattern, intrinsic: Intrinsic) {
        match pattern.member.clone() {
            Some(member) => self.named.entry(member).or_default().push((pattern, intrinsic)),
            None => self.any_member.push((pattern, intrinsic)),
        }
        self.memo.get_mut().clear();
    }

    pub fn register_factory(&mut self, factory: IntrinsicFactory) {
        self.factories.push(factory);
        self.memo.get_mut().clear();
    }

    /// The intrinsic for function `function`, if any.
    pub fn intrinsic_for(
        &self,
        descriptors: &DescriptorArena,
        function: DescriptorId,
    ) -> Option<Intrinsic> {
        if descriptors.kind(function) != DescriptorKind::Function {
            return None;
        }
        let mut memo = self.memo.lock();
        if let Some(cached) = memo.get(&function) {
            return cached.clone();
        }
        let found = self.compute(descriptors, function);
        trace!(
            "[INTRINSIC] {} -> {:?}",
            descriptors.render(function),
            found.as_ref().map(Intrinsic::name)
        );
        memo.insert(function, found.clone());
        found
    }

    fn compute(&self, descriptors: &DescriptorArena, function: DescriptorId) -> Option<Intrinsic> {
        let name = descriptors.name(function);
        let by_name = self
            .named
            .get(name)
            .into_iter()
            .flatten()
            .find(|(pattern, _)| pattern.matches_container(descriptors, function));
        if let Some((_, intrinsic)) = by_name {
            return Some(intrinsic.clone());
        }
        let any = self
            .any_member
            .iter()
            .find(|(pattern, _)| pattern.matches_container(descriptors, function));
        if let Some((_, intrinsic)) = any {
            return Some(intrinsic.clone());
        }
        self.factories
            .iter()
            .find_map(|factory| factory(descriptors, function))
    }
}
