//! Runtime services shared by every analysis in a session.
//!
//! A [`GlobalContext`] owns the descriptor and scope arenas, the built-ins
//! module, the intrinsic table and the declaration indexer. Modules analyzed
//! with the same context can see each other's namespaces; that is how a
//! dependency's declarations become visible to its dependents.

use indexmap::IndexMap;
use tracing::debug;

use crate::base::constants::{
    BUILTIN_CLASSES, BUILTIN_FUNCTIONS, BUILTINS_MODULE, BUILTINS_NAMESPACE,
};
use crate::base::{FqName, Name};
use crate::descriptors::{
    Descriptor, DescriptorArena, DescriptorData, DescriptorId, NamespaceData, PlatformClassMap,
    VariableData,
};
use crate::error::ResolveError;
use crate::scopes::{LockLevel, Scope, ScopeArena, ScopeId, ScopeKind, WritableScope};

use super::declarations::{alloc_class, alloc_function};
use super::index::DeclarationIndexer;
use super::intrinsics::{Intrinsic, IntrinsicPattern, IntrinsicTable};

/// The `<builtins>` module and the scope exposing it.
#[derive(Debug)]
pub struct BuiltIns {
    module: DescriptorId,
    namespace: DescriptorId,
    scope: ScopeId,
    classes: IndexMap<Name, DescriptorId>,
}

impl BuiltIns {
    pub fn module(&self) -> DescriptorId {
        self.module
    }

    /// The `lang` namespace.
    pub fn namespace(&self) -> DescriptorId {
        self.namespace
    }

    /// Scope binding the `lang` namespace and, through an import, its members.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    pub fn class(&self, name: &Name) -> Option<DescriptorId> {
        self.classes.get(name).copied()
    }

    /// The built-in class at `fq_name`, e.g. `lang.Int`.
    pub fn class_at(&self, fq_name: &FqName) -> Option<DescriptorId> {
        let parent = fq_name.parent()?;
        if parent != FqName::parse(BUILTINS_NAMESPACE) {
            return None;
        }
        self.class(fq_name.short_name()?)
    }

    fn build(
        descriptors: &mut DescriptorArena,
        scopes: &mut ScopeArena,
    ) -> Result<Self, ResolveError> {
        let module = descriptors.create_module(
            Name::special(BUILTINS_MODULE),
            Vec::new(),
            PlatformClassMap::new(),
        )?;
        let root = namespace(descriptors, scopes, module, FqName::root(), Name::special("root"))?;
        descriptors.set_root_namespace(module, root)?;
        let root_scope = descriptors.namespace_scope(root)?;

        let lang_name = Name::identifier(BUILTINS_NAMESPACE);
        let lang_fq = FqName::root().child(lang_name.clone());
        let lang = namespace(descriptors, scopes, root, lang_fq, lang_name.clone())?;
        let lang_scope = descriptors.namespace_scope(lang)?;
        scopes.add_namespace(root_scope, lang_name.clone(), lang)?;

        let mut classes = IndexMap::new();
        for (name, type_parameters) in BUILTIN_CLASSES {
            let name = Name::identifier(name);
            let type_parameters: Vec<_> = type_parameters.iter().map(Name::identifier).collect();
            let shell = alloc_class(
                descriptors,
                scopes,
                name.clone(),
                lang,
                Vec::new(),
                &type_parameters,
                ScopeId::EMPTY,
            )?;
            scopes.change_lock_level(shell.member_scope, LockLevel::Reading)?;
            scopes.add_classifier(lang_scope, name.clone(), shell.id)?;
            classes.insert(name, shell.id);
        }

        let any = classes.get(&Name::identifier("Any")).copied();
        for (name, arity) in BUILTIN_FUNCTIONS {
            let name = Name::identifier(name);
            let parameters: Vec<_> = (0..*arity).map(|i| Name::identifier(format!("p{i}"))).collect();
            let shell = alloc_function(
                descriptors,
                scopes,
                name.clone(),
                lang,
                Vec::new(),
                &[],
                &parameters,
                ScopeId::EMPTY,
            )?;
            for parameter in &shell.value_parameters {
                if let DescriptorData::Variable(data) = descriptors.get_mut(*parameter).data_mut() {
                    data.ty = any;
                }
            }
            scopes.add_function(lang_scope, name, shell.id, *arity)?;
        }
        scopes.change_lock_level(root_scope, LockLevel::Reading)?;
        scopes.change_lock_level(lang_scope, LockLevel::Reading)?;

        let mut exposed = WritableScope::new(ScopeKind::Builtins, "builtins", module, ScopeId::EMPTY);
        exposed.add_namespace(lang_name, lang)?;
        let scope = scopes.alloc(Scope::Writable(exposed));
        scopes.import_scope(scope, lang_scope)?;
        scopes.change_lock_level(scope, LockLevel::Reading)?;

        debug!("[BUILTINS] {} classes, {} functions", classes.len(), BUILTIN_FUNCTIONS.len());
        Ok(Self {
            module,
            namespace: lang,
            scope,
            classes,
        })
    }
}

fn namespace(
    descriptors: &mut DescriptorArena,
    scopes: &mut ScopeArena,
    containing: DescriptorId,
    fq_name: FqName,
    name: Name,
) -> Result<DescriptorId, ResolveError> {
    let id = descriptors.next_id();
    let member_scope = scopes.alloc(Scope::Writable(WritableScope::new(
        ScopeKind::NamespaceMembers,
        format!("members of builtin namespace {fq_name}"),
        id,
        ScopeId::EMPTY,
    )));
    Ok(descriptors.alloc(Descriptor::new(
        name,
        Some(containing),
        DescriptorData::Namespace(NamespaceData {
            fq_name,
            member_scope,
        }),
    )))
}

// ============================================================================
// GLOBAL CONTEXT
// ============================================================================

/// Process-scoped state passed explicitly into every analysis.
#[derive(Debug)]
pub struct GlobalContext {
    pub(crate) descriptors: DescriptorArena,
    pub(crate) scopes: ScopeArena,
    builtins: BuiltIns,
    intrinsics: IntrinsicTable,
    pub(crate) indexer: DeclarationIndexer,
}

impl GlobalContext {
    pub fn new() -> Result<Self, ResolveError> {
        let mut descriptors = DescriptorArena::new();
        let mut scopes = ScopeArena::new();
        let builtins = BuiltIns::build(&mut descriptors, &mut scopes)?;

        let mut intrinsics = IntrinsicTable::new();
        intrinsics.register(
            IntrinsicPattern::member(BUILTINS_NAMESPACE, "println"),
            Intrinsic::new("print-line"),
        );
        intrinsics.register(
            IntrinsicPattern::member(BUILTINS_NAMESPACE, "print"),
            Intrinsic::new("print"),
        );

        Ok(Self {
            descriptors,
            scopes,
            builtins,
            intrinsics,
            indexer: DeclarationIndexer::new(),
        })
    }

    pub fn descriptors(&self) -> &DescriptorArena {
        &self.descriptors
    }

    pub fn scopes(&self) -> &ScopeArena {
        &self.scopes
    }

    pub fn builtins(&self) -> &BuiltIns {
        &self.builtins
    }

    pub fn intrinsics(&self) -> &IntrinsicTable {
        &self.intrinsics
    }

    pub fn intrinsics_mut(&mut self) -> &mut IntrinsicTable {
        &mut self.intrinsics
    }

    /// Let `target` see everything `imported` binds. Used by custom
    /// [`NamespaceScopeExtension`](super::NamespaceScopeExtension)s.
    pub fn import_scope(&mut self, target: ScopeId, imported: ScopeId) -> Result<(), ResolveError> {
        self.scopes.import_scope(target, imported)
    }

    /// Structural rendering of a descriptor, see [`DescriptorArena::render`].
    pub fn render(&self, id: DescriptorId) -> String {
        self.descriptors.render(id)
    }

    /// The declared type of a parameter, local variable or property.
    pub fn declared_type(&self, id: DescriptorId) -> Option<DescriptorId> {
        match self.descriptors.get(id).data() {
            DescriptorData::Variable(VariableData { ty, .. }) => *ty,
            DescriptorData::Property(property) => property.ty,
            _ => None,
        }
    }
}
