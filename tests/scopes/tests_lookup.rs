//! Lookup through layered scopes, the way a file scope is assembled.

use lexscope::base::Name;
use lexscope::descriptors::{
    Descriptor, DescriptorArena, DescriptorData, DescriptorId, VariableData,
};
use lexscope::error::ResolveError;
use lexscope::scopes::{LockLevel, Scope, ScopeArena, ScopeId, ScopeKind, WritableScope};
use rstest::rstest;

struct Layers {
    scopes: ScopeArena,
    own: ScopeId,
    starred: ScopeId,
    file: ScopeId,
    block: ScopeId,
    ids: Vec<DescriptorId>,
}

fn name(text: &str) -> Name {
    Name::identifier(text)
}

fn descriptors(count: usize) -> Vec<DescriptorId> {
    let mut arena = DescriptorArena::new();
    (0..count)
        .map(|i| {
            arena.alloc(Descriptor::new(
                name(&format!("d{i}")),
                None,
                DescriptorData::Variable(VariableData {
                    ty: None,
                    is_parameter: false,
                }),
            ))
        })
        .collect()
}

fn writable(
    scopes: &mut ScopeArena,
    kind: ScopeKind,
    debug_name: &str,
    owner: DescriptorId,
    parent: ScopeId,
) -> ScopeId {
    scopes.alloc(Scope::Writable(WritableScope::new(kind, debug_name, owner, parent)))
}

/// `own` binds `X`, `f/0`; `starred` binds `X`, `f/1`, namespace `n`;
/// the file scope imports `starred` then `own`; `block` sits below it.
fn layers(with_alias: bool) -> Layers {
    let ids = descriptors(8);
    let mut scopes = ScopeArena::new();

    let own = writable(&mut scopes, ScopeKind::NamespaceMembers, "own", ids[0], ScopeId::EMPTY);
    scopes.add_classifier(own, name("X"), ids[1]).unwrap();
    scopes.add_function(own, name("f"), ids[2], 0).unwrap();
    scopes.change_lock_level(own, LockLevel::Reading).unwrap();

    let starred = writable(
        &mut scopes,
        ScopeKind::NamespaceMembers,
        "starred",
        ids[0],
        ScopeId::EMPTY,
    );
    scopes.add_classifier(starred, name("X"), ids[3]).unwrap();
    scopes.add_function(starred, name("f"), ids[4], 1).unwrap();
    scopes.add_namespace(starred, name("n"), ids[5]).unwrap();
    scopes.change_lock_level(starred, LockLevel::Reading).unwrap();

    let file = writable(&mut scopes, ScopeKind::File, "file", ids[0], ScopeId::EMPTY);
    scopes.import_scope(file, starred).unwrap();
    scopes.import_scope(file, own).unwrap();
    if with_alias {
        scopes.import_classifier_alias(file, name("X"), ids[6]).unwrap();
    }
    scopes.change_lock_level(file, LockLevel::Reading).unwrap();

    let block = writable(&mut scopes, ScopeKind::Block, "block", ids[0], file);
    scopes.change_lock_level(block, LockLevel::Both).unwrap();
    scopes.add_variable(block, name("v"), ids[7]).unwrap();

    Layers {
        scopes,
        own,
        starred,
        file,
        block,
        ids,
    }
}

#[rstest]
#[case::latest_import_wins(false, 1)]
#[case::alias_beats_imports(true, 6)]
fn test_classifier_lookup_order(#[case] with_alias: bool, #[case] expected: usize) {
    let l = layers(with_alias);
    assert_eq!(l.scopes.classifier(l.file, &name("X")).unwrap(), Some(l.ids[expected]));
    assert_eq!(l.scopes.classifier(l.block, &name("X")).unwrap(), Some(l.ids[expected]));
}

#[test]
fn test_functions_union_over_imports() {
    let l = layers(false);
    let found: Vec<_> = l.scopes.functions(l.block, &name("f")).unwrap().into_iter().collect();
    assert_eq!(found, vec![l.ids[2], l.ids[4]]);
}

#[test]
fn test_locals_and_namespaces_through_the_chain() {
    let l = layers(false);
    assert_eq!(l.scopes.local_variable(l.block, &name("v")).unwrap(), Some(l.ids[7]));
    assert_eq!(l.scopes.local_variable(l.file, &name("v")).unwrap(), None);
    assert_eq!(l.scopes.namespace(l.block, &name("n")).unwrap(), Some(l.ids[5]));
    assert!(l.scopes.namespace(l.block, &name("missing")).unwrap().is_none());
}

#[test]
fn test_lookup_chain_lists_imports_before_parent() {
    let l = layers(false);
    let chain = l.scopes.lookup_chain(l.block);
    let position = |id| chain.iter().position(|scope| *scope == id).unwrap();
    assert_eq!(chain[0], l.block);
    assert!(position(l.file) < position(l.own));
    assert!(position(l.own) < position(l.starred));
}

#[rstest]
#[case(LockLevel::Writing, false)]
#[case(LockLevel::Both, true)]
#[case(LockLevel::Reading, true)]
fn test_reads_through_an_import_check_its_level(#[case] level: LockLevel, #[case] readable: bool) {
    let ids = descriptors(2);
    let mut scopes = ScopeArena::new();
    let imported = writable(
        &mut scopes,
        ScopeKind::NamespaceMembers,
        "imported",
        ids[0],
        ScopeId::EMPTY,
    );
    scopes.add_classifier(imported, name("X"), ids[1]).unwrap();
    scopes.change_lock_level(imported, level).unwrap();
    let file = writable(&mut scopes, ScopeKind::File, "file", ids[0], ScopeId::EMPTY);
    scopes.import_scope(file, imported).unwrap();
    scopes.change_lock_level(file, LockLevel::Reading).unwrap();

    let result = scopes.classifier(file, &name("X"));
    if readable {
        assert_eq!(result.unwrap(), Some(ids[1]));
    } else {
        assert_eq!(
            result.unwrap_err(),
            ResolveError::ReadNotPermitted {
                scope: "imported".to_string(),
                level: LockLevel::Writing,
            }
        );
    }
}

#[test]
fn test_frozen_file_scope_rejects_imports_and_aliases() {
    let mut l = layers(false);
    let starred = l.starred;
    assert!(matches!(
        l.scopes.import_scope(l.file, starred),
        Err(ResolveError::WriteNotPermitted { .. })
    ));
    assert!(matches!(
        l.scopes.import_classifier_alias(l.file, name("Y"), l.ids[1]),
        Err(ResolveError::WriteNotPermitted { .. })
    ));
    assert!(matches!(
        l.scopes.change_lock_level(l.file, LockLevel::Writing),
        Err(ResolveError::LockLevelLowered { .. })
    ));
}
