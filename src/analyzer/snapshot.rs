//! Identity-free snapshots of a binding trace.
//!
//! Descriptor ids depend on allocation order, which differs between the
//! eager and lazy strategies. A [`TraceSnapshot`] replaces every id with its
//! structural rendering so two traces over the same files compare with `==`.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::base::NodeId;
use crate::syntax::SourceFile;

use super::context::GlobalContext;
use super::trace::BindingContext;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TraceSnapshot {
    /// `node -> descriptor`, sorted by node.
    pub bindings: Vec<(NodeId, String)>,
    /// `node: code message`, sorted.
    pub diagnostics: Vec<String>,
    /// Every namespace of the trace with its sorted members.
    pub namespaces: BTreeMap<String, Vec<String>>,
}

impl TraceSnapshot {
    pub fn capture(
        ctx: &GlobalContext,
        context: &BindingContext,
        files: &[Arc<SourceFile>],
    ) -> Self {
        let descriptors = ctx.descriptors();
        let mut bindings = Vec::new();
        let mut diagnostics = Vec::new();
        for file in files {
            for node in file.nodes() {
                if let Some(descriptor) = context.descriptor(node) {
                    bindings.push((node, descriptors.render(descriptor)));
                }
                if let Some(class) = context.label_target(node) {
                    bindings.push((node, format!("label {}", descriptors.render(class))));
                }
                for diagnostic in context.diagnostics_for(node) {
                    diagnostics.push(format!(
                        "{node:?}: {} {}",
                        diagnostic.code(),
                        diagnostic.kind.render(descriptors)
                    ));
                }
            }
        }
        bindings.sort();
        diagnostics.sort();

        let mut namespaces = BTreeMap::new();
        for (fq_name, namespace) in context.namespaces() {
            let mut members: Vec<String> = descriptors
                .get(namespace)
                .member_scope()
                .map(|scope| ctx.scopes().own_descriptors(scope))
                .unwrap_or_default()
                .into_iter()
                .map(|id| descriptors.render(id))
                .collect();
            members.sort();
            namespaces.insert(fq_name.to_string(), members);
        }

        Self {
            bindings,
            diagnostics,
            namespaces,
        }
    }

    /// Lines present in only one of the snapshots, prefixed `-` (self) or
    /// `+` (other).
    pub fn diff(&self, other: &TraceSnapshot) -> Vec<String> {
        let lines = |snapshot: &TraceSnapshot| {
            let mut lines: Vec<String> = snapshot
                .bindings
                .iter()
                .map(|(node, rendered)| format!("{node:?} -> {rendered}"))
                .collect();
            lines.extend(snapshot.diagnostics.iter().cloned());
            lines.extend(
                snapshot
                    .namespaces
                    .iter()
                    .map(|(fq_name, members)| format!("{fq_name}: [{}]", members.join(", "))),
            );
            lines
        };
        let ours = lines(self);
        let theirs = lines(other);
        let mut diff: Vec<String> = ours
            .iter()
            .filter(|line| !theirs.contains(line))
            .map(|line| format!("- {line}"))
            .collect();
        diff.extend(
            theirs
                .iter()
                .filter(|line| !ours.contains(line))
                .map(|line| format!("+ {line}")),
        );
        diff
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
