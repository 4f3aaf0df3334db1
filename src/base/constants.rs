//! Crate-wide constants.

/// Name of the namespace holding the built-in classes and functions.
pub const BUILTINS_NAMESPACE: &str = "lang";

/// Debug text of the module that owns the built-ins.
pub const BUILTINS_MODULE: &str = "builtins";

/// Debug text of the module used when a caller analyzes files without
/// naming a module.
pub const DEFAULT_MODULE: &str = "module";

/// Import paths every module sees unless configured otherwise.
pub const DEFAULT_IMPORT_PATHS: &[&str] = &["lang.*"];

/// Built-in classes as `(name, type parameter names)`.
pub const BUILTIN_CLASSES: &[(&str, &[&str])] = &[
    ("Any", &[]),
    ("Nothing", &[]),
    ("Unit", &[]),
    ("Boolean", &[]),
    ("Char", &[]),
    ("Int", &[]),
    ("Long", &[]),
    ("Double", &[]),
    ("String", &[]),
    ("Array", &["T"]),
];

/// Built-in top-level functions as `(name, arity)`.
pub const BUILTIN_FUNCTIONS: &[(&str, usize)] = &[("println", 1), ("print", 1)];
