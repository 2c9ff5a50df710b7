//! Member-name rules checked while a definition is built.

/// Operation names of the namespace query surface. Declaring a member with one
/// of these names is rejected.
pub const RESERVED_NAMES: &[&str] = &[
    "name",
    "qualified_name",
    "parent",
    "capabilities",
    "has_capability",
    "inherits_from",
    "registry_id",
    "metadata",
    "keys",
    "values",
    "items",
    "get",
    "get_or",
    "get_attr",
    "get_item",
    "set_attr",
    "set_item",
    "del_attr",
    "del_item",
    "len",
    "is_empty",
    "contains",
    "iter",
    "prefetch",
    "render",
];

/// Returns `true` for names of the query surface.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// Returns `true` for `__dunder__` names, which carry structural metadata
/// instead of members.
#[must_use]
pub fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}
