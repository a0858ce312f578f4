//! Category Resolution
//!
//! Maps an operation type to a grouping label by walking its ancestor chain
//! against a fixed table of abstract category classes.
//!
//! The walk starts at the immediate parent and stops at the first ancestor
//! found in the table, whichever entry it is. It does not continue upward
//! looking for a more specific family: an arithmetic subclass whose nearest
//! tabled ancestor is `VipsUnary` reports `arithmetic` even if something
//! further up would also match. Downstream labels rely on this.
//!
//! The walk also stops at any configured root type (normally
//! `VipsOperation` and `VipsObject`), at the hierarchy root, or on a repeat
//! visit. With no match the operation's own short name is the category.

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::registry::{TypeHandle, TypeRegistry};

/// Abstract ancestor type names and the category each one denotes
pub const ANCESTOR_CATEGORIES: &[(&str, &str)] = &[
    ("VipsArithmetic", "arithmetic"),
    ("VipsBinary", "arithmetic"),
    ("VipsUnary", "arithmetic"),
    ("VipsStatistic", "arithmetic"),
    ("VipsColour", "colour"),
    ("VipsColourCode", "colour"),
    ("VipsColourDifference", "colour"),
    ("VipsColourSpace", "colour"),
    ("VipsColourTransform", "colour"),
    ("VipsConversion", "conversion"),
    ("VipsConvolution", "convolution"),
    ("VipsCreate", "create"),
    ("VipsDraw", "draw"),
    ("VipsForeign", "foreign"),
    ("VipsForeignLoad", "foreign"),
    ("VipsForeignSave", "foreign"),
    ("VipsFreqfilt", "freqfilt"),
    ("VipsHistogram", "histogram"),
    ("VipsMorphology", "morphology"),
    ("VipsResample", "resample"),
];

/// Category denoted by an ancestor type name, if it is a tabled one
pub fn category_for_ancestor(type_name: &str) -> Option<&'static str> {
    ANCESTOR_CATEGORIES
        .iter()
        .find(|(name, _)| *name == type_name)
        .map(|(_, category)| *category)
}

/// Ancestor-chain category resolver
pub struct CategoryResolver<'r> {
    registry: &'r dyn TypeRegistry,
    roots: FxHashSet<TypeHandle>,
}

impl<'r> CategoryResolver<'r> {
    /// Create a resolver stopping at `root_types`
    ///
    /// Root names the registry does not know are ignored.
    pub fn new<S: AsRef<str>>(registry: &'r dyn TypeRegistry, root_types: &[S]) -> Self {
        let roots = root_types
            .iter()
            .filter_map(|name| registry.lookup(name.as_ref()))
            .collect();
        Self { registry, roots }
    }

    /// Category tabled for the nearest matching ancestor of `ty`
    pub fn ancestor_category(&self, ty: TypeHandle) -> Option<&'static str> {
        let mut visited = FxHashSet::default();
        let mut walk = self.registry.parent_of(ty);

        while let Some(ancestor) = walk {
            if self.roots.contains(&ancestor) || !visited.insert(ancestor) {
                break;
            }
            if let Some(name) = self.registry.type_name(ancestor) {
                if let Some(category) = category_for_ancestor(&name) {
                    trace!(ancestor = %name, category, "category matched");
                    return Some(category);
                }
            }
            walk = self.registry.parent_of(ancestor);
        }

        None
    }

    /// Category of `ty`, falling back to `short_name`
    pub fn resolve(&self, ty: TypeHandle, short_name: &str) -> String {
        self.ancestor_category(ty)
            .map(str::to_string)
            .unwrap_or_else(|| short_name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lookup() {
        assert_eq!(category_for_ancestor("VipsUnary"), Some("arithmetic"));
        assert_eq!(category_for_ancestor("VipsColourDifference"), Some("colour"));
        assert_eq!(category_for_ancestor("VipsForeignSave"), Some("foreign"));
        assert_eq!(category_for_ancestor("VipsResample"), Some("resample"));
        assert_eq!(category_for_ancestor("VipsOperation"), None);
        assert_eq!(category_for_ancestor("vipsunary"), None);
    }

    #[test]
    fn test_table_names_are_unique() {
        let names: FxHashSet<_> = ANCESTOR_CATEGORIES.iter().map(|(n, _)| *n).collect();
        assert_eq!(names.len(), ANCESTOR_CATEGORIES.len());
    }
}
