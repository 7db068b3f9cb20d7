//! Run-scoped reference cache.
//!
//! Keeps track of the components already generated so that rule sets shared by
//! several routes, identical path parameters and handler documentation are
//! converted once and referenced afterwards.

use crate::docs::HandlerDoc;
use crate::validation::RuleSetId;
use std::collections::{BTreeMap, HashMap};

pub const SCHEMAS_REF: &str = "#/components/schemas/";
pub const PARAMETERS_REF: &str = "#/components/parameters/";
pub const REQUEST_BODIES_REF: &str = "#/components/requestBodies/";

/// Cache of generated component references
#[derive(Debug, Default)]
pub struct Refs {
    /// Request body `$ref` by rule set
    pub request_bodies: HashMap<RuleSetId, String>,
    /// Query parameter `$ref`s by rule set
    pub query_parameters: HashMap<RuleSetId, Vec<String>>,
    /// Path parameter schema `$ref` by parameter name and pattern
    pub param_schemas: HashMap<(String, Option<String>), String>,
    /// Path parameter `$ref` by parameter name and schema `$ref`
    pub parameters: HashMap<(String, String), String>,
    /// Resolved documentation by handler name
    pub handler_docs: HashMap<String, HandlerDoc>,
}

impl Refs {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Find a component name for `value` starting from `base`.
///
/// Candidates are `base`, `base.2`, `base.3`, ... The first candidate that is
/// either free or already holds an equal value is returned, along with whether
/// the component already exists.
pub fn unique_component_name<T: PartialEq>(
    existing: &BTreeMap<String, T>,
    base: &str,
    value: &T,
) -> (String, bool) {
    let mut candidate = base.to_string();
    let mut index = 1;
    loop {
        match existing.get(&candidate) {
            None => return (candidate, false),
            Some(current) if current == value => return (candidate, true),
            Some(_) => {
                index += 1;
                candidate = format!("{}.{}", base, index);
            }
        }
    }
}

/// Capitalize the first character of `name`
pub fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_name_free() {
        let existing: BTreeMap<String, i32> = BTreeMap::new();
        assert_eq!(
            unique_component_name(&existing, "test", &1),
            ("test".to_string(), false)
        );
    }

    #[test]
    fn test_unique_name_reuses_equal_value() {
        let mut existing = BTreeMap::new();
        existing.insert("test".to_string(), 1);
        assert_eq!(
            unique_component_name(&existing, "test", &1),
            ("test".to_string(), true)
        );
    }

    #[test]
    fn test_unique_name_disambiguates() {
        let mut existing = BTreeMap::new();
        existing.insert("test".to_string(), 1);
        assert_eq!(
            unique_component_name(&existing, "test", &2),
            ("test.2".to_string(), false)
        );

        existing.insert("test.2".to_string(), 2);
        assert_eq!(
            unique_component_name(&existing, "test", &2),
            ("test.2".to_string(), true)
        );
        assert_eq!(
            unique_component_name(&existing, "test", &3),
            ("test.3".to_string(), false)
        );
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("param1"), "Param1");
        assert_eq!(title_case("Id"), "Id");
        assert_eq!(title_case(""), "");
    }
}
