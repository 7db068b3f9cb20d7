//! Validation rule model consumed by the schema generator.
//!
//! A [`RuleSet`] maps field names to [`Field`]s, each holding an ordered list of
//! [`Rule`]s. Rules use the textual syntax `name:param1,param2`; every leading `>`
//! moves the rule one array dimension deeper, so `>max:3` constrains the elements
//! of an array field instead of the array itself.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Rule names that determine the type of the value they validate.
const TYPE_RULES: &[&str] = &["string", "numeric", "integer", "bool", "array", "object"];

static NEXT_RULE_SET_ID: AtomicU64 = AtomicU64::new(1);

/// A single validation directive, e.g. `min:5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Rule name (`required`, `string`, `min`, ...)
    pub name: String,
    /// Raw rule parameters
    pub params: Vec<String>,
    /// Array nesting level the rule applies to (0 is the field itself)
    pub array_dimension: u8,
}

impl Rule {
    /// Create a rule without parameters at dimension 0
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            array_dimension: 0,
        }
    }

    /// Set the rule parameters
    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Set the array dimension the rule applies to
    pub fn at_dimension(mut self, array_dimension: u8) -> Self {
        self.array_dimension = array_dimension;
        self
    }

    /// Parse a rule from its textual form.
    ///
    /// `regex` parameters are kept whole since patterns routinely contain commas.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let body = trimmed.trim_start_matches('>');
        let array_dimension = (trimmed.len() - body.len()) as u8;

        let (name, params) = match body.split_once(':') {
            Some((name, raw)) if name == "regex" => (name, vec![raw.to_string()]),
            Some((name, raw)) => (name, raw.split(',').map(|p| p.to_string()).collect()),
            None => (body, Vec::new()),
        };

        Self {
            name: name.to_string(),
            params,
            array_dimension,
        }
    }

    /// Whether this rule determines the type of the validated value
    pub fn is_type(&self) -> bool {
        TYPE_RULES.contains(&self.name.as_str())
    }

    /// Parameter at `index`, if any
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }
}

/// One named unit of validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Field {
    /// Ordered rules
    pub rules: Vec<Rule>,
}

impl Field {
    /// Create a field from already built rules
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Parse every rule of a field from its textual form
    pub fn parse<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            rules: rules
                .into_iter()
                .map(|r| Rule::parse(r.as_ref()))
                .filter(|r| !r.name.is_empty())
                .collect(),
        }
    }

    /// The field must be present
    pub fn is_required(&self) -> bool {
        self.has_rule_at("required", 0)
    }

    /// The field accepts `null`
    pub fn is_nullable(&self) -> bool {
        self.has_rule_at("nullable", 0)
    }

    /// Whether the field has a rule with this name at any dimension
    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.name == name)
    }

    fn has_rule_at(&self, name: &str, array_dimension: u8) -> bool {
        self.rules
            .iter()
            .any(|r| r.name == name && r.array_dimension == array_dimension)
    }
}

/// Opaque identity of a rule set, assigned at construction.
///
/// Clones of a rule set keep the identity of the original, so two routes sharing
/// the same rules (through `Arc` or a clone) resolve to the same components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleSetId(u64);

/// The complete collection of validation fields for one route's input.
#[derive(Debug, Clone)]
pub struct RuleSet {
    id: RuleSetId,
    /// Fields by name
    pub fields: BTreeMap<String, Field>,
}

impl RuleSet {
    /// Create a rule set with a fresh identity
    pub fn new(fields: BTreeMap<String, Field>) -> Self {
        Self {
            id: RuleSetId(NEXT_RULE_SET_ID.fetch_add(1, Ordering::Relaxed)),
            fields,
        }
    }

    /// Build a rule set from textual rules, e.g. `("name", ["required", "string"])`
    pub fn parse<I, N, R, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (N, R)>,
        N: Into<String>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            fields
                .into_iter()
                .map(|(name, rules)| (name.into(), Field::parse(rules)))
                .collect(),
        )
    }

    /// Identity of this rule set
    pub fn id(&self) -> RuleSetId {
        self.id
    }

    /// Whether any field has a rule with the given name
    pub fn has(&self, rule_name: &str) -> bool {
        self.fields.values().any(|f| f.has_rule(rule_name))
    }

    /// Whether any field is a file
    pub fn has_file(&self) -> bool {
        self.has("file")
    }

    /// Whether any field carries a `required` rule
    pub fn has_required(&self) -> bool {
        self.has("required")
    }

    /// Whether no required field is a file
    pub fn has_only_optional_files(&self) -> bool {
        !self
            .fields
            .values()
            .any(|f| f.has_rule("file") && f.is_required())
    }
}

/// Split a `|`-separated rule string into individual rules
pub fn split_rules(rules: &str) -> Vec<String> {
    rules
        .split('|')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(String::from)
        .collect()
}
