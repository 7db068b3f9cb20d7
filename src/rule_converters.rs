//! Registry of rule converters.
//!
//! A rule converter translates one validation rule into schema constraints (or a
//! multipart encoding). The registry starts with converters for every built-in
//! rule and accepts custom converters for application-specific rules.

use crate::openapi::{Encoding, Schema};
use crate::validation::Rule;
use log::debug;
use std::collections::HashMap;

/// Time layout token selecting the `date-time` format for the `date` rule.
pub const RFC3339_LAYOUT: &str = "2006-01-02T15:04:05Z07:00";

const IMAGE_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/svg+xml",
    "image/webp",
];

/// Sets a schema's fields (or the field's encoding) to values matching a rule.
///
/// The encoding is only provided for rules that affect it (`mime`, `image`).
pub type RuleConverter = Box<dyn Fn(&Rule, &mut Schema, Option<&mut Encoding>)>;

/// Rule name to converter mapping
pub struct RuleConverterRegistry {
    converters: HashMap<String, RuleConverter>,
}

impl RuleConverterRegistry {
    /// Create a registry holding the built-in converters
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("min", convert_min);
        registry.register("max", convert_max);
        registry.register("between", convert_between);
        registry.register("size", convert_size);
        registry.register("distinct", |_, s, _| s.unique_items = true);
        registry.register("digits", |_, s, _| set_pattern(s, "^[0-9]*$"));
        registry.register("regex", |r, s, _| {
            if let Some(pattern) = r.param(0) {
                set_pattern(s, pattern);
            }
        });
        registry.register("email", |_, s, _| {
            set_pattern(s, r"^[^@\r\n\t]{1,64}@[^\s]+$")
        });
        registry.register("alpha", |_, s, _| set_pattern(s, r"^[\pL\pM]+$"));
        registry.register("alpha_dash", |_, s, _| set_pattern(s, r"^[\pL\pM0-9_-]+$"));
        registry.register("alpha_num", |_, s, _| set_pattern(s, r"^[\pL\pM0-9]+$"));
        registry.register("starts_with", |r, s, _| {
            if let Some(prefix) = r.param(0) {
                set_pattern(s, &format!("^{}", prefix));
            }
        });
        registry.register("ends_with", |r, s, _| {
            if let Some(suffix) = r.param(0) {
                set_pattern(s, &format!("{}$", suffix));
            }
        });
        registry.register("ipv4", |_, s, _| set_format(s, "ipv4"));
        registry.register("ipv6", |_, s, _| set_format(s, "ipv6"));
        registry.register("url", |_, s, _| set_format(s, "uri"));
        registry.register("uuid", |_, s, _| set_format(s, "uuid"));
        registry.register("mime", |r, _, encoding| {
            if let Some(encoding) = encoding {
                encoding.content_type = Some(r.params.join(", "));
            }
        });
        registry.register("image", |_, _, encoding| {
            if let Some(encoding) = encoding {
                encoding.content_type = Some(IMAGE_MIME_TYPES.join(", "));
            }
        });
        registry.register("count", convert_count);
        registry.register("count_min", |r, s, _| {
            make_file_array(s);
            s.min_items = parse_count(r, 0);
        });
        registry.register("count_max", |r, s, _| {
            make_file_array(s);
            s.max_items = parse_count(r, 0);
        });
        registry.register("count_between", |r, s, _| {
            make_file_array(s);
            s.min_items = parse_count(r, 0);
            s.max_items = parse_count(r, 1);
        });
        registry.register("date", convert_date);
        registry
    }

    /// Create a registry without any converter
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Register a converter for the rule identified by `rule_name`, replacing any
    /// previous one. This is how custom validation rules get documented.
    pub fn register<F>(&mut self, rule_name: impl Into<String>, converter: F)
    where
        F: Fn(&Rule, &mut Schema, Option<&mut Encoding>) + 'static,
    {
        let rule_name = rule_name.into();
        debug!("Registering rule converter: {}", rule_name);
        self.converters.insert(rule_name, Box::new(converter));
    }

    /// Converter registered for `rule_name`
    pub fn get(&self, rule_name: &str) -> Option<&RuleConverter> {
        self.converters.get(rule_name)
    }

    pub fn contains(&self, rule_name: &str) -> bool {
        self.converters.contains_key(rule_name)
    }
}

impl Default for RuleConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn set_pattern(schema: &mut Schema, pattern: &str) {
    schema.pattern = Some(pattern.to_string());
}

fn set_format(schema: &mut Schema, format: &str) {
    schema.format = Some(format.to_string());
}

fn parse_count(rule: &Rule, index: usize) -> Option<u64> {
    rule.param(index).and_then(|p| p.trim().parse().ok())
}

fn parse_number(rule: &Rule, index: usize) -> Option<f64> {
    rule.param(index).and_then(|p| p.trim().parse().ok())
}

/// Which bound family a size rule targets, depending on the schema type
enum Bounds {
    Length,
    Value,
    Items,
}

fn bounds_for(schema: &Schema) -> Option<Bounds> {
    match schema.schema_type.as_deref() {
        Some("string") => Some(Bounds::Length),
        Some("number") | Some("integer") => Some(Bounds::Value),
        Some("array") => Some(Bounds::Items),
        _ => None,
    }
}

fn set_lower(schema: &mut Schema, rule: &Rule, index: usize) {
    match bounds_for(schema) {
        Some(Bounds::Length) => schema.min_length = parse_count(rule, index),
        Some(Bounds::Value) => schema.min = parse_number(rule, index),
        Some(Bounds::Items) => schema.min_items = parse_count(rule, index),
        None => {}
    }
}

fn set_upper(schema: &mut Schema, rule: &Rule, index: usize) {
    match bounds_for(schema) {
        Some(Bounds::Length) => schema.max_length = parse_count(rule, index),
        Some(Bounds::Value) => schema.max = parse_number(rule, index),
        Some(Bounds::Items) => schema.max_items = parse_count(rule, index),
        None => {}
    }
}

fn convert_min(rule: &Rule, schema: &mut Schema, _: Option<&mut Encoding>) {
    set_lower(schema, rule, 0);
}

fn convert_max(rule: &Rule, schema: &mut Schema, _: Option<&mut Encoding>) {
    set_upper(schema, rule, 0);
}

fn convert_between(rule: &Rule, schema: &mut Schema, _: Option<&mut Encoding>) {
    set_lower(schema, rule, 0);
    set_upper(schema, rule, 1);
}

fn convert_size(rule: &Rule, schema: &mut Schema, _: Option<&mut Encoding>) {
    set_lower(schema, rule, 0);
    set_upper(schema, rule, 0);
}

fn make_file_array(schema: &mut Schema) {
    schema.schema_type = Some("array".to_string());
    schema.format = None;
    schema.items = Some(Box::new(Schema {
        schema_type: Some("string".to_string()),
        format: Some("binary".to_string()),
        ..Default::default()
    }));
}

fn convert_count(rule: &Rule, schema: &mut Schema, _: Option<&mut Encoding>) {
    // A single file stays a plain binary string
    if rule.param(0) == Some("1") {
        return;
    }
    make_file_array(schema);
    schema.min_items = parse_count(rule, 0);
    schema.max_items = parse_count(rule, 0);
}

fn convert_date(rule: &Rule, schema: &mut Schema, _: Option<&mut Encoding>) {
    match rule.param(0) {
        None => set_format(schema, "date"),
        Some(RFC3339_LAYOUT) => set_format(schema, "date-time"),
        Some(_) => {}
    }
}
