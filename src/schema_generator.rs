use crate::openapi::{Encoding, Schema};
use crate::rule_converters::RuleConverterRegistry;
use crate::validation::{Field, Rule};
use log::debug;

/// Schema generator - converts validation fields to OpenAPI schemas
pub struct SchemaGenerator {
    /// Converters applying rule constraints to schemas
    registry: RuleConverterRegistry,
}

impl SchemaGenerator {
    /// Create a new SchemaGenerator backed by `registry`
    pub fn new(registry: RuleConverterRegistry) -> Self {
        debug!("Initializing SchemaGenerator");
        Self { registry }
    }

    pub fn registry(&self) -> &RuleConverterRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RuleConverterRegistry {
        &mut self.registry
    }

    /// Generate the schema of a field, along with its multipart encoding when a
    /// rule requires one
    pub fn schema_from_field(&self, field: &Field) -> (Schema, Option<Encoding>) {
        self.generate(field, None, 0)
    }

    /// Generate the schema of `field` viewed at `dimension`.
    ///
    /// The type is resolved before any constraint is applied so that rule order
    /// within the field does not matter.
    fn generate(
        &self,
        field: &Field,
        type_fallback: Option<&str>,
        dimension: u8,
    ) -> (Schema, Option<Encoding>) {
        let mut schema = Schema::default();

        match find_first_type_rule(field, dimension) {
            Some(rule) => match rule.name.as_str() {
                "file" => {
                    schema.schema_type = Some("string".to_string());
                    schema.format = Some("binary".to_string());
                }
                "array" => {
                    schema.schema_type = Some("array".to_string());
                    let fallback = rule.param(0).map(rule_name_to_type);
                    let (mut items, _) = self.generate(field, fallback, dimension + 1);
                    if items.schema_type.is_none() {
                        items.schema_type = Some("string".to_string());
                    }
                    schema.items = Some(Box::new(items));
                }
                name => schema.schema_type = Some(rule_name_to_type(name).to_string()),
            },
            None => schema.schema_type = type_fallback.map(String::from),
        }

        let mut encoding: Option<Encoding> = None;
        for rule in field.rules.iter().filter(|r| r.array_dimension == dimension) {
            if (rule.name == "image" || rule.name == "mime") && encoding.is_none() {
                encoding = Some(Encoding::default());
            }
            match self.registry.get(&rule.name) {
                Some(converter) => converter(rule, &mut schema, encoding.as_mut()),
                None => debug!("No converter for rule: {}", rule.name),
            }
        }

        // Elements of a nullable field are nullable too
        schema.nullable = field.is_nullable();
        (schema, encoding)
    }
}

impl Default for SchemaGenerator {
    fn default() -> Self {
        Self::new(RuleConverterRegistry::new())
    }
}

/// First rule determining the type of the value at `dimension`
fn find_first_type_rule(field: &Field, dimension: u8) -> Option<&Rule> {
    field
        .rules
        .iter()
        .find(|r| (r.is_type() || r.name == "file") && r.array_dimension == dimension)
}

/// Map a type rule name to its OpenAPI type
fn rule_name_to_type(name: &str) -> &str {
    match name {
        "numeric" => "number",
        "bool" => "boolean",
        "file" => "string",
        other => other,
    }
}
