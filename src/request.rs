//! Conversion of rule sets into request bodies and query parameters.

use crate::openapi::{Encoding, MediaType, Parameter, RequestBody, Schema};
use crate::schema_generator::SchemaGenerator;
use crate::schema_tree::{add_schema, is_root_field, parse_path, PathStep};
use crate::validation::{Field, RuleSet};
use log::debug;
use std::collections::BTreeMap;

pub const JSON_CONTENT: &str = "application/json";
pub const MULTIPART_CONTENT: &str = "multipart/form-data";

/// Fields with their parsed paths, parents before children
fn sorted_fields(rules: &RuleSet) -> Vec<(&str, Vec<PathStep>, &Field)> {
    let mut fields: Vec<_> = rules
        .fields
        .iter()
        .map(|(name, field)| (name.as_str(), parse_path(name), field))
        .collect();
    fields.sort_by(|a, b| a.1.len().cmp(&b.1.len()).then_with(|| a.0.cmp(b.0)));
    fields
}

/// Convert a rule set into a request body.
///
/// Rule sets containing files produce a `multipart/form-data` body; when every
/// file is optional, an `application/json` alternative without the file fields
/// is offered too.
pub fn convert_to_body(generator: &SchemaGenerator, rules: Option<&RuleSet>) -> Option<RequestBody> {
    let rules = rules?;
    debug!("Converting {} field(s) to request body", rules.fields.len());

    let mut schema = Schema::of_type("object");
    let mut encodings = BTreeMap::new();
    for (name, path, field) in sorted_fields(rules) {
        if path.is_empty() {
            debug!("Skipping field with empty path: {:?}", name);
            continue;
        }
        let (field_schema, encoding) = generator.schema_from_field(field);
        add_schema(&mut schema, &path, field_schema, field.is_required());

        if let (Some(encoding), Some(PathStep::Property(root))) = (encoding, path.first()) {
            if is_root_field(&path) {
                encodings.insert(root.clone(), encoding);
            }
        }
    }

    Some(RequestBody {
        required: rules.has_required(),
        content: new_content(rules, schema, encodings),
    })
}

fn new_content(
    rules: &RuleSet,
    schema: Schema,
    encodings: BTreeMap<String, Encoding>,
) -> BTreeMap<String, MediaType> {
    let mut content = BTreeMap::new();
    if !rules.has_file() {
        content.insert(JSON_CONTENT.to_string(), MediaType::new(schema));
        return content;
    }

    if rules.has_only_optional_files() {
        let json_schema = Schema {
            schema_type: Some("object".to_string()),
            required: schema.required.clone(),
            properties: schema
                .properties
                .iter()
                .filter(|(_, property)| !property.is_binary())
                .map(|(name, property)| (name.clone(), property.clone()))
                .collect(),
            ..Default::default()
        };
        content.insert(JSON_CONTENT.to_string(), MediaType::new(json_schema));
    }

    content.insert(
        MULTIPART_CONTENT.to_string(),
        MediaType {
            schema,
            encoding: encodings,
        },
    );
    content
}

/// Convert a rule set into query parameters.
///
/// Nested fields are folded into the schema of their root parameter. File
/// parameters cannot be sent in a query and are dropped.
pub fn convert_to_query(
    generator: &SchemaGenerator,
    rules: Option<&RuleSet>,
) -> Option<Vec<Parameter>> {
    let rules = rules?;
    debug!("Converting {} field(s) to query parameters", rules.fields.len());

    let mut parameters: Vec<Parameter> = Vec::new();
    for (name, path, field) in sorted_fields(rules) {
        let Some((PathStep::Property(root), rest)) = path.split_first() else {
            debug!("Skipping field without root property: {:?}", name);
            continue;
        };
        let (schema, _) = generator.schema_from_field(field);

        if rest.is_empty() {
            let mut parameter = Parameter::query(root.clone(), schema);
            parameter.required = field.is_required();
            parameters.push(parameter);
            continue;
        }

        let index = match parameters.iter().position(|p| p.name == *root) {
            Some(index) => index,
            None => {
                parameters.push(Parameter::query(root.clone(), Schema::of_type("object")));
                parameters.len() - 1
            }
        };
        add_schema(&mut parameters[index].schema, rest, schema, field.is_required());
    }

    parameters.retain(|p| !p.schema.is_binary());
    Some(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn body(rules: &RuleSet) -> RequestBody {
        convert_to_body(&SchemaGenerator::default(), Some(rules)).unwrap()
    }

    fn query(rules: &RuleSet) -> Vec<Parameter> {
        convert_to_query(&SchemaGenerator::default(), Some(rules)).unwrap()
    }

    #[test]
    fn test_no_rules() {
        let generator = SchemaGenerator::default();
        assert!(convert_to_body(&generator, None).is_none());
        assert!(convert_to_query(&generator, None).is_none());
    }

    #[test]
    fn test_json_body() {
        let rules = RuleSet::parse([
            ("name", vec!["required", "string", "max:50"]),
            ("email", vec!["required", "string", "email"]),
            ("age", vec!["numeric", "min:18"]),
        ]);
        let body = body(&rules);

        assert!(body.required);
        assert_eq!(body.content.keys().collect::<Vec<_>>(), vec![JSON_CONTENT]);
        let schema = &body.content[JSON_CONTENT].schema;
        assert!(schema.is_type("object"));
        assert_eq!(schema.properties.len(), 3);
        assert_eq!(schema.properties["name"].max_length, Some(50));
        assert_eq!(schema.properties["age"].min, Some(18.0));
        assert_eq!(schema.required, vec!["email", "name"]);
    }

    #[test]
    fn test_optional_body() {
        let rules = RuleSet::parse([("name", vec!["string"])]);
        assert!(!body(&rules).required);
    }

    #[test]
    fn test_nested_body() {
        let rules = RuleSet::parse([
            ("user", vec!["required", "object"]),
            ("user.name", vec!["required", "string"]),
            ("user.tags", vec!["array"]),
            ("user.tags[].label", vec!["string"]),
        ]);
        let body = body(&rules);
        let schema = &body.content[JSON_CONTENT].schema;

        let user = &schema.properties["user"];
        assert!(user.is_type("object"));
        assert_eq!(user.required, vec!["name"]);
        let tags = &user.properties["tags"];
        assert!(tags.is_type("array"));
        let items = tags.items.as_ref().unwrap();
        assert!(items.is_type("object"));
        assert!(items.properties["label"].is_type("string"));
        assert_eq!(schema.required, vec!["user"]);
    }

    #[test]
    fn test_multipart_body() {
        let rules = RuleSet::parse([
            ("file", vec!["required", "file", "mime:text/plain"]),
            ("name", vec!["string"]),
        ]);
        let body = body(&rules);

        assert_eq!(body.content.keys().collect::<Vec<_>>(), vec![MULTIPART_CONTENT]);
        let media = &body.content[MULTIPART_CONTENT];
        assert_eq!(media.schema.properties["file"].format.as_deref(), Some("binary"));
        assert_eq!(
            media.encoding["file"].content_type.as_deref(),
            Some("text/plain")
        );
    }

    #[test]
    fn test_optional_files_add_json_alternative() {
        let rules = RuleSet::parse([
            ("image", vec!["nullable", "file", "image"]),
            ("name", vec!["required", "string"]),
        ]);
        let body = body(&rules);

        assert_eq!(
            body.content.keys().collect::<Vec<_>>(),
            vec![JSON_CONTENT, MULTIPART_CONTENT]
        );
        let json = &body.content[JSON_CONTENT];
        assert_eq!(json.schema.properties.keys().collect::<Vec<_>>(), vec!["name"]);
        assert_eq!(json.schema.required, vec!["name"]);
        assert!(json.encoding.is_empty());

        let multipart = &body.content[MULTIPART_CONTENT];
        assert_eq!(multipart.schema.properties.len(), 2);
        assert!(multipart.encoding.contains_key("image"));
    }

    #[test]
    fn test_nested_encoding_ignored() {
        let rules = RuleSet::parse([("user.avatar", vec!["file", "image"])]);
        let body = body(&rules);
        assert!(body.content[MULTIPART_CONTENT].encoding.is_empty());
    }

    #[test]
    fn test_query_parameters() {
        let rules = RuleSet::parse([
            ("search", vec!["required", "string"]),
            ("page", vec!["integer", "min:1"]),
        ]);
        let parameters = query(&rules);

        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].name, "page");
        assert!(!parameters[0].required);
        assert_eq!(parameters[0].schema.min, Some(1.0));
        assert_eq!(parameters[1].name, "search");
        assert!(parameters[1].required);
        assert_eq!(parameters[1].location, "query");
    }

    #[test]
    fn test_query_nested_fields() {
        let rules = RuleSet::parse([
            ("filter.name", vec!["required", "string"]),
            ("filter.ids", vec!["array:integer"]),
        ]);
        let parameters = query(&rules);

        assert_eq!(parameters.len(), 1);
        let filter = &parameters[0];
        assert_eq!(filter.name, "filter");
        assert!(!filter.required);
        assert!(filter.schema.is_type("object"));
        assert_eq!(filter.schema.required, vec!["name"]);
        assert!(filter.schema.properties["ids"].is_type("array"));
    }

    #[test]
    fn test_query_parent_merged_with_children() {
        let rules = RuleSet::parse([
            ("object", vec!["required", "object"]),
            ("object.property", vec!["string"]),
        ]);
        let parameters = query(&rules);

        assert_eq!(parameters.len(), 1);
        assert!(parameters[0].required);
        assert!(parameters[0].schema.properties["property"].is_type("string"));
    }

    #[test]
    fn test_query_drops_files() {
        let rules = RuleSet::parse([
            ("file", vec!["required", "file"]),
            ("name", vec!["string"]),
        ]);
        let parameters = query(&rules);
        assert_eq!(parameters.len(), 1);
        assert_eq!(parameters[0].name, "name");
    }
}
