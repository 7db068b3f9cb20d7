//! Insertion of field schemas into nested object/array trees.
//!
//! Field names describe where a value lives inside the request: `.` separates
//! object levels and a trailing `[]` marks an array level, so
//! `user.tags[].name` is the `name` property of the elements of the `tags` array
//! of the `user` object.

use crate::openapi::Schema;

/// One step of a field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// Descend into the named property of an object
    Property(String),
    /// Descend into the items of an array
    Items,
}

/// Parse a field name into its steps
pub fn parse_path(name: &str) -> Vec<PathStep> {
    let mut steps = Vec::new();
    for segment in name.split('.') {
        let mut property = segment;
        let mut arrays = 0;
        while let Some(stripped) = property.strip_suffix("[]") {
            property = stripped;
            arrays += 1;
        }
        if !property.is_empty() {
            steps.push(PathStep::Property(property.to_string()));
        }
        steps.extend(std::iter::repeat(PathStep::Items).take(arrays));
    }
    steps
}

/// Insert `leaf` into `root` at `path`, creating intermediate objects and arrays.
///
/// The leaf is merged into whatever already sits at the destination, so parents
/// and children can be inserted in any order without losing information. When
/// `required` is set and the path ends on a property, the property name is added
/// to its parent's required list.
pub fn add_schema(root: &mut Schema, path: &[PathStep], leaf: Schema, required: bool) {
    let Some((last, parents)) = path.split_last() else {
        root.merge(leaf);
        return;
    };

    let mut node = root;
    for step in parents {
        node = descend(node, step);
    }

    if required {
        if let PathStep::Property(name) = last {
            if !node.required.contains(name) {
                node.required.push(name.clone());
            }
        }
    }
    descend(node, last).merge(leaf);
}

fn descend<'a>(node: &'a mut Schema, step: &PathStep) -> &'a mut Schema {
    match step {
        PathStep::Property(name) => {
            node.schema_type = Some("object".to_string());
            node.properties.entry(name.clone()).or_default()
        }
        PathStep::Items => {
            node.schema_type = Some("array".to_string());
            node.items.get_or_insert_with(Default::default).as_mut()
        }
    }
}

/// Whether the path only goes through array items after its root property.
///
/// Multipart encodings can only be expressed for such fields.
pub fn is_root_field(path: &[PathStep]) -> bool {
    matches!(path.first(), Some(PathStep::Property(_)))
        && path[1..].iter().all(|s| *s == PathStep::Items)
}
