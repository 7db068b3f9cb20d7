//! Route manifest files.
//!
//! A manifest describes a router tree and its validation rules in YAML or JSON,
//! so that an application's routes can be documented without linking against it:
//!
//! ```yaml
//! rule_sets:
//!   user:
//!     name: required|string|max:50
//!     email: [required, string, email]
//! routes:
//!   - methods: GET|HEAD
//!     uri: /users/{id:[0-9]+}
//!     handler: app::users::show
//! subrouters:
//!   - prefix: /admin
//!     routes:
//!       - methods: [POST]
//!         uri: /users
//!         handler: app::admin::store
//!         rules: user
//! ```
//!
//! Routes referring to the same named rule set share one request body component.

use crate::error::{Error, Result};
use crate::router::{HandlerRef, Router};
use crate::validation::{split_rules, Field, RuleSet};
use log::debug;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Either a list or a `|`-separated string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StringList {
    List(Vec<String>),
    Joined(String),
}

impl StringList {
    fn items(&self) -> Vec<String> {
        match self {
            StringList::List(items) => items.clone(),
            StringList::Joined(joined) => split_rules(joined),
        }
    }
}

type FieldRules = BTreeMap<String, StringList>;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RulesEntry {
    Named(String),
    Inline(FieldRules),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteEntry {
    methods: StringList,
    uri: String,
    handler: String,
    #[serde(default)]
    source: Option<PathBuf>,
    #[serde(default)]
    rules: Option<RulesEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RouterEntry {
    #[serde(default)]
    prefix: String,
    #[serde(default)]
    routes: Vec<RouteEntry>,
    #[serde(default)]
    subrouters: Vec<RouterEntry>,
}

/// Parsed manifest file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    rule_sets: BTreeMap<String, FieldRules>,
    #[serde(default)]
    routes: Vec<RouteEntry>,
    #[serde(default)]
    subrouters: Vec<RouterEntry>,
}

impl Manifest {
    /// Read a manifest, choosing the format from the file extension
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading route manifest from {}", path.display());
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Err(Error::InvalidManifest(format!(
                "unsupported manifest format: {}",
                path.display()
            ))),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::InvalidManifest(e.to_string()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::InvalidManifest(e.to_string()))
    }

    /// Build the router tree described by the manifest
    pub fn into_router(self) -> Result<Router> {
        let named: HashMap<String, Arc<RuleSet>> = self
            .rule_sets
            .iter()
            .map(|(name, fields)| (name.clone(), Arc::new(build_rule_set(fields))))
            .collect();

        let mut router = Router::new();
        let root = RouterEntry {
            prefix: String::new(),
            routes: self.routes,
            subrouters: self.subrouters,
        };
        fill_router(&mut router, &root, &named)?;
        Ok(router)
    }
}

fn build_rule_set(fields: &FieldRules) -> RuleSet {
    RuleSet::new(
        fields
            .iter()
            .map(|(name, rules)| (name.clone(), Field::parse(rules.items())))
            .collect(),
    )
}

fn fill_router(
    router: &mut Router,
    entry: &RouterEntry,
    named: &HashMap<String, Arc<RuleSet>>,
) -> Result<()> {
    for route_entry in &entry.routes {
        let methods = route_entry.methods.items().join("|");
        let mut handler = HandlerRef::new(route_entry.handler.clone());
        if let Some(source) = &route_entry.source {
            handler = handler.with_source(source.clone());
        }

        let rules = match &route_entry.rules {
            None => None,
            Some(RulesEntry::Named(name)) => Some(named.get(name).cloned().ok_or_else(|| {
                Error::InvalidManifest(format!(
                    "route {} refers to unknown rule set {}",
                    route_entry.uri, name
                ))
            })?),
            Some(RulesEntry::Inline(fields)) => Some(Arc::new(build_rule_set(fields))),
        };

        let route = router.route(&methods, &route_entry.uri, handler);
        route.rules = rules;
    }

    for sub_entry in &entry.subrouters {
        let subrouter = router.subrouter(&sub_entry.prefix);
        fill_router(subrouter, sub_entry, named)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
rule_sets:
  user:
    name: required|string|max:50
    email: [required, string, email]
routes:
  - methods: GET|HEAD
    uri: /users/{id:[0-9]+}
    handler: app::users::show
    source: src/users.rs
  - methods: [POST]
    uri: /users
    handler: app::users::store
    rules: user
subrouters:
  - prefix: /admin
    routes:
      - methods: [PUT]
        uri: /users/{id}
        handler: app::admin::update
        rules: user
      - methods: [GET]
        uri: /search
        handler: app::admin::search
        rules:
          query: required|string
    subrouters:
      - prefix: /deep
        routes:
          - methods: DELETE
            uri: /x
            handler: app::deep::x
"#;

    #[test]
    fn test_router_tree() {
        let router = Manifest::from_yaml(MANIFEST).unwrap().into_router().unwrap();

        assert_eq!(router.routes().len(), 2);
        let show = &router.routes()[0];
        assert_eq!(show.methods, vec!["GET", "HEAD"]);
        assert_eq!(show.handler.source, Some(PathBuf::from("src/users.rs")));
        assert!(show.rules.is_none());

        let admin = &router.subrouters()[0];
        assert_eq!(admin.routes()[0].uri, "/admin/users/{id}");
        assert_eq!(admin.subrouters()[0].routes()[0].uri, "/admin/deep/x");
    }

    #[test]
    fn test_named_rule_sets_are_shared() {
        let router = Manifest::from_yaml(MANIFEST).unwrap().into_router().unwrap();

        let store = router.routes()[1].rules.as_ref().unwrap();
        let update = router.subrouters()[0].routes()[0].rules.as_ref().unwrap();
        assert_eq!(store.id(), update.id());

        let email = &store.fields["email"];
        assert!(email.is_required());
        assert!(email.has_rule("email"));
        assert_eq!(store.fields["name"].rules.len(), 3);
    }

    #[test]
    fn test_inline_rules() {
        let router = Manifest::from_yaml(MANIFEST).unwrap().into_router().unwrap();
        let search = router.subrouters()[0].routes()[1].rules.as_ref().unwrap();
        assert!(search.fields["query"].is_required());
    }

    #[test]
    fn test_unknown_rule_set() {
        let manifest = Manifest::from_json(
            r#"{"routes": [{"methods": ["POST"], "uri": "/a", "handler": "app::a", "rules": "missing"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            manifest.into_router(),
            Err(Error::InvalidManifest(_))
        ));
    }

    #[test]
    fn test_invalid_manifest() {
        assert!(matches!(
            Manifest::from_yaml("routes: [{uri: /a}]"),
            Err(Error::InvalidManifest(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("routes.yml");
        fs::write(&path, MANIFEST).unwrap();
        assert_eq!(Manifest::load(&path).unwrap().routes.len(), 2);

        let path = dir.path().join("routes.txt");
        fs::write(&path, MANIFEST).unwrap();
        assert!(matches!(
            Manifest::load(&path),
            Err(Error::InvalidManifest(_))
        ));
    }
}
