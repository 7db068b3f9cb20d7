use crate::config::AppConfig;
use crate::docs::{DocumentationProvider, NoDocs};
use crate::error::Result;
use crate::openapi::{Components, Info, OpenApiDocument, Server};
use crate::refs::Refs;
use crate::route_converter::RouteConverter;
use crate::router::Router;
use crate::rule_converters::RuleConverterRegistry;
use crate::schema_generator::SchemaGenerator;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const OPENAPI_VERSION: &str = "3.0.0";
pub const DEFAULT_API_VERSION: &str = "0.0.0";

/// OpenAPI document generator
pub struct Generator {
    /// Components generated during the current run
    refs: Refs,
    schema_generator: SchemaGenerator,
    /// Source of operation descriptions
    docs: Box<dyn DocumentationProvider>,
    /// Configuration, loaded from `config_path` on first use when absent
    config: Option<AppConfig>,
    config_path: Option<PathBuf>,
}

impl Generator {
    /// Create a generator with the built-in rule converters and no documentation
    pub fn new() -> Self {
        debug!("Initializing Generator");
        Self {
            refs: Refs::new(),
            schema_generator: SchemaGenerator::default(),
            docs: Box::new(NoDocs),
            config: None,
            config_path: None,
        }
    }

    /// Use an already loaded configuration
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the configuration from `path` when generating
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Read operation descriptions from `docs`
    pub fn with_docs(mut self, docs: impl DocumentationProvider + 'static) -> Self {
        self.docs = Box::new(docs);
        self
    }

    /// Replace the rule converters
    pub fn with_registry(mut self, registry: RuleConverterRegistry) -> Self {
        self.schema_generator = SchemaGenerator::new(registry);
        self
    }

    /// Rule converters, for registering custom rules
    pub fn registry_mut(&mut self) -> &mut RuleConverterRegistry {
        self.schema_generator.registry_mut()
    }

    /// Cache of the last generation run
    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Generate the OpenAPI document describing `router`.
    ///
    /// Returns `Ok(None)` when the configuration cannot be loaded. Unreadable
    /// handler sources and unsupported HTTP methods abort the generation.
    pub fn generate(&mut self, router: &Router) -> Result<Option<OpenApiDocument>> {
        let Some(config) = self.load_config() else {
            return Ok(None);
        };

        let mut document = OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: config.app.name.clone(),
                version: DEFAULT_API_VERSION.to_string(),
                description: None,
            },
            servers: vec![Server {
                url: config.base_url(),
            }],
            paths: BTreeMap::new(),
            components: Components::default(),
        };

        self.refs = Refs::new();
        self.docs.reset();
        self.convert_router(router, &mut document)?;

        debug!(
            "Generated {} path(s) and {} schema(s)",
            document.paths.len(),
            document.components.schemas.len()
        );
        Ok(Some(document))
    }

    /// Configuration to use, loading it if needed
    fn load_config(&mut self) -> Option<AppConfig> {
        if self.config.is_none() {
            match &self.config_path {
                Some(path) => match AppConfig::load(path) {
                    Ok(config) => self.config = Some(config),
                    Err(e) => {
                        warn!("Cannot generate OpenAPI document: {}", e);
                        return None;
                    }
                },
                None => self.config = Some(AppConfig::default()),
            }
        }
        self.config.clone()
    }

    /// Convert the routes of `router`, then its subrouters, depth first
    fn convert_router(&mut self, router: &Router, document: &mut OpenApiDocument) -> Result<()> {
        for route in router.routes() {
            RouteConverter::new(
                route,
                &mut self.refs,
                &self.schema_generator,
                self.docs.as_mut(),
            )
            .convert(document)?;
        }

        for subrouter in router.subrouters() {
            self.convert_router(subrouter, document)?;
        }
        Ok(())
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::{SourceDocProvider, StaticDocProvider};
    use crate::error::Error;
    use crate::router::HandlerRef;
    use crate::validation::RuleSet;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn config(name: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.app.name = name.to_string();
        config.server.domain = "goyave.dev".to_string();
        config.server.port = 80;
        config
    }

    #[test]
    fn test_document_header() {
        let mut generator = Generator::new().with_config(config("Shop"));
        let document = generator.generate(&Router::new()).unwrap().unwrap();

        assert_eq!(document.openapi, "3.0.0");
        assert_eq!(document.info.title, "Shop");
        assert_eq!(document.info.version, "0.0.0");
        assert_eq!(
            document.servers,
            vec![Server {
                url: "http://goyave.dev".to_string()
            }]
        );
        assert!(document.paths.is_empty());
        assert!(document.components.is_empty());
    }

    #[test]
    fn test_config_loaded_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"app": {"name": "From file"}}"#).unwrap();

        let mut generator = Generator::new().with_config_path(&path);
        let document = generator.generate(&Router::new()).unwrap().unwrap();
        assert_eq!(document.info.title, "From file");
    }

    #[test]
    fn test_missing_config_yields_no_document() {
        let dir = TempDir::new().unwrap();
        let mut generator = Generator::new().with_config_path(dir.path().join("missing.json"));
        assert!(generator.generate(&Router::new()).unwrap().is_none());
    }

    #[test]
    fn test_routes_before_subrouters() {
        let mut router = Router::new();
        router.subrouter("/users").get("/", HandlerRef::new("app::sub::index"));
        router.get("/users/", HandlerRef::new("app::root::index"));

        let docs = StaticDocProvider::new()
            .with_doc("app::sub::index", "from subrouter")
            .with_doc("app::root::index", "from root");
        let mut generator = Generator::new().with_docs(docs);
        let document = generator.generate(&router).unwrap().unwrap();

        let get = document.paths["/users/"].get.as_ref().unwrap();
        assert_eq!(get.description.as_deref(), Some("from root"));
    }

    #[test]
    fn test_custom_rule_converter() {
        let mut router = Router::new();
        router
            .post("/phones", HandlerRef::new("app::phones::store"))
            .with_rules(RuleSet::parse([("number", ["required", "string", "phone"])]));

        let mut generator = Generator::new();
        generator
            .registry_mut()
            .register("phone", |_, s, _| s.pattern = Some("^\\+[0-9]+$".to_string()));
        let document = generator.generate(&router).unwrap().unwrap();

        let body = &document.components.request_bodies["phones.store"];
        let number = &body.content["application/json"].schema.properties["number"];
        assert_eq!(number.pattern.as_deref(), Some("^\\+[0-9]+$"));
    }

    #[test]
    fn test_sources_reread_on_each_run() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("users.rs");
        fs::write(&source, "/// First run\npub fn show() {}").unwrap();

        let mut router = Router::new();
        router.get("/users", HandlerRef::new("app::users::show"));
        let mut generator = Generator::new().with_docs(SourceDocProvider::new(dir.path()));

        let document = generator.generate(&router).unwrap().unwrap();
        let get = document.paths["/users"].get.as_ref().unwrap();
        assert_eq!(get.description.as_deref(), Some("First run"));

        fs::write(&source, "/// Second run\npub fn show() {}").unwrap();
        let document = generator.generate(&router).unwrap().unwrap();
        let get = document.paths["/users"].get.as_ref().unwrap();
        assert_eq!(get.description.as_deref(), Some("Second run"));
    }

    #[test]
    fn test_unsupported_method_aborts() {
        let mut router = Router::new();
        router.route("GET", "/ok", HandlerRef::new("app::ok"));
        router
            .subrouter("/api")
            .route("BREW", "/coffee", HandlerRef::new("app::coffee"));

        let result = Generator::new().generate(&router);
        assert!(matches!(result, Err(Error::UnsupportedMethod(_))));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let mut router = Router::new();
        let rules = std::sync::Arc::new(RuleSet::parse([
            ("name", vec!["required", "string"]),
            ("tags", vec!["array:string"]),
        ]));
        router
            .post("/items", HandlerRef::new("app::items::store"))
            .with_rules(rules.clone());
        router
            .get("/items/{id:[0-9]+}", HandlerRef::new("app::items::show"))
            .with_rules(rules);

        let mut generator = Generator::new();
        let first = generator.generate(&router).unwrap().unwrap();
        let second = generator.generate(&router).unwrap().unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
