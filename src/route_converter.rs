use crate::docs::{DocumentationProvider, HandlerDoc};
use crate::error::Result;
use crate::openapi::{OpenApiDocument, Operation, Parameter, PathItem, RefOr, Response, Schema};
use crate::refs::{
    title_case, unique_component_name, Refs, PARAMETERS_REF, REQUEST_BODIES_REF, SCHEMAS_REF,
};
use crate::request::{convert_to_body, convert_to_query};
use crate::router::{HttpMethod, Route, UriParameter};
use crate::schema_generator::SchemaGenerator;
use log::debug;
use std::collections::BTreeMap;

/// Converts one route into OpenAPI operations and path parameters.
///
/// Generated components are registered in the document and remembered in
/// [`Refs`] so that routes sharing rules or parameters reference the same
/// components.
pub struct RouteConverter<'a> {
    route: &'a Route,
    refs: &'a mut Refs,
    generator: &'a SchemaGenerator,
    docs: &'a mut dyn DocumentationProvider,
    /// URI without parameter patterns
    uri: String,
    tag: String,
    /// Component-safe handler name
    name: String,
    description: String,
}

impl<'a> RouteConverter<'a> {
    pub fn new(
        route: &'a Route,
        refs: &'a mut Refs,
        generator: &'a SchemaGenerator,
        docs: &'a mut dyn DocumentationProvider,
    ) -> Self {
        Self {
            route,
            refs,
            generator,
            docs,
            uri: String::new(),
            tag: String::new(),
            name: String::new(),
            description: String::new(),
        }
    }

    /// Convert the route and add the results to `document`.
    ///
    /// Operations already present on the path item are left untouched, so
    /// converting the same route twice is harmless.
    pub fn convert(&mut self, document: &mut OpenApiDocument) -> Result<()> {
        let methods = self.route.http_methods()?;

        self.uri = self.route.clean_uri();
        self.tag = uri_to_tag(&self.uri);
        let doc = self.read_description()?;
        self.name = doc.name;
        self.description = doc.description;
        debug!("Converting route: {:?} {}", self.route.methods, self.uri);

        for method in methods {
            if matches!(method, HttpMethod::Head | HttpMethod::Options) {
                continue;
            }
            if let Some(path_item) = document.paths.get(&self.uri) {
                if operation_exists(path_item, method) {
                    debug!("Operation {} {} already exists", method, self.uri);
                    continue;
                }
            }
            let operation = self.convert_operation(method, document);
            let path_item = document.paths.entry(self.uri.clone()).or_default();
            *operation_slot(path_item, method) = Some(operation);
        }

        self.convert_path_parameters(document);
        Ok(())
    }

    /// Resolve the handler documentation once per handler
    fn read_description(&mut self) -> Result<HandlerDoc> {
        let handler = &self.route.handler;
        if let Some(doc) = self.refs.handler_docs.get(&handler.name) {
            return Ok(doc.clone());
        }

        let description = if handler.is_closure() {
            String::new()
        } else {
            self.docs.describe(handler)?.unwrap_or_default()
        };
        let doc = HandlerDoc {
            name: handler.ref_name(),
            description,
        };
        self.refs
            .handler_docs
            .insert(handler.name.clone(), doc.clone());
        Ok(doc)
    }

    fn convert_operation(&mut self, method: HttpMethod, document: &mut OpenApiDocument) -> Operation {
        let mut operation = Operation::default();
        if !self.tag.is_empty() {
            operation.tags.push(self.tag.clone());
        }
        if !self.description.is_empty() {
            operation.description = Some(self.description.clone());
        }

        self.convert_validation_rules(method, &mut operation, document);

        if operation.responses.is_empty() {
            operation.responses.insert(
                "default".to_string(),
                Response {
                    description: String::new(),
                },
            );
        }
        operation
    }

    fn convert_validation_rules(
        &mut self,
        method: HttpMethod,
        operation: &mut Operation,
        document: &mut OpenApiDocument,
    ) {
        let Some(rules) = self.route.rules.as_deref() else {
            return;
        };

        if method.can_have_body() {
            let reference = match self.refs.request_bodies.get(&rules.id()) {
                Some(reference) => reference.clone(),
                None => {
                    let Some(body) = convert_to_body(self.generator, Some(rules)) else {
                        return;
                    };
                    let bodies = &mut document.components.request_bodies;
                    let (name, exists) = unique_component_name(bodies, &self.name, &body);
                    if !exists {
                        bodies.insert(name.clone(), body);
                    }
                    let reference = format!("{}{}", REQUEST_BODIES_REF, name);
                    self.refs
                        .request_bodies
                        .insert(rules.id(), reference.clone());
                    reference
                }
            };
            operation.request_body = Some(RefOr::reference(reference));
            return;
        }

        let references = match self.refs.query_parameters.get(&rules.id()) {
            Some(references) => references.clone(),
            None => {
                let parameters = convert_to_query(self.generator, Some(rules)).unwrap_or_default();
                let components = &mut document.components.parameters;
                let references: Vec<String> = parameters
                    .into_iter()
                    .map(|parameter| {
                        let base = format!("{}-query-{}", self.name, parameter.name);
                        let (name, exists) = unique_component_name(components, &base, &parameter);
                        if !exists {
                            components.insert(name.clone(), parameter);
                        }
                        format!("{}{}", PARAMETERS_REF, name)
                    })
                    .collect();
                self.refs
                    .query_parameters
                    .insert(rules.id(), references.clone());
                references
            }
        };
        operation
            .parameters
            .extend(references.into_iter().map(RefOr::reference));
    }

    /// Reference to the schema of a path parameter, generating it if needed
    fn param_schema(&mut self, parameter: &UriParameter, schemas: &mut BTreeMap<String, Schema>) -> String {
        let key = (parameter.name.clone(), parameter.pattern.clone());
        if let Some(reference) = self.refs.param_schemas.get(&key) {
            return reference.clone();
        }

        let (base, schema) = match parameter.pattern.as_deref() {
            None => ("paramString".to_string(), Schema::of_type("string")),
            Some(pattern) => {
                let mut schema = Schema::of_type("string");
                schema.pattern = Some(pattern.to_string());
                if pattern == "[0-9]+" {
                    schema.schema_type = Some("integer".to_string());
                    ("paramInteger".to_string(), schema)
                } else {
                    (format!("param{}", title_case(&parameter.name)), schema)
                }
            }
        };

        let (name, exists) = unique_component_name(schemas, &base, &schema);
        if !exists {
            schemas.insert(name.clone(), schema);
        }
        let reference = format!("{}{}", SCHEMAS_REF, name);
        self.refs.param_schemas.insert(key, reference.clone());
        reference
    }

    fn convert_path_parameters(&mut self, document: &mut OpenApiDocument) {
        let Some(path_item) = document.paths.get_mut(&self.uri) else {
            return;
        };
        let components = &mut document.components;

        for uri_parameter in self.route.parameters() {
            let schema_ref = self.param_schema(&uri_parameter, &mut components.schemas);
            let key = (uri_parameter.name.clone(), schema_ref);
            let reference = match self.refs.parameters.get(&key) {
                Some(reference) => reference.clone(),
                None => {
                    let parameter =
                        Parameter::path(uri_parameter.name.clone(), Schema::reference(key.1.clone()));
                    let (name, exists) =
                        unique_component_name(&components.parameters, &uri_parameter.name, &parameter);
                    if !exists {
                        components.parameters.insert(name.clone(), parameter);
                    }
                    let reference = format!("{}{}", PARAMETERS_REF, name);
                    self.refs.parameters.insert(key, reference.clone());
                    reference
                }
            };

            if !parameter_exists(path_item, &uri_parameter.name, &reference) {
                path_item.parameters.push(RefOr::reference(reference));
            }
        }
    }
}

/// First segment of the URI, or nothing when it is a parameter
pub fn uri_to_tag(uri: &str) -> String {
    let segment = uri
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default();
    if segment.starts_with('{') {
        String::new()
    } else {
        segment.to_string()
    }
}

/// Whether the path item already has the parameter, by reference or inline name
fn parameter_exists(path_item: &PathItem, name: &str, reference: &str) -> bool {
    path_item.parameters.iter().any(|p| match p {
        RefOr::Ref { reference: existing } => existing == reference,
        RefOr::Item(parameter) => parameter.name == name,
    })
}

fn operation_exists(path_item: &PathItem, method: HttpMethod) -> bool {
    let operation = match method {
        HttpMethod::Get => &path_item.get,
        HttpMethod::Post => &path_item.post,
        HttpMethod::Put => &path_item.put,
        HttpMethod::Delete => &path_item.delete,
        HttpMethod::Patch => &path_item.patch,
        HttpMethod::Options => &path_item.options,
        HttpMethod::Head => &path_item.head,
        HttpMethod::Trace => &path_item.trace,
    };
    operation.is_some()
}

fn operation_slot(path_item: &mut PathItem, method: HttpMethod) -> &mut Option<Operation> {
    match method {
        HttpMethod::Get => &mut path_item.get,
        HttpMethod::Post => &mut path_item.post,
        HttpMethod::Put => &mut path_item.put,
        HttpMethod::Delete => &mut path_item.delete,
        HttpMethod::Patch => &mut path_item.patch,
        HttpMethod::Options => &mut path_item.options,
        HttpMethod::Head => &mut path_item.head,
        HttpMethod::Trace => &mut path_item.trace,
    }
}
