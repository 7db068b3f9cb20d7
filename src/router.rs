//! In-memory routing model.
//!
//! A [`Router`] holds routes and nested subrouters. Each route knows its HTTP
//! methods, its full URI template, the validation rules applied to its input and
//! a reference to the function handling it.

use crate::error::{Error, Result};
use crate::validation::RuleSet;
use log::debug;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// HTTP methods an OpenAPI 3.0 path item can describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Methods conventionally carrying a request body
    pub fn can_have_body(&self) -> bool {
        matches!(
            self,
            HttpMethod::Delete | HttpMethod::Patch | HttpMethod::Post | HttpMethod::Put
        )
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "OPTIONS" => Ok(HttpMethod::Options),
            "HEAD" => Ok(HttpMethod::Head),
            "TRACE" => Ok(HttpMethod::Trace),
            _ => Err(Error::UnsupportedMethod(s.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the function handling a route.
///
/// The name is the fully qualified Rust path of the function, as given by
/// [`std::any::type_name`] (e.g. `my_app::users::UserController::show`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerRef {
    /// Fully qualified function path
    pub name: String,
    /// File defining the function, when known
    pub source: Option<PathBuf>,
}

impl HandlerRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
        }
    }

    /// Reference the given function or closure
    pub fn of<F>(_handler: &F) -> Self {
        Self::new(std::any::type_name::<F>())
    }

    /// Set the file defining the function
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Whether the handler is a closure, which cannot carry documentation
    pub fn is_closure(&self) -> bool {
        self.name.contains("{{closure}}")
    }

    /// Path segments of the qualified name, without generic arguments and with
    /// `<Type as Trait>` reduced to `Type`
    pub fn segments(&self) -> Vec<String> {
        normalize_qualified_name(&self.name)
            .split("::")
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Name usable as an OpenAPI component name.
    ///
    /// The crate segment is dropped and the remaining segments are joined with
    /// `.`; characters outside `[A-Za-z0-9-._]` are removed.
    pub fn ref_name(&self) -> String {
        let segments = self.segments();
        let relevant = if segments.len() > 1 {
            &segments[1..]
        } else {
            &segments[..]
        };
        relevant
            .join(".")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
            .collect()
    }
}

/// Strip generic arguments and qualified-self syntax from a Rust path
fn normalize_qualified_name(name: &str) -> String {
    let mut output = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(open) = rest.find('<') {
        output.push_str(&rest[..open]);
        let Some(close) = matching_angle(rest, open) else {
            rest = "";
            break;
        };
        let inner = &rest[open + 1..close];
        // `<Type as Trait>::method` resolves to `Type::method`
        if output.is_empty() || output.ends_with("::") {
            let self_type = split_top_level(inner, " as ").unwrap_or(inner);
            output.push_str(&normalize_qualified_name(self_type.trim()));
        }
        rest = &rest[close + 1..];
    }
    output.push_str(rest);
    output
}

/// Whether the `>` at byte `index` is the arrow of a fn type, not a bracket
fn is_arrow(text: &str, index: usize) -> bool {
    text[..index].ends_with('-')
}

fn matching_angle(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '<' => depth += 1,
            '>' if !is_arrow(text, open + i) => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Part of `text` before the first `separator` outside angle brackets
fn split_top_level<'a>(text: &'a str, separator: &str) -> Option<&'a str> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' if !is_arrow(text, i) => depth = depth.saturating_sub(1),
            _ if depth == 0 && text[i..].starts_with(separator) => return Some(&text[..i]),
            _ => {}
        }
    }
    None
}

/// A named placeholder of a URI template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriParameter {
    pub name: String,
    /// Regex constraint (`{id:[0-9]+}`), if any
    pub pattern: Option<String>,
}

/// A route with its methods, URI template, rules and handler
#[derive(Debug, Clone)]
pub struct Route {
    /// HTTP methods as declared; checked during conversion
    pub methods: Vec<String>,
    /// Full URI template, including the prefixes of parent routers
    pub uri: String,
    /// Validation rules of the route's input
    pub rules: Option<Arc<RuleSet>>,
    pub handler: HandlerRef,
}

impl Route {
    pub fn new<I, S>(methods: I, uri: impl Into<String>, handler: HandlerRef) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            methods: methods.into_iter().map(Into::into).collect(),
            uri: uri.into(),
            rules: None,
            handler,
        }
    }

    /// Attach validation rules to the route
    pub fn with_rules(&mut self, rules: impl Into<Arc<RuleSet>>) -> &mut Self {
        self.rules = Some(rules.into());
        self
    }

    /// Parse the declared methods
    pub fn http_methods(&self) -> Result<Vec<HttpMethod>> {
        self.methods.iter().map(|m| m.parse()).collect()
    }

    /// Placeholders of the URI template, in order of appearance
    pub fn parameters(&self) -> Vec<UriParameter> {
        placeholders(&self.uri)
            .into_iter()
            .map(|(_, _, body)| match body.split_once(':') {
                Some((name, pattern)) => UriParameter {
                    name: name.to_string(),
                    pattern: Some(pattern.to_string()).filter(|p| !p.is_empty()),
                },
                None => UriParameter {
                    name: body.to_string(),
                    pattern: None,
                },
            })
            .collect()
    }

    /// URI template without regex constraints (`{id:[0-9]+}` becomes `{id}`)
    pub fn clean_uri(&self) -> String {
        let mut uri = String::with_capacity(self.uri.len());
        let mut last = 0;
        for (start, end, body) in placeholders(&self.uri) {
            uri.push_str(&self.uri[last..start]);
            let name = body.split_once(':').map_or(body, |(name, _)| name);
            uri.push('{');
            uri.push_str(name);
            uri.push('}');
            last = end;
        }
        uri.push_str(&self.uri[last..]);
        uri
    }
}

/// Byte range and content of every top-level `{...}` placeholder.
///
/// Braces are counted so that patterns such as `{id:[0-9]{3}}` stay whole.
fn placeholders(uri: &str) -> Vec<(usize, usize, &str)> {
    let mut found = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in uri.char_indices() {
        match c {
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    found.push((start, i + 1, &uri[start + 1..i]));
                }
            }
            _ => {}
        }
    }
    found
}

/// A tree of routes sharing a URI prefix
#[derive(Debug, Clone, Default)]
pub struct Router {
    prefix: String,
    routes: Vec<Route>,
    subrouters: Vec<Router>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn subrouters(&self) -> &[Router] {
        &self.subrouters
    }

    /// Register a route for `|`-separated methods (e.g. `"POST|PUT"`)
    pub fn route(&mut self, methods: &str, uri: &str, handler: HandlerRef) -> &mut Route {
        let full_uri = format!("{}{}", self.prefix, uri);
        debug!("Registering route: {} {}", methods, full_uri);
        let methods = methods.split('|').map(str::trim).filter(|m| !m.is_empty());
        self.routes.push(Route::new(methods, full_uri, handler));
        let index = self.routes.len() - 1;
        &mut self.routes[index]
    }

    /// Register a GET route, which also answers HEAD
    pub fn get(&mut self, uri: &str, handler: HandlerRef) -> &mut Route {
        self.route("GET|HEAD", uri, handler)
    }

    pub fn post(&mut self, uri: &str, handler: HandlerRef) -> &mut Route {
        self.route("POST", uri, handler)
    }

    pub fn put(&mut self, uri: &str, handler: HandlerRef) -> &mut Route {
        self.route("PUT", uri, handler)
    }

    pub fn patch(&mut self, uri: &str, handler: HandlerRef) -> &mut Route {
        self.route("PATCH", uri, handler)
    }

    pub fn delete(&mut self, uri: &str, handler: HandlerRef) -> &mut Route {
        self.route("DELETE", uri, handler)
    }

    /// Create a subrouter whose routes are prefixed with `prefix`
    pub fn subrouter(&mut self, prefix: &str) -> &mut Router {
        self.subrouters.push(Router {
            prefix: format!("{}{}", self.prefix, prefix),
            ..Default::default()
        });
        let index = self.subrouters.len() - 1;
        &mut self.subrouters[index]
    }
}
