//! Handler documentation resolution.
//!
//! Operation descriptions come from the doc comments of route handlers. The
//! [`DocumentationProvider`] trait abstracts where they are read from:
//! [`SourceDocProvider`] parses the handler's source file, [`StaticDocProvider`]
//! serves a prebuilt map and [`NoDocs`] disables descriptions entirely.

use crate::error::{Error, Result};
use crate::parser::{AstParser, ParsedFile};
use crate::router::HandlerRef;
use crate::scanner::FileScanner;
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use syn::visit::Visit;
use syn::{Attribute, Expr, ExprLit, ImplItem, Lit, Meta, Type};

/// Resolved documentation of a handler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerDoc {
    /// Component-safe handler name
    pub name: String,
    /// Doc comment text, empty when the handler has none
    pub description: String,
}

/// Source of handler descriptions
pub trait DocumentationProvider {
    /// Description of the handler, if it has one.
    ///
    /// Errors abort the whole generation.
    fn describe(&mut self, handler: &HandlerRef) -> Result<Option<String>>;

    /// Drop state cached during a previous generation run
    fn reset(&mut self) {}
}

/// Reads doc comments from the Rust sources of the documented application.
///
/// Each source file is parsed at most once per generation run.
pub struct SourceDocProvider {
    /// Directory containing the crate root (`lib.rs` or `main.rs`)
    root: PathBuf,
    /// Parse cache
    files: HashMap<PathBuf, ParsedFile>,
}

impl SourceDocProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: HashMap::new(),
        }
    }

    /// Number of files parsed so far
    pub fn parsed_files(&self) -> usize {
        self.files.len()
    }

    /// Find the file declaring a handler.
    ///
    /// `modules` are the path segments between the crate name and the function
    /// name; trailing segments may be type names rather than modules.
    fn locate(&self, handler: &HandlerRef, modules: &[String]) -> Result<PathBuf> {
        if let Some(source) = &handler.source {
            return Ok(if source.is_absolute() {
                source.clone()
            } else {
                self.root.join(source)
            });
        }

        for len in (1..=modules.len()).rev() {
            let relative: PathBuf = modules[..len].iter().collect();
            let candidates = [
                self.root.join(&relative).with_extension("rs"),
                self.root.join(&relative).join("mod.rs"),
            ];
            if let Some(found) = candidates.into_iter().find(|p| p.is_file()) {
                return Ok(found);
            }
        }

        let scanner = FileScanner::new(self.root.clone());
        if let Some(found) = modules.iter().rev().find_map(|m| scanner.find_module(m)) {
            return Ok(found);
        }

        // Handlers declared in the crate root or in its inline modules
        ["lib.rs", "main.rs"]
            .iter()
            .map(|f| self.root.join(f))
            .find(|p| p.is_file())
            .ok_or_else(|| Error::SourceNotFound {
                handler: handler.name.clone(),
            })
    }

    fn parsed(&mut self, path: &Path) -> Result<&ParsedFile> {
        if !self.files.contains_key(path) {
            let parsed = AstParser::parse_file(path)?;
            self.files.insert(path.to_path_buf(), parsed);
        }
        Ok(&self.files[path])
    }
}

impl DocumentationProvider for SourceDocProvider {
    fn describe(&mut self, handler: &HandlerRef) -> Result<Option<String>> {
        let segments = handler.segments();
        let Some((function, parents)) = segments.split_last() else {
            return Ok(None);
        };
        let modules = parents.get(1..).unwrap_or_default();
        let path = self.locate(handler, modules)?;
        debug!("Reading documentation of {} from {}", handler.name, path.display());

        let parsed = self.parsed(&path)?;
        let mut finder = DocFinder::new(parents.last().map(String::as_str), function);
        finder.visit_file(&parsed.syntax_tree);
        Ok(finder.doc())
    }

    fn reset(&mut self) {
        self.files.clear();
    }
}

/// Descriptions known ahead of time, keyed by qualified handler name
#[derive(Debug, Clone, Default)]
pub struct StaticDocProvider {
    docs: HashMap<String, String>,
}

impl StaticDocProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc(mut self, handler: impl Into<String>, description: impl Into<String>) -> Self {
        self.insert(handler, description);
        self
    }

    pub fn insert(&mut self, handler: impl Into<String>, description: impl Into<String>) {
        self.docs.insert(handler.into(), description.into());
    }
}

impl DocumentationProvider for StaticDocProvider {
    fn describe(&mut self, handler: &HandlerRef) -> Result<Option<String>> {
        Ok(self.docs.get(&handler.name).cloned())
    }
}

/// Provider that never documents anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDocs;

impl DocumentationProvider for NoDocs {
    fn describe(&mut self, _handler: &HandlerRef) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Visitor looking for the declaration of one function.
///
/// A method of an `impl` block for `receiver` is preferred over a free function
/// with the same name.
struct DocFinder<'a> {
    receiver: Option<&'a str>,
    function: &'a str,
    method_doc: Option<Option<String>>,
    fn_doc: Option<Option<String>>,
}

impl<'a> DocFinder<'a> {
    fn new(receiver: Option<&'a str>, function: &'a str) -> Self {
        Self {
            receiver,
            function,
            method_doc: None,
            fn_doc: None,
        }
    }

    fn doc(self) -> Option<String> {
        match self.method_doc {
            Some(doc) => doc,
            None => self.fn_doc.flatten(),
        }
    }
}

impl<'ast, 'a> Visit<'ast> for DocFinder<'a> {
    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        if self.method_doc.is_none() && self.receiver.is_some()
            && type_name(&node.self_ty).as_deref() == self.receiver
        {
            for item in &node.items {
                if let ImplItem::Fn(method) = item {
                    if method.sig.ident == self.function {
                        self.method_doc = Some(doc_text(&method.attrs));
                        break;
                    }
                }
            }
        }
        syn::visit::visit_item_impl(self, node);
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        if self.fn_doc.is_none() && node.sig.ident == self.function {
            self.fn_doc = Some(doc_text(&node.attrs));
        }
        syn::visit::visit_item_fn(self, node);
    }
}

/// Last identifier of a type, ignoring references and generic arguments
fn type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        Type::Reference(reference) => type_name(&reference.elem),
        Type::Paren(paren) => type_name(&paren.elem),
        Type::Group(group) => type_name(&group.elem),
        _ => None,
    }
}

/// Trimmed text of the `///` comments and `#[doc]` attributes
fn doc_text(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(name_value) => match &name_value.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(text),
                    ..
                }) => Some(text.value()),
                _ => None,
            },
            _ => None,
        })
        .collect();

    let text = lines
        .iter()
        .map(|line| line.strip_prefix(' ').unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n");
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
