//! OpenAPI from Rules - OpenAPI documentation generated from route tables and validation rules.
//!
//! This library builds OpenAPI 3.0 documents from the routes an application
//! registers and the validation rules attached to them. The rules double as the
//! request schema: `required|string|max:50` becomes a required string property
//! with `maxLength: 50`, `file` fields switch the body to `multipart/form-data`,
//! and GET-like routes expose their rules as query parameters.
//!
//! # Architecture
//!
//! The library is organized into several modules that work together:
//!
//! 1. [`validation`] - Rules, fields and rule sets attached to routes
//! 2. [`router`] - Router tree, routes, HTTP methods and handler references
//! 3. [`manifest`] - Loads a router tree from a YAML or JSON manifest
//! 4. [`rule_converters`] - Registry mapping rule names onto schema changes
//! 5. [`schema_generator`] - Converts a field's rules into a schema
//! 6. [`schema_tree`] - Places dotted field paths into nested object schemas
//! 7. [`request`] - Builds request bodies and query parameters from rule sets
//! 8. [`docs`] - Reads handler doc comments from Rust sources (via [`scanner`] and [`parser`])
//! 9. [`route_converter`] - Converts one route into path items and components
//! 10. [`openapi_builder`] - Drives the conversion of a whole router tree
//! 11. [`serializer`] - Serializes the document to YAML or JSON
//! 12. [`ui`] - Renders a Swagger UI page embedding the document
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_rules::{
//!     openapi_builder::Generator,
//!     router::{HandlerRef, Router},
//!     serializer::serialize_yaml,
//!     validation::RuleSet,
//! };
//!
//! let mut router = Router::new();
//! router.get("/users/{id:[0-9]+}", HandlerRef::new("shop::users::show"));
//! router
//!     .post("/users", HandlerRef::new("shop::users::store"))
//!     .with_rules(RuleSet::parse([
//!         ("name", vec!["required", "string", "max:50"]),
//!         ("avatar", vec!["file", "mime:image/png,image/jpeg"]),
//!     ]));
//!
//! let mut generator = Generator::new();
//! let document = generator.generate(&router).unwrap().unwrap();
//! println!("{}", serialize_yaml(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod config;
pub mod docs;
pub mod error;
pub mod manifest;
pub mod openapi;
pub mod openapi_builder;
pub mod parser;
pub mod refs;
pub mod request;
pub mod route_converter;
pub mod router;
pub mod rule_converters;
pub mod scanner;
pub mod schema_generator;
pub mod schema_tree;
pub mod serializer;
pub mod ui;
pub mod validation;
