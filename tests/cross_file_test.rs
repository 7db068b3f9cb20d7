// Descriptions resolved from handlers spread over several source files
use openapi_from_rules::docs::{DocumentationProvider, SourceDocProvider};
use openapi_from_rules::openapi_builder::Generator;
use openapi_from_rules::router::{HandlerRef, Router};
use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::TempDir;

/// Show the current user
fn show_user() {}

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "lib.rs", "pub mod controllers;\n\n/// Liveness probe\npub fn health() {}\n");
    write(root, "controllers/mod.rs", "pub mod users;\npub mod orders;\n");
    write(
        root,
        "controllers/users.rs",
        r#"
        pub struct UserController;

        impl UserController {
            /// List users
            pub fn index(&self) {}

            /// Create a user
            pub fn store(&self) {}
        }
        "#,
    );
    write(
        root,
        "controllers/orders.rs",
        "/// Cancel an order\n///\n/// Refunds are issued automatically.\npub fn cancel() {}\n",
    );
    dir
}

#[test]
fn test_cross_file_descriptions() {
    let dir = project();
    let mut router = Router::new();
    router.get("/health", HandlerRef::new("app::health"));
    router.get(
        "/users",
        HandlerRef::new("app::controllers::users::UserController::index"),
    );
    router.post(
        "/users",
        HandlerRef::new("app::controllers::users::UserController::store"),
    );
    router
        .subrouter("/orders")
        .delete("/{id}", HandlerRef::new("app::controllers::orders::cancel"));

    let document = Generator::new()
        .with_docs(SourceDocProvider::new(dir.path()))
        .generate(&router)
        .unwrap()
        .unwrap();

    let description = |path: &str| {
        let item = &document.paths[path];
        item.get
            .as_ref()
            .or(item.post.as_ref())
            .or(item.delete.as_ref())
            .and_then(|op| op.description.clone())
    };
    assert_eq!(description("/health").as_deref(), Some("Liveness probe"));
    assert_eq!(description("/users").as_deref(), Some("List users"));
    assert_eq!(
        document.paths["/users"].post.as_ref().unwrap().description.as_deref(),
        Some("Create a user")
    );
    assert_eq!(
        description("/orders/{id}").as_deref(),
        Some("Cancel an order\n\nRefunds are issued automatically.")
    );
}

#[test]
fn test_each_file_parsed_once() {
    let dir = project();
    let mut provider = SourceDocProvider::new(dir.path());

    for name in [
        "app::controllers::users::UserController::index",
        "app::controllers::users::UserController::store",
        "app::controllers::orders::cancel",
        "app::controllers::users::UserController::index",
    ] {
        assert!(provider.describe(&HandlerRef::new(name)).unwrap().is_some());
    }
    assert_eq!(provider.parsed_files(), 2);
}

#[test]
fn test_handler_reference_from_function() {
    let handler = HandlerRef::of(&show_user).with_source("cross_file_test.rs");
    assert_eq!(handler.ref_name(), "show_user");

    let mut provider = SourceDocProvider::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests"));
    assert_eq!(
        provider.describe(&handler).unwrap().as_deref(),
        Some("Show the current user")
    );
}

#[test]
fn test_closure_has_no_description() {
    let closure = || {};
    let handler = HandlerRef::of(&closure);
    assert!(handler.is_closure());

    let mut router = Router::new();
    router.get("/anonymous", handler);
    let document = Generator::new()
        .with_docs(SourceDocProvider::new("does-not-exist"))
        .generate(&router)
        .unwrap()
        .unwrap();
    assert_eq!(document.paths["/anonymous"].get.as_ref().unwrap().description, None);
}
