//! openapi-from-rules - Command-line tool generating OpenAPI documentation from
//! route manifests and validation rules.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-rules [OPTIONS] <MANIFEST>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation:
//! ```bash
//! openapi-from-rules routes.yaml -c config.json -o openapi.yaml
//! ```
//!
//! Read handler descriptions from the application sources and render Swagger UI:
//! ```bash
//! openapi-from-rules routes.yaml -s ../shop/src -f json -o openapi.json --ui docs/index.html
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_rules::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("openapi-from-rules starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
