//! Laravel OpenAPI Router - Command-line tool for generating OpenAPI documentation.
//!
//! Reads a route manifest exported from a Laravel application, compiles the FormRequest
//! validation rules of each documented route into request body schemas, infers response
//! shapes from the handlers' return types, and writes an OpenAPI 3.0.3 document.
//!
//! # Usage
//!
//! ```bash
//! laravel-openapi-router [OPTIONS] <MANIFEST>
//! ```
//!
//! # Examples
//!
//! Write `openapi.json` and `openapi.yaml` to `storage/app/public`:
//! ```bash
//! laravel-openapi-router ./routes-manifest.yaml
//! ```
//!
//! Print JSON to stdout:
//! ```bash
//! laravel-openapi-router ./routes-manifest.yaml -f json --stdout
//! ```

use anyhow::Result;
use clap::Parser;
use laravel_openapi_router::cli;
use log::info;

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

    info!("Laravel OpenAPI Router starting...");

    let args = cli::parse_args_from_parsed(args)?;

    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
