//! Laravel OpenAPI Router - OpenAPI documentation from Laravel routes and FormRequest rules.
//!
//! This library synthesizes an approximate OpenAPI 3.0.3 document from an application's
//! registered routes. Request bodies come from the validation rules of each handler's
//! FormRequest parameter; response bodies are inferred from the keys of the literal array
//! returned by the handler's return type's `toArray` method.
//!
//! # Architecture
//!
//! 1. [`registry`] - Traits through which the host application is queried
//! 2. [`manifest`] - Route manifest file implementing those traits
//! 3. [`type_classifier`] - Decides which types are validation requests or structured responses
//! 4. [`scanner`] / [`source`] - Locate class files and read method source text
//! 5. [`rule_compiler`] - Compiles rule tokens into schema fragments
//! 6. [`key_extractor`] / [`response_inferrer`] - Infer response shapes from source text
//! 7. [`openapi_builder`] - Builds per-route operations, merges paths, assembles the document
//! 8. [`generator`] - Runs the whole pipeline over every route
//! 9. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use laravel_openapi_router::{
//!     generator::{DocumentGenerator, GeneratorConfig},
//!     manifest::Manifest,
//!     response_inferrer::SourceKeyInferrer,
//!     serializer::serialize_json,
//!     source::{ClassIndex, ProjectSourceReader},
//!     type_classifier::HierarchyClassifier,
//! };
//! use std::path::{Path, PathBuf};
//!
//! let manifest = Manifest::load(Path::new("routes-manifest.yaml")).unwrap();
//! let classifier = HierarchyClassifier::new(&manifest);
//! let sources = ProjectSourceReader::new(PathBuf::from("."), &manifest, ClassIndex::default());
//! let inferrer = SourceKeyInferrer::new(&classifier, &sources);
//!
//! let generator = DocumentGenerator::new(&manifest, &manifest, &classifier, &inferrer);
//! let generation = generator.generate(&GeneratorConfig::default()).unwrap();
//! println!("{}", serialize_json(&generation.document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod error;
pub mod generator;
pub mod key_extractor;
pub mod manifest;
pub mod openapi_builder;
pub mod registry;
pub mod response_inferrer;
pub mod rule_compiler;
pub mod scanner;
pub mod schema;
pub mod serializer;
pub mod source;
pub mod type_classifier;
