//! Route manifest: an exported snapshot of the application's routes, controllers and types.
//!
//! The manifest is the crate's stand-in for the host framework's route registry, reflection
//! facility and validation rule container. It is read from YAML or JSON:
//!
//! ```yaml
//! app:
//!   name: My App
//!   url: https://api.example.com
//! routes:
//!   - uri: users
//!     methods: [GET, HEAD, POST]
//!     action: App\Http\Controllers\UserController@store
//! controllers:
//!   App\Http\Controllers\UserController:
//!     methods:
//!       store:
//!         parameters: [App\Http\Requests\StoreUserRequest]
//!         returns: App\Http\Resources\UserResource
//! types:
//!   App\Http\Requests\StoreUserRequest:
//!     parents: [Illuminate\Foundation\Http\FormRequest]
//!     rules:
//!       name: required|max:50
//!       age: [integer, "min:0"]
//!   App\Http\Resources\UserResource:
//!     parents: [Illuminate\Http\Resources\Json\JsonResource]
//!     source: app/Http/Resources/UserResource.php
//! ```

use crate::error::{Error, Result};
use crate::registry::{Reflector, RouteDescriptor, RouteRegistry, TypeRef};
use crate::rule_compiler::{parse_rule_string, FieldRuleSet, RuleToken};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

/// Parsed route manifest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    /// Application settings used as configuration fallbacks
    #[serde(default)]
    pub app: AppSection,
    /// Registered routes, in registration order
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    /// Controllers by fully qualified class name
    #[serde(default)]
    pub controllers: IndexMap<String, ControllerEntry>,
    /// Request, resource and model types by fully qualified class name
    #[serde(default)]
    pub types: IndexMap<String, TypeEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppSection {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// One registered route
#[derive(Debug, Clone, Deserialize)]
pub struct RouteEntry {
    pub uri: String,
    #[serde(default)]
    pub methods: Vec<String>,
    /// `Controller@method` string; anything else (closures, arrays) is not documented
    #[serde(default)]
    pub action: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControllerEntry {
    #[serde(default)]
    pub methods: IndexMap<String, MethodEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MethodEntry {
    /// Declared parameter types, in declaration order
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Declared return type
    #[serde(default)]
    pub returns: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeEntry {
    /// Parent classes and implemented interfaces
    #[serde(default)]
    pub parents: Vec<String>,
    /// Validation rules, for request types
    #[serde(default)]
    pub rules: IndexMap<String, RuleSpec>,
    /// Source file, relative to the project root
    #[serde(default)]
    pub source: Option<PathBuf>,
}

/// Rules of one field: either `"required|max:50"` or a list of entries
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    Pipe(String),
    List(Vec<serde_json::Value>),
}

impl RuleSpec {
    /// Rule tokens of this field. List entries that are not strings (rule objects) are skipped.
    pub fn tokens(&self) -> Vec<RuleToken> {
        match self {
            RuleSpec::Pipe(rules) => parse_rule_string(rules),
            RuleSpec::List(entries) => entries
                .iter()
                .filter_map(|entry| entry.as_str())
                .map(RuleToken::parse)
                .collect(),
        }
    }
}

impl Manifest {
    /// Load a manifest file. `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Manifest> {
        debug!("Loading route manifest: {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| Error::ManifestError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let is_json = path.extension().and_then(|s| s.to_str()) == Some("json");
        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        };

        parsed.map_err(|e| Error::ManifestError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Manifest> {
        let manifest: Manifest = serde_yaml::from_str(content)?;
        Ok(manifest.normalized())
    }

    pub fn from_json_str(content: &str) -> Result<Manifest> {
        let manifest: Manifest = serde_json::from_str(content)?;
        Ok(manifest.normalized())
    }

    /// Rewrite class-name keys to their canonical form (no leading `\`)
    fn normalized(mut self) -> Self {
        self.controllers = self
            .controllers
            .into_iter()
            .map(|(name, entry)| (TypeRef::new(&name).name().to_string(), entry))
            .collect();
        self.types = self
            .types
            .into_iter()
            .map(|(name, entry)| (TypeRef::new(&name).name().to_string(), entry))
            .collect();
        self
    }

    /// Manifest entry for a type
    pub fn type_entry(&self, type_ref: &TypeRef) -> Option<&TypeEntry> {
        self.types.get(type_ref.name())
    }

    /// Every recorded ancestor of a type, nearest first.
    ///
    /// Parents are visited breadth-first in their declared order. Cycles terminate.
    pub fn ancestors(&self, type_ref: &TypeRef) -> Vec<TypeRef> {
        let mut seen = HashSet::new();
        let mut ancestors = Vec::new();
        let mut queue = VecDeque::from([type_ref.clone()]);

        while let Some(current) = queue.pop_front() {
            let Some(entry) = self.type_entry(&current) else {
                continue;
            };
            for parent in &entry.parents {
                let parent = TypeRef::new(parent);
                if seen.insert(parent.name().to_string()) {
                    ancestors.push(parent.clone());
                    queue.push_back(parent);
                }
            }
        }

        ancestors
    }

    fn method_entry(&self, controller: &str, handler: &str) -> Option<&MethodEntry> {
        self.controllers
            .get(TypeRef::new(controller).name())?
            .methods
            .get(handler)
    }
}

impl RouteRegistry for Manifest {
    fn list_routes(&self) -> Vec<RouteDescriptor> {
        self.routes
            .iter()
            .filter_map(|entry| {
                let Some(action) = entry.action.as_ref().and_then(|a| a.as_str()) else {
                    debug!("Skipping {}: action is not a string", entry.uri);
                    return None;
                };
                let route =
                    RouteDescriptor::from_action(entry.uri.clone(), entry.methods.clone(), action);
                if route.is_none() {
                    debug!("Skipping {}: action '{}' is not Controller@method", entry.uri, action);
                }
                route
            })
            .collect()
    }
}

impl Reflector for Manifest {
    fn parameter_types(&self, controller: &str, handler: &str) -> Option<Vec<TypeRef>> {
        let method = self.method_entry(controller, handler)?;
        Some(method.parameters.iter().map(|p| TypeRef::new(p)).collect())
    }

    fn return_type(&self, controller: &str, handler: &str) -> Option<TypeRef> {
        self.method_entry(controller, handler)?
            .returns
            .as_deref()
            .map(TypeRef::new)
    }

    fn rules(&self, request_type: &TypeRef) -> FieldRuleSet {
        self.type_entry(request_type)
            .map(|entry| {
                entry
                    .rules
                    .iter()
                    .map(|(field, spec)| (field.clone(), spec.tokens()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
