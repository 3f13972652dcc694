//! Interfaces to the host application: routes, reflection, type classification and source text.
//!
//! The generator never talks to the host framework directly. Everything it needs about the
//! application is asked through the traits in this module, so any backing store (an exported
//! route manifest, a live process, a test stub) can supply it.
//!
//! # Example
//!
//! ```no_run
//! use laravel_openapi_router::manifest::Manifest;
//! use laravel_openapi_router::registry::RouteRegistry;
//! use std::path::Path;
//!
//! let manifest = Manifest::load(Path::new("routes.yaml")).unwrap();
//! for route in manifest.list_routes() {
//!     println!("{} -> {}@{}", route.uri, route.controller, route.handler);
//! }
//! ```

use crate::rule_compiler::FieldRuleSet;
use std::fmt;
use std::str::FromStr;

/// Supplies the registered routes of the application.
pub trait RouteRegistry {
    /// Lists every route whose action is a `Controller@method` string.
    ///
    /// Closure routes and other non-string actions are not returned.
    fn list_routes(&self) -> Vec<RouteDescriptor>;
}

/// Answers reflection questions about controllers and request types.
pub trait Reflector {
    /// Declared parameter types of a controller method, in declaration order.
    ///
    /// Returns `None` when the controller or method cannot be introspected.
    fn parameter_types(&self, controller: &str, handler: &str) -> Option<Vec<TypeRef>>;

    /// Declared return type of a controller method, if any.
    fn return_type(&self, controller: &str, handler: &str) -> Option<TypeRef>;

    /// Validation rules declared by a request type.
    fn rules(&self, request_type: &TypeRef) -> FieldRuleSet;
}

/// Reads the source text of a single method of a type.
pub trait SourceReader {
    /// Returns the text of `method_name` on `type_ref`, or `None` if it cannot be read.
    fn read_method_source(&self, type_ref: &TypeRef, method_name: &str) -> Option<String>;
}

/// Classifies types by the capabilities the generator cares about.
pub trait TypeClassifier {
    fn classify(&self, type_ref: &TypeRef) -> TypeCapabilities;
}

/// Capabilities of a type as seen by the generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeCapabilities {
    /// The type describes one endpoint's expected input and carries validation rules
    pub validation_request: bool,
    /// Instances of the type can be converted to a plain key-value representation
    pub structured_response: bool,
}

/// A registered route whose action points at a controller method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// The route URI as registered (e.g., "users/{id}")
    pub uri: String,
    /// HTTP methods accepted by the route, as registered (e.g., "GET", "HEAD")
    pub methods: Vec<String>,
    /// Fully qualified controller class name
    pub controller: String,
    /// Name of the handler method on the controller
    pub handler: String,
}

impl RouteDescriptor {
    /// Create a new RouteDescriptor
    pub fn new(uri: String, methods: Vec<String>, controller: String, handler: String) -> Self {
        Self {
            uri,
            methods,
            controller,
            handler,
        }
    }

    /// Build a descriptor from a `Controller@method` action string.
    ///
    /// Returns `None` unless the action splits into exactly two non-empty parts.
    pub fn from_action(uri: String, methods: Vec<String>, action: &str) -> Option<Self> {
        let parts: Vec<&str> = action.split('@').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            return None;
        }
        let controller = parts[0].trim_start_matches('\\').to_string();
        Some(Self::new(uri, methods, controller, parts[1].to_string()))
    }
}

/// HTTP methods a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
    /// HTTP OPTIONS method
    Options,
    /// HTTP HEAD method
    Head,
}

impl HttpMethod {
    /// Lowercase name, as used for OpenAPI path item keys
    pub fn as_lower(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_lower().to_uppercase())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "OPTIONS" => Ok(HttpMethod::Options),
            "HEAD" => Ok(HttpMethod::Head),
            other => Err(format!("unsupported HTTP method: {}", other)),
        }
    }
}

const BUILTIN_TYPES: &[&str] = &[
    "int", "float", "string", "bool", "array", "iterable", "callable", "object", "mixed",
    "void", "null", "never", "false", "true", "self", "static", "parent",
];

/// Reference to a declared type, by its fully qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef(String);

impl TypeRef {
    /// Create a TypeRef, dropping a leading namespace separator and a nullable marker
    pub fn new(name: &str) -> Self {
        let name = name.trim().trim_start_matches('?').trim_start_matches('\\');
        Self(name.to_string())
    }

    /// Fully qualified name (e.g., "App\Http\Requests\StoreUserRequest")
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Class name without its namespace (e.g., "StoreUserRequest")
    pub fn short_name(&self) -> &str {
        self.0.rsplit('\\').next().unwrap_or(&self.0)
    }

    /// Whether this is a language builtin rather than a class
    pub fn is_builtin(&self) -> bool {
        let lower = self.0.to_ascii_lowercase();
        BUILTIN_TYPES.contains(&lower.as_str())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
