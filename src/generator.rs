//! The generation run: routes in, one OpenAPI document out.
//!
//! For each route the generator resolves the validation request type of the handler,
//! compiles its rules, infers the response schema from the handler's return type, builds
//! the route's operations and folds them into the path map. Routes that cannot be
//! documented are skipped; a URI + method pair seen twice aborts the whole run.

use crate::error::Result;
use crate::openapi_builder::{assemble, OpenApiDocument, OperationBuilder, PathAggregator};
use crate::registry::{Reflector, RouteDescriptor, RouteRegistry, TypeClassifier, TypeRef};
use crate::response_inferrer::ResponseInferrer;
use log::{debug, info};

/// Default API title when none is configured
pub const DEFAULT_TITLE: &str = "Laravel API";
/// Default server URL when none is configured
pub const DEFAULT_SERVER_URL: &str = "http://localhost";
/// Only controllers under this namespace are documented by default
pub const DEFAULT_CONTROLLER_NAMESPACE: &str = "App\\Http\\Controllers";

/// Resolved configuration of a generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// `info.title` of the document
    pub title: String,
    /// URL of the single server entry
    pub server_url: String,
    /// Controller namespace prefix a route must match to be documented
    pub controller_namespace: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            controller_namespace: DEFAULT_CONTROLLER_NAMESPACE.to_string(),
        }
    }
}

/// Counters describing one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Routes returned by the registry
    pub routes_seen: usize,
    /// Routes that produced operations
    pub routes_documented: usize,
    /// Routes filtered out
    pub routes_skipped: usize,
    /// Operations in the final document
    pub operations: usize,
}

/// Output of a successful run
#[derive(Debug, Clone)]
pub struct Generation {
    pub document: OpenApiDocument,
    pub summary: GenerationSummary,
}

/// Drives a generation run over the application's collaborators
pub struct DocumentGenerator<'a> {
    registry: &'a dyn RouteRegistry,
    reflector: &'a dyn Reflector,
    classifier: &'a dyn TypeClassifier,
    inferrer: &'a dyn ResponseInferrer,
}

impl<'a> DocumentGenerator<'a> {
    pub fn new(
        registry: &'a dyn RouteRegistry,
        reflector: &'a dyn Reflector,
        classifier: &'a dyn TypeClassifier,
        inferrer: &'a dyn ResponseInferrer,
    ) -> Self {
        Self {
            registry,
            reflector,
            classifier,
            inferrer,
        }
    }

    /// The first declared non-builtin parameter type that is a validation request.
    ///
    /// Returns `None` if the handler cannot be introspected or has no such parameter.
    pub fn resolve_request_type(&self, controller: &str, handler: &str) -> Option<TypeRef> {
        self.reflector
            .parameter_types(controller, handler)?
            .into_iter()
            .find(|ty| !ty.is_builtin() && self.classifier.classify(ty).validation_request)
    }

    /// Run the generation over every route of the registry.
    ///
    /// Fails with [`crate::error::Error::DuplicateOperation`] if two routes produce the same
    /// URI + method pair; no document is returned in that case.
    pub fn generate(&self, config: &GeneratorConfig) -> Result<Generation> {
        let routes = self.registry.list_routes();
        info!("Processing {} routes", routes.len());

        let mut summary = GenerationSummary {
            routes_seen: routes.len(),
            ..GenerationSummary::default()
        };
        let mut aggregator = PathAggregator::new();

        for route in &routes {
            let Some(request_type) = self.eligible_request_type(route, config) else {
                summary.routes_skipped += 1;
                continue;
            };

            let rules = self.reflector.rules(&request_type);
            let return_type = self.reflector.return_type(&route.controller, &route.handler);
            let response_schema = self.inferrer.infer(return_type.as_ref());

            let paths = OperationBuilder::build(route, &rules, Some(&response_schema));
            if paths.values().all(|item| item.methods().is_empty()) {
                debug!("Skipping {}: no documentable methods in {:?}", route.uri, route.methods);
                summary.routes_skipped += 1;
                continue;
            }
            aggregator.add(paths)?;
            summary.routes_documented += 1;
        }

        summary.operations = aggregator
            .paths()
            .values()
            .map(|item| item.methods().len())
            .sum();

        let document = assemble(aggregator.into_paths(), &config.title, &config.server_url);
        Ok(Generation { document, summary })
    }

    fn eligible_request_type(
        &self,
        route: &RouteDescriptor,
        config: &GeneratorConfig,
    ) -> Option<TypeRef> {
        if !route.controller.starts_with(&config.controller_namespace) {
            debug!(
                "Skipping {}: {} is outside {}",
                route.uri, route.controller, config.controller_namespace
            );
            return None;
        }

        let request_type = self.resolve_request_type(&route.controller, &route.handler);
        if request_type.is_none() {
            debug!(
                "Skipping {}: {}@{} has no validation request parameter",
                route.uri, route.controller, route.handler
            );
        }
        request_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::manifest::Manifest;
    use crate::registry::SourceReader;
    use crate::response_inferrer::SourceKeyInferrer;
    use crate::type_classifier::HierarchyClassifier;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct InlineSources;

    impl SourceReader for InlineSources {
        fn read_method_source(&self, type_ref: &TypeRef, _method_name: &str) -> Option<String> {
            (type_ref.short_name() == "UserResource")
                .then(|| "return ['id' => $this->id, 'email' => $this->email];".to_string())
        }
    }

    const MANIFEST_YAML: &str = r#"
routes:
  - uri: users
    methods: [GET, HEAD, POST]
    action: App\Http\Controllers\UserController@store
  - uri: users/{user}
    methods: [PUT, PATCH]
    action: App\Http\Controllers\UserController@update
  - uri: ping
    methods: [GET, HEAD]
    action: App\Http\Controllers\UserController@ping
  - uri: admin
    methods: [POST]
    action: Vendor\Admin\Controller@store
  - uri: ghost
    methods: [POST]
    action: App\Http\Controllers\GhostController@store
controllers:
  App\Http\Controllers\UserController:
    methods:
      store:
        parameters: [App\Http\Requests\StoreUserRequest]
      update:
        parameters: [int, App\Http\Requests\StoreUserRequest]
        returns: App\Http\Resources\UserResource
      ping:
        parameters: [Illuminate\Http\Request]
  Vendor\Admin\Controller:
    methods:
      store:
        parameters: [App\Http\Requests\StoreUserRequest]
types:
  App\Http\Requests\StoreUserRequest:
    parents: [Illuminate\Foundation\Http\FormRequest]
    rules:
      name: required|max:50
      age: integer|min:0
  App\Http\Resources\UserResource:
    parents: [Illuminate\Http\Resources\Json\JsonResource]
"#;

    fn run(manifest: &Manifest) -> Result<Generation> {
        let classifier = HierarchyClassifier::new(manifest);
        let sources = InlineSources;
        let inferrer = SourceKeyInferrer::new(&classifier, &sources);
        let generator = DocumentGenerator::new(manifest, manifest, &classifier, &inferrer);
        generator.generate(&GeneratorConfig::default())
    }

    #[test]
    fn test_generate_documents_eligible_routes() {
        let manifest = Manifest::from_yaml_str(MANIFEST_YAML).unwrap();
        let generation = run(&manifest).unwrap();

        assert_eq!(
            generation.summary,
            GenerationSummary {
                routes_seen: 5,
                routes_documented: 2,
                routes_skipped: 3,
                operations: 4,
            }
        );

        let paths: Vec<&String> = generation.document.paths.keys().collect();
        assert_eq!(paths, vec!["/users", "/users/{user}"]);
    }

    #[test]
    fn test_generate_response_schemas() {
        let manifest = Manifest::from_yaml_str(MANIFEST_YAML).unwrap();
        let document = run(&manifest).unwrap().document;
        let value = serde_json::to_value(&document).unwrap();

        assert_eq!(
            value["paths"]["/users"]["get"]["responses"]["200"]["content"]["application/json"]
                ["schema"],
            json!({"type": "object", "properties": {"message": {"type": "string"}}})
        );
        assert_eq!(
            value["paths"]["/users/{user}"]["patch"]["responses"]["200"]["content"]
                ["application/json"]["schema"],
            json!({
                "type": "object",
                "properties": {"id": {"type": "string"}, "email": {"type": "string"}}
            })
        );
    }

    #[test]
    fn test_resolve_request_type_skips_builtins() {
        let manifest = Manifest::from_yaml_str(MANIFEST_YAML).unwrap();
        let classifier = HierarchyClassifier::new(&manifest);
        let inferrer = SourceKeyInferrer::new(&classifier, &InlineSources);
        let generator = DocumentGenerator::new(&manifest, &manifest, &classifier, &inferrer);

        let controller = "App\\Http\\Controllers\\UserController";
        assert_eq!(
            generator.resolve_request_type(controller, "update"),
            Some(TypeRef::new("App\\Http\\Requests\\StoreUserRequest"))
        );
        assert_eq!(generator.resolve_request_type(controller, "ping"), None);
        assert_eq!(generator.resolve_request_type(controller, "missing"), None);
    }

    #[test]
    fn test_generate_fails_on_duplicate_operation() {
        let yaml = format!(
            "{}\n",
            MANIFEST_YAML.replacen(
                "routes:\n",
                "routes:\n  - uri: /users\n    methods: [POST]\n    action: App\\Http\\Controllers\\UserController@store\n",
                1
            )
        );
        let manifest = Manifest::from_yaml_str(&yaml).unwrap();

        let err = run(&manifest).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateOperation { ref uri, ref method } if uri == "/users" && method == "post"
        ));
    }

    #[test]
    fn test_head_only_route_is_skipped() {
        let yaml = MANIFEST_YAML.replacen(
            "routes:\n",
            "routes:\n  - uri: users/check\n    methods: [HEAD]\n    action: App\\Http\\Controllers\\UserController@store\n",
            1,
        );
        let manifest = Manifest::from_yaml_str(&yaml).unwrap();
        let generation = run(&manifest).unwrap();

        assert!(!generation.document.paths.contains_key("/users/check"));
        assert_eq!(generation.summary.routes_documented, 2);
        assert_eq!(generation.summary.routes_skipped, 4);
    }

    #[test]
    fn test_empty_namespace_documents_all_controllers() {
        let manifest = Manifest::from_yaml_str(MANIFEST_YAML).unwrap();
        let classifier = HierarchyClassifier::new(&manifest);
        let inferrer = SourceKeyInferrer::new(&classifier, &InlineSources);
        let generator = DocumentGenerator::new(&manifest, &manifest, &classifier, &inferrer);

        let config = GeneratorConfig {
            controller_namespace: String::new(),
            ..GeneratorConfig::default()
        };
        let generation = generator.generate(&config).unwrap();

        assert_eq!(generation.summary.routes_documented, 3);
        assert!(generation.document.paths.contains_key("/admin"));
    }
}
