use crate::error::{Error, Result};
use crate::registry::{HttpMethod, RouteDescriptor};
use crate::rule_compiler::{compile_object, FieldRuleSet};
use crate::schema::SchemaNode;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// OpenAPI version written into every document
pub const OPENAPI_VERSION: &str = "3.0.3";
/// Version of the described API
pub const API_VERSION: &str = "1.0.0";
/// Fixed description of generated documents
pub const API_DESCRIPTION: &str = "Generated from Laravel routes and FormRequest";

const JSON_MEDIA_TYPE: &str = "application/json";

/// Paths collection (URL path -> PathItem), in insertion order
pub type PathMap = IndexMap<String, PathItem>;

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

/// OpenAPI PathItem object - represents all operations for a single path.
///
/// HEAD has no slot: it mirrors GET and is never documented.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// DELETE operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// OPTIONS operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
}

impl PathItem {
    /// Mutable slot for a method, or `None` for methods that are never documented
    fn slot_mut(&mut self, method: HttpMethod) -> Option<&mut Option<Operation>> {
        match method {
            HttpMethod::Get => Some(&mut self.get),
            HttpMethod::Post => Some(&mut self.post),
            HttpMethod::Put => Some(&mut self.put),
            HttpMethod::Delete => Some(&mut self.delete),
            HttpMethod::Patch => Some(&mut self.patch),
            HttpMethod::Options => Some(&mut self.options),
            HttpMethod::Head => None,
        }
    }

    /// The operation registered for `method`, if any
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => None,
        }
    }

    /// Methods that have an operation, in document order
    pub fn methods(&self) -> Vec<HttpMethod> {
        [
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Delete,
            HttpMethod::Patch,
            HttpMethod::Options,
        ]
        .into_iter()
        .filter(|method| self.operation(*method).is_some())
        .collect()
    }

    fn into_operations(self) -> Vec<(HttpMethod, Operation)> {
        [
            (HttpMethod::Get, self.get),
            (HttpMethod::Post, self.post),
            (HttpMethod::Put, self.put),
            (HttpMethod::Delete, self.delete),
            (HttpMethod::Patch, self.patch),
            (HttpMethod::Options, self.options),
        ]
        .into_iter()
        .filter_map(|(method, operation)| operation.map(|op| (method, op)))
        .collect()
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation summary
    pub summary: String,
    /// Request body
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses, keyed by status code
    pub responses: IndexMap<String, Response>,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Whether the request body is required
    pub required: bool,
    /// Content types and their schemas
    pub content: IndexMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type
    pub schema: SchemaNode,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
    /// Response content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Shared schema definitions; always present, currently never populated
    pub schemas: IndexMap<String, SchemaNode>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    /// Servers the API is reachable at
    pub servers: Vec<Server>,
    /// API paths
    pub paths: PathMap,
    /// Components (schemas, etc.)
    pub components: Components,
}

fn json_content(schema: SchemaNode) -> IndexMap<String, MediaType> {
    let mut content = IndexMap::new();
    content.insert(JSON_MEDIA_TYPE.to_string(), MediaType { schema });
    content
}

/// Builds the operations of a single route
pub struct OperationBuilder;

impl OperationBuilder {
    /// Build the path map entry for one route.
    ///
    /// Every method except HEAD gets an operation with the compiled request body schema.
    /// The `200` response carries `response_schema` as its JSON body when one is given,
    /// and no body otherwise.
    pub fn build(
        route: &RouteDescriptor,
        rules: &FieldRuleSet,
        response_schema: Option<&SchemaNode>,
    ) -> PathMap {
        let openapi_path = Self::convert_path_format(&route.uri);
        debug!("Building operations for {} ({:?})", openapi_path, route.methods);

        let (request_schema, warnings) = compile_object(rules);
        for warning in &warnings {
            warn!("{} [{}@{}]: {}", openapi_path, route.controller, route.handler, warning);
        }

        let mut path_item = PathItem::default();
        for raw_method in &route.methods {
            let method: HttpMethod = match raw_method.parse() {
                Ok(method) => method,
                Err(e) => {
                    warn!("{}: skipping method: {}", openapi_path, e);
                    continue;
                }
            };
            let Some(slot) = path_item.slot_mut(method) else {
                continue;
            };
            if slot.is_some() {
                continue;
            }

            let response = Response {
                description: "Success response".to_string(),
                content: response_schema.cloned().map(json_content),
            };
            let mut responses = IndexMap::new();
            responses.insert("200".to_string(), response);

            *slot = Some(Operation {
                summary: format!("Auto generated for {}", route.uri),
                request_body: Some(RequestBody {
                    required: true,
                    content: json_content(request_schema.clone()),
                }),
                responses,
            });
        }

        let mut paths = PathMap::new();
        paths.insert(openapi_path, path_item);
        paths
    }

    /// Convert a registered URI to an OpenAPI path key.
    ///
    /// Prefixes a single `/` and rewrites optional parameters (`{id?}`) to `{id}`.
    fn convert_path_format(uri: &str) -> String {
        let parts: Vec<String> = uri
            .trim_start_matches('/')
            .split('/')
            .map(|part| match part.strip_suffix("?}") {
                Some(name) if part.starts_with('{') => format!("{}}}", name),
                _ => part.to_string(),
            })
            .collect();

        format!("/{}", parts.join("/"))
    }
}

/// Accumulates per-route path maps into the document's path map
#[derive(Debug, Default)]
pub struct PathAggregator {
    paths: PathMap,
}

impl PathAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one route's path map in.
    ///
    /// Fails with [`Error::DuplicateOperation`] if any URI + method pair is already present,
    /// in which case nothing from `next` is added.
    pub fn add(&mut self, next: PathMap) -> Result<()> {
        for (uri, item) in &next {
            let Some(existing) = self.paths.get(uri) else {
                continue;
            };
            if let Some(method) = item
                .methods()
                .into_iter()
                .find(|method| existing.operation(*method).is_some())
            {
                return Err(Error::DuplicateOperation {
                    uri: uri.clone(),
                    method: method.as_lower().to_string(),
                });
            }
        }

        for (uri, item) in next {
            let target = self.paths.entry(uri).or_default();
            for (method, operation) in item.into_operations() {
                if let Some(slot) = target.slot_mut(method) {
                    *slot = Some(operation);
                }
            }
        }
        Ok(())
    }

    pub fn paths(&self) -> &PathMap {
        &self.paths
    }

    pub fn into_paths(self) -> PathMap {
        self.paths
    }
}

/// Merge `next` into `accumulated`, failing on a repeated URI + method pair
pub fn merge(accumulated: PathMap, next: PathMap) -> Result<PathMap> {
    let mut aggregator = PathAggregator { paths: accumulated };
    aggregator.add(next)?;
    Ok(aggregator.into_paths())
}

/// Wrap a path map in the top-level OpenAPI envelope
pub fn assemble(paths: PathMap, title: &str, server_url: &str) -> OpenApiDocument {
    debug!("Assembling OpenAPI document with {} paths", paths.len());

    OpenApiDocument {
        openapi: OPENAPI_VERSION.to_string(),
        info: Info {
            title: title.to_string(),
            version: API_VERSION.to_string(),
            description: Some(API_DESCRIPTION.to_string()),
        },
        servers: vec![Server {
            url: server_url.to_string(),
        }],
        paths,
        components: Components::default(),
    }
}
