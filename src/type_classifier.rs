use crate::manifest::Manifest;
use crate::registry::{TypeCapabilities, TypeClassifier, TypeRef};
use log::debug;
use std::collections::HashSet;

/// Base class of validation request types
pub const FORM_REQUEST: &str = "Illuminate\\Foundation\\Http\\FormRequest";

/// Types whose subclasses can be turned into a plain key-value representation
pub const STRUCTURED_RESPONSE_BASES: &[&str] = &[
    "Illuminate\\Contracts\\Support\\Arrayable",
    "Illuminate\\Http\\Resources\\Json\\JsonResource",
    "Illuminate\\Database\\Eloquent\\Model",
];

/// Classifies types by walking the parent classes and interfaces recorded in the manifest.
///
/// A type has a capability when one of its ancestors (not the type itself) is a known base.
pub struct HierarchyClassifier<'a> {
    manifest: &'a Manifest,
    validation_bases: HashSet<String>,
    response_bases: HashSet<String>,
}

impl<'a> HierarchyClassifier<'a> {
    /// Create a classifier with the framework's default base types
    pub fn new(manifest: &'a Manifest) -> Self {
        Self {
            manifest,
            validation_bases: HashSet::from([FORM_REQUEST.to_string()]),
            response_bases: STRUCTURED_RESPONSE_BASES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Also treat subclasses of `base` as validation requests
    pub fn with_validation_base(mut self, base: &str) -> Self {
        self.validation_bases
            .insert(TypeRef::new(base).name().to_string());
        self
    }

    /// Also treat subclasses of `base` as structured responses
    pub fn with_response_base(mut self, base: &str) -> Self {
        self.response_bases
            .insert(TypeRef::new(base).name().to_string());
        self
    }

    /// All transitive parents of a type. Cycles in the recorded hierarchy terminate.
    pub fn ancestors(&self, type_ref: &TypeRef) -> HashSet<String> {
        self.manifest
            .ancestors(type_ref)
            .into_iter()
            .map(|ancestor| ancestor.name().to_string())
            .collect()
    }
}

impl TypeClassifier for HierarchyClassifier<'_> {
    fn classify(&self, type_ref: &TypeRef) -> TypeCapabilities {
        if type_ref.is_builtin() {
            return TypeCapabilities::default();
        }

        let ancestors = self.ancestors(type_ref);
        let capabilities = TypeCapabilities {
            validation_request: !ancestors.is_disjoint(&self.validation_bases),
            structured_response: !ancestors.is_disjoint(&self.response_bases),
        };
        debug!("Classified {}: {:?}", type_ref, capabilities);
        capabilities
    }
}
