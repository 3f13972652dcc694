use crate::key_extractor::extract_keys;
use crate::registry::{SourceReader, TypeClassifier, TypeRef};
use crate::schema::SchemaNode;
use indexmap::IndexMap;
use log::debug;

/// Name of the method whose literal return value describes a response's shape
pub const OUTPUT_METHOD: &str = "toArray";

/// Infers a response schema from a handler's declared return type
pub trait ResponseInferrer {
    fn infer(&self, declared: Option<&TypeRef>) -> SchemaNode;
}

/// Response inference backed by a text scan of the type's `toArray` method.
///
/// Structured response types get one `string` property per key found in the method's
/// literal return array. Everything else gets the `{ message: string }` envelope.
pub struct SourceKeyInferrer<'a> {
    classifier: &'a dyn TypeClassifier,
    sources: &'a dyn SourceReader,
}

impl<'a> SourceKeyInferrer<'a> {
    pub fn new(classifier: &'a dyn TypeClassifier, sources: &'a dyn SourceReader) -> Self {
        Self {
            classifier,
            sources,
        }
    }
}

impl ResponseInferrer for SourceKeyInferrer<'_> {
    fn infer(&self, declared: Option<&TypeRef>) -> SchemaNode {
        let Some(type_ref) = declared else {
            return SchemaNode::message_envelope();
        };

        if !self.classifier.classify(type_ref).structured_response {
            debug!("Return type {} is not a structured response", type_ref);
            return SchemaNode::message_envelope();
        }

        let keys = match self.sources.read_method_source(type_ref, OUTPUT_METHOD) {
            Some(source) => extract_keys(&source),
            None => {
                debug!("No {} source available for {}", OUTPUT_METHOD, type_ref);
                Vec::new()
            }
        };
        debug!("Inferred {} response keys for {}", keys.len(), type_ref);

        let mut properties = IndexMap::new();
        for key in keys {
            properties.insert(key, SchemaNode::string());
        }
        SchemaNode::object(properties, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeCapabilities;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;

    struct StubClassifier(Vec<&'static str>);

    impl TypeClassifier for StubClassifier {
        fn classify(&self, type_ref: &TypeRef) -> TypeCapabilities {
            TypeCapabilities {
                validation_request: false,
                structured_response: self.0.iter().any(|name| *name == type_ref.name()),
            }
        }
    }

    struct StubSources(HashMap<&'static str, &'static str>);

    impl SourceReader for StubSources {
        fn read_method_source(&self, type_ref: &TypeRef, method_name: &str) -> Option<String> {
            assert_eq!(method_name, OUTPUT_METHOD);
            self.0.get(type_ref.name()).map(|s| s.to_string())
        }
    }

    fn fixtures() -> (StubClassifier, StubSources) {
        let classifier = StubClassifier(vec!["App\\Http\\Resources\\UserResource", "App\\Models\\Post"]);
        let mut sources = HashMap::new();
        sources.insert(
            "App\\Http\\Resources\\UserResource",
            "public function toArray($request) { return ['id' => $this->id, 'name' => $this->name, 'id' => 1]; }",
        );
        (classifier, StubSources(sources))
    }

    #[test]
    fn test_structured_type_uses_extracted_keys() {
        let (classifier, sources) = fixtures();
        let inferrer = SourceKeyInferrer::new(&classifier, &sources);

        let schema = inferrer.infer(Some(&TypeRef::new("App\\Http\\Resources\\UserResource")));
        let value = serde_json::to_value(&schema).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "object",
                "properties": {"id": {"type": "string"}, "name": {"type": "string"}}
            })
        );
    }

    #[test]
    fn test_missing_type_falls_back_to_envelope() {
        let (classifier, sources) = fixtures();
        let inferrer = SourceKeyInferrer::new(&classifier, &sources);

        assert_eq!(inferrer.infer(None), SchemaNode::message_envelope());
    }

    #[test]
    fn test_unclassified_type_falls_back_to_envelope() {
        let (classifier, sources) = fixtures();
        let inferrer = SourceKeyInferrer::new(&classifier, &sources);

        let schema = inferrer.infer(Some(&TypeRef::new("Illuminate\\Http\\JsonResponse")));
        assert_eq!(schema, SchemaNode::message_envelope());
    }

    #[test]
    fn test_structured_type_without_source_has_no_properties() {
        let (classifier, sources) = fixtures();
        let inferrer = SourceKeyInferrer::new(&classifier, &sources);

        let schema = inferrer.infer(Some(&TypeRef::new("App\\Models\\Post")));
        assert_eq!(schema, SchemaNode::object(IndexMap::new(), Vec::new()));
        assert!(schema.required.is_none());
    }
}
