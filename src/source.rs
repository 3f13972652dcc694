//! Locating and reading method source text inside a PHP project.

use crate::manifest::Manifest;
use crate::registry::{SourceReader, TypeRef};
use log::{debug, warn};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static NAMESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*namespace\s+([A-Za-z0-9_\\]+)\s*;").expect("namespace regex")
});

static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:(?:abstract|final|readonly)\s+)*(?:class|trait|interface)\s+([A-Za-z0-9_]+)")
        .expect("class regex")
});

/// Index from fully qualified class name to the file declaring it
#[derive(Debug, Default)]
pub struct ClassIndex {
    classes: HashMap<String, PathBuf>,
}

impl ClassIndex {
    /// Build the index by reading the `namespace` and class declarations of each file.
    ///
    /// Unreadable files are logged and skipped.
    pub fn build(files: &[PathBuf]) -> Self {
        let mut classes = HashMap::new();

        for path in files {
            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Failed to read {}: {}", path.display(), e);
                    continue;
                }
            };

            let namespace = NAMESPACE_RE
                .captures(&content)
                .and_then(|cap| cap.get(1))
                .map(|m| m.as_str().trim_matches('\\').to_string());

            for cap in CLASS_RE.captures_iter(&content) {
                let Some(name) = cap.get(1) else { continue };
                let qualified = match &namespace {
                    Some(ns) => format!("{}\\{}", ns, name.as_str()),
                    None => name.as_str().to_string(),
                };
                classes.entry(qualified).or_insert_with(|| path.clone());
            }
        }

        debug!("Indexed {} classes from {} files", classes.len(), files.len());
        Self { classes }
    }

    pub fn get(&self, type_ref: &TypeRef) -> Option<&Path> {
        self.classes.get(type_ref.name()).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Reads method source from the project tree.
///
/// A type's file comes from its manifest `source` entry (relative to the project root) or,
/// failing that, from the class index. A method the type does not declare itself is looked
/// up in its recorded ancestors, nearest first.
pub struct ProjectSourceReader<'a> {
    root: PathBuf,
    manifest: &'a Manifest,
    class_index: ClassIndex,
}

impl<'a> ProjectSourceReader<'a> {
    pub fn new(root: PathBuf, manifest: &'a Manifest, class_index: ClassIndex) -> Self {
        Self {
            root,
            manifest,
            class_index,
        }
    }

    fn source_file(&self, type_ref: &TypeRef) -> Option<PathBuf> {
        if let Some(source) = self
            .manifest
            .type_entry(type_ref)
            .and_then(|entry| entry.source.as_ref())
        {
            return Some(self.root.join(source));
        }
        self.class_index.get(type_ref).map(Path::to_path_buf)
    }

    /// The method as declared by `type_ref` itself
    fn declared_method(&self, type_ref: &TypeRef, method_name: &str) -> Option<String> {
        let Some(path) = self.source_file(type_ref) else {
            debug!("No source file known for {}", type_ref);
            return None;
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!("Cannot read {} for {}: {}", path.display(), type_ref, e);
                return None;
            }
        };

        extract_method(&content, type_ref.short_name(), method_name)
    }
}

impl SourceReader for ProjectSourceReader<'_> {
    fn read_method_source(&self, type_ref: &TypeRef, method_name: &str) -> Option<String> {
        if let Some(source) = self.declared_method(type_ref, method_name) {
            return Some(source);
        }

        self.manifest
            .ancestors(type_ref)
            .iter()
            .filter(|ancestor| ancestor.name() != type_ref.name())
            .find_map(|ancestor| {
                let source = self.declared_method(ancestor, method_name)?;
                debug!("{}::{} inherited from {}", type_ref, method_name, ancestor);
                Some(source)
            })
    }
}

/// Extract the text of `method_name` from a PHP file.
///
/// The search starts at the declaration of `class_name` when present. The returned text runs
/// from the start of the line declaring the method through its matching closing brace.
/// Abstract and interface methods (no body) yield `None`.
pub fn extract_method(content: &str, class_name: &str, method_name: &str) -> Option<String> {
    let class_re = Regex::new(&format!(
        r"\b(?:class|trait)\s+{}\b",
        regex::escape(class_name)
    ))
    .ok()?;
    let search_from = class_re.find(content).map(|m| m.start()).unwrap_or(0);

    let method_re = Regex::new(&format!(
        r"\bfunction\s+&?\s*{}\s*\(",
        regex::escape(method_name)
    ))
    .ok()?;
    let found = method_re.find(&content[search_from..])?;
    let method_start = search_from + found.start();
    let after_signature = search_from + found.end();

    let line_start = content[..method_start]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);

    let body_offset = content[after_signature..].find(&['{', ';'][..])?;
    let body_start = after_signature + body_offset;
    if content[body_start..].starts_with(';') {
        return None;
    }

    let body_end = matching_brace(&content[body_start..])?;
    Some(content[line_start..body_start + body_end + 1].to_string())
}

/// Byte offset of the brace closing the `{` at the start of `text`.
///
/// Braces inside quoted strings and comments (`//`, `#`, `/* */`) are not counted.
fn matching_brace(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'#' => i = line_end(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'/') => i = line_end(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = bytes[i + 2..]
                    .windows(2)
                    .position(|w| w == b"*/")
                    .map_or(bytes.len(), |end| i + 2 + end + 1);
            }
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}

fn line_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_extractor::extract_keys;
    use tempfile::TempDir;

    const RESOURCE_PHP: &str = r#"<?php

namespace App\Http\Resources;

use Illuminate\Http\Resources\Json\JsonResource;

class UserResource extends JsonResource
{
    public function toArray($request): array
    {
        return [
            'id' => $this->id,
            'label' => "{$this->name}}",
        ];
    }

    public function with($request)
    {
        return ['meta' => []];
    }
}
"#;

    #[test]
    fn test_extract_method_spans_whole_body() {
        let method = extract_method(RESOURCE_PHP, "UserResource", "toArray").unwrap();

        assert!(method.starts_with("    public function toArray"));
        assert!(method.ends_with("    }"));
        assert!(method.contains("'label'"));
        assert!(!method.contains("meta"));
    }

    #[test]
    fn test_extract_method_missing() {
        assert!(extract_method(RESOURCE_PHP, "UserResource", "toJson").is_none());
    }

    #[test]
    fn test_extract_method_picks_requested_class() {
        let content = r#"<?php
class First { public function toArray() { return ['a' => 1]; } }
class Second { public function toArray() { return ['b' => 2]; } }
"#;
        let method = extract_method(content, "Second", "toArray").unwrap();
        assert!(method.contains("'b'"));
        assert!(!method.contains("'a'"));
    }

    #[test]
    fn test_extract_abstract_method_has_no_body() {
        let content = "<?php\ninterface Shape { public function toArray(): array; }\n";
        assert!(extract_method(content, "Shape", "toArray").is_none());
    }

    #[test]
    fn test_matching_brace_ignores_braces_in_strings() {
        assert_eq!(matching_brace("{ '}' }"), Some(6));
        assert_eq!(matching_brace(r#"{ "\"}" }"#), Some(8));
        assert_eq!(matching_brace("{ {"), None);
    }

    #[test]
    fn test_matching_brace_skips_comments() {
        assert_eq!(matching_brace("{ // it's }\n}"), Some(11));
        assert_eq!(matching_brace("{ # don't }\n}"), Some(12));
        assert_eq!(matching_brace("{ /* '} */ }"), Some(11));
        assert_eq!(matching_brace("{ /* open"), None);
    }

    #[test]
    fn test_extract_method_with_apostrophe_in_comment() {
        let content = r#"<?php
class UserResource extends JsonResource
{
    public function toArray($request): array
    {
        // the user's public fields
        return [
            'id' => $this->id,
            'name' => $this->name, # name isn't localized
        ];
    }
}
"#;
        let method = extract_method(content, "UserResource", "toArray").unwrap();
        assert!(method.ends_with("    }"));
        assert_eq!(extract_keys(&method), vec!["id", "name"]);
    }

    #[test]
    fn test_reader_finds_inherited_method() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let base = root.join("BaseResource.php");
        let user = root.join("UserResource.php");
        fs::write(
            &base,
            "<?php\nnamespace App\\Http\\Resources;\n\nclass BaseResource extends JsonResource\n{\n    public function toArray($request)\n    {\n        return ['id' => $this->id];\n    }\n}\n",
        )
        .unwrap();
        fs::write(
            &user,
            "<?php\nnamespace App\\Http\\Resources;\n\nclass UserResource extends BaseResource {}\n",
        )
        .unwrap();

        let manifest = Manifest::from_yaml_str(
            "types:\n  App\\Http\\Resources\\UserResource:\n    parents: [App\\Http\\Resources\\BaseResource]\n",
        )
        .unwrap();
        let reader =
            ProjectSourceReader::new(root.to_path_buf(), &manifest, ClassIndex::build(&[base, user]));

        let source = reader
            .read_method_source(&TypeRef::new("App\\Http\\Resources\\UserResource"), "toArray")
            .unwrap();
        assert!(source.contains("'id' => $this->id"));
    }

    #[test]
    fn test_class_index_and_reader() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("app/Http/Resources")).unwrap();
        let resource = root.join("app/Http/Resources/UserResource.php");
        fs::write(&resource, RESOURCE_PHP).unwrap();

        let index = ClassIndex::build(&[resource.clone(), root.join("missing.php")]);
        assert_eq!(index.len(), 1);
        let type_ref = TypeRef::new("App\\Http\\Resources\\UserResource");
        assert_eq!(index.get(&type_ref), Some(resource.as_path()));

        let manifest = Manifest::default();
        let reader = ProjectSourceReader::new(root.to_path_buf(), &manifest, index);
        let source = reader.read_method_source(&type_ref, "toArray").unwrap();
        assert!(source.contains("'id' => $this->id"));

        assert!(reader
            .read_method_source(&TypeRef::new("App\\Models\\Ghost"), "toArray")
            .is_none());
    }

    #[test]
    fn test_reader_prefers_manifest_source() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("Custom.php"), RESOURCE_PHP).unwrap();

        let manifest = Manifest::from_yaml_str(
            "types:\n  App\\Http\\Resources\\UserResource:\n    source: Custom.php\n",
        )
        .unwrap();
        let reader = ProjectSourceReader::new(root.to_path_buf(), &manifest, ClassIndex::default());

        let type_ref = TypeRef::new("App\\Http\\Resources\\UserResource");
        assert!(reader.read_method_source(&type_ref, "toArray").is_some());
    }

    #[test]
    fn test_reader_missing_file_degrades_to_none() {
        let manifest = Manifest::from_yaml_str(
            "types:\n  App\\Models\\User:\n    source: app/Models/User.php\n",
        )
        .unwrap();
        let reader = ProjectSourceReader::new(
            PathBuf::from("/nonexistent/project"),
            &manifest,
            ClassIndex::default(),
        );

        assert!(reader
            .read_method_source(&TypeRef::new("App\\Models\\User"), "toArray")
            .is_none());
    }
}
