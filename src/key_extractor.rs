//! Best-effort extraction of array keys from a method's literal `return [...]` expression.
//!
//! This is a text scan, not a parser. It finds computed keys, spreads and conditional
//! branches no better than a grep would. Its output only feeds documentation.

use regex::Regex;
use std::sync::LazyLock;

/// Regex for the body of the first `return [ ... ];` expression (multi-line).
static RETURN_ARRAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)return\s*\[(.*)\];").expect("return array regex"));

/// Regex for a quoted key followed by an association arrow.
static ARRAY_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]([^'"]+)['"]\s*=>"#).expect("array key regex"));

/// Extracts the quoted keys of the literal array returned by `source`.
///
/// Keys are returned in source order, duplicates included. Returns an empty list if no
/// `return [...];` expression is present.
pub fn extract_keys(source: &str) -> Vec<String> {
    let Some(captures) = RETURN_ARRAY_RE.captures(source) else {
        return Vec::new();
    };
    let Some(body) = captures.get(1) else {
        return Vec::new();
    };

    ARRAY_KEY_RE
        .captures_iter(body.as_str())
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_return() {
        let keys = extract_keys("return ['id' => 1, 'name' => $x];");
        assert_eq!(keys, vec!["id", "name"]);
    }

    #[test]
    fn test_no_return_array() {
        assert!(extract_keys("return parent::toArray($request);").is_empty());
        assert!(extract_keys("").is_empty());
    }

    #[test]
    fn test_multi_line_method_with_double_quotes() {
        let source = r#"
    public function toArray($request): array
    {
        return [
            "id" => $this->id,
            'email'   => $this->email,
            'created_at' => $this->created_at,
        ];
    }
"#;
        assert_eq!(extract_keys(source), vec!["id", "email", "created_at"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let keys = extract_keys("return ['a' => 1, 'a' => 2];");
        assert_eq!(keys, vec!["a", "a"]);
    }

    #[test]
    fn test_values_without_arrow_are_not_keys() {
        let keys = extract_keys("return ['id' => $this->id, 'tags' => ['x', 'y']];");
        assert_eq!(keys, vec!["id", "tags"]);
    }

    #[test]
    fn test_list_without_keys() {
        assert!(extract_keys("return ['a', 'b'];").is_empty());
    }
}
