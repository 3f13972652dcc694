//! Compiles validation rule tokens into OpenAPI schema fragments.
//!
//! Each field of a request type carries an ordered list of rule tokens such as
//! `required`, `integer` or `max:255`. [`compile`] turns one field's tokens into a
//! [`SchemaNode`] and a required flag; [`compile_object`] folds that over a whole
//! [`FieldRuleSet`] to produce the request body schema.
//!
//! The base type is picked by a fixed priority (`integer`, `numeric`, `boolean`, `array`,
//! falling back to `string`), not by the order the tokens appear in.

use crate::schema::{SchemaKind, SchemaNode};
use indexmap::IndexMap;
use log::debug;

/// Mapping from field name to its rule tokens, in declaration order
pub type FieldRuleSet = IndexMap<String, Vec<RuleToken>>;

/// One validation directive applied to a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleToken {
    /// A bare keyword, e.g. `required`
    Keyword(String),
    /// A keyword with a colon-delimited argument, e.g. `max:255`
    WithArgument { name: String, argument: String },
}

impl RuleToken {
    /// Parse a single token, splitting at the first `:`
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.split_once(':') {
            Some((name, argument)) => RuleToken::WithArgument {
                name: name.to_string(),
                argument: argument.to_string(),
            },
            None => RuleToken::Keyword(raw.to_string()),
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, RuleToken::Keyword(k) if k == keyword)
    }
}

impl std::fmt::Display for RuleToken {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RuleToken::Keyword(k) => write!(f, "{}", k),
            RuleToken::WithArgument { name, argument } => write!(f, "{}:{}", name, argument),
        }
    }
}

/// Parse a pipe-delimited rule string such as `"required|max:50"`
pub fn parse_rule_string(rules: &str) -> Vec<RuleToken> {
    rules
        .split('|')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(RuleToken::parse)
        .collect()
}

/// Result of compiling a single field's rules
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledField {
    pub schema: SchemaNode,
    /// Whether the field carried the `required` rule
    pub required: bool,
    /// Constraints that were dropped because their argument was malformed
    pub warnings: Vec<String>,
}

/// Compile one field's rule tokens into a schema fragment
pub fn compile(field: &str, rules: &[RuleToken]) -> CompiledField {
    let kind = resolve_kind(rules);
    let mut schema = if kind == SchemaKind::Array {
        SchemaNode::array(SchemaNode::string())
    } else {
        SchemaNode::of_kind(kind)
    };
    let mut required = false;
    let mut warnings = Vec::new();

    for rule in rules {
        match rule {
            RuleToken::Keyword(k) if k == "required" => required = true,
            RuleToken::Keyword(k) if k == "email" => schema.format = Some("email".to_string()),
            RuleToken::WithArgument { name, argument } if name == "max" || name == "min" => {
                let value = match argument.trim().parse::<i64>() {
                    Ok(value) => value,
                    Err(_) => {
                        warnings.push(format!(
                            "field '{}': ignoring rule '{}', argument is not an integer",
                            field, rule
                        ));
                        continue;
                    }
                };
                apply_bound(&mut schema, name == "max", value);
            }
            _ => {}
        }
    }

    CompiledField {
        schema,
        required,
        warnings,
    }
}

/// Compile every field of a rule set into one object schema.
///
/// Returns the schema and any warnings raised while compiling individual fields.
pub fn compile_object(rules: &FieldRuleSet) -> (SchemaNode, Vec<String>) {
    let mut properties = IndexMap::new();
    let mut required = Vec::new();
    let mut warnings = Vec::new();

    for (field, tokens) in rules {
        let compiled = compile(field, tokens);
        debug!("Compiled field '{}' as {:?}", field, compiled.schema.kind);
        if compiled.required {
            required.push(field.clone());
        }
        warnings.extend(compiled.warnings);
        properties.insert(field.clone(), compiled.schema);
    }

    (SchemaNode::object(properties, required), warnings)
}

fn resolve_kind(rules: &[RuleToken]) -> SchemaKind {
    let has = |keyword: &str| rules.iter().any(|rule| rule.is_keyword(keyword));

    if has("integer") {
        SchemaKind::Integer
    } else if has("numeric") {
        SchemaKind::Number
    } else if has("boolean") {
        SchemaKind::Boolean
    } else if has("array") {
        SchemaKind::Array
    } else {
        SchemaKind::String
    }
}

fn apply_bound(schema: &mut SchemaNode, is_max: bool, value: i64) {
    match (schema.kind, is_max) {
        (SchemaKind::String, true) => schema.max_length = Some(value),
        (SchemaKind::String, false) => schema.min_length = Some(value),
        (SchemaKind::Integer | SchemaKind::Number, true) => schema.maximum = Some(value),
        (SchemaKind::Integer | SchemaKind::Number, false) => schema.minimum = Some(value),
        _ => {}
    }
}
