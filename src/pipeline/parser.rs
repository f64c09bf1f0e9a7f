//! Completion parsing: free-form model output → [`ClassificationResult`].
//!
//! Two stages, first success wins:
//! 1. the whole completion as a JSON object;
//! 2. the greedy `{ ... }` span (first `{` to last `}`) as a JSON object.
//!
//! If neither yields an object the fallback result is returned. Fields are
//! read independently, so a valid category with no reply keeps the category.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

use super::types::{Category, ClassificationResult};

/// Reply substituted when the model output has no usable `resposta`.
pub const SENTINEL_REPLY: &str = "Not OK";

/// Category substituted when the model output has no usable `categoria`.
pub const FALLBACK_CATEGORY: Category = Category::Improdutivo;

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("static regex compiles"));

/// Result used when nothing in the completion parses.
pub fn fallback() -> ClassificationResult {
    ClassificationResult {
        category: FALLBACK_CATEGORY,
        reply: SENTINEL_REPLY.to_string(),
    }
}

/// Parse a model completion. Never fails.
pub fn parse(completion: &str) -> ClassificationResult {
    match extract_object(completion) {
        Some(object) => read_fields(&object),
        None => {
            warn!(
                raw_response = %completion,
                "Completion is not a JSON object, using fallback classification"
            );
            fallback()
        }
    }
}

fn extract_object(completion: &str) -> Option<Map<String, Value>> {
    let trimmed = completion.trim();
    if let Some(object) = parse_object(trimmed) {
        return Some(object);
    }
    JSON_OBJECT
        .find(trimmed)
        .and_then(|m| parse_object(m.as_str()))
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

fn read_fields(object: &Map<String, Value>) -> ClassificationResult {
    let category = object
        .get("categoria")
        .and_then(Value::as_str)
        .and_then(Category::from_label)
        .unwrap_or(FALLBACK_CATEGORY);

    let reply = object
        .get("resposta")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| SENTINEL_REPLY.to_string());

    ClassificationResult { category, reply }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::prompt::{REPLY_IMPRODUTIVO, REPLY_PRODUTIVO};

    #[test]
    fn parses_exact_object() {
        let raw = format!(r#"{{"categoria": "Produtivo", "resposta": "{REPLY_PRODUTIVO}"}}"#);
        let result = parse(&raw);
        assert_eq!(result.category, Category::Produtivo);
        assert_eq!(result.reply, REPLY_PRODUTIVO);
    }

    #[test]
    fn parses_object_with_surrounding_whitespace() {
        let result = parse("\n  {\"categoria\": \"Improdutivo\", \"resposta\": \"R\"}  \n");
        assert_eq!(result.category, Category::Improdutivo);
        assert_eq!(result.reply, "R");
    }

    #[test]
    fn not_json_falls_back() {
        let result = parse("not json at all");
        assert_eq!(result, fallback());
        assert_eq!(result.category, Category::Improdutivo);
        assert_eq!(result.reply, "Not OK");
    }

    #[test]
    fn extracts_object_from_surrounding_text() {
        let raw = r#"Here is the result: {"categoria": "Produtivo", "resposta": "X"} Thanks!"#;
        let result = parse(raw);
        assert_eq!(result.category, Category::Produtivo);
        assert_eq!(result.reply, "X");
    }

    #[test]
    fn extracts_object_from_markdown_fence() {
        let raw = "```json\n{\"categoria\": \"Improdutivo\", \"resposta\": \"Y\"}\n```";
        let result = parse(raw);
        assert_eq!(result.category, Category::Improdutivo);
        assert_eq!(result.reply, "Y");
    }

    #[test]
    fn multiline_object_is_found() {
        let raw = "Resultado:\n{\n  \"categoria\": \"Produtivo\",\n  \"resposta\": \"Z\"\n}\nfim";
        let result = parse(raw);
        assert_eq!(result.category, Category::Produtivo);
        assert_eq!(result.reply, "Z");
    }

    #[test]
    fn greedy_span_covering_two_objects_falls_back() {
        let raw = r#"{"categoria": "Produtivo"} and {"resposta": "X"}"#;
        assert_eq!(parse(raw), fallback());
    }

    #[test]
    fn broken_json_falls_back() {
        assert_eq!(parse(r#"{"categoria": "Produtivo", "resposta": }"#), fallback());
        assert_eq!(parse("{"), fallback());
        assert_eq!(parse(""), fallback());
    }

    #[test]
    fn non_object_json_falls_back() {
        assert_eq!(parse("42"), fallback());
        assert_eq!(parse(r#""Produtivo""#), fallback());
        assert_eq!(parse(r#"["Produtivo", "X"]"#), fallback());
    }

    #[test]
    fn missing_reply_keeps_category() {
        let result = parse(r#"{"categoria": "Produtivo"}"#);
        assert_eq!(result.category, Category::Produtivo);
        assert_eq!(result.reply, SENTINEL_REPLY);
    }

    #[test]
    fn missing_category_keeps_reply() {
        let result = parse(&format!(r#"{{"resposta": "{REPLY_IMPRODUTIVO}"}}"#));
        assert_eq!(result.category, Category::Improdutivo);
        assert_eq!(result.reply, REPLY_IMPRODUTIVO);
    }

    #[test]
    fn unknown_category_defaults_to_improdutivo() {
        let result = parse(r#"{"categoria": "Urgente", "resposta": "X"}"#);
        assert_eq!(result.category, Category::Improdutivo);
        assert_eq!(result.reply, "X");
    }

    #[test]
    fn non_string_fields_use_defaults() {
        let result = parse(r#"{"categoria": 1, "resposta": null}"#);
        assert_eq!(result, fallback());
    }

    #[test]
    fn empty_object_uses_defaults() {
        assert_eq!(parse("{}"), fallback());
    }
}
