use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const LISTING_KEYS: [&str; 7] = [
    "title",
    "description",
    "color",
    "department",
    "category",
    "type",
    "subtype",
];

pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse the response as JSON.";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingRecord {
    fields: Map<String, Value>,
}

impl ListingRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn unrecognized_keys(&self) -> Vec<&str> {
        self.keys()
            .filter(|key| !LISTING_KEYS.contains(key))
            .collect()
    }

    pub fn render_lines(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|(key, value)| format!("**{}**: {}", title_case(key), display_value(value)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedListing {
    Parsed(ListingRecord),
    Unparsed { reason: String },
}

impl ParsedListing {
    pub fn record(&self) -> Option<&ListingRecord> {
        match self {
            ParsedListing::Parsed(record) => Some(record),
            ParsedListing::Unparsed { .. } => None,
        }
    }

    pub fn parse_error(&self) -> Option<&str> {
        match self {
            ParsedListing::Parsed(_) => None,
            ParsedListing::Unparsed { reason } => Some(reason.as_str()),
        }
    }

    pub fn render_lines(&self) -> Vec<String> {
        match self {
            ParsedListing::Parsed(record) => record.render_lines(),
            ParsedListing::Unparsed { .. } => vec![PARSE_FAILURE_MESSAGE.to_string()],
        }
    }
}

/// The content must be a bare JSON object. Prose around it, code fences, or a
/// non-object JSON value all yield `Unparsed`.
pub fn parse_listing(content: &str) -> ParsedListing {
    if content.trim().is_empty() {
        return ParsedListing::Unparsed {
            reason: "response content is empty".to_string(),
        };
    }
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(fields)) => ParsedListing::Parsed(ListingRecord { fields }),
        Ok(other) => ParsedListing::Unparsed {
            reason: format!("expected a JSON object, got {}", json_kind(&other)),
        },
        Err(err) => ParsedListing::Unparsed {
            reason: err.to_string(),
        },
    }
}

// `product_type` -> `Product_Type`
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut previous_is_letter = false;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(ch);
            previous_is_letter = false;
        }
    }
    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{parse_listing, title_case, ParsedListing, PARSE_FAILURE_MESSAGE};

    #[test]
    fn renders_only_the_keys_present() {
        let parsed = parse_listing(r#"{"title":"Blue Jacket","color":"Blue"}"#);
        let lines = parsed.render_lines();
        assert_eq!(
            lines,
            vec![
                "**Title**: Blue Jacket".to_string(),
                "**Color**: Blue".to_string()
            ]
        );
        for absent in ["Description", "Department", "Category", "Type", "Subtype"] {
            assert!(
                !lines.iter().any(|line| line.contains(absent)),
                "unexpected {absent} line"
            );
        }
        assert!(parsed.parse_error().is_none());
    }

    #[test]
    fn keeps_model_field_order_and_unknown_keys() {
        let parsed = parse_listing(
            r#"{"subtype":"Midi Dress","title":"Floral Dress","condition":"Very good","color":"Red"}"#,
        );
        let record = parsed.record().cloned().unwrap_or_default();
        assert_eq!(
            record.keys().collect::<Vec<_>>(),
            vec!["subtype", "title", "condition", "color"]
        );
        assert_eq!(record.unrecognized_keys(), vec!["condition"]);
        assert_eq!(record.get_str("title"), Some("Floral Dress"));
        assert_eq!(record.render_lines()[2], "**Condition**: Very good");
    }

    #[test]
    fn non_json_content_is_a_parse_failure() {
        let parsed = parse_listing("not json");
        assert!(parsed.record().is_none());
        assert!(parsed.parse_error().is_some());
        assert_eq!(parsed.render_lines(), vec![PARSE_FAILURE_MESSAGE.to_string()]);
    }

    #[test]
    fn fenced_or_prefixed_output_is_a_parse_failure() {
        for content in [
            "```json\n{\"title\":\"T\"}\n```",
            "Here is the listing: {\"title\":\"T\"}",
        ] {
            assert!(parse_listing(content).parse_error().is_some(), "{content}");
        }
    }

    #[test]
    fn empty_content_is_a_parse_failure() {
        assert_eq!(
            parse_listing(""),
            ParsedListing::Unparsed {
                reason: "response content is empty".to_string()
            }
        );
    }

    #[test]
    fn json_that_is_not_an_object_is_a_parse_failure() {
        let parsed = parse_listing(r#"["title", "T"]"#);
        assert_eq!(
            parsed.parse_error(),
            Some("expected a JSON object, got an array")
        );
    }

    #[test]
    fn non_string_values_render_as_json() {
        let parsed = parse_listing(r#"{"tags":["vintage","wool"],"sold":false,"size":null}"#);
        assert_eq!(
            parsed.render_lines(),
            vec![
                "**Tags**: [\"vintage\",\"wool\"]".to_string(),
                "**Sold**: false".to_string(),
                "**Size**: null".to_string(),
            ]
        );
        assert_eq!(
            parsed.record().and_then(|record| record.get("sold")),
            Some(&json!(false))
        );
    }

    #[test]
    fn title_case_capitalizes_each_word() {
        assert_eq!(title_case("title"), "Title");
        assert_eq!(title_case("SUBTYPE"), "Subtype");
        assert_eq!(title_case("product type"), "Product Type");
        assert_eq!(title_case("product_type"), "Product_Type");
        assert_eq!(title_case("size2fit"), "Size2Fit");
        assert_eq!(title_case(""), "");
    }
}
