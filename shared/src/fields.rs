//! Field normalizer
//!
//! Profile forms send counts like `"5 days"`, `"four_meals"` or plain numbers,
//! and list fields either as a single string or as an array. These helpers
//! coerce such values without ever failing: anything unusable resolves to the
//! caller's fallback.

use regex_lite::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Spelled-out numbers, checked in this order as case-insensitive substrings
const WORD_NUMBERS: [(&str, i64); 10] = [
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
];

fn digit_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("digit pattern is valid"))
}

fn decimal_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("decimal pattern is valid"))
}

/// Coerce a loosely-typed count into an integer
///
/// - numbers pass through, fractions truncate toward zero
/// - strings: the first run of digits, else the first spelled-out number
///   found as a substring (`"none"` contains `"one"` and yields 1), else the
///   whole trimmed string parsed as an integer
/// - anything else yields `fallback`
pub fn extract_integer(value: &Value, fallback: Option<i64>) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .or(fallback),
        Value::String(text) => integer_from_text(text).or(fallback),
        _ => fallback,
    }
}

fn integer_from_text(text: &str) -> Option<i64> {
    if let Some(found) = digit_run().find(text) {
        if let Ok(parsed) = found.as_str().parse::<i64>() {
            return Some(parsed);
        }
    }

    let lowered = text.to_lowercase();
    if let Some((_, number)) = WORD_NUMBERS.iter().find(|(word, _)| lowered.contains(word)) {
        return Some(*number);
    }

    text.trim().parse::<i64>().ok()
}

/// Coerce a loosely-typed measurement into a float
///
/// Numbers pass through; strings use their first decimal literal, so
/// `"72.5 kg"` becomes 72.5. Non-finite results and other JSON types are
/// `None`.
pub fn extract_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => decimal_run()
            .find(text)
            .and_then(|found| found.as_str().parse::<f64>().ok()),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

/// Flatten string-or-array fields into one trimmed, non-empty list
///
/// Non-string array elements are dropped.
pub fn collect_entries<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut entries = Vec::new();
    for value in values {
        match value {
            Value::String(text) => push_trimmed(&mut entries, text),
            Value::Array(items) => {
                for item in items {
                    if let Value::String(text) = item {
                        push_trimmed(&mut entries, text);
                    }
                }
            }
            _ => {}
        }
    }
    entries
}

/// Keys whose value names an entry in a generated object item
const LABEL_KEYS: [&str; 5] = ["item", "name", "meal", "food", "exercise"];

/// Readable list entries from a generated value
///
/// Unlike `collect_entries`, nothing usable is dropped: numbers become text
/// and objects such as `{"item": "oats", "calories": 300}` become
/// `"oats (calories: 300)"`. Null, booleans and blank strings yield nothing.
pub fn describe_entries(value: &Value) -> Vec<String> {
    let mut entries = Vec::new();
    match value {
        Value::Array(items) => {
            for item in items {
                if let Some(text) = describe_item(item) {
                    push_trimmed(&mut entries, &text);
                }
            }
        }
        other => {
            if let Some(text) = describe_item(other) {
                push_trimmed(&mut entries, &text);
            }
        }
    }
    entries
}

fn describe_item(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Object(fields) => {
            let label = LABEL_KEYS
                .iter()
                .find_map(|key| fields.get(*key).and_then(Value::as_str));

            let mut details: Vec<String> = fields
                .iter()
                .filter(|(key, value)| {
                    !(label.is_some() && LABEL_KEYS.contains(&key.as_str()) && value.is_string())
                })
                .filter_map(|(key, value)| describe_item(value).map(|text| format!("{}: {}", key, text)))
                .collect();
            details.sort();

            match (label, details.is_empty()) {
                (Some(label), true) => Some(label.to_string()),
                (Some(label), false) => Some(format!("{} ({})", label, details.join(", "))),
                (None, false) => Some(details.join(", ")),
                (None, true) => None,
            }
        }
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(describe_item).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Null | Value::Bool(_) => None,
    }
}

fn push_trimmed(entries: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        entries.push(trimmed.to_string());
    }
}

/// Trimmed non-empty string, or `None`
pub fn non_empty_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("5 days"), Some(5))]
    #[case(json!("4 meals (main + snacks)"), Some(4))]
    #[case(json!("four_meals"), Some(4))]
    #[case(json!("THREE"), Some(3))]
    #[case(json!(6), Some(6))]
    #[case(json!(4.9), Some(4))]
    #[case(json!(-2.7), Some(-2))]
    #[case(json!("lots"), Some(3))]
    #[case(json!(null), Some(3))]
    #[case(json!(true), Some(3))]
    #[case(json!([1, 2]), Some(3))]
    fn test_extract_integer(#[case] value: Value, #[case] expected: Option<i64>) {
        assert_eq!(extract_integer(&value, Some(3)), expected);
    }

    #[test]
    fn test_word_table_substring_quirk() {
        // "none" contains "one"
        assert_eq!(extract_integer(&json!("none"), Some(0)), Some(1));
        // "seventeen" hits "seven" before "ten"
        assert_eq!(extract_integer(&json!("seventeen"), None), Some(7));
    }

    #[test]
    fn test_extract_integer_without_fallback() {
        assert_eq!(extract_integer(&json!("n/a"), None), None);
        assert_eq!(extract_integer(&json!(""), None), None);
    }

    #[test]
    fn test_extract_number() {
        assert_eq!(extract_number(&json!("72.5 kg")), Some(72.5));
        assert_eq!(extract_number(&json!(180)), Some(180.0));
        assert_eq!(extract_number(&json!("tall")), None);
        assert_eq!(extract_number(&json!(null)), None);
    }

    #[test]
    fn test_collect_entries() {
        let primary = json!(["peanuts ", "", 5, "shellfish"]);
        let secondary = json!("  dairy ");
        let blank = json!("   ");
        let missing = Value::Null;

        let entries = collect_entries([&primary, &secondary, &blank, &missing]);
        assert_eq!(entries, vec!["peanuts", "shellfish", "dairy"]);
    }

    #[rstest]
    #[case(json!(["oats", " ", "eggs"]), vec!["oats", "eggs"])]
    #[case(json!("apple"), vec!["apple"])]
    #[case(json!([{"item": "oats", "calories": 300}]), vec!["oats (calories: 300)"])]
    #[case(json!([{"name": "Squats"}, {"sets": 3, "reps": 12}]), vec!["Squats", "reps: 12, sets: 3"])]
    #[case(json!([2, true, null]), vec!["2"])]
    #[case(json!(null), Vec::<&str>::new())]
    fn test_describe_entries(#[case] value: Value, #[case] expected: Vec<&str>) {
        assert_eq!(describe_entries(&value), expected);
    }

    #[test]
    fn test_non_empty_text() {
        assert_eq!(non_empty_text(Some("  Ada ")), Some("Ada".to_string()));
        assert_eq!(non_empty_text(Some("   ")), None);
        assert_eq!(non_empty_text(None), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: never panics on arbitrary text
        #[test]
        fn prop_extract_integer_total(text in ".*") {
            let _ = extract_integer(&Value::String(text), Some(0));
        }

        /// Property: a leading digit run wins over everything else
        #[test]
        fn prop_digit_run_wins(n in 0i64..100_000, suffix in "[a-z ]{0,12}") {
            let value = Value::String(format!("{}{}", n, suffix));
            prop_assert_eq!(extract_integer(&value, None), Some(n));
        }
    }
}
