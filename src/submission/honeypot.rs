use serde_json::Value;

/// Hidden form field, excluded from layout and tab order. Humans never
/// fill it; bots that populate every input trip it.
pub const TRIPWIRE_FIELD: &str = "website_url";

/// True when the tripwire field carries a non-empty value.
pub fn is_tripped(data: &Value) -> bool {
    match data.get(TRIPWIRE_FIELD) {
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_field_is_clean() {
        assert!(!is_tripped(&json!({ "name": "Jane" })));
    }

    #[test]
    fn empty_or_whitespace_value_is_clean() {
        assert!(!is_tripped(&json!({ TRIPWIRE_FIELD: "" })));
        assert!(!is_tripped(&json!({ TRIPWIRE_FIELD: "   " })));
        assert!(!is_tripped(&json!({ TRIPWIRE_FIELD: null })));
    }

    #[test]
    fn any_value_trips() {
        assert!(is_tripped(&json!({ TRIPWIRE_FIELD: "http://spam.example" })));
        assert!(is_tripped(&json!({ TRIPWIRE_FIELD: 1 })));
        assert!(is_tripped(&json!({ TRIPWIRE_FIELD: true })));
    }
}
