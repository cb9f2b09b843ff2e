//! Heuristic success classification for heterogeneous check-in replies.
//!
//! Target services disagree on which field carries the verdict (`status`,
//! `success`, `code`, or a free-text message), so classification walks an
//! ordered rule list: structured fields first, keyword scan of the message
//! field next, full-text scan of the raw body last. First match wins.

pub mod rules;

pub use rules::RuleSet;

use serde_json::Value;

/// Classify a reply using the stock rule set. Pure and total: malformed or
/// absent input is never success.
pub fn classify(structured: Option<&Value>, raw: &str) -> bool {
    RuleSet::default().classify(structured, raw)
}

/// Case-insensitive field lookup on a JSON object.
fn field<'a>(map: &'a serde_json::Map<String, Value>, name: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v)
}

/// True when the value equals any of the listed numbers or strings,
/// tolerating numeric/string type drift (`0` vs `"0"`).
fn value_in(v: &Value, numbers: &[i64], strings: &[&str]) -> bool {
    match v {
        Value::Number(n) => n.as_i64().is_some_and(|n| numbers.contains(&n)),
        Value::String(s) => strings.iter().any(|t| s.eq_ignore_ascii_case(t)),
        _ => false,
    }
}

/// Truthy coding used by the `success` field: true, "true", 1, "1".
fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => s == "true" || s == "1",
        _ => false,
    }
}

/// Extract the human-readable message field (`msg` or `message`), if any.
pub fn message_of(structured: Option<&Value>) -> Option<&str> {
    let map = structured?.as_object()?;
    ["msg", "message"]
        .into_iter()
        .find_map(|name| field(map, name).and_then(Value::as_str))
}

impl RuleSet {
    /// Ordered heuristics over a loosely-typed reply. Structured fields are
    /// checked before the raw body to avoid false positives from incidental
    /// keyword hits in unrelated text.
    pub fn classify(&self, structured: Option<&Value>, raw: &str) -> bool {
        if let Some(map) = structured.and_then(Value::as_object) {
            if let Some(v) = field(map, "status") {
                if value_in(v, &[1, 200], &["1", "200", "success"]) {
                    return true;
                }
            }
            if let Some(v) = field(map, "success") {
                if truthy(v) {
                    return true;
                }
            }
            if let Some(v) = field(map, "code") {
                if value_in(v, &[0, 200], &["0", "200"]) {
                    return true;
                }
            }
            if let Some(msg) = message_of(structured) {
                if self.text_reads_success(msg) {
                    return true;
                }
            }
        }
        self.text_reads_success(raw)
    }

    /// Keyword scan with failure veto: a success keyword counts only when no
    /// failure keyword appears in the same text.
    fn text_reads_success(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.success_keywords.iter().any(|k| text.contains(k.as_str()))
            && !self.failure_keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structured_status_dominates_text() {
        let v = json!({"status": 1, "msg": "something failed badly"});
        assert!(classify(Some(&v), "error error error"));
    }

    #[test]
    fn status_accepts_string_and_numeric_codings() {
        for v in [json!({"status": "1"}), json!({"status": 200}), json!({"status": "success"})] {
            assert!(classify(Some(&v), ""), "{v}");
        }
        assert!(!classify(Some(&json!({"status": 2})), ""));
    }

    #[test]
    fn success_field_truthy_codings() {
        for v in [
            json!({"success": true}),
            json!({"success": "true"}),
            json!({"success": 1}),
            json!({"success": "1"}),
        ] {
            assert!(classify(Some(&v), ""), "{v}");
        }
        assert!(!classify(Some(&json!({"success": "error"})), ""));
        assert!(!classify(Some(&json!({"success": false})), ""));
    }

    #[test]
    fn code_zero_is_success() {
        assert!(classify(Some(&json!({"code": 0, "msg": "已签到"})), ""));
        assert!(classify(Some(&json!({"code": "0"})), ""));
        assert!(!classify(Some(&json!({"code": 1})), ""));
    }

    #[test]
    fn failure_keyword_vetoes_success_keyword() {
        let v = json!({"msg": "签到成功，但积分发放失败"});
        assert!(!classify(Some(&v), ""));
        assert!(!classify(None, "success ... error"));
    }

    #[test]
    fn message_keyword_without_veto_is_success() {
        assert!(classify(Some(&json!({"msg": "签到成功"})), ""));
        assert!(classify(Some(&json!({"message": "already OK"})), ""));
    }

    #[test]
    fn raw_text_fallback() {
        assert!(classify(None, "操作成功"));
        assert!(!classify(None, "操作成功 但是有错误"));
    }

    #[test]
    fn vacuous_input_is_never_success() {
        assert!(!classify(None, ""));
        assert!(!classify(Some(&json!({})), ""));
        assert!(!classify(Some(&json!("not an object")), ""));
    }

    #[test]
    fn field_lookup_ignores_casing() {
        assert!(classify(Some(&json!({"Status": 1})), ""));
        assert!(classify(Some(&json!({"CODE": "0"})), ""));
    }

    #[test]
    fn message_of_prefers_msg_over_message() {
        let v = json!({"message": "second", "msg": "first"});
        assert_eq!(message_of(Some(&v)), Some("first"));
        assert_eq!(message_of(Some(&json!({"message": "only"}))), Some("only"));
        assert_eq!(message_of(Some(&json!({}))), None);
        assert_eq!(message_of(None), None);
    }
}
