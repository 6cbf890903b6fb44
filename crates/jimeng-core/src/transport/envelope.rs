//! Response envelope interpretation
//!
//! Most endpoints wrap their payload as `{ret, errmsg, data}`. Some (history
//! lookup among them) return a bare object without `ret`.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// `ret` value for success
pub const RET_SUCCESS: &str = "0";

/// `ret` value for an exhausted credit balance
pub const RET_INSUFFICIENT_POINTS: &str = "5000";

/// Map a parsed response body to its payload or a typed error
pub fn interpret(body: Value) -> Result<Value> {
    let ret = match body.get("ret") {
        None | Some(Value::Null) => return Ok(body),
        Some(Value::String(code)) => code.trim().to_string(),
        Some(other) => other.to_string(),
    };

    let errmsg = body
        .get("errmsg")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match ret.as_str() {
        RET_SUCCESS => Ok(take_data(body)),
        RET_INSUFFICIENT_POINTS => Err(Error::insufficient_points(format!(
            "Unable to generate images: points may be insufficient, {}",
            errmsg
        ))),
        _ => Err(Error::request_failed(format!(
            "Upstream request failed (ret={}): {}",
            ret, errmsg
        ))),
    }
}

fn take_data(body: Value) -> Value {
    let data = match body {
        Value::Object(mut map) => map.remove("data"),
        _ => None,
    };
    match data {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(data) => data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_success_returns_data() {
        let body = json!({"ret": "0", "errmsg": "success", "data": {"credit": {"gift_credit": 3}}});
        let data = interpret(body).unwrap();
        assert_eq!(data, json!({"credit": {"gift_credit": 3}}));
    }

    #[test]
    fn test_success_without_data_is_empty_object() {
        assert_eq!(interpret(json!({"ret": "0"})).unwrap(), json!({}));
        assert_eq!(interpret(json!({"ret": "0", "data": null})).unwrap(), json!({}));
    }

    #[test]
    fn test_numeric_ret_is_accepted() {
        assert_eq!(interpret(json!({"ret": 0, "data": [1]})).unwrap(), json!([1]));
        let err = interpret(json!({"ret": 5000, "errmsg": "no points"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientPoints);
    }

    #[test]
    fn test_insufficient_points() {
        let err = interpret(json!({"ret": "5000", "errmsg": "balance empty"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientPoints);
        assert!(err.to_string().contains("balance empty"));
    }

    #[test]
    fn test_other_ret_is_request_failed() {
        let err = interpret(json!({"ret": "7", "errmsg": "invalid session"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestFailed);
        assert!(err.to_string().contains("invalid session"));
    }

    #[test]
    fn test_missing_ret_returns_body_unchanged() {
        let body = json!({"abc123": {"status": 20, "item_list": []}});
        assert_eq!(interpret(body.clone()).unwrap(), body);
    }
}
