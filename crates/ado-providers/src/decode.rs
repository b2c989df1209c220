use serde_json::Value;
use thiserror::Error;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response body is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("response body is not valid JSON")]
    Json(#[from] serde_json::Error),
}

pub fn decode_repositories(body: &[u8]) -> Result<Value, DecodeError> {
    let text = std::str::from_utf8(strip_bom(body))?;
    Ok(serde_json::from_str(text)?)
}

pub(crate) fn strip_bom(body: &[u8]) -> &[u8] {
    body.strip_prefix(UTF8_BOM).unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_body_with_bom() {
        let mut body = UTF8_BOM.to_vec();
        body.extend_from_slice(br#"{"value": [], "count": 0}"#);
        let value = decode_repositories(&body).unwrap();
        assert_eq!(value["count"], 0);
    }

    #[test]
    fn keeps_document_key_order() {
        let value = decode_repositories(br#"{"value": [], "count": 0}"#).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["value", "count"]);
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = decode_repositories(b"{\"name\": \"\xff\"}").unwrap_err();
        assert!(matches!(err, DecodeError::Utf8(_)));
    }

    #[test]
    fn rejects_html_sign_in_page() {
        let err = decode_repositories(b"<!DOCTYPE html><html></html>").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }
}
