use axum::http::HeaderValue;

use super::{Result, WebError};
use crate::schema::RawFields;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Decodes a url-encoded body. Repeated keys are kept in order, which is how
/// multi-select fields arrive.
pub fn decode_form(content_type: Option<&HeaderValue>, body: &[u8]) -> Result<RawFields> {
    let media_type = content_type
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase());

    match media_type.as_deref() {
        Some(FORM_CONTENT_TYPE) => {}
        Some(other) => {
            return Err(WebError::UnsupportedMediaType(format!(
                "expected {FORM_CONTENT_TYPE}, got {other}"
            )));
        }
        None => {
            return Err(WebError::UnsupportedMediaType(format!(
                "expected {FORM_CONTENT_TYPE}"
            )));
        }
    }

    Ok(RawFields::from_pairs(url::form_urlencoded::parse(body)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_keys_and_escapes() {
        let content_type = HeaderValue::from_static("application/x-www-form-urlencoded; charset=UTF-8");
        let fields = decode_form(
            Some(&content_type),
            b"intent=upsert-team&members=m1&members=m2&name=The+Blockers%21",
        )
        .unwrap();

        assert_eq!(fields.get("intent"), Some("upsert-team"));
        assert_eq!(fields.get_all("members"), &["m1".to_string(), "m2".to_string()]);
        assert_eq!(fields.get("name"), Some("The Blockers!"));
    }

    #[test]
    fn json_bodies_are_refused() {
        let content_type = HeaderValue::from_static("application/json");
        let err = decode_form(Some(&content_type), b"{}").unwrap_err();
        assert!(matches!(err, WebError::UnsupportedMediaType(_)));
        assert!(decode_form(None, b"a=b").is_err());
    }
}
