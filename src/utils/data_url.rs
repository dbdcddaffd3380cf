use base64::{Engine as _, engine::general_purpose::STANDARD};
use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Media type assumed when a data URL leaves it out (RFC 2397).
pub const DEFAULT_MEDIA_TYPE: &str = "text/plain;charset=US-ASCII";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataUrlError {
    #[error("not a data URL: missing 'data:' scheme")]
    MissingScheme,

    #[error("not a data URL: missing ',' between header and payload")]
    MissingPayload,

    #[error("invalid base64 payload: {0}")]
    Base64(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Strips the `data:<media>[;base64],` header and decodes the payload.
///
/// Base64 payloads may contain ASCII whitespace (line-wrapped encoders);
/// payloads without the `;base64` marker are percent-decoded.
pub fn decode(input: &str) -> Result<DataUrl, DataUrlError> {
    let input = input.trim();
    let rest = match input.get(..5) {
        Some(scheme) if scheme.eq_ignore_ascii_case("data:") => &input[5..],
        _ => return Err(DataUrlError::MissingScheme),
    };

    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingPayload)?;

    let mut params: Vec<&str> = header.split(';').map(str::trim).collect();
    let is_base64 = params
        .last()
        .is_some_and(|p| p.eq_ignore_ascii_case("base64"));
    if is_base64 {
        params.pop();
    }

    let media_type = params.join(";");
    let media_type = if media_type.is_empty() {
        DEFAULT_MEDIA_TYPE.to_string()
    } else {
        media_type
    };

    let bytes = if is_base64 {
        let compact: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        STANDARD
            .decode(compact)
            .map_err(|e| DataUrlError::Base64(e.to_string()))?
    } else {
        percent_decode_str(payload).collect()
    };

    Ok(DataUrl { media_type, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64_payload() {
        let url = decode("data:application/octet-stream;base64,AQID").unwrap();
        assert_eq!(url.media_type, "application/octet-stream");
        assert_eq!(url.bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_base64_with_line_breaks() {
        let url = decode("data:text/plain;base64,aGVs\r\nbG8=").unwrap();
        assert_eq!(url.bytes, b"hello");
    }

    #[test]
    fn test_decode_percent_encoded_payload() {
        let url = decode("data:,Hello%2C%20World").unwrap();
        assert_eq!(url.media_type, DEFAULT_MEDIA_TYPE);
        assert_eq!(url.bytes, b"Hello, World");
    }

    #[test]
    fn test_decode_keeps_media_parameters() {
        let url = decode("DATA:text/plain;charset=utf-8;base64,aGk=").unwrap();
        assert_eq!(url.media_type, "text/plain;charset=utf-8");
        assert_eq!(url.bytes, b"hi");
    }

    #[test]
    fn test_decode_empty_file() {
        let url = decode("data:application/octet-stream;base64,").unwrap();
        assert!(url.bytes.is_empty());
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert_eq!(decode("AQID"), Err(DataUrlError::MissingScheme));
        assert_eq!(
            decode("data:application/octet-stream;base64"),
            Err(DataUrlError::MissingPayload)
        );
        assert!(matches!(
            decode("data:;base64,%%%"),
            Err(DataUrlError::Base64(_))
        ));
    }
}
