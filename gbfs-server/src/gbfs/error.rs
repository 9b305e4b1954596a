//! Decoder and document client error types.

/// Errors from turning raw document bytes into normalized records.
///
/// Decode failures are never retried: the input is assumed to be immutable
/// garbage until the provider republishes it.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The document is not syntactically valid JSON.
    #[error("malformed JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// A field value fell outside the accepted union of wire shapes.
    #[error("invalid value: {message}")]
    InvalidScalar { message: String },

    /// A discriminator (e.g. a feed name) is not one of the known values.
    #[error("unrecognized discriminator: {value:?}")]
    UnrecognizedDiscriminator { value: String },

    /// The provider directory CSV could not be parsed.
    #[error("malformed CSV: {message}")]
    MalformedCsv { message: String },
}

impl DecodeError {
    /// Classify a serde_json error: syntax-level problems are malformed
    /// JSON, data-level problems are invalid scalar values.
    pub(crate) fn from_json(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Data => DecodeError::InvalidScalar {
                message: err.to_string(),
            },
            Category::Syntax | Category::Eof | Category::Io => DecodeError::MalformedJson(err),
        }
    }
}

/// Errors from fetching and decoding a single document.
///
/// No retries happen at this layer; retry policy is a pipeline-level,
/// pass-granularity decision.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request failed before an HTTP response arrived (DNS, connect,
    /// timeout, etc.).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The document decoded successfully but its data payload is absent or
    /// empty. Distinct from a decode failure; callers check for it
    /// explicitly.
    #[error("document has empty data payload")]
    EmptyData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_error_classification() {
        let syntax = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(
            DecodeError::from_json(syntax),
            DecodeError::MalformedJson(_)
        ));

        let data = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        assert!(matches!(
            DecodeError::from_json(data),
            DecodeError::InvalidScalar { .. }
        ));
    }

    #[test]
    fn display_messages() {
        let err = DecodeError::UnrecognizedDiscriminator {
            value: "station_telemetry".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unrecognized discriminator: \"station_telemetry\""
        );

        let err = FetchError::Status {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert!(err.to_string().contains("503"));
    }
}
