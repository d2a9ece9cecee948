use std::fmt;

/// Errors surfaced by the BigQuery REST adapter.
#[derive(Debug)]
pub enum BigQueryError {
    Http(reqwest::Error),
    Json(reqwest::Error),
    Api(String),
}

impl fmt::Display for BigQueryError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(error) => write!(formatter, "bigquery request failed: {error}"),
            Self::Json(error) => write!(formatter, "bigquery response malformed: {error}"),
            Self::Api(message) => write!(formatter, "bigquery rejected the request: {message}"),
        }
    }
}

impl std::error::Error for BigQueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(error) | Self::Json(error) => Some(error),
            Self::Api(_) => None,
        }
    }
}

impl From<reqwest::Error> for BigQueryError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error)
    }
}
