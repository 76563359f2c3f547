use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("response body is not a list of words: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid endpoint `{value}`: {source}")]
    Endpoint {
        value: String,
        source: url::ParseError,
    },

    #[error("endpoint `{0}` must be an http or https url")]
    Scheme(String),

    #[error("invalid value `{value}` for --{option}")]
    Number { option: &'static str, value: String },

    #[error("cannot build http client: {0}")]
    Client(#[from] reqwest::Error),
}
