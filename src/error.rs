use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {url} returned {status}: {message}")]
    Api {
        method: &'static str,
        url: String,
        status: StatusCode,
        message: String,
    },

    #[error("invalid registry URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("credential is not a valid header value: {0}")]
    Credential(#[from] reqwest::header::InvalidHeaderValue),

    #[error("no {kind} named {name:?}{}", suggestion_suffix(.suggestions))]
    UnknownName {
        kind: &'static str,
        name: String,
        suggestions: Vec<String>,
    },

    #[error("found several {kind}s named {name:?}, with ids {}", join_ids(.ids))]
    AmbiguousName {
        kind: &'static str,
        name: String,
        ids: Vec<i64>,
    },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn suggestion_suffix(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(". Did you mean: {}?", suggestions.join(", "))
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
