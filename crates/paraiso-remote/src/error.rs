use paraiso_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<RemoteError> for StoreError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Http(e) => StoreError::Unavailable(e.to_string()),
            RemoteError::Server { status, body } => StoreError::Backend { status, body },
            RemoteError::Json(e) => StoreError::Json(e),
            RemoteError::UnexpectedResponse(msg) => StoreError::Other(msg),
        }
    }
}

/// Turn a non-2xx response into [`RemoteError::Server`], keeping the body for diagnostics.
pub(crate) async fn check(resp: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(RemoteError::Server {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_keeps_status() {
        let err: StoreError = RemoteError::Server {
            status: 503,
            body: "down".into(),
        }
        .into();
        assert!(matches!(err, StoreError::Backend { status: 503, .. }));
        assert_eq!(err.to_string(), "backend returned 503: down");
    }

    #[test]
    fn unexpected_response_maps_to_other() {
        let err: StoreError = RemoteError::UnexpectedResponse("empty insert".into()).into();
        assert_eq!(err.to_string(), "empty insert");
    }
}
