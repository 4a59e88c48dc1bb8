use murmur_types::text::truncate;

/// Error from an outbound channel. Callers log these and move on; a
/// failed share never fails the request that triggered it.
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("channel not configured")]
    NotConfigured,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} API error (status {status}): {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl ShareError {
    /// Build an API error from a non-success response, keeping a bounded
    /// slice of the body for the log line.
    pub(crate) async fn from_response(
        service: &'static str,
        resp: reqwest::Response,
    ) -> Self {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        ShareError::Api {
            service,
            status,
            body: truncate(&body, 300),
        }
    }
}
