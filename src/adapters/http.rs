use crate::utils::error::{Result, TravelError};
use reqwest::{Client, Response};
use std::time::Duration;

/// Builds the shared client. Without a timeout the reqwest default applies.
pub fn build_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder =
        Client::builder().user_agent(concat!("pr-travel-guide/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Turns a non-2xx response into `TravelError::RemoteStatus`, keeping the
/// body for the logs.
pub async fn ensure_success(service: &str, response: Response) -> Result<Response> {
    let status = response.status();
    tracing::debug!("{} response status: {}", service, status);

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(TravelError::RemoteStatus {
        service: service.to_string(),
        status: status.as_u16(),
        body,
    })
}

pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://api.openai.com/v1/", "/embeddings"),
            "https://api.openai.com/v1/embeddings"
        );
        assert_eq!(join_url("http://localhost:8080", "query"), "http://localhost:8080/query");
    }
}
