use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::types::{
    ErrorBody, FetchedGraph, GraphEnvelope, GraphListEnvelope, GraphSummary, StoredGraph, User,
    UserEnvelope,
};
use crate::graph::SessionDocument;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiError {
    /// 404: nothing stored under this graph id yet.
    NotFound,
    /// The server answered with a non-success status.
    Status { code: u16, message: String },
    /// Transport failure; the request may never have reached the server.
    Network(String),
    /// The body did not match the expected shape.
    Decode(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound => write!(f, "Graph not found."),
            ApiError::Status { code, message } => write!(f, "{message} (HTTP {code})"),
            ApiError::Network(err) => write!(f, "Network error: {err}"),
            ApiError::Decode(err) => write!(f, "Malformed server response: {err}"),
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Serialize)]
struct SaveRequest<'a> {
    data: &'a SessionDocument,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Blocking client for the graph and auth endpoints. Cheap to clone;
/// clones share the cookie jar, so one login covers every worker thread.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base: &str) -> Result<ApiClient> {
        let base = Url::parse(base.trim_end_matches('/'))
            .with_context(|| format!("invalid API base URL: {base}"))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("API base URL cannot carry paths: {base}"));
        }
        let client = Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building HTTP client")?;
        Ok(ApiClient { client, base })
    }

    /// Appends path segments with percent-encoding, so graph ids with
    /// spaces or slashes stay one segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }

    pub fn fetch_graph(&self, id: &str) -> Result<FetchedGraph, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&["graphs", id]))
            .send()
            .map_err(network)?;
        let envelope: GraphEnvelope<FetchedGraph> = read_json(response)?;
        Ok(envelope.graph)
    }

    pub fn store_graph(
        &self,
        id: &str,
        document: &SessionDocument,
    ) -> Result<StoredGraph, ApiError> {
        let response = self
            .client
            .post(self.endpoint(&["graphs", id]))
            .json(&SaveRequest { data: document })
            .send()
            .map_err(network)?;
        let envelope: GraphEnvelope<StoredGraph> = read_json(response)?;
        Ok(envelope.graph)
    }

    pub fn list_graphs(&self) -> Result<Vec<GraphSummary>, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&["graphs"]))
            .send()
            .map_err(network)?;
        let envelope: GraphListEnvelope = read_json(response)?;
        Ok(envelope.graphs)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        self.auth_post("login", email, password)
    }

    pub fn register(&self, email: &str, password: &str) -> Result<User, ApiError> {
        self.auth_post("register", email, password)
    }

    /// 401 means "not signed in", which is a state, not a failure.
    pub fn me(&self) -> Result<Option<User>, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&["auth", "me"]))
            .send()
            .map_err(network)?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        let envelope: UserEnvelope = read_json(response)?;
        Ok(Some(envelope.user))
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint(&["auth", "logout"]))
            .send()
            .map_err(network)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status {
                code: status.as_u16(),
                message: error_message(response),
            })
        }
    }

    fn auth_post(&self, route: &str, email: &str, password: &str) -> Result<User, ApiError> {
        let response = self
            .client
            .post(self.endpoint(&["auth", route]))
            .json(&Credentials { email, password })
            .send()
            .map_err(network)?;
        let envelope: UserEnvelope = read_json(response)?;
        Ok(envelope.user)
    }
}

fn network(err: reqwest::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    if !status.is_success() {
        return Err(ApiError::Status {
            code: status.as_u16(),
            message: error_message(response),
        });
    }
    response
        .json()
        .map_err(|err| ApiError::Decode(err.to_string()))
}

fn error_message(response: Response) -> String {
    response
        .json::<ErrorBody>()
        .map(|body| body.error)
        .unwrap_or_else(|_| "Request failed.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:3000/api/").unwrap()
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let url = client().endpoint(&["graphs", "default-graph"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/graphs/default-graph"
        );
        let url = client().endpoint(&["auth", "me"]);
        assert_eq!(url.as_str(), "http://localhost:3000/api/auth/me");
    }

    #[test]
    fn test_endpoint_escapes_graph_ids() {
        let url = client().endpoint(&["graphs", "my graph/2"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/graphs/my%20graph%2F2"
        );
    }

    #[test]
    fn test_rejects_unusable_base_urls() {
        assert!(ApiClient::new("localhost without scheme").is_err());
        assert!(ApiClient::new("data:text/plain,x").is_err());
    }

    #[test]
    fn test_error_messages_read_like_feedback_lines() {
        assert_eq!(ApiError::NotFound.to_string(), "Graph not found.");
        let err = ApiError::Status { code: 409, message: "Email already exists.".to_string() };
        assert_eq!(err.to_string(), "Email already exists. (HTTP 409)");
    }
}
