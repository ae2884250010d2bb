use serde::Deserialize;
use serde_json::Value;

/// Row returned by `GET /graphs/{id}`. `data` stays raw JSON until the
/// normalizers project it into a session document.
#[derive(Clone, Debug, Deserialize)]
pub struct FetchedGraph {
    pub id: String,
    pub data: Value,
}

/// Acknowledgement returned by `POST /graphs/{id}`.
#[derive(Clone, Debug, Deserialize)]
pub struct StoredGraph {
    pub id: String,
}

/// Catalog entry from `GET /graphs`, newest first.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphSummary {
    pub id: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct User {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphEnvelope<T> {
    pub graph: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphListEnvelope {
    pub graphs: Vec<GraphSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
