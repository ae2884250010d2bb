mod client;
mod types;

pub use client::{ApiClient, ApiError};
pub use types::{FetchedGraph, GraphSummary, StoredGraph, User};
