use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub step_interval: Duration,
}

/// A query accepted for submission. Blank input never becomes a `QueryText`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryText(String);

impl QueryText {
    /// Accept the raw input verbatim unless it is empty or whitespace-only.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueryText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request body for `POST /api/consult`.
#[derive(Debug, Clone, Serialize)]
pub struct ConsultRequest<'a> {
    pub query: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatuteRef {
    pub law_name: String,
    pub article_id: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRef {
    pub court: String,
    pub case_id: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultResult {
    pub summary: String,
    pub statutes: Vec<StatuteRef>,
    pub cases: Vec<CaseRef>,
    // Legal domains the backend classified the query into; older records lack it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub query: String,
    pub result: ConsultResult,
    // Kept verbatim; the backend sends either RFC3339 or "YYYY-MM-DD HH:MM:SS".
    pub created_at: String,
}
