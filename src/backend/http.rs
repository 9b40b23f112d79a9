use super::ConsultBackend;
use crate::error::ApiError;
use crate::model::{ClientConfig, ConsultRequest, ConsultResult, HistoryRecord, QueryText};
use anyhow::{Context, Result};

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

/// reqwest-backed client for the consultation API.
///
/// No request timeout is configured: the analysis call routinely takes several
/// seconds and the UI stays busy until it resolves.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn history_item_path(id: i64) -> String {
    format!("/api/history/{id}")
}

impl ConsultBackend for HttpBackend {
    async fn consult(&self, query: &QueryText) -> Result<ConsultResult, ApiError> {
        let url = self.endpoint("/api/consult");
        tracing::debug!(%url, "POST consult");
        let resp = self
            .http
            .post(&url)
            .json(&ConsultRequest {
                query: query.as_str(),
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json::<ConsultResult>().await?)
    }

    async fn list_history(&self) -> Result<Vec<HistoryRecord>, ApiError> {
        let url = self.endpoint("/api/history");
        tracing::debug!(%url, "GET history");
        let resp = self.http.get(&url).send().await?.error_for_status()?;
        Ok(resp.json::<Vec<HistoryRecord>>().await?)
    }

    async fn delete_history(&self, id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&history_item_path(id));
        tracing::debug!(%url, "DELETE history item");
        self.http.delete(&url).send().await?.error_for_status()?;
        Ok(())
    }
}
