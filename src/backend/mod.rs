//! Access to the consultation backend.
//!
//! The controller and the history store only see [`ConsultBackend`]; the HTTP
//! implementation lives in [`http`] and tests substitute in-memory fakes.

mod http;

use crate::error::ApiError;
use crate::model::{ConsultResult, HistoryRecord, QueryText};
use std::future::Future;

pub use http::HttpBackend;

pub trait ConsultBackend: Send + Sync + 'static {
    /// `POST /api/consult`. Exactly one request per call, never retried.
    fn consult(
        &self,
        query: &QueryText,
    ) -> impl Future<Output = Result<ConsultResult, ApiError>> + Send;

    /// `GET /api/history`, in backend order.
    fn list_history(&self) -> impl Future<Output = Result<Vec<HistoryRecord>, ApiError>> + Send;

    /// `DELETE /api/history/{id}`. Only the status matters.
    fn delete_history(&self, id: i64) -> impl Future<Output = Result<(), ApiError>> + Send;
}
