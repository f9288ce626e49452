use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. The seam lets callers wrap or replace the
/// transport without touching the backend client.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
