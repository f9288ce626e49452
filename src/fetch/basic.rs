use super::client::HttpClient;
use async_trait::async_trait;
use std::time::Duration;

/// Plain `reqwest` transport.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    /// A client that gives up on slow connects and slow responses.
    pub fn with_timeouts(connect: Duration, total: Duration) -> reqwest::Result<Self> {
        let inner = reqwest::Client::builder()
            .connect_timeout(connect)
            .timeout(total)
            .build()?;
        Ok(Self(inner))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
