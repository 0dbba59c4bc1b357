use super::client::HttpClient;
use crate::config::PipelineConfig;
use async_trait::async_trait;

/// A pooled reqwest client carrying the pipeline's timeouts and User-Agent.
///
/// Built once per pipeline invocation and shared by every worker so that
/// connections are reused across images.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    /// Builds a client with a short connect timeout and a longer read timeout.
    pub fn from_config(config: &PipelineConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self(client))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
