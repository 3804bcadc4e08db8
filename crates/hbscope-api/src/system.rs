// System-level endpoints

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::HealthStatus;

impl ApiClient {
    /// `GET /health`
    pub async fn health(&self) -> Result<HealthStatus, Error> {
        self.get("/health").await
    }
}
