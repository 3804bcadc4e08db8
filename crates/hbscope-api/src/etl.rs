// ETL trigger

use serde_json::json;
use tracing::info;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::EtlRunResponse;

impl ApiClient {
    /// `POST /etl/run` on the long-timeout client.
    ///
    /// The backend scrapes, cleans up and persists before answering, which
    /// routinely takes minutes. Requires a bearer token.
    pub async fn run_etl(&self) -> Result<EtlRunResponse, Error> {
        let result: EtlRunResponse = self.post_long("/etl/run", Some(&json!({}))).await?;
        info!(
            bundles_processed = result.bundles_processed,
            cleanup_ran = result.cleanup_ran,
            "ETL run finished"
        );
        Ok(result)
    }
}
