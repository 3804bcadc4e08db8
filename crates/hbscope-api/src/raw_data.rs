// Landing-page raw data endpoints

use crate::bundles::require_segment;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::RawDataRecord;

impl ApiClient {
    /// `GET /landing-page-raw-data` -- newest first.
    pub async fn list_raw_data(&self) -> Result<Vec<RawDataRecord>, Error> {
        self.get("/landing-page-raw-data").await
    }

    /// `GET /landing-page-raw-data/latest` -- 404 when nothing was scraped yet.
    pub async fn latest_raw_data(&self) -> Result<RawDataRecord, Error> {
        self.get("/landing-page-raw-data/latest").await
    }

    /// `GET /landing-page-raw-data/{id}`
    pub async fn get_raw_data(&self, id: &str) -> Result<RawDataRecord, Error> {
        let id = require_segment(id, "raw data id")?;
        self.get(&format!("/landing-page-raw-data/{id}")).await
    }
}
