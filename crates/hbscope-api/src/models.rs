// Wire types for the bundle backend.
//
// Field names match the backend's JSON (snake_case). Everything the backend
// may omit is optional and unknown fields are ignored, so new backend
// revisions do not break older clients.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Auth ─────────────────────────────────────────────────────────────

/// Identity of a logged-in user, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: UserInfo,
}

fn default_token_type() -> String {
    "bearer".into()
}

// ── Bundles ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub currency: String,
    pub amount: f64,
}

/// One purchasable tier of a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTier {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_initial: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,
}

/// One book (or other item) included in a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookItem {
    pub machine_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msrp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiers: Option<Vec<String>>,
}

/// A catalog bundle. Read-only projection of backend state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub id: String,
    pub machine_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_stamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date_datetime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date_datetime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_tiers: Option<Vec<PriceTier>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_list: Option<Vec<BookItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msrp_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_date: Option<String>,
}

impl Bundle {
    /// Whether the backend flagged this bundle as currently active.
    /// An absent flag counts as inactive.
    pub fn is_active(&self) -> bool {
        self.is_active.unwrap_or(false)
    }

    /// Best human-readable name: tile name, short name, then machine name.
    pub fn display_name(&self) -> &str {
        self.tile_name
            .as_deref()
            .or(self.tile_short_name.as_deref())
            .unwrap_or(&self.machine_name)
    }

    /// Parsed verification timestamp, if present and parseable.
    pub fn verified_at(&self) -> Option<DateTime<Utc>> {
        self.verification_date.as_deref().and_then(parse_timestamp)
    }
}

// ── ETL ──────────────────────────────────────────────────────────────

/// Per-image detail reported by ETL revisions that download images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

/// Summary of one ETL run.
///
/// Only `bundles_processed` and `cleanup_ran` are guaranteed; the image
/// counters exist in some backend revisions and not others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtlRunResponse {
    pub bundles_processed: u64,
    pub cleanup_ran: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images_downloaded: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_images_downloaded: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_images_downloaded: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images_info: Vec<ImageInfo>,
}

// ── Raw data ─────────────────────────────────────────────────────────

/// A scraped landing-page JSON snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDataRecord {
    pub id: String,
    pub json_data: serde_json::Value,
    pub scraped_date: String,
    pub source_url: String,
    #[serde(default)]
    pub json_hash: Option<String>,
    #[serde(default)]
    pub json_version: Option<String>,
}

impl RawDataRecord {
    pub fn scraped_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.scraped_date)
    }
}

// ── System ───────────────────────────────────────────────────────────

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

// ── Timestamps ───────────────────────────────────────────────────────

/// Parse a backend timestamp.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` (or with a space
/// separator), and bare `YYYY-MM-DD`. Naive values are taken as UTC; bare
/// dates as midnight UTC. Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn timestamp_formats() {
        let midnight = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).single();
        assert_eq!(parse_timestamp("2024-05-01"), midnight);
        assert_eq!(parse_timestamp("2024-05-01T00:00:00"), midnight);
        assert_eq!(parse_timestamp("2024-05-01T02:00:00+02:00"), midnight);
        assert_eq!(parse_timestamp("2024-05-01 00:00:00.000"), midnight);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn minimal_bundle_deserializes() {
        let bundle: Bundle = serde_json::from_value(json!({
            "id": "b1",
            "machine_name": "m1",
            "is_active": true,
            "verification_date": "2024-05-01",
            "raw_html": "<div/>"
        }))
        .unwrap_or_else(|e| panic!("bundle should parse: {e}"));

        assert!(bundle.is_active());
        assert_eq!(bundle.display_name(), "m1");
        assert!(bundle.verified_at().is_some());
        assert!(bundle.price_tiers.is_none());
    }

    #[test]
    fn etl_response_without_image_counters() {
        let result: EtlRunResponse =
            serde_json::from_value(json!({"bundles_processed": 7, "cleanup_ran": true}))
                .unwrap_or_else(|e| panic!("etl response should parse: {e}"));

        assert_eq!(result.bundles_processed, 7);
        assert!(result.cleanup_ran);
        assert_eq!(result.images_downloaded, None);
        assert!(result.images_info.is_empty());
    }
}
