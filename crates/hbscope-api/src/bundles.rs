// Bundle endpoints

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::Bundle;

impl ApiClient {
    /// `GET /bundles` -- every stored bundle.
    pub async fn list_bundles(&self) -> Result<Vec<Bundle>, Error> {
        self.get("/bundles").await
    }

    /// `GET /bundles/featured` -- the current featured bundle.
    ///
    /// The backend answers 404 when no bundle is stored; that surfaces as
    /// an `Error::Http` with `is_not_found() == true`.
    pub async fn featured_bundle(&self) -> Result<Bundle, Error> {
        self.get("/bundles/featured").await
    }

    /// `GET /bundles/{id}`
    pub async fn get_bundle(&self, id: &str) -> Result<Bundle, Error> {
        let id = require_segment(id, "bundle id")?;
        self.get(&format!("/bundles/{id}")).await
    }

    /// `GET /bundles/by-machine-name/{machine_name}`
    pub async fn get_bundle_by_machine_name(&self, machine_name: &str) -> Result<Bundle, Error> {
        let name = require_segment(machine_name, "machine name")?;
        self.get(&format!("/bundles/by-machine-name/{name}")).await
    }
}

/// Percent-encode a single path segment.
pub(crate) fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Encode a required path segment, refusing blank values.
pub(crate) fn require_segment(segment: &str, name: &'static str) -> Result<String, Error> {
    if segment.trim().is_empty() {
        return Err(Error::InvalidParameter { name });
    }
    Ok(encode_segment(segment))
}

#[cfg(test)]
mod tests {
    use super::{Error, encode_segment, require_segment};

    #[test]
    fn segments_are_escaped() {
        assert_eq!(encode_segment("abc-123"), "abc-123");
        assert_eq!(encode_segment("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn blank_segments_are_refused() {
        assert!(matches!(
            require_segment("", "bundle id"),
            Err(Error::InvalidParameter { name: "bundle id" })
        ));
        assert!(require_segment("  ", "bundle id").is_err());
        assert_eq!(require_segment("b 1", "bundle id").ok().as_deref(), Some("b%201"));
    }
}
