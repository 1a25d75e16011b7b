//! Attribution SDK callback payloads
//!
//! Field names follow what the attribution SDK delivers. Every field is
//! optional: a missing section is a no-op for the classifier, not an error.
//! A field of the wrong JSON type reads as absent.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// `Some(value)` when the field has the expected shape, `None` otherwise
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient<T> {
        Value(T),
        Other(IgnoredAny),
    }

    Ok(match Option::<Lenient<T>>::deserialize(deserializer)? {
        Some(Lenient::Value(value)) => Some(value),
        Some(Lenient::Other(_)) | None => None,
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::<D, bool>(deserializer)?.unwrap_or(false))
}

/// Install origin reported by conversion data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallStatus {
    Organic,
    NonOrganic,
}

impl InstallStatus {
    /// Parse the SDK's `af_status` string
    ///
    /// Accepts "Organic" and "Non-organic" in any case, plus the
    /// `NonOrganic` / `non_organic` spellings.
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "organic" => Some(Self::Organic),
            "nonorganic" => Some(Self::NonOrganic),
            _ => None,
        }
    }
}

/// Install conversion callback: `{ data: { af_status, media_source, campaign } }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionCallback {
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<ConversionData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionData {
    #[serde(default, deserialize_with = "lenient")]
    pub af_status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub media_source: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub campaign: Option<String>,
}

impl ConversionData {
    /// Parsed install status, if present and recognized
    pub fn status(&self) -> Option<InstallStatus> {
        self.af_status.as_deref().and_then(InstallStatus::parse)
    }
}

/// Deep-link resolution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeepLinkStatus {
    Found,
    NotFound,
    Error,
    /// Any status this version does not know; classified like `NotFound`
    #[serde(other)]
    Unknown,
}

/// Deep-link callback: `{ deepLinkStatus, isDeferred, data: { ... } }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepLinkCallback {
    #[serde(rename = "deepLinkStatus", default, deserialize_with = "lenient")]
    pub deep_link_status: Option<DeepLinkStatus>,

    /// Taken verbatim from the SDK
    #[serde(rename = "isDeferred", default, deserialize_with = "lenient_flag")]
    pub is_deferred: bool,

    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<DeepLinkData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepLinkData {
    #[serde(default, deserialize_with = "lenient")]
    pub deep_link_value: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub media_source: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub campaign: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_status_parse() {
        assert_eq!(InstallStatus::parse("Organic"), Some(InstallStatus::Organic));
        assert_eq!(
            InstallStatus::parse("Non-organic"),
            Some(InstallStatus::NonOrganic)
        );
        assert_eq!(
            InstallStatus::parse("non_organic"),
            Some(InstallStatus::NonOrganic)
        );
        assert_eq!(InstallStatus::parse("paid"), None);
    }

    #[test]
    fn test_deep_link_callback_wire_names() {
        let cb: DeepLinkCallback = serde_json::from_str(
            r#"{
                "deepLinkStatus": "FOUND",
                "isDeferred": true,
                "data": { "deep_link_value": "promo", "media_source": "meta_ads" }
            }"#,
        )
        .unwrap();

        assert_eq!(cb.deep_link_status, Some(DeepLinkStatus::Found));
        assert!(cb.is_deferred);
        let data = cb.data.unwrap();
        assert_eq!(data.deep_link_value.as_deref(), Some("promo"));
        assert_eq!(data.campaign, None);
    }

    #[test]
    fn test_conversion_callback_missing_data() {
        let cb: ConversionCallback = serde_json::from_str("{}").unwrap();
        assert!(cb.data.is_none());
    }

    #[test]
    fn test_unknown_deep_link_status() {
        let cb: DeepLinkCallback =
            serde_json::from_str(r#"{"deepLinkStatus": "UNKNOWN_STATUS"}"#).unwrap();
        assert_eq!(cb.deep_link_status, Some(DeepLinkStatus::Unknown));
        assert!(!cb.is_deferred);
    }

    #[test]
    fn test_mistyped_fields_read_as_absent() {
        let cb: DeepLinkCallback = serde_json::from_str(
            r#"{
                "deepLinkStatus": 3,
                "isDeferred": "yes",
                "data": { "deep_link_value": 42, "media_source": "email", "campaign": null }
            }"#,
        )
        .unwrap();
        assert_eq!(cb.deep_link_status, None);
        assert!(!cb.is_deferred);
        let data = cb.data.unwrap();
        assert_eq!(data.deep_link_value, None);
        assert_eq!(data.media_source.as_deref(), Some("email"));
        assert_eq!(data.campaign, None);

        let cb: ConversionCallback =
            serde_json::from_str(r#"{"data": {"af_status": ["Organic"], "media_source": 7}}"#)
                .unwrap();
        let data = cb.data.unwrap();
        assert_eq!(data.af_status, None);
        assert_eq!(data.status(), None);

        let cb: ConversionCallback = serde_json::from_str(r#"{"data": "broken"}"#).unwrap();
        assert!(cb.data.is_none());
    }
}
