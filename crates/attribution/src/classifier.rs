//! AttributionClassifier - conversion state and deep-link classification

use contracts::{
    AnalyticsEvent, AttributionConfig, ConversionCallback, DeepLinkCallback, DeepLinkFields,
    DeepLinkStatus, InstallStatus,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Install origin, terminal once classified
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InstallAttribution {
    #[default]
    Unknown,
    Organic,
    /// Paid install; the channel is exposed for personalization
    NonOrganic {
        media_source: Option<String>,
        campaign: Option<String>,
    },
}

impl InstallAttribution {
    pub fn is_classified(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Organic => "organic",
            Self::NonOrganic { .. } => "non_organic",
        }
    }
}

/// What a conversion callback did to the install state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// First usable callback; state is now terminal
    Classified(InstallAttribution),
    /// State was already terminal; callback ignored
    AlreadyClassified,
    /// Missing data section or unrecognized status
    Ignored,
}

/// Attribution classifier
#[derive(Debug, Clone, Default)]
pub struct AttributionClassifier {
    config: AttributionConfig,
    install: InstallAttribution,
}

impl AttributionClassifier {
    pub fn new(config: AttributionConfig) -> Self {
        Self {
            config,
            install: InstallAttribution::Unknown,
        }
    }

    pub fn install_attribution(&self) -> &InstallAttribution {
        &self.install
    }

    /// Apply an install conversion callback
    #[instrument(name = "attribution_on_conversion_data", skip(self, payload))]
    pub fn on_conversion_data(&mut self, payload: &ConversionCallback) -> ConversionOutcome {
        if self.install.is_classified() {
            warn!(
                current = self.install.kind(),
                "Conversion data received after classification, ignoring"
            );
            return ConversionOutcome::AlreadyClassified;
        }

        let Some(data) = payload.data.as_ref() else {
            debug!("Conversion callback without data section");
            return ConversionOutcome::Ignored;
        };

        let Some(status) = data.status() else {
            warn!(af_status = ?data.af_status, "Unrecognized install status");
            return ConversionOutcome::Ignored;
        };

        self.install = match status {
            InstallStatus::Organic => {
                info!("Organic install");
                InstallAttribution::Organic
            }
            InstallStatus::NonOrganic => {
                let media_source = non_blank(data.media_source.as_deref());
                let campaign = non_blank(data.campaign.as_deref());
                info!(
                    media_source = ?media_source,
                    campaign = ?campaign,
                    "Non-organic install"
                );
                InstallAttribution::NonOrganic {
                    media_source,
                    campaign,
                }
            }
        };

        ConversionOutcome::Classified(self.install.clone())
    }

    /// Derive the event for a deep-link callback, if any
    ///
    /// Missing `media_source` and `deep_link_value` take the configured
    /// defaults; a missing campaign stays absent.
    #[instrument(name = "attribution_classify_deep_link", skip(self, payload))]
    pub fn classify_deep_link(&self, payload: &DeepLinkCallback) -> Option<AnalyticsEvent> {
        match payload.deep_link_status {
            Some(DeepLinkStatus::Found) => {}
            Some(DeepLinkStatus::NotFound) => {
                debug!("Deep link not found");
                return None;
            }
            Some(DeepLinkStatus::Error) => {
                warn!("Deep link resolution reported an error");
                return None;
            }
            Some(DeepLinkStatus::Unknown) => {
                warn!("Unrecognized deep link status");
                return None;
            }
            None => {
                debug!("Deep link callback without status");
                return None;
            }
        }

        let Some(data) = payload.data.as_ref() else {
            debug!("Deep link callback without data section");
            return None;
        };

        let fields = DeepLinkFields {
            deep_link_value: non_blank(data.deep_link_value.as_deref())
                .unwrap_or_else(|| self.config.default_deep_link_value.clone()),
            media_source: non_blank(data.media_source.as_deref())
                .unwrap_or_else(|| self.config.default_media_source.clone()),
            campaign: non_blank(data.campaign.as_deref()),
        };

        let event = if payload.is_deferred {
            AnalyticsEvent::DeferredDeepLink(fields)
        } else {
            AnalyticsEvent::DeepLinkOpened(fields)
        };
        debug!(event = event.name(), "Deep link classified");
        Some(event)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
