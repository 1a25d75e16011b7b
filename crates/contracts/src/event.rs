//! Event model - what every sink receives
//!
//! `TrackedEvent` is the wire unit; `AnalyticsEvent` is the typed catalog
//! whose parameter contracts must stay stable for analytics continuity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Parameter key carrying the hashed identity
pub const HASHED_EMAIL_KEY: &str = "hashed_email";

/// Scalar parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    /// String view, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view (ints widen to f64)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Event parameters, ordered by key
pub type EventParams = BTreeMap<String, ParamValue>;

/// Named event with its merged parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedEvent {
    /// Wire event name (e.g. "deposit")
    pub name: String,

    /// Parameters, identity already merged in
    #[serde(default)]
    pub params: EventParams,
}

impl TrackedEvent {
    pub fn new(name: impl Into<String>, params: EventParams) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Look up a parameter
    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    /// Look up a string parameter
    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.param(key).and_then(ParamValue::as_str)
    }
}

/// Attribution fields shared by both deep-link events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepLinkFields {
    pub deep_link_value: String,
    pub media_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
}

/// Catalog of named events
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsEvent {
    /// First launch after installation
    AppInstall,
    /// Completed registration
    UserSignUp,
    /// Fund deposit
    Deposit { value: f64, currency: String },
    /// Server instance creation
    CreateInstance { product_id: String },
    /// Screen became visible
    ScreenView { screen_name: String },
    /// Deep link resolved for an installed app
    DeepLinkOpened(DeepLinkFields),
    /// Deep link resolved after installation
    DeferredDeepLink(DeepLinkFields),
}

impl AnalyticsEvent {
    pub const APP_INSTALL: &'static str = "app_install";
    pub const USER_SIGN_UP: &'static str = "user_sign_up";
    pub const DEPOSIT: &'static str = "deposit";
    pub const CREATE_INSTANCE: &'static str = "create_instance";
    pub const SCREEN_VIEW: &'static str = "screen_view";
    pub const DEEP_LINK_OPENED: &'static str = "deep_link_opened";
    pub const DEFERRED_DEEP_LINK: &'static str = "deferred_deep_link";

    /// Wire event name
    pub fn name(&self) -> &'static str {
        match self {
            Self::AppInstall => Self::APP_INSTALL,
            Self::UserSignUp => Self::USER_SIGN_UP,
            Self::Deposit { .. } => Self::DEPOSIT,
            Self::CreateInstance { .. } => Self::CREATE_INSTANCE,
            Self::ScreenView { .. } => Self::SCREEN_VIEW,
            Self::DeepLinkOpened(_) => Self::DEEP_LINK_OPENED,
            Self::DeferredDeepLink(_) => Self::DEFERRED_DEEP_LINK,
        }
    }

    /// Parameter set for this event, before identity is merged
    ///
    /// Currency is trimmed and upper-cased; an absent campaign is omitted.
    pub fn into_params(self) -> EventParams {
        let mut params = EventParams::new();
        match self {
            Self::AppInstall | Self::UserSignUp => {}
            Self::Deposit { value, currency } => {
                params.insert("value".into(), ParamValue::Float(value));
                params.insert(
                    "currency".into(),
                    ParamValue::Str(currency.trim().to_uppercase()),
                );
            }
            Self::CreateInstance { product_id } => {
                params.insert("product_id".into(), ParamValue::Str(product_id));
            }
            Self::ScreenView { screen_name } => {
                params.insert("screen_name".into(), ParamValue::Str(screen_name));
            }
            Self::DeepLinkOpened(fields) | Self::DeferredDeepLink(fields) => {
                params.insert(
                    "deep_link_value".into(),
                    ParamValue::Str(fields.deep_link_value),
                );
                params.insert("media_source".into(), ParamValue::Str(fields.media_source));
                if let Some(campaign) = fields.campaign {
                    params.insert("campaign".into(), ParamValue::Str(campaign));
                }
            }
        }
        params
    }
}
