//! Tractive egress connector
//!
//! Talks to the Tractive REST API: token authentication, tracker listing,
//! latest position (with reverse-geocoded address), segmented position
//! history, and hardware reports.

use crate::client::{create_client, HttpClientConfig};
use chrono::{DateTime, Utc};
use homeward_core::{
    types::{Coordinate, TrackerPosition, TrackerSummary},
    Error, Result,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument, warn};

/// Default Tractive API base URL
const DEFAULT_BASE_URL: &str = "https://graph.tractive.com/4";

/// Client identifier the Tractive API expects on every request
const DEFAULT_CLIENT_ID: &str = "6536c228870a3c8857d452e8";

/// Tractive connector configuration
#[derive(Debug, Clone)]
pub struct TractiveConfig {
    /// Base URL for the Tractive API
    pub base_url: String,

    /// Value for the `X-Tractive-Client` header
    pub client_id: String,

    /// HTTP client configuration
    pub client_config: HttpClientConfig,
}

impl TractiveConfig {
    /// Create a configuration pointing at the production API
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            client_config: HttpClientConfig::default(),
        }
    }

    /// Set the base URL (for custom endpoints and tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for TractiveConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Authenticated state: opaque bearer token plus the account it belongs to.
///
/// Created by a successful `authenticate`, replaced as a whole on
/// re-authentication, cleared entirely when authentication fails.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub account_id: String,
}

/// A point in time accepted as a history bound.
///
/// Numeric bounds are unix milliseconds and are floored to whole seconds;
/// text bounds must parse as RFC 3339.
#[derive(Debug, Clone)]
pub enum TimeBound {
    Millis(i64),
    DateTime(DateTime<Utc>),
    Text(String),
}

impl TimeBound {
    fn to_unix_seconds(&self) -> Result<i64> {
        match self {
            TimeBound::Millis(ms) => Ok(ms.div_euclid(1000)),
            TimeBound::DateTime(dt) => Ok(dt.timestamp()),
            TimeBound::Text(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.timestamp())
                .map_err(|e| Error::InvalidArgument(format!("unrecognized time value '{}': {}", s, e))),
        }
    }
}

impl From<i64> for TimeBound {
    fn from(ms: i64) -> Self {
        TimeBound::Millis(ms)
    }
}

impl From<DateTime<Utc>> for TimeBound {
    fn from(dt: DateTime<Utc>) -> Self {
        TimeBound::DateTime(dt)
    }
}

impl From<&str> for TimeBound {
    fn from(s: &str) -> Self {
        TimeBound::Text(s.to_string())
    }
}

impl From<String> for TimeBound {
    fn from(s: String) -> Self {
        TimeBound::Text(s)
    }
}

/// Tractive connector
///
/// Owns the HTTP client and a single mutable session slot. The lock is never
/// held across an await; callers sharing a connector across tasks get the
/// replace-as-a-whole session lifecycle.
pub struct TractiveConnector {
    config: TractiveConfig,
    client: Client,
    session: Mutex<Option<Session>>,
}

impl TractiveConnector {
    /// Create a new Tractive connector
    pub fn new(config: TractiveConfig) -> Result<Self> {
        let client = create_client(&config.client_config)?;
        Ok(Self {
            config,
            client,
            session: Mutex::new(None),
        })
    }

    fn session_slot(&self) -> MutexGuard<'_, Option<Session>> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// True iff a session with a non-empty token is held. Pure read.
    pub fn is_authenticated(&self) -> bool {
        self.session_slot()
            .as_ref()
            .is_some_and(|s| !s.access_token.is_empty())
    }

    fn require_session(&self) -> Result<Session> {
        self.session_slot()
            .clone()
            .filter(|s| !s.access_token.is_empty())
            .ok_or(Error::NotAuthenticated)
    }

    /// Exchange credentials for a bearer token and store it as the active
    /// session. Any failure (transport, non-success status, missing token)
    /// clears the session slot before propagating as an authentication error.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Session> {
        debug!("Requesting token from the Tractive API");

        match self.request_token(email, password).await {
            Ok(session) => {
                *self.session_slot() = Some(session.clone());
                debug!(account_id = %session.account_id, "Authenticated");
                Ok(session)
            }
            Err(e) => {
                *self.session_slot() = None;
                warn!("Authentication failed: {}", e);
                Err(e)
            }
        }
    }

    async fn request_token(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .client
            .post(format!("{}/auth/token", self.config.base_url))
            .query(&[
                ("grant_type", "tractive"),
                ("platform_email", email),
                ("platform_token", password),
            ])
            .header("X-Tractive-Client", &self.config.client_id)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::Authentication(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(Error::Authentication(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Authentication(format!("malformed token response: {}", e)))?;

        match token.access_token {
            Some(access_token) if !access_token.is_empty() => Ok(Session {
                access_token,
                account_id: token.user_id.unwrap_or_default(),
            }),
            _ => Err(Error::Authentication(
                "no access token in response".to_string(),
            )),
        }
    }

    /// List the trackers on the authenticated account.
    #[instrument(skip(self))]
    pub async fn list_trackers(&self) -> Result<Vec<TrackerSummary>> {
        let session = self.require_session()?;

        let url = format!(
            "{}/user/{}/trackers",
            self.config.base_url, session.account_id
        );
        let response = self
            .authed_get(&session, url)
            .send()
            .await
            .map_err(Error::transport)?;

        read_json(response).await
    }

    /// Fetch static details for one tracker, verbatim.
    #[instrument(skip(self))]
    pub async fn get_tracker(&self, tracker_id: &str) -> Result<serde_json::Value> {
        let session = self.require_session()?;

        let url = format!("{}/tracker/{}", self.config.base_url, tracker_id);
        let response = self
            .authed_get(&session, url)
            .send()
            .await
            .map_err(Error::transport)?;

        read_json(response).await
    }

    /// Fetch the latest position report and merge in the reverse-geocoded
    /// address. A report with fewer than two coordinate components fails
    /// with `LocationUnavailable`; an address-lookup failure propagates.
    #[instrument(skip(self))]
    pub async fn get_tracker_location(&self, tracker_id: &str) -> Result<TrackerPosition> {
        let session = self.require_session()?;

        debug!("Fetching latest position report");
        let url = format!("{}/device_pos_report/{}", self.config.base_url, tracker_id);
        let response = self
            .authed_get(&session, url)
            .send()
            .await
            .map_err(Error::transport)?;

        let report: PositionRecord = read_json(response).await?;
        let coordinate = report.coordinate()?;

        let address = self.lookup_address(&session, coordinate).await?;

        Ok(TrackerPosition {
            coordinate,
            observed_at: report.time,
            address: Some(address),
        })
    }

    /// Fetch the position history between two bounds and return the first
    /// segment (empty when the window holds no segments).
    #[instrument(skip(self, from, to))]
    pub async fn get_tracker_history(
        &self,
        tracker_id: &str,
        from: impl Into<TimeBound>,
        to: impl Into<TimeBound>,
    ) -> Result<Vec<TrackerPosition>> {
        let session = self.require_session()?;

        let time_from = from.into().to_unix_seconds()?;
        let time_to = to.into().to_unix_seconds()?;
        debug!(time_from, time_to, "Fetching position history");

        let url = format!("{}/tracker/{}/positions", self.config.base_url, tracker_id);
        let response = self
            .authed_get(&session, url)
            .query(&[
                ("time_from", time_from.to_string()),
                ("time_to", time_to.to_string()),
                ("format", "json_segments".to_string()),
            ])
            .send()
            .await
            .map_err(Error::transport)?;

        let segments: Vec<Vec<PositionRecord>> = read_json(response).await?;
        let first = segments.into_iter().next().unwrap_or_default();

        first
            .into_iter()
            .map(|record| {
                let coordinate = record.coordinate()?;
                Ok(TrackerPosition {
                    coordinate,
                    observed_at: record.time,
                    address: None,
                })
            })
            .collect()
    }

    /// Fetch the latest hardware report (battery, firmware), verbatim.
    #[instrument(skip(self))]
    pub async fn get_tracker_hardware(&self, tracker_id: &str) -> Result<serde_json::Value> {
        let session = self.require_session()?;

        let url = format!("{}/device_hw_report/{}", self.config.base_url, tracker_id);
        let response = self
            .authed_get(&session, url)
            .send()
            .await
            .map_err(Error::transport)?;

        read_json(response).await
    }

    async fn lookup_address(
        &self,
        session: &Session,
        coordinate: Coordinate,
    ) -> Result<serde_json::Value> {
        debug!("Reverse-geocoding position");
        let url = format!("{}/platform/geo/address/location", self.config.base_url);
        let response = self
            .authed_get(session, url)
            .query(&[
                ("latitude", coordinate.latitude),
                ("longitude", coordinate.longitude),
            ])
            .send()
            .await
            .map_err(Error::transport)?;

        read_json(response).await
    }

    fn authed_get(&self, session: &Session, url: String) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("X-Tractive-Client", &self.config.client_id)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .header("Content-Type", "application/json")
    }
}

/// Token endpoint response body
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    user_id: Option<String>,
}

/// One upstream position record: `latlong` pair plus unix-seconds time.
/// Shared by the latest-position report and history segment entries.
#[derive(Debug, Default, Deserialize)]
struct PositionRecord {
    #[serde(default)]
    latlong: Vec<f64>,

    #[serde(default)]
    time: i64,
}

impl PositionRecord {
    fn coordinate(&self) -> Result<Coordinate> {
        if self.latlong.len() < 2 {
            return Err(Error::LocationUnavailable(format!(
                "expected a coordinate pair, got {} components",
                self.latlong.len()
            )));
        }
        Ok(Coordinate::new(self.latlong[0], self.latlong[1]))
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());
        return Err(Error::Api {
            status_code: status.as_u16(),
            message,
        });
    }

    let bytes = response.bytes().await.map_err(Error::transport)?;
    serde_json::from_slice(&bytes).map_err(Error::from)
}
