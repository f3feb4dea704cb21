//! Homeward Evaluator
//!
//! Runs one complete "where is the pet" query: authenticate, fetch the
//! tracker's current position, compute the great-circle distance to the home
//! coordinate, and classify home vs away.

use homeward_core::{
    geo::haversine_distance_meters,
    types::{Coordinate, LocationReport, HOME_RADIUS_METERS},
    Error, Result,
};
use homeward_egress::TractiveConnector;
use tracing::{debug, instrument};

/// Settings one evaluation needs: credentials, the tracker to query, and the
/// home coordinate.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub email: String,
    pub password: String,
    pub tracker_id: String,
    pub home: Coordinate,
}

impl EvalConfig {
    /// Read the evaluation settings from the environment.
    ///
    /// Required variables: `TRACTIVE_EMAIL`, `TRACTIVE_PASSWORD`,
    /// `TRACKER_ID`, `HOME_LATITUDE`, `HOME_LONGITUDE`. A missing, empty, or
    /// unparseable variable fails with a `Config` error naming it.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            email: require_env("TRACTIVE_EMAIL")?,
            password: require_env("TRACTIVE_PASSWORD")?,
            tracker_id: require_env("TRACKER_ID")?,
            home: Coordinate::new(
                require_env_f64("HOME_LATITUDE")?,
                require_env_f64("HOME_LONGITUDE")?,
            ),
        })
    }

    /// Reject configs with empty or non-finite required fields.
    pub fn validate(&self) -> Result<()> {
        if self.email.is_empty() {
            return Err(Error::Config("TRACTIVE_EMAIL".to_string()));
        }
        if self.password.is_empty() {
            return Err(Error::Config("TRACTIVE_PASSWORD".to_string()));
        }
        if self.tracker_id.is_empty() {
            return Err(Error::Config("TRACKER_ID".to_string()));
        }
        if !self.home.latitude.is_finite() {
            return Err(Error::Config("HOME_LATITUDE".to_string()));
        }
        if !self.home.longitude.is_finite() {
            return Err(Error::Config("HOME_LONGITUDE".to_string()));
        }
        Ok(())
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Config(name.to_string())),
    }
}

fn require_env_f64(name: &str) -> Result<f64> {
    require_env(name)?
        .parse::<f64>()
        .map_err(|_| Error::Config(name.to_string()))
}

/// Run one end-to-end evaluation and classify the result.
///
/// Authentication and location failures propagate with their original error
/// kind; nothing is retried.
#[instrument(skip(connector, config), fields(tracker_id = %config.tracker_id))]
pub async fn evaluate(
    connector: &TractiveConnector,
    config: &EvalConfig,
) -> Result<LocationReport> {
    config.validate()?;

    connector
        .authenticate(&config.email, &config.password)
        .await?;

    if !connector.is_authenticated() {
        return Err(Error::Authentication(
            "no session after token exchange".to_string(),
        ));
    }

    let position = connector.get_tracker_location(&config.tracker_id).await?;

    let distance_meters = haversine_distance_meters(config.home, position.coordinate);
    let is_home = distance_meters < HOME_RADIUS_METERS;

    debug!(distance_meters, is_home, "Evaluated tracker position");

    Ok(LocationReport {
        distance_meters,
        is_home,
        coordinate: position.coordinate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn valid_config() -> EvalConfig {
        EvalConfig {
            email: "pet@example.com".to_string(),
            password: "hunter2".to_string(),
            tracker_id: "ZLHQOVQA".to_string(),
            home: Coordinate::new(53.839425, 11.993049),
        }
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_names_the_missing_field() {
        let mut config = valid_config();
        config.tracker_id.clear();

        let err = config.validate().unwrap_err();
        match err {
            Error::Config(field) => assert_eq!(field, "TRACKER_ID"),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_non_finite_home() {
        let mut config = valid_config();
        config.home.latitude = f64::NAN;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    fn set_full_env() {
        std::env::set_var("TRACTIVE_EMAIL", "pet@example.com");
        std::env::set_var("TRACTIVE_PASSWORD", "hunter2");
        std::env::set_var("TRACKER_ID", "ZLHQOVQA");
        std::env::set_var("HOME_LATITUDE", "53.839425");
        std::env::set_var("HOME_LONGITUDE", "11.993049");
    }

    fn clear_env() {
        for name in [
            "TRACTIVE_EMAIL",
            "TRACTIVE_PASSWORD",
            "TRACKER_ID",
            "HOME_LATITUDE",
            "HOME_LONGITUDE",
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_reads_all_variables() {
        set_full_env();

        let config = EvalConfig::from_env().unwrap();
        assert_eq!(config.email, "pet@example.com");
        assert_eq!(config.tracker_id, "ZLHQOVQA");
        assert_eq!(config.home.latitude, 53.839425);
        assert_eq!(config.home.longitude, 11.993049);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_names_the_missing_variable() {
        set_full_env();
        std::env::remove_var("TRACKER_ID");

        let err = EvalConfig::from_env().unwrap_err();
        match err {
            Error::Config(field) => assert_eq!(field, "TRACKER_ID"),
            other => panic!("expected Config error, got {:?}", other),
        }

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_unparseable_latitude() {
        set_full_env();
        std::env::set_var("HOME_LATITUDE", "north-ish");

        let err = EvalConfig::from_env().unwrap_err();
        match err {
            Error::Config(field) => assert_eq!(field, "HOME_LATITUDE"),
            other => panic!("expected Config error, got {:?}", other),
        }

        clear_env();
    }
}
