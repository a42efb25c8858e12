use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use tracing::{info, warn};

use crate::engine::EngineConfig;
use crate::types::MAX_SPAN_DAYS;
use crate::waste::ManifestSettings;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub engine: EngineSettings,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            engine: EngineSettings::from_env(),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;
    const HOST_VAR: &'static str = "STOWAGE_API_HOST";
    const PORT_VAR: &'static str = "STOWAGE_API_PORT";

    fn from_env() -> Self {
        Self::from_values(env_string(Self::HOST_VAR), env_string(Self::PORT_VAR))
    }

    fn from_values(host: Option<String>, port: Option<String>) -> Self {
        let host_value = host.unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, display_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                warn!(
                    "⚠️ Could not parse {} ('{}'): {}. Using {}.",
                    Self::HOST_VAR,
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = match port {
            Some(raw) => match raw.parse::<u16>() {
                Ok(value) if value != 0 => value,
                Ok(_) => {
                    warn!(
                        "⚠️ {} must not be 0. Using {}.",
                        Self::PORT_VAR,
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
                Err(err) => {
                    warn!(
                        "⚠️ Could not parse {} ('{}'): {}. Using {}.",
                        Self::PORT_VAR,
                        raw,
                        err,
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
            },
            None => Self::DEFAULT_PORT,
        };

        Self {
            bind_ip,
            display_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_values(None, None)
    }
}

/// Engine tunables read from the environment.
#[derive(Clone, Debug, Default)]
pub struct EngineSettings {
    engine: EngineConfig,
}

impl EngineSettings {
    const EXPIRING_THRESHOLD_VAR: &'static str = "STOWAGE_EXPIRING_THRESHOLD_DAYS";
    const USAGE_PROBABILITY_VAR: &'static str = "STOWAGE_USAGE_PROBABILITY_PER_DAY";
    const STAGING_LOCATION_VAR: &'static str = "STOWAGE_STAGING_LOCATION";
    const RETURN_VEHICLE_VAR: &'static str = "STOWAGE_RETURN_VEHICLE";
    const RETURN_LEAD_DAYS_VAR: &'static str = "STOWAGE_RETURN_LEAD_DAYS";
    const SIMULATION_SEED_VAR: &'static str = "STOWAGE_SIMULATION_SEED";

    fn from_env() -> Self {
        let expiring_threshold_days = load_with_warning(
            Self::EXPIRING_THRESHOLD_VAR,
            EngineConfig::DEFAULT_EXPIRING_THRESHOLD_DAYS,
            is_span_days,
            SPAN_DAYS_HINT,
        );

        let usage_probability_per_day = load_f64_with_warning(
            Self::USAGE_PROBABILITY_VAR,
            EngineConfig::DEFAULT_USAGE_PROBABILITY_PER_DAY,
            |value| (0.0..=1.0).contains(&value),
            "must be between 0 and 1",
            "Adjusted usage probability changes how fast simulated stock is consumed",
        );

        let return_lead_days = load_with_warning(
            Self::RETURN_LEAD_DAYS_VAR,
            ManifestSettings::DEFAULT_RETURN_LEAD_DAYS,
            is_span_days,
            SPAN_DAYS_HINT,
        );

        let simulation_seed = load_optional_with_warning::<u64>(Self::SIMULATION_SEED_VAR);
        if let Some(seed) = simulation_seed {
            info!("🎲 Lifecycle simulation uses fixed seed {}", seed);
        }

        let mut builder = EngineConfig::builder()
            .expiring_threshold_days(expiring_threshold_days)
            .usage_probability_per_day(usage_probability_per_day)
            .return_lead_days(return_lead_days)
            .simulation_seed(simulation_seed);
        if let Some(location) = env_string(Self::STAGING_LOCATION_VAR) {
            builder = builder.staging_location(location);
        }
        if let Some(vehicle) = env_string(Self::RETURN_VEHICLE_VAR) {
            builder = builder.return_vehicle(vehicle);
        }

        Self {
            engine: builder.build(),
        }
    }

    /// Returns the configured EngineConfig.
    pub fn engine_config(&self) -> EngineConfig {
        self.engine.clone()
    }
}

const SPAN_DAYS_HINT: &str = "must be between 0 and 36500";

fn is_span_days(days: i64) -> bool {
    (0..=MAX_SPAN_DAYS).contains(&days)
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!("⚠️ Access to {} failed: {}. Using default value.", name, err);
            None
        }
    }
}

/// Parses a raw value, falling back to `default` when it is malformed or rejected.
fn parse_or_default<T>(
    var_name: &str,
    raw: Option<&str>,
    default: T,
    validator: impl Fn(T) -> bool,
    invalid_hint: &str,
) -> T
where
    T: FromStr + Copy + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(value) if validator(value) => value,
        Ok(_) => {
            warn!(
                "⚠️ {} contains invalid value '{}': {}. Using {}.",
                var_name, raw, invalid_hint, default
            );
            default
        }
        Err(err) => {
            warn!(
                "⚠️ Could not parse {} ('{}') as number: {}. Using {}.",
                var_name, raw, err, default
            );
            default
        }
    }
}

fn load_with_warning<T>(
    var_name: &str,
    default: T,
    validator: impl Fn(T) -> bool,
    invalid_hint: &str,
) -> T
where
    T: FromStr + Copy + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    parse_or_default(
        var_name,
        env_string(var_name).as_deref(),
        default,
        validator,
        invalid_hint,
    )
}

fn load_f64_with_warning(
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    notice: &str,
) -> f64 {
    let value = load_with_warning(var_name, default, validator, invalid_hint);
    let tolerance = (default.abs().max(1.0)) * 1e-9;
    if (value - default).abs() > tolerance {
        info!("⚠️ {} ({} = {}).", notice, var_name, value);
    }
    value
}

fn load_optional_with_warning<T>(var_name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env_string(var_name)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                "⚠️ Could not parse {} ('{}'): {}. Ignoring it.",
                var_name, raw, err
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_defaults() {
        let api = ApiConfig::default();
        assert_eq!(api.port(), 8080);
        assert_eq!(api.display_host(), "0.0.0.0");
        assert!(api.binds_to_all_interfaces());
    }

    #[test]
    fn test_api_invalid_values_fall_back() {
        let api = ApiConfig::from_values(Some("not-an-ip".into()), Some("0".into()));
        assert_eq!(api.display_host(), "0.0.0.0");
        assert_eq!(api.port(), 8080);

        let api = ApiConfig::from_values(Some("127.0.0.1".into()), Some("99999".into()));
        assert_eq!(api.port(), 8080);
        assert!(!api.binds_to_all_interfaces());
    }

    #[test]
    fn test_api_explicit_values() {
        let api = ApiConfig::from_values(Some("127.0.0.1".into()), Some("3000".into()));
        assert_eq!(api.socket_addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_parse_accepts_valid_numbers() {
        assert_eq!(parse_or_default("X", Some("7"), 14i64, |d| d >= 0, "hint"), 7);
        assert_eq!(parse_or_default("X", Some("0.25"), 0.1f64, |p| p <= 1.0, "hint"), 0.25);
        assert_eq!(parse_or_default("X", None, 14i64, |d| d >= 0, "hint"), 14);
    }

    #[test]
    fn test_parse_rejects_out_of_range_and_garbage() {
        assert_eq!(parse_or_default("X", Some("-3"), 14i64, |d| d >= 0, "hint"), 14);
        assert_eq!(parse_or_default("X", Some("abc"), 14i64, |d| d >= 0, "hint"), 14);
        assert_eq!(
            parse_or_default("X", Some("1.5"), 0.1f64, |p| (0.0..=1.0).contains(&p), "hint"),
            0.1
        );
    }

    #[test]
    fn test_day_spans_are_bounded() {
        assert_eq!(parse_or_default("X", Some("36500"), 30i64, is_span_days, SPAN_DAYS_HINT), 36500);
        assert_eq!(parse_or_default("X", Some("36501"), 30i64, is_span_days, SPAN_DAYS_HINT), 30);
        assert_eq!(
            parse_or_default("X", Some("200000000"), 14i64, is_span_days, SPAN_DAYS_HINT),
            14
        );
        assert_eq!(SPAN_DAYS_HINT, format!("must be between 0 and {}", MAX_SPAN_DAYS));
    }

    #[test]
    fn test_engine_settings_default_matches_engine_default() {
        let settings = EngineSettings::default().engine_config();
        assert_eq!(settings.expiring_threshold_days, 14);
        assert_eq!(settings.staging_location, "Temporary Storage");
        assert_eq!(settings.manifest.return_vehicle, "Progress MS-23");
        assert!(settings.simulation_seed.is_none());
    }
}
