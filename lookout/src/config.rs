use std::time::Duration;

/// Defaults applied to every wait created by an [`EventWaiter`](crate::EventWaiter).
///
/// Individual waits can override both settings through
/// [`WaitRequest::within`](crate::WaitRequest::within) and
/// [`WaitRequest::strict_length`](crate::WaitRequest::strict_length).
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use lookout::Config;
///
/// let config = Config::default()
///     .with_default_time_limit(Duration::from_secs(2))   // fail faster
///     .with_strict_length(true);                         // exact sequence sizes
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// How long a wait stays subscribed before failing with a timeout.
    /// Default: 5s
    default_time_limit: Duration,

    /// Whether sequences and keyed maps must have exactly the length of the spec.
    /// Records are never affected.
    /// Default: false
    strict_length: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_time_limit: Duration::from_secs(5),
            strict_length: false,
        }
    }
}

impl Config {
    /// Set the time limit used when a wait does not call `within`.
    pub fn with_default_time_limit(mut self, limit: Duration) -> Self {
        self.default_time_limit = limit;
        self
    }

    /// Returns the time limit used when a wait does not call `within`.
    pub fn default_time_limit(&self) -> Duration {
        self.default_time_limit
    }

    /// Set the default strict-length mode.
    ///
    /// When enabled, `[1, 2, 3]` no longer matches the spec `[1, 2]`.
    pub fn with_strict_length(mut self, strict: bool) -> Self {
        self.strict_length = strict;
        self
    }

    /// Returns the default strict-length mode.
    pub fn strict_length(&self) -> bool {
        self.strict_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = Config::default()
            .with_default_time_limit(Duration::from_millis(250))
            .with_strict_length(true);
        assert_eq!(config.default_time_limit(), Duration::from_millis(250));
        assert!(config.strict_length());
        assert_ne!(config, Config::default());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = Config::default().with_strict_length(true);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
