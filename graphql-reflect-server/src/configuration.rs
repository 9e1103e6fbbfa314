//! Server configuration, usually loaded from YAML.
//!
//! ```yaml
//! packages:
//!   - shop::model
//! endpoint: graphql
//! subscriptions:
//!   endpoint: subscriptions
//!   keep_alive_interval: 5s
//! federation:
//!   enabled: true
//! ```

use std::str::FromStr;
use std::time::Duration;

use displaydoc::Display;
use schemars::JsonSchema;
use schemars::schema::RootSchema;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

const DEFAULT_ENDPOINT: &str = "graphql";
const DEFAULT_SUBSCRIPTIONS_ENDPOINT: &str = "subscriptions";

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_subscriptions_endpoint() -> String {
    DEFAULT_SUBSCRIPTIONS_ENDPOINT.to_string()
}

/// Configuration error.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// could not parse configuration: {0}
    Parse(serde_yaml::Error),
    /// {message}: {error}
    InvalidConfiguration {
        message: &'static str,
        error: String,
    },
}

/// The configuration of a GraphQL server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Configuration {
    /// Qualified name prefixes of the classes the schema may be generated from.
    /// Every registered class is allowed when empty.
    pub packages: Vec<String>,

    /// Path of the endpoint serving queries and mutations; defaults to `graphql`
    #[serde(default = "default_endpoint")]
    #[schemars(default = "default_endpoint")]
    pub endpoint: String,

    /// Subscriptions over the `graphql-ws` protocol
    pub subscriptions: Subscriptions,

    /// Apollo Federation support
    pub federation: Federation,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            packages: Vec::new(),
            endpoint: default_endpoint(),
            subscriptions: Subscriptions::default(),
            federation: Federation::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Subscriptions {
    /// Path of the subscriptions endpoint; defaults to `subscriptions`
    #[serde(default = "default_subscriptions_endpoint")]
    #[schemars(default = "default_subscriptions_endpoint")]
    pub endpoint: String,

    /// Interval between keep-alive messages, in human-readable format (e.g. `5s`).
    /// No keep-alive message is sent when unset.
    #[serde(with = "humantime_serde")]
    #[schemars(with = "Option<String>")]
    pub keep_alive_interval: Option<Duration>,
}

impl Default for Subscriptions {
    fn default() -> Self {
        Subscriptions {
            endpoint: default_subscriptions_endpoint(),
            keep_alive_interval: None,
        }
    }
}

impl Subscriptions {
    /// The keep-alive interval, if keep-alive messages are enabled.
    pub fn keep_alive(&self) -> Option<Duration> {
        self.keep_alive_interval
            .filter(|interval| !interval.is_zero())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Federation {
    /// Generates a federated schema, exposing `_service` and `_entities`
    pub enabled: bool,
}

impl Configuration {
    /// Parses and validates a YAML configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigurationError> {
        let configuration: Configuration =
            serde_yaml::from_str(yaml).map_err(ConfigurationError::Parse)?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "invalid endpoint",
                error: "the endpoint must not be empty".to_string(),
            });
        }
        if self.subscriptions.endpoint.trim().is_empty() {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "invalid subscriptions endpoint",
                error: "the endpoint must not be empty".to_string(),
            });
        }
        if self.endpoint == self.subscriptions.endpoint {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "invalid subscriptions endpoint",
                error: format!(
                    "'{}' is already the endpoint of queries and mutations",
                    self.endpoint
                ),
            });
        }
        Ok(())
    }

    /// The JSON schema of the configuration, for editor support.
    pub fn json_schema() -> RootSchema {
        schemars::schema_for!(Configuration)
    }
}

/// Parse configuration from a string in YAML syntax
impl FromStr for Configuration {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Configuration::from_yaml(s)
    }
}
