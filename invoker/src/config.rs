use crate::Error;
use std::env;

const RUNTIME_API: &str = "FN_RUNTIME_API";
const FUNCTION_NAME: &str = "FN_FUNCTION_NAME";
const FUNCTION_VERSION: &str = "FN_FUNCTION_VERSION";
const DEFAULT_VERSION: &str = "$LATEST";

/// Configuration derived from environment variables.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Config {
    /// The host and port of the runtime API.
    pub endpoint: String,
    /// The name of the function.
    pub function_name: String,
    /// The version of the function being executed.
    pub version: String,
}

impl Config {
    /// Attempts to read configuration from environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup(RUNTIME_API).ok_or_else(|| format!("{} is not set", RUNTIME_API))?;
        Ok(Config {
            endpoint,
            function_name: lookup(FUNCTION_NAME).unwrap_or_default(),
            version: lookup(FUNCTION_VERSION).unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        })
    }
}
