use crate::{Config, Error};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::{
    convert::TryFrom,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

pub(crate) const REQUEST_ID_HEADER: &str = "fn-request-id";
pub(crate) const DEADLINE_HEADER: &str = "fn-deadline-ms";
pub(crate) const FUNCTION_ID_HEADER: &str = "fn-invoked-function-id";

/// The input record handed to a function: string keys mapped to arbitrary JSON values.
pub type InvocationInput = serde_json::Map<String, serde_json::Value>;

/// Error payload reported to the runtime API when an invocation fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// A short name for the kind of failure.
    pub error_type: String,
    /// The failure rendered for humans.
    pub error_message: String,
}

/// The per-invocation metadata the host sends alongside each event.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Context {
    /// The request id assigned by the host. Results are posted back under it.
    pub request_id: String,
    /// The execution deadline for the current invocation in milliseconds since the epoch.
    pub deadline: u64,
    /// The identifier of the function being invoked, if the host sends one.
    pub invoked_function_id: String,
    /// Runtime configuration the invocation is running under.
    pub env_config: Config,
}

impl Context {
    /// Attach the runtime configuration.
    pub fn with_config(self, config: &Config) -> Self {
        Self {
            env_config: config.clone(),
            ..self
        }
    }

    /// The deadline as a `SystemTime`.
    pub fn deadline(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.deadline)
    }
}

impl TryFrom<HeaderMap> for Context {
    type Error = Error;

    fn try_from(headers: HeaderMap) -> Result<Self, Self::Error> {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .ok_or_else(|| format!("missing {} header", REQUEST_ID_HEADER))?
            .to_str()?
            .to_owned();
        let deadline = headers
            .get(DEADLINE_HEADER)
            .ok_or_else(|| format!("missing {} header", DEADLINE_HEADER))?
            .to_str()?
            .parse::<u64>()?;
        let invoked_function_id = match headers.get(FUNCTION_ID_HEADER) {
            Some(value) => value.to_str()?.to_owned(),
            None => String::new(),
        };

        Ok(Context {
            request_id,
            deadline,
            invoked_function_id,
            ..Default::default()
        })
    }
}
