//! Platform context: the request root and the theme-editor design-mode flag.

use std::env;

use thiserror::Error;
use tracing::debug;

use crate::api::CartApi;
use crate::transport::Transport;

pub const ROOT_URL_VAR: &str = "STOREFRONT_ROOT_URL";
pub const DESIGN_MODE_VAR: &str = "STOREFRONT_DESIGN_MODE";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// What the storefront platform provides to client code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    pub root_url: String,
    pub design_mode: bool,
}

/// Theme editor notification that a section was (re)loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLoad {
    pub section_id: String,
}

impl PlatformConfig {
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            design_mode: false,
        }
    }

    pub fn with_design_mode(mut self, design_mode: bool) -> Self {
        self.design_mode = design_mode;
        self
    }

    /// Read `STOREFRONT_ROOT_URL` (required) and `STOREFRONT_DESIGN_MODE` (optional).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let root_url = lookup(ROOT_URL_VAR).ok_or(ConfigError::Missing(ROOT_URL_VAR))?;
        if !(root_url.starts_with("http://") || root_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: ROOT_URL_VAR,
                value: root_url,
                reason: "expected an absolute http(s) URL",
            });
        }
        let design_mode = match lookup(DESIGN_MODE_VAR) {
            None => false,
            Some(value) => parse_flag(&value).ok_or(ConfigError::Invalid {
                var: DESIGN_MODE_VAR,
                value,
                reason: "expected one of 1, 0, true, false, yes, no",
            })?,
        };
        Ok(Self { root_url, design_mode })
    }

    pub fn cart_api<T: Transport>(&self, transport: T) -> CartApi<T> {
        CartApi::new(&self.root_url, transport)
    }

    /// Only accepted in design mode. Nothing beyond logging happens on reload.
    pub fn handle_section_load(&self, event: &SectionLoad) -> bool {
        if !self.design_mode {
            return false;
        }
        debug!(section_id = %event.section_id, "theme editor reloaded section");
        true
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" | "" => Some(false),
        _ => None,
    }
}
