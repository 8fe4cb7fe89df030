//! Defines the [SigningConfig] struct, the tunable settings of the signing engine.
//!
//! Settings are layered with `figment`: built-in defaults first, then an optional TOML file,
//! then environment variables prefixed with `ESIGN_` (later sources take precedence).

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::SigningResult;
use crate::signing::field::checkbox::CheckboxCompletion;

const ENV_PREFIX: &str = "ESIGN_";

/// Settings shared by every component of the signing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Base URL of the platform API, without a trailing slash, e.g. `https://app.example.com/api`.
    pub api_base_url: String,

    /// Restricts the signer's document list to a single fund when set.
    pub fund_id: Option<String>,

    /// Largest accepted signature upload, in bytes.
    pub max_upload_bytes: usize,

    /// Smallest page zoom factor.
    pub min_scale: f32,

    /// Largest page zoom factor.
    pub max_scale: f32,

    /// Increment applied by a single zoom step.
    pub scale_step: f32,

    /// `chrono` format string used to render DATE_SIGNED values in the signer's locale.
    pub date_format: String,

    /// Completion rule applied to CHECKBOX fields that do not set their own.
    pub checkbox_completion: CheckboxCompletion,

    /// HTTP request timeout in seconds. `None` leaves requests unbounded.
    pub request_timeout_secs: Option<u64>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            fund_id: None,
            max_upload_bytes: 5 * 1024 * 1024,
            min_scale: 0.5,
            max_scale: 2.0,
            scale_step: 0.25,
            date_format: "%m/%d/%Y".to_string(),
            checkbox_completion: CheckboxCompletion::Checked,
            request_timeout_secs: None,
        }
    }
}

impl SigningConfig {
    /// Loads configuration from defaults, the optional TOML file at `path` and `ESIGN_*`
    /// environment variables, in that order.
    pub fn load(path: Option<&Path>) -> SigningResult<Self> {
        let mut figment = Figment::from(Serialized::defaults(SigningConfig::default()));

        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }

        let config: SigningConfig = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;

        Ok(config.normalized())
    }

    /// Returns `scale` clamped to the configured zoom bounds.
    #[inline]
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_scale, self.max_scale)
    }

    fn normalized(mut self) -> Self {
        if self.min_scale > self.max_scale {
            std::mem::swap(&mut self.min_scale, &mut self.max_scale);
        }

        while self.api_base_url.ends_with('/') {
            self.api_base_url.pop();
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_sources() {
        let config = SigningConfig::load(None).unwrap();

        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.checkbox_completion, CheckboxCompletion::Checked);
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            api_base_url = "https://funds.example.com/api/"
            fund_id = "fund_42"
            max_scale = 3.0
            checkbox_completion = "touched"
            "#
        )
        .unwrap();

        let config = SigningConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.api_base_url, "https://funds.example.com/api");
        assert_eq!(config.fund_id.as_deref(), Some("fund_42"));
        assert_eq!(config.max_scale, 3.0);
        assert_eq!(config.checkbox_completion, CheckboxCompletion::Touched);
        assert_eq!(config.min_scale, 0.5);
    }

    #[test]
    fn test_clamp_scale() {
        let config = SigningConfig::default();

        assert_eq!(config.clamp_scale(0.1), 0.5);
        assert_eq!(config.clamp_scale(1.25), 1.25);
        assert_eq!(config.clamp_scale(9.0), 2.0);
    }
}
