// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tally::PresentationConfig;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/rag";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DOWNLOAD_DIR: &str = ".";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub download_dir: PathBuf,
    pub presentation: PresentationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            presentation: PresentationConfig::default(),
        }
    }
}

/// Command-line values. Each one replaces its environment variable, which is then not read.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub download_dir: Option<PathBuf>,
    pub locale: Option<String>,
}

impl AppConfig {
    pub fn from_env(overrides: &ConfigOverrides) -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        overrides: &ConfigOverrides,
    ) -> Result<Self> {
        let mut config = Self::default();
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = overrides.endpoint.clone().or_else(|| env("ANALYTICS_ENDPOINT")) {
            config.endpoint = endpoint.trim().to_string();
        }
        match (overrides.timeout_secs, env("ANALYTICS_TIMEOUT_SECS")) {
            (Some(secs), _) => config.timeout = Duration::from_secs(secs),
            (None, Some(raw)) => {
                let secs: u64 = raw.trim().parse().with_context(|| {
                    format!("ANALYTICS_TIMEOUT_SECS must be a whole number, got '{raw}'")
                })?;
                config.timeout = Duration::from_secs(secs);
            }
            (None, None) => {}
        }
        if let Some(dir) = overrides
            .download_dir
            .clone()
            .or_else(|| env("ANALYTICS_DOWNLOAD_DIR").map(PathBuf::from))
        {
            config.download_dir = dir;
        }
        if let Some(locale) = overrides.locale.clone().or_else(|| env("ANALYTICS_LOCALE")) {
            config.presentation = PresentationConfig::for_locale(&locale);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            bail!("endpoint must be an http(s) URL, got '{}'", self.endpoint);
        }
        if self.timeout.is_zero() {
            bail!("timeout must be greater than zero");
        }
        self.presentation.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[]), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.endpoint, "http://localhost:8080/rag");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.download_dir, PathBuf::from("."));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ANALYTICS_ENDPOINT", "https://analytics.internal/rag"),
            ("ANALYTICS_TIMEOUT_SECS", "5"),
            ("ANALYTICS_DOWNLOAD_DIR", "/tmp/exports"),
            ("ANALYTICS_LOCALE", "de-DE"),
        ]), &ConfigOverrides::default())
        .unwrap();
        assert_eq!(config.endpoint, "https://analytics.internal/rag");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.download_dir, PathBuf::from("/tmp/exports"));
        assert_eq!(config.presentation.currency.group_separator, ".");
    }

    #[test]
    fn test_rejects_bad_values() {
        let none = ConfigOverrides::default();
        assert!(AppConfig::from_lookup(lookup(&[("ANALYTICS_TIMEOUT_SECS", "soon")]), &none).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("ANALYTICS_TIMEOUT_SECS", "0")]), &none).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("ANALYTICS_ENDPOINT", "localhost:8080")]), &none).is_err());
    }

    #[test]
    fn test_flags_replace_bad_environment_values() {
        let env = lookup(&[
            ("ANALYTICS_ENDPOINT", "localhost:8080"),
            ("ANALYTICS_TIMEOUT_SECS", "soon"),
            ("ANALYTICS_DOWNLOAD_DIR", "/tmp/env"),
            ("ANALYTICS_LOCALE", "de-DE"),
        ]);
        let overrides = ConfigOverrides {
            endpoint: Some("http://127.0.0.1:8080/rag".into()),
            timeout_secs: Some(7),
            download_dir: Some(PathBuf::from("/tmp/flag")),
            locale: Some("fr-FR".into()),
        };
        let config = AppConfig::from_lookup(env, &overrides).unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:8080/rag");
        assert_eq!(config.timeout, Duration::from_secs(7));
        assert_eq!(config.download_dir, PathBuf::from("/tmp/flag"));
        assert_eq!(config.presentation.currency.symbol, "$US");
    }

    #[test]
    fn test_bad_flag_is_still_rejected() {
        let overrides = ConfigOverrides {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(AppConfig::from_lookup(lookup(&[]), &overrides).is_err());
    }
}
