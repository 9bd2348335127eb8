//! # xcb-cli: Operator CLI for the Cross-Consensus Bridge
//!
//! Provides the `xcb` command-line interface. Every command line is parsed
//! into one [`operation::Operation`] and executed by a single dispatch
//! function against one immutable [`BridgeConfig`].
//!
//! ## Commands
//!
//! - `xcb accounts`: print or verify the published-account table.
//! - `xcb reward-account`: derive one reward pot.
//! - `xcb init-bridge a-to-b|b-to-a`: initialize one direction.
//! - `xcb init-both`: initialize both directions concurrently.
//! - `xcb run-relay`: bootstrap what is missing, then supervise the relay.
//! - `xcb status`: report the bootstrap phase observed on chain.
//!
//! ```bash
//! xcb accounts --check config/pins.rococo-wococo.yaml
//! xcb --config config/bridge.rococo-wococo.yaml -v run-relay
//! ```

pub mod accounts;
pub mod bootstrap;
pub mod operation;

use std::path::Path;

use anyhow::{Context, Result};
use xcb_core::BridgeConfig;

/// Load the bridge configuration, or the local Rococo/Wococo defaults when
/// no file is given.
pub fn load_config(path: Option<&Path>) -> Result<BridgeConfig> {
    match path {
        Some(path) => {
            let config = BridgeConfig::load(path)
                .with_context(|| format!("loading bridge configuration from {}", path.display()))?;
            tracing::debug!(path = %path.display(), lane = %config.lane, "loaded configuration");
            Ok(config)
        }
        None => {
            tracing::debug!("no configuration file given, using local rococo/wococo defaults");
            Ok(BridgeConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        assert_eq!(load_config(None).unwrap(), BridgeConfig::default());
    }

    #[test]
    fn load_reports_path() {
        let err = load_config(Some(Path::new("/nonexistent/bridge.yaml"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/bridge.yaml"));
    }

    #[test]
    fn load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.yaml");
        std::fs::write(&path, "max_resubmissions: 0\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
