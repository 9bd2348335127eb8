//! # Relayer Process Driver
//!
//! Implements [`RelayProcess`] by shelling out to a `substrate-relay`
//! compatible binary. The binary owns the signing keys and the transaction
//! pipeline; this module only builds its command lines and supervises the
//! long-running relay child.
//!
//! ## Commands
//!
//! - `init-bridge <source>-to-bridge-hub-<target>`: registers the source
//!   relay chain's current finality state with the target bridge hub. A
//!   rejection mentioning `AlreadyInitialized` is reported as
//!   [`SubmitOutcome::AlreadyInitialized`], not as a failure.
//! - `relay-headers-and-messages bridge-hub-<a>-bridge-hub-<b>`: the
//!   steady-state relay for both directions on one lane.

use std::process::{Child, Command, Stdio};

use parking_lot::Mutex;
use xcb_core::{BridgeConfig, Side, SideConfig, VersionMode};
use xcb_state::{CollaboratorError, Direction, RelayProcess, SubmitOutcome};

use crate::error::ClientError;

const ALREADY_INITIALIZED: &str = "AlreadyInitialized";
const COLLABORATOR: &str = "relay";

/// Drives the relayer binary named in the bridge configuration.
#[derive(Debug)]
pub struct SubstrateRelay {
    binary: String,
    config: BridgeConfig,
    child: Mutex<Option<Child>>,
}

impl SubstrateRelay {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            binary: config.relay_binary.clone(),
            config,
            child: Mutex::new(None),
        }
    }

    /// Override the binary from the configuration.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn spawn_error(&self, source: std::io::Error) -> CollaboratorError {
        ClientError::Spawn {
            binary: self.binary.clone(),
            source,
        }
        .into_collaborator(COLLABORATOR)
    }
}

impl RelayProcess for SubstrateRelay {
    fn init_bridge(&self, direction: Direction) -> Result<SubmitOutcome, CollaboratorError> {
        let args = init_bridge_args(&self.config, direction);
        tracing::info!(binary = %self.binary, %direction, command = %args[1], "submitting bridge initialization");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if output.status.success() {
            return Ok(SubmitOutcome::Submitted);
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.contains(ALREADY_INITIALIZED) {
            tracing::info!(%direction, "target reports the bridge is already initialized");
            return Ok(SubmitOutcome::AlreadyInitialized);
        }
        Err(ClientError::Relayer {
            command: args[..2].join(" "),
            status: output.status.to_string(),
            stderr,
        }
        .into_collaborator(COLLABORATOR))
    }

    fn start_relay(&self) -> Result<(), CollaboratorError> {
        let mut slot = self.child.lock();
        if let Some(child) = slot.as_mut() {
            if matches!(child.try_wait(), Ok(None)) {
                tracing::debug!(pid = child.id(), "relay already running");
                return Ok(());
            }
        }

        let args = relay_args(&self.config);
        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;
        tracing::info!(binary = %self.binary, pid = child.id(), command = %args[1], "relay started");
        *slot = Some(child);
        Ok(())
    }

    fn stop_relay(&self) -> Result<(), CollaboratorError> {
        let Some(mut child) = self.child.lock().take() else {
            return Ok(());
        };
        if matches!(child.try_wait(), Ok(None)) {
            child.kill().map_err(|e| self.spawn_error(e))?;
        }
        let status = child.wait().map_err(|e| self.spawn_error(e))?;
        tracing::info!(pid = child.id(), %status, "relay stopped");
        Ok(())
    }

    fn is_running(&self) -> Result<bool, CollaboratorError> {
        let mut slot = self.child.lock();
        let Some(child) = slot.as_mut() else {
            return Ok(false);
        };
        match child.try_wait().map_err(|e| self.spawn_error(e))? {
            None => Ok(true),
            Some(status) => {
                tracing::warn!(pid = child.id(), %status, "relay exited");
                *slot = None;
                Ok(false)
            }
        }
    }
}

impl Drop for SubstrateRelay {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.get_mut().take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

// ─── Argument Builders ──────────────────────────────────────────────

fn push(args: &mut Vec<String>, flag: String, value: impl ToString) {
    args.push(flag);
    args.push(value.to_string());
}

fn push_version_mode(args: &mut Vec<String>, prefix: &str, mode: VersionMode) {
    match mode {
        VersionMode::Auto => push(args, format!("--{prefix}-version-mode"), "Auto"),
        VersionMode::Bundle => push(args, format!("--{prefix}-version-mode"), "Bundle"),
        VersionMode::Explicit {
            spec_version,
            transaction_version,
        } => {
            push(args, format!("--{prefix}-version-mode"), "Explicit");
            push(args, format!("--{prefix}-spec-version"), spec_version);
            push(args, format!("--{prefix}-transaction-version"), transaction_version);
        }
    }
}

/// Arguments for initializing `direction`: the source relay chain's
/// finality is registered at the target bridge hub, signed by the target's
/// headers signer.
pub fn init_bridge_args(config: &BridgeConfig, direction: Direction) -> Vec<String> {
    let source = config.side(direction.source());
    let target = config.side(direction.target());
    let mut args = vec![
        "init-bridge".to_string(),
        format!("{}-to-bridge-hub-{}", source.name, target.name),
    ];
    push(&mut args, "--source-host".to_string(), &source.relay_chain.host);
    push(&mut args, "--source-port".to_string(), source.relay_chain.port);
    push_version_mode(&mut args, "source", source.version_mode);
    push(&mut args, "--target-host".to_string(), &target.bridge_hub.host);
    push(&mut args, "--target-port".to_string(), target.bridge_hub.port);
    push_version_mode(&mut args, "target", target.version_mode);
    push(&mut args, "--target-signer".to_string(), &target.headers_signer);
    args
}

fn push_side(args: &mut Vec<String>, this: &SideConfig, other: &SideConfig) {
    let x = &this.name;
    let y = &other.name;
    push(args, format!("--{x}-host"), &this.relay_chain.host);
    push(args, format!("--{x}-port"), this.relay_chain.port);
    push_version_mode(args, x, this.version_mode);

    let hub = format!("bridge-hub-{x}");
    push(args, format!("--{hub}-host"), &this.bridge_hub.host);
    push(args, format!("--{hub}-port"), this.bridge_hub.port);
    push_version_mode(args, &hub, this.version_mode);
    push(args, format!("--{hub}-signer"), &this.signer);
    push(args, format!("--{y}-headers-to-{hub}-signer"), &this.headers_signer);
    push(args, format!("--{y}-parachains-to-{hub}-signer"), &this.parachains_signer);
    push(args, format!("--{hub}-transactions-mortality"), this.transactions_mortality);
}

/// Arguments for the steady-state relay on the configured lane.
pub fn relay_args(config: &BridgeConfig) -> Vec<String> {
    let a = config.side(Side::A);
    let b = config.side(Side::B);
    let mut args = vec![
        "relay-headers-and-messages".to_string(),
        format!("bridge-hub-{}-bridge-hub-{}", a.name, b.name),
    ];
    push_side(&mut args, a, b);
    push_side(&mut args, b, a);
    push(&mut args, "--lane".to_string(), config.lane);
    args
}
