use std::path::Path;

use packlink_frame::{FrameConfig, WireRecord, DEFAULT_MAX_PAYLOAD};
use packlink_prefs::PackPrefs;
use serde::{Deserialize, Serialize};

use crate::error::{PeerError, Result};

/// Baud rate of every inter-controller UART.
pub const DEFAULT_BAUD: u32 = 9600;

/// Timing and sizing for one peer link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Interval between sync requests while disconnected.
    pub retry_interval_ms: u64,
    /// Interval between heartbeats sent by the initiating end.
    pub heartbeat_interval_ms: u64,
    /// Silence after which a connected link is declared lost.
    pub keepalive_timeout_ms: u64,
    /// Largest frame payload accepted or sent.
    pub max_payload_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            retry_interval_ms: 750,
            heartbeat_interval_ms: 3250,
            keepalive_timeout_ms: 8000,
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.retry_interval_ms == 0 {
            return Err(PeerError::Config("retry_interval_ms must be > 0".into()));
        }
        if self.heartbeat_interval_ms == 0 {
            return Err(PeerError::Config("heartbeat_interval_ms must be > 0".into()));
        }
        if self.keepalive_timeout_ms <= self.heartbeat_interval_ms {
            return Err(PeerError::Config(format!(
                "keepalive_timeout_ms ({}) must exceed heartbeat_interval_ms ({})",
                self.keepalive_timeout_ms, self.heartbeat_interval_ms
            )));
        }
        if self.max_payload_size < PackPrefs::WIRE_SIZE || self.max_payload_size > u16::MAX as usize
        {
            return Err(PeerError::Config(format!(
                "max_payload_size {} outside {}..={}",
                self.max_payload_size,
                PackPrefs::WIRE_SIZE,
                u16::MAX
            )));
        }
        Ok(())
    }

    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            max_payload_size: self.max_payload_size,
            ..FrameConfig::default()
        }
    }
}

/// Per-node settings, loadable from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Session settings for the pack↔wand link.
    pub wand_link: SessionConfig,
    /// Session settings for the pack↔attenuator link.
    pub attenuator_link: SessionConfig,
    /// Serial baud rate for hardware links.
    pub baud: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            wand_link: SessionConfig::default(),
            attenuator_link: SessionConfig::default(),
            baud: DEFAULT_BAUD,
        }
    }
}

impl NodeConfig {
    pub fn validate(&self) -> Result<()> {
        self.wand_link.validate()?;
        self.attenuator_link.validate()
    }

    /// Read and validate a JSON config file. Missing keys take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|err| PeerError::Config(format!("{}: {err}", path.display())))?;
        Self::from_json_slice(&bytes)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let config: NodeConfig = serde_json::from_slice(bytes)
            .map_err(|err| PeerError::Config(format!("invalid node config: {err}")))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        NodeConfig::default()
            .validate()
            .expect("default config should validate");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = NodeConfig::from_json_slice(br#"{"wand_link":{"keepalive_timeout_ms":9000}}"#)
            .expect("partial config should parse");
        assert_eq!(config.wand_link.keepalive_timeout_ms, 9000);
        assert_eq!(config.wand_link.retry_interval_ms, 750);
        assert_eq!(config.attenuator_link, SessionConfig::default());
        assert_eq!(config.baud, 9600);
    }

    #[test]
    fn keepalive_must_exceed_heartbeat() {
        let config = SessionConfig {
            keepalive_timeout_ms: 1000,
            heartbeat_interval_ms: 1000,
            ..SessionConfig::default()
        };
        assert!(matches!(config.validate(), Err(PeerError::Config(_))));
    }

    #[test]
    fn payload_must_hold_largest_snapshot() {
        let config = SessionConfig {
            max_payload_size: 16,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = NodeConfig::from_json_slice(b"[1,2").unwrap_err();
        assert!(matches!(err, PeerError::Config(_)));
    }
}
