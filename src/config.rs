//! Launch Configuration
//!
//! Settings come from environment variables with defaults, the same knobs
//! for every startup mode: the node identity, where its record file lives,
//! the socket the delivery bridge binds, and the quorum parameters.

use crate::protocol::NodeId;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("environment variable {name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("quorum configuration rejected: {0}")]
    Quorum(String),
}

/// Replication and quorum parameters shared by every node of a ring.
#[derive(Debug, Clone)]
pub struct QuorumConfig {
    /// R: votes needed to answer a read (and to start the write phase of
    /// an update).
    pub read_quorum: usize,
    /// W: write quorum, carried for every update request.
    pub write_quorum: usize,
    /// N: how many nodes replicate each key.
    pub replication: usize,
    /// How long a coordinator waits for its quorum before giving up.
    pub timeout: Duration,
}

impl QuorumConfig {
    pub fn new(read_quorum: usize, write_quorum: usize, replication: usize) -> Self {
        Self {
            read_quorum,
            write_quorum,
            replication,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `R + W > N` guarantees a read quorum overlaps every write quorum;
    /// all three must be positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_quorum == 0 || self.write_quorum == 0 || self.replication == 0 {
            return Err(ConfigError::Quorum(
                "read quorum, write quorum and replication factor must all be positive".into(),
            ));
        }
        if self.read_quorum + self.write_quorum <= self.replication {
            return Err(ConfigError::Quorum(format!(
                "R + W > N must hold, got R={} W={} N={}",
                self.read_quorum, self.write_quorum, self.replication
            )));
        }
        Ok(())
    }
}

impl Default for QuorumConfig {
    fn default() -> Self {
        Self::new(2, 2, 3)
    }
}

/// Everything a node needs to launch.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub id: NodeId,
    pub storage_dir: PathBuf,
    pub listen: SocketAddr,
    pub quorum: QuorumConfig,
}

impl NodeConfig {
    /// Read the configuration from the environment. `NODE_ID` is required;
    /// everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let id = required_var("NODE_ID")?;
        let storage_dir =
            PathBuf::from(std::env::var("STORAGE_PATH").unwrap_or_else(|_| "./data".to_string()));
        let listen = optional_var("LISTEN_ADDR")?
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 7400)));

        let quorum = QuorumConfig {
            read_quorum: optional_var("READ_QUORUM")?.unwrap_or(2),
            write_quorum: optional_var("WRITE_QUORUM")?.unwrap_or(2),
            replication: optional_var("REPLICATION_FACTOR")?.unwrap_or(3),
            timeout: Duration::from_millis(optional_var("QUORUM_TIMEOUT_MS")?.unwrap_or(5000)),
        };
        quorum.validate()?;

        Ok(Self {
            id,
            storage_dir,
            listen,
            quorum,
        })
    }
}

fn required_var<T: std::str::FromStr>(name: &'static str) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value.parse().map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Err(ConfigError::Missing(name)),
    }
}

fn optional_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_quorum_is_valid() {
        QuorumConfig::default().validate().unwrap();
    }

    #[test]
    fn test_quorum_overlap_is_enforced() {
        let config = QuorumConfig::new(1, 1, 3);
        assert!(matches!(config.validate(), Err(ConfigError::Quorum(_))));
    }

    #[test]
    fn test_zero_parameters_are_rejected() {
        assert!(QuorumConfig::new(0, 2, 1).validate().is_err());
        assert!(QuorumConfig::new(2, 0, 1).validate().is_err());
        assert!(QuorumConfig::new(2, 2, 0).validate().is_err());
    }

    #[test]
    fn test_single_node_quorum_is_valid() {
        QuorumConfig::new(1, 1, 1).validate().unwrap();
    }
}
