//! Configuration types for fairdrop distributors.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Address, Domain, FairdropError, Result, ScheduleConfig, constants};

/// Configuration for one distributor instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributorConfig {
    /// Token being distributed.
    pub token: Address,
    /// Holder of the administrator role.
    pub admin: Address,
    /// Domain this distributor runs on.
    pub domain: Domain,
    /// Aggregate entitlement across all beneficiaries.
    pub total: u128,
    /// Metadata location (typically an IPFS URI).
    pub uri: String,
    /// Voting weight per unclaimed token, in basis points.
    #[serde(default = "default_vote_factor")]
    pub vote_factor: u128,
    /// Upper bound of the fair-queue delay in seconds. 0 disables the gate.
    #[serde(default)]
    pub max_delay: u64,
    pub schedule: ScheduleConfig,
}

fn default_vote_factor() -> u128 {
    constants::DEFAULT_VOTE_FACTOR
}

impl DistributorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FairdropError::Configuration(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Reject configurations that must never instantiate.
    pub fn validate(&self) -> Result<()> {
        if self.total == 0 {
            return Err(FairdropError::TotalIsZero);
        }
        if self.uri.trim().is_empty() {
            return Err(FairdropError::Configuration("uri must not be empty".into()));
        }
        Ok(())
    }
}

/// L2 sequencer uptime gate settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerGateConfig {
    /// Seconds to wait after the sequencer reports up again.
    pub grace_period_secs: u64,
}

impl Default for SequencerGateConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: constants::DEFAULT_SEQUENCER_GRACE_PERIOD_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tranche;

    const SAMPLE: &str = r#"{
        "token": "0x00000000000000000000000000000000000000aa",
        "admin": "0x00000000000000000000000000000000000000bb",
        "domain": 1,
        "total": 1000,
        "uri": "ipfs://QmTest",
        "schedule": {"kind": "tranche", "tranches": [{"time": 100, "vested_fraction": 10000}]}
    }"#;

    #[test]
    fn config_defaults_applied() {
        let cfg = DistributorConfig::from_json_str(SAMPLE).unwrap();
        assert_eq!(cfg.vote_factor, 10_000);
        assert_eq!(cfg.max_delay, 0);
        assert_eq!(cfg.domain, Domain(1));
        assert_eq!(cfg.token, Address::from_low_u64(0xaa));
        assert_eq!(
            cfg.schedule,
            ScheduleConfig::Tranche {
                tranches: vec![Tranche::new(100, 10_000)]
            }
        );
        cfg.validate().unwrap();
    }

    #[test]
    fn zero_total_rejected() {
        let mut cfg = DistributorConfig::from_json_str(SAMPLE).unwrap();
        cfg.total = 0;
        assert!(matches!(cfg.validate(), Err(FairdropError::TotalIsZero)));
    }

    #[test]
    fn empty_uri_rejected() {
        let mut cfg = DistributorConfig::from_json_str(SAMPLE).unwrap();
        cfg.uri = "  ".into();
        assert!(matches!(
            cfg.validate(),
            Err(FairdropError::Configuration(_))
        ));
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        assert!(matches!(
            DistributorConfig::from_json_str("{"),
            Err(FairdropError::Configuration(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            DistributorConfig::from_path("/nonexistent/fairdrop.json"),
            Err(FairdropError::Io(_))
        ));
    }

    #[test]
    fn sequencer_gate_default() {
        assert_eq!(SequencerGateConfig::default().grace_period_secs, 3600);
    }
}
