//! Shared constants

pub const DEFAULT_CONFIG_PATH: &str = "snctl-token-agent.yaml";

/// Secret paths are served under `/v1/<mount_point>`.
pub const API_PREFIX: &str = "/v1/";
