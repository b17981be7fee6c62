use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The four enforcement back-ends a User can be blocked through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockerKind {
    Tft,
    Tfh,
    Ipset,
    Nftables,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown blocker kind: {0}")]
pub struct UnknownBlockerKind(String);

impl std::str::FromStr for BlockerKind {
    type Err = UnknownBlockerKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tft" => Ok(BlockerKind::Tft),
            "tfh" => Ok(BlockerKind::Tfh),
            "ipset" => Ok(BlockerKind::Ipset),
            "nftables" | "nft" => Ok(BlockerKind::Nftables),
            other => Err(UnknownBlockerKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for BlockerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockerKind::Tft => write!(f, "tft"),
            BlockerKind::Tfh => write!(f, "tfh"),
            BlockerKind::Ipset => write!(f, "ipset"),
            BlockerKind::Nftables => write!(f, "nftables"),
        }
    }
}

/// Enforcement-surface configuration, shared by all enabled blockers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlockingConfig {
    /// Which back-ends are active this run. Empty is valid only with
    /// `--verify`; `Config::validate` rejects it otherwise.
    #[serde(default)]
    pub blocking_types: BTreeSet<BlockerKind>,

    /// `W`: the detection loop's iteration interval and the length of each
    /// of the two validation windows (§4.E "Windowing").
    #[serde(default = "default_window_duration_sec")]
    pub window_duration_sec: i64,

    /// How long a block stays installed before a blocker's reconciliation
    /// is allowed to release it again.
    #[serde(default = "default_blocking_time_sec")]
    pub blocking_time_sec: i64,

    /// Name of the kernel IP-set the IpSet blocker owns.
    #[serde(default = "default_ipset_name")]
    pub ipset_name: String,

    /// nftables table the NFT blocker targets.
    #[serde(default = "default_nft_table_name")]
    pub nft_table_name: String,

    /// nftables set within `nft_table_name` the NFT blocker targets.
    #[serde(default = "default_nft_set_name")]
    pub nft_set_name: String,
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            blocking_types: BTreeSet::new(),
            window_duration_sec: default_window_duration_sec(),
            blocking_time_sec: default_blocking_time_sec(),
            ipset_name: default_ipset_name(),
            nft_table_name: default_nft_table_name(),
            nft_set_name: default_nft_set_name(),
        }
    }
}

fn default_window_duration_sec() -> i64 {
    60
}

fn default_blocking_time_sec() -> i64 {
    600
}

fn default_ipset_name() -> String {
    "tfw_guard_blocked".to_string()
}

fn default_nft_table_name() -> String {
    "tfw_guard".to_string()
}

fn default_nft_set_name() -> String {
    "blocked".to_string()
}
