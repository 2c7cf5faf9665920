use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// How much the source of a hash is trusted. Ordered: higher is better.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize_repr, Deserialize_repr, clap::ValueEnum,
)]
#[repr(u8)]
pub enum TrustLevel {
    /// Source trust unknown
    Low = 0,
    /// Source probably good, but not verified
    Medium = 1,
    /// Known good source
    High = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr, clap::ValueEnum)]
#[repr(u8)]
pub enum ThreatLevel {
    Good = 0,
    Evil = 1,
}

/// Value stored per digest key. Serialized as a small JSON document so the
/// database stays readable with generic tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhitelistRecord {
    pub filepath: String,
    pub source_id: Option<String>,
    pub threat: ThreatLevel,
    pub trust: TrustLevel,
}

/// Side-channel record for an ingested source, keyed by its md5 digest.
/// Lets a rerun skip sources that were already processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMeta {
    /// Unix timestamp (seconds) of when the source finished processing
    pub processed: i64,
    pub source_id: Option<String>,
    /// Where the source came from (path or URL)
    pub source: String,
}

/// Running totals over store writes. Summed across batch boundaries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteStats {
    pub added: u64,
    pub processed: u64,
    pub duplicates: u64,
}

impl std::ops::AddAssign for WriteStats {
    fn add_assign(&mut self, rhs: Self) {
        self.added += rhs.added;
        self.processed += rhs.processed;
        self.duplicates += rhs.duplicates;
    }
}
