use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DataFile {
    pub bucket: String,
    pub key: String,
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreConfig {
    pub data: DataFile,
    /// Worker threads for the pairwise sweep; the pool default is used when absent.
    #[serde(default)]
    pub num_threads: Option<usize>,
}

/// One contact row. Identity for deduplication is the five text fields, not `id`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Record {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub zip_code: String,
    pub address: String,
}

/// Identifier pair labelling one score. Always stored as `(min, max)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct PairKey {
    pub first: i64,
    pub second: i64,
}

impl PairKey {
    pub fn new(a: i64, b: i64) -> Self {
        if a <= b {
            PairKey { first: a, second: b }
        } else {
            PairKey { first: b, second: a }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
pub struct PairScore {
    pub key: PairKey,
    pub score: u32,
}

#[derive(Deserialize, Serialize)]
pub struct ScoreSummary {
    pub bucket: String,
    pub key: String,
    pub records: usize,
    pub pairs: usize,
}
