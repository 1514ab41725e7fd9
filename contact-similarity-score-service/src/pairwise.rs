use crate::index::RecordIndex;
use crate::scorer::match_score;
use contact_similarity::dto::{PairKey, PairScore, Record};
use contact_similarity::error::{Cancelled, ServiceError};
use log::trace;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

///
/// Shared abort switch for a running sweep. Clones observe the same flag.
///
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

///
/// Receives every pair score as it is produced, from any worker thread.
///
pub trait ScoreObserver: Send + Sync {
    fn on_score(&self, entry: &PairScore);
}

/// Logs each pair at `trace` level.
pub struct LogObserver;

impl ScoreObserver for LogObserver {
    fn on_score(&self, entry: &PairScore) {
        trace!(
            "pair {}-{} scored {}",
            entry.key.first,
            entry.key.second,
            entry.score
        );
    }
}

///
/// Every pair score of one sweep, sorted by `(key, score)`.
///
/// Record ids are not unique, so two entries may share a key; all of them are kept.
///
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScoreMap {
    entries: Vec<PairScore>,
}

impl ScoreMap {
    fn from_entries(mut entries: Vec<PairScore>) -> Self {
        entries.sort_unstable();
        ScoreMap { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    ///
    /// Score for the pair in either argument order. With repeated keys the lowest score wins.
    ///
    pub fn get(&self, a: i64, b: i64) -> Option<u32> {
        let key = PairKey::new(a, b);
        let pos = self.entries.partition_point(|entry| entry.key < key);
        self.entries
            .get(pos)
            .filter(|entry| entry.key == key)
            .map(|entry| entry.score)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PairScore> {
        self.entries.iter()
    }

    ///
    /// Collapses into a plain map. As with [`ScoreMap::get`], a repeated key keeps
    /// its lowest score.
    ///
    pub fn into_map(self) -> HashMap<PairKey, u32> {
        let mut map = HashMap::with_capacity(self.entries.len());
        for entry in self.entries {
            map.entry(entry.key).or_insert(entry.score);
        }
        map
    }
}

impl<'a> IntoIterator for &'a ScoreMap {
    type Item = &'a PairScore;
    type IntoIter = std::slice::Iter<'a, PairScore>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

///
/// Runs the all-pairs sweep on a dedicated, fixed-size worker pool.
///
pub struct PairwiseScorer {
    pool: ThreadPool,
    cancel: Option<CancelFlag>,
    observer: Option<Arc<dyn ScoreObserver>>,
}

impl PairwiseScorer {
    ///
    /// ## Arguments
    ///
    /// * `num_threads` - Worker count; `None` or `0` uses one per logical CPU.
    ///
    pub fn new(num_threads: Option<usize>) -> Result<Self, ServiceError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads.unwrap_or(0))
            .thread_name(|i| format!("pair-score-{i}"))
            .build()
            .map_err(ServiceError::internal_server_error)?;
        Ok(PairwiseScorer {
            pool,
            cancel: None,
            observer: None,
        })
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ScoreObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    ///
    /// Scores every unordered pair of distinct records. Returns only once all
    /// workers are done; a cancelled sweep yields no partial result.
    ///
    pub fn score_all(&self, index: &RecordIndex) -> Result<ScoreMap, Cancelled> {
        let records: Vec<&Record> = index.records().collect();
        let entries = self.pool.install(|| {
            sweep(&records, self.cancel.as_ref(), self.observer.as_deref())
        })?;
        Ok(ScoreMap::from_entries(entries))
    }
}

///
/// Scores every unordered pair on the global rayon pool.
///
pub fn score_all(index: &RecordIndex) -> ScoreMap {
    let records: Vec<&Record> = index.records().collect();
    let entries = (0..records.len())
        .into_par_iter()
        .flat_map_iter(|i| score_row(&records, i, None))
        .collect();
    ScoreMap::from_entries(entries)
}

fn sweep(
    records: &[&Record],
    cancel: Option<&CancelFlag>,
    observer: Option<&dyn ScoreObserver>,
) -> Result<Vec<PairScore>, Cancelled> {
    let is_cancelled = || cancel.is_some_and(CancelFlag::is_cancelled);
    let rows: Vec<Vec<PairScore>> = (0..records.len())
        .into_par_iter()
        .map(|i| {
            if is_cancelled() {
                return Err(Cancelled);
            }
            Ok(score_row(records, i, observer))
        })
        .collect::<Result<_, Cancelled>>()?;
    if is_cancelled() {
        return Err(Cancelled);
    }
    Ok(rows.into_iter().flatten().collect())
}

/// Pairs `(i, j)` for every `j > i`.
fn score_row(
    records: &[&Record],
    i: usize,
    observer: Option<&dyn ScoreObserver>,
) -> Vec<PairScore> {
    let a = records[i];
    records[i + 1..]
        .iter()
        .map(|b| {
            let entry = PairScore {
                key: PairKey::new(a.id, b.id),
                score: match_score(a, b),
            };
            if let Some(observer) = observer {
                observer.on_score(&entry);
            }
            entry
        })
        .collect()
}
