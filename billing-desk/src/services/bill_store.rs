//! In-memory registry of open bill drafts, one per UI session.
//!
//! Drafts nobody has touched for the configured idle TTL are evicted by a
//! background sweep, so abandoned sessions and submitted bills do not pile up.

use bill_ledger::{BillDraft, TaxRate};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

/// Handle to a single draft. Holding the lock makes the caller its only writer.
pub type SharedDraft = Arc<Mutex<BillDraft>>;

const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

struct StoredDraft {
    draft: SharedDraft,
    last_touched: Instant,
}

#[derive(Clone)]
pub struct BillStore {
    drafts: Arc<DashMap<Uuid, StoredDraft>>,
    tax_rate: TaxRate,
}

impl BillStore {
    pub fn new(tax_rate: TaxRate) -> Self {
        Self {
            drafts: Arc::new(DashMap::new()),
            tax_rate,
        }
    }

    pub fn create(&self) -> (Uuid, SharedDraft) {
        let id = Uuid::new_v4();
        let draft = Arc::new(Mutex::new(BillDraft::new(self.tax_rate)));
        self.drafts.insert(
            id,
            StoredDraft {
                draft: draft.clone(),
                last_touched: Instant::now(),
            },
        );
        tracing::debug!(bill_id = %id, "Draft opened");
        (id, draft)
    }

    /// Look up a draft and mark it as used.
    ///
    /// The handle is cloned out so the map shard is not held across awaits.
    pub fn get(&self, id: &Uuid) -> Option<SharedDraft> {
        self.drafts.get_mut(id).map(|mut entry| {
            entry.last_touched = Instant::now();
            entry.draft.clone()
        })
    }

    pub fn remove(&self, id: &Uuid) -> Option<SharedDraft> {
        self.drafts.remove(id).map(|(_, stored)| stored.draft)
    }

    /// Drop drafts idle for at least `ttl`. Drafts whose lock is held right
    /// now (e.g. mid-submission) are kept. Returns how many were evicted.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let mut evicted = 0;
        self.drafts.retain(|id, stored| {
            let idle = stored.last_touched.elapsed() >= ttl;
            if idle && stored.draft.try_lock().is_ok() {
                tracing::debug!(bill_id = %id, "Evicting idle draft");
                evicted += 1;
                false
            } else {
                true
            }
        });
        evicted
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}

/// Run [`BillStore::evict_idle`] every `every` until the task is aborted.
pub fn spawn_sweeper(store: BillStore, ttl: Duration, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(MIN_SWEEP_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = store.evict_idle(ttl);
            metrics::gauge!("bill_drafts_open").set(store.len() as f64);
            if evicted > 0 {
                tracing::info!(evicted, remaining = store.len(), "Evicted idle bill drafts");
            }
        }
    })
}
