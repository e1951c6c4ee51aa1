//! Per-slug leases serializing provisioning attempts within the process

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LeaseMap = HashMap<String, Arc<AsyncMutex<()>>>;

#[derive(Default)]
pub(crate) struct SlugLeases {
    inner: Arc<Mutex<LeaseMap>>,
}

impl SlugLeases {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait until no other attempt holds `slug`, then hold it until the
    /// returned lease is dropped
    pub(crate) async fn acquire(&self, slug: &str) -> SlugLease {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            // Entries only the map references were left by waiters that gave up
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            map.entry(slug.to_string()).or_default().clone()
        };
        let guard = lock.lock_owned().await;

        SlugLease {
            slug: slug.to_string(),
            guard: Some(guard),
            leases: self.inner.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn held(&self) -> usize {
        self.inner.lock().map(|map| map.len()).unwrap_or(0)
    }
}

pub(crate) struct SlugLease {
    slug: String,
    guard: Option<OwnedMutexGuard<()>>,
    leases: Arc<Mutex<LeaseMap>>,
}

impl Drop for SlugLease {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Forget the slug once nobody else is queued on it
        if let Ok(mut map) = self.leases.lock() {
            if map.get(&self.slug).is_some_and(|lock| Arc::strong_count(lock) == 1) {
                map.remove(&self.slug);
            }
        }
    }
}
