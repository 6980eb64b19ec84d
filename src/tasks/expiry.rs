//! Expiry Task
//!
//! Background task that fires timeout timers of a shared cache as they
//! come due.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::TupleMap;

/// Spawns a task that expires entries of `cache` as their timers come due.
///
/// The task sleeps until the next pending deadline, or for one timeout
/// period when nothing is pending, then takes the lock and fires every due
/// timer. It returns immediately if the cache has no timeout.
///
/// # Arguments
/// * `cache` - Shared cache; the lock is held only while timers fire
///
/// # Returns
/// A JoinHandle for the spawned task; abort it to stop expiring.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(Mutex::new(TupleMap::<u64>::new(Some(timeout), None)));
/// let expiry_handle = spawn_expiry_task(cache.clone());
/// // Later, during shutdown:
/// expiry_handle.abort();
/// ```
pub fn spawn_expiry_task<V>(cache: Arc<Mutex<TupleMap<V>>>) -> JoinHandle<()>
where
    V: Send + 'static,
{
    tokio::spawn(async move {
        let timeout = cache.lock().await.timeout();
        let Some(period) = timeout else {
            debug!("Cache has no timeout, expiry task not needed");
            return;
        };

        info!("Starting expiry task with timeout of {:?}", period);

        loop {
            let next_deadline = {
                let mut cache_guard = cache.lock().await;
                let expired = cache_guard.expire_due();
                if expired > 0 {
                    info!("Expiry: removed {} expired entries", expired);
                } else {
                    debug!("Expiry: no entries due");
                }
                cache_guard.next_deadline()
            };

            match next_deadline {
                Some(deadline) => tokio::time::sleep_until(Instant::from_std(deadline)).await,
                None => tokio::time::sleep(period).await,
            }
        }
    })
}
