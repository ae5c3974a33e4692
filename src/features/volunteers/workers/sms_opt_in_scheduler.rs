//! Self-expiring SMS opt-in
//!
//! Every volunteer that switches `send_sms` on gets exactly one pending expiry
//! task. Arming again aborts the previous task and starts a fresh window.
//! When a task fires it switches the flag off, but only if it is still on.
//!
//! Pending tasks live in process memory and do not survive a restart. Call
//! [`SmsOptInScheduler::restore`] at startup to re-arm from the database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::volunteers::repositories::VolunteerRepository;

struct PendingExpiry {
    /// Distinguishes this task from a later replacement for the same id
    ticket: u64,
    handle: AbortHandle,
}

type PendingEntries = HashMap<Uuid, PendingExpiry>;

pub struct SmsOptInScheduler {
    repository: Arc<dyn VolunteerRepository>,
    window: Duration,
    pending: Arc<Mutex<PendingEntries>>,
    next_ticket: AtomicU64,
}

impl SmsOptInScheduler {
    pub fn new(repository: Arc<dyn VolunteerRepository>, window: Duration) -> Self {
        Self {
            repository,
            window,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_ticket: AtomicU64::new(0),
        }
    }

    /// Schedules expiry one full window from now, replacing any pending task
    pub fn arm(&self, id: Uuid) {
        self.arm_after(id, self.window);
    }

    /// Schedules expiry after `delay`, replacing any pending task
    pub fn arm_after(&self, id: Uuid, delay: Duration) {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let repository = Arc::clone(&self.repository);
        let pending = Arc::clone(&self.pending);

        // The lock is held across spawn + insert so a task firing immediately
        // still finds its own entry when it cleans up.
        let mut map = lock(&self.pending);

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            expire(repository.as_ref(), id).await;

            let mut map = lock(&pending);
            if map.get(&id).is_some_and(|entry| entry.ticket == ticket) {
                map.remove(&id);
            }
        });

        let replaced = map.insert(
            id,
            PendingExpiry {
                ticket,
                handle: task.abort_handle(),
            },
        );

        let pending_count = map.len();
        match replaced {
            Some(previous) => {
                previous.handle.abort();
                tracing::info!(
                    "Re-armed SMS opt-in expiry for volunteer {} in {:?} ({} pending)",
                    id,
                    delay,
                    pending_count
                );
            }
            None => tracing::info!(
                "Armed SMS opt-in expiry for volunteer {} in {:?} ({} pending)",
                id,
                delay,
                pending_count
            ),
        }
    }

    /// Drops the pending expiry for `id`; returns whether one existed
    #[allow(dead_code)] // only reached through VolunteerService::reset_send_sms
    pub fn cancel(&self, id: Uuid) -> bool {
        match lock(&self.pending).remove(&id) {
            Some(entry) => {
                entry.handle.abort();
                tracing::info!("Cancelled SMS opt-in expiry for volunteer {}", id);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn is_armed(&self, id: Uuid) -> bool {
        lock(&self.pending).contains_key(&id)
    }

    #[cfg(test)]
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Re-arms every volunteer whose flag is still on, keeping the original deadline.
    /// Windows that already elapsed expire right away.
    pub async fn restore(&self) -> Result<usize> {
        let volunteers = self.repository.find_send_sms_enabled().await?;
        let now = Utc::now();

        for volunteer in &volunteers {
            let set_at = volunteer.send_sms_set_at.unwrap_or(now);
            let elapsed = (now - set_at).to_std().unwrap_or(Duration::ZERO);
            self.arm_after(volunteer.id, self.window.saturating_sub(elapsed));
        }

        tracing::info!("Restored {} SMS opt-in expiries", volunteers.len());
        Ok(volunteers.len())
    }
}

impl Drop for SmsOptInScheduler {
    fn drop(&mut self) {
        for (_, entry) in lock(&self.pending).drain() {
            entry.handle.abort();
        }
    }
}

async fn expire(repository: &dyn VolunteerRepository, id: Uuid) {
    match repository.expire_send_sms(id).await {
        Ok(true) => tracing::info!("SMS opt-in expired for volunteer {}", id),
        Ok(false) => tracing::debug!(
            "SMS opt-in expiry for volunteer {} matched nothing, flag already off",
            id
        ),
        Err(e) => tracing::warn!("Failed to expire SMS opt-in for volunteer {}: {}", id, e),
    }
}

/// Every critical section leaves the map consistent, so poisoning is ignored
fn lock(pending: &Mutex<PendingEntries>) -> MutexGuard<'_, PendingEntries> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
