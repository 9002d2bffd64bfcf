//! Bounded per-device plan cache
//!
//! ```text
//! new plan      |--> cache at capacity: destroy the back (oldest) entry, push new plan to the front
//!               |--> otherwise:         push new plan to the front
//! existing plan -> reuse it
//! ```
//!
//! The cache owns every plan it holds and destroys each one exactly once:
//! on eviction, on [`PlanCache::clear`], or when the cache is dropped.
//! Callers only ever borrow plans.
//!
//! `PlanCache` is not synchronized. Access from several threads must be
//! serialized by the owner; [`PlanRegistry`](super::PlanRegistry) does this
//! with one mutex per device.

use super::engine::{FftEngine, check};
use super::key::PlanKey;
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Counters describing cache behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: usize,
    /// Lookups that required a new plan
    pub misses: usize,
    /// Plans admitted
    pub insertions: usize,
    /// Plans evicted (and destroyed) to make room
    pub evictions: usize,
    /// Plans currently held
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache (0.0 when nothing was looked up)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Ordered plan cache: front = most recently pushed, back = oldest
pub struct PlanCache<E: FftEngine> {
    engine: Arc<E>,
    entries: VecDeque<(PlanKey, E::Plan)>,
    capacity: usize,
    stats: CacheStats,
}

impl<E: FftEngine> PlanCache<E> {
    /// Create an empty cache holding at most `capacity` plans
    pub fn new(engine: Arc<E>, capacity: usize) -> Result<Self> {
        validate_capacity(capacity)?;
        Ok(Self {
            engine,
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
            stats: CacheStats::default(),
        })
    }

    /// Maximum number of plans before inserts start evicting
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of plans currently held
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no plans are held
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the cache counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            ..self.stats
        }
    }

    /// Keys from most recently pushed to oldest
    pub fn keys(&self) -> impl Iterator<Item = &PlanKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Change the eviction threshold
    ///
    /// Nothing is evicted here. Lowering the capacity below the current
    /// size only means that each later [`insert`](Self::insert) evicts one
    /// entry, so an over-full cache shrinks lazily, one plan per insert.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<()> {
        validate_capacity(capacity)?;
        self.capacity = capacity;
        Ok(())
    }

    /// Index of the plan stored under `key`
    ///
    /// Scans from the oldest entry to the newest and keeps the last match,
    /// so if a key was ever pushed twice the most recent push wins.
    pub fn find(&self, key: &PlanKey) -> Option<usize> {
        let mut found = None;
        for (index, (entry_key, _)) in self.entries.iter().enumerate().rev() {
            if entry_key == key {
                found = Some(index);
            }
        }
        found
    }

    /// Plan at an index returned by [`find`](Self::find)
    ///
    /// Only meaningful while the cache has not been modified since `find`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&E::Plan> {
        self.entries.get(index).map(|(_, plan)| plan)
    }

    /// Admit a plan under `key`, taking ownership of it
    ///
    /// If the cache is at or above capacity, exactly one entry (the oldest)
    /// is destroyed first. Returns the index of the new entry, which is
    /// always the front.
    ///
    /// If destroying the evicted plan fails, the incoming plan is released
    /// too (it never enters the cache) and the destroy error is returned.
    pub fn insert(&mut self, key: PlanKey, plan: E::Plan) -> Result<usize> {
        if self.entries.len() >= self.capacity {
            if let Err(err) = self.evict_oldest() {
                if let Err(status) = self.engine.destroy_plan(plan) {
                    tracing::warn!(
                        key = %key,
                        status = %status,
                        "failed to release FFT plan rejected after eviction failure"
                    );
                }
                return Err(err);
            }
        }

        tracing::debug!(key = %key, entries = self.entries.len() + 1, "caching FFT plan");
        self.entries.push_front((key, plan));
        self.stats.insertions += 1;
        Ok(0)
    }

    /// Destroy and remove the oldest entry
    ///
    /// Returns `false` if the cache was empty. The entry is removed before
    /// its plan is destroyed, so a failed destroy never leaves a dangling
    /// entry behind.
    pub fn evict_oldest(&mut self) -> Result<bool> {
        let Some((key, plan)) = self.entries.pop_back() else {
            return Ok(false);
        };
        self.stats.evictions += 1;
        tracing::debug!(key = %key, "evicting FFT plan");
        check(self.engine.name(), "destroy_plan", self.engine.destroy_plan(plan))?;
        Ok(true)
    }

    /// Return the cached plan for `key`, creating and admitting one on a miss
    pub fn get_or_create<F>(&mut self, key: PlanKey, create: F) -> Result<&E::Plan>
    where
        F: FnOnce() -> Result<E::Plan>,
    {
        if let Some(index) = self.find(&key) {
            self.stats.hits += 1;
            tracing::trace!(key = %key, index, "FFT plan cache hit");
            return self
                .get(index)
                .ok_or_else(|| Error::Internal(format!("plan index {} vanished", index)));
        }

        self.stats.misses += 1;
        tracing::debug!(key = %key, "FFT plan cache miss");
        let plan = create()?;
        let index = self.insert(key, plan)?;
        self.get(index)
            .ok_or_else(|| Error::Internal("freshly inserted plan missing".to_string()))
    }

    /// Destroy every plan
    ///
    /// All plans are released even if some destroys fail; the first
    /// failure is returned.
    pub fn clear(&mut self) -> Result<()> {
        let mut first_err = None;
        while let Some((key, plan)) = self.entries.pop_front() {
            if let Err(status) = self.engine.destroy_plan(plan) {
                tracing::warn!(key = %key, status = %status, "failed to destroy FFT plan");
                first_err.get_or_insert(Error::engine(
                    self.engine.name(),
                    "destroy_plan",
                    status.code(),
                ));
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<E: FftEngine> Drop for PlanCache<E> {
    fn drop(&mut self) {
        if let Err(err) = self.clear() {
            tracing::warn!(error = %err, "FFT plan cache teardown reported an error");
        }
    }
}

impl<E: FftEngine> fmt::Debug for PlanCache<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanCache")
            .field("capacity", &self.capacity)
            .field("keys", &self.keys().map(|k| k.to_string()).collect::<Vec<_>>())
            .field("stats", &self.stats)
            .finish()
    }
}

fn validate_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(Error::invalid_argument(
            "capacity",
            "plan cache capacity must be at least 1",
        ));
    }
    Ok(())
}
