//! # Optimistic Inserts
//!
//! Records this client just created are shown before the API lists them.
//!
//! ```text
//!  create ──► insert(record) ──► pending [A]
//!                                   │
//!  fetch  ──► merge([B, C])  ──► [A, B, C]      A not listed yet
//!  fetch  ──► merge([A, B, C]) ► [A, B, C]      A listed: pending entry dropped
//! ```
//!
//! Entries are keyed by a client-generated correlation id, because the
//! server id is only known once the create call returns. An entry leaves the
//! cache when the authoritative list contains its record id, when it is
//! removed explicitly, or when it is older than the TTL.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::types::Identified;

/// A record waiting to appear in the authoritative list.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEntry<T> {
    pub correlation_id: Uuid,
    pub record: T,
    pub inserted_at: DateTime<Utc>,
}

/// In-memory cache of optimistic inserts.
#[derive(Debug, Clone)]
pub struct OptimisticCache<T> {
    /// Newest first.
    entries: Vec<PendingEntry<T>>,
    ttl: Duration,
}

impl<T: Identified + Clone> OptimisticCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Vec::new(),
            ttl,
        }
    }

    /// Adds a record under a fresh correlation id.
    pub fn insert(&mut self, record: T, now: DateTime<Utc>) -> Uuid {
        let correlation_id = Uuid::new_v4();
        self.insert_with_id(correlation_id, record, now);
        correlation_id
    }

    /// Adds a record under a caller-chosen correlation id, replacing any
    /// entry with the same id.
    pub fn insert_with_id(&mut self, correlation_id: Uuid, record: T, now: DateTime<Utc>) {
        self.entries.retain(|e| e.correlation_id != correlation_id);
        self.entries.insert(
            0,
            PendingEntry {
                correlation_id,
                record,
                inserted_at: now,
            },
        );
    }

    pub fn remove(&mut self, correlation_id: Uuid) -> Option<T> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.correlation_id == correlation_id)?;
        Some(self.entries.remove(pos).record)
    }

    /// Drops entries that are listed in `authoritative` or expired.
    /// Returns how many were dropped.
    pub fn reconcile(&mut self, authoritative: &[T], now: DateTime<Utc>) -> usize {
        let listed: HashSet<&str> = authoritative.iter().map(Identified::id).collect();
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|e| {
            !listed.contains(e.record.id()) && now.signed_duration_since(e.inserted_at) < ttl
        });
        before - self.entries.len()
    }

    /// Reconciles, then returns pending records (newest first) followed by
    /// the authoritative list.
    pub fn merge(&mut self, authoritative: Vec<T>, now: DateTime<Utc>) -> Vec<T> {
        self.reconcile(&authoritative, now);
        let mut merged: Vec<T> = self.entries.iter().map(|e| e.record.clone()).collect();
        merged.extend(authoritative);
        merged
    }

    pub fn pending(&self) -> &[PendingEntry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
