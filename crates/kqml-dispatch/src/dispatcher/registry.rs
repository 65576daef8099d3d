//! Pending reply continuations keyed by reply id.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, MutexGuard};

use kqml_config::DuplicateReplyPolicy;
use thiserror::Error;
use tracing::warn;

use super::DISPATCH_TARGET;
use crate::receiver::Continuation;

/// Errors raised while registering a reply continuation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplyError {
    /// A continuation is already pending for the id and the policy rejects
    /// duplicates.
    #[error("a continuation is already pending for reply id '{reply_id}'")]
    Duplicate {
        /// Canonical reply id.
        reply_id: String,
    },
}

/// Canonical form of a reply id: surrounding whitespace removed, upper-case.
#[must_use]
pub fn canonical_reply_id(reply_id: &str) -> String {
    reply_id.trim().to_uppercase()
}

/// Mutex-guarded map from canonical reply id to continuation.
///
/// Insert, lookup, and removal each happen under a single lock acquisition.
pub(super) struct ReplyRegistry {
    entries: Mutex<HashMap<String, Box<dyn Continuation>>>,
    policy: DuplicateReplyPolicy,
}

impl ReplyRegistry {
    pub(super) fn new(policy: DuplicateReplyPolicy) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            policy,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Box<dyn Continuation>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    pub(super) fn insert(
        &self,
        reply_id: &str,
        continuation: Box<dyn Continuation>,
    ) -> Result<(), ReplyError> {
        let reply_id = canonical_reply_id(reply_id);
        let mut entries = self.lock();
        match entries.entry(reply_id) {
            Entry::Vacant(slot) => {
                slot.insert(continuation);
                Ok(())
            }
            Entry::Occupied(mut slot) => match self.policy {
                DuplicateReplyPolicy::Overwrite => {
                    warn!(
                        target: DISPATCH_TARGET,
                        reply_id = %slot.key(),
                        "replacing pending reply continuation"
                    );
                    slot.insert(continuation);
                    Ok(())
                }
                DuplicateReplyPolicy::Reject => Err(ReplyError::Duplicate {
                    reply_id: slot.key().clone(),
                }),
            },
        }
    }

    /// Removes and returns the continuation for an already canonical id.
    pub(super) fn take(&self, canonical_id: &str) -> Option<Box<dyn Continuation>> {
        self.lock().remove(canonical_id)
    }

    pub(super) fn contains(&self, reply_id: &str) -> bool {
        self.lock().contains_key(&canonical_reply_id(reply_id))
    }

    pub(super) fn len(&self) -> usize {
        self.lock().len()
    }
}
