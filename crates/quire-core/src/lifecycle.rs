//! Page lifecycle rules.
//!
//! Each identifier is either [`PageState::Absent`] or [`PageState::Present`].
//! A create is only allowed on an absent page and an edit only on a present
//! one; viewing is always allowed. The existence check and the write happen
//! under one per-identifier lock, so two submissions for the same page cannot
//! both pass the check and then race on the write.
//!
//! ```text
//!   Absent  --Create--> Present      Absent  --Edit-->   rejected (Missing)
//!   Present --Edit----> Present      Present --Create--> rejected (AlreadyExists)
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::Mutex;

use crate::error::{LifecycleError, PageError};
use crate::page::{Document, PageStore};
use crate::route::PageId;

/// What the submitting form meant to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Create,
    Edit,
}

impl Intent {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "edit" => Ok(Self::Edit),
            other => Err(LifecycleError::UnknownIntent {
                name: other.to_owned(),
            }),
        }
    }
}

/// Whether a page is currently stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Absent,
    Present,
}

impl From<bool> for PageState {
    fn from(exists: bool) -> Self {
        if exists { Self::Present } else { Self::Absent }
    }
}

/// Apply the transition table to one submission.
///
/// # Errors
///
/// Returns [`LifecycleError::AlreadyExists`] for a create on a present page
/// and [`LifecycleError::Missing`] for an edit on an absent page.
pub fn decide(state: PageState, intent: Intent, id: &PageId) -> Result<(), LifecycleError> {
    match (state, intent) {
        (PageState::Absent, Intent::Create) | (PageState::Present, Intent::Edit) => Ok(()),
        (PageState::Present, Intent::Create) => Err(LifecycleError::AlreadyExists {
            id: id.to_string(),
        }),
        (PageState::Absent, Intent::Edit) => Err(LifecycleError::Missing { id: id.to_string() }),
    }
}

/// Normalize a submitted title: trim surrounding whitespace and validate.
///
/// # Errors
///
/// Returns [`LifecycleError::InvalidTitle`] if nothing is left after trimming
/// or the remainder is not a valid identifier.
pub fn parse_title(raw: &str) -> Result<PageId, LifecycleError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LifecycleError::InvalidTitle {
            reason: "title must not be empty".to_owned(),
        });
    }
    PageId::parse(trimmed).map_err(|e| LifecycleError::InvalidTitle {
        reason: e.to_string(),
    })
}

type LockMap = StdMutex<HashMap<PageId, Arc<Mutex<()>>>>;

/// Enforces create-versus-edit rules in front of the [`PageStore`].
pub struct LifecycleController {
    store: PageStore,
    /// One lock per identifier with a submission in flight. The map itself
    /// is only held for a lookup, never across an `.await`.
    locks: LockMap,
}

/// A handle on one identifier's lock. Dropping it prunes the map entry
/// once nobody else holds the lock, including when the submitting future
/// is cancelled mid-write.
struct LockEntry<'a> {
    locks: &'a LockMap,
    id: PageId,
    lock: Arc<Mutex<()>>,
}

impl<'a> LockEntry<'a> {
    fn acquire(locks: &'a LockMap, id: &PageId) -> Self {
        let mut map = locks.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = Arc::clone(map.entry(id.clone()).or_default());
        Self {
            locks,
            id: id.clone(),
            lock,
        }
    }
}

impl Drop for LockEntry<'_> {
    fn drop(&mut self) {
        let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Handles are only cloned under the map lock: two references (the
        // map and this one) means nobody else is waiting.
        if Arc::strong_count(&self.lock) == 2 {
            map.remove(&self.id);
        }
    }
}

impl fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleController")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl LifecycleController {
    #[must_use]
    pub fn new(store: PageStore) -> Self {
        Self {
            store,
            locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Handle a create or edit submission.
    ///
    /// The title is trimmed and validated before storage is touched. On
    /// success the identifier of the written page is returned.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidTitle`] for an empty or malformed title.
    /// - [`LifecycleError::AlreadyExists`] / [`LifecycleError::Missing`] when
    ///   the page's current state forbids the intent. Nothing is written.
    /// - [`LifecycleError::Page`] if the store fails.
    pub async fn submit(
        &self,
        intent: Intent,
        raw_title: &str,
        body: impl Into<Vec<u8>>,
    ) -> Result<PageId, LifecycleError> {
        let id = parse_title(raw_title)?;
        let doc = Document::new(id.clone(), body);

        let result = {
            let entry = LockEntry::acquire(&self.locks, &id);
            let _guard = entry.lock.lock().await;
            self.check_and_write(intent, &doc).await
        };

        match &result {
            Ok(()) => tracing::debug!(page = %id, %intent, "submission applied"),
            Err(e) => tracing::info!(page = %id, %intent, error = %e, "submission rejected"),
        }
        result.map(|()| id)
    }

    /// Current state of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Storage`] if the backend fails.
    pub async fn state(&self, id: &PageId) -> Result<PageState, PageError> {
        Ok(self.store.exists(id).await?.into())
    }

    /// Load `id` for display. `None` means the page is absent.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Storage`] if the backend fails.
    pub async fn view(&self, id: &PageId) -> Result<Option<Document>, PageError> {
        match self.store.load(id).await {
            Ok(doc) => Ok(Some(doc)),
            Err(PageError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Identifiers of all stored pages.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Storage`] if the backend fails.
    pub async fn list(&self) -> Result<Vec<PageId>, PageError> {
        self.store.list().await
    }

    async fn check_and_write(&self, intent: Intent, doc: &Document) -> Result<(), LifecycleError> {
        let state = PageState::from(self.store.exists(&doc.title).await?);
        decide(state, intent, &doc.title)?;
        self.store.save(doc).await?;
        Ok(())
    }

    #[cfg(test)]
    fn held_locks(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
