//! Request-scoped correlation identifier propagation.
//!
//! The identifier lives in a tokio task-local slot, so it travels with the
//! request's future across suspension points and worker threads without ever
//! being visible to a concurrently handled request. Outside a request scope
//! every read degrades gracefully to `None`.

use std::cell::RefCell;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque per-request correlation token.
///
/// No internal structure is guaranteed beyond uniqueness; the generated form
/// happens to be a UUID v4 but callers must treat it as an opaque string
/// (inbound ids supplied by a transport adapter keep whatever shape they
/// arrived with).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh collision-resistant id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

tokio::task_local! {
    static REQUEST_ID: RefCell<Option<RequestId>>;
}

/// Run `fut` inside a request scope seeded with `id`.
///
/// Everything awaited within `fut` observes the same slot; sibling scopes
/// never observe each other's value.
pub async fn scope<F>(id: Option<RequestId>, fut: F) -> F::Output
where
    F: Future,
{
    REQUEST_ID.scope(RefCell::new(id), fut).await
}

/// Synchronous counterpart of [`scope`] for non-async call chains and tests.
pub fn sync_scope<F, R>(id: Option<RequestId>, f: F) -> R
where
    F: FnOnce() -> R,
{
    REQUEST_ID.sync_scope(RefCell::new(id), f)
}

/// Store `id` in the current request scope. No-op outside a scope.
pub fn set(id: RequestId) {
    let _ = REQUEST_ID.try_with(|slot| *slot.borrow_mut() = Some(id));
}

/// Current request's id, or `None` when no scope is active or none was set.
/// Never panics.
#[must_use]
pub fn get() -> Option<RequestId> {
    REQUEST_ID
        .try_with(|slot| slot.borrow().clone())
        .ok()
        .flatten()
}

/// Existing id, or a freshly generated one (stored for the rest of the
/// request when a scope is active).
#[must_use]
pub fn ensure() -> RequestId {
    REQUEST_ID
        .try_with(|slot| {
            let mut slot = slot.borrow_mut();
            if let Some(id) = slot.as_ref() {
                id.clone()
            } else {
                let id = RequestId::generate();
                *slot = Some(id.clone());
                id
            }
        })
        // No scope to attach the id to; hand back an ephemeral one.
        .unwrap_or_else(|_| RequestId::generate())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn get_is_none_outside_scope() {
        assert_eq!(get(), None);
    }

    #[test]
    fn set_outside_scope_is_noop() {
        set(RequestId::from("lost"));
        assert_eq!(get(), None);
    }

    #[test]
    fn ensure_outside_scope_still_yields_an_id() {
        let id = ensure();
        assert!(!id.as_str().is_empty());
        // Nothing was stored.
        assert_eq!(get(), None);
    }

    #[test]
    fn seeded_scope_exposes_the_id() {
        sync_scope(Some(RequestId::from("R1")), || {
            assert_eq!(get(), Some(RequestId::from("R1")));
            assert_eq!(ensure(), RequestId::from("R1"));
        });
        assert_eq!(get(), None);
    }

    #[test]
    fn ensure_generates_once_and_sticks() {
        sync_scope(None, || {
            assert_eq!(get(), None);
            let first = ensure();
            let second = ensure();
            assert_eq!(first, second);
            assert_eq!(get(), Some(first));
        });
    }

    #[test]
    fn set_overwrites_within_scope() {
        sync_scope(Some(RequestId::from("old")), || {
            set(RequestId::from("new"));
            assert_eq!(get(), Some(RequestId::from("new")));
        });
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }

    #[test]
    fn nested_scopes_restore_outer_value() {
        sync_scope(Some(RequestId::from("outer")), || {
            sync_scope(Some(RequestId::from("inner")), || {
                assert_eq!(get(), Some(RequestId::from("inner")));
            });
            assert_eq!(get(), Some(RequestId::from("outer")));
        });
    }
}
