//! View state
//!
//! Each screen owns one immutable snapshot. Writers replace the whole snapshot
//! in a single step and observers receive complete snapshots only.

use tokio::sync::watch;

use crate::{carts::Cart, search::ProductSearch, selection::Selection};

/// Snapshot of the cart editing screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartUiState {
    pub(crate) search: ProductSearch,
    pub(crate) selection: Selection,
    pub(crate) cart: Option<Cart>,
}

impl CartUiState {
    /// Search field, results and modal.
    pub fn search(&self) -> &ProductSearch {
        &self.search
    }

    /// The line being added or edited.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The cart being built or viewed.
    pub fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    /// Current search text.
    pub fn search_text(&self) -> &str {
        self.search.text()
    }

    /// Whether the search results modal is open.
    pub fn modal_visible(&self) -> bool {
        self.search.modal_visible()
    }

    /// Whether searching is permitted.
    pub fn can_search(&self) -> bool {
        self.search.enabled()
    }
}

/// Why the quantity field should take focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusReason {
    /// A new line was started.
    NewLine,

    /// A product was picked from the search results.
    ProductSelected,

    /// An existing line was opened for editing.
    EditLine,
}

/// Focus request delivered to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRequest {
    /// What triggered the request
    pub reason: FocusReason,
}

/// Single-writer holder of a view snapshot.
#[derive(Debug)]
pub struct StateStore<S> {
    sender: watch::Sender<S>,
}

impl<S: Clone> StateStore<S> {
    /// Create a store holding `initial`.
    pub fn new(initial: S) -> Self {
        Self {
            sender: watch::Sender::new(initial),
        }
    }

    /// Clone of the current snapshot.
    pub fn snapshot(&self) -> S {
        self.sender.borrow().clone()
    }

    /// Receiver that observes every committed snapshot.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.sender.subscribe()
    }

    /// Replace the snapshot with `next(current)`.
    pub fn update(&self, next: impl FnOnce(&S) -> S) {
        self.sender.send_modify(|state| *state = next(state));
    }

    /// Replace the snapshot with `next(current)` unless it fails.
    ///
    /// On failure the snapshot is left as it was and observers are not woken.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `next`.
    pub fn try_update<E>(&self, next: impl FnOnce(&S) -> Result<S, E>) -> Result<(), E> {
        let mut error = None;

        self.sender.send_if_modified(|state| match next(state) {
            Ok(value) => {
                *state = value;
                true
            }
            Err(source) => {
                error = Some(source);
                false
            }
        });

        error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn update_is_visible_to_subscribers() -> TestResult {
        let store = StateStore::new(1_u32);
        let mut receiver = store.subscribe();

        store.update(|value| value + 1);

        assert!(receiver.has_changed()?);
        assert_eq!(*receiver.borrow_and_update(), 2);
        assert_eq!(store.snapshot(), 2);

        Ok(())
    }

    #[test]
    fn failed_update_leaves_snapshot_and_observers_alone() -> TestResult {
        let store = StateStore::new(String::from("before"));
        let receiver = store.subscribe();

        let result = store.try_update(|_| Err::<String, _>("nope"));

        assert_eq!(result, Err("nope"));
        assert_eq!(store.snapshot(), "before");
        assert!(!receiver.has_changed()?);

        Ok(())
    }

    #[test]
    fn successful_try_update_replaces_snapshot() -> TestResult {
        let store = StateStore::new(CartUiState::default());

        store.try_update(|state| {
            Ok::<_, Infallible>(CartUiState {
                search: state.search.clone().with_text("pera"),
                ..state.clone()
            })
        })?;

        assert_eq!(store.snapshot().search_text(), "pera");

        Ok(())
    }
}
