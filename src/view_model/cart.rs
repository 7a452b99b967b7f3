//! Cart editing screen
//!
//! [`CartViewModel`] owns the [`CartUiState`] snapshot for one editing
//! session. Synchronous actions are pure transitions applied through the
//! [`StateStore`]; async actions fetch or persist first and only then commit
//! a new snapshot, so a failure leaves observers looking at the previous one.

use std::{fmt, sync::Arc};

use rust_decimal::Decimal;
use tokio::{
    runtime::Handle,
    sync::{broadcast, watch},
    time::sleep,
};
use tracing::{debug, info, warn};

use crate::{
    carts::{Cart, CartId, ProductCart, ProductCartId, ProductCartWithData},
    config::SessionConfig,
    errors::CartError,
    notifications::{NotificationSink, messages},
    pricing::{format_currency, sum_line_totals},
    products::ProductWithUnit,
    repositories::{CartRepository, ProductRepository, RepositoryError},
    search::{ProductSearch, SearchOutcome},
    selection::Selection,
    state::{CartUiState, FocusReason, FocusRequest, StateStore},
};

const FOCUS_CHANNEL_CAPACITY: usize = 16;

/// Orchestrates search, selection and persistence for one cart.
pub struct CartViewModel {
    products: Arc<dyn ProductRepository>,
    carts: Arc<dyn CartRepository>,
    notifier: Arc<dyn NotificationSink>,
    config: SessionConfig,
    state: StateStore<CartUiState>,
    focus: broadcast::Sender<FocusRequest>,
}

impl fmt::Debug for CartViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartViewModel")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl CartViewModel {
    /// Create a view model with an empty snapshot.
    pub fn new(
        products: Arc<dyn ProductRepository>,
        carts: Arc<dyn CartRepository>,
        notifier: Arc<dyn NotificationSink>,
        config: SessionConfig,
    ) -> Self {
        let (focus, _) = broadcast::channel(FOCUS_CHANNEL_CAPACITY);

        Self {
            products,
            carts,
            notifier,
            config,
            state: StateStore::new(CartUiState::default()),
            focus,
        }
    }

    /// The current snapshot.
    pub fn state(&self) -> CartUiState {
        self.state.snapshot()
    }

    /// Observe every committed snapshot.
    pub fn subscribe(&self) -> watch::Receiver<CartUiState> {
        self.state.subscribe()
    }

    /// Observe requests to focus the quantity field.
    pub fn focus_requests(&self) -> broadcast::Receiver<FocusRequest> {
        self.focus.subscribe()
    }

    /// Reset the snapshot.
    pub fn clean_state(&self) {
        self.state.update(|_| CartUiState::default());
    }

    /// Load `id` with its lines into a fresh snapshot.
    ///
    /// # Errors
    ///
    /// - [`CartError::CartNotFound`] when no such cart exists.
    /// - [`CartError::DataUnavailable`] when storage fails.
    ///
    /// Either way the user is notified and the snapshot is unchanged.
    pub async fn init_screen_by_cart(&self, id: CartId) -> Result<(), CartError> {
        let cart = self
            .carts
            .get_cart_with_lines(id)
            .await
            .map_err(|error| self.unavailable(error))?;

        let Some(cart) = cart else {
            self.notifier.notify(messages::CART_NOT_FOUND);
            return Err(CartError::CartNotFound(id));
        };

        debug!(%id, lines = cart.lines.len(), "loaded cart");

        self.state.update(|_| CartUiState {
            cart: Some(cart),
            ..CartUiState::default()
        });

        Ok(())
    }

    /// Start a new line: clear search and selection, keep the loaded cart.
    pub fn begin_new_line(&self) {
        self.state.update(|state| CartUiState {
            search: ProductSearch::default(),
            selection: Selection::Empty,
            cart: state.cart.clone(),
        });

        self.request_focus(FocusReason::NewLine);
    }

    /// Replace the search text.
    pub fn update_search_text(&self, text: &str) {
        self.state.update(|state| CartUiState {
            search: state.search.clone().with_text(text),
            ..state.clone()
        });
    }

    /// Search products by the current text and show the matches.
    ///
    /// # Errors
    ///
    /// - [`CartError::SearchDisabled`] while an existing line is being edited.
    /// - [`CartError::EmptySearch`] when the text is blank; the repository is
    ///   not called.
    /// - [`CartError::DataUnavailable`] when storage fails.
    pub async fn search_products(&self) -> Result<SearchOutcome, CartError> {
        let snapshot = self.state.snapshot();

        if !snapshot.can_search() {
            debug!("search is disabled while a line is being edited");
            return Err(CartError::SearchDisabled);
        }

        let Some(query) = snapshot.search.query() else {
            self.notifier.notify(messages::EMPTY_SEARCH);
            return Err(CartError::EmptySearch);
        };

        let results = self
            .products
            .search(query)
            .await
            .map_err(|error| self.unavailable(error))?;

        if results.is_empty() {
            info!(query, "no products matched");
            self.notifier.notify(messages::NO_MATCHES);
            return Ok(SearchOutcome::NoMatches);
        }

        let mut outcome = SearchOutcome::NoMatches;

        self.state.update(|state| {
            let (search, applied) = state.search.clone().with_results(results);
            outcome = applied;

            CartUiState {
                search,
                ..state.clone()
            }
        });

        Ok(outcome)
    }

    /// Close the results modal, keeping the results.
    pub fn cancel_product_search(&self) {
        self.state.update(|state| CartUiState {
            search: state.search.clone().cancelled(),
            ..state.clone()
        });
    }

    /// Make `product` the current selection as a fresh line of the loaded cart.
    pub fn select_product(&self, product: ProductWithUnit) {
        self.state.update(|state| {
            let cart = state.cart.as_ref().and_then(|cart| cart.id);

            CartUiState {
                search: state.search.clone().cancelled(),
                selection: Selection::select(product, cart),
                cart: state.cart.clone(),
            }
        });

        self.request_focus(FocusReason::ProductSelected);
    }

    /// Make an existing line of the loaded cart the current selection.
    ///
    /// Searching is disabled until the line is stored or the edit is cancelled.
    ///
    /// # Errors
    ///
    /// - [`CartError::NoCartLoaded`] when no cart is loaded.
    /// - [`CartError::CartNotPending`] when the cart is not pending.
    /// - [`CartError::LineNotInCart`] when the line belongs to another cart.
    pub fn edit_line(&self, line: ProductCartWithData) -> Result<(), CartError> {
        self.state.try_update(|state| {
            let cart_id = editable_cart(state)?;
            line_of(&line.line, cart_id)?;

            Ok::<_, CartError>(CartUiState {
                search: state.search.clone().cancelled().with_enabled(false),
                selection: Selection::edit(line),
                cart: state.cart.clone(),
            })
        })?;

        self.request_focus(FocusReason::EditLine);

        Ok(())
    }

    /// Drop the current selection and allow searching again.
    pub fn cancel_selection(&self) {
        self.state.update(|state| CartUiState {
            search: state.search.clone().with_enabled(true),
            selection: state.selection.cancel(),
            cart: state.cart.clone(),
        });
    }

    /// Set the typed quantity and reprice the selection in one step.
    ///
    /// Returns the formatted line total. The selection ends up priced rather
    /// than waiting for [`Self::calculate_price`], so the line total shown
    /// always matches the typed quantity.
    ///
    /// # Errors
    ///
    /// [`CartError::InvalidState`] when nothing is selected; the snapshot is
    /// unchanged.
    pub fn update_quantity(&self, text: &str) -> Result<String, CartError> {
        let mut formatted = String::new();

        self.state
            .try_update(|state| {
                let (selection, price) = state.selection.with_quantity(text)?.priced()?;
                formatted = price;

                Ok::<_, CartError>(CartUiState {
                    selection,
                    ..state.clone()
                })
            })
            .inspect_err(|error| debug!(%error, "quantity not updated"))?;

        Ok(formatted)
    }

    /// Reprice the selection at its current quantity.
    ///
    /// Returns the formatted line total.
    ///
    /// # Errors
    ///
    /// [`CartError::InvalidState`] when nothing is selected; the snapshot is
    /// unchanged.
    pub fn calculate_price(&self) -> Result<String, CartError> {
        let mut formatted = String::new();

        self.state
            .try_update(|state| {
                let (selection, price) = state.selection.priced()?;
                formatted = price;

                Ok::<_, CartError>(CartUiState {
                    selection,
                    ..state.clone()
                })
            })
            .inspect_err(|error| debug!(%error, "price not calculated"))?;

        Ok(formatted)
    }

    /// Formatted sum of the loaded cart's line totals.
    pub fn calculate_cart_price(&self) -> String {
        let total = self.state.snapshot().cart.map_or(Decimal::ZERO, |cart| {
            sum_line_totals(cart.lines.iter().map(|line| line.line.total_price))
        });

        format_currency(total)
    }

    /// Format an amount the way prices are shown.
    pub fn format_price(value: Decimal) -> String {
        format_currency(value)
    }

    /// Whether a line is selected, so its quantity can be typed.
    pub fn can_edit_quantity(&self) -> bool {
        !self.state.snapshot().selection.is_empty()
    }

    /// Whether the selection can be added to the cart.
    pub fn can_add_product(&self) -> bool {
        self.state.snapshot().selection.can_commit()
    }

    /// Store the current selection in the loaded cart.
    ///
    /// A line without an id is added, one with an id replaces the stored
    /// line. Afterwards the cart is reloaded, the selection cleared and
    /// searching allowed again.
    ///
    /// # Errors
    ///
    /// - [`CartError::NoCartLoaded`] when no cart is loaded.
    /// - [`CartError::CartNotPending`] when the cart is not pending.
    /// - [`CartError::LineNotInCart`] when an edited line belongs to another
    ///   cart.
    /// - [`CartError::InvalidState`] when nothing is selected or the quantity
    ///   is not above zero.
    /// - [`CartError::DataUnavailable`] when storage fails. If only the reload
    ///   fails the line is stored and the selection cleared, but the previous
    ///   cart stays in the snapshot.
    pub async fn add_product_to_cart(&self) -> Result<ProductCartId, CartError> {
        let snapshot = self.state.snapshot();
        let cart_id = editable_cart(&snapshot)?;

        let mut pending = snapshot
            .selection
            .pending_commit()
            .inspect_err(|error| debug!(%error, "selection cannot be stored"))?;

        line_of(&pending.line, cart_id)?;
        pending.line.cart_id = Some(cart_id);

        let committed = snapshot.selection.commit()?;

        let id = self
            .carts
            .upsert_line_item(&pending.line)
            .await
            .map_err(|error| self.unavailable(error))?;

        let message = if pending.line.is_persisted() {
            messages::LINE_UPDATED
        } else {
            messages::LINE_ADDED
        };

        info!(%cart_id, line = %id, "stored line");
        self.notifier.notify(message);

        let reloaded = self.reload(cart_id).await;

        self.state.update(|state| CartUiState {
            search: state.search.clone().with_enabled(true),
            selection: committed,
            cart: match &reloaded {
                Ok(Some(cart)) => Some(cart.clone()),
                Ok(None) | Err(_) => state.cart.clone(),
            },
        });

        reloaded?;

        Ok(id)
    }

    /// Delete a stored line of the loaded cart and reload the cart.
    ///
    /// # Errors
    ///
    /// - [`CartError::NoCartLoaded`] when no cart is loaded.
    /// - [`CartError::CartNotPending`] when the cart is not pending.
    /// - [`CartError::LineNotInCart`] when the line belongs to another cart.
    /// - [`CartError::DataUnavailable`] when storage fails.
    pub async fn remove_product_from_cart(&self, line: &ProductCartWithData) -> Result<(), CartError> {
        let cart_id = editable_cart(&self.state.snapshot())?;
        line_of(&line.line, cart_id)?;

        self.carts
            .delete_line_item(&line.line)
            .await
            .map_err(|error| self.unavailable(error))?;

        info!(%cart_id, line = ?line.line.id, "removed line");
        self.notifier.notify(messages::LINE_REMOVED);

        let reloaded = self.reload(cart_id).await?;
        let removed = line.line.id;

        self.state.update(|state| {
            let editing_removed = removed.is_some()
                && state
                    .selection
                    .current()
                    .is_some_and(|current| current.line.id == removed);

            CartUiState {
                search: if editing_removed {
                    state.search.clone().with_enabled(true)
                } else {
                    state.search.clone()
                },
                selection: if editing_removed {
                    Selection::Empty
                } else {
                    state.selection.clone()
                },
                cart: reloaded.or_else(|| state.cart.clone()),
            }
        });

        Ok(())
    }

    async fn reload(&self, id: CartId) -> Result<Option<Cart>, CartError> {
        self.carts
            .get_cart_with_lines(id)
            .await
            .map_err(|error| self.unavailable(error))
    }

    fn unavailable(&self, error: RepositoryError) -> CartError {
        warn!(%error, "storage request failed");
        self.notifier.notify(messages::DATA_UNAVAILABLE);

        CartError::DataUnavailable(error)
    }

    /// Publish a focus request once the configured delay has passed.
    ///
    /// Always called after the snapshot update that caused it.
    fn request_focus(&self, reason: FocusReason) {
        let request = FocusRequest { reason };
        let delay = self.config.focus_delay;

        match Handle::try_current() {
            Ok(handle) if !delay.is_zero() => {
                let sender = self.focus.clone();

                let _focus = handle.spawn(async move {
                    sleep(delay).await;
                    deliver_focus(&sender, request);
                });
            }
            Ok(_) | Err(_) => deliver_focus(&self.focus, request),
        }
    }
}

fn deliver_focus(sender: &broadcast::Sender<FocusRequest>, request: FocusRequest) {
    if sender.send(request).is_err() {
        debug!(reason = ?request.reason, "no focus subscribers");
    }
}

/// The id of the loaded cart, if its lines may be changed.
fn editable_cart(state: &CartUiState) -> Result<CartId, CartError> {
    let cart = state.cart.as_ref().ok_or(CartError::NoCartLoaded)?;

    if !cart.allows_line_edits() {
        return Err(CartError::CartNotPending);
    }

    cart.id.ok_or(CartError::NoCartLoaded)
}

/// Stored lines must belong to `cart`; a fresh line may not have a cart yet.
fn line_of(line: &ProductCart, cart: CartId) -> Result<(), CartError> {
    match line.cart_id {
        Some(owner) if owner == cart => Ok(()),
        None if !line.is_persisted() => Ok(()),
        _ => {
            warn!(line = ?line.id, owner = ?line.cart_id, %cart, "line belongs to another cart");
            Err(CartError::LineNotInCart(cart))
        }
    }
}
