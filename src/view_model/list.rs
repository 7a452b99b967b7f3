//! Cart list screen

use std::{fmt, sync::Arc};

use jiff::Timestamp;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    carts::{Cart, CartActions, CartId, CartStatus},
    config::SessionConfig,
    errors::CartError,
    notifications::{NotificationSink, messages},
    repositories::{CartRepository, RepositoryError},
    state::StateStore,
};

/// One status filter chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFilter {
    /// Status the chip filters on
    pub status: CartStatus,

    /// Whether carts with this status are listed
    pub active: bool,
}

/// Snapshot of the cart list screen.
#[derive(Debug, Clone, PartialEq)]
pub struct CartListState {
    filters: Vec<StatusFilter>,
    carts: Vec<Cart>,
}

impl Default for CartListState {
    fn default() -> Self {
        Self {
            filters: CartStatus::ALL
                .into_iter()
                .map(|status| StatusFilter {
                    status,
                    active: status == CartStatus::Pending,
                })
                .collect(),
            carts: Vec::new(),
        }
    }
}

impl CartListState {
    /// Every chip, in lifecycle order.
    pub fn filters(&self) -> &[StatusFilter] {
        &self.filters
    }

    /// Carts matching the active chips, newest first.
    pub fn carts(&self) -> &[Cart] {
        &self.carts
    }

    /// Statuses whose chip is active.
    pub fn active_statuses(&self) -> Vec<CartStatus> {
        self.filters
            .iter()
            .filter(|filter| filter.active)
            .map(|filter| filter.status)
            .collect()
    }

    fn toggled(&self, status: CartStatus) -> Vec<StatusFilter> {
        self.filters
            .iter()
            .map(|filter| StatusFilter {
                active: filter.active != (filter.status == status),
                ..*filter
            })
            .collect()
    }
}

/// Lists carts by status and creates or deletes them.
pub struct CartListViewModel {
    carts: Arc<dyn CartRepository>,
    notifier: Arc<dyn NotificationSink>,
    config: SessionConfig,
    state: StateStore<CartListState>,
}

impl fmt::Debug for CartListViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartListViewModel")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl CartListViewModel {
    /// Create a view model with only the pending chip active and no carts
    /// loaded.
    pub fn new(
        carts: Arc<dyn CartRepository>,
        notifier: Arc<dyn NotificationSink>,
        config: SessionConfig,
    ) -> Self {
        Self {
            carts,
            notifier,
            config,
            state: StateStore::new(CartListState::default()),
        }
    }

    /// The current snapshot.
    pub fn state(&self) -> CartListState {
        self.state.snapshot()
    }

    /// Observe every committed snapshot.
    pub fn subscribe(&self) -> watch::Receiver<CartListState> {
        self.state.subscribe()
    }

    /// Reload carts for the active chips.
    ///
    /// # Errors
    ///
    /// [`CartError::DataUnavailable`] when storage fails; the list is unchanged.
    pub async fn load(&self) -> Result<(), CartError> {
        let statuses = self.state.snapshot().active_statuses();
        let carts = self.fetch(&statuses).await?;

        self.state.update(|state| CartListState {
            carts,
            ..state.clone()
        });

        Ok(())
    }

    /// Flip the chip for `status` and reload.
    ///
    /// # Errors
    ///
    /// [`CartError::DataUnavailable`] when storage fails; neither the chip
    /// nor the list change.
    pub async fn toggle_status(&self, status: CartStatus) -> Result<(), CartError> {
        let filters = self.state.snapshot().toggled(status);

        let statuses: Vec<CartStatus> = filters
            .iter()
            .filter(|filter| filter.active)
            .map(|filter| filter.status)
            .collect();

        let carts = self.fetch(&statuses).await?;

        self.state.update(|_| CartListState { filters, carts });

        Ok(())
    }

    /// Store a new pending cart for the session's seller and reload.
    ///
    /// # Errors
    ///
    /// [`CartError::DataUnavailable`] when the cart cannot be stored. A
    /// failed reload afterwards is only logged.
    pub async fn create_cart(&self) -> Result<CartId, CartError> {
        let cart = Cart::pending(self.config.seller.as_str(), Timestamp::now());

        let id = self
            .carts
            .upsert_cart(&cart)
            .await
            .map_err(|error| self.unavailable(error))?;

        info!(%id, seller = %cart.seller, "created cart");
        self.notifier.notify(messages::CART_CREATED);

        self.refresh().await;

        Ok(id)
    }

    /// Delete a pending cart with its lines and reload.
    ///
    /// # Errors
    ///
    /// - [`CartError::CartNotPending`] when the cart is not pending; storage is
    ///   not touched.
    /// - [`CartError::DataUnavailable`] when storage fails.
    pub async fn delete_cart(&self, cart: &Cart) -> Result<(), CartError> {
        if !cart.allows_line_edits() {
            warn!(cart = ?cart.id, status = ?cart.status, "only pending carts can be deleted");
            return Err(CartError::CartNotPending);
        }

        self.carts
            .delete_cart(cart)
            .await
            .map_err(|error| self.unavailable(error))?;

        info!(cart = ?cart.id, "deleted cart");
        self.notifier.notify(messages::CART_DELETED);

        self.refresh().await;

        Ok(())
    }

    /// Affordances shown on a cart's card.
    pub fn cart_actions(cart: &Cart) -> CartActions {
        cart.actions()
    }

    async fn refresh(&self) {
        if let Err(error) = self.load().await {
            warn!(%error, "cart list not refreshed");
        }
    }

    async fn fetch(&self, statuses: &[CartStatus]) -> Result<Vec<Cart>, CartError> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        self.carts
            .list_carts_by_status(statuses)
            .await
            .map_err(|error| self.unavailable(error))
    }

    fn unavailable(&self, error: RepositoryError) -> CartError {
        warn!(%error, "storage request failed");
        self.notifier.notify(messages::DATA_UNAVAILABLE);

        CartError::DataUnavailable(error)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::{
        notifications::MockNotificationSink,
        repositories::MockCartRepository,
        test::fixtures::stored_cart,
    };

    fn view_model(carts: MockCartRepository, notifier: MockNotificationSink) -> CartListViewModel {
        CartListViewModel::new(
            Arc::new(carts),
            Arc::new(notifier),
            SessionConfig {
                seller: "ana".to_string(),
                ..SessionConfig::default()
            },
        )
    }

    fn notifies(message: &'static str) -> MockNotificationSink {
        let mut notifier = MockNotificationSink::new();

        notifier
            .expect_notify()
            .once()
            .withf(move |text| text == message)
            .return_const(());

        notifier
    }

    #[test]
    fn only_pending_is_active_by_default() {
        let state = CartListState::default();

        assert_eq!(state.filters().len(), CartStatus::ALL.len());
        assert_eq!(state.active_statuses(), [CartStatus::Pending]);
        assert!(state.carts().is_empty(), "nothing loaded yet");
    }

    #[tokio::test]
    async fn load_lists_carts_for_active_statuses() -> TestResult {
        let mut carts = MockCartRepository::new();

        carts
            .expect_list_carts_by_status()
            .once()
            .withf(|statuses| statuses.to_vec() == [CartStatus::Pending])
            .return_once(|_| Ok(vec![stored_cart(2, CartStatus::Pending, Vec::new())]));

        let view_model = view_model(carts, MockNotificationSink::new());

        view_model.load().await?;

        assert_eq!(view_model.state().carts().len(), 1, "one pending cart");

        Ok(())
    }

    #[tokio::test]
    async fn toggling_adds_the_status_to_the_query() -> TestResult {
        let mut carts = MockCartRepository::new();

        carts
            .expect_list_carts_by_status()
            .once()
            .withf(|statuses| statuses.to_vec() == [CartStatus::Pending, CartStatus::Finalized])
            .return_once(|_| {
                Ok(vec![
                    stored_cart(3, CartStatus::Finalized, Vec::new()),
                    stored_cart(2, CartStatus::Pending, Vec::new()),
                ])
            });

        let view_model = view_model(carts, MockNotificationSink::new());

        view_model.toggle_status(CartStatus::Finalized).await?;

        let state = view_model.state();

        assert_eq!(
            state.active_statuses(),
            [CartStatus::Pending, CartStatus::Finalized]
        );
        assert_eq!(state.carts().len(), 2, "both carts are listed");

        Ok(())
    }

    #[tokio::test]
    async fn no_active_chip_lists_nothing_without_querying() -> TestResult {
        let mut carts = MockCartRepository::new();
        carts.expect_list_carts_by_status().never();

        let view_model = view_model(carts, MockNotificationSink::new());

        view_model.toggle_status(CartStatus::Pending).await?;

        let state = view_model.state();

        assert!(state.active_statuses().is_empty(), "every chip is off");
        assert!(state.carts().is_empty(), "nothing is listed");

        Ok(())
    }

    #[tokio::test]
    async fn failed_toggle_keeps_the_chip() {
        let mut carts = MockCartRepository::new();

        carts
            .expect_list_carts_by_status()
            .once()
            .return_once(|_| Err(RepositoryError::NotFound));

        let view_model = view_model(carts, notifies(messages::DATA_UNAVAILABLE));

        let result = view_model.toggle_status(CartStatus::Inactive).await;

        assert!(
            matches!(result, Err(CartError::DataUnavailable(_))),
            "expected data unavailable, got {result:?}"
        );
        assert_eq!(view_model.state(), CartListState::default());
    }

    #[tokio::test]
    async fn create_cart_stores_a_pending_cart_for_the_seller() -> TestResult {
        let mut carts = MockCartRepository::new();

        carts
            .expect_upsert_cart()
            .once()
            .withf(|cart: &Cart| {
                cart.id.is_none()
                    && cart.status == Some(CartStatus::Pending)
                    && cart.seller == "ana"
                    && cart.lines.is_empty()
            })
            .return_once(|_| Ok(CartId::new(9)));

        carts
            .expect_list_carts_by_status()
            .once()
            .return_once(|_| Ok(vec![stored_cart(9, CartStatus::Pending, Vec::new())]));

        let view_model = view_model(carts, notifies(messages::CART_CREATED));

        let id = view_model.create_cart().await?;

        assert_eq!(id, CartId::new(9));
        assert_eq!(
            view_model.state().carts().first().and_then(|cart| cart.id),
            Some(id)
        );

        Ok(())
    }

    #[tokio::test]
    async fn only_pending_carts_can_be_deleted() {
        let mut carts = MockCartRepository::new();
        carts.expect_delete_cart().never();

        let view_model = view_model(carts, MockNotificationSink::new());
        let finalized = stored_cart(4, CartStatus::Finalized, Vec::new());

        let result = view_model.delete_cart(&finalized).await;

        assert!(
            matches!(result, Err(CartError::CartNotPending)),
            "expected cart not pending, got {result:?}"
        );
    }

    #[tokio::test]
    async fn deleting_a_pending_cart_notifies_and_reloads() -> TestResult {
        let mut carts = MockCartRepository::new();

        carts
            .expect_delete_cart()
            .once()
            .withf(|cart: &Cart| cart.id == Some(CartId::new(5)))
            .return_once(|_| Ok(()));

        carts
            .expect_list_carts_by_status()
            .once()
            .return_once(|_| Ok(Vec::new()));

        let view_model = view_model(carts, notifies(messages::CART_DELETED));

        view_model
            .delete_cart(&stored_cart(5, CartStatus::Pending, Vec::new()))
            .await?;

        assert!(view_model.state().carts().is_empty(), "the list is reloaded");

        Ok(())
    }

    #[test]
    fn cart_actions_follow_status() {
        let pending = stored_cart(1, CartStatus::Pending, Vec::new());
        let inactive = stored_cart(2, CartStatus::Inactive, Vec::new());

        assert!(CartListViewModel::cart_actions(&pending).delete, "pending carts can be deleted");
        assert!(
            !CartListViewModel::cart_actions(&inactive).edit_lines,
            "inactive carts are read-only"
        );
    }
}
