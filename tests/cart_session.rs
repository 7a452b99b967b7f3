//! End-to-end cart editing against an in-memory database seeded with the
//! bundled catalog.
//!
//! Manzana is listed at 344 per x250gr, Pera at 23 per x100gr. Quantities are
//! typed in thousandths, so:
//!
//! - 500 of Manzana -> 172.00
//! - 250 of Manzana -> 86.00
//! - 1000 of Pera -> 23.00

use std::sync::{Arc, Mutex};

use jiff::Timestamp;
use rust_decimal::Decimal;
use testresult::TestResult;

use pasionaria::{
    carts::{Cart, CartId, CartStatus, ProductCart},
    config::SessionConfig,
    errors::CartError,
    fixtures::{self, Catalog},
    notifications::{NotificationSink, messages},
    pricing::format_currency,
    products::ProductId,
    repositories::{CartRepository, SqliteStore},
    search::SearchOutcome,
    view_model::CartViewModel,
};

const CATALOG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/catalog.yml");

#[derive(Debug, Default)]
struct Recorder {
    messages: Mutex<Vec<String>>,
}

impl Recorder {
    fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for Recorder {
    fn notify(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

struct Session {
    store: Arc<SqliteStore>,
    recorder: Arc<Recorder>,
    view_model: CartViewModel,
    cart: CartId,
}

async fn session(status: CartStatus) -> TestResult<Session> {
    let store = Arc::new(SqliteStore::connect("sqlite::memory:").await?);

    fixtures::seed(&*store, &Catalog::from_path(CATALOG_PATH)?).await?;

    let cart = store
        .upsert_cart(&Cart {
            status: Some(status),
            ..Cart::pending("mostrador", Timestamp::UNIX_EPOCH)
        })
        .await?;

    let recorder = Arc::new(Recorder::default());

    let view_model = CartViewModel::new(
        store.clone(),
        store.clone(),
        recorder.clone(),
        SessionConfig::default().without_focus_delay(),
    );

    view_model.init_screen_by_cart(cart).await?;

    Ok(Session {
        store,
        recorder,
        view_model,
        cart,
    })
}

async fn add(view_model: &CartViewModel, search: &str, quantity: &str) -> TestResult<String> {
    view_model.begin_new_line();
    view_model.update_search_text(search);

    let outcome = view_model.search_products().await?;

    assert_eq!(outcome, SearchOutcome::Shown(1), "{search} matches one product");

    let product = view_model
        .state()
        .search()
        .results()
        .first()
        .cloned()
        .ok_or("search results should not be empty")?;

    view_model.select_product(product);

    let price = view_model.update_quantity(quantity)?;

    view_model.add_product_to_cart().await?;

    Ok(price)
}

#[tokio::test]
async fn building_a_cart_updates_its_stored_total() -> TestResult {
    let Session {
        store,
        recorder,
        view_model,
        cart,
    } = session(CartStatus::Pending).await?;

    let manzana = add(&view_model, "manz", "500").await?;
    let pera = add(&view_model, "PERA", "1000").await?;

    assert_eq!(manzana, format_currency(Decimal::from(172)));
    assert_eq!(pera, format_currency(Decimal::from(23)));
    assert_eq!(view_model.calculate_cart_price(), format_currency(Decimal::from(195)));

    let stored = store.get_cart_with_lines(cart).await?.ok_or("cart should exist")?;

    assert_eq!(stored.total_price, Decimal::from(195));
    assert_eq!(stored.lines.len(), 2, "both lines are stored");
    assert_eq!(recorder.messages(), [messages::LINE_ADDED, messages::LINE_ADDED]);

    Ok(())
}

#[tokio::test]
async fn editing_and_removing_lines() -> TestResult {
    let Session {
        store,
        recorder,
        view_model,
        cart,
    } = session(CartStatus::Pending).await?;

    add(&view_model, "manzana", "500").await?;

    let line = view_model
        .state()
        .cart()
        .and_then(|cart| cart.lines.first().cloned())
        .ok_or("the line should be loaded")?;

    view_model.edit_line(line.clone())?;

    assert!(!view_model.state().can_search(), "search is disabled while editing");

    view_model.update_quantity("250")?;
    view_model.add_product_to_cart().await?;

    let stored = store.get_cart_with_lines(cart).await?.ok_or("cart should exist")?;

    assert_eq!(stored.lines.len(), 1, "the line is replaced");
    assert_eq!(stored.total_price, Decimal::from(86));

    view_model.remove_product_from_cart(&line).await?;

    let stored = store.get_cart_with_lines(cart).await?.ok_or("cart should exist")?;

    assert!(stored.lines.is_empty(), "the line is removed");
    assert_eq!(stored.total_price, Decimal::ZERO);
    assert_eq!(view_model.calculate_cart_price(), format_currency(Decimal::ZERO));
    assert_eq!(
        recorder.messages(),
        [
            messages::LINE_ADDED,
            messages::LINE_UPDATED,
            messages::LINE_REMOVED
        ]
    );

    Ok(())
}

#[tokio::test]
async fn blank_and_unmatched_searches_only_notify() -> TestResult {
    let Session {
        recorder, view_model, ..
    } = session(CartStatus::Pending).await?;

    view_model.update_search_text("");

    let blank = view_model.search_products().await;

    assert!(
        matches!(blank, Err(CartError::EmptySearch)),
        "expected empty search, got {blank:?}"
    );

    view_model.update_search_text("banana");

    let unmatched = view_model.search_products().await?;

    assert_eq!(unmatched, SearchOutcome::NoMatches);
    assert!(!view_model.state().modal_visible(), "modal stays hidden");
    assert_eq!(recorder.messages(), [messages::EMPTY_SEARCH, messages::NO_MATCHES]);

    Ok(())
}

#[tokio::test]
async fn finalized_carts_are_read_only() -> TestResult {
    let Session {
        view_model, cart, ..
    } = session(CartStatus::Finalized).await?;

    view_model.update_search_text("pera");
    view_model.search_products().await?;

    let pera = view_model
        .state()
        .search()
        .results()
        .first()
        .cloned()
        .ok_or("pera should be found")?;

    view_model.select_product(pera);
    view_model.update_quantity("100")?;

    let result = view_model.add_product_to_cart().await;

    assert!(
        matches!(result, Err(CartError::CartNotPending)),
        "expected cart not pending, got {result:?}"
    );
    assert_eq!(
        view_model.state().cart().and_then(|loaded| loaded.id),
        Some(cart)
    );

    Ok(())
}

#[tokio::test]
async fn lines_of_a_finalized_cart_stay_put() -> TestResult {
    let Session {
        store, view_model, ..
    } = session(CartStatus::Pending).await?;

    let closed = store
        .upsert_cart(&Cart::pending("mostrador", Timestamp::UNIX_EPOCH))
        .await?;

    store
        .upsert_line_item(&ProductCart {
            quantity: "500".to_string(),
            total_price: Decimal::from(172),
            ..ProductCart::new(Some(closed), ProductId::new(3))
        })
        .await?;

    let mut finalized = store
        .get_cart_with_lines(closed)
        .await?
        .ok_or("cart should exist")?;
    finalized.status = Some(CartStatus::Finalized);
    store.upsert_cart(&finalized).await?;

    let line = finalized
        .lines
        .first()
        .cloned()
        .ok_or("the line should be stored")?;

    let edited = view_model.edit_line(line.clone());
    let removed = view_model.remove_product_from_cart(&line).await;

    assert!(
        matches!(edited, Err(CartError::LineNotInCart(_))),
        "expected line not in cart, got {edited:?}"
    );
    assert!(
        matches!(removed, Err(CartError::LineNotInCart(_))),
        "expected line not in cart, got {removed:?}"
    );

    let after = store
        .get_cart_with_lines(closed)
        .await?
        .ok_or("cart should exist")?;

    assert_eq!(after.lines.len(), 1, "the finalized cart keeps its line");
    assert_eq!(after.total_price, Decimal::from(172));
    assert_eq!(view_model.calculate_cart_price(), format_currency(Decimal::ZERO));

    Ok(())
}

#[tokio::test]
async fn missing_cart_is_reported() -> TestResult {
    let Session {
        store, recorder, ..
    } = session(CartStatus::Pending).await?;

    let view_model = CartViewModel::new(
        store.clone(),
        store,
        recorder.clone(),
        SessionConfig::default(),
    );

    let result = view_model.init_screen_by_cart(CartId::new(999)).await;

    assert!(
        matches!(result, Err(CartError::CartNotFound(_))),
        "expected cart not found, got {result:?}"
    );
    assert_eq!(recorder.messages(), [messages::CART_NOT_FOUND]);

    Ok(())
}
