use std::{io::Write, sync::Arc};

use clap::Args;
use pasionaria::{
    carts::{Cart, CartId, CartStatus, ProductCartId},
    notifications::LogNotifier,
    pricing::format_currency,
    products::ProductId,
    repositories::{CartRepository, ProductRepository},
    view_model::{CartListViewModel, CartViewModel},
};
use tabled::builder::Builder;

use super::{
    Context,
    output::{write_line, write_table},
};

#[derive(Debug, Args)]
pub(crate) struct CartsArgs {
    /// Statuses to list (INACTIVE, PENDING, FINALIZED); PENDING when omitted
    #[arg(long = "status")]
    statuses: Vec<CartStatus>,
}

#[derive(Debug, Args)]
pub(crate) struct AddArgs {
    /// Cart id
    #[arg(long)]
    cart: i64,

    /// Product id
    #[arg(long)]
    product: i64,

    /// Quantity as typed at the counter (e.g. grams)
    #[arg(long)]
    quantity: String,
}

#[derive(Debug, Args)]
pub(crate) struct RemoveArgs {
    /// Cart id
    #[arg(long)]
    cart: i64,

    /// Line id
    #[arg(long)]
    line: i64,
}

pub(crate) async fn list(
    args: CartsArgs,
    context: &Context,
    out: &mut impl Write,
) -> Result<(), String> {
    let statuses = if args.statuses.is_empty() {
        vec![CartStatus::Pending]
    } else {
        args.statuses
    };

    let carts = context
        .store
        .list_carts_by_status(&statuses)
        .await
        .map_err(|error| format!("failed to list carts: {error}"))?;

    if carts.is_empty() {
        return write_line(out, "no carts found");
    }

    let mut builder = Builder::default();
    builder.push_record(["Id", "Estado", "Creado", "Vendedor", "Total", "Acciones"]);

    for cart in &carts {
        builder.push_record(cart_row(cart));
    }

    write_table(out, builder, &[0, 4])
}

pub(crate) async fn create(context: &Context, out: &mut impl Write) -> Result<(), String> {
    let view_model = CartListViewModel::new(
        context.store.clone(),
        Arc::new(LogNotifier),
        context.session_config(),
    );

    let id = view_model
        .create_cart()
        .await
        .map_err(|error| format!("failed to create cart: {error}"))?;

    write_line(out, &format!("cart_id: {id}"))
}

pub(crate) async fn add(args: AddArgs, context: &Context, out: &mut impl Write) -> Result<(), String> {
    let view_model = cart_view_model(context);
    let cart_id = CartId::new(args.cart);

    view_model
        .init_screen_by_cart(cart_id)
        .await
        .map_err(|error| format!("failed to load cart: {error}"))?;

    let product = context
        .store
        .get_by_id(ProductId::new(args.product))
        .await
        .map_err(|error| format!("failed to load product: {error}"))?
        .ok_or_else(|| format!("product {} not found", args.product))?;

    let existing = view_model
        .state()
        .cart()
        .and_then(|cart| {
            cart.lines
                .iter()
                .find(|line| line.line.product_id == product.id())
                .cloned()
        });

    match existing {
        Some(line) => view_model
            .edit_line(line)
            .map_err(|error| format!("failed to edit line: {error}"))?,
        None => view_model.begin_new_line(),
    }

    if view_model.state().selection().is_empty() {
        view_model.select_product(product);
    }

    let price = view_model
        .update_quantity(&args.quantity)
        .map_err(|error| format!("failed to set quantity: {error}"))?;

    let line = view_model
        .add_product_to_cart()
        .await
        .map_err(|error| format!("failed to add product: {error}"))?;

    write_line(out, &format!("line_id: {line}"))?;
    write_line(out, &format!("line_total: {price}"))?;
    write_line(out, &format!("cart_total: {}", view_model.calculate_cart_price()))
}

pub(crate) async fn remove(
    args: RemoveArgs,
    context: &Context,
    out: &mut impl Write,
) -> Result<(), String> {
    let view_model = cart_view_model(context);

    view_model
        .init_screen_by_cart(CartId::new(args.cart))
        .await
        .map_err(|error| format!("failed to load cart: {error}"))?;

    let line_id = ProductCartId::new(args.line);

    let line = view_model
        .state()
        .cart()
        .and_then(|cart| cart.lines.iter().find(|line| line.line.id == Some(line_id)).cloned())
        .ok_or_else(|| format!("line {line_id} not found in cart {}", args.cart))?;

    view_model
        .remove_product_from_cart(&line)
        .await
        .map_err(|error| format!("failed to remove line: {error}"))?;

    write_line(out, &format!("cart_total: {}", view_model.calculate_cart_price()))
}

fn cart_view_model(context: &Context) -> CartViewModel {
    CartViewModel::new(
        context.store.clone(),
        context.store.clone(),
        Arc::new(LogNotifier),
        context.session_config(),
    )
}

fn cart_row(cart: &Cart) -> [String; 6] {
    let actions = CartListViewModel::cart_actions(cart);

    [
        cart.id.map_or_else(String::new, |id| id.get().to_string()),
        cart.status.map_or("-", CartStatus::label).to_string(),
        cart.created_at.to_string(),
        cart.seller.clone(),
        format_currency(cart.total_price),
        if actions.edit_lines && actions.delete {
            "editar, eliminar".to_string()
        } else {
            String::new()
        },
    ]
}
