use std::io::Write;

use clap::Args;
use pasionaria::{
    fixtures::{self, Catalog},
    pricing::{compute_line_total, format_currency},
    products::{ProductId, ProductWithUnit},
    repositories::ProductRepository,
};
use tabled::builder::Builder;

use super::{
    Context,
    output::{write_line, write_table},
};

#[derive(Debug, Args)]
pub(crate) struct ProductsArgs {
    /// Only products whose name contains this text
    #[arg(long)]
    search: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct QuoteArgs {
    /// Product id
    #[arg(long)]
    product: i64,

    /// Quantity as typed at the counter (e.g. grams)
    #[arg(long)]
    quantity: String,
}

pub(crate) async fn seed(context: &Context, out: &mut impl Write) -> Result<(), String> {
    let path = &context.session.fixtures_path;

    let catalog = Catalog::from_path(path)
        .map_err(|error| format!("failed to load {}: {error}", path.display()))?;

    fixtures::seed(&*context.store, &catalog)
        .await
        .map_err(|error| format!("failed to seed catalog: {error}"))?;

    write_line(
        out,
        &format!(
            "seeded {} units and {} products",
            catalog.units.len(),
            catalog.products.len()
        ),
    )
}

pub(crate) async fn products(
    args: ProductsArgs,
    context: &Context,
    out: &mut impl Write,
) -> Result<(), String> {
    let products = match args.search.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => context.store.search(text).await,
        Some(_) => return Err("search text must not be empty".to_string()),
        None => context.store.list_all().await,
    }
    .map_err(|error| format!("failed to list products: {error}"))?;

    if products.is_empty() {
        return write_line(out, "no products found");
    }

    let mut builder = Builder::default();
    builder.push_record(["Id", "Nombre", "Descripción", "Precio", "Unidad"]);

    for product in &products {
        builder.push_record(product_row(product));
    }

    write_table(out, builder, &[0, 3])
}

pub(crate) async fn units(context: &Context, out: &mut impl Write) -> Result<(), String> {
    let units = context
        .store
        .list_units()
        .await
        .map_err(|error| format!("failed to list units: {error}"))?;

    if units.is_empty() {
        return write_line(out, "no units found");
    }

    let mut builder = Builder::default();
    builder.push_record(["Id", "Nombre", "Fracción", "Tipo"]);

    for unit in &units {
        builder.push_record([
            unit.id.to_string(),
            unit.name.clone(),
            unit.fraction.to_string(),
            unit.kind.to_string(),
        ]);
    }

    write_table(out, builder, &[0, 2])
}

pub(crate) async fn quote(
    args: QuoteArgs,
    context: &Context,
    out: &mut impl Write,
) -> Result<(), String> {
    let product = context
        .store
        .get_by_id(ProductId::new(args.product))
        .await
        .map_err(|error| format!("failed to load product: {error}"))?
        .ok_or_else(|| format!("product {} not found", args.product))?;

    let total = compute_line_total(
        product.product.price_list,
        product.unit.fraction,
        &args.quantity,
    );

    write_line(
        out,
        &format!("{} x {}: {}", product.name(), args.quantity, format_currency(total)),
    )
}

fn product_row(product: &ProductWithUnit) -> [String; 5] {
    [
        product.id().to_string(),
        product.product.name.clone(),
        product.product.description.clone(),
        format_currency(product.product.price_list),
        product.unit.name.clone(),
    ]
}
