//! Show one listing.

use anyhow::Result;
use classifieds_core::favorites::FavoritesService;
use classifieds_core::listing::ListingsService;
use classifieds_core::ListingId;

use super::ShowArgs;
use crate::context::Context;
use crate::output::{format_price, status_badge};

/// Run the show command.
pub async fn run(args: ShowArgs, ctx: &Context) -> Result<()> {
    let backend = ctx.backend().await?;
    let session = ctx.session();
    let listings = ListingsService::new(backend.clone(), session.clone());
    let favorites = FavoritesService::new(backend, session);

    let id = ListingId::new(args.id);
    let listing = listings.get(&id).await?;
    let saved = favorites.is_favorited(&id).await?;

    if ctx.output.is_json() {
        ctx.output
            .json(&serde_json::json!({ "listing": listing, "favorited": saved }));
        return Ok(());
    }

    ctx.output.header(&listing.title);
    ctx.output
        .kv("Price", &format_price(&listing, ctx.config.wizard.currency));
    ctx.output.kv("Status", &status_badge(listing.status));
    ctx.output.kv("Category", listing.category_id.as_str());
    ctx.output.kv("Location", &listing.location.address);
    for (label, value) in [
        ("Condition", &listing.condition),
        ("Brand", &listing.brand),
        ("Model", &listing.model),
    ] {
        if let Some(value) = value {
            ctx.output.kv(label, value);
        }
    }
    if let Some(year) = listing.year {
        ctx.output.kv("Year", &year.to_string());
    }
    ctx.output.kv("Seller", listing.seller_id.as_str());
    ctx.output
        .kv("Posted", &listing.created_at.format("%Y-%m-%d %H:%M").to_string());
    ctx.output.kv("Saved", if saved { "yes" } else { "no" });

    if !listing.description.is_empty() {
        ctx.output.info(&listing.description);
    }
    for url in &listing.images {
        ctx.output.list_item(url);
    }
    Ok(())
}
