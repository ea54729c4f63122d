//! Manage saved listings.

use anyhow::Result;
use classifieds_core::favorites::{FavoriteOutcome, FavoritesService};
use classifieds_core::ListingId;

use super::{FavoriteArgs, FavoriteCommand};
use crate::context::Context;
use crate::output::format_price;

/// Run the favorite command.
pub async fn run(args: FavoriteArgs, ctx: &Context) -> Result<()> {
    let backend = ctx.backend().await?;
    let favorites = FavoritesService::new(backend, ctx.session());

    match args.command {
        FavoriteCommand::Add { id } => {
            let id = ListingId::new(id);
            match favorites.add(&id).await? {
                FavoriteOutcome::Added(favorite) => {
                    if ctx.output.is_json() {
                        ctx.output.json(&favorite);
                    }
                    ctx.output.success("Added to favorites");
                }
                FavoriteOutcome::AlreadyFavorited => {
                    if ctx.output.is_json() {
                        ctx.output.json(&serde_json::json!({ "already_favorited": true }));
                    }
                    ctx.output.info("Already in favorites");
                }
            }
        }
        FavoriteCommand::Remove { id } => {
            favorites.remove(&ListingId::new(id)).await?;
            ctx.output.success("Removed from favorites");
        }
        FavoriteCommand::Toggle { id } => {
            let saved = favorites.toggle(&ListingId::new(id)).await?;
            if ctx.output.is_json() {
                ctx.output.json(&serde_json::json!({ "favorited": saved }));
            } else if saved {
                ctx.output.success("Added to favorites");
            } else {
                ctx.output.success("Removed from favorites");
            }
        }
        FavoriteCommand::List => {
            let saved = favorites.list().await?;
            if ctx.output.is_json() {
                ctx.output.json(&saved);
                return Ok(());
            }
            ctx.output.header(&format!("Favorites ({})", saved.len()));
            let currency = ctx.config.wizard.currency;
            for entry in &saved {
                ctx.output.list_item(&format!(
                    "{}  {}  {}",
                    entry.listing.id,
                    entry.listing.title,
                    format_price(&entry.listing, currency)
                ));
            }
        }
    }
    Ok(())
}
