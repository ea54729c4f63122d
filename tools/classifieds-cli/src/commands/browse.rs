//! Browse active listings.

use anyhow::Result;
use classifieds_core::listing::{ListingQuery, ListingsService, SortOption};

use super::BrowseArgs;
use crate::context::Context;
use crate::output::{ellipsize, format_price};

/// Run the browse command.
pub async fn run(args: BrowseArgs, ctx: &Context) -> Result<()> {
    let backend = ctx.backend().await?;
    let listings = ListingsService::new(backend, ctx.session());

    let mut query = ListingQuery::new()
        .with_price_range(args.min_price, args.max_price)
        .with_sort(SortOption::from_key(&args.sort))
        .with_pagination(args.page, args.per_page);
    if let Some(category) = args.category {
        query = query.with_category(category);
    }
    if let Some(location) = args.location {
        query = query.with_location(location);
    }
    if let Some(condition) = args.condition {
        query = query.with_condition(condition);
    }

    let results = listings.browse(&query).await?;

    if ctx.output.is_json() {
        ctx.output.json(&results);
        return Ok(());
    }

    ctx.output.header(&format!(
        "Listings ({}, page {})",
        query.sort.display_name(),
        query.page
    ));
    if results.is_empty() {
        ctx.output.info("No listings match");
        return Ok(());
    }

    let widths = [36, 32, 14, 20];
    ctx.output.table_row(&["ID", "TITLE", "PRICE", "LOCATION"], &widths);
    let currency = ctx.config.wizard.currency;
    for listing in &results {
        let title = ellipsize(&listing.title, 32);
        let price = format_price(listing, currency);
        let address = ellipsize(&listing.location.address, 20);
        ctx.output.table_row(
            &[listing.id.as_str(), title.as_str(), price.as_str(), address.as_str()],
            &widths,
        );
    }
    if results.len() == query.per_page {
        ctx.output
            .info(&format!("More results with --page {}", query.page + 1));
    }
    Ok(())
}
