//! Print the category catalog.

use anyhow::{anyhow, Result};
use classifieds_core::catalog::{self, CategoryGroup};

use super::CategoriesArgs;
use crate::context::Context;

/// Run the categories command.
pub async fn run(args: CategoriesArgs, ctx: &Context) -> Result<()> {
    let groups: Vec<&CategoryGroup> = match args.group.as_deref() {
        Some(key) => vec![catalog::find_group(key)
            .ok_or_else(|| anyhow!("Unknown category group: {}", key))?],
        None => catalog::groups().iter().collect(),
    };

    if ctx.output.is_json() {
        ctx.output.json(&groups);
        return Ok(());
    }

    for group in groups {
        ctx.output.header(&format!("{} {}", group.icon(), group.name));
        for category in group.categories {
            ctx.output
                .list_item(&format!("{} {}  ({})", category.icon, category.name, category.slug));
        }
    }
    Ok(())
}
