//! Post a listing through the five-step wizard.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use classifieds_core::wizard::{ImageFile, ListingWizard, Navigation, WizardError};
use dialoguer::{Confirm, Input, Select};

use super::PostArgs;
use crate::context::Context;
use crate::output::{format_bytes, format_price};

/// Run the post command.
pub async fn run(args: PostArgs, ctx: &Context) -> Result<()> {
    let interactive = !args.yes && !ctx.output.is_json() && console::user_attended();
    let backend = ctx.backend().await?;
    let mut wizard = ListingWizard::with_config(backend, ctx.session(), ctx.config.wizard.clone());
    let strict = wizard.config().require_details;

    ctx.output.header("Post an ad");

    // Step 1: category group
    announce(ctx, &wizard);
    let group = match args.group {
        Some(group) => group,
        None if interactive => {
            let groups = wizard.available_groups();
            let labels: Vec<String> = groups
                .iter()
                .map(|g| format!("{} {}", g.icon(), g.name))
                .collect();
            let picked = Select::new()
                .with_prompt("Category")
                .items(&labels)
                .default(0)
                .interact()?;
            groups[picked].name.to_string()
        }
        None => bail!("--group is required"),
    };
    wizard.select_group(&group).map_err(failure)?;

    // Step 2: subcategory
    announce(ctx, &wizard);
    let category = match args.category {
        Some(category) => category,
        None if interactive => {
            let categories = wizard.available_categories();
            let labels: Vec<String> = categories
                .iter()
                .map(|c| format!("{} {}", c.icon, c.name))
                .collect();
            let picked = Select::new()
                .with_prompt("Subcategory")
                .items(&labels)
                .default(0)
                .interact()?;
            categories[picked].name.to_string()
        }
        None => bail!("--category is required"),
    };
    let category = wizard.select_category(&category).map_err(failure)?;
    ctx.output.debug(&format!("Category id: {}", category.slug));

    // Step 3: details
    announce(ctx, &wizard);
    let title = field(args.title, interactive, "Ad title", "title", strict)?;
    wizard.set_title(&title).map_err(failure)?;
    if title.chars().count() > wizard.config().title_max_chars {
        ctx.output.warn(&format!(
            "Title shortened to {} characters",
            wizard.config().title_max_chars
        ));
    }
    let description = field(args.description, interactive, "Description", "description", strict)?;
    wizard.set_description(&description).map_err(failure)?;
    let brand = field(args.brand, interactive, "Brand", "brand", strict)?;
    wizard.set_brand(&brand).map_err(failure)?;
    wizard
        .set_condition(&field(args.condition, interactive, "Condition", "condition", false)?)
        .map_err(failure)?;
    wizard
        .set_model(&field(args.model, interactive, "Model", "model", false)?)
        .map_err(failure)?;
    wizard
        .set_year(&field(args.year, interactive, "Year", "year", false)?)
        .map_err(failure)?;
    wizard.next().map_err(failure)?;

    // Step 4: photos
    announce(ctx, &wizard);
    let mut paths = args.images;
    if paths.is_empty() && interactive {
        let typed: String = Input::new()
            .with_prompt("Photo files (comma separated, blank for none)")
            .allow_empty(true)
            .interact_text()?;
        paths = typed
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| ctx.resolve_path(p))
            .collect();
    }
    wizard.check_image_count(paths.len()).map_err(failure)?;
    let images = read_images(ctx, &paths).await?;
    wizard.select_images(images).map_err(failure)?;
    wizard.next().map_err(failure)?;

    // Step 5: price and location
    announce(ctx, &wizard);
    let price = field(args.price, interactive, "Price", "price", true)?;
    wizard.set_price(&price).map_err(failure)?;
    let location = field(args.location, interactive, "Location", "location", true)?;
    wizard.set_location(&location).map_err(failure)?;

    if interactive {
        let confirmed = Confirm::new()
            .with_prompt("Post now?")
            .default(true)
            .interact()?;
        if !confirmed {
            ctx.output.warn("Listing not posted");
            return Ok(());
        }
    }

    let spinner = ctx.output.spinner(&format!(
        "Uploading {} photo(s) and posting...",
        wizard.draft().images.len()
    ));
    let result = wizard.submit().await;
    spinner.finish_and_clear();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            if e.navigation() == Some(Navigation::SignIn) {
                ctx.output
                    .info("Pass --as <user-id> or set backend.default_user in classifieds.toml");
            }
            return Err(failure(e));
        }
    };

    let listing = outcome.listing;
    if ctx.output.is_json() {
        ctx.output.json(&listing);
        return Ok(());
    }

    ctx.output.success("Listing created successfully!");
    ctx.output.kv("ID", listing.id.as_str());
    ctx.output.kv("Title", &listing.title);
    ctx.output.kv("Category", listing.category_id.as_str());
    ctx.output
        .kv("Price", &format_price(&listing, wizard.config().currency));
    ctx.output.kv("Location", &listing.location.address);
    for url in &listing.images {
        ctx.output.list_item(url);
    }
    if let Navigation::ListingDetail(id) = outcome.navigation {
        ctx.output
            .info(&format!("View it with `classifieds show {}`", id));
    }
    Ok(())
}

fn announce(ctx: &Context, wizard: &ListingWizard) {
    ctx.output.step(wizard.step().number(), 5, wizard.heading());
}

/// A flag value, or a prompt for it when running interactively.
fn field(
    flag: Option<String>,
    interactive: bool,
    prompt: &str,
    name: &str,
    required: bool,
) -> Result<String> {
    match flag {
        Some(value) => Ok(value),
        None if interactive => Ok(Input::new()
            .with_prompt(prompt)
            .allow_empty(!required)
            .interact_text()?),
        None if required => bail!("--{} is required", name),
        None => Ok(String::new()),
    }
}

async fn read_images(ctx: &Context, paths: &[PathBuf]) -> Result<Vec<ImageFile>> {
    let progress = ctx.output.progress(paths.len() as u64, "Reading photos");
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read photo: {}", path.display()))?;
        let name = file_name(path);
        ctx.output
            .debug(&format!("{} ({})", name, format_bytes(content.len() as u64)));
        let mut image = ImageFile::new(name.as_str(), content);
        if let Some(mime) = ImageFile::guess_content_type(&name) {
            image = image.with_content_type(mime);
        }
        images.push(image);
        progress.inc(1);
    }
    progress.finish_and_clear();
    Ok(images)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

fn failure(e: WizardError) -> anyhow::Error {
    let notice = e.notice();
    anyhow::Error::new(e).context(notice)
}
