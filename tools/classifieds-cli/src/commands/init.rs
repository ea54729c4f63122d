//! Write a starter classifieds.toml.

use anyhow::{bail, Context as _, Result};

use super::InitArgs;
use crate::config::generate_default_config;
use crate::context::Context;

const CONFIG_FILE: &str = "classifieds.toml";

/// Run the init command.
pub async fn run(args: InitArgs, ctx: &Context) -> Result<()> {
    let path = ctx.cwd.join(CONFIG_FILE);
    if path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    tokio::fs::write(&path, generate_default_config(&args.user))
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "config": path, "user": args.user }));
    } else {
        ctx.output.success(&format!("Created {}", path.display()));
        ctx.output.kv("Default user", &args.user);
        ctx.output.info("Post your first listing with `classifieds post`");
    }
    Ok(())
}
