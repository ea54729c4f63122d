//! Show and edit your profile.

use anyhow::{Context as _, Result};
use classifieds_core::profiles::{Profile, ProfileUpdate, ProfilesService, SocialLinks};
use classifieds_core::wizard::ImageFile;

use super::{ProfileArgs, ProfileCommand, ProfileUpdateArgs};
use crate::context::Context;
use crate::output::format_bytes;

/// Run the profile command.
pub async fn run(args: ProfileArgs, ctx: &Context) -> Result<()> {
    let backend = ctx.backend().await?;
    let profiles = ProfilesService::new(backend, ctx.session());

    match args.command {
        ProfileCommand::Show => {
            let profile = profiles.get().await?;
            print_profile(ctx, &profile);
        }
        ProfileCommand::Update(fields) => {
            let changes = changes(fields);
            if changes.is_empty() {
                ctx.output.warn("Nothing to update");
                return Ok(());
            }
            let profile = profiles.update(&changes).await?;
            ctx.output.success("Profile updated");
            print_profile(ctx, &profile);
        }
        ProfileCommand::Avatar { path } => {
            let path = ctx.resolve_path(&path.to_string_lossy());
            let content = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read avatar: {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ctx.output
                .debug(&format!("{} ({})", name, format_bytes(content.len() as u64)));

            let spinner = ctx.output.spinner("Uploading avatar...");
            let uploaded = profiles.upload_avatar(&ImageFile::new(name, content)).await;
            spinner.finish_and_clear();
            let url = uploaded?;

            if ctx.output.is_json() {
                ctx.output.json(&serde_json::json!({ "avatar_url": url }));
            } else {
                ctx.output.success("Avatar uploaded");
                ctx.output.kv("URL", &url);
            }
        }
    }
    Ok(())
}

fn changes(fields: ProfileUpdateArgs) -> ProfileUpdate {
    let links = SocialLinks {
        facebook: fields.facebook,
        twitter: fields.twitter,
        instagram: fields.instagram,
        linkedin: fields.linkedin,
    };
    ProfileUpdate {
        full_name: fields.full_name,
        username: fields.username,
        phone_number: fields.phone,
        location: fields.location,
        bio: fields.bio,
        website: fields.website,
        social_links: (links != SocialLinks::default()).then_some(links),
        ..ProfileUpdate::default()
    }
}

fn print_profile(ctx: &Context, profile: &Profile) {
    if ctx.output.is_json() {
        ctx.output.json(profile);
        return;
    }

    ctx.output.header(profile.full_name.as_deref().unwrap_or(profile.id.as_str()));
    ctx.output.kv("ID", profile.id.as_str());
    let fields = [
        ("Email", &profile.email),
        ("Username", &profile.username),
        ("Phone", &profile.phone_number),
        ("Location", &profile.location),
        ("Website", &profile.website),
        ("Avatar", &profile.avatar_url),
        ("Bio", &profile.bio),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            ctx.output.kv(label, value);
        }
    }
    if let Some(links) = &profile.social_links {
        for (label, value) in [
            ("Facebook", &links.facebook),
            ("Twitter", &links.twitter),
            ("Instagram", &links.instagram),
            ("LinkedIn", &links.linkedin),
        ] {
            if let Some(value) = value {
                ctx.output.kv(label, value);
            }
        }
    }
}
