//! CLI command implementations.

pub mod browse;
pub mod categories;
pub mod favorite;
pub mod init;
pub mod message;
pub mod post;
pub mod profile;
pub mod show;

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Arguments for the init command.
#[derive(Args)]
pub struct InitArgs {
    /// User id to act as by default.
    #[arg(short, long, default_value = "me")]
    pub user: String,

    /// Force overwrite existing config.
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the categories command.
#[derive(Args)]
pub struct CategoriesArgs {
    /// Show only this group (name or slug).
    #[arg(short, long)]
    pub group: Option<String>,
}

/// Arguments for the post command. Anything not given is prompted for.
#[derive(Args)]
pub struct PostArgs {
    /// Category group (name or slug).
    #[arg(long)]
    pub group: Option<String>,

    /// Subcategory (name or slug).
    #[arg(long)]
    pub category: Option<String>,

    /// Ad title.
    #[arg(short, long)]
    pub title: Option<String>,

    /// Description.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Item condition.
    #[arg(long)]
    pub condition: Option<String>,

    /// Brand.
    #[arg(long)]
    pub brand: Option<String>,

    /// Model.
    #[arg(long)]
    pub model: Option<String>,

    /// Year.
    #[arg(long)]
    pub year: Option<String>,

    /// Photo files, in display order.
    #[arg(short, long = "image")]
    pub images: Vec<PathBuf>,

    /// Asking price.
    #[arg(short, long)]
    pub price: Option<String>,

    /// Item location.
    #[arg(short, long)]
    pub location: Option<String>,

    /// Never prompt; fail on missing input.
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the browse command.
#[derive(Args)]
pub struct BrowseArgs {
    /// Subcategory slug.
    #[arg(long)]
    pub category: Option<String>,

    /// Address contains this text.
    #[arg(short, long)]
    pub location: Option<String>,

    /// Minimum price.
    #[arg(long)]
    pub min_price: Option<f64>,

    /// Maximum price.
    #[arg(long)]
    pub max_price: Option<f64>,

    /// Item condition.
    #[arg(long)]
    pub condition: Option<String>,

    /// Sort: price_asc, price_desc, date_desc or views_desc.
    #[arg(short, long, default_value = "date_desc")]
    pub sort: String,

    /// Page number.
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Results per page.
    #[arg(long, default_value = "24")]
    pub per_page: usize,
}

/// Arguments for the show command.
#[derive(Args)]
pub struct ShowArgs {
    /// Listing id.
    pub id: String,
}

/// Arguments for the favorite command.
#[derive(Args)]
pub struct FavoriteArgs {
    #[command(subcommand)]
    pub command: FavoriteCommand,
}

#[derive(Subcommand)]
pub enum FavoriteCommand {
    /// Save a listing.
    Add {
        /// Listing id.
        id: String,
    },
    /// Forget a saved listing.
    Remove {
        /// Listing id.
        id: String,
    },
    /// Save or forget a listing.
    Toggle {
        /// Listing id.
        id: String,
    },
    /// List saved listings.
    List,
}

/// Arguments for the message command.
#[derive(Args)]
pub struct MessageArgs {
    #[command(subcommand)]
    pub command: MessageCommand,
}

#[derive(Subcommand)]
pub enum MessageCommand {
    /// Send a message.
    Send {
        /// Receiver user id.
        to: String,

        /// Message text.
        content: String,

        /// Listing the message is about.
        #[arg(short, long)]
        listing: Option<String>,
    },
    /// List conversations.
    List,
    /// Mark a message as read.
    Read {
        /// Message id.
        id: String,
    },
}

/// Arguments for the profile command.
#[derive(Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Show your profile.
    Show,
    /// Change profile fields. Fields not given are kept.
    Update(ProfileUpdateArgs),
    /// Upload a new avatar image.
    Avatar {
        /// Image file (jpg, jpeg, png, gif or webp, at most 5MB).
        path: PathBuf,
    },
}

/// Fields for `profile update`.
#[derive(Args)]
pub struct ProfileUpdateArgs {
    /// Display name.
    #[arg(long)]
    pub full_name: Option<String>,

    /// Username.
    #[arg(long)]
    pub username: Option<String>,

    /// Phone number.
    #[arg(long)]
    pub phone: Option<String>,

    /// Where you are based.
    #[arg(long)]
    pub location: Option<String>,

    /// Short bio.
    #[arg(long)]
    pub bio: Option<String>,

    /// Website URL.
    #[arg(long)]
    pub website: Option<String>,

    /// Facebook link.
    #[arg(long)]
    pub facebook: Option<String>,

    /// Twitter handle.
    #[arg(long)]
    pub twitter: Option<String>,

    /// Instagram handle.
    #[arg(long)]
    pub instagram: Option<String>,

    /// LinkedIn link.
    #[arg(long)]
    pub linkedin: Option<String>,
}
