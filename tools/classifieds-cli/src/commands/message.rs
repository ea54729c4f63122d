//! Send and read messages.

use anyhow::Result;
use classifieds_core::messages::MessagesService;
use classifieds_core::{ListingId, MessageId, UserId};
use console::style;

use super::{MessageArgs, MessageCommand};
use crate::context::Context;

/// Run the message command.
pub async fn run(args: MessageArgs, ctx: &Context) -> Result<()> {
    let backend = ctx.backend().await?;
    let messages = MessagesService::new(backend, ctx.session());

    match args.command {
        MessageCommand::Send {
            to,
            content,
            listing,
        } => {
            let listing = listing.map(ListingId::new);
            let sent = messages
                .send(&UserId::new(to), listing.as_ref(), &content)
                .await?;
            if ctx.output.is_json() {
                ctx.output.json(&sent);
            } else {
                ctx.output.success("Message sent to seller");
                ctx.output.kv("ID", sent.id.as_str());
            }
        }
        MessageCommand::List => {
            let thread = messages.conversations().await?;
            if ctx.output.is_json() {
                ctx.output.json(&thread);
                return Ok(());
            }
            let me = UserId::new(ctx.user.clone().unwrap_or_default());
            ctx.output.header(&format!(
                "Messages ({} unread)",
                messages.unread_count().await?
            ));
            for message in &thread {
                let direction = if message.sender_id == me { "to" } else { "from" };
                let marker = if !message.read && message.receiver_id == me {
                    style("●").cyan().to_string()
                } else {
                    " ".to_string()
                };
                ctx.output.list_item(&format!(
                    "{} {} {} {}: {}",
                    marker,
                    message.created_at.format("%Y-%m-%d %H:%M"),
                    direction,
                    message.counterpart(&me),
                    message.content
                ));
                ctx.output.debug(&format!("id {}", message.id));
            }
        }
        MessageCommand::Read { id } => {
            messages.mark_read(&MessageId::new(id)).await?;
            ctx.output.success("Marked as read");
        }
    }
    Ok(())
}
