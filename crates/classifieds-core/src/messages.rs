//! Buyer and seller messages.

use crate::error::{MarketError, MarketResult};
use crate::identity::{Identity, IdentityProvider};
use crate::ids::{ListingId, MessageId, UserId};
use crate::tables;
use chrono::{DateTime, Utc};
use classifieds_store::{Backend, Filter, Row, Select};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A row in the `messages` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    /// The listing the conversation is about, if any.
    #[serde(default)]
    pub listing_id: Option<ListingId>,
    pub content: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// The other party, from `me`'s point of view.
    pub fn counterpart(&self, me: &UserId) -> &UserId {
        if &self.sender_id == me {
            &self.receiver_id
        } else {
            &self.sender_id
        }
    }
}

#[derive(Debug, Serialize)]
struct NewMessage<'a> {
    sender_id: &'a UserId,
    receiver_id: &'a UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    listing_id: Option<&'a ListingId>,
    content: &'a str,
    read: bool,
}

/// Send and read messages as the signed-in user.
#[derive(Clone)]
pub struct MessagesService {
    backend: Arc<dyn Backend>,
    identity: Arc<dyn IdentityProvider>,
}

impl MessagesService {
    pub fn new(backend: Arc<dyn Backend>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { backend, identity }
    }

    /// Send `content` to `receiver`, optionally about a listing.
    pub async fn send(
        &self,
        receiver: &UserId,
        listing: Option<&ListingId>,
        content: &str,
    ) -> MarketResult<Message> {
        let who = self.require_identity()?;
        let content = content.trim();
        if content.is_empty() {
            return Err(MarketError::Validation("message is empty".into()));
        }
        if receiver == &who.id {
            return Err(MarketError::Validation("cannot message yourself".into()));
        }

        let record = Row::from_serialize(&NewMessage {
            sender_id: &who.id,
            receiver_id: receiver,
            listing_id: listing,
            content,
            read: false,
        })?;
        let row = self.backend.insert_row(tables::MESSAGES, record).await?;
        tracing::info!(from = %who.id, to = %receiver, "message sent");
        Ok(row.deserialize()?)
    }

    /// Messages the signed-in user sent or received, newest first.
    pub async fn conversations(&self) -> MarketResult<Vec<Message>> {
        let who = self.require_identity()?;
        let select = Select::all()
            .filter(Filter::or(vec![
                Filter::eq("sender_id", &who.id),
                Filter::eq("receiver_id", &who.id),
            ]))
            .order_by("created_at", false);
        self.backend
            .select_rows(tables::MESSAGES, &select)
            .await?
            .iter()
            .map(|row| row.deserialize().map_err(MarketError::from))
            .collect()
    }

    /// Unread messages addressed to the signed-in user.
    pub async fn unread_count(&self) -> MarketResult<usize> {
        let who = self.require_identity()?;
        let select = Select::all().filters([
            Filter::eq("receiver_id", &who.id),
            Filter::eq("read", false),
        ]);
        Ok(self.backend.select_rows(tables::MESSAGES, &select).await?.len())
    }

    /// Mark a message as read.
    pub async fn mark_read(&self, id: &MessageId) -> MarketResult<()> {
        self.require_identity()?;
        let mut patch = Row::new();
        patch.set("read", true);
        let updated = self
            .backend
            .update_rows(tables::MESSAGES, &[Filter::eq("id", id)], patch)
            .await?;
        if updated.is_empty() {
            return Err(MarketError::MessageNotFound(id.to_string()));
        }
        tracing::debug!(message = %id, "message read");
        Ok(())
    }

    fn require_identity(&self) -> MarketResult<Identity> {
        self.identity
            .current_identity()
            .ok_or(MarketError::AuthenticationRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Session;
    use classifieds_store::MemoryBackend;

    #[tokio::test]
    async fn test_send_and_read() {
        let backend = Arc::new(MemoryBackend::new());
        let session = Arc::new(Session::signed_in(Identity::new("buyer", "b@example.com")));
        let messages = MessagesService::new(backend.clone(), session.clone());

        let listing = ListingId::new("l1");
        let sent = messages
            .send(&UserId::new("seller"), Some(&listing), "  Is this available?  ")
            .await
            .unwrap();
        assert_eq!(sent.content, "Is this available?");
        assert!(!sent.read);
        assert_eq!(sent.counterpart(&UserId::new("buyer")), &UserId::new("seller"));

        session.sign_in(Identity::new("seller", "s@example.com"));
        assert_eq!(messages.unread_count().await.unwrap(), 1);
        messages
            .send(&UserId::new("buyer"), Some(&listing), "Yes")
            .await
            .unwrap();
        messages.mark_read(&sent.id).await.unwrap();
        assert_eq!(messages.unread_count().await.unwrap(), 0);

        let thread = messages.conversations().await.unwrap();
        assert_eq!(thread.len(), 2);
        assert!(thread[0].created_at >= thread[1].created_at);
    }

    #[tokio::test]
    async fn test_send_rejects_empty_content() {
        let messages = MessagesService::new(
            Arc::new(MemoryBackend::new()),
            Arc::new(Session::signed_in(Identity::new("buyer", "b@example.com"))),
        );
        let err = messages.send(&UserId::new("seller"), None, "   ").await.unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));
    }

    #[tokio::test]
    async fn test_mark_read_unknown_message() {
        let messages = MessagesService::new(
            Arc::new(MemoryBackend::new()),
            Arc::new(Session::signed_in(Identity::new("buyer", "b@example.com"))),
        );
        assert_eq!(
            messages.mark_read(&MessageId::new("m9")).await.unwrap_err(),
            MarketError::MessageNotFound("m9".into())
        );
    }
}
