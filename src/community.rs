use std::sync::Arc;

use chrono::Utc;

use crate::error::StoreError;
use crate::models::community::{Announcement, ChatRoom, Message, Testimonial};
use crate::models::new_id;
use crate::store::LocalStore;

/// Append-mostly community features: announcements, testimonials, chat.
/// Everything lands in the local cache; none of it is mirrored.
pub struct CommunityService {
    store: Arc<LocalStore>,
}

impl CommunityService {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    pub async fn post_announcement(
        &self,
        title: &str,
        body: &str,
    ) -> Result<Announcement, StoreError> {
        let announcement = Announcement {
            id: new_id("ann"),
            title: title.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
        };
        self.store.upsert(&announcement).await?;
        Ok(announcement)
    }

    pub async fn list_announcements(&self) -> Result<Vec<Announcement>, StoreError> {
        self.store.get_all().await
    }

    pub async fn post_testimonial(
        &self,
        user_id: &str,
        body: &str,
    ) -> Result<Testimonial, StoreError> {
        let testimonial = Testimonial {
            id: new_id("tst"),
            user_id: user_id.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
        };
        self.store.upsert(&testimonial).await?;
        Ok(testimonial)
    }

    pub async fn create_room(&self, name: &str) -> Result<ChatRoom, StoreError> {
        let room = ChatRoom {
            id: new_id("room"),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.store.upsert(&room).await?;
        Ok(room)
    }

    pub async fn post_message(
        &self,
        room_id: &str,
        sender_id: &str,
        body: &str,
    ) -> Result<Message, StoreError> {
        let message = Message {
            id: new_id("msg"),
            room_id: room_id.to_string(),
            sender_id: sender_id.to_string(),
            body: body.to_string(),
            sent_at: Utc::now(),
        };
        self.store.upsert(&message).await?;
        Ok(message)
    }

    pub async fn room_messages(&self, room_id: &str) -> Result<Vec<Message>, StoreError> {
        let all = self.store.get_all::<Message>().await?;
        Ok(all.into_iter().filter(|m| m.room_id == room_id).collect())
    }
}
