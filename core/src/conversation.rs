// Conversation transcript: append-only, broadcast on every change
use crate::utils::gen_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A grounding source attached to an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_engine_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: gen_id(),
            role: Role::User,
            text: text.into(),
            created_at: Utc::now(),
            source_engine_id: None,
            citations: Vec::new(),
        }
    }

    pub fn assistant(
        text: impl Into<String>,
        engine_id: impl Into<String>,
        citations: Vec<Citation>,
    ) -> Self {
        Self {
            id: gen_id(),
            role: Role::Assistant,
            text: text.into(),
            created_at: Utc::now(),
            source_engine_id: Some(engine_id.into()),
            citations,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            id: gen_id(),
            role: Role::System,
            text: text.into(),
            created_at: Utc::now(),
            source_engine_id: None,
            citations: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    sender: broadcast::Sender<Message>,
}

impl Default for Conversation {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self {
            messages: Vec::new(),
            sender,
        }
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message; messages are never edited or removed afterwards
    pub fn append(&mut self, message: Message) {
        self.messages.push(message.clone());
        // Ignore error if no subscribers
        let _ = self.sender.send(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Receive every message appended from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.sender.subscribe()
    }
}
