//! In-memory dead-letter sink.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::{DeadLetter, DeadLetterSink};

pub struct InMemoryDeadLetterSink {
    letters: RwLock<Vec<DeadLetter>>,
}

impl InMemoryDeadLetterSink {
    pub fn new() -> Self {
        Self {
            letters: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryDeadLetterSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeadLetterSink for InMemoryDeadLetterSink {
    async fn push(&self, letter: DeadLetter) -> Result<(), DomainError> {
        self.letters.write().await.push(letter);
        Ok(())
    }

    async fn drain(&self) -> Result<Vec<DeadLetter>, DomainError> {
        Ok(self.letters.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{EventEnvelope, Timestamp, UserId};
    use serde_json::json;

    #[tokio::test]
    async fn push_preserves_order() {
        let sink = InMemoryDeadLetterSink::new();
        let user = UserId::new();

        for reason in ["first", "second"] {
            let event = EventEnvelope::new(
                user,
                "MoodLogged",
                "test",
                json!({"score": 5.0}),
                Timestamp::from_unix_secs(100),
            );
            sink.push(DeadLetter {
                event,
                reason: reason.to_string(),
                failed_at: Timestamp::from_unix_secs(200),
            })
            .await
            .unwrap();
        }

        let letters = sink.drain().await.unwrap();
        assert_eq!(letters.len(), 2);
        assert_eq!(letters[0].reason, "first");
        assert_eq!(letters[1].reason, "second");
    }
}
