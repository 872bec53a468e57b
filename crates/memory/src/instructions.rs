//! Per-user system instructions.

use gemrelay_core::error::ValidationError;
use gemrelay_core::message::UserId;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Optional system instruction per user, bounded in length.
pub struct InstructionStore {
    max_length: usize,
    entries: RwLock<HashMap<UserId, String>>,
}

impl InstructionStore {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub async fn get(&self, user: &UserId) -> Option<String> {
        self.entries.read().await.get(user).cloned()
    }

    /// Create or overwrite the user's instruction. Length is measured in
    /// characters, not bytes.
    pub async fn set(&self, user: &UserId, text: impl Into<String>) -> Result<(), ValidationError> {
        let text = text.into();
        let length = text.chars().count();
        if length > self.max_length {
            return Err(ValidationError::InstructionTooLong {
                length,
                max: self.max_length,
            });
        }
        self.entries.write().await.insert(user.clone(), text);
        Ok(())
    }

    /// Remove the user's instruction. Returns whether one was set.
    pub async fn reset(&self, user: &UserId) -> bool {
        self.entries.write().await.remove(user).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_reset() {
        let store = InstructionStore::new(1000);
        let alice = UserId::from("alice");
        assert!(store.get(&alice).await.is_none());

        store.set(&alice, "Answer like a pirate.").await.unwrap();
        assert_eq!(store.get(&alice).await.as_deref(), Some("Answer like a pirate."));

        assert!(store.reset(&alice).await);
        assert!(store.get(&alice).await.is_none());
        assert!(!store.reset(&alice).await);
    }

    #[tokio::test]
    async fn overlong_instruction_rejected_and_store_unchanged() {
        let store = InstructionStore::new(1000);
        let alice = UserId::from("alice");
        store.set(&alice, "Be brief.").await.unwrap();

        let err = store.set(&alice, "x".repeat(1001)).await.unwrap_err();
        assert_eq!(err, ValidationError::InstructionTooLong { length: 1001, max: 1000 });
        assert_eq!(store.get(&alice).await.as_deref(), Some("Be brief."));
    }

    #[tokio::test]
    async fn limit_is_inclusive_and_counts_characters() {
        let store = InstructionStore::new(4);
        let alice = UserId::from("alice");
        // Four characters, twelve bytes.
        assert!(store.set(&alice, "日本語だ").await.is_ok());
        assert!(store.set(&alice, "日本語です").await.is_err());
    }

    #[tokio::test]
    async fn instructions_are_per_user() {
        let store = InstructionStore::new(100);
        store.set(&UserId::from("alice"), "formal").await.unwrap();
        assert!(store.get(&UserId::from("bob")).await.is_none());
    }
}
