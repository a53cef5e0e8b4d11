//! In-memory interaction log

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use chat_agent_core::{Error, Interaction, InteractionStore, Result};

/// In-memory implementation of [`InteractionStore`]
#[derive(Default)]
pub struct MemoryInteractionStore {
    interactions: RwLock<Vec<Interaction>>,
}

impl MemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.interactions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.read().is_empty()
    }
}

#[async_trait]
impl InteractionStore for MemoryInteractionStore {
    async fn record(&self, interaction: Interaction) -> Result<()> {
        self.interactions.write().push(interaction);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Interaction>> {
        Ok(self
            .interactions
            .read()
            .iter()
            .find(|i| i.id == id)
            .cloned())
    }

    async fn set_feedback(
        &self,
        id: Uuid,
        was_helpful: bool,
        note: Option<String>,
    ) -> Result<Interaction> {
        let mut interactions = self.interactions.write();
        let interaction = interactions
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Error::NotFound(format!("interaction {id}")))?;

        interaction.was_helpful = Some(was_helpful);
        interaction.feedback = note;
        Ok(interaction.clone())
    }

    async fn count_helpful_for(&self, training_id: u64) -> Result<u32> {
        Ok(self
            .interactions
            .read()
            .iter()
            .filter(|i| i.training_match_id == Some(training_id) && i.was_helpful == Some(true))
            .count() as u32)
    }
}
