use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use shared::{
    domain::{DaySchedule, Interview, Interviewer, Slot, SlotId},
    error::StoreError,
};

/// Contract the scheduler core consumes. Fetches run once at session
/// load; mutations create/overwrite or clear the interview on a slot.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn fetch_days(&self) -> Result<Vec<DaySchedule>>;
    async fn fetch_slots(&self) -> Result<HashMap<SlotId, Slot>>;
    async fn fetch_interviewers(&self) -> Result<Vec<Interviewer>>;
    async fn put_appointment(
        &self,
        slot_id: SlotId,
        interview: Interview,
    ) -> std::result::Result<(), StoreError>;
    async fn delete_appointment(&self, slot_id: SlotId) -> std::result::Result<(), StoreError>;
}

/// Fallback wired in when no real store is configured; every call fails.
pub struct MissingScheduleStore;

#[async_trait]
impl ScheduleStore for MissingScheduleStore {
    async fn fetch_days(&self) -> Result<Vec<DaySchedule>> {
        Err(anyhow!("schedule store is unavailable"))
    }

    async fn fetch_slots(&self) -> Result<HashMap<SlotId, Slot>> {
        Err(anyhow!("schedule store is unavailable"))
    }

    async fn fetch_interviewers(&self) -> Result<Vec<Interviewer>> {
        Err(anyhow!("schedule store is unavailable"))
    }

    async fn put_appointment(
        &self,
        slot_id: SlotId,
        _interview: Interview,
    ) -> std::result::Result<(), StoreError> {
        Err(StoreError::new(format!(
            "schedule store is unavailable for slot {}",
            slot_id.0
        )))
    }

    async fn delete_appointment(&self, slot_id: SlotId) -> std::result::Result<(), StoreError> {
        Err(StoreError::new(format!(
            "schedule store is unavailable for slot {}",
            slot_id.0
        )))
    }
}

/// Seed payload for [`InMemoryStore`], deserializable from a JSON fixture.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedData {
    pub days: Vec<DaySchedule>,
    pub slots: Vec<Slot>,
    pub interviewers: Vec<Interviewer>,
}

struct InMemoryState {
    days: Vec<DaySchedule>,
    slots: HashMap<SlotId, Slot>,
    interviewers: Vec<Interviewer>,
    fail_next_put: Option<String>,
    fail_next_delete: Option<String>,
}

/// In-process reference implementation of [`ScheduleStore`]. Supports
/// one-shot failure injection so coordinator tests can exercise the
/// rejection paths.
pub struct InMemoryStore {
    state: RwLock<InMemoryState>,
}

impl InMemoryStore {
    pub fn new(seed: SeedData) -> Self {
        let slots = seed
            .slots
            .into_iter()
            .map(|slot| (slot.id, slot))
            .collect();
        Self {
            state: RwLock::new(InMemoryState {
                days: seed.days,
                slots,
                interviewers: seed.interviewers,
                fail_next_put: None,
                fail_next_delete: None,
            }),
        }
    }

    pub fn from_json(fixture: &str) -> Result<Self> {
        let seed: SeedData = serde_json::from_str(fixture)?;
        Ok(Self::new(seed))
    }

    pub async fn fail_next_put(&self, message: impl Into<String>) {
        self.state.write().await.fail_next_put = Some(message.into());
    }

    pub async fn fail_next_delete(&self, message: impl Into<String>) {
        self.state.write().await.fail_next_delete = Some(message.into());
    }

    /// Committed interview for a slot, for asserting store-side state.
    pub async fn appointment(&self, slot_id: SlotId) -> Option<Interview> {
        self.state
            .read()
            .await
            .slots
            .get(&slot_id)
            .and_then(|slot| slot.interview.clone())
    }
}

#[async_trait]
impl ScheduleStore for InMemoryStore {
    async fn fetch_days(&self) -> Result<Vec<DaySchedule>> {
        Ok(self.state.read().await.days.clone())
    }

    async fn fetch_slots(&self) -> Result<HashMap<SlotId, Slot>> {
        Ok(self.state.read().await.slots.clone())
    }

    async fn fetch_interviewers(&self) -> Result<Vec<Interviewer>> {
        Ok(self.state.read().await.interviewers.clone())
    }

    async fn put_appointment(
        &self,
        slot_id: SlotId,
        interview: Interview,
    ) -> std::result::Result<(), StoreError> {
        let mut state = self.state.write().await;
        if let Some(message) = state.fail_next_put.take() {
            return Err(StoreError::new(message));
        }
        let slot = state
            .slots
            .get_mut(&slot_id)
            .ok_or_else(|| StoreError::new(format!("no slot with id {}", slot_id.0)))?;
        slot.interview = Some(interview);
        Ok(())
    }

    async fn delete_appointment(&self, slot_id: SlotId) -> std::result::Result<(), StoreError> {
        let mut state = self.state.write().await;
        if let Some(message) = state.fail_next_delete.take() {
            return Err(StoreError::new(message));
        }
        let slot = state
            .slots
            .get_mut(&slot_id)
            .ok_or_else(|| StoreError::new(format!("no slot with id {}", slot_id.0)))?;
        slot.interview = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
