use std::{collections::HashMap, sync::Arc};

use anyhow::{anyhow, Result};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use shared::domain::{DaySchedule, Interview, Interviewer, Slot, SlotId};
use store::ScheduleStore;

pub mod mode;
pub mod spots;

pub use mode::{Mode, ModeController};
pub use spots::{spots_label, spots_remaining};

const BOOK_FAILED_MESSAGE: &str = "Could not book appointment.";
const CANCEL_FAILED_MESSAGE: &str = "Could not cancel appointment.";

/// How a `book`/`cancel` call settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The store accepted the mutation and the slot was updated.
    Committed,
    /// The store rejected the mutation; slot data is untouched and the
    /// slot sits in an error mode.
    Rejected,
    /// Refused before issuing a store call: a mutation is already in
    /// flight for this slot, or the slot is not in a legal mode.
    Busy,
    /// The slot entered a newer mutation cycle while this call was in
    /// flight; the result was discarded without touching state.
    Stale,
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    SlotChanged { slot_id: SlotId, mode: Mode },
    SpotsChanged { day: String, remaining: usize },
}

struct SlotMachine {
    controller: ModeController,
    seq: u64,
}

struct SessionState {
    days: Vec<DaySchedule>,
    slots: HashMap<SlotId, Slot>,
    machines: HashMap<SlotId, SlotMachine>,
    interviewers: Vec<Interviewer>,
    selected_day: Option<String>,
}

impl SessionState {
    fn machine_mut(&mut self, slot_id: SlotId) -> Result<&mut SlotMachine> {
        self.machines
            .get_mut(&slot_id)
            .ok_or_else(|| anyhow!("unknown slot {}", slot_id.0))
    }

    fn day_of(&self, slot_id: SlotId) -> Option<&DaySchedule> {
        self.days.iter().find(|day| day.slots.contains(&slot_id))
    }
}

/// Single authority over slot data and the matching mode controllers.
/// All transitions and data mutations happen under one lock; the only
/// suspension points are the store's mutation futures, awaited with the
/// lock released.
pub struct SchedulerSession {
    store: Arc<dyn ScheduleStore>,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SchedulerSession {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            store,
            inner: Mutex::new(SessionState {
                days: Vec::new(),
                slots: HashMap::new(),
                machines: HashMap::new(),
                interviewers: Vec::new(),
                selected_day: None,
            }),
            events,
        })
    }

    /// Fetch the schedule and the interviewer roster, and build one
    /// mode controller per slot. Selects the first day.
    pub async fn load(&self) -> Result<()> {
        let days = self.store.fetch_days().await?;
        let slots = self.store.fetch_slots().await?;
        let interviewers = self.store.fetch_interviewers().await?;

        let machines = slots
            .iter()
            .map(|(id, slot)| {
                (
                    *id,
                    SlotMachine {
                        controller: ModeController::for_slot(slot),
                        seq: 0,
                    },
                )
            })
            .collect();

        let mut state = self.inner.lock().await;
        info!(
            days = days.len(),
            slots = slots.len(),
            interviewers = interviewers.len(),
            "schedule loaded"
        );
        state.selected_day = days.first().map(|day| day.name.clone());
        state.days = days;
        state.slots = slots;
        state.machines = machines;
        state.interviewers = interviewers;
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Create or overwrite the interview on a slot. The slot is put in
    /// `Saving` while the store call is in flight; settlement commits
    /// the interview (`Show`) or leaves prior data untouched and
    /// surfaces `ErrorSave`. Store failures never propagate as `Err`.
    pub async fn book(&self, slot_id: SlotId, interview: Interview) -> Result<MutationOutcome> {
        let issued_seq = {
            let mut state = self.inner.lock().await;
            let machine = state.machine_mut(slot_id)?;
            if machine.controller.current().is_transitional() {
                debug!(slot = slot_id.0, "book refused, mutation already in flight");
                return Ok(MutationOutcome::Busy);
            }
            machine.seq += 1;
            let seq = machine.seq;
            machine.controller.transition(Mode::Saving);
            debug!(slot = slot_id.0, seq, "booking issued");
            self.emit_slot_changed(&state, slot_id);
            seq
        };

        let result = self.store.put_appointment(slot_id, interview.clone()).await;

        let mut state = self.inner.lock().await;
        let machine = state.machine_mut(slot_id)?;
        if machine.seq != issued_seq {
            debug!(slot = slot_id.0, seq = issued_seq, "stale booking result discarded");
            return Ok(MutationOutcome::Stale);
        }
        match result {
            Ok(()) => {
                machine.controller.replace(Mode::Show);
                let slot = state
                    .slots
                    .get_mut(&slot_id)
                    .ok_or_else(|| anyhow!("unknown slot {}", slot_id.0))?;
                slot.interview = Some(interview);
                debug!(slot = slot_id.0, "booking committed");
                self.emit_slot_changed(&state, slot_id);
                self.emit_spots_changed(&state, slot_id);
                Ok(MutationOutcome::Committed)
            }
            Err(err) => {
                warn!(slot = slot_id.0, error = %err, "booking rejected by store");
                machine
                    .controller
                    .replace(Mode::ErrorSave(BOOK_FAILED_MESSAGE.to_string()));
                self.emit_slot_changed(&state, slot_id);
                Ok(MutationOutcome::Rejected)
            }
        }
    }

    /// Clear the interview on a slot. Legal only once the user has
    /// reached `Confirm`; `Deleting` overwrites the confirmation entry
    /// so a failed delete backs out to `Show`.
    pub async fn cancel(&self, slot_id: SlotId) -> Result<MutationOutcome> {
        let issued_seq = {
            let mut state = self.inner.lock().await;
            let machine = state.machine_mut(slot_id)?;
            if *machine.controller.current() != Mode::Confirm {
                debug!(slot = slot_id.0, "cancel refused, confirmation not reached");
                return Ok(MutationOutcome::Busy);
            }
            machine.seq += 1;
            let seq = machine.seq;
            machine.controller.replace(Mode::Deleting);
            debug!(slot = slot_id.0, seq, "cancellation issued");
            self.emit_slot_changed(&state, slot_id);
            seq
        };

        let result = self.store.delete_appointment(slot_id).await;

        let mut state = self.inner.lock().await;
        let machine = state.machine_mut(slot_id)?;
        if machine.seq != issued_seq {
            debug!(slot = slot_id.0, seq = issued_seq, "stale cancellation result discarded");
            return Ok(MutationOutcome::Stale);
        }
        match result {
            Ok(()) => {
                machine.controller.replace(Mode::Empty);
                let slot = state
                    .slots
                    .get_mut(&slot_id)
                    .ok_or_else(|| anyhow!("unknown slot {}", slot_id.0))?;
                slot.interview = None;
                debug!(slot = slot_id.0, "cancellation committed");
                self.emit_slot_changed(&state, slot_id);
                self.emit_spots_changed(&state, slot_id);
                Ok(MutationOutcome::Committed)
            }
            Err(err) => {
                warn!(slot = slot_id.0, error = %err, "cancellation rejected by store");
                machine
                    .controller
                    .replace(Mode::ErrorDelete(CANCEL_FAILED_MESSAGE.to_string()));
                self.emit_slot_changed(&state, slot_id);
                Ok(MutationOutcome::Rejected)
            }
        }
    }

    /// `Empty -> CreateForm`. Returns whether the mode changed.
    pub async fn begin_create(&self, slot_id: SlotId) -> Result<bool> {
        self.edge(slot_id, Mode::Empty, Mode::CreateForm).await
    }

    /// `Show -> EditForm`.
    pub async fn begin_edit(&self, slot_id: SlotId) -> Result<bool> {
        self.edge(slot_id, Mode::Show, Mode::EditForm).await
    }

    /// `Show -> Confirm`, the prompt `cancel` requires.
    pub async fn request_cancel(&self, slot_id: SlotId) -> Result<bool> {
        self.edge(slot_id, Mode::Show, Mode::Confirm).await
    }

    /// Restore the previous mode. Ignored while a mutation is in
    /// flight and at the initial mode.
    pub async fn back(&self, slot_id: SlotId) -> Result<bool> {
        let mut state = self.inner.lock().await;
        let machine = state.machine_mut(slot_id)?;
        if machine.controller.current().is_transitional() {
            return Ok(false);
        }
        let changed = machine.controller.back();
        if changed {
            self.emit_slot_changed(&state, slot_id);
        }
        Ok(changed)
    }

    pub async fn mode(&self, slot_id: SlotId) -> Result<Mode> {
        let mut state = self.inner.lock().await;
        Ok(state.machine_mut(slot_id)?.controller.current().clone())
    }

    pub async fn slot(&self, slot_id: SlotId) -> Result<Slot> {
        self.inner
            .lock()
            .await
            .slots
            .get(&slot_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown slot {}", slot_id.0))
    }

    pub async fn day_names(&self) -> Vec<String> {
        self.inner
            .lock()
            .await
            .days
            .iter()
            .map(|day| day.name.clone())
            .collect()
    }

    pub async fn selected_day(&self) -> Option<String> {
        self.inner.lock().await.selected_day.clone()
    }

    pub async fn select_day(&self, name: &str) -> Result<()> {
        let mut state = self.inner.lock().await;
        if !state.days.iter().any(|day| day.name == name) {
            return Err(anyhow!("unknown day {name}"));
        }
        state.selected_day = Some(name.to_string());
        Ok(())
    }

    pub async fn interviewers(&self) -> Vec<Interviewer> {
        self.inner.lock().await.interviewers.clone()
    }

    /// Derived per-day remaining capacity; recomputed from committed
    /// slot data on every call.
    pub async fn spots_remaining(&self, day_name: &str) -> Result<usize> {
        let state = self.inner.lock().await;
        let day = state
            .days
            .iter()
            .find(|day| day.name == day_name)
            .ok_or_else(|| anyhow!("unknown day {day_name}"))?;
        Ok(spots::spots_remaining(day, &state.slots))
    }

    async fn edge(&self, slot_id: SlotId, from: Mode, to: Mode) -> Result<bool> {
        let mut state = self.inner.lock().await;
        let machine = state.machine_mut(slot_id)?;
        if *machine.controller.current() != from {
            return Ok(false);
        }
        machine.controller.transition(to);
        self.emit_slot_changed(&state, slot_id);
        Ok(true)
    }

    fn emit_slot_changed(&self, state: &SessionState, slot_id: SlotId) {
        if let Some(machine) = state.machines.get(&slot_id) {
            let _ = self.events.send(SessionEvent::SlotChanged {
                slot_id,
                mode: machine.controller.current().clone(),
            });
        }
    }

    fn emit_spots_changed(&self, state: &SessionState, slot_id: SlotId) {
        if let Some(day) = state.day_of(slot_id) {
            let _ = self.events.send(SessionEvent::SpotsChanged {
                day: day.name.clone(),
                remaining: spots::spots_remaining(day, &state.slots),
            });
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
