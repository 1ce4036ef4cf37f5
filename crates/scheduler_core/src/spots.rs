use std::collections::HashMap;

use shared::domain::{DaySchedule, Slot, SlotId};

/// Remaining capacity for a day, derived from current slot occupancy.
/// Slot ids the map does not know are counted as unavailable.
pub fn spots_remaining(day: &DaySchedule, slots: &HashMap<SlotId, Slot>) -> usize {
    day.slots
        .iter()
        .filter(|id| slots.get(id).is_some_and(Slot::is_open))
        .count()
}

/// Display contract the view layer relies on.
pub fn spots_label(remaining: usize) -> String {
    match remaining {
        0 => "no spots remaining".to_string(),
        1 => "1 spot remaining".to_string(),
        n => format!("{n} spots remaining"),
    }
}

#[cfg(test)]
#[path = "tests/spots_tests.rs"]
mod tests;
