use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(SlotId);
id_newtype!(InterviewerId);

/// A booked interview occupying a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub student: String,
    pub interviewer: InterviewerId,
}

impl Interview {
    pub fn new(student: impl Into<String>, interviewer: InterviewerId) -> Self {
        Self {
            student: student.into(),
            interviewer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interviewer {
    pub id: InterviewerId,
    pub name: String,
    pub avatar: String,
}

/// A bookable schedule position. No interview means the slot is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview: Option<Interview>,
}

impl Slot {
    pub fn is_open(&self) -> bool {
        self.interview.is_none()
    }
}

/// One day's ordered slot ids. Remaining spots are derived from slot
/// occupancy, never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub name: String,
    pub slots: Vec<SlotId>,
}
