use super::*;
use shared::domain::{Interview, InterviewerId, Slot, SlotId};

fn open_slot() -> Slot {
    Slot {
        id: SlotId(1),
        time: "12pm".to_string(),
        interview: None,
    }
}

fn booked_slot() -> Slot {
    Slot {
        id: SlotId(2),
        time: "1pm".to_string(),
        interview: Some(Interview::new("Archie Cohen", InterviewerId(2))),
    }
}

#[test]
fn initial_mode_follows_slot_occupancy() {
    assert_eq!(*ModeController::for_slot(&open_slot()).current(), Mode::Empty);
    assert_eq!(*ModeController::for_slot(&booked_slot()).current(), Mode::Show);
}

#[test]
fn transition_pushes_and_back_restores() {
    let mut controller = ModeController::new(Mode::Empty);
    controller.transition(Mode::CreateForm);
    assert_eq!(*controller.current(), Mode::CreateForm);
    assert_eq!(controller.depth(), 2);

    assert!(controller.back());
    assert_eq!(*controller.current(), Mode::Empty);
}

#[test]
fn replace_overwrites_without_growing_history() {
    let mut controller = ModeController::new(Mode::Show);
    controller.transition(Mode::Confirm);
    controller.replace(Mode::Deleting);
    assert_eq!(controller.depth(), 2);
    assert_eq!(*controller.current(), Mode::Deleting);

    // Settlement overwrites the transitional entry, so the failed
    // delete backs out straight to Show.
    controller.replace(Mode::ErrorDelete("Could not cancel appointment.".to_string()));
    assert!(controller.back());
    assert_eq!(*controller.current(), Mode::Show);
}

#[test]
fn failed_save_backs_out_to_the_form() {
    let mut controller = ModeController::new(Mode::Empty);
    controller.transition(Mode::CreateForm);
    controller.transition(Mode::Saving);
    controller.replace(Mode::ErrorSave("Could not book appointment.".to_string()));

    assert!(controller.back());
    assert_eq!(*controller.current(), Mode::CreateForm);
    assert!(controller.back());
    assert_eq!(*controller.current(), Mode::Empty);
}

#[test]
fn back_never_pops_the_initial_mode() {
    let mut controller = ModeController::new(Mode::Show);
    assert!(!controller.back());
    assert!(!controller.back());
    assert_eq!(*controller.current(), Mode::Show);
    assert_eq!(controller.depth(), 1);
}

#[test]
fn only_saving_and_deleting_are_transitional() {
    assert!(Mode::Saving.is_transitional());
    assert!(Mode::Deleting.is_transitional());
    for mode in [
        Mode::Empty,
        Mode::Show,
        Mode::CreateForm,
        Mode::EditForm,
        Mode::Confirm,
        Mode::ErrorSave("x".to_string()),
        Mode::ErrorDelete("x".to_string()),
    ] {
        assert!(!mode.is_transitional(), "{mode:?}");
    }
}
