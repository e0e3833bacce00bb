//! Per-object rules keyed by canonical id and progress.
//!
//! [`PuzzleState`] only decides and records. It never touches the scene or
//! the camera; the session turns the returned outcomes into motion, sound
//! and notices.

use std::collections::BTreeSet;

use crate::interaction::InteractableId;

use super::inventory::{Inventory, CLUE_COLOR, GOLDEN_KEY, UV_FLASHLIGHT};
use super::passcode::{PasscodeBuffer, PasscodeTarget, PuzzleSecrets};
use super::progress::ProgressState;

pub const RIDDLE_CAP: u8 = 3;

const BOOK: &str = "book";
const DRAWER: &str = "drawer";
const CABINET_PREFIX: &str = "cabinet_";
const FLASK_PREFIX: &str = "flask_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    PromptOpened(PasscodeTarget),
    Toggled {
        id: InteractableId,
        open: bool,
        /// The toggle also counted toward the riddle tally.
        riddle_counted: bool,
    },
    KeyInserted,
    Locked {
        required: ProgressState,
    },
    /// Recognised object with nothing left to do.
    NoChange,
    /// Not a puzzle object; the caller decides (zone or detail view).
    Unhandled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasscodeOutcome {
    NoPrompt,
    Accepted {
        target: PasscodeTarget,
        progress: ProgressState,
        rewards: Vec<String>,
    },
    Rejected {
        target: PasscodeTarget,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    NotHeld,
    UvLight { on: bool },
    KeyInserted,
    /// The key exists but cannot go in right now.
    KeyRejected,
    ClueShown { item: String },
    Unusable,
}

#[derive(Debug, Clone)]
pub struct PuzzleState {
    progress: ProgressState,
    inventory: Inventory,
    passcode: PasscodeBuffer,
    prompt: Option<PasscodeTarget>,
    opened: BTreeSet<String>,
    opened_flasks: BTreeSet<String>,
    riddle_sources: BTreeSet<String>,
    riddles_found: u8,
    book_open: bool,
    uv_light_on: bool,
    has_inserted_key: bool,
    displayed_clue: Option<String>,
    secrets: PuzzleSecrets,
}

impl PuzzleState {
    pub fn new(secrets: PuzzleSecrets, passcode_max_len: usize) -> Self {
        Self {
            progress: ProgressState::None,
            inventory: Inventory::new(),
            passcode: PasscodeBuffer::new(passcode_max_len),
            prompt: None,
            opened: BTreeSet::new(),
            opened_flasks: BTreeSet::new(),
            riddle_sources: BTreeSet::new(),
            riddles_found: 0,
            book_open: false,
            uv_light_on: false,
            has_inserted_key: false,
            displayed_clue: None,
            secrets,
        }
    }

    pub fn progress(&self) -> ProgressState {
        self.progress
    }

    pub fn unlocked(&self, required: ProgressState) -> bool {
        self.progress.unlocked(required)
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn passcode(&self) -> &str {
        self.passcode.as_str()
    }

    pub fn prompt(&self) -> Option<PasscodeTarget> {
        self.prompt
    }

    pub fn riddles_found(&self) -> u8 {
        self.riddles_found
    }

    pub fn has_inserted_key(&self) -> bool {
        self.has_inserted_key
    }

    pub fn book_open(&self) -> bool {
        self.book_open
    }

    pub fn uv_light_on(&self) -> bool {
        self.uv_light_on
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.opened.contains(id) || self.opened_flasks.contains(id)
    }

    pub fn opened(&self) -> impl Iterator<Item = &str> {
        self.opened.iter().map(String::as_str)
    }

    pub fn opened_flasks(&self) -> impl Iterator<Item = &str> {
        self.opened_flasks.iter().map(String::as_str)
    }

    pub fn displayed_clue(&self) -> Option<&str> {
        self.displayed_clue.as_deref()
    }

    pub fn dismiss_clue(&mut self) {
        self.displayed_clue = None;
    }

    /// Moves forward to `next`. Never moves backward.
    fn advance_to(&mut self, next: ProgressState) -> bool {
        if next <= self.progress {
            return false;
        }
        log::info!("progress {} -> {}", self.progress, next);
        self.progress = next;
        true
    }

    pub fn handle_tap(&mut self, id: &InteractableId) -> TapOutcome {
        let name = id.as_str();
        if let Some(target) = PasscodeTarget::from_id(name) {
            return self.tap_lock(id, target);
        }
        if name.starts_with(CABINET_PREFIX) {
            return self.tap_cabinet(id);
        }
        if name.starts_with(FLASK_PREFIX) {
            if !self.unlocked(ProgressState::P3Done) {
                return TapOutcome::Locked {
                    required: ProgressState::P3Done,
                };
            }
            let open = toggle_member(&mut self.opened_flasks, name);
            return TapOutcome::Toggled {
                id: id.clone(),
                open,
                riddle_counted: false,
            };
        }
        match name {
            BOOK => {
                if !self.unlocked(ProgressState::P1Done) {
                    return TapOutcome::Locked {
                        required: ProgressState::P1Done,
                    };
                }
                self.book_open = !self.book_open;
                TapOutcome::Toggled {
                    id: id.clone(),
                    open: self.book_open,
                    riddle_counted: false,
                }
            }
            DRAWER => {
                if self.has_inserted_key {
                    TapOutcome::NoChange
                } else if self.insert_golden_key() {
                    TapOutcome::KeyInserted
                } else {
                    TapOutcome::Locked {
                        required: ProgressState::P4Done,
                    }
                }
            }
            _ => TapOutcome::Unhandled,
        }
    }

    fn tap_lock(&mut self, id: &InteractableId, target: PasscodeTarget) -> TapOutcome {
        if self.unlocked(target.advances_to()) {
            if target == PasscodeTarget::Door {
                return TapOutcome::NoChange;
            }
            let open = toggle_member(&mut self.opened, id.as_str());
            return TapOutcome::Toggled {
                id: id.clone(),
                open,
                riddle_counted: false,
            };
        }
        if !self.unlocked(target.required()) {
            return TapOutcome::Locked {
                required: target.required(),
            };
        }
        self.open_prompt(target);
        TapOutcome::PromptOpened(target)
    }

    fn tap_cabinet(&mut self, id: &InteractableId) -> TapOutcome {
        if !self.unlocked(ProgressState::P4Done) {
            return TapOutcome::Locked {
                required: ProgressState::P4Done,
            };
        }
        let open = toggle_member(&mut self.opened, id.as_str());
        let riddle_counted = open && self.riddle_sources.insert(id.as_str().to_string());
        if riddle_counted {
            self.found_riddle();
        }
        TapOutcome::Toggled {
            id: id.clone(),
            open,
            riddle_counted,
        }
    }

    pub fn open_prompt(&mut self, target: PasscodeTarget) {
        self.passcode.clear();
        self.prompt = Some(target);
    }

    pub fn dismiss_prompt(&mut self) {
        self.passcode.clear();
        self.prompt = None;
    }

    /// Typing is ignored while no prompt is open.
    pub fn append_passcode(&mut self, ch: char) -> bool {
        self.prompt.is_some() && self.passcode.append(ch)
    }

    pub fn clear_passcode(&mut self) {
        self.passcode.clear();
    }

    pub fn delete_passcode_last(&mut self) {
        self.passcode.delete_last();
    }

    /// Checks the buffer against the open prompt's secret. The buffer is
    /// cleared either way; a wrong code leaves the prompt open.
    pub fn submit_passcode(&mut self) -> PasscodeOutcome {
        let Some(target) = self.prompt else {
            return PasscodeOutcome::NoPrompt;
        };
        let entered = self.passcode.as_str().to_string();
        self.passcode.clear();
        let gate_open =
            self.unlocked(target.required()) && !self.unlocked(target.advances_to());
        if !gate_open || !self.secrets.check(target, &entered) {
            log::debug!("wrong code for {:?}", target);
            return PasscodeOutcome::Rejected { target };
        }

        self.prompt = None;
        let mut rewards = Vec::new();
        for item in target.rewards() {
            if self.inventory.add(item) {
                rewards.push(item.to_string());
            }
        }
        if target != PasscodeTarget::Door {
            self.opened.insert(target.object_id().to_string());
        }
        self.advance_to(target.advances_to());
        PasscodeOutcome::Accepted {
            target,
            progress: self.progress,
            rewards,
        }
    }

    /// Puts the golden key into the drawer. Only possible at P4_DONE with the
    /// key held, and only once.
    pub fn insert_golden_key(&mut self) -> bool {
        if self.progress != ProgressState::P4Done
            || self.has_inserted_key
            || !self.inventory.contains(GOLDEN_KEY)
        {
            return false;
        }
        self.inventory.remove(GOLDEN_KEY);
        self.has_inserted_key = true;
        self.advance_to(ProgressState::P5Done);
        self.check_riddles_complete();
        true
    }

    /// Counts one riddle, capped at three. Three riddles at P5_DONE finish
    /// the game.
    pub fn found_riddle(&mut self) -> u8 {
        if self.riddles_found < RIDDLE_CAP {
            self.riddles_found += 1;
        }
        self.check_riddles_complete();
        self.riddles_found
    }

    fn check_riddles_complete(&mut self) {
        if self.riddles_found == RIDDLE_CAP && self.progress == ProgressState::P5Done {
            self.advance_to(ProgressState::Finished);
        }
    }

    pub fn use_item(&mut self, item: &str) -> ItemOutcome {
        if !self.inventory.contains(item) {
            return ItemOutcome::NotHeld;
        }
        match item {
            UV_FLASHLIGHT => {
                self.uv_light_on = !self.uv_light_on;
                ItemOutcome::UvLight {
                    on: self.uv_light_on,
                }
            }
            GOLDEN_KEY => {
                if self.insert_golden_key() {
                    ItemOutcome::KeyInserted
                } else {
                    ItemOutcome::KeyRejected
                }
            }
            CLUE_COLOR => {
                self.inventory.remove(item);
                self.displayed_clue = Some(item.to_string());
                ItemOutcome::ClueShown {
                    item: item.to_string(),
                }
            }
            _ => ItemOutcome::Unusable,
        }
    }
}

/// Flips set membership and returns whether `name` is now present.
fn toggle_member(set: &mut BTreeSet<String>, name: &str) -> bool {
    if set.remove(name) {
        false
    } else {
        set.insert(name.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> InteractableId {
        InteractableId::from(name)
    }

    fn puzzle() -> PuzzleState {
        PuzzleState::new(PuzzleSecrets::default(), 8)
    }

    fn enter(puzzle: &mut PuzzleState, code: &str) -> PasscodeOutcome {
        for ch in code.chars() {
            puzzle.append_passcode(ch);
        }
        puzzle.submit_passcode()
    }

    /// Plays the three lockers, leaving the state at P4_DONE with the key.
    fn at_p4() -> PuzzleState {
        let mut puzzle = puzzle();
        for (lock, code) in [("locker_1", "coffe"), ("locker_2", "2586"), ("locker_3", "357759")] {
            assert!(matches!(
                puzzle.handle_tap(&id(lock)),
                TapOutcome::PromptOpened(_)
            ));
            assert!(matches!(enter(&mut puzzle, code), PasscodeOutcome::Accepted { .. }));
        }
        assert_eq!(puzzle.progress(), ProgressState::P4Done);
        puzzle
    }

    #[test]
    fn first_locker_solves_to_p1() {
        let mut puzzle = puzzle();
        assert_eq!(
            puzzle.handle_tap(&id("locker_1")),
            TapOutcome::PromptOpened(PasscodeTarget::Locker1)
        );
        let outcome = enter(&mut puzzle, "CoFFe");
        assert_eq!(
            outcome,
            PasscodeOutcome::Accepted {
                target: PasscodeTarget::Locker1,
                progress: ProgressState::P1Done,
                rewards: Vec::new(),
            }
        );
        assert_eq!(puzzle.passcode(), "");
        assert_eq!(puzzle.prompt(), None);
        assert!(puzzle.is_open("locker_1"));
    }

    #[test]
    fn wrong_code_changes_nothing() {
        let mut puzzle = puzzle();
        puzzle.handle_tap(&id("locker_1"));
        assert_eq!(
            enter(&mut puzzle, "tea"),
            PasscodeOutcome::Rejected {
                target: PasscodeTarget::Locker1
            }
        );
        assert_eq!(puzzle.progress(), ProgressState::None);
        assert_eq!(puzzle.passcode(), "");
        assert_eq!(puzzle.prompt(), Some(PasscodeTarget::Locker1));
    }

    #[test]
    fn locked_objects_report_their_requirement() {
        let mut puzzle = puzzle();
        assert_eq!(
            puzzle.handle_tap(&id("locker_2")),
            TapOutcome::Locked {
                required: ProgressState::P1Done
            }
        );
        assert_eq!(
            puzzle.handle_tap(&id("cabinet_1")),
            TapOutcome::Locked {
                required: ProgressState::P4Done
            }
        );
        assert_eq!(
            puzzle.handle_tap(&id("passcode_machine")),
            TapOutcome::Locked {
                required: ProgressState::P5Done
            }
        );
        assert_eq!(puzzle.progress(), ProgressState::None);
        assert_eq!(puzzle.prompt(), None);
    }

    #[test]
    fn earlier_objects_stay_unlocked() {
        let mut puzzle = at_p4();
        assert!(matches!(
            puzzle.handle_tap(&id("book")),
            TapOutcome::Toggled { open: true, .. }
        ));
        assert!(matches!(
            puzzle.handle_tap(&id("flask_2")),
            TapOutcome::Toggled { open: true, .. }
        ));
        // solved locker now toggles instead of reprompting
        assert!(matches!(
            puzzle.handle_tap(&id("locker_1")),
            TapOutcome::Toggled { open: false, .. }
        ));
        assert!(matches!(
            puzzle.handle_tap(&id("locker_1")),
            TapOutcome::Toggled { open: true, .. }
        ));
    }

    #[test]
    fn lockers_grant_their_rewards() {
        let puzzle = at_p4();
        assert_eq!(
            puzzle.inventory().items(),
            [UV_FLASHLIGHT, CLUE_COLOR, GOLDEN_KEY]
        );
    }

    #[test]
    fn key_insertion_happens_once() {
        let mut puzzle = at_p4();
        assert!(puzzle.insert_golden_key());
        assert_eq!(puzzle.progress(), ProgressState::P5Done);
        assert!(puzzle.has_inserted_key());
        assert!(!puzzle.insert_golden_key());
        assert_eq!(puzzle.progress(), ProgressState::P5Done);
        assert_eq!(puzzle.handle_tap(&id("drawer")), TapOutcome::NoChange);
    }

    #[test]
    fn riddle_tally_caps_at_three() {
        let mut puzzle = puzzle();
        for _ in 0..5 {
            puzzle.found_riddle();
        }
        assert_eq!(puzzle.riddles_found(), 3);
        assert_eq!(puzzle.progress(), ProgressState::None);
    }

    #[test]
    fn cabinets_count_once_and_finish_after_key() {
        let mut puzzle = at_p4();
        for cabinet in ["cabinet_1", "cabinet_2"] {
            assert!(matches!(
                puzzle.handle_tap(&id(cabinet)),
                TapOutcome::Toggled {
                    riddle_counted: true,
                    ..
                }
            ));
        }
        // closing and reopening does not count again
        puzzle.handle_tap(&id("cabinet_1"));
        assert!(matches!(
            puzzle.handle_tap(&id("cabinet_1")),
            TapOutcome::Toggled {
                open: true,
                riddle_counted: false,
                ..
            }
        ));
        assert_eq!(puzzle.riddles_found(), 2);

        assert_eq!(puzzle.use_item(GOLDEN_KEY), ItemOutcome::KeyInserted);
        assert_eq!(puzzle.progress(), ProgressState::P5Done);
        puzzle.handle_tap(&id("cabinet_3"));
        assert_eq!(puzzle.progress(), ProgressState::Finished);
    }

    #[test]
    fn door_code_finishes_the_game() {
        let mut puzzle = at_p4();
        puzzle.insert_golden_key();
        assert_eq!(
            puzzle.handle_tap(&id("passcode_machine")),
            TapOutcome::PromptOpened(PasscodeTarget::Door)
        );
        assert!(matches!(
            enter(&mut puzzle, "1268"),
            PasscodeOutcome::Accepted {
                progress: ProgressState::Finished,
                ..
            }
        ));
        assert_eq!(puzzle.handle_tap(&id("passcode_machine")), TapOutcome::NoChange);
    }

    #[test]
    fn items_have_their_effects() {
        let mut puzzle = at_p4();
        assert_eq!(puzzle.use_item(UV_FLASHLIGHT), ItemOutcome::UvLight { on: true });
        assert_eq!(puzzle.use_item(UV_FLASHLIGHT), ItemOutcome::UvLight { on: false });
        assert_eq!(
            puzzle.use_item(CLUE_COLOR),
            ItemOutcome::ClueShown {
                item: CLUE_COLOR.to_string()
            }
        );
        assert_eq!(puzzle.displayed_clue(), Some(CLUE_COLOR));
        assert_eq!(puzzle.use_item(CLUE_COLOR), ItemOutcome::NotHeld);
        assert!(!puzzle.inventory().contains(CLUE_COLOR));
    }

    #[test]
    fn typing_without_prompt_is_ignored() {
        let mut puzzle = puzzle();
        assert!(!puzzle.append_passcode('1'));
        assert_eq!(puzzle.passcode(), "");
        assert_eq!(puzzle.submit_passcode(), PasscodeOutcome::NoPrompt);
    }

    #[test]
    fn unknown_objects_are_left_to_the_caller() {
        let mut puzzle = puzzle();
        assert_eq!(puzzle.handle_tap(&id("calendar")), TapOutcome::Unhandled);
    }
}
