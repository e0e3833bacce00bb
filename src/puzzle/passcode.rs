//! Passcode entry and the secrets it is checked against.

use serde::{Deserialize, Serialize};

use super::inventory::{CLUE_COLOR, GOLDEN_KEY, UV_FLASHLIGHT};
use super::progress::ProgressState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasscodeTarget {
    Locker1,
    Locker2,
    Locker3,
    Door,
}

impl PasscodeTarget {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "locker_1" => Some(PasscodeTarget::Locker1),
            "locker_2" => Some(PasscodeTarget::Locker2),
            "locker_3" => Some(PasscodeTarget::Locker3),
            "passcode_machine" => Some(PasscodeTarget::Door),
            _ => None,
        }
    }

    /// Canonical id of the object carrying this lock.
    pub fn object_id(self) -> &'static str {
        match self {
            PasscodeTarget::Locker1 => "locker_1",
            PasscodeTarget::Locker2 => "locker_2",
            PasscodeTarget::Locker3 => "locker_3",
            PasscodeTarget::Door => "passcode_machine",
        }
    }

    pub fn required(self) -> ProgressState {
        match self {
            PasscodeTarget::Locker1 => ProgressState::None,
            PasscodeTarget::Locker2 => ProgressState::P1Done,
            PasscodeTarget::Locker3 => ProgressState::P3Done,
            PasscodeTarget::Door => ProgressState::P5Done,
        }
    }

    pub fn advances_to(self) -> ProgressState {
        match self {
            PasscodeTarget::Locker1 => ProgressState::P1Done,
            PasscodeTarget::Locker2 => ProgressState::P3Done,
            PasscodeTarget::Locker3 => ProgressState::P4Done,
            PasscodeTarget::Door => ProgressState::Finished,
        }
    }

    /// Items found behind the lock.
    pub fn rewards(self) -> &'static [&'static str] {
        match self {
            PasscodeTarget::Locker2 => &[UV_FLASHLIGHT, CLUE_COLOR],
            PasscodeTarget::Locker3 => &[GOLDEN_KEY],
            PasscodeTarget::Locker1 | PasscodeTarget::Door => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    pub code: String,
    #[serde(default)]
    pub ignore_case: bool,
}

impl Secret {
    fn exact(code: &str) -> Self {
        Self {
            code: code.to_string(),
            ignore_case: false,
        }
    }

    pub fn matches(&self, entered: &str) -> bool {
        if self.ignore_case {
            self.code.to_lowercase() == entered.to_lowercase()
        } else {
            self.code == entered
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleSecrets {
    pub locker_1: Secret,
    pub locker_2: Secret,
    pub locker_3: Secret,
    pub door: Secret,
}

impl Default for PuzzleSecrets {
    fn default() -> Self {
        Self {
            locker_1: Secret {
                code: "coffe".to_string(),
                ignore_case: true,
            },
            locker_2: Secret::exact("2586"),
            locker_3: Secret::exact("357759"),
            door: Secret::exact("1268"),
        }
    }
}

impl PuzzleSecrets {
    pub fn secret(&self, target: PasscodeTarget) -> &Secret {
        match target {
            PasscodeTarget::Locker1 => &self.locker_1,
            PasscodeTarget::Locker2 => &self.locker_2,
            PasscodeTarget::Locker3 => &self.locker_3,
            PasscodeTarget::Door => &self.door,
        }
    }

    pub fn check(&self, target: PasscodeTarget, entered: &str) -> bool {
        self.secret(target).matches(entered)
    }
}

/// Characters typed into the passcode prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasscodeBuffer {
    entered: String,
    max_len: usize,
}

impl PasscodeBuffer {
    pub fn new(max_len: usize) -> Self {
        Self {
            entered: String::new(),
            max_len,
        }
    }

    /// Appends one character; ignored once the buffer is full.
    pub fn append(&mut self, ch: char) -> bool {
        if self.entered.chars().count() >= self.max_len {
            return false;
        }
        self.entered.push(ch);
        true
    }

    pub fn delete_last(&mut self) -> Option<char> {
        self.entered.pop()
    }

    pub fn clear(&mut self) {
        self.entered.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.entered
    }

    pub fn is_empty(&self) -> bool {
        self.entered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_then_clear_is_empty() {
        let mut buffer = PasscodeBuffer::new(8);
        buffer.append('2');
        buffer.append('5');
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.as_str(), "");
    }

    #[test]
    fn delete_last_drops_one_char() {
        let mut buffer = PasscodeBuffer::new(8);
        buffer.append('a');
        buffer.append('b');
        assert_eq!(buffer.delete_last(), Some('b'));
        assert_eq!(buffer.as_str(), "a");
        buffer.clear();
        assert_eq!(buffer.delete_last(), None);
    }

    #[test]
    fn buffer_stops_at_max_len() {
        let mut buffer = PasscodeBuffer::new(4);
        for ch in "123456".chars() {
            buffer.append(ch);
        }
        assert_eq!(buffer.as_str(), "1234");
    }

    #[test]
    fn first_lock_ignores_case_others_do_not() {
        let secrets = PuzzleSecrets::default();
        assert!(secrets.check(PasscodeTarget::Locker1, "CoFFe"));
        assert!(secrets.check(PasscodeTarget::Locker1, "coffe"));
        assert!(!secrets.check(PasscodeTarget::Locker1, "coffee"));
        assert!(secrets.check(PasscodeTarget::Locker2, "2586"));
        assert!(!secrets.check(PasscodeTarget::Locker2, "2585"));
        assert!(secrets.check(PasscodeTarget::Door, "1268"));
    }

    #[test]
    fn targets_map_to_object_ids() {
        for target in [
            PasscodeTarget::Locker1,
            PasscodeTarget::Locker2,
            PasscodeTarget::Locker3,
            PasscodeTarget::Door,
        ] {
            assert_eq!(PasscodeTarget::from_id(target.object_id()), Some(target));
            assert!(target.advances_to() > target.required());
        }
    }
}
