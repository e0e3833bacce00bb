//! Progress graph, inventory, passcodes and per-object behaviour.

pub mod hints;
pub mod inventory;
pub mod machine;
pub mod passcode;
pub mod progress;

pub use hints::hint_for;
pub use inventory::{Inventory, CLUE_COLOR, GOLDEN_KEY, UV_FLASHLIGHT};
pub use machine::{ItemOutcome, PasscodeOutcome, PuzzleState, TapOutcome, RIDDLE_CAP};
pub use passcode::{PasscodeBuffer, PasscodeTarget, PuzzleSecrets, Secret};
pub use progress::ProgressState;
