use super::progress::ProgressState;

pub fn hint_for(state: ProgressState) -> &'static str {
    match state {
        ProgressState::None => {
            "Important dates. Some elements on that day might be something... aromatic."
        }
        ProgressState::P1Done => {
            "You found the cup. Great. Now mix what's under it with some light reading, preferably the kind that hides secrets between pages."
        }
        ProgressState::P3Done => {
            "Paper to scope. Light to flasks. Let there be numbers, just not in the wrong order."
        }
        ProgressState::P4Done => "The key might open something... something shiny.",
        ProgressState::P5Done => {
            "Your key opened shelves, not answers. Solve the riddles, find the elements, then do some basic chemistry math."
        }
        ProgressState::Finished => "The door is open. Walk out!",
    }
}
