use serde::Serialize;

pub const UV_FLASHLIGHT: &str = "UV_Flashlight";
pub const CLUE_COLOR: &str = "Clue_color";
pub const GOLDEN_KEY: &str = "Golden_Key";

/// Items held by the player, in pickup order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Inventory {
    items: Vec<String>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `item` unless it is already held.
    pub fn add(&mut self, item: &str) -> bool {
        if self.contains(item) {
            return false;
        }
        self.items.push(item.to_string());
        true
    }

    pub fn remove(&mut self, item: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|held| held != item);
        before != self.items.len()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|held| held == item)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
