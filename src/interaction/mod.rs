//! Tapped node → canonical interactable id.
//!
//! Classification is a pure function of the tapped node's name, its parent's
//! name and the [`InteractionTable`]. The table is plain data so a new asset
//! only needs new rows, never new match arms.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::gfx::scene::{NodeId, Scene};

/// Canonical id the puzzle logic works with, e.g. `locker_1` or
/// `passcode_machine`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractableId(String);

impl InteractableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InteractableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InteractableId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// `source` is the node whose name produced the id (the tapped node or
    /// the parent it resolved to).
    Interactable { id: InteractableId, source: NodeId },
    Ignored,
}

impl Classification {
    pub fn id(&self) -> Option<&InteractableId> {
        match self {
            Classification::Interactable { id, .. } => Some(id),
            Classification::Ignored => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "match", rename_all = "snake_case")]
pub enum AliasRule {
    Exact { name: String, id: String },
    Prefix { prefix: String, id: String },
    /// Names ending in `suffix` take their parent's id (a locker door
    /// belongs to its locker).
    ParentOf { suffix: String },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DenyList {
    pub exact: Vec<String>,
    pub prefixes: Vec<String>,
}

impl DenyList {
    pub fn denies(&self, name: &str) -> bool {
        self.exact.iter().any(|exact| exact == name)
            || self.prefixes.iter().any(|prefix| name.starts_with(prefix.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionTable {
    /// Checked in order; the first matching rule wins.
    pub aliases: Vec<AliasRule>,
    /// Grouping nodes that are never the preferred parent of a tapped mesh.
    pub containers: Vec<String>,
    pub deny: DenyList,
}

impl Default for InteractionTable {
    fn default() -> Self {
        let exact = |name: &str, id: &str| AliasRule::Exact {
            name: name.to_string(),
            id: id.to_string(),
        };
        let prefix = |prefix: &str, id: &str| AliasRule::Prefix {
            prefix: prefix.to_string(),
            id: id.to_string(),
        };
        Self {
            aliases: vec![
                exact("Passcode_Machine", "passcode_machine"),
                prefix("Numpad_", "passcode_machine"),
                prefix("Codepad_", "passcode_machine"),
                prefix("KeyTurn_", "passcode_machine"),
                prefix("Number_", "passcode_machine"),
                AliasRule::ParentOf {
                    suffix: "_Door".to_string(),
                },
                exact("Book_Front", "book"),
                exact("Book_Back", "book"),
                exact("Cabiner_1", "cabinet_1"),
            ],
            containers: vec!["root".to_string(), "Room".to_string()],
            deny: DenyList {
                exact: vec!["Window".to_string(), "Floor".to_string()],
                prefixes: vec![
                    "Window_".to_string(),
                    "Floor_".to_string(),
                    "Wall_".to_string(),
                    "Vent".to_string(),
                    "Tube".to_string(),
                ],
            },
        }
    }
}

impl InteractionTable {
    /// Rejects empty names, duplicate rules and names that are both aliased
    /// and deny-listed.
    pub fn validate(&self) -> Result<(), TableError> {
        const TABLE: &str = "interaction table";
        let mut seen = HashSet::new();
        for (index, rule) in self.aliases.iter().enumerate() {
            let (key, id) = match rule {
                AliasRule::Exact { name, id } => (name, Some(id)),
                AliasRule::Prefix { prefix, id } => (prefix, Some(id)),
                AliasRule::ParentOf { suffix } => (suffix, None),
            };
            if key.is_empty() {
                return Err(TableError::EmptyField {
                    table: TABLE,
                    index,
                    field: "name",
                });
            }
            if id.is_some_and(|id| id.is_empty()) {
                return Err(TableError::EmptyField {
                    table: TABLE,
                    index,
                    field: "id",
                });
            }
            if !seen.insert(key.clone()) {
                return Err(TableError::Duplicate {
                    table: TABLE,
                    name: key.clone(),
                });
            }
            if let AliasRule::Exact { name, .. } = rule {
                if self.deny.denies(name) {
                    return Err(TableError::AliasedAndDenied { name: name.clone() });
                }
            }
        }
        for (index, name) in self.deny.exact.iter().chain(&self.deny.prefixes).enumerate() {
            if name.is_empty() {
                return Err(TableError::EmptyField {
                    table: TABLE,
                    index,
                    field: "deny",
                });
            }
        }
        Ok(())
    }

    fn is_container(&self, name: &str) -> bool {
        self.containers.iter().any(|container| container == name)
    }

    /// Resolves a bare name. `None` means the name is scenery.
    pub fn canonical_name(&self, name: &str) -> Option<InteractableId> {
        if self.deny.denies(name) {
            return None;
        }
        for rule in &self.aliases {
            match rule {
                AliasRule::Exact { name: exact, id } if exact == name => {
                    return Some(InteractableId::new(id.clone()));
                }
                AliasRule::Prefix { prefix, id } if name.starts_with(prefix.as_str()) => {
                    return Some(InteractableId::new(id.clone()));
                }
                _ => {}
            }
        }
        Some(InteractableId::new(name.to_lowercase()))
    }

    /// Maps a tapped node to its canonical id.
    ///
    /// The parent wins over the tapped node when it carries a name and is
    /// not a grouping container; unnamed nodes with unnamed parents are
    /// ignored. The deny list applies to the resolved name only.
    pub fn classify(&self, scene: &Scene, tapped: NodeId) -> Classification {
        let named = |id: NodeId| scene.node(id).and_then(|node| node.label()).map(|name| (id, name));

        let parent = scene
            .parent(tapped)
            .and_then(named)
            .filter(|(_, name)| !self.is_container(name));
        let own = named(tapped).filter(|(_, name)| !self.is_container(name));

        let Some((mut source, mut name)) = parent.or(own) else {
            return Classification::Ignored;
        };

        let resolves_to_parent = self.aliases.iter().any(|rule| {
            matches!(rule, AliasRule::ParentOf { suffix } if name.ends_with(suffix.as_str()))
        });
        if resolves_to_parent {
            match scene.parent(source).and_then(named) {
                Some((parent, parent_name)) if !self.is_container(parent_name) => {
                    source = parent;
                    name = parent_name;
                }
                _ => {}
            }
        }

        match self.canonical_name(name) {
            Some(id) => Classification::Interactable { id, source },
            None => {
                log::debug!("tap on scenery `{name}` swallowed");
                Classification::Ignored
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    struct Fixture {
        scene: Scene,
        locker: NodeId,
        door_mesh: NodeId,
        door: NodeId,
        button: NodeId,
        book_front: NodeId,
        wall: NodeId,
        unnamed: NodeId,
        calendar: NodeId,
    }

    fn fixture() -> Fixture {
        let origin = Vector3::new(0.0, 0.0, 0.0);
        let mut scene = Scene::new();
        let room = scene.add_named(scene.root(), "root", origin);
        let locker = scene.add_named(room, "Locker_1", origin);
        let door = scene.add_named(locker, "Locker_1_Door", origin);
        let door_mesh = scene.add_named(door, "Cube_003", origin);
        let machine = scene.add_named(room, "Passcode_Machine", origin);
        let button = scene.add_named(machine, "Numpad_7", origin);
        let book = scene.add_node(room, crate::gfx::scene::Node::new(None));
        let book_front = scene.add_named(book, "Book_Front", origin);
        let wall = scene.add_named(room, "Wall_2", origin);
        let unnamed_parent = scene.add_node(room, crate::gfx::scene::Node::new(None));
        let unnamed = scene.add_node(unnamed_parent, crate::gfx::scene::Node::new(None));
        let calendar = scene.add_named(room, "Calendar", origin);
        Fixture {
            scene,
            locker,
            door_mesh,
            door,
            button,
            book_front,
            wall,
            unnamed,
            calendar,
        }
    }

    fn id_of(table: &InteractionTable, scene: &Scene, node: NodeId) -> Option<String> {
        table.classify(scene, node).id().map(|id| id.as_str().to_string())
    }

    #[test]
    fn default_table_is_valid() {
        assert_eq!(InteractionTable::default().validate(), Ok(()));
    }

    #[test]
    fn locker_door_resolves_to_locker() {
        let f = fixture();
        let table = InteractionTable::default();
        assert_eq!(id_of(&table, &f.scene, f.door).as_deref(), Some("locker_1"));
        assert_eq!(
            table.classify(&f.scene, f.door_mesh),
            Classification::Interactable {
                id: InteractableId::from("locker_1"),
                source: f.locker,
            }
        );
    }

    #[test]
    fn keypad_buttons_collapse_to_passcode_machine() {
        let f = fixture();
        let table = InteractionTable::default();
        assert_eq!(
            id_of(&table, &f.scene, f.button).as_deref(),
            Some("passcode_machine")
        );
        assert_eq!(
            table.canonical_name("KeyTurn_Left").map(|id| id.to_string()),
            Some("passcode_machine".to_string())
        );
    }

    #[test]
    fn book_halves_share_one_id() {
        let f = fixture();
        let table = InteractionTable::default();
        assert_eq!(id_of(&table, &f.scene, f.book_front).as_deref(), Some("book"));
        assert_eq!(
            table.canonical_name("Book_Back").map(|id| id.to_string()),
            Some("book".to_string())
        );
    }

    #[test]
    fn scenery_and_unnamed_nodes_are_ignored() {
        let f = fixture();
        let table = InteractionTable::default();
        assert_eq!(table.classify(&f.scene, f.wall), Classification::Ignored);
        assert_eq!(table.classify(&f.scene, f.unnamed), Classification::Ignored);
        assert!(table.canonical_name("Window").is_none());
        assert!(table.canonical_name("Vent_Top").is_none());
    }

    #[test]
    fn scenery_named_part_of_an_interactable_resolves_to_it() {
        let mut f = fixture();
        let origin = Vector3::new(0.0, 0.0, 0.0);
        let room = f.scene.find("root").expect("room");
        let flask = f.scene.add_named(room, "Flask_1", origin);
        let glass = f.scene.add_named(flask, "Tube_Glass", origin);
        let table = InteractionTable::default();
        assert_eq!(
            table.classify(&f.scene, glass),
            Classification::Interactable {
                id: InteractableId::from("flask_1"),
                source: flask,
            }
        );
    }

    #[test]
    fn container_parent_is_skipped() {
        let f = fixture();
        let table = InteractionTable::default();
        assert_eq!(id_of(&table, &f.scene, f.calendar).as_deref(), Some("calendar"));
    }

    #[test]
    fn classification_is_deterministic() {
        let f = fixture();
        let table = InteractionTable::default();
        for node in [f.door_mesh, f.button, f.book_front, f.wall, f.calendar] {
            assert_eq!(table.classify(&f.scene, node), table.classify(&f.scene, node));
        }
    }

    #[test]
    fn validation_catches_bad_rows() {
        let mut table = InteractionTable::default();
        table.aliases.push(AliasRule::Exact {
            name: "Passcode_Machine".to_string(),
            id: "door".to_string(),
        });
        assert!(matches!(table.validate(), Err(TableError::Duplicate { .. })));

        let mut table = InteractionTable::default();
        table.aliases.push(AliasRule::Exact {
            name: "Wall_1".to_string(),
            id: "wall".to_string(),
        });
        assert_eq!(
            table.validate(),
            Err(TableError::AliasedAndDenied {
                name: "Wall_1".to_string()
            })
        );

        let mut table = InteractionTable::default();
        table.aliases.push(AliasRule::Prefix {
            prefix: "Lever_".to_string(),
            id: String::new(),
        });
        assert!(matches!(
            table.validate(),
            Err(TableError::EmptyField { field: "id", .. })
        ));
    }

    #[test]
    fn table_loads_from_json() {
        let table: InteractionTable = serde_json::from_str(
            r#"{
                "aliases": [
                    { "match": "prefix", "prefix": "Dial_", "id": "safe" },
                    { "match": "parent_of", "suffix": "_Lid" }
                ],
                "deny": { "exact": ["Rug"] }
            }"#,
        )
        .expect("table parses");
        assert_eq!(table.validate(), Ok(()));
        assert_eq!(table.canonical_name("Dial_3").unwrap().as_str(), "safe");
        assert!(table.canonical_name("Rug").is_none());
        assert_eq!(table.containers, vec!["root".to_string(), "Room".to_string()]);
    }
}
