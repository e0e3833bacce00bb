use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::gfx::picking::Aabb;

use super::node::{Node, NodeId, Transform};

/// Arena-backed node tree for one loaded scene.
///
/// Node lookups by name return `None` when nothing matches; callers treat a
/// missing node as "feature unavailable" and carry on.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Creates an empty scene with an unnamed root node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(None)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Appends `node` under `parent` and returns its id.
    pub fn add_node(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        if let Some(parent_node) = self.nodes.get_mut(parent.0) {
            parent_node.children.push(id);
        }
        id
    }

    /// Convenience for adding a named child at a local position.
    pub fn add_named(&mut self, parent: NodeId, name: &str, position: Vector3<f32>) -> NodeId {
        let mut node = Node::named(name);
        node.transform = Transform::from_position(position);
        self.add_node(parent, node)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(Node::label)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|node| node.children()).unwrap_or(&[])
    }

    /// Depth-first list of every node below `id` (excluding `id`).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Finds a node named `name` below `from`.
    ///
    /// With `recursive` false only direct children are searched. The search is
    /// depth-first in child order, so the first match in authoring order wins.
    pub fn find_node(&self, from: NodeId, name: &str, recursive: bool) -> Option<NodeId> {
        if recursive {
            self.descendants(from)
                .into_iter()
                .find(|id| self.name(*id) == Some(name))
        } else {
            self.children(from)
                .iter()
                .copied()
                .find(|id| self.name(*id) == Some(name))
        }
    }

    /// Recursive lookup from the scene root.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.find_node(self.root, name, true)
    }

    pub fn transform(&self, id: NodeId) -> Option<Transform> {
        self.node(id).map(|node| node.transform)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) {
        if let Some(node) = self.node_mut(id) {
            node.transform = transform;
        }
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        if let Some(node) = self.node_mut(id) {
            node.hidden = hidden;
        }
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.hidden)
    }

    /// True when neither the node nor any ancestor is hidden.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match self.node(current) {
                Some(node) if node.hidden => return false,
                Some(node) => cursor = node.parent,
                None => return false,
            }
        }
        true
    }

    pub fn set_pivot(&mut self, id: NodeId, center: Vector3<f32>) {
        if let Some(node) = self.node_mut(id) {
            node.transform.pivot = center;
        }
    }

    /// Node-to-world matrix.
    pub fn world_matrix(&self, id: NodeId) -> Matrix4<f32> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match self.node(current) {
                Some(node) => {
                    chain.push(node.local_matrix());
                    cursor = node.parent;
                }
                None => break,
            }
        }
        chain
            .into_iter()
            .rev()
            .fold(Matrix4::identity(), |acc, local| acc * local)
    }

    /// Bounds of the node and all of its descendants in the node's local
    /// space (the node's own transform is not applied).
    pub fn bounding_box(&self, id: NodeId) -> Option<Aabb> {
        let node = self.node(id)?;
        let mut result = node.bounds;
        for child in node.children() {
            let Some(child_node) = self.node(*child) else {
                continue;
            };
            if let Some(child_box) = self.bounding_box(*child) {
                let local = child_box.transform(&child_node.local_matrix());
                result = Some(match result {
                    Some(existing) => existing.union(&local),
                    None => local,
                });
            }
        }
        result
    }

    /// Bounds of the subtree in world space.
    pub fn world_bounding_box(&self, id: NodeId) -> Option<Aabb> {
        let local = self.bounding_box(id)?;
        Some(local.transform(&self.world_matrix(id)))
    }

    /// Deep-copies `id` and its subtree next to the original (same parent).
    ///
    /// The copy has its own transforms; edits to it never touch the source.
    pub fn clone_node(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id).unwrap_or(self.root);
        let source = self.clone();
        copy_subtree(&source, id, self, parent)
    }

    /// Deep-copies `id` and its subtree into a fresh scene, directly under
    /// the new scene's root. Returns the new scene and the copy's id.
    pub fn extract(&self, id: NodeId) -> Option<(Scene, NodeId)> {
        let mut isolated = Scene::new();
        let root = isolated.root();
        let copy = copy_subtree(self, id, &mut isolated, root)?;
        Some((isolated, copy))
    }

    /// Names of every named node, in depth-first order.
    pub fn node_names(&self) -> Vec<String> {
        self.descendants(self.root)
            .into_iter()
            .filter_map(|id| self.name(id).map(str::to_string))
            .collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }
}

fn copy_subtree(source: &Scene, id: NodeId, target: &mut Scene, parent: NodeId) -> Option<NodeId> {
    let node = source.node(id)?.clone();
    let children = node.children.clone();
    let copy = target.add_node(parent, node);
    for child in children {
        copy_subtree(source, child, target, copy);
    }
    Some(copy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn sample() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new();
        let root = scene.root();
        let room = scene.add_named(root, "root", Vector3::new(0.0, 0.0, 0.0));
        let locker = scene.add_named(room, "Locker_1", Vector3::new(1.0, 0.0, 0.0));
        let door = scene.add_named(locker, "Locker_1_Door", Vector3::new(0.0, 0.5, 0.0));
        scene.node_mut(door).unwrap().bounds = Some(Aabb::new(
            Vector3::new(-0.5, -0.5, -0.1),
            Vector3::new(0.5, 0.5, 0.1),
        ));
        (scene, locker, door)
    }

    #[test]
    fn find_node_respects_recursion_flag() {
        let (scene, locker, door) = sample();
        assert_eq!(scene.find("Locker_1_Door"), Some(door));
        assert_eq!(scene.find_node(scene.root(), "Locker_1", false), None);
        assert_eq!(scene.find_node(locker, "Locker_1_Door", false), Some(door));
        assert_eq!(scene.find("Missing"), None);
    }

    #[test]
    fn bounding_box_includes_child_offsets() {
        let (scene, locker, _) = sample();
        let bounds = scene.bounding_box(locker).expect("locker has geometry");
        assert_eq!(bounds.min, Vector3::new(-0.5, 0.0, -0.1));
        assert_eq!(bounds.max, Vector3::new(0.5, 1.0, 0.1));
    }

    #[test]
    fn hidden_ancestor_hides_descendants() {
        let (mut scene, locker, door) = sample();
        assert!(scene.is_visible(door));
        scene.set_hidden(locker, true);
        assert!(!scene.is_visible(door));
        assert!(!scene.is_hidden(door));
    }

    #[test]
    fn clone_is_independent_of_source() {
        let (mut scene, locker, door) = sample();
        let copy = scene.clone_node(locker).expect("clone");
        assert_ne!(copy, locker);
        assert_eq!(scene.parent(copy), scene.parent(locker));

        let copied_door = scene.find_node(copy, "Locker_1_Door", false).unwrap();
        assert_ne!(copied_door, door);

        let mut moved = scene.transform(copy).unwrap();
        moved.position.x = 9.0;
        scene.set_transform(copy, moved);
        assert_eq!(scene.transform(locker).unwrap().position.x, 1.0);
    }

    #[test]
    fn extract_builds_isolated_scene() {
        let (scene, locker, _) = sample();
        let (isolated, copy) = scene.extract(locker).expect("extract");
        assert_eq!(isolated.parent(copy), Some(isolated.root()));
        assert_eq!(isolated.node_names(), vec!["Locker_1", "Locker_1_Door"]);
        assert_eq!(scene.node_count(), 4);
    }

    #[test]
    fn missing_ids_are_noops() {
        let (mut scene, _, _) = sample();
        let ghost = NodeId(99);
        scene.set_hidden(ghost, true);
        scene.set_pivot(ghost, Vector3::new(1.0, 1.0, 1.0));
        assert!(scene.bounding_box(ghost).is_none());
        assert!(scene.clone_node(ghost).is_none());
    }
}
