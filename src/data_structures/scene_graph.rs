//! Scene organization.
//!
//! The scene is flat: a handful of nodes kept in insertion order, each with
//! its own geometry, material and transform. Nodes are only ever appended,
//! so a [`NodeId`] stays valid for the lifetime of the scene.

use crate::data_structures::{instance::Instance, model::Geometry};

/// Which lit surface a glyph node uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceSlot {
    Text,
    Number,
}

/// How a node is shaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Radial falloff from the object's centre, no lighting.
    Glow,
    /// Blinn-Phong lit by the cube, see [`crate::shading`].
    Surface(SurfaceSlot),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: String,
    pub geometry: Geometry,
    pub material: MaterialKind,
    pub instance: Instance,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, geometry: Geometry, material: MaterialKind) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
            instance: Instance::default(),
        }
    }

    pub fn at(mut self, position: cgmath::Vector3<f32>) -> Self {
        self.instance.position = position;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: SceneNode) -> NodeId {
        log::debug!("adding scene node {:?}", node.name);
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn ids_follow_insertion_order() {
        let mut scene = Scene::new();
        let cube = scene.add(SceneNode::new("cube", Geometry::cuboid(0.5, 0.5, 0.5), MaterialKind::Glow));
        let text = scene.add(
            SceneNode::new("Z", Geometry::default(), MaterialKind::Surface(SurfaceSlot::Text))
                .at(Vector3::new(-2.0, 0.0, 0.0)),
        );
        assert_eq!(scene.len(), 2);
        assert_eq!(cube.index(), 0);
        assert_eq!(scene.get(text).unwrap().name, "Z");
        let names: Vec<_> = scene.iter().map(|(_, n)| n.name.as_str()).collect();
        assert_eq!(names, ["cube", "Z"]);
    }

    #[test]
    fn nodes_are_mutable_in_place() {
        let mut scene = Scene::new();
        let id = scene.add(SceneNode::new("cube", Geometry::default(), MaterialKind::Glow));
        scene.get_mut(id).unwrap().instance.position.y += 1.0;
        assert_eq!(scene.get(id).unwrap().instance.position, Vector3::new(0.0, 1.0, 0.0));
        assert!(scene.get(NodeId(5)).is_none());
    }
}
