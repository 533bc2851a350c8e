//! Scene graph: nodes with transforms, child containers and categorized draw lists.
//!
//! Children and drawables live in slot maps, so their keys stay valid while
//! other entries are inserted or removed, and a removed entry's key never
//! resolves to a later one.

use slotmap::{SlotMap, new_key_type};

pub use slotmap::Key;

use crate::transform::Transform;

new_key_type! {
    /// Child node of a [`SceneNode`].
    pub struct NodeHandle;
    /// Entry in one of the containers of a [`DrawList`].
    pub struct DrawHandle;
}

/// Drawables grouped by how they are blended.
pub struct DrawList<D> {
    /// Opaque geometry, drawn without blending.
    pub opaque: SlotMap<DrawHandle, D>,
    /// Alpha-blended geometry.
    pub blend: SlotMap<DrawHandle, D>,
    /// Self-lit geometry (lamps, brake lights).
    pub emissive: SlotMap<DrawHandle, D>,
}

impl<D> Default for DrawList<D> {
    fn default() -> Self {
        Self {
            opaque: SlotMap::with_key(),
            blend: SlotMap::with_key(),
            emissive: SlotMap::with_key(),
        }
    }
}

impl<D> DrawList<D> {
    pub fn len(&self) -> usize {
        self.opaque.len() + self.blend.len() + self.emissive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scene graph node, generic over the drawable payload.
pub struct SceneNode<D> {
    transform: Transform,
    children: SlotMap<NodeHandle, SceneNode<D>>,
    drawlist: DrawList<D>,
}

impl<D> Default for SceneNode<D> {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            children: SlotMap::with_key(),
            drawlist: DrawList::default(),
        }
    }
}

impl<D> SceneNode<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self) -> NodeHandle {
        self.children.insert(SceneNode::new())
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&SceneNode<D>> {
        self.children.get(handle)
    }

    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut SceneNode<D>> {
        self.children.get_mut(handle)
    }

    pub fn remove_node(&mut self, handle: NodeHandle) -> Option<SceneNode<D>> {
        self.children.remove(handle)
    }

    pub fn children(&self) -> &SlotMap<NodeHandle, SceneNode<D>> {
        &self.children
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn drawlist(&self) -> &DrawList<D> {
        &self.drawlist
    }

    pub fn drawlist_mut(&mut self) -> &mut DrawList<D> {
        &mut self.drawlist
    }
}
