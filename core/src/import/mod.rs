//! Scene flattening and packed geometry import.
//!
//! Importing runs in two passes over the active scene of a
//! [`SceneDescription`]:
//!
//! 1. [`SizePlan::measure`] walks the hierarchy and reads every index stream
//!    once to learn the exact number of nodes, primitives, vertices and
//!    indices the import will produce.
//! 2. [`flatten_scene`] allocates every output once from that plan and walks
//!    the hierarchy again, composing world transforms and packing each
//!    primitive's referenced vertex range into one interleaved vertex array.
//!
//! [`SceneImport`] then hands the packed arrays to a [`BufferDevice`] and
//! keeps the resulting buffer handles until teardown.
//!
//! # Vertex layout
//!
//! A vertex is `flags.vertex_stride()` floats: position (3), normal (3) and
//! texcoord 0 (2), each present only when its [`ImportFlags`] bit is set.
//! Attributes missing from a primitive leave zeros in their slots.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use redlilium_import::device::DummyDevice;
//! use redlilium_import::import::{ImportFlags, SceneDescription, SceneImport};
//!
//! let data = std::fs::read("model.glb").unwrap();
//! let scene = SceneDescription::from_gltf_slice(&data).unwrap();
//!
//! let device = Arc::new(DummyDevice::new());
//! let mut import = SceneImport::new();
//! import.import(&device, &scene, ImportFlags::default()).unwrap();
//! println!("{} nodes, {} primitives", import.num_nodes(), import.num_primitives());
//! ```

mod decoder;
mod error;
mod flags;
#[cfg(feature = "gltf")]
mod gltf;
mod importer;
mod index;
mod planner;
mod publisher;
mod source;
#[cfg(test)]
mod tests;
mod walker;

pub use decoder::AttributeDecoder;
pub use error::ImportError;
pub use flags::{ImportFlags, VertexAttributeKind};
pub use importer::{FlattenedScene, Node, Primitive, flatten_scene, local_transform};
pub use index::{IndexSpan, IndexStream, IndexWidth, read_indices};
pub use planner::SizePlan;
pub use publisher::PublishedBuffers;
pub use source::{
    AccessorBytes, AccessorDesc, AccessorType, BufferViewDesc, ComponentType, MeshDesc, NodeDesc,
    PrimitiveDesc, SceneDesc, SceneDescription, component_type,
};
pub use walker::{NodeVisitor, walk_roots, walk_scene};

use std::sync::Arc;

use crate::device::BufferDevice;

/// Flattened scene published to a [`BufferDevice`].
///
/// Owns the node and primitive arrays and the device buffers holding the
/// packed vertices and indices. Buffers are released by
/// [`free_resources`](Self::free_resources), by the next
/// [`import`](Self::import), or on drop.
pub struct SceneImport<D: BufferDevice> {
    device: Option<Arc<D>>,
    buffers: Option<PublishedBuffers<D::Buffer>>,
    nodes: Vec<Node>,
    primitives: Vec<Primitive>,
    flags: ImportFlags,
}

impl<D: BufferDevice> SceneImport<D> {
    /// Create an empty import.
    pub fn new() -> Self {
        Self {
            device: None,
            buffers: None,
            nodes: Vec::new(),
            primitives: Vec::new(),
            flags: ImportFlags::default(),
        }
    }

    /// Flatten `scene` and publish its geometry to `device`.
    ///
    /// Any previous result is released first. On error the import is left
    /// empty and no buffer created for it stays alive on the device.
    pub fn import(
        &mut self,
        device: &Arc<D>,
        scene: &SceneDescription,
        flags: ImportFlags,
    ) -> Result<(), ImportError> {
        crate::profile_function!();
        self.free_resources();

        let flattened = flatten_scene(scene, flags)?;
        let buffers = publisher::publish(device.as_ref(), &flattened)?;

        log::debug!(
            "Imported scene: {} nodes, {} primitives, {} vertices (stride {} floats), {} indices",
            flattened.nodes.len(),
            flattened.primitives.len(),
            flattened.vertex_count(),
            flattened.vertex_stride(),
            flattened.indices.len()
        );

        self.device = Some(Arc::clone(device));
        self.buffers = Some(buffers);
        self.nodes = flattened.nodes;
        self.primitives = flattened.primitives;
        self.flags = flags;
        Ok(())
    }

    /// Release the device buffers and clear all arrays.
    ///
    /// Calling this on an empty import does nothing.
    pub fn free_resources(&mut self) {
        if let (Some(device), Some(buffers)) = (self.device.take(), self.buffers.take()) {
            log::debug!(
                "Releasing imported scene: {} nodes, {} primitives",
                self.nodes.len(),
                self.primitives.len()
            );
            publisher::release(device.as_ref(), buffers);
        }
        self.nodes = Vec::new();
        self.primitives = Vec::new();
    }

    /// Flattened nodes. Node 0 is the synthetic root.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_primitives(&self) -> usize {
        self.primitives.len()
    }

    /// Device buffer with the packed vertices, if a scene is imported.
    pub fn vertex_buffer(&self) -> Option<&D::Buffer> {
        self.buffers.as_ref().map(|b| &b.vertex_buffer)
    }

    /// Device buffer with the packed 32-bit indices, if a scene is imported.
    pub fn index_buffer(&self) -> Option<&D::Buffer> {
        self.buffers.as_ref().map(|b| &b.index_buffer)
    }

    /// Flags of the last import.
    pub fn flags(&self) -> ImportFlags {
        self.flags
    }

    /// Floats per vertex in the vertex buffer.
    pub fn vertex_stride(&self) -> usize {
        self.flags.vertex_stride()
    }

    /// Whether a scene is currently held.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_none()
    }
}

impl<D: BufferDevice> Default for SceneImport<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: BufferDevice> Drop for SceneImport<D> {
    fn drop(&mut self) {
        self.free_resources();
    }
}

impl<D: BufferDevice> std::fmt::Debug for SceneImport<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneImport")
            .field("buffers", &self.buffers)
            .field("num_nodes", &self.nodes.len())
            .field("num_primitives", &self.primitives.len())
            .field("flags", &self.flags)
            .finish()
    }
}

static_assertions::assert_impl_all!(SceneImport<crate::device::DummyDevice>: Send, Sync);
