//! Second pass: flatten the hierarchy and pack geometry.
//!
//! Output buffers are allocated once from a [`SizePlan`] and filled in
//! traversal order. Every primitive gets its own compacted vertex block
//! covering `[min_index, max_index]` of its index stream, and its indices are
//! rebased onto that block.

use crate::math::{
    Mat4, Quat, Vec3, mat4_from_cols_array, mat4_from_scale_rotation_translation, quat_from_array,
};

use super::decoder::AttributeDecoder;
use super::error::ImportError;
use super::flags::{ImportFlags, VertexAttributeKind};
use super::index::{IndexSpan, read_indices};
use super::planner::SizePlan;
use super::source::{NodeDesc, PrimitiveDesc, SceneDescription};
use super::walker::{NodeVisitor, walk_scene};

/// A node of the flattened hierarchy.
///
/// Node 0 is a synthetic identity root. Every other node's parent has a
/// smaller index than the node itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    /// Transform relative to the parent.
    pub transform: Mat4,
    /// Model to world transform: `parent.model * transform`.
    pub model: Mat4,
    /// Index of the parent node. The root is its own parent.
    pub parent: u32,
}

impl Node {
    /// The synthetic root node.
    pub fn root() -> Self {
        Self {
            transform: Mat4::identity(),
            model: Mat4::identity(),
            parent: 0,
        }
    }
}

/// A draw range in the shared index buffer.
///
/// Indices in `[index_offset, index_offset + index_count)` are already
/// rebased onto the shared vertex buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Primitive {
    /// Owning node index.
    pub node: u32,
    /// Sequential number of the meshed node this primitive came from.
    pub mesh: u32,
    pub index_offset: u32,
    pub index_count: u32,
}

/// Result of flattening a scene, before anything is handed to a device.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedScene {
    pub nodes: Vec<Node>,
    pub primitives: Vec<Primitive>,
    /// Interleaved vertex floats, `flags.vertex_stride()` per vertex.
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    /// Flags the vertex layout was built with.
    pub flags: ImportFlags,
}

impl FlattenedScene {
    /// Floats per vertex.
    pub fn vertex_stride(&self) -> usize {
        self.flags.vertex_stride()
    }

    /// Number of packed vertices.
    pub fn vertex_count(&self) -> usize {
        match self.vertex_stride() {
            0 => 0,
            stride => self.vertices.len() / stride,
        }
    }

    /// Vertex buffer contents as bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer contents as bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Compute a node's local transform.
///
/// An explicit matrix wins. Otherwise scale, rotation and translation are
/// composed, each defaulting to identity.
pub fn local_transform(node: &NodeDesc) -> Mat4 {
    if let Some(matrix) = &node.matrix {
        return mat4_from_cols_array(matrix);
    }
    let scale = node.scale.map(Vec3::from).unwrap_or_else(|| Vec3::new(1.0, 1.0, 1.0));
    let rotation = node.rotation.map(quat_from_array).unwrap_or_else(Quat::identity);
    let translation = node.translation.map(Vec3::from).unwrap_or_else(Vec3::zeros);
    mat4_from_scale_rotation_translation(scale, rotation, translation)
}

/// Run both passes over the active scene.
pub fn flatten_scene(
    scene: &SceneDescription,
    flags: ImportFlags,
) -> Result<FlattenedScene, ImportError> {
    crate::profile_function!();

    let plan = SizePlan::measure(scene)?;
    log::debug!(
        "Planned import: {} nodes, {} primitives, {} vertices, {} indices",
        plan.nodes,
        plan.primitives,
        plan.vertices,
        plan.indices
    );
    crate::profile_plot!("import vertices", plan.vertices);
    crate::profile_plot!("import indices", plan.indices);

    let mut ctx = ImportContext::new(&plan, flags, scene.nodes.len());
    {
        crate::profile_scope!("import_pass");
        walk_scene(scene, &mut ctx)?;
    }

    debug_assert_eq!(ctx.nodes.len(), plan.nodes);
    debug_assert_eq!(ctx.primitives.len(), plan.primitives);
    debug_assert_eq!(ctx.current_vertex, plan.vertices);
    debug_assert_eq!(ctx.current_index, plan.indices);

    Ok(FlattenedScene {
        nodes: ctx.nodes,
        primitives: ctx.primitives,
        vertices: ctx.vertices,
        indices: ctx.indices,
        flags,
    })
}

/// Traversal state of the import pass.
struct ImportContext {
    flags: ImportFlags,
    stride: usize,
    nodes: Vec<Node>,
    primitives: Vec<Primitive>,
    vertices: Vec<f32>,
    indices: Vec<u32>,
    /// Source node index to output node index.
    node_map: Vec<u32>,
    current_mesh: u32,
    current_vertex: usize,
    current_index: usize,
}

impl ImportContext {
    fn new(plan: &SizePlan, flags: ImportFlags, source_nodes: usize) -> Self {
        let stride = flags.vertex_stride();
        let mut nodes = Vec::with_capacity(plan.nodes);
        nodes.push(Node::root());
        Self {
            flags,
            stride,
            nodes,
            primitives: Vec::with_capacity(plan.primitives),
            vertices: vec![0.0; plan.vertices * stride],
            indices: vec![0; plan.indices],
            node_map: vec![0; source_nodes],
            current_mesh: 0,
            current_vertex: 0,
            current_index: 0,
        }
    }

    fn import_primitive(
        &mut self,
        scene: &SceneDescription,
        primitive: &PrimitiveDesc,
        indices: usize,
        node: u32,
    ) -> Result<(), ImportError> {
        let stream = read_indices(scene, indices)?;
        let index_offset = self.current_index;
        let index_end = index_offset + stream.len();

        let mut span = IndexSpan::default();
        for (slot, index) in self.indices[index_offset..index_end].iter_mut().zip(stream) {
            *slot = index;
            span.include(index);
        }

        let mut decoders = Vec::new();
        for (semantic, &accessor) in &primitive.attributes {
            let Some(kind) = VertexAttributeKind::from_semantic(semantic) else {
                continue;
            };
            let Some(offset) = kind.offset(self.flags) else {
                continue;
            };
            decoders.push((offset, AttributeDecoder::new(scene, accessor, kind)?));
        }

        let vertex_count = span.vertex_count() as usize;
        if vertex_count > 0 {
            for (_, decoder) in &decoders {
                decoder.check_range(span.max)?;
            }
            for (row, vertex) in (span.min..=span.max).enumerate() {
                let row = (self.current_vertex + row) * self.stride;
                for (offset, decoder) in &decoders {
                    let start = row + offset;
                    decoder.decode(
                        vertex,
                        &mut self.vertices[start..start + decoder.components()],
                    );
                }
            }

            // The block's last slot must be addressable, not just its first.
            let last = to_u32("vertices", self.current_vertex + vertex_count - 1)?;
            let base = last - (span.max - span.min);
            for index in &mut self.indices[index_offset..index_end] {
                *index = *index - span.min + base;
            }
        }

        log::trace!(
            "Primitive {}: node {node}, {} indices, vertices {}..={} -> block at {}",
            self.primitives.len(),
            span.count,
            span.min,
            span.max,
            self.current_vertex
        );

        self.primitives.push(Primitive {
            node,
            mesh: self.current_mesh,
            index_offset: to_u32("indices", index_offset)?,
            index_count: span.count,
        });
        self.current_index = index_end;
        self.current_vertex += vertex_count;
        Ok(())
    }
}

/// Narrow an output position to the `u32` the index buffer stores.
fn to_u32(what: &'static str, value: usize) -> Result<u32, ImportError> {
    u32::try_from(value).map_err(|_| ImportError::LimitExceeded {
        what,
        required: value as u64,
    })
}

impl NodeVisitor for ImportContext {
    fn visit(
        &mut self,
        scene: &SceneDescription,
        node: usize,
        parent: Option<usize>,
    ) -> Result<(), ImportError> {
        let desc = scene.node(node)?;
        let output = self.nodes.len() as u32;

        let parent = parent.map_or(0, |p| self.node_map[p]);
        let transform = local_transform(desc);
        let model = self.nodes[parent as usize].model * transform;
        self.node_map[node] = output;
        self.nodes.push(Node {
            transform,
            model,
            parent,
        });

        if let Some(mesh) = desc.mesh {
            for primitive in &scene.mesh(mesh)?.primitives {
                let Some(indices) = primitive.indices else {
                    continue;
                };
                self.import_primitive(scene, primitive, indices, output)?;
            }
            self.current_mesh += 1;
        }
        Ok(())
    }
}
