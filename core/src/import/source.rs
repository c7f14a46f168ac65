//! Scene description consumed by the importer.
//!
//! A flat, index-based mirror of a glTF document: scenes reference nodes,
//! nodes reference meshes, primitives reference accessors, accessors
//! reference buffer views, and views reference raw byte buffers. All
//! references are plain indices into the tables of [`SceneDescription`].
//!
//! Descriptions are usually produced by the glTF adapter (`gltf` feature) but
//! can be assembled by hand with the `push_*` builders.

use std::collections::BTreeMap;

use super::error::ImportError;

/// Raw GL component type codes used by glTF accessors.
pub mod component_type {
    pub const BYTE: u32 = 5120;
    pub const UNSIGNED_BYTE: u32 = 5121;
    pub const SHORT: u32 = 5122;
    pub const UNSIGNED_SHORT: u32 = 5123;
    pub const INT: u32 = 5124;
    pub const UNSIGNED_INT: u32 = 5125;
    pub const FLOAT: u32 = 5126;
    pub const DOUBLE: u32 = 5130;
}

/// Numeric encoding of one accessor component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl ComponentType {
    /// Decode a raw GL component type code.
    pub fn from_gl(code: u32) -> Option<Self> {
        match code {
            component_type::BYTE => Some(Self::I8),
            component_type::UNSIGNED_BYTE => Some(Self::U8),
            component_type::SHORT => Some(Self::I16),
            component_type::UNSIGNED_SHORT => Some(Self::U16),
            component_type::INT => Some(Self::I32),
            component_type::UNSIGNED_INT => Some(Self::U32),
            component_type::FLOAT => Some(Self::F32),
            component_type::DOUBLE => Some(Self::F64),
            _ => None,
        }
    }

    /// Raw GL component type code.
    pub fn to_gl(self) -> u32 {
        match self {
            Self::I8 => component_type::BYTE,
            Self::U8 => component_type::UNSIGNED_BYTE,
            Self::I16 => component_type::SHORT,
            Self::U16 => component_type::UNSIGNED_SHORT,
            Self::I32 => component_type::INT,
            Self::U32 => component_type::UNSIGNED_INT,
            Self::F32 => component_type::FLOAT,
            Self::F64 => component_type::DOUBLE,
        }
    }

    /// Size of one component in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }
}

/// Shape of one accessor element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorType {
    /// Number of components per element.
    pub fn multiplicity(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

/// A scene: the root nodes of one hierarchy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneDesc {
    /// Indices into [`SceneDescription::nodes`].
    pub nodes: Vec<usize>,
}

/// A node of the hierarchy.
///
/// When `matrix` is present it wins over `scale`/`rotation`/`translation`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDesc {
    /// Child node indices.
    pub children: Vec<usize>,
    /// Index into [`SceneDescription::meshes`].
    pub mesh: Option<usize>,
    /// Local transform as 16 column-major floats.
    pub matrix: Option<[f32; 16]>,
    /// Scale [x, y, z].
    pub scale: Option<[f32; 3]>,
    /// Rotation quaternion [x, y, z, w].
    pub rotation: Option<[f32; 4]>,
    /// Translation [x, y, z].
    pub translation: Option<[f32; 3]>,
}

impl NodeDesc {
    #[must_use]
    pub fn with_children(mut self, children: Vec<usize>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn with_mesh(mut self, mesh: usize) -> Self {
        self.mesh = Some(mesh);
        self
    }

    #[must_use]
    pub fn with_matrix(mut self, matrix: [f32; 16]) -> Self {
        self.matrix = Some(matrix);
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = Some(scale);
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = Some(rotation);
        self
    }

    #[must_use]
    pub fn with_translation(mut self, translation: [f32; 3]) -> Self {
        self.translation = Some(translation);
        self
    }
}

/// A mesh: a list of primitives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshDesc {
    pub primitives: Vec<PrimitiveDesc>,
}

/// One drawable primitive of a mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimitiveDesc {
    /// Index accessor. Primitives without one are not imported.
    pub indices: Option<usize>,
    /// Attribute semantic name (`POSITION`, `NORMAL`, ...) to accessor index.
    pub attributes: BTreeMap<String, usize>,
}

impl PrimitiveDesc {
    #[must_use]
    pub fn with_indices(mut self, accessor: usize) -> Self {
        self.indices = Some(accessor);
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, semantic: impl Into<String>, accessor: usize) -> Self {
        self.attributes.insert(semantic.into(), accessor);
        self
    }
}

/// A typed view over a region of a buffer view.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessorDesc {
    /// Index into [`SceneDescription::buffer_views`]. `None` for accessors
    /// without data (sparse-only), which cannot be imported.
    pub buffer_view: Option<usize>,
    /// Offset relative to the start of the view.
    pub byte_offset: usize,
    /// Raw GL component type code, see [`component_type`].
    pub component_type: u32,
    pub accessor_type: AccessorType,
    /// Number of elements.
    pub count: usize,
    /// Whether integer components map to [0, 1] / [-1, 1].
    pub normalized: bool,
}

impl AccessorDesc {
    /// Tightly packed accessor at the start of `buffer_view`.
    pub fn new(
        buffer_view: usize,
        component_type: ComponentType,
        accessor_type: AccessorType,
        count: usize,
    ) -> Self {
        Self {
            buffer_view: Some(buffer_view),
            byte_offset: 0,
            component_type: component_type.to_gl(),
            accessor_type,
            count,
            normalized: false,
        }
    }

    #[must_use]
    pub fn with_byte_offset(mut self, byte_offset: usize) -> Self {
        self.byte_offset = byte_offset;
        self
    }

    #[must_use]
    pub fn with_normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    /// Override the component type with a raw GL code.
    #[must_use]
    pub fn with_raw_component_type(mut self, code: u32) -> Self {
        self.component_type = code;
        self
    }

    /// Size in bytes of one element, if the component type is known.
    pub fn element_size(&self) -> Option<usize> {
        ComponentType::from_gl(self.component_type)
            .map(|ct| ct.size() * self.accessor_type.multiplicity())
    }

    /// Distance in bytes between consecutive elements.
    ///
    /// The view's explicit stride when set, otherwise the packed element size.
    pub fn byte_stride(&self, view: &BufferViewDesc) -> Option<usize> {
        view.byte_stride.or_else(|| self.element_size())
    }
}

/// A contiguous slice of a buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferViewDesc {
    /// Index into [`SceneDescription::buffers`].
    pub buffer: usize,
    pub byte_offset: usize,
    pub byte_length: usize,
    /// Interleaving stride, `None` for tightly packed data.
    pub byte_stride: Option<usize>,
}

impl BufferViewDesc {
    pub fn new(buffer: usize, byte_offset: usize, byte_length: usize) -> Self {
        Self {
            buffer,
            byte_offset,
            byte_length,
            byte_stride: None,
        }
    }

    #[must_use]
    pub fn with_byte_stride(mut self, byte_stride: usize) -> Self {
        self.byte_stride = Some(byte_stride);
        self
    }
}

/// Read-only scene description: the importer's input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneDescription {
    pub scenes: Vec<SceneDesc>,
    /// Declared default scene. Scene 0 is used when absent.
    pub default_scene: Option<usize>,
    pub nodes: Vec<NodeDesc>,
    pub meshes: Vec<MeshDesc>,
    pub accessors: Vec<AccessorDesc>,
    pub buffer_views: Vec<BufferViewDesc>,
    pub buffers: Vec<Vec<u8>>,
}

impl SceneDescription {
    /// Create an empty description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw buffer, returning its index.
    pub fn push_buffer(&mut self, data: Vec<u8>) -> usize {
        self.buffers.push(data);
        self.buffers.len() - 1
    }

    /// Append a buffer view, returning its index.
    pub fn push_buffer_view(&mut self, view: BufferViewDesc) -> usize {
        self.buffer_views.push(view);
        self.buffer_views.len() - 1
    }

    /// Append an accessor, returning its index.
    pub fn push_accessor(&mut self, accessor: AccessorDesc) -> usize {
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }

    /// Store `data` in its own buffer and view and describe it with a
    /// tightly packed accessor. Returns the accessor index.
    pub fn push_packed(
        &mut self,
        data: Vec<u8>,
        component_type: ComponentType,
        accessor_type: AccessorType,
        count: usize,
    ) -> usize {
        let len = data.len();
        let buffer = self.push_buffer(data);
        let view = self.push_buffer_view(BufferViewDesc::new(buffer, 0, len));
        self.push_accessor(AccessorDesc::new(view, component_type, accessor_type, count))
    }

    /// Append a mesh, returning its index.
    pub fn push_mesh(&mut self, mesh: MeshDesc) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    /// Append a node, returning its index.
    pub fn push_node(&mut self, node: NodeDesc) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Append a scene, returning its index.
    pub fn push_scene(&mut self, roots: Vec<usize>) -> usize {
        self.scenes.push(SceneDesc { nodes: roots });
        self.scenes.len() - 1
    }

    /// Index of the scene the importer walks.
    pub fn active_scene(&self) -> usize {
        self.default_scene.unwrap_or(0)
    }

    pub fn node(&self, index: usize) -> Result<&NodeDesc, ImportError> {
        lookup(&self.nodes, "node", index)
    }

    pub fn mesh(&self, index: usize) -> Result<&MeshDesc, ImportError> {
        lookup(&self.meshes, "mesh", index)
    }

    pub fn accessor(&self, index: usize) -> Result<&AccessorDesc, ImportError> {
        lookup(&self.accessors, "accessor", index)
    }

    pub fn buffer_view(&self, index: usize) -> Result<&BufferViewDesc, ImportError> {
        lookup(&self.buffer_views, "buffer view", index)
    }

    /// Bytes of `accessor`'s view starting at the accessor's own offset,
    /// together with the view's byte stride (if any).
    ///
    /// The returned slice ends at the end of the view, so every read through
    /// it stays inside the view.
    pub fn accessor_bytes(&self, accessor: usize) -> Result<AccessorBytes<'_>, ImportError> {
        let desc = self.accessor(accessor)?;
        let view_index = desc.buffer_view.ok_or_else(|| {
            ImportError::Buffer(format!(
                "accessor {accessor} has no buffer view (sparse accessors not supported)"
            ))
        })?;
        let view = self.buffer_view(view_index)?;
        let buffer = lookup(&self.buffers, "buffer", view.buffer)?;

        let view_end = view.byte_offset + view.byte_length;
        if view_end > buffer.len() {
            return Err(ImportError::Buffer(format!(
                "buffer view {view_index} ends at byte {view_end} but buffer {} holds {}",
                view.buffer,
                buffer.len()
            )));
        }
        let view_bytes = &buffer[view.byte_offset..view_end];
        if desc.byte_offset > view_bytes.len() {
            return Err(ImportError::AccessorOutOfBounds {
                accessor,
                end: desc.byte_offset,
                available: view_bytes.len(),
            });
        }

        Ok(AccessorBytes {
            accessor,
            desc,
            view,
            bytes: &view_bytes[desc.byte_offset..],
        })
    }
}

/// Resolved byte range of an accessor.
#[derive(Debug, Clone, Copy)]
pub struct AccessorBytes<'a> {
    /// Accessor index, kept for error reporting.
    pub accessor: usize,
    pub desc: &'a AccessorDesc,
    pub view: &'a BufferViewDesc,
    /// View bytes from the accessor's offset to the end of the view.
    pub bytes: &'a [u8],
}

impl AccessorBytes<'_> {
    /// Check that an element of `element_size` bytes at position `last`
    /// (with elements `stride` bytes apart) lies inside the view.
    pub fn check_span(
        &self,
        last: usize,
        stride: usize,
        element_size: usize,
    ) -> Result<(), ImportError> {
        let end = last * stride + element_size;
        if end > self.bytes.len() {
            return Err(ImportError::AccessorOutOfBounds {
                accessor: self.accessor,
                end,
                available: self.bytes.len(),
            });
        }
        Ok(())
    }
}

fn lookup<'a, T>(table: &'a [T], kind: &'static str, index: usize) -> Result<&'a T, ImportError> {
    table
        .get(index)
        .ok_or(ImportError::InvalidReference { kind, index })
}

static_assertions::assert_impl_all!(SceneDescription: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_type_roundtrip() {
        for ct in [
            ComponentType::I8,
            ComponentType::U8,
            ComponentType::I16,
            ComponentType::U16,
            ComponentType::I32,
            ComponentType::U32,
            ComponentType::F32,
            ComponentType::F64,
        ] {
            assert_eq!(ComponentType::from_gl(ct.to_gl()), Some(ct));
        }
        assert_eq!(ComponentType::from_gl(0), None);
    }

    #[test]
    fn test_stride_defaults_to_element_size() {
        let accessor = AccessorDesc::new(0, ComponentType::F32, AccessorType::Vec3, 4);
        let packed = BufferViewDesc::new(0, 0, 48);
        assert_eq!(accessor.byte_stride(&packed), Some(12));

        let interleaved = BufferViewDesc::new(0, 0, 128).with_byte_stride(32);
        assert_eq!(accessor.byte_stride(&interleaved), Some(32));
    }

    #[test]
    fn test_accessor_bytes_applies_offsets() {
        let mut scene = SceneDescription::new();
        let buffer = scene.push_buffer((0u8..16).collect());
        let view = scene.push_buffer_view(BufferViewDesc::new(buffer, 4, 8));
        let accessor = scene.push_accessor(
            AccessorDesc::new(view, ComponentType::U8, AccessorType::Scalar, 4).with_byte_offset(2),
        );

        let bytes = scene.accessor_bytes(accessor).unwrap();
        assert_eq!(bytes.bytes, &[6, 7, 8, 9, 10, 11]);
        assert!(bytes.check_span(5, 1, 1).is_ok());
        assert!(matches!(
            bytes.check_span(6, 1, 1),
            Err(ImportError::AccessorOutOfBounds { end: 7, .. })
        ));
    }

    #[test]
    fn test_view_past_buffer_end_is_rejected() {
        let mut scene = SceneDescription::new();
        let buffer = scene.push_buffer(vec![0; 4]);
        let view = scene.push_buffer_view(BufferViewDesc::new(buffer, 2, 8));
        let accessor =
            scene.push_accessor(AccessorDesc::new(view, ComponentType::U8, AccessorType::Scalar, 1));
        assert!(matches!(
            scene.accessor_bytes(accessor),
            Err(ImportError::Buffer(_))
        ));
    }

    #[test]
    fn test_accessor_without_view_is_rejected() {
        let mut scene = SceneDescription::new();
        let mut accessor = AccessorDesc::new(0, ComponentType::F32, AccessorType::Vec3, 1);
        accessor.buffer_view = None;
        let accessor = scene.push_accessor(accessor);
        assert!(matches!(
            scene.accessor_bytes(accessor),
            Err(ImportError::Buffer(_))
        ));
    }

    #[test]
    fn test_dangling_reference() {
        let scene = SceneDescription::new();
        assert!(matches!(
            scene.accessor(3),
            Err(ImportError::InvalidReference {
                kind: "accessor",
                index: 3
            })
        ));
    }

    #[test]
    fn test_active_scene_defaults_to_zero() {
        let mut scene = SceneDescription::new();
        assert_eq!(scene.active_scene(), 0);
        scene.default_scene = Some(2);
        assert_eq!(scene.active_scene(), 2);
    }
}
