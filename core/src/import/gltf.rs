//! Build a [`SceneDescription`] from a glTF 2.0 document.
//!
//! Accepts binary glTF (`.glb`) and JSON glTF with embedded `data:` buffers.
//! External buffer files are not resolved.

use super::error::ImportError;
use super::source::{
    AccessorDesc, AccessorType, BufferViewDesc, ComponentType, MeshDesc, NodeDesc, PrimitiveDesc,
    SceneDesc, SceneDescription,
};

impl SceneDescription {
    /// Parse `.glb` or `.gltf` bytes and resolve their buffers.
    pub fn from_gltf_slice(data: &[u8]) -> Result<Self, ImportError> {
        crate::profile_function!();

        let gltf = gltf_dep::Gltf::from_slice(data)?;
        let buffers = gltf_dep::import_buffers(&gltf.document, None, gltf.blob.clone())?
            .into_iter()
            .map(|data| data.0)
            .collect();

        let scene = Self::from_gltf_document(&gltf.document, buffers);
        log::debug!(
            "Parsed glTF: {} scenes, {} nodes, {} meshes, {} accessors",
            scene.scenes.len(),
            scene.nodes.len(),
            scene.meshes.len(),
            scene.accessors.len()
        );
        Ok(scene)
    }

    /// Mirror an already parsed document. `buffers` holds one byte vector per
    /// glTF buffer, in document order.
    pub fn from_gltf_document(document: &gltf_dep::Document, buffers: Vec<Vec<u8>>) -> Self {
        Self {
            scenes: document
                .scenes()
                .map(|scene| SceneDesc {
                    nodes: scene.nodes().map(|n| n.index()).collect(),
                })
                .collect(),
            default_scene: document.default_scene().map(|s| s.index()),
            nodes: document.nodes().map(|n| convert_node(&n)).collect(),
            meshes: document
                .meshes()
                .map(|mesh| MeshDesc {
                    primitives: mesh.primitives().map(|p| convert_primitive(&p)).collect(),
                })
                .collect(),
            accessors: document.accessors().map(|a| convert_accessor(&a)).collect(),
            buffer_views: document
                .views()
                .map(|view| BufferViewDesc {
                    buffer: view.buffer().index(),
                    byte_offset: view.offset(),
                    byte_length: view.length(),
                    byte_stride: view.stride(),
                })
                .collect(),
            buffers,
        }
    }
}

fn convert_node(node: &gltf_dep::Node<'_>) -> NodeDesc {
    let desc = NodeDesc {
        children: node.children().map(|c| c.index()).collect(),
        mesh: node.mesh().map(|m| m.index()),
        ..NodeDesc::default()
    };
    match node.transform() {
        gltf_dep::scene::Transform::Matrix { matrix } => {
            desc.with_matrix(bytemuck::cast::<[[f32; 4]; 4], [f32; 16]>(matrix))
        }
        gltf_dep::scene::Transform::Decomposed {
            translation,
            rotation,
            scale,
        } => desc
            .with_translation(translation)
            .with_rotation(rotation)
            .with_scale(scale),
    }
}

fn convert_primitive(primitive: &gltf_dep::Primitive<'_>) -> PrimitiveDesc {
    PrimitiveDesc {
        indices: primitive.indices().map(|a| a.index()),
        attributes: primitive
            .attributes()
            .map(|(semantic, accessor)| (semantic_name(&semantic), accessor.index()))
            .collect(),
    }
}

fn convert_accessor(accessor: &gltf_dep::Accessor<'_>) -> AccessorDesc {
    let component_type = match accessor.data_type() {
        gltf_dep::accessor::DataType::I8 => ComponentType::I8,
        gltf_dep::accessor::DataType::U8 => ComponentType::U8,
        gltf_dep::accessor::DataType::I16 => ComponentType::I16,
        gltf_dep::accessor::DataType::U16 => ComponentType::U16,
        gltf_dep::accessor::DataType::U32 => ComponentType::U32,
        gltf_dep::accessor::DataType::F32 => ComponentType::F32,
    };
    let accessor_type = match accessor.dimensions() {
        gltf_dep::accessor::Dimensions::Scalar => AccessorType::Scalar,
        gltf_dep::accessor::Dimensions::Vec2 => AccessorType::Vec2,
        gltf_dep::accessor::Dimensions::Vec3 => AccessorType::Vec3,
        gltf_dep::accessor::Dimensions::Vec4 => AccessorType::Vec4,
        gltf_dep::accessor::Dimensions::Mat2 => AccessorType::Mat2,
        gltf_dep::accessor::Dimensions::Mat3 => AccessorType::Mat3,
        gltf_dep::accessor::Dimensions::Mat4 => AccessorType::Mat4,
    };

    AccessorDesc {
        buffer_view: accessor.view().map(|v| v.index()),
        byte_offset: accessor.offset(),
        component_type: component_type.to_gl(),
        accessor_type,
        count: accessor.count(),
        normalized: accessor.normalized(),
    }
}

/// glTF attribute name for a semantic, e.g. `TEXCOORD_0`.
fn semantic_name(semantic: &gltf_dep::Semantic) -> String {
    use gltf_dep::Semantic;
    match semantic {
        Semantic::Positions => "POSITION".to_string(),
        Semantic::Normals => "NORMAL".to_string(),
        Semantic::Tangents => "TANGENT".to_string(),
        Semantic::Colors(set) => format!("COLOR_{set}"),
        Semantic::TexCoords(set) => format!("TEXCOORD_{set}"),
        Semantic::Joints(set) => format!("JOINTS_{set}"),
        Semantic::Weights(set) => format!("WEIGHTS_{set}"),
        #[allow(unreachable_patterns)]
        other => format!("{other:?}"),
    }
}
