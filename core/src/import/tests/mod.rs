//! Scenario tests over whole scene descriptions.

use super::{
    AccessorType, ComponentType, FlattenedScene, MeshDesc, NodeDesc, PrimitiveDesc,
    SceneDescription,
};


fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Store packed f32 data, returning the accessor index.
fn f32_accessor(scene: &mut SceneDescription, values: &[f32], ty: AccessorType) -> usize {
    let count = values.len() / ty.multiplicity();
    scene.push_packed(
        bytemuck::cast_slice(values).to_vec(),
        ComponentType::F32,
        ty,
        count,
    )
}

fn u16_indices(scene: &mut SceneDescription, indices: &[u16]) -> usize {
    scene.push_packed(
        bytemuck::cast_slice(indices).to_vec(),
        ComponentType::U16,
        AccessorType::Scalar,
        indices.len(),
    )
}

fn u8_indices(scene: &mut SceneDescription, indices: &[u8]) -> usize {
    scene.push_packed(
        indices.to_vec(),
        ComponentType::U8,
        AccessorType::Scalar,
        indices.len(),
    )
}

/// Positions whose x coordinate equals the vertex number.
fn numbered_positions(scene: &mut SceneDescription, count: usize) -> usize {
    let values: Vec<f32> = (0..count)
        .flat_map(|i| [i as f32, 0.0, 0.0])
        .collect();
    f32_accessor(scene, &values, AccessorType::Vec3)
}

/// Push a node carrying a new mesh made of `primitives`.
fn mesh_node(scene: &mut SceneDescription, primitives: Vec<PrimitiveDesc>) -> usize {
    let mesh = scene.push_mesh(MeshDesc { primitives });
    scene.push_node(NodeDesc::default().with_mesh(mesh))
}

const TRIANGLE_POSITIONS: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

/// One root node, one mesh, one primitive: positions, normals and u16
/// indices `[0, 1, 2]`.
fn triangle_scene() -> SceneDescription {
    let mut scene = SceneDescription::new();
    let positions = f32_accessor(&mut scene, &TRIANGLE_POSITIONS, AccessorType::Vec3);
    let normals = f32_accessor(
        &mut scene,
        &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        AccessorType::Vec3,
    );
    let indices = u16_indices(&mut scene, &[0, 1, 2]);
    let node = mesh_node(
        &mut scene,
        vec![
            PrimitiveDesc::default()
                .with_indices(indices)
                .with_attribute("POSITION", positions)
                .with_attribute("NORMAL", normals),
        ],
    );
    scene.push_scene(vec![node]);
    scene
}

/// Floats of vertex `vertex`.
fn row(flattened: &FlattenedScene, vertex: usize) -> &[f32] {
    let stride = flattened.vertex_stride();
    &flattened.vertices[vertex * stride..(vertex + 1) * stride]
}
