use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use redlilium_import::device::DummyDevice;
use redlilium_import::import::{
    AccessorType, ComponentType, ImportFlags, MeshDesc, NodeDesc, PrimitiveDesc,
    SceneDescription, SceneImport, SizePlan, flatten_scene,
};

/// A `cells` x `cells` grid mesh instanced on `instances` child nodes of one
/// root. Texcoords are normalized u16 to exercise integer decoding.
fn grid_scene(cells: u32, instances: usize) -> SceneDescription {
    let side = cells + 1;
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut texcoords = Vec::new();
    for y in 0..side {
        for x in 0..side {
            positions.extend_from_slice(&[x as f32, 0.0, y as f32]);
            normals.extend_from_slice(&[0.0f32, 1.0, 0.0]);
            let u = (x * u16::MAX as u32 / cells) as u16;
            let v = (y * u16::MAX as u32 / cells) as u16;
            texcoords.extend_from_slice(&[u, v]);
        }
    }
    let mut indices = Vec::new();
    for y in 0..cells {
        for x in 0..cells {
            let i = y * side + x;
            indices.extend_from_slice(&[i, i + side, i + 1, i + 1, i + side, i + side + 1]);
        }
    }

    let vertex_count = (side * side) as usize;
    let mut scene = SceneDescription::new();
    let positions = scene.push_packed(
        bytemuck::cast_slice(&positions).to_vec(),
        ComponentType::F32,
        AccessorType::Vec3,
        vertex_count,
    );
    let normals = scene.push_packed(
        bytemuck::cast_slice(&normals).to_vec(),
        ComponentType::F32,
        AccessorType::Vec3,
        vertex_count,
    );
    let texcoords = scene.push_packed(
        bytemuck::cast_slice(&texcoords).to_vec(),
        ComponentType::U16,
        AccessorType::Vec2,
        vertex_count,
    );
    scene.accessors[texcoords].normalized = true;
    let index_count = indices.len();
    let indices = scene.push_packed(
        bytemuck::cast_slice(&indices).to_vec(),
        ComponentType::U32,
        AccessorType::Scalar,
        index_count,
    );

    let mesh = scene.push_mesh(MeshDesc {
        primitives: vec![
            PrimitiveDesc::default()
                .with_indices(indices)
                .with_attribute("POSITION", positions)
                .with_attribute("NORMAL", normals)
                .with_attribute("TEXCOORD_0", texcoords),
        ],
    });
    let children = (0..instances)
        .map(|i| {
            scene.push_node(
                NodeDesc::default()
                    .with_mesh(mesh)
                    .with_translation([i as f32 * cells as f32, 0.0, 0.0]),
            )
        })
        .collect();
    let root = scene.push_node(NodeDesc::default().with_children(children));
    scene.push_scene(vec![root]);
    scene
}

// ---------------------------------------------------------------------------
// Size planning
// ---------------------------------------------------------------------------

fn bench_plan_grid(c: &mut Criterion) {
    let scene = grid_scene(64, 16);
    c.bench_function("size_plan_grid_64x16", |b| {
        b.iter(|| SizePlan::measure(black_box(&scene)));
    });
}

// ---------------------------------------------------------------------------
// Flattening
// ---------------------------------------------------------------------------

fn bench_flatten_all_attributes(c: &mut Criterion) {
    let scene = grid_scene(64, 16);
    c.bench_function("flatten_grid_64x16_all", |b| {
        b.iter(|| flatten_scene(black_box(&scene), ImportFlags::ALL));
    });
}

fn bench_flatten_positions(c: &mut Criterion) {
    let scene = grid_scene(64, 16);
    c.bench_function("flatten_grid_64x16_position", |b| {
        b.iter(|| flatten_scene(black_box(&scene), ImportFlags::POSITION));
    });
}

fn bench_flatten_many_nodes(c: &mut Criterion) {
    let scene = grid_scene(2, 1024);
    c.bench_function("flatten_grid_2x1024_all", |b| {
        b.iter(|| flatten_scene(black_box(&scene), ImportFlags::ALL));
    });
}

// ---------------------------------------------------------------------------
// Full import into a device
// ---------------------------------------------------------------------------

fn bench_import_dummy_device(c: &mut Criterion) {
    let scene = grid_scene(64, 4);
    c.bench_function("import_grid_64x4_dummy_device", |b| {
        b.iter(|| {
            let device = Arc::new(DummyDevice::new());
            let mut import = SceneImport::<DummyDevice>::new();
            import
                .import(&device, black_box(&scene), ImportFlags::ALL)
                .map(|()| import.num_primitives())
        });
    });
}

criterion_group!(
    benches,
    bench_plan_grid,
    bench_flatten_all_attributes,
    bench_flatten_positions,
    bench_flatten_many_nodes,
    bench_import_dummy_device,
);
criterion_main!(benches);
