//! First pass: count everything the import pass will write.

use super::error::ImportError;
use super::index::{IndexSpan, read_indices};
use super::source::SceneDescription;
use super::walker::{NodeVisitor, walk_scene};

/// Exact output sizes of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizePlan {
    /// Output nodes, including the synthetic root.
    pub nodes: usize,
    /// Primitives with an index accessor.
    pub primitives: usize,
    /// Sum of every primitive's `max - min + 1` index span.
    pub vertices: usize,
    /// Sum of every primitive's index count.
    pub indices: usize,
}

impl Default for SizePlan {
    fn default() -> Self {
        Self {
            nodes: 1,
            primitives: 0,
            vertices: 0,
            indices: 0,
        }
    }
}

impl SizePlan {
    /// Walk the active scene and total up its output sizes.
    pub fn measure(scene: &SceneDescription) -> Result<Self, ImportError> {
        crate::profile_function!();
        let mut plan = Self::default();
        walk_scene(scene, &mut plan)?;
        Ok(plan)
    }
}

/// Output indices are `u32`, so neither total may pass `u32::MAX`.
fn addressable(what: &'static str, required: u64) -> Result<usize, ImportError> {
    if required > u64::from(u32::MAX) {
        return Err(ImportError::LimitExceeded { what, required });
    }
    Ok(required as usize)
}

impl NodeVisitor for SizePlan {
    fn visit(
        &mut self,
        scene: &SceneDescription,
        node: usize,
        _parent: Option<usize>,
    ) -> Result<(), ImportError> {
        self.nodes += 1;

        let Some(mesh) = scene.node(node)?.mesh else {
            return Ok(());
        };
        for primitive in &scene.mesh(mesh)?.primitives {
            let Some(indices) = primitive.indices else {
                continue;
            };
            let stream = read_indices(scene, indices)?;
            self.indices = addressable("indices", self.indices as u64 + stream.len() as u64)?;
            let span = IndexSpan::scan(stream);
            self.vertices = addressable("vertices", self.vertices as u64 + span.vertex_count())?;
            self.primitives += 1;
        }
        Ok(())
    }
}
