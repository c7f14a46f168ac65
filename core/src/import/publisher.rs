//! Hands packed geometry to a [`BufferDevice`] and takes it back.

use crate::device::{BufferDescriptor, BufferDevice, BufferUsage, CommandBatch};

use super::error::ImportError;
use super::importer::FlattenedScene;

/// Device buffers holding one published scene.
#[derive(Debug, Clone)]
pub struct PublishedBuffers<B> {
    pub vertex_buffer: B,
    pub index_buffer: B,
}

/// Create a vertex and an index buffer sized exactly to `scene`'s packed
/// data and submit one batch filling both.
///
/// The upload itself completes asynchronously on the device's side. If the
/// second buffer cannot be created the first one is destroyed before the
/// error is returned.
pub fn publish<D: BufferDevice>(
    device: &D,
    scene: &FlattenedScene,
) -> Result<PublishedBuffers<D::Buffer>, ImportError> {
    crate::profile_function!();

    let vertex_bytes = scene.vertex_bytes();
    let index_bytes = scene.index_bytes();

    let vertex_buffer = device.create_buffer(
        &BufferDescriptor::new(
            vertex_bytes.len() as u64,
            BufferUsage::VERTEX | BufferUsage::COPY_DST | BufferUsage::STATIC,
        )
        .with_label("scene_vertices"),
    )?;
    let index_buffer = match device.create_buffer(
        &BufferDescriptor::new(
            index_bytes.len() as u64,
            BufferUsage::INDEX | BufferUsage::COPY_DST | BufferUsage::STATIC,
        )
        .with_label("scene_indices"),
    ) {
        Ok(buffer) => buffer,
        Err(e) => {
            log::warn!("Index buffer creation failed, releasing vertex buffer: {e}");
            let mut batch = CommandBatch::new();
            batch.destroy(vertex_buffer);
            device.submit(batch);
            return Err(e);
        }
    };

    let mut batch = CommandBatch::new();
    batch
        .fill(vertex_buffer.clone(), vertex_bytes.to_vec())
        .fill(index_buffer.clone(), index_bytes.to_vec());
    device.submit(batch);

    log::debug!(
        "Published scene geometry: {} vertex bytes, {} index bytes",
        vertex_bytes.len(),
        index_bytes.len()
    );

    Ok(PublishedBuffers {
        vertex_buffer,
        index_buffer,
    })
}

/// Release both buffers in a single batch.
pub fn release<D: BufferDevice>(device: &D, buffers: PublishedBuffers<D::Buffer>) {
    let mut batch = CommandBatch::new();
    batch
        .destroy(buffers.vertex_buffer)
        .destroy(buffers.index_buffer);
    device.submit(batch);
}
