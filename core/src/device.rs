//! GPU buffer device contract.
//!
//! The importer never talks to a graphics API directly. It asks a
//! [`BufferDevice`] for buffer handles and hands it a [`CommandBatch`] of
//! fill/destroy commands. How and when those commands reach the GPU is the
//! device's business.
//!
//! [`DummyDevice`] records everything it is asked to do and is used by tests
//! and offline tools.

use std::fmt;

use bitflags::bitflags;
use parking_lot::Mutex;

use crate::import::ImportError;

bitflags! {
    /// Usage flags for buffers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Buffer can be used as a vertex buffer.
        const VERTEX = 1 << 0;
        /// Buffer can be used as an index buffer.
        const INDEX = 1 << 1;
        /// Buffer can be copied to.
        const COPY_DST = 1 << 2;
        /// Contents are written once and never updated.
        const STATIC = 1 << 3;
    }
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Descriptor for creating a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BufferDescriptor {
    /// Debug label for the buffer.
    pub label: Option<String>,
    /// Size in bytes.
    pub size: u64,
    /// Usage flags.
    pub usage: BufferUsage,
}

impl BufferDescriptor {
    /// Create a new buffer descriptor.
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            usage,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A single queued buffer operation.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferCommand<B> {
    /// Upload `data` to the start of `buffer`.
    Fill { buffer: B, data: Vec<u8> },
    /// Release `buffer`.
    Destroy(B),
}

/// A batch of buffer commands submitted to the device as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandBatch<B> {
    commands: Vec<BufferCommand<B>>,
}

impl<B> CommandBatch<B> {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Queue an upload of `data` into `buffer`.
    pub fn fill(&mut self, buffer: B, data: Vec<u8>) -> &mut Self {
        self.commands.push(BufferCommand::Fill { buffer, data });
        self
    }

    /// Queue the release of `buffer`.
    pub fn destroy(&mut self, buffer: B) -> &mut Self {
        self.commands.push(BufferCommand::Destroy(buffer));
        self
    }

    /// Queued commands in submission order.
    pub fn commands(&self) -> &[BufferCommand<B>] {
        &self.commands
    }

    /// Consume the batch, yielding its commands.
    pub fn into_commands(self) -> Vec<BufferCommand<B>> {
        self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl<B> Default for CommandBatch<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// A device that owns GPU buffers.
///
/// Methods take `&self` so a device can be shared behind an `Arc` by every
/// importer that publishes into it.
pub trait BufferDevice {
    /// Opaque handle to a device buffer.
    type Buffer: Clone + fmt::Debug;

    /// Allocate a buffer. Contents are undefined until filled.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<Self::Buffer, ImportError>;

    /// Submit a batch of commands. Completion is asynchronous.
    fn submit(&self, batch: CommandBatch<Self::Buffer>);
}

/// Handle type handed out by [`DummyDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DummyBuffer(pub u32);

#[derive(Debug, Default)]
struct DummyState {
    next_id: u32,
    created: Vec<(DummyBuffer, BufferDescriptor)>,
    submitted: Vec<CommandBatch<DummyBuffer>>,
}

/// Device that performs no GPU work and records every request.
#[derive(Debug, Default)]
pub struct DummyDevice {
    state: Mutex<DummyState>,
}

impl DummyDevice {
    /// Create a new dummy device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every buffer created so far, with its descriptor.
    pub fn created_buffers(&self) -> Vec<(DummyBuffer, BufferDescriptor)> {
        self.state.lock().created.clone()
    }

    /// Every batch submitted so far.
    pub fn submitted_batches(&self) -> Vec<CommandBatch<DummyBuffer>> {
        self.state.lock().submitted.clone()
    }

    /// Handles released through `Destroy` commands, in order.
    pub fn destroyed_buffers(&self) -> Vec<DummyBuffer> {
        self.state
            .lock()
            .submitted
            .iter()
            .flat_map(|batch| batch.commands())
            .filter_map(|command| match command {
                BufferCommand::Destroy(buffer) => Some(*buffer),
                BufferCommand::Fill { .. } => None,
            })
            .collect()
    }

    /// Latest data uploaded to `buffer`, if any.
    pub fn buffer_contents(&self, buffer: DummyBuffer) -> Option<Vec<u8>> {
        self.state
            .lock()
            .submitted
            .iter()
            .flat_map(|batch| batch.commands())
            .filter_map(|command| match command {
                BufferCommand::Fill { buffer: b, data } if *b == buffer => Some(data.clone()),
                _ => None,
            })
            .last()
    }
}

impl BufferDevice for DummyDevice {
    type Buffer = DummyBuffer;

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<DummyBuffer, ImportError> {
        let mut state = self.state.lock();
        let buffer = DummyBuffer(state.next_id);
        state.next_id += 1;
        log::trace!(
            "DummyDevice: creating buffer {:?} {:?} (size: {})",
            buffer,
            descriptor.label,
            descriptor.size
        );
        state.created.push((buffer, descriptor.clone()));
        Ok(buffer)
    }

    fn submit(&self, batch: CommandBatch<DummyBuffer>) {
        log::trace!(
            "DummyDevice: submitting {} command(s)",
            batch.commands().len()
        );
        self.state.lock().submitted.push(batch);
    }
}

static_assertions::assert_impl_all!(DummyDevice: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_label() {
        let desc = BufferDescriptor::new(64, BufferUsage::VERTEX).with_label("verts");
        assert_eq!(desc.size, 64);
        assert_eq!(desc.label.as_deref(), Some("verts"));
    }

    #[test]
    fn test_batch_preserves_order() {
        let mut batch = CommandBatch::new();
        batch.fill(1u32, vec![1, 2]).destroy(2u32);
        assert_eq!(
            batch.commands(),
            &[
                BufferCommand::Fill {
                    buffer: 1,
                    data: vec![1, 2]
                },
                BufferCommand::Destroy(2)
            ]
        );
    }

    #[test]
    fn test_dummy_device_handles_are_unique() {
        let device = DummyDevice::new();
        let a = device
            .create_buffer(&BufferDescriptor::new(4, BufferUsage::VERTEX))
            .unwrap();
        let b = device
            .create_buffer(&BufferDescriptor::new(4, BufferUsage::INDEX))
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(device.created_buffers().len(), 2);
    }

    #[test]
    fn test_dummy_device_records_contents_and_destroys() {
        let device = DummyDevice::new();
        let buffer = device
            .create_buffer(&BufferDescriptor::new(3, BufferUsage::VERTEX))
            .unwrap();

        let mut batch = CommandBatch::new();
        batch.fill(buffer, vec![7, 8, 9]);
        device.submit(batch);
        assert_eq!(device.buffer_contents(buffer), Some(vec![7, 8, 9]));
        assert!(device.destroyed_buffers().is_empty());

        let mut batch = CommandBatch::new();
        batch.destroy(buffer);
        device.submit(batch);
        assert_eq!(device.destroyed_buffers(), vec![buffer]);
    }
}
