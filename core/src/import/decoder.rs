//! Attribute decoding.
//!
//! An [`AttributeDecoder`] is built once per attribute per primitive. It
//! resolves the accessor's bytes, picks a component reader for the
//! accessor's encoding, and then turns any vertex of the accessor into up to
//! `components` floats.
//!
//! Float encodings pass through. Integer encodings pass through as plain
//! numbers unless the accessor is normalized, in which case they are divided
//! by the largest magnitude of their type (signed values are clamped to -1).

use super::error::ImportError;
use super::flags::VertexAttributeKind;
use super::source::{ComponentType, SceneDescription};

type ComponentReader = fn(&[u8]) -> f32;

/// Decodes one attribute stream into floats.
#[derive(Debug, Clone)]
pub struct AttributeDecoder<'a> {
    kind: VertexAttributeKind,
    accessor: usize,
    bytes: &'a [u8],
    count: usize,
    stride: usize,
    component_size: usize,
    components: usize,
    read: ComponentReader,
}

impl<'a> AttributeDecoder<'a> {
    /// Build a decoder for `accessor` feeding a `kind` slot.
    ///
    /// Fails when the accessor's component type has no reader.
    pub fn new(
        scene: &'a SceneDescription,
        accessor: usize,
        kind: VertexAttributeKind,
    ) -> Result<Self, ImportError> {
        let resolved = scene.accessor_bytes(accessor)?;
        let desc = resolved.desc;
        let component_type = ComponentType::from_gl(desc.component_type).ok_or(
            ImportError::UnsupportedComponentType {
                accessor,
                component_type: desc.component_type,
            },
        )?;

        let component_size = component_type.size();
        let stride = desc
            .byte_stride(resolved.view)
            .unwrap_or(component_size * desc.accessor_type.multiplicity());

        Ok(Self {
            kind,
            accessor,
            bytes: resolved.bytes,
            count: desc.count,
            stride,
            component_size,
            components: kind.components().min(desc.accessor_type.multiplicity()),
            read: component_reader(component_type, desc.normalized),
        })
    }

    pub fn kind(&self) -> VertexAttributeKind {
        self.kind
    }

    /// Floats written per vertex.
    pub fn components(&self) -> usize {
        self.components
    }

    /// Check that every vertex up to and including `last` can be read.
    ///
    /// `last` must lie inside the view's bytes and below the accessor's
    /// element count; an interleaved view often holds bytes past the end of
    /// one attribute.
    pub fn check_range(&self, last: u32) -> Result<(), ImportError> {
        let end = last as usize * self.stride + self.components * self.component_size;
        if end > self.bytes.len() {
            return Err(ImportError::AccessorOutOfBounds {
                accessor: self.accessor,
                end,
                available: self.bytes.len(),
            });
        }
        if last as usize >= self.count {
            return Err(ImportError::VertexOutOfRange {
                accessor: self.accessor,
                vertex: last,
                count: self.count,
            });
        }
        Ok(())
    }

    /// Decode `vertex` into the first [`components`](Self::components) slots
    /// of `out`.
    ///
    /// The vertex must have passed [`check_range`](Self::check_range).
    pub fn decode(&self, vertex: u32, out: &mut [f32]) {
        let base = vertex as usize * self.stride;
        for (i, slot) in out.iter_mut().take(self.components).enumerate() {
            let at = base + i * self.component_size;
            *slot = (self.read)(&self.bytes[at..at + self.component_size]);
        }
    }
}

fn le<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

/// Pick the reader for one encoding, once per decoder.
fn component_reader(component_type: ComponentType, normalized: bool) -> ComponentReader {
    match (component_type, normalized) {
        (ComponentType::F32, _) => |b: &[u8]| f32::from_le_bytes(le(b)),
        (ComponentType::F64, _) => |b: &[u8]| f64::from_le_bytes(le(b)) as f32,

        (ComponentType::I8, false) => |b: &[u8]| b[0] as i8 as f32,
        (ComponentType::I8, true) => |b: &[u8]| (b[0] as i8 as f32 / i8::MAX as f32).max(-1.0),
        (ComponentType::I16, false) => |b: &[u8]| i16::from_le_bytes(le(b)) as f32,
        (ComponentType::I16, true) => {
            |b: &[u8]| (i16::from_le_bytes(le(b)) as f32 / i16::MAX as f32).max(-1.0)
        }
        (ComponentType::I32, false) => |b: &[u8]| i32::from_le_bytes(le(b)) as f32,
        (ComponentType::I32, true) => {
            |b: &[u8]| (i32::from_le_bytes(le(b)) as f64 / i32::MAX as f64).max(-1.0) as f32
        }

        (ComponentType::U8, false) => |b: &[u8]| b[0] as f32,
        (ComponentType::U8, true) => |b: &[u8]| b[0] as f32 / u8::MAX as f32,
        (ComponentType::U16, false) => |b: &[u8]| u16::from_le_bytes(le(b)) as f32,
        (ComponentType::U16, true) => |b: &[u8]| u16::from_le_bytes(le(b)) as f32 / u16::MAX as f32,
        (ComponentType::U32, false) => |b: &[u8]| u32::from_le_bytes(le(b)) as f32,
        (ComponentType::U32, true) => {
            |b: &[u8]| (u32::from_le_bytes(le(b)) as f64 / u32::MAX as f64) as f32
        }
    }
}
