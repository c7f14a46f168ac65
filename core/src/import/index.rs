//! Index stream reading.
//!
//! [`IndexStream`] yields the logical vertex indices of an index accessor in
//! storage order, widened to `u32`. The stream is lazy and `Clone`, so it can
//! be re-read from the start as often as needed.

use super::error::ImportError;
use super::source::{ComponentType, SceneDescription};

/// Storage width of an index accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexWidth {
    U8,
    U16,
    U32,
}

impl IndexWidth {
    /// Map a raw GL component type code. Only unsigned types are valid.
    pub fn from_gl(code: u32) -> Option<Self> {
        match ComponentType::from_gl(code)? {
            ComponentType::U8 => Some(Self::U8),
            ComponentType::U16 => Some(Self::U16),
            ComponentType::U32 => Some(Self::U32),
            _ => None,
        }
    }

    /// Size of one index in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    fn read(self, bytes: &[u8], position: usize) -> u32 {
        let at = position * self.size();
        match self {
            Self::U8 => bytes[at] as u32,
            Self::U16 => u16::from_le_bytes([bytes[at], bytes[at + 1]]) as u32,
            Self::U32 => u32::from_le_bytes([
                bytes[at],
                bytes[at + 1],
                bytes[at + 2],
                bytes[at + 3],
            ]),
        }
    }
}

/// Lazy, restartable sequence of vertex indices.
#[derive(Debug, Clone)]
pub struct IndexStream<'a> {
    bytes: &'a [u8],
    width: IndexWidth,
    position: usize,
    count: usize,
}

impl<'a> IndexStream<'a> {
    /// Stream over `count` indices of `width` packed at the start of `bytes`.
    ///
    /// Returns `None` when `bytes` is too short.
    pub fn new(bytes: &'a [u8], width: IndexWidth, count: usize) -> Option<Self> {
        if count * width.size() > bytes.len() {
            return None;
        }
        Some(Self {
            bytes,
            width,
            position: 0,
            count,
        })
    }

    /// A stream that yields nothing.
    pub fn empty() -> Self {
        Self {
            bytes: &[],
            width: IndexWidth::U32,
            position: 0,
            count: 0,
        }
    }

    pub fn width(&self) -> IndexWidth {
        self.width
    }
}

impl Iterator for IndexStream<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.position >= self.count {
            return None;
        }
        let index = self.width.read(self.bytes, self.position);
        self.position += 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for IndexStream<'_> {}

/// Open the index stream of `accessor`.
///
/// Accessors stored as anything but unsigned 8/16/32-bit integers yield an
/// empty stream. The whole index range is checked against the buffer view
/// before the stream is returned.
pub fn read_indices(
    scene: &SceneDescription,
    accessor: usize,
) -> Result<IndexStream<'_>, ImportError> {
    let resolved = scene.accessor_bytes(accessor)?;
    let Some(width) = IndexWidth::from_gl(resolved.desc.component_type) else {
        log::warn!(
            "Index accessor {accessor} has unsupported component type {}, importing no indices",
            resolved.desc.component_type
        );
        return Ok(IndexStream::empty());
    };

    let count = resolved.desc.count;
    if count > 0 {
        resolved.check_span(count - 1, width.size(), width.size())?;
    }
    IndexStream::new(resolved.bytes, width, count).ok_or(ImportError::AccessorOutOfBounds {
        accessor,
        end: count * width.size(),
        available: resolved.bytes.len(),
    })
}

/// Range and count of the indices in one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpan {
    pub min: u32,
    pub max: u32,
    pub count: u32,
}

impl Default for IndexSpan {
    fn default() -> Self {
        Self {
            min: u32::MAX,
            max: 0,
            count: 0,
        }
    }
}

impl IndexSpan {
    /// Scan a whole stream.
    pub fn scan(stream: IndexStream<'_>) -> Self {
        let mut span = Self::default();
        for index in stream {
            span.include(index);
        }
        span
    }

    /// Account for one more index.
    pub fn include(&mut self, index: u32) {
        self.min = self.min.min(index);
        self.max = self.max.max(index);
        self.count += 1;
    }

    /// Vertices in `[min, max]`; zero for an empty stream.
    ///
    /// A full 32-bit range holds 2^32 vertices, hence the wider type.
    pub fn vertex_count(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            u64::from(self.max - self.min) + 1
        }
    }
}
