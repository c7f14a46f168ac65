//! Import flags and the interleaved vertex layout they select.

use bitflags::bitflags;

bitflags! {
    /// Selects which vertex attributes are extracted.
    ///
    /// Bits outside the named ones are reserved; they are kept if set and
    /// otherwise ignored.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImportFlags: u32 {
        /// Positions, 3 floats.
        const POSITION = 1 << 0;
        /// Normals, 3 floats.
        const NORMAL = 1 << 1;
        /// First texture coordinate set, 2 floats.
        const TEXCOORD0 = 1 << 2;
        /// Everything, including attributes added later.
        const ALL = 0xFFFF_FFFF;
    }
}

impl Default for ImportFlags {
    fn default() -> Self {
        Self::ALL
    }
}

impl ImportFlags {
    /// Floats per interleaved vertex.
    pub fn vertex_stride(self) -> usize {
        VertexAttributeKind::ALL
            .iter()
            .filter(|kind| self.contains(kind.flag()))
            .map(|kind| kind.components())
            .sum()
    }

    /// Bytes per interleaved vertex.
    pub fn vertex_size(self) -> usize {
        self.vertex_stride() * std::mem::size_of::<f32>()
    }
}

/// Vertex attributes the importer understands, in interleaving order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeKind {
    Position,
    Normal,
    TexCoord0,
}

impl VertexAttributeKind {
    /// All kinds in the order they appear inside a vertex.
    pub const ALL: [Self; 3] = [Self::Position, Self::Normal, Self::TexCoord0];

    /// Map a glTF attribute semantic name.
    pub fn from_semantic(name: &str) -> Option<Self> {
        match name {
            "POSITION" => Some(Self::Position),
            "NORMAL" => Some(Self::Normal),
            "TEXCOORD_0" => Some(Self::TexCoord0),
            _ => None,
        }
    }

    /// glTF attribute semantic name.
    pub fn semantic(self) -> &'static str {
        match self {
            Self::Position => "POSITION",
            Self::Normal => "NORMAL",
            Self::TexCoord0 => "TEXCOORD_0",
        }
    }

    /// Number of float components written per vertex.
    pub fn components(self) -> usize {
        match self {
            Self::Position | Self::Normal => 3,
            Self::TexCoord0 => 2,
        }
    }

    /// Flag that enables this attribute.
    pub fn flag(self) -> ImportFlags {
        match self {
            Self::Position => ImportFlags::POSITION,
            Self::Normal => ImportFlags::NORMAL,
            Self::TexCoord0 => ImportFlags::TEXCOORD0,
        }
    }

    /// Float offset of this attribute inside a vertex, or `None` when
    /// `flags` disables it.
    pub fn offset(self, flags: ImportFlags) -> Option<usize> {
        if !flags.contains(self.flag()) {
            return None;
        }
        let offset = Self::ALL
            .iter()
            .take_while(|kind| **kind != self)
            .filter(|kind| flags.contains(kind.flag()))
            .map(|kind| kind.components())
            .sum();
        Some(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_everything() {
        let flags = ImportFlags::default();
        assert_eq!(flags.bits(), 0xFFFF_FFFF);
        assert_eq!(flags.vertex_stride(), 8);
        assert_eq!(flags.vertex_size(), 32);
    }

    #[test]
    fn test_stride_skips_disabled() {
        let flags = ImportFlags::NORMAL | ImportFlags::TEXCOORD0;
        assert_eq!(flags.vertex_stride(), 5);
        assert_eq!(VertexAttributeKind::Position.offset(flags), None);
        assert_eq!(VertexAttributeKind::Normal.offset(flags), Some(0));
        assert_eq!(VertexAttributeKind::TexCoord0.offset(flags), Some(3));
    }

    #[test]
    fn test_offsets_full_layout() {
        let flags = ImportFlags::ALL;
        assert_eq!(VertexAttributeKind::Position.offset(flags), Some(0));
        assert_eq!(VertexAttributeKind::Normal.offset(flags), Some(3));
        assert_eq!(VertexAttributeKind::TexCoord0.offset(flags), Some(6));
    }

    #[test]
    fn test_semantic_mapping() {
        for kind in VertexAttributeKind::ALL {
            assert_eq!(VertexAttributeKind::from_semantic(kind.semantic()), Some(kind));
        }
        assert_eq!(VertexAttributeKind::from_semantic("TEXCOORD_1"), None);
        assert_eq!(VertexAttributeKind::from_semantic("COLOR_0"), None);
    }

    #[test]
    fn test_empty_flags_have_no_stride() {
        assert_eq!(ImportFlags::empty().vertex_stride(), 0);
    }
}
