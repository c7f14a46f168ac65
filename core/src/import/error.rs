//! Error types for scene import.

/// Errors that can occur while flattening or publishing a scene.
#[derive(Debug)]
pub enum ImportError {
    /// Failed to parse the glTF document.
    #[cfg(feature = "gltf")]
    Parse(gltf_dep::Error),
    /// Error resolving buffer data.
    Buffer(String),
    /// A table index in the scene description points nowhere.
    InvalidReference {
        /// Table the index points into ("node", "accessor", ...).
        kind: &'static str,
        /// The dangling index.
        index: usize,
    },
    /// An attribute accessor uses a component type the decoder cannot read.
    UnsupportedComponentType {
        /// Accessor index in the scene description.
        accessor: usize,
        /// Raw GL component type code.
        component_type: u32,
    },
    /// An accessor read would run past the end of its buffer view.
    AccessorOutOfBounds {
        /// Accessor index in the scene description.
        accessor: usize,
        /// First byte past the requested range.
        end: usize,
        /// Bytes available in the view.
        available: usize,
    },
    /// An index refers past the last element of an attribute accessor.
    VertexOutOfRange {
        /// Accessor index in the scene description.
        accessor: usize,
        /// The offending vertex index.
        vertex: u32,
        /// Elements the accessor holds.
        count: usize,
    },
    /// The packed output cannot be addressed with 32-bit indices.
    LimitExceeded {
        /// What overflowed ("vertices", "indices").
        what: &'static str,
        /// The amount the scene needs.
        required: u64,
    },
    /// The buffer device refused a request.
    Device(String),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "gltf")]
            Self::Parse(e) => write!(f, "glTF parse error: {e}"),
            Self::Buffer(msg) => write!(f, "buffer error: {msg}"),
            Self::InvalidReference { kind, index } => {
                write!(f, "invalid {kind} reference: {index}")
            }
            Self::UnsupportedComponentType {
                accessor,
                component_type,
            } => write!(
                f,
                "accessor {accessor} has unsupported component type {component_type}"
            ),
            Self::AccessorOutOfBounds {
                accessor,
                end,
                available,
            } => write!(
                f,
                "accessor {accessor} reads up to byte {end} but its view holds {available}"
            ),
            Self::VertexOutOfRange {
                accessor,
                vertex,
                count,
            } => write!(
                f,
                "vertex {vertex} is past the {count} elements of accessor {accessor}"
            ),
            Self::LimitExceeded { what, required } => write!(
                f,
                "scene needs {required} {what}, more than 32-bit indices can address"
            ),
            Self::Device(msg) => write!(f, "device error: {msg}"),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "gltf")]
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "gltf")]
impl From<gltf_dep::Error> for ImportError {
    fn from(e: gltf_dep::Error) -> Self {
        Self::Parse(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ImportError::InvalidReference {
            kind: "mesh",
            index: 4,
        };
        assert_eq!(err.to_string(), "invalid mesh reference: 4");

        let err = ImportError::UnsupportedComponentType {
            accessor: 2,
            component_type: 9999,
        };
        assert_eq!(
            err.to_string(),
            "accessor 2 has unsupported component type 9999"
        );

        let err = ImportError::LimitExceeded {
            what: "vertices",
            required: 1 << 32,
        };
        assert_eq!(
            err.to_string(),
            "scene needs 4294967296 vertices, more than 32-bit indices can address"
        );
    }
}
