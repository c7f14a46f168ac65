//! # RedLilium Import
//!
//! Flattens a glTF-style scene description into GPU-ready arrays: world
//! transforms with parent links, draw primitives, and tightly packed
//! interleaved vertex and 32-bit index buffers.
//!
//! - [`import`]: the scene walker, size planner, attribute decoder, index
//!   reader, importer and publisher.
//! - [`device`]: the buffer device contract the importer publishes into.
//! - [`math`]: transform helpers over `nalgebra`.

pub mod device;
pub mod import;
pub mod math;
pub mod profiling;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
