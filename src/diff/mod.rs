//! Diff-chunking core: line alignment, intra-line change regions, chunk
//! building with context collapsing, and patch-derived opcodes.

pub mod aligner;
pub mod chunks;
pub mod patch_ops;
pub mod regions;

pub use aligner::{DEFAULT_COMPAT_VERSION, LineAligner, aligner_for_version};
pub use chunks::{ChunkBuilder, DEFAULT_CONTEXT_LINES};
pub use patch_ops::{PatchOpcodes, opcodes_from_hunks};
pub use regions::changed_regions;
