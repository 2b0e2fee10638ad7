//! GPU-side half of the renderer: context acquisition, program build,
//! quad geometry, uniforms, and the per-frame state.

pub(crate) mod context;
pub(crate) mod geometry;
pub(crate) mod program;
pub(crate) mod state;
pub(crate) mod uniforms;

pub use context::BackendError;
pub use program::{BuildError, StageKind};
