mod source_pipe;
mod volume;

pub use source_pipe::SourcePipe;
pub use volume::{VolumeProbe, NO_SIGNAL, VOLUME_CEIL};

/// Mono samples kept rolling for per-frame analysis
pub const BUFFER_SIZE: usize = 1024;
