mod source;
mod stream;

pub use source::WindowedSource;
pub use stream::{WindowStream, DEFAULT_BUFFER_SIZE};
