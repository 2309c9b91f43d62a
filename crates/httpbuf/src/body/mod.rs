//! Body types used by the capture protocol.
//!
//! - [`BufBody`]: the swappable body slot of a captured request or response. It starts out
//!   wrapping the original stream and ends up either replaying the captured bytes or closed.
//! - [`Truncated`]: a body wrapper ending the stream after a fixed number of bytes, used for
//!   limited request capture.

mod buf_body;
mod truncated;

pub use buf_body::BufBody;
pub use truncated::Truncated;
