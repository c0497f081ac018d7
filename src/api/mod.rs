pub mod client;
pub mod decode;
pub mod logging;
#[cfg(test)]
pub mod mock_client;
pub mod stream;

pub use client::{AgentClient, AgentStream};
pub use decode::decode_frame;
pub use stream::{frame_stream, frames, SseFrameParser};
