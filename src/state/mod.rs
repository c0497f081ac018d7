pub mod region;
pub mod render;
pub mod session;
pub mod transcript;

pub use region::RegionAccumulator;
pub use render::{
    ChannelRenderer, RegionContent, RegionHandle, Renderer, StatusIndicator, UiUpdate,
};
pub use session::{ChatSession, StreamAggregator, StreamOutcome, StreamState};
pub use transcript::Transcript;
