pub mod constants;
pub mod error;
pub mod frame;
pub mod model_resolver;
pub mod resolution_planner;
pub mod video_metadata;
