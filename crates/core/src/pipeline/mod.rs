pub mod infrastructure;
pub mod pipeline_executor;
pub mod pipeline_logger;
pub mod render_depth_video_use_case;
