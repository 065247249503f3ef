pub mod depth_renderer;
pub mod palette;
