pub mod depth;
pub mod pipeline;
pub mod rendering;
pub mod shared;
pub mod video;
