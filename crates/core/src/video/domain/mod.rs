pub mod video_finisher;
pub mod video_reader;
pub mod video_writer;
