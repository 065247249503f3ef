pub mod ffmpeg_cli_finisher;
pub mod ffmpeg_reader;
pub mod ffmpeg_writer;
pub mod source_fetcher;
