pub mod segmenter;
pub mod slides;
