pub mod logger;
pub mod stain_pipeline;
