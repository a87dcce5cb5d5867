pub mod constants;
pub mod detection;
pub mod frame;
pub mod frame_tick;
pub mod heatmap_config;
pub mod video_metadata;
