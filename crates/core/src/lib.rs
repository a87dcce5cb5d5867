pub mod detection;
pub mod heatmap;
pub mod pipeline;
pub mod shared;
pub mod video;
