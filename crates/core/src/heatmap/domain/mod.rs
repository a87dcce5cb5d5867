pub mod colorizer;
pub mod colormap;
pub mod compositor;
pub mod density_accumulator;
pub mod density_grid;
pub mod emit_error;
pub mod ground_point;
pub mod heatmap_engine;
pub mod render_schedule;
