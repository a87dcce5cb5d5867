pub mod accumulate_heatmap_use_case;
pub mod emit_dispatcher;
pub mod heatmap_renderer;
pub mod infrastructure;
pub mod pipeline_logger;
