/// Output resolution every frame is scaled to before accumulation.
pub const DEFAULT_GRID_WIDTH: u32 = 1280;
pub const DEFAULT_GRID_HEIGHT: u32 = 780;

/// Amount subtracted from every grid cell per tick.
pub const DEFAULT_DECAY_CONSTANT: u16 = 1;
pub const DEFAULT_STAMP_RADIUS: u32 = 10;
pub const DEFAULT_STAMP_INCREMENT: u16 = 5;

/// Weight of the live frame in the composite; the heatmap gets the rest.
pub const DEFAULT_BLEND_ALPHA: f32 = 0.9;

/// Ticks between emitted composites (~1 second at 30 fps).
pub const DEFAULT_RENDER_INTERVAL: u64 = 30;

pub const DEFAULT_OUTPUT_PATH: &str = "heatmap.png";

/// Pending emits allowed while the emit worker is busy.
pub const DEFAULT_EMIT_QUEUE_CAPACITY: usize = 1;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
