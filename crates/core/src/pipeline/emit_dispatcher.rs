use crate::heatmap::domain::emit_error::EmitError;
use crate::heatmap::domain::heatmap_engine::EmitRequest;
use crate::pipeline::heatmap_renderer::HeatmapRenderer;

/// Outcome counts for every emit handed to a dispatcher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitStats {
    pub written: usize,
    pub failed: usize,
    pub dropped: usize,
}

impl EmitStats {
    pub(crate) fn record(&mut self, result: Result<(), EmitError>, sequence: u64) {
        match result {
            Ok(()) => self.written += 1,
            Err(e) => {
                log::warn!("Tick {sequence}: heatmap emit skipped: {e}");
                self.failed += 1;
            }
        }
    }
}

/// Decides where and when emit work runs relative to the tick loop.
///
/// `finish` must only return once every accepted request has either been
/// rendered or counted as dropped.
pub trait EmitDispatcher: Send {
    fn dispatch(&mut self, request: EmitRequest);

    fn finish(self: Box<Self>) -> EmitStats;
}

/// Renders on the calling thread. Never drops a request.
pub struct InlineEmitDispatcher {
    renderer: HeatmapRenderer,
    stats: EmitStats,
}

impl InlineEmitDispatcher {
    pub fn new(renderer: HeatmapRenderer) -> Self {
        Self {
            renderer,
            stats: EmitStats::default(),
        }
    }
}

impl EmitDispatcher for InlineEmitDispatcher {
    fn dispatch(&mut self, request: EmitRequest) {
        let result = self.renderer.render(&request);
        self.stats.record(result, request.sequence);
    }

    fn finish(self: Box<Self>) -> EmitStats {
        self.stats
    }
}
