use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::detection::domain::detection_source::DetectionSource;
use crate::heatmap::domain::heatmap_engine::HeatmapEngine;
use crate::pipeline::emit_dispatcher::{EmitDispatcher, EmitStats};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::frame_tick::FrameTick;
use crate::video::domain::video_reader::VideoReader;

type ProgressCallback = Box<dyn Fn(usize, usize) -> bool + Send>;

/// What a finished (or cancelled) run did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    /// Ticks whose frame could not be read; they only decayed the grid.
    pub skipped_ticks: u64,
    pub emits: EmitStats,
    pub cancelled: bool,
}

/// Drives one stream through the heatmap engine:
/// `reader + detections → engine → emit dispatcher`.
///
/// Single-use: `execute` consumes the owned components, so a second call
/// fails. Returning `false` from `on_progress` or setting `cancelled` stops
/// the run after the current tick; queued emits are still completed.
pub struct AccumulateHeatmapUseCase {
    reader: Option<Box<dyn VideoReader>>,
    detections: Option<Box<dyn DetectionSource>>,
    engine: Option<HeatmapEngine>,
    dispatcher: Option<Box<dyn EmitDispatcher>>,
    logger: Box<dyn PipelineLogger>,
    on_progress: Option<ProgressCallback>,
    cancelled: Arc<AtomicBool>,
}

impl AccumulateHeatmapUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        detections: Box<dyn DetectionSource>,
        engine: HeatmapEngine,
        dispatcher: Box<dyn EmitDispatcher>,
        logger: Box<dyn PipelineLogger>,
        on_progress: Option<ProgressCallback>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            reader: Some(reader),
            detections: Some(detections),
            engine: Some(engine),
            dispatcher: Some(dispatcher),
            logger,
            on_progress,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn execute(&mut self, input_path: &Path) -> Result<RunSummary, Box<dyn std::error::Error>> {
        let mut reader = self.reader.take().ok_or("Pipeline already executed")?;
        let mut detections = self.detections.take().ok_or("Pipeline already executed")?;
        let mut engine = self.engine.take().ok_or("Pipeline already executed")?;
        let mut dispatcher = self.dispatcher.take().ok_or("Pipeline already executed")?;

        let metadata = reader.open(input_path)?;
        let (grid_w, grid_h) = (engine.grid().width(), engine.grid().height());
        if (metadata.width, metadata.height) != (grid_w, grid_h) {
            log::warn!(
                "Frames are {}x{} but the density grid is {grid_w}x{grid_h}; emits will fail",
                metadata.width,
                metadata.height
            );
        }
        self.logger.info(&format!(
            "Accumulating heatmap for {} ({} frames)",
            input_path.display(),
            metadata.total_frames
        ));

        let mut summary = RunSummary::default();
        let loop_result = self.run_ticks(
            &mut *reader,
            &mut *detections,
            &mut engine,
            &mut *dispatcher,
            metadata.total_frames,
            &mut summary,
        );
        reader.close();
        engine.terminate();
        summary.emits = dispatcher.finish();
        self.logger.summary();
        loop_result?;

        log::info!(
            "Run finished: {} ticks, {} skipped, {} heatmaps written, {} failed, {} dropped",
            summary.ticks,
            summary.skipped_ticks,
            summary.emits.written,
            summary.emits.failed,
            summary.emits.dropped
        );
        Ok(summary)
    }

    fn run_ticks(
        &mut self,
        reader: &mut dyn VideoReader,
        detections: &mut dyn DetectionSource,
        engine: &mut HeatmapEngine,
        dispatcher: &mut dyn EmitDispatcher,
        total_frames: usize,
        summary: &mut RunSummary,
    ) -> Result<(), Box<dyn std::error::Error>> {
        for (index, frame_result) in reader.frames().enumerate() {
            if self.cancelled.load(Ordering::Relaxed) {
                summary.cancelled = true;
                break;
            }

            let sequence = index as u64 + 1;
            let objects = detections.detections_for(index).unwrap_or_else(|e| {
                log::warn!("Tick {sequence}: no detections ({e})");
                Vec::new()
            });
            let tick = match frame_result {
                Ok(frame) => FrameTick::new(sequence, objects, frame),
                Err(e) => {
                    log::warn!("Tick {sequence}: frame unreadable: {e}");
                    FrameTick::without_frame(sequence, objects)
                }
            };

            let start = Instant::now();
            let report = engine.process_tick(tick)?;
            self.logger
                .timing("accumulate", start.elapsed().as_secs_f64() * 1000.0);
            self.logger.metric("persons", report.counts.persons as f64);
            self.logger.metric("vehicles", report.counts.vehicles as f64);

            summary.ticks += 1;
            if !report.frame_available {
                summary.skipped_ticks += 1;
            }
            if let Some(request) = report.emit {
                let start = Instant::now();
                dispatcher.dispatch(request);
                self.logger
                    .timing("emit", start.elapsed().as_secs_f64() * 1000.0);
            }

            let done = index + 1;
            self.logger.progress(done, total_frames);
            if let Some(ref callback) = self.on_progress {
                if !callback(done, total_frames) {
                    summary.cancelled = true;
                    break;
                }
            }
        }
        Ok(())
    }
}
