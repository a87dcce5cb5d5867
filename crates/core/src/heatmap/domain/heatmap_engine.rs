use thiserror::Error;

use crate::heatmap::domain::density_accumulator::DensityAccumulator;
use crate::heatmap::domain::density_grid::DensityGrid;
use crate::heatmap::domain::ground_point::GroundPoint;
use crate::heatmap::domain::render_schedule::RenderSchedule;
use crate::shared::detection::ObjectCounts;
use crate::shared::frame::Frame;
use crate::shared::frame_tick::FrameTick;
use crate::shared::heatmap_config::{ConfigError, HeatmapConfig};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TickError {
    #[error("stream already terminated")]
    Terminated,
    #[error("tick {got} arrived after tick {previous}")]
    OutOfOrder { previous: u64, got: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    Running,
    Terminated,
}

/// Work handed to the emit stage: the tick's frame plus a copy of the grid
/// taken after that tick's decay and stamps.
#[derive(Clone, Debug)]
pub struct EmitRequest {
    pub sequence: u64,
    pub frame: Frame,
    pub grid: DensityGrid,
}

/// What happened to one tick.
#[derive(Debug)]
pub struct TickReport {
    pub sequence: u64,
    pub counts: ObjectCounts,
    pub stamped_points: usize,
    pub frame_available: bool,
    pub emit: Option<EmitRequest>,
}

/// Per-stream state machine: decay, stamp, and decide whether to emit.
///
/// Ticks must arrive with strictly increasing sequence numbers. A tick
/// without a readable frame only decays the grid and never emits.
pub struct HeatmapEngine {
    accumulator: DensityAccumulator,
    schedule: RenderSchedule,
    state: StreamState,
    last_sequence: Option<u64>,
}

impl HeatmapEngine {
    pub fn new(config: &HeatmapConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let accumulator = DensityAccumulator::from_config(config)?;
        let schedule = RenderSchedule::new(config.render_interval)?;
        Ok(Self {
            accumulator,
            schedule,
            state: StreamState::Running,
            last_sequence: None,
        })
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn grid(&self) -> &DensityGrid {
        self.accumulator.grid()
    }

    pub fn process_tick(&mut self, tick: FrameTick) -> Result<TickReport, TickError> {
        if self.state == StreamState::Terminated {
            return Err(TickError::Terminated);
        }
        if let Some(previous) = self.last_sequence {
            if tick.sequence <= previous {
                return Err(TickError::OutOfOrder {
                    previous,
                    got: tick.sequence,
                });
            }
        }
        self.last_sequence = Some(tick.sequence);

        let sequence = tick.sequence;
        let counts = ObjectCounts::tally(&tick.detections);
        log::debug!("Tick {sequence}: {counts}");

        let Some(frame) = tick.frame else {
            log::warn!("Tick {sequence}: frame unavailable, applying decay only");
            self.accumulator.decay();
            if self.schedule.is_due(sequence) {
                log::warn!("Tick {sequence}: skipping heatmap emit without a frame");
            }
            return Ok(TickReport {
                sequence,
                counts,
                stamped_points: 0,
                frame_available: false,
                emit: None,
            });
        };

        let points = GroundPoint::extract_all(&tick.detections);
        self.accumulator.apply(&points);

        let emit = self.schedule.is_due(sequence).then(|| EmitRequest {
            sequence,
            frame,
            grid: self.accumulator.snapshot(),
        });

        Ok(TickReport {
            sequence,
            counts,
            stamped_points: points.len(),
            frame_available: true,
            emit,
        })
    }

    /// Ends the stream. The grid is discarded; nothing is checkpointed.
    pub fn terminate(&mut self) {
        if self.state == StreamState::Terminated {
            return;
        }
        self.accumulator.reset();
        self.state = StreamState::Terminated;
        log::debug!("Heatmap stream terminated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::detection::{Detection, PERSON_CLASS_ID, VEHICLE_CLASS_ID};

    const W: u32 = 64;
    const H: u32 = 48;

    fn config(interval: u64) -> HeatmapConfig {
        HeatmapConfig {
            grid_width: W,
            grid_height: H,
            decay_constant: 1,
            stamp_radius: 3,
            stamp_increment: 5,
            render_interval: interval,
            ..HeatmapConfig::default()
        }
    }

    fn person_at(ground_x: i32, ground_y: i32) -> Detection {
        Detection::new(PERSON_CLASS_ID, ground_x - 5, ground_y - 20, 10, 20)
    }

    fn tick(sequence: u64, detections: Vec<Detection>) -> FrameTick {
        FrameTick::new(
            sequence,
            detections,
            Frame::filled_rgb(W, H, [10, 10, 10], sequence as usize),
        )
    }

    #[test]
    fn test_invalid_config_refuses_to_start() {
        let bad = HeatmapConfig {
            render_interval: 0,
            ..config(30)
        };
        assert!(HeatmapEngine::new(&bad).is_err());

        let bad = HeatmapConfig {
            grid_width: 0,
            ..config(30)
        };
        assert!(HeatmapEngine::new(&bad).is_err());
    }

    #[test]
    fn test_empty_tick_on_empty_grid_stays_zero() {
        let mut engine = HeatmapEngine::new(&config(30)).unwrap();
        let report = engine.process_tick(tick(1, vec![])).unwrap();
        assert!(engine.grid().is_zero());
        assert_eq!(report.stamped_points, 0);
        assert!(report.emit.is_none());
    }

    #[test]
    fn test_only_people_are_stamped() {
        let mut engine = HeatmapEngine::new(&config(30)).unwrap();
        let report = engine
            .process_tick(tick(
                1,
                vec![
                    person_at(20, 20),
                    Detection::new(VEHICLE_CLASS_ID, 40, 10, 10, 10),
                ],
            ))
            .unwrap();
        assert_eq!(report.stamped_points, 1);
        assert_eq!(report.counts.persons, 1);
        assert_eq!(report.counts.vehicles, 1);
        assert_eq!(engine.grid().get(20, 20), 5);
        assert_eq!(engine.grid().get(45, 20), 0);
    }

    #[test]
    fn test_emits_exactly_once_in_59_ticks() {
        let mut engine = HeatmapEngine::new(&config(30)).unwrap();
        let mut emitted = Vec::new();
        for seq in 1..=59 {
            let report = engine.process_tick(tick(seq, vec![person_at(30, 30)])).unwrap();
            if let Some(req) = report.emit {
                emitted.push(req);
            }
        }
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].sequence, 30);
        assert_eq!(emitted[0].frame.dimensions(), (W, H));
        assert_eq!(emitted[0].grid.width(), W);
        assert_eq!(emitted[0].grid.height(), H);
    }

    #[test]
    fn test_emit_carries_post_tick_snapshot() {
        let mut engine = HeatmapEngine::new(&config(2)).unwrap();
        engine.process_tick(tick(1, vec![person_at(10, 10)])).unwrap();
        let report = engine.process_tick(tick(2, vec![person_at(10, 10)])).unwrap();
        let request = report.emit.unwrap();
        // 5 decayed by 1, plus a fresh 5.
        assert_eq!(request.grid.get(10, 10), 9);

        engine.process_tick(tick(3, vec![])).unwrap();
        assert_eq!(request.grid.get(10, 10), 9);
        assert_eq!(engine.grid().get(10, 10), 8);
    }

    #[test]
    fn test_missing_frame_decays_only_and_continues() {
        let mut engine = HeatmapEngine::new(&config(10)).unwrap();
        for seq in 1..=9 {
            engine.process_tick(tick(seq, vec![person_at(30, 30)])).unwrap();
        }
        let before = engine.grid().get(30, 30);

        let report = engine
            .process_tick(FrameTick::without_frame(10, vec![person_at(30, 30)]))
            .unwrap();
        assert!(!report.frame_available);
        assert!(report.emit.is_none());
        assert_eq!(report.stamped_points, 0);
        assert_eq!(engine.grid().get(30, 30), before - 1);

        let report = engine.process_tick(tick(11, vec![person_at(30, 30)])).unwrap();
        assert!(report.frame_available);
        assert_eq!(engine.grid().get(30, 30), before - 1 - 1 + 5);
    }

    #[test]
    fn test_unbounded_radius_config_stamps_whole_grid() {
        let config = HeatmapConfig {
            grid_width: 16,
            grid_height: 16,
            stamp_radius: u32::MAX,
            ..HeatmapConfig::default()
        };
        config.validate().unwrap();
        let mut engine = HeatmapEngine::new(&config).unwrap();
        engine
            .process_tick(FrameTick::new(
                1,
                vec![person_at(8, 8)],
                Frame::filled_rgb(16, 16, [0, 0, 0], 0),
            ))
            .unwrap();
        assert!(engine.grid().values().all(|v| v == config.stamp_increment));
    }

    #[test]
    fn test_out_of_order_tick_rejected() {
        let mut engine = HeatmapEngine::new(&config(30)).unwrap();
        engine.process_tick(tick(5, vec![])).unwrap();
        let err = engine.process_tick(tick(5, vec![])).unwrap_err();
        assert_eq!(err, TickError::OutOfOrder { previous: 5, got: 5 });
        let err = engine.process_tick(tick(3, vec![])).unwrap_err();
        assert_eq!(err, TickError::OutOfOrder { previous: 5, got: 3 });
        assert!(engine.process_tick(tick(7, vec![])).is_ok());
    }

    #[test]
    fn test_terminate_discards_grid_and_rejects_ticks() {
        let mut engine = HeatmapEngine::new(&config(30)).unwrap();
        engine.process_tick(tick(1, vec![person_at(10, 10)])).unwrap();
        engine.terminate();
        assert_eq!(engine.state(), StreamState::Terminated);
        assert!(engine.grid().is_zero());
        assert_eq!(
            engine.process_tick(tick(2, vec![])).unwrap_err(),
            TickError::Terminated
        );
    }
}
