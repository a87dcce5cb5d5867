use std::sync::{Mutex, PoisonError};

use crate::heatmap::domain::density_grid::DensityGrid;
use crate::heatmap::domain::ground_point::GroundPoint;
use crate::shared::heatmap_config::{ConfigError, HeatmapConfig};

/// Stamp geometry and fade rate applied to the grid every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccumulatorParams {
    pub decay_constant: u16,
    pub stamp_radius: u32,
    pub stamp_increment: u16,
}

impl From<&HeatmapConfig> for AccumulatorParams {
    fn from(config: &HeatmapConfig) -> Self {
        Self {
            decay_constant: config.decay_constant,
            stamp_radius: config.stamp_radius,
            stamp_increment: config.stamp_increment,
        }
    }
}

/// Sole owner of a stream's [`DensityGrid`].
///
/// Each tick must call [`decay`](Self::decay) and then
/// [`accumulate`](Self::accumulate), in that order; [`apply`](Self::apply)
/// does both.
#[derive(Debug)]
pub struct DensityAccumulator {
    grid: DensityGrid,
    params: AccumulatorParams,
}

impl DensityAccumulator {
    pub fn new(width: u32, height: u32, params: AccumulatorParams) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidGridDimensions { width, height });
        }
        Ok(Self {
            grid: DensityGrid::zeros(width, height),
            params,
        })
    }

    pub fn from_config(config: &HeatmapConfig) -> Result<Self, ConfigError> {
        Self::new(config.grid_width, config.grid_height, config.into())
    }

    pub fn grid(&self) -> &DensityGrid {
        &self.grid
    }

    pub fn params(&self) -> AccumulatorParams {
        self.params
    }

    pub fn decay(&mut self) {
        self.grid.saturating_sub_all(self.params.decay_constant);
    }

    /// Stamps a filled disc at every point. Saturating addition of
    /// non-negative increments keeps the result independent of point order.
    pub fn accumulate(&mut self, points: &[GroundPoint]) {
        for p in points {
            self.grid
                .stamp_disc(p.x, p.y, self.params.stamp_radius, self.params.stamp_increment);
        }
    }

    pub fn apply(&mut self, points: &[GroundPoint]) {
        self.decay();
        self.accumulate(points);
    }

    /// Copy of the grid as it stands between ticks.
    pub fn snapshot(&self) -> DensityGrid {
        self.grid.clone()
    }

    pub fn reset(&mut self) {
        self.grid.clear();
    }
}

/// Mutex-guarded accumulator for hosts that deliver ticks from more than
/// one thread. Every mutation and snapshot takes the same lock, so readers
/// never observe a half-applied tick.
#[derive(Debug)]
pub struct SharedDensityAccumulator {
    inner: Mutex<DensityAccumulator>,
}

impl SharedDensityAccumulator {
    pub fn new(accumulator: DensityAccumulator) -> Self {
        Self {
            inner: Mutex::new(accumulator),
        }
    }

    pub fn apply(&self, points: &[GroundPoint]) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(points);
    }

    pub fn decay(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .decay();
    }

    pub fn snapshot(&self) -> DensityGrid {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    pub fn into_inner(self) -> DensityAccumulator {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn params(decay: u16, radius: u32, increment: u16) -> AccumulatorParams {
        AccumulatorParams {
            decay_constant: decay,
            stamp_radius: radius,
            stamp_increment: increment,
        }
    }

    fn point(x: i32, y: i32) -> GroundPoint {
        GroundPoint { x, y }
    }

    fn distance_sq(x: u32, y: u32, cx: i32, cy: i32) -> i64 {
        let dx = i64::from(x) - i64::from(cx);
        let dy = i64::from(y) - i64::from(cy);
        dx * dx + dy * dy
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(DensityAccumulator::new(0, 10, params(1, 1, 1)).is_err());
        assert!(DensityAccumulator::new(10, 0, params(1, 1, 1)).is_err());
    }

    #[test]
    fn test_empty_tick_keeps_zero_grid() {
        let mut acc = DensityAccumulator::new(64, 48, params(1, 10, 5)).unwrap();
        acc.apply(&[]);
        assert!(acc.grid().is_zero());
    }

    #[test]
    fn test_decay_clamps_every_cell() {
        let mut acc = DensityAccumulator::new(8, 8, params(3, 2, 2)).unwrap();
        acc.accumulate(&[point(2, 2), point(3, 3)]);
        let prior = acc.snapshot();

        acc.decay();

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(acc.grid().get(x, y), prior.get(x, y).saturating_sub(3));
            }
        }
    }

    #[test]
    fn test_stamp_at_bottom_edge_of_full_resolution_grid() {
        let mut acc = DensityAccumulator::new(1280, 780, params(1, 10, 5)).unwrap();
        acc.accumulate(&[point(640, 780)]);

        for y in 760..780 {
            for x in 620..=660 {
                let expected = if distance_sq(x, y, 640, 780) <= 100 { 5 } else { 0 };
                assert_eq!(acc.grid().get(x, y), expected, "cell ({x}, {y})");
            }
        }
        assert_eq!(acc.grid().get(640, 779), 5);
        assert_eq!(acc.grid().get(640, 770), 5);
        assert_eq!(acc.grid().get(640, 769), 0);
        assert_eq!(acc.grid().get(650, 779), 0);
        assert_eq!(acc.grid().max_value(), 5);
        let stamped = acc.grid().values().filter(|&v| v > 0).count();
        let expected_cells = (0..780u32)
            .flat_map(|y| (0..1280u32).map(move |x| (x, y)))
            .filter(|&(x, y)| distance_sq(x, y, 640, 780) <= 100)
            .count();
        assert_eq!(stamped, expected_cells);
    }

    #[test]
    fn test_stamp_fades_to_zero_and_stays_there() {
        let mut acc = DensityAccumulator::new(1280, 780, params(1, 10, 5)).unwrap();
        acc.accumulate(&[point(640, 780)]);

        for tick in 1..=5 {
            acc.apply(&[]);
            let expected = 5 - tick;
            assert_eq!(acc.grid().get(640, 779), expected);
        }
        assert!(acc.grid().is_zero());

        acc.apply(&[]);
        acc.apply(&[]);
        assert!(acc.grid().is_zero());
    }

    #[test]
    fn test_accumulation_order_does_not_matter() {
        let points = vec![point(10, 10), point(14, 12), point(12, 9), point(11, 15)];
        let mut forward = DensityAccumulator::new(32, 32, params(0, 4, 3)).unwrap();
        let mut reversed = DensityAccumulator::new(32, 32, params(0, 4, 3)).unwrap();

        forward.accumulate(&points);
        let mut rev = points.clone();
        rev.reverse();
        reversed.accumulate(&rev);

        assert_eq!(forward.grid(), reversed.grid());
    }

    #[test]
    fn test_overlapping_stamps_add_up() {
        let mut acc = DensityAccumulator::new(16, 16, params(0, 1, 5)).unwrap();
        acc.accumulate(&[point(5, 5), point(5, 5), point(6, 5)]);
        // (5,5) and (6,5) lie inside all three discs.
        assert_eq!(acc.grid().get(5, 5), 15);
        assert_eq!(acc.grid().get(6, 5), 15);
        // (4,5) only sees the two stamps at (5,5); (7,5) only the one at (6,5).
        assert_eq!(acc.grid().get(4, 5), 10);
        assert_eq!(acc.grid().get(7, 5), 5);
    }

    #[test]
    fn test_order_independent_even_when_saturating() {
        let mut a = DensityAccumulator::new(4, 4, params(0, 0, u16::MAX / 2 + 1)).unwrap();
        let mut b = DensityAccumulator::new(4, 4, params(0, 0, u16::MAX / 2 + 1)).unwrap();
        a.accumulate(&[point(1, 1), point(1, 1), point(2, 2)]);
        b.accumulate(&[point(2, 2), point(1, 1), point(1, 1)]);
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.grid().get(1, 1), u16::MAX);
    }

    #[test]
    fn test_decay_runs_before_accumulate() {
        let mut acc = DensityAccumulator::new(4, 4, params(2, 0, 5)).unwrap();
        acc.apply(&[point(1, 1)]);
        // A fresh stamp is not decayed within its own tick.
        assert_eq!(acc.grid().get(1, 1), 5);
        acc.apply(&[point(1, 1)]);
        assert_eq!(acc.grid().get(1, 1), 8);
    }

    #[test]
    fn test_reset_clears_grid() {
        let mut acc = DensityAccumulator::new(8, 8, params(0, 2, 9)).unwrap();
        acc.accumulate(&[point(4, 4)]);
        acc.reset();
        assert!(acc.grid().is_zero());
        assert_eq!(acc.grid().width(), 8);
    }

    #[test]
    fn test_from_config_uses_config_values() {
        let config = HeatmapConfig {
            grid_width: 20,
            grid_height: 10,
            decay_constant: 4,
            stamp_radius: 2,
            stamp_increment: 7,
            ..HeatmapConfig::default()
        };
        let acc = DensityAccumulator::from_config(&config).unwrap();
        assert_eq!(acc.grid().width(), 20);
        assert_eq!(acc.grid().height(), 10);
        assert_eq!(acc.params(), params(4, 2, 7));
    }

    #[test]
    fn test_shared_accumulator_serialises_concurrent_ticks() {
        let acc = DensityAccumulator::new(32, 32, params(0, 2, 1)).unwrap();
        let shared = Arc::new(SharedDensityAccumulator::new(acc));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        shared.apply(&[point(16, 16)]);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(shared.snapshot().get(16, 16), 200);
        let acc = Arc::try_unwrap(shared).unwrap().into_inner();
        assert_eq!(acc.grid().get(16, 18), 200);
        assert_eq!(acc.grid().get(16, 19), 0);
    }

    #[test]
    fn test_shared_snapshot_is_detached_copy() {
        let acc = DensityAccumulator::new(8, 8, params(1, 0, 3)).unwrap();
        let shared = SharedDensityAccumulator::new(acc);
        shared.apply(&[point(3, 3)]);
        let snap = shared.snapshot();
        shared.decay();
        assert_eq!(snap.get(3, 3), 3);
        assert_eq!(shared.snapshot().get(3, 3), 2);
    }
}
