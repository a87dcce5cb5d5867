use ndarray::Array2;

/// Decaying per-pixel intensity counts, indexed `[[y, x]]`.
///
/// Cells are `u16` and every mutation saturates, so values stay in
/// `0..=u16::MAX` regardless of how long a hot spot is observed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DensityGrid {
    cells: Array2<u16>,
}

impl DensityGrid {
    /// Zero-filled grid. Dimensions are validated by the caller.
    pub fn zeros(width: u32, height: u32) -> Self {
        Self {
            cells: Array2::zeros((height as usize, width as usize)),
        }
    }

    pub fn width(&self) -> u32 {
        self.cells.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.cells.nrows() as u32
    }

    pub fn get(&self, x: u32, y: u32) -> u16 {
        self.cells[[y as usize, x as usize]]
    }

    pub fn set(&mut self, x: u32, y: u32, value: u16) {
        self.cells[[y as usize, x as usize]] = value;
    }

    /// Row-major cell values.
    pub fn values(&self) -> impl Iterator<Item = u16> + '_ {
        self.cells.iter().copied()
    }

    pub fn max_value(&self) -> u16 {
        self.values().max().unwrap_or(0)
    }

    pub fn is_zero(&self) -> bool {
        self.values().all(|v| v == 0)
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Subtracts `amount` from every cell, clamping at zero.
    pub fn saturating_sub_all(&mut self, amount: u16) {
        if amount == 0 {
            return;
        }
        self.cells.mapv_inplace(|v| v.saturating_sub(amount));
    }

    /// Adds `increment` to every in-bounds cell whose centre lies within
    /// `radius` of `(cx, cy)`. Only the disc's bounding box is visited.
    pub fn stamp_disc(&mut self, cx: i32, cy: i32, radius: u32, increment: u16) {
        if increment == 0 {
            return;
        }
        let r = i64::from(radius);
        let (cx, cy) = (i64::from(cx), i64::from(cy));
        let x0 = (cx - r).max(0);
        let y0 = (cy - r).max(0);
        let x1 = (cx + r).min(i64::from(self.width()) - 1);
        let y1 = (cy + r).min(i64::from(self.height()) - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }

        // Squares of a u32 radius and of offsets from an i32 centre exceed
        // i64, so distances are compared in i128.
        let r_sq = i128::from(r) * i128::from(r);
        for y in y0..=y1 {
            let dy = i128::from(y - cy);
            let dy_sq = dy * dy;
            for x in x0..=x1 {
                let dx = i128::from(x - cx);
                if dx * dx + dy_sq <= r_sq {
                    let cell = &mut self.cells[[y as usize, x as usize]];
                    *cell = cell.saturating_add(increment);
                }
            }
        }
    }
}
