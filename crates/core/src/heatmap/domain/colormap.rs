use serde::{Deserialize, Serialize};

/// Fixed intensity → colour gradients. Chosen once per stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    /// Dark blue → blue → cyan → yellow → red → dark red.
    #[default]
    Jet,
    /// Black → red → yellow → white.
    Hot,
}

impl Colormap {
    /// Builds the 256-entry RGB lookup table for this gradient.
    pub fn lut(self) -> [[u8; 3]; 256] {
        let mut lut = [[0u8; 3]; 256];
        for (i, entry) in lut.iter_mut().enumerate() {
            let t = i as f32 / 255.0;
            let (r, g, b) = match self {
                Colormap::Jet => (
                    ramp(1.5 - (4.0 * t - 3.0).abs()),
                    ramp(1.5 - (4.0 * t - 2.0).abs()),
                    ramp(1.5 - (4.0 * t - 1.0).abs()),
                ),
                Colormap::Hot => (ramp(3.0 * t), ramp(3.0 * t - 1.0), ramp(3.0 * t - 2.0)),
            };
            *entry = [to_byte(r), to_byte(g), to_byte(b)];
        }
        lut
    }
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Colormap::Jet => write!(f, "jet"),
            Colormap::Hot => write!(f, "hot"),
        }
    }
}

impl std::str::FromStr for Colormap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jet" => Ok(Colormap::Jet),
            "hot" => Ok(Colormap::Hot),
            other => Err(format!("Colormap must be 'jet' or 'hot', got '{other}'")),
        }
    }
}

fn ramp(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

fn to_byte(v: f32) -> u8 {
    (v * 255.0).round() as u8
}
