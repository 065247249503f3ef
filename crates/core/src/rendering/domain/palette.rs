use std::fmt;
use std::str::FromStr;

/// Colour scheme for rendered depth.
///
/// `Gray` replicates intensity into all three channels; the rest map
/// intensity through a fixed 256-entry table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Palette {
    Gray,
    Inferno,
    Magma,
    Plasma,
    Viridis,
    Jet,
    Turbo,
    Hot,
    Bone,
}

/// Palette used when a requested name is not recognized.
pub const DEFAULT_PALETTE: Palette = Palette::Inferno;

pub const PALETTE_NAMES: &[&str] = &[
    "gray", "inferno", "magma", "plasma", "viridis", "jet", "turbo", "hot", "bone",
];

impl Palette {
    /// Lenient lookup: unknown names fall back to [`DEFAULT_PALETTE`].
    pub fn from_name(name: &str) -> Palette {
        name.parse().unwrap_or_else(|_| {
            log::warn!("Unknown palette '{name}', using {DEFAULT_PALETTE}");
            DEFAULT_PALETTE
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Gray => "gray",
            Self::Inferno => "inferno",
            Self::Magma => "magma",
            Self::Plasma => "plasma",
            Self::Viridis => "viridis",
            Self::Jet => "jet",
            Self::Turbo => "turbo",
            Self::Hot => "hot",
            Self::Bone => "bone",
        }
    }

    /// Builds the intensity -> RGB lookup table.
    pub fn lut(&self) -> Vec<[u8; 3]> {
        (0..256)
            .map(|i| {
                let t = i as f32 / 255.0;
                match self {
                    Self::Gray => [i as u8; 3],
                    Self::Inferno => from_anchors(&INFERNO, t),
                    Self::Magma => from_anchors(&MAGMA, t),
                    Self::Plasma => from_anchors(&PLASMA, t),
                    Self::Viridis => from_anchors(&VIRIDIS, t),
                    Self::Jet => to_rgb(jet(t)),
                    Self::Turbo => to_rgb(turbo(t)),
                    Self::Hot => to_rgb(hot(t)),
                    Self::Bone => to_rgb(bone(t)),
                }
            })
            .collect()
    }
}

impl FromStr for Palette {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gray" | "grey" => Ok(Self::Gray),
            "inferno" => Ok(Self::Inferno),
            "magma" => Ok(Self::Magma),
            "plasma" => Ok(Self::Plasma),
            "viridis" => Ok(Self::Viridis),
            "jet" => Ok(Self::Jet),
            "turbo" => Ok(Self::Turbo),
            "hot" => Ok(Self::Hot),
            "bone" => Ok(Self::Bone),
            other => Err(format!("unknown palette '{other}'")),
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Perceptually uniform maps sampled at t = 0, 0.25, 0.5, 0.75, 1.
const INFERNO: [[f32; 3]; 5] = [
    [0.0, 0.0, 4.0],
    [87.0, 16.0, 110.0],
    [188.0, 55.0, 84.0],
    [249.0, 142.0, 9.0],
    [252.0, 255.0, 164.0],
];
const MAGMA: [[f32; 3]; 5] = [
    [0.0, 0.0, 4.0],
    [81.0, 18.0, 124.0],
    [183.0, 55.0, 121.0],
    [252.0, 137.0, 97.0],
    [252.0, 253.0, 191.0],
];
const PLASMA: [[f32; 3]; 5] = [
    [13.0, 8.0, 135.0],
    [126.0, 3.0, 168.0],
    [204.0, 71.0, 120.0],
    [248.0, 149.0, 64.0],
    [240.0, 249.0, 33.0],
];
const VIRIDIS: [[f32; 3]; 5] = [
    [68.0, 1.0, 84.0],
    [59.0, 82.0, 139.0],
    [33.0, 145.0, 140.0],
    [94.0, 201.0, 98.0],
    [253.0, 231.0, 37.0],
];

fn from_anchors(anchors: &[[f32; 3]], t: f32) -> [u8; 3] {
    let segments = (anchors.len() - 1) as f32;
    let pos = t.clamp(0.0, 1.0) * segments;
    let lo = (pos.floor() as usize).min(anchors.len() - 2);
    let frac = pos - lo as f32;
    let mut rgb = [0u8; 3];
    for c in 0..3 {
        let v = anchors[lo][c] + (anchors[lo + 1][c] - anchors[lo][c]) * frac;
        rgb[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    rgb
}

fn to_rgb(unit: [f32; 3]) -> [u8; 3] {
    unit.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn jet(t: f32) -> [f32; 3] {
    let band = |center: f32| 1.5 - (4.0 * t - center).abs();
    [band(3.0), band(2.0), band(1.0)]
}

/// Polynomial fit of Google's Turbo colormap.
fn turbo(t: f32) -> [f32; 3] {
    let r = 0.135_721_38
        + t * (4.615_392_6 + t * (-42.660_324 + t * (132.131_08 + t * (-152.942_4 + t * 59.286_38))));
    let g = 0.091_402_61
        + t * (2.194_188_4 + t * (4.842_966_6 + t * (-14.185_033 + t * (4.277_298_5 + t * 2.829_566))));
    let b = 0.106_673_3
        + t * (12.641_946 + t * (-60.582_05 + t * (110.362_77 + t * (-89.903_11 + t * 27.348_25))));
    [r, g, b]
}

fn hot(t: f32) -> [f32; 3] {
    [3.0 * t, 3.0 * t - 1.0, 3.0 * t - 2.0]
}

fn bone(t: f32) -> [f32; 3] {
    let [hr, hg, hb] = hot(t).map(|v| v.clamp(0.0, 1.0));
    [(7.0 * t + hb) / 8.0, (7.0 * t + hg) / 8.0, (7.0 * t + hr) / 8.0]
}
