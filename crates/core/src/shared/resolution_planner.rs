use std::fmt;
use std::str::FromStr;

use super::error::DepthVizError;

/// Requested output height: a pixel cap, or the source's own height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetHeight {
    Native,
    Pixels(u32),
}

impl FromStr for TargetHeight {
    type Err = String;

    /// Accepts `native`, `480` or `480p`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "native" {
            return Ok(Self::Native);
        }
        let digits = s.strip_suffix('p').unwrap_or(&s);
        match digits.parse::<u32>() {
            Ok(0) | Err(_) => Err(format!(
                "resolution must be 'native' or a positive pixel height, got '{s}'"
            )),
            Ok(px) => Ok(Self::Pixels(px)),
        }
    }
}

impl fmt::Display for TargetHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Pixels(px) => write!(f, "{px}p"),
        }
    }
}

/// Computes output dimensions for a source raster.
///
/// Never upscales: a target at or above the source height returns the source
/// dimensions unchanged. Downscaling keeps the aspect ratio (floored) and
/// forces an even width for 4:2:0 chroma subsampling. A downscale that
/// leaves no even width of at least 2 is rejected as `InvalidDimensions`.
pub fn plan(source_w: u32, source_h: u32, target_height: u32) -> Result<(u32, u32), DepthVizError> {
    if source_w == 0 || source_h == 0 {
        return Err(DepthVizError::InvalidDimensions {
            width: source_w,
            height: source_h,
        });
    }
    if target_height >= source_h {
        return Ok((source_w, source_h));
    }

    let mut out_w = (source_w as u64 * target_height as u64 / source_h as u64) as u32;
    if out_w % 2 != 0 {
        out_w -= 1;
    }
    // Sources too narrow for the requested height would floor to zero width.
    if out_w == 0 {
        return Err(DepthVizError::InvalidDimensions {
            width: source_w,
            height: source_h,
        });
    }
    Ok((out_w, target_height))
}

/// [`plan`] with the `native` sentinel resolved to the source height.
pub fn plan_for(
    source_w: u32,
    source_h: u32,
    target: TargetHeight,
) -> Result<(u32, u32), DepthVizError> {
    match target {
        TargetHeight::Native => plan(source_w, source_h, source_h),
        TargetHeight::Pixels(px) => plan(source_w, source_h, px),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(640, 360, 180, (320, 180))]
    #[case(1920, 1080, 480, (852, 480))]
    #[case(1920, 1080, 720, (1280, 720))]
    #[case(1280, 720, 360, (640, 360))]
    #[case(1000, 700, 350, (500, 350))]
    #[case(1001, 999, 333, (332, 333))]
    fn test_downscale(#[case] w: u32, #[case] h: u32, #[case] target: u32, #[case] expected: (u32, u32)) {
        assert_eq!(plan(w, h, target).unwrap(), expected);
    }

    #[rstest]
    #[case(640, 360, 360)]
    #[case(640, 360, 480)]
    #[case(641, 361, 4320)]
    fn test_never_upscales(#[case] w: u32, #[case] h: u32, #[case] target: u32) {
        assert_eq!(plan(w, h, target).unwrap(), (w, h));
    }

    #[test]
    fn test_width_even_and_height_matches_for_downscales() {
        for (w, h) in [(640u32, 360u32), (1919, 1079), (333, 777), (4096, 2160), (3, 1000)] {
            for target in [1u32, 2, 7, 99, 180, 479, 480, 720, 1080, 5000] {
                match plan(w, h, target) {
                    Ok((out_w, out_h)) if target < h => {
                        assert!(out_w > 0, "{w}x{h} -> {target}");
                        assert_eq!(out_w % 2, 0, "{w}x{h} -> {target}");
                        assert_eq!(out_h, target);
                    }
                    Ok(dims) => assert_eq!(dims, (w, h)),
                    Err(e) => {
                        assert!(target < h, "{w}x{h} -> {target}");
                        assert!(matches!(e, DepthVizError::InvalidDimensions { .. }));
                    }
                }
            }
        }
    }

    #[test]
    fn test_zero_height_is_rejected() {
        assert!(matches!(
            plan(640, 0, 180),
            Err(DepthVizError::InvalidDimensions { width: 640, height: 0 })
        ));
    }

    #[rstest]
    #[case(1, 1000, 480)]
    #[case(3, 1000, 300)]
    #[case(2, 1080, 480)]
    fn test_sliver_sources_are_rejected(#[case] w: u32, #[case] h: u32, #[case] target: u32) {
        assert!(matches!(
            plan(w, h, target),
            Err(DepthVizError::InvalidDimensions { width, height }) if width == w && height == h
        ));
    }

    #[test]
    fn test_narrow_source_keeps_minimum_even_width() {
        assert_eq!(plan(5, 1000, 500).unwrap(), (2, 500));
    }

    #[test]
    fn test_zero_width_is_rejected() {
        assert!(plan(0, 360, 180).is_err());
    }

    #[test]
    fn test_native_returns_source() {
        assert_eq!(plan_for(641, 361, TargetHeight::Native).unwrap(), (641, 361));
        assert_eq!(
            plan_for(640, 360, TargetHeight::Pixels(180)).unwrap(),
            (320, 180)
        );
    }

    #[rstest]
    #[case("native", TargetHeight::Native)]
    #[case("Native", TargetHeight::Native)]
    #[case("480", TargetHeight::Pixels(480))]
    #[case("720p", TargetHeight::Pixels(720))]
    fn test_parse_target_height(#[case] input: &str, #[case] expected: TargetHeight) {
        assert_eq!(input.parse::<TargetHeight>().unwrap(), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("p")]
    #[case("-5")]
    #[case("hd")]
    fn test_parse_target_height_rejects(#[case] input: &str) {
        assert!(input.parse::<TargetHeight>().is_err());
    }

    #[test]
    fn test_display_round_trips_label() {
        assert_eq!(TargetHeight::Pixels(480).to_string(), "480p");
        assert_eq!(TargetHeight::Native.to_string(), "native");
    }
}
