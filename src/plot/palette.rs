//! Cubehelix colour palette.

use std::f64::consts::PI;

use plotters::style::RGBColor;

// matplotlib's default cubehelix parameters.
const START: f64 = 0.5;
const ROTATIONS: f64 = -1.5;
const HUE: f64 = 1.0;
const GAMMA: f64 = 1.0;

/// `n` colours sampled evenly from the cubehelix map, skipping both ends.
///
/// At least one colour is always returned.
pub fn color_palette(n: usize) -> Vec<RGBColor> {
    let n = n.max(1);
    (1..=n)
        .map(|i| cubehelix(i as f64 / (n + 1) as f64))
        .collect()
}

fn cubehelix(x: f64) -> RGBColor {
    let xg = x.powf(GAMMA);
    let amplitude = HUE * xg * (1.0 - xg) / 2.0;
    let phi = 2.0 * PI * (START / 3.0 + ROTATIONS * x);

    let channel = |p0: f64, p1: f64| {
        let v = xg + amplitude * (p0 * phi.cos() + p1 * phi.sin());
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    RGBColor(
        channel(-0.14861, 1.78277),
        channel(-0.29227, -0.90649),
        channel(1.97294, 0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_size() {
        assert_eq!(color_palette(0).len(), 1);
        assert_eq!(color_palette(5).len(), 5);
    }

    #[test]
    fn test_palette_goes_dark_to_light() {
        let brightness = |c: &RGBColor| c.0 as u32 + c.1 as u32 + c.2 as u32;
        let colors = color_palette(4);
        assert!(brightness(&colors[0]) < brightness(&colors[3]));
    }

    #[test]
    fn test_map_ends() {
        assert_eq!(cubehelix(0.0), RGBColor(0, 0, 0));
        assert_eq!(cubehelix(1.0), RGBColor(255, 255, 255));
    }
}
