use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

// ---------------------------------------------------------------------------
// Theme – accent hue used by every chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Blue,
    Green,
    Purple,
    Gray,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Blue, Theme::Green, Theme::Purple, Theme::Gray];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Blue => "blue",
            Theme::Green => "green",
            Theme::Purple => "purple",
            Theme::Gray => "gray",
        }
    }

    fn hue(self) -> f32 {
        match self {
            Theme::Blue => 215.0,
            Theme::Green => 140.0,
            Theme::Purple => 275.0,
            Theme::Gray => 215.0,
        }
    }

    fn saturation(self) -> f32 {
        match self {
            Theme::Gray => 0.05,
            _ => 0.7,
        }
    }

    /// Main series colour.
    pub fn accent(self) -> Color32 {
        to_color32(Hsl::new(self.hue(), self.saturation(), 0.45))
    }

    /// Colour for survivors in two-outcome charts.
    pub fn survived(self) -> Color32 {
        self.accent()
    }

    /// Colour for non-survivors: the accent's complement, muted.
    pub fn died(self) -> Color32 {
        to_color32(Hsl::new(
            (self.hue() + 180.0) % 360.0,
            self.saturation().max(0.4),
            0.55,
        ))
    }

    /// Heatmap fill for a rate in `[0, 1]`: pale at 0, the accent at 1.
    pub fn heat(self, rate: f64) -> Color32 {
        let low = Hsl::new(self.hue(), self.saturation() * 0.4, 0.95);
        let high = Hsl::new(self.hue(), self.saturation(), 0.35);
        to_color32(low.mix(high, rate.clamp(0.0, 1.0) as f32))
    }

    /// Readable label colour on top of [`Theme::heat`].
    pub fn heat_text(self, rate: f64) -> Color32 {
        if rate > 0.55 {
            Color32::WHITE
        } else {
            Color32::BLACK
        }
    }

    /// `n` distinct colours rotating around the theme hue.
    pub fn palette(self, n: usize) -> Vec<Color32> {
        if n == 0 {
            return Vec::new();
        }
        (0..n)
            .map(|i| {
                let hue = self.hue() + (i as f32 / n as f32) * 360.0;
                to_color32(Hsl::new(hue % 360.0, self.saturation().max(0.3), 0.55))
            })
            .collect()
    }
}

fn to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(Theme::Green.palette(0).is_empty());
        let colors = Theme::Blue.palette(3);
        assert_eq!(colors.len(), 3);
        assert_ne!(colors[0], colors[1]);
    }

    #[test]
    fn heat_runs_from_pale_to_dark() {
        let lum = |c: Color32| c.r() as u32 + c.g() as u32 + c.b() as u32;
        let theme = Theme::Purple;
        assert!(lum(theme.heat(0.0)) > lum(theme.heat(0.5)));
        assert!(lum(theme.heat(0.5)) > lum(theme.heat(1.0)));
        assert_eq!(theme.heat(2.0), theme.heat(1.0));
    }
}
