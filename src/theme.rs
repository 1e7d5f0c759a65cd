use egui::Color32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorScheme {
    Dark,
    Light,
}

impl From<winit::window::Theme> for ColorScheme {
    fn from(theme: winit::window::Theme) -> Self {
        match theme {
            winit::window::Theme::Dark => ColorScheme::Dark,
            winit::window::Theme::Light => ColorScheme::Light,
        }
    }
}

/// Colours the page is painted with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub background: Color32,
    pub surface: Color32,
    pub text: Color32,
    pub muted: Color32,
    pub primary: Color32,
    pub secondary: Color32,
    pub success: Color32,
    pub error: Color32,
}

impl ColorScheme {
    pub fn theme_color(self) -> &'static str {
        match self {
            ColorScheme::Dark => "#0f172a",
            ColorScheme::Light => "#ffffff",
        }
    }

    pub fn palette(self) -> Palette {
        let shared = |background, surface, text, muted| Palette {
            background,
            surface,
            text,
            muted,
            primary: Color32::from_rgb(99, 102, 241),
            secondary: Color32::from_rgb(118, 75, 162),
            success: Color32::from_rgb(16, 185, 129),
            error: Color32::from_rgb(239, 68, 68),
        };

        match self {
            ColorScheme::Dark => shared(
                Color32::from_rgb(15, 23, 42),
                Color32::from_rgb(30, 41, 59),
                Color32::from_rgb(241, 245, 249),
                Color32::from_rgb(148, 163, 184),
            ),
            ColorScheme::Light => shared(
                Color32::from_rgb(255, 255, 255),
                Color32::from_rgb(241, 245, 249),
                Color32::from_rgb(15, 23, 42),
                Color32::from_rgb(71, 85, 105),
            ),
        }
    }

    pub fn visuals(self) -> egui::Visuals {
        let palette = self.palette();
        let mut visuals = match self {
            ColorScheme::Dark => egui::Visuals::dark(),
            ColorScheme::Light => egui::Visuals::light(),
        };
        visuals.panel_fill = palette.background;
        visuals.window_fill = palette.surface;
        visuals.selection.bg_fill = palette.primary;
        visuals
    }

    /// Clear colour for the frame, matching the page background on either
    /// kind of surface.
    pub fn clear_color(self, srgb_surface: bool) -> wgpu::Color {
        let background = self.palette().background;
        let [r, g, b] = if srgb_surface {
            let linear = egui::Rgba::from(background);
            [linear.r(), linear.g(), linear.b()]
        } else {
            [background.r(), background.g(), background.b()].map(|c| c as f32 / 255.0)
        };

        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }
}
