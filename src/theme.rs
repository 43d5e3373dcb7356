//! Display themes and the materials derived from them.

/// A linear RGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Creates a color from `0xRRGGBB`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }

    /// Packs the color back into `0xRRGGBB`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_hex(self) -> u32 {
        let channel = |v: f32| u32::from((v.clamp(0.0, 1.0) * 255.0).round() as u8);
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }
}

/// Light or dark display theme, supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayTheme {
    pub is_dark: bool,
}

impl DisplayTheme {
    pub const LIGHT: Self = Self { is_dark: false };
    pub const DARK: Self = Self { is_dark: true };

    /// Returns the fixed palette for this theme.
    #[must_use]
    pub fn palette(self) -> Palette {
        if self.is_dark {
            Palette {
                background: Color::from_hex(0x00_0000),
                curve: Color::from_hex(0x60_a5fa),
                curve_opacity: 1.0,
                grid: Color::from_hex(0x33_3333),
                grid_center: Color::from_hex(0x55_5555),
                grid_opacity: 0.2,
                axes: [
                    Color::from_hex(0xff_4d4d),
                    Color::from_hex(0x4d_ff4d),
                    Color::from_hex(0x4d_7dff),
                ],
                ambient_intensity: 0.6,
            }
        } else {
            Palette {
                background: Color::from_hex(0xf8_f9fa),
                curve: Color::from_hex(0x3b_82f6),
                curve_opacity: 1.0,
                grid: Color::from_hex(0xcc_cccc),
                grid_center: Color::from_hex(0x99_9999),
                grid_opacity: 0.2,
                axes: [
                    Color::from_hex(0xff_0000),
                    Color::from_hex(0x00_ff00),
                    Color::from_hex(0x00_00ff),
                ],
                ambient_intensity: 0.8,
            }
        }
    }
}

/// Every color the scene takes from a theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub curve: Color,
    pub curve_opacity: f32,
    pub grid: Color,
    pub grid_center: Color,
    pub grid_opacity: f32,
    /// X, Y and Z axis colors.
    pub axes: [Color; 3],
    pub ambient_intensity: f32,
}

/// How a material responds to scene lighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shading {
    /// Flat color, no lighting. Used for lines.
    Unlit,
    /// Lit surface with simple PBR parameters. Used for tube meshes.
    Lit { roughness: f32, metalness: f32 },
}

/// Surface appearance of a renderable object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    pub shading: Shading,
}

impl Material {
    /// Flat line material.
    #[must_use]
    pub fn line(color: Color, opacity: f32) -> Self {
        Self {
            color,
            opacity,
            shading: Shading::Unlit,
        }
    }

    /// Lit surface material.
    #[must_use]
    pub fn surface(color: Color, opacity: f32) -> Self {
        Self {
            color,
            opacity,
            shading: Shading::Lit {
                roughness: 0.4,
                metalness: 0.1,
            },
        }
    }

    /// Returns `true` if the material needs blending.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }

    /// Returns a copy with a different base color and opacity.
    #[must_use]
    pub fn recolored(self, color: Color, opacity: f32) -> Self {
        Self {
            color,
            opacity,
            ..self
        }
    }
}
