use crate::math::{Point3, Vector3};
use crate::theme::{Color, Material, Palette};

/// One separately colored part of the scene's reference helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperPart {
    Grid,
    GridCenter,
    AxisX,
    AxisY,
    AxisZ,
}

impl HelperPart {
    /// Returns the material this part uses under `palette`.
    #[must_use]
    pub fn material(self, palette: &Palette) -> Material {
        match self {
            Self::Grid => Material::line(palette.grid, palette.grid_opacity),
            Self::GridCenter => Material::line(palette.grid_center, palette.grid_opacity),
            Self::AxisX => Material::line(palette.axes[0], 1.0),
            Self::AxisY => Material::line(palette.axes[1], 1.0),
            Self::AxisZ => Material::line(palette.axes[2], 1.0),
        }
    }
}

/// Square grid on the XZ plane, centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridHelper {
    pub size: f64,
    pub divisions: u32,
}

impl Default for GridHelper {
    fn default() -> Self {
        Self {
            size: 500.0,
            divisions: 100,
        }
    }
}

impl GridHelper {
    /// Returns `(regular, center)` line segments as point pairs.
    ///
    /// The two center lines are split out so they can take their own color.
    #[must_use]
    pub fn segments(&self) -> (Vec<Point3>, Vec<Point3>) {
        let half = self.size / 2.0;
        let step = self.size / f64::from(self.divisions);
        let center_index = self.divisions / 2;

        let mut regular = Vec::with_capacity(self.divisions as usize * 4);
        let mut center = Vec::with_capacity(4);
        for i in 0..=self.divisions {
            let k = -half + f64::from(i) * step;
            let lines = [
                Point3::new(-half, 0.0, k),
                Point3::new(half, 0.0, k),
                Point3::new(k, 0.0, -half),
                Point3::new(k, 0.0, half),
            ];
            if i == center_index {
                center.extend(lines);
            } else {
                regular.extend(lines);
            }
        }
        (regular, center)
    }
}

/// Three axis lines from the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxesHelper {
    pub size: f64,
}

impl Default for AxesHelper {
    fn default() -> Self {
        Self { size: 7.0 }
    }
}

impl AxesHelper {
    /// Returns the X, Y and Z segments.
    #[must_use]
    pub fn segments(&self) -> [(HelperPart, [Point3; 2]); 3] {
        let o = Point3::origin();
        [
            (HelperPart::AxisX, [o, Point3::new(self.size, 0.0, 0.0)]),
            (HelperPart::AxisY, [o, Point3::new(0.0, self.size, 0.0)]),
            (HelperPart::AxisZ, [o, Point3::new(0.0, 0.0, self.size)]),
        ]
    }
}

/// Returns every helper part with its line-segment vertices.
#[must_use]
pub fn helper_lines(grid: &GridHelper, axes: &AxesHelper) -> Vec<(HelperPart, Vec<Point3>)> {
    let (regular, center) = grid.segments();
    let mut parts = vec![(HelperPart::Grid, regular), (HelperPart::GridCenter, center)];
    parts.extend(axes.segments().map(|(part, seg)| (part, seg.to_vec())));
    parts
}

/// Kind of scene light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    /// Parallel light travelling along `direction`.
    Directional { direction: Vector3 },
}

/// A scene light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
}

/// Ambient fill plus one key light, tuned per palette.
#[must_use]
pub fn scene_lights(palette: &Palette) -> [Light; 2] {
    let white = Color::from_hex(0xff_ffff);
    [
        Light {
            kind: LightKind::Ambient,
            color: white,
            intensity: palette.ambient_intensity,
        },
        Light {
            kind: LightKind::Directional {
                direction: -Vector3::new(5.0, 10.0, 7.5).normalize(),
            },
            color: white,
            intensity: 0.8,
        },
    ]
}
