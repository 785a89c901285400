//! Table geometry
//!
//! Coordinates put the bottom-left cushion corner at the origin with the
//! table spanning `[0, width] x [0, height]`. Rails are the cushion lines;
//! a ball touches a rail when its center is one radius away from it.
//!
//! Pockets and jaws (the short angled rails flanking each pocket mouth) are
//! derived from a few canonical shapes in the bottom-left quarter, mirrored
//! across the table's vertical and horizontal center lines.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Raw table configuration, as loaded from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableGeometry {
    pub width: f64,
    pub height: f64,
    pub ball_radius: f64,
    /// Linear speed loss per second of rolling
    pub friction: f64,
    /// Fraction of the perpendicular velocity kept after a rail or jaw hit
    pub rail_restitution: f64,
    /// Fraction of the along-axis velocity passed on in a ball-ball hit
    pub ball_restitution: f64,
    /// Aiming half-width of a pocket mouth
    pub pocket_radius: f64,
    /// Rail length missing on each side of a corner pocket
    pub corner_gap: f64,
    /// Rail length missing on each side of a side pocket
    pub side_gap: f64,
    /// Slope of the corner jaws, measured against the rail they continue
    pub corner_slope: f64,
    /// Slope of the side jaws, measured against the rail they continue
    pub side_slope: f64,
    /// Capture reach of a corner pocket (ball center distance)
    pub corner_pocket_radius: f64,
    /// Capture reach of a side pocket (ball center distance)
    pub side_pocket_radius: f64,
    /// Distance a corner pocket center sits outside the cushion corner, along the diagonal
    pub corner_offset: f64,
    /// Distance a side pocket center sits outside its rail
    pub side_offset: f64,
}

impl Default for TableGeometry {
    fn default() -> Self {
        Self {
            width: 2.5,
            height: 1.25,
            ball_radius: 0.0285,
            friction: 0.1,
            rail_restitution: 0.8,
            ball_restitution: 0.95,
            pocket_radius: 0.04,
            corner_gap: 0.1,
            side_gap: 0.065,
            corner_slope: 1.0,
            side_slope: 2.0,
            corner_pocket_radius: 0.08,
            side_pocket_radius: 0.06,
            corner_offset: 0.02,
            side_offset: 0.01,
        }
    }
}

fn require(
    ok: bool,
    field: &'static str,
    value: f64,
    requirement: &'static str,
) -> SimResult<()> {
    if ok {
        Ok(())
    } else {
        Err(SimError::InvalidGeometry {
            field,
            value,
            requirement,
        })
    }
}

impl TableGeometry {
    /// Check every precondition the simulation relies on
    pub fn validate(&self) -> SimResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;
        let fraction = |v: f64| (0.0..=1.0).contains(&v);

        require(positive(self.width), "width", self.width, "finite and > 0")?;
        require(positive(self.height), "height", self.height, "finite and > 0")?;
        require(
            positive(self.ball_radius),
            "ball_radius",
            self.ball_radius,
            "finite and > 0",
        )?;
        require(
            2.0 * self.ball_radius < self.height.min(self.width),
            "ball_radius",
            self.ball_radius,
            "less than half the table's shorter side",
        )?;
        require(non_negative(self.friction), "friction", self.friction, ">= 0")?;
        require(
            fraction(self.rail_restitution),
            "rail_restitution",
            self.rail_restitution,
            "in [0, 1]",
        )?;
        require(
            fraction(self.ball_restitution),
            "ball_restitution",
            self.ball_restitution,
            "in [0, 1]",
        )?;
        require(
            positive(self.pocket_radius),
            "pocket_radius",
            self.pocket_radius,
            "finite and > 0",
        )?;
        require(
            positive(self.corner_pocket_radius),
            "corner_pocket_radius",
            self.corner_pocket_radius,
            "finite and > 0",
        )?;
        require(
            positive(self.side_pocket_radius),
            "side_pocket_radius",
            self.side_pocket_radius,
            "finite and > 0",
        )?;
        require(
            non_negative(self.corner_gap) && 2.0 * self.corner_gap < self.height,
            "corner_gap",
            self.corner_gap,
            ">= 0 and shorter than half the short rail",
        )?;
        require(
            non_negative(self.side_gap) && self.corner_gap + self.side_gap < self.width / 2.0,
            "side_gap",
            self.side_gap,
            ">= 0 and leaving some long rail between pockets",
        )?;
        require(
            non_negative(self.corner_slope),
            "corner_slope",
            self.corner_slope,
            "finite and >= 0",
        )?;
        require(
            non_negative(self.side_slope),
            "side_slope",
            self.side_slope,
            "finite and >= 0",
        )?;
        require(
            non_negative(self.corner_offset),
            "corner_offset",
            self.corner_offset,
            "finite and >= 0",
        )?;
        require(
            non_negative(self.side_offset),
            "side_offset",
            self.side_offset,
            "finite and >= 0",
        )?;
        Ok(())
    }
}

/// One of the four straight cushions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rail {
    /// y = 0
    Bottom,
    /// x = width
    Right,
    /// y = height
    Top,
    /// x = 0
    Left,
}

impl Rail {
    pub const ALL: [Rail; 4] = [Rail::Bottom, Rail::Right, Rail::Top, Rail::Left];

    pub fn id(self) -> usize {
        self as usize
    }

    /// True for the rails that run along the x axis
    pub fn is_horizontal(self) -> bool {
        matches!(self, Rail::Bottom | Rail::Top)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PocketKind {
    Corner,
    Side,
}

/// A pocket mouth, modeled as a stationary capture circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pocket {
    pub id: usize,
    pub kind: PocketKind,
    pub center: DVec2,
    /// A ball is captured once its center comes this close to `center`
    pub radius: f64,
    /// Unit vector across the mouth opening
    pub mouth: DVec2,
}

impl Pocket {
    /// Two aim points straddling the mouth, `half_width` either side of the center
    pub fn mouth_edges(&self, half_width: f64) -> (DVec2, DVec2) {
        (
            self.center + self.mouth * half_width,
            self.center - self.mouth * half_width,
        )
    }
}

/// A short angled rail flanking a pocket mouth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Jaw {
    pub id: usize,
    /// End shared with the straight rail
    pub start: DVec2,
    /// End inside the pocket
    pub end: DVec2,
    /// Unit vector from `start` to `end`
    pub dir: DVec2,
    /// Unit normal pointing to the side balls arrive from
    pub normal: DVec2,
    pub length: f64,
}

impl Jaw {
    fn new(id: usize, start: DVec2, end: DVec2, normal: DVec2) -> Self {
        let span = end - start;
        Self {
            id,
            start,
            end,
            dir: span.normalize_or_zero(),
            normal: normal.normalize_or_zero(),
            length: span.length(),
        }
    }
}

/// Number of canonical jaw shapes; each is mirrored into four jaws
const CANONICAL_JAWS: usize = 3;

/// Mirror bit: flip left/right
pub const MIRROR_X: usize = 0b01;
/// Mirror bit: flip top/bottom
pub const MIRROR_Y: usize = 0b10;

/// Validated table geometry with its derived pockets and jaws
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    geometry: TableGeometry,
    pockets: [Pocket; 6],
    jaws: Vec<Jaw>,
}

impl Default for Table {
    fn default() -> Self {
        Self::build(TableGeometry::default())
    }
}

impl Table {
    /// Validate `geometry` and derive pockets and jaws from it
    pub fn new(geometry: TableGeometry) -> SimResult<Self> {
        geometry.validate()?;
        Ok(Self::build(geometry))
    }

    /// Parse and validate a table from JSON (missing keys keep their defaults)
    pub fn from_json(json: &str) -> SimResult<Self> {
        let geometry: TableGeometry = serde_json::from_str(json)?;
        Self::new(geometry)
    }

    fn build(geometry: TableGeometry) -> Self {
        let (w, h) = (geometry.width, geometry.height);
        let mirror_point = |p: DVec2, m: usize| mirror_within(p, m, w, h);

        let corner_center = DVec2::new(-1.0, -1.0).normalize() * geometry.corner_offset;
        let corner = |id: usize, m: usize| Pocket {
            id,
            kind: PocketKind::Corner,
            center: mirror_point(corner_center, m),
            radius: geometry.corner_pocket_radius,
            mouth: mirror(DVec2::new(1.0, -1.0).normalize(), m),
        };
        let side = |id: usize, m: usize| Pocket {
            id,
            kind: PocketKind::Side,
            center: mirror_point(DVec2::new(w / 2.0, -geometry.side_offset), m),
            radius: geometry.side_pocket_radius,
            mouth: DVec2::X,
        };
        let pockets = [
            corner(0, 0),
            side(1, 0),
            corner(2, MIRROR_X),
            corner(3, MIRROR_Y),
            side(4, MIRROR_Y),
            corner(5, MIRROR_X | MIRROR_Y),
        ];

        let (cg, cs) = (geometry.corner_gap, geometry.corner_slope);
        let (sg, ss) = (geometry.side_gap, geometry.side_slope);
        // (start, end, normal) in the bottom-left quarter
        let canonical: [(DVec2, DVec2, DVec2); CANONICAL_JAWS] = [
            // Corner jaw continuing the bottom rail
            (
                DVec2::new(cg, 0.0),
                DVec2::new(cg / 2.0, -cs * cg / 2.0),
                DVec2::new(-cs, 1.0),
            ),
            // Corner jaw continuing the left rail
            (
                DVec2::new(0.0, cg),
                DVec2::new(-cs * cg / 2.0, cg / 2.0),
                DVec2::new(1.0, -cs),
            ),
            // Side jaw on the corner side of the bottom side pocket
            (
                DVec2::new(w / 2.0 - sg, 0.0),
                DVec2::new(w / 2.0 - sg / 2.0, -ss * sg / 2.0),
                DVec2::new(ss, 1.0),
            ),
        ];

        let jaws = canonical
            .iter()
            .enumerate()
            .flat_map(|(k, &(start, end, normal))| {
                (0..4).map(move |m| (k * 4 + m, start, end, normal, m))
            })
            .map(|(id, start, end, normal, m)| {
                Jaw::new(
                    id,
                    mirror_point(start, m),
                    mirror_point(end, m),
                    mirror(normal, m),
                )
            })
            .collect();

        Self {
            geometry,
            pockets,
            jaws,
        }
    }

    pub fn geometry(&self) -> &TableGeometry {
        &self.geometry
    }

    #[inline]
    pub fn ball_radius(&self) -> f64 {
        self.geometry.ball_radius
    }

    pub fn pockets(&self) -> &[Pocket] {
        &self.pockets
    }

    pub fn jaws(&self) -> &[Jaw] {
        &self.jaws
    }

    /// Whether `coord` (measured along the rail) lies on cushion rather than in a pocket gap
    pub fn rail_contains(&self, rail: Rail, coord: f64) -> bool {
        let g = &self.geometry;
        if rail.is_horizontal() {
            let mid = g.width / 2.0;
            (coord >= g.corner_gap && coord <= mid - g.side_gap)
                || (coord >= mid + g.side_gap && coord <= g.width - g.corner_gap)
        } else {
            coord >= g.corner_gap && coord <= g.height - g.corner_gap
        }
    }

    /// Center of the table
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.geometry.width / 2.0, self.geometry.height / 2.0)
    }

    /// Reflect a point across the mirror axes selected by `m`
    pub fn mirror_point(&self, p: DVec2, m: usize) -> DVec2 {
        mirror_within(p, m, self.geometry.width, self.geometry.height)
    }
}

fn mirror_within(p: DVec2, m: usize, width: f64, height: f64) -> DVec2 {
    DVec2::new(
        if m & MIRROR_X != 0 { width - p.x } else { p.x },
        if m & MIRROR_Y != 0 { height - p.y } else { p.y },
    )
}

/// Reflect a direction across the mirror axes selected by `m`
pub fn mirror(v: DVec2, m: usize) -> DVec2 {
    DVec2::new(
        if m & MIRROR_X != 0 { -v.x } else { v.x },
        if m & MIRROR_Y != 0 { -v.y } else { v.y },
    )
}
