//! Core board types: modules, device categories, circuits, and placement errors.

use std::error::Error;
use std::fmt;

/// Vertical distance between adjacent rail centers, in slot-width units.
///
/// A DIN module face is about four slot widths tall, and panels leave a
/// small gap between rails, so row centers sit 4.25 slot widths apart.
pub const ROW_PITCH: f32 = 4.25;

/// Opaque identifier for a placed module, handed out by [`PanelGrid`].
///
/// [`PanelGrid`]: crate::board::PanelGrid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

/// Trip curve of a miniature circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripCurve {
    B,
    C,
    D,
}

impl fmt::Display for TripCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripCurve::B => write!(f, "B"),
            TripCurve::C => write!(f, "C"),
            TripCurve::D => write!(f, "D"),
        }
    }
}

/// Breaker rating: trip curve plus rated current in amperes.
///
/// Round-trips through the conventional code string (`"B16"`, `"C20"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerRating {
    /// Trip curve letter.
    pub curve: TripCurve,
    /// Rated current in amperes.
    pub amps: u16,
}

impl BreakerRating {
    /// Creates a rating from curve and amperage.
    pub fn new(curve: TripCurve, amps: u16) -> Self {
        Self { curve, amps }
    }

    /// Parses a conventional rating code such as `"B16"`.
    ///
    /// Returns `None` when the curve letter or amperage is missing or
    /// malformed.
    pub fn from_code(code: &str) -> Option<Self> {
        let mut chars = code.chars();
        let curve = match chars.next()? {
            'B' => TripCurve::B,
            'C' => TripCurve::C,
            'D' => TripCurve::D,
            _ => return None,
        };
        let amps: u16 = chars.as_str().parse().ok()?;
        if amps == 0 {
            return None;
        }
        Some(Self { curve, amps })
    }
}

impl fmt::Display for BreakerRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.curve, self.amps)
    }
}

/// Device category occupying panel slots.
///
/// The original tool matched free-form code strings by prefix; the closed
/// enum keeps the same categories with the breaker rating as structured
/// data instead of a string to re-parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// Main isolating switch.
    MainSwitch,
    /// Residual-current device.
    Rcd,
    /// Miniature circuit breaker with its rating.
    Breaker(BreakerRating),
    /// Surge-protection device.
    SurgeProtector,
    /// Blank filler plate.
    Blank,
    /// Any other rail-mounted device (power supply, controller, relay).
    Auxiliary,
}

impl ModuleKind {
    /// Parses a conventional device code (`"FR"`, `"RCD"`, `"B16"`, ...).
    ///
    /// Returns `None` for codes that name no known device category.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "FR" => Some(Self::MainSwitch),
            "RCD" => Some(Self::Rcd),
            "SPD" => Some(Self::SurgeProtector),
            "" | "BLANK" => Some(Self::Blank),
            "PSU" | "PLC" | "RELAY" | "AUX" => Some(Self::Auxiliary),
            _ => BreakerRating::from_code(code).map(Self::Breaker),
        }
    }

    /// Conventional code string for reports and CSV export.
    pub fn code(&self) -> String {
        match self {
            Self::MainSwitch => "FR".to_string(),
            Self::Rcd => "RCD".to_string(),
            Self::Breaker(rating) => rating.to_string(),
            Self::SurgeProtector => "SPD".to_string(),
            Self::Blank => String::new(),
            Self::Auxiliary => "AUX".to_string(),
        }
    }

    /// Conventional slot width of the device category.
    pub fn default_width(&self) -> usize {
        match self {
            Self::MainSwitch | Self::Rcd | Self::SurgeProtector => 2,
            Self::Breaker(_) | Self::Blank => 1,
            Self::Auxiliary => 2,
        }
    }

    /// Returns `true` for miniature circuit breakers.
    pub fn is_breaker(&self) -> bool {
        matches!(self, Self::Breaker(_))
    }
}

/// A physical device occupying `width` contiguous slots on the panel grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Identifier assigned at placement time.
    pub id: ModuleId,
    /// Row index, `0` at the top rail.
    pub row: usize,
    /// Starting column of the occupied slot range.
    pub col: usize,
    /// Occupied width in slots (poles).
    pub width: usize,
    /// Device category.
    pub kind: ModuleKind,
    /// Display label, e.g. `"B16 O1"`.
    pub label: String,
    /// Id of the logical circuit this device protects, if any.
    pub circuit: Option<String>,
}

impl Module {
    /// Geometric center of the module face, in slot-width units.
    pub fn center(&self) -> (f32, f32) {
        (
            self.col as f32 + self.width as f32 / 2.0,
            self.row as f32 * ROW_PITCH,
        )
    }

    /// Manhattan distance between two module face centers.
    ///
    /// All proximity decisions in the grouping passes use this metric, so
    /// distance comparisons stay consistent across passes.
    pub fn distance_to(&self, other: &Module) -> f32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        (ax - bx).abs() + (ay - by).abs()
    }
}

/// A logical load description, owned by the caller alongside the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    /// Stable identifier, e.g. `"O1"`.
    pub id: String,
    /// Human-readable description; drives weight estimation and category
    /// detection.
    pub name: String,
    /// Rating of the breaker protecting the circuit.
    pub breaker: BreakerRating,
    /// Whether some placed module references this circuit.
    pub assigned: bool,
}

impl Circuit {
    /// Creates an unassigned circuit.
    pub fn new(id: impl Into<String>, name: impl Into<String>, breaker: BreakerRating) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            breaker,
            assigned: false,
        }
    }
}

/// Rejection reasons for placement operations.
///
/// Placement failures are synchronous and leave the grid untouched; the
/// caller decides whether to retry with adjusted parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// The requested slot range does not fit the grid dimensions.
    OutOfBounds { row: usize, col: usize, width: usize },
    /// The requested slot range overlaps an existing module.
    Collision { row: usize, col: usize, width: usize },
    /// The module id names no placed module.
    UnknownModule(ModuleId),
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::OutOfBounds { row, col, width } => write!(
                f,
                "placement out of bounds: row {row}, slots {col}..{}",
                col + width
            ),
            PlacementError::Collision { row, col, width } => write!(
                f,
                "collision: row {row}, slots {col}..{} overlap an existing module",
                col + width
            ),
            PlacementError::UnknownModule(id) => write!(f, "unknown module {id}"),
        }
    }
}

impl Error for PlacementError {}
