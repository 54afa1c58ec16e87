//! TOML-based panel plan configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::board::{BreakerRating, Circuit, ModuleKind, PanelGrid, sync_assignments};
use crate::grouping::{GroupingConfig, KeywordWeight, WeightEstimator};

/// Top-level panel plan parsed from TOML.
///
/// All sections have defaults matching an empty two-row board. Load from
/// TOML with [`PlanConfig::from_toml_file`] or use [`PlanConfig::demo`]
/// for the built-in populated example.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanConfig {
    /// Panel grid dimensions.
    #[serde(default)]
    pub panel: PanelSection,
    /// Grouping limits.
    #[serde(default)]
    pub limits: LimitsSection,
    /// Weight-estimation overrides.
    #[serde(default)]
    pub weights: WeightsSection,
    /// Logical circuits.
    #[serde(default)]
    pub circuits: Vec<CircuitEntry>,
    /// Pre-placed modules.
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
}

/// Panel grid dimensions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelSection {
    /// Number of DIN rails (1 to 8).
    pub rows: usize,
    /// Slots per rail (4 to 36).
    pub cols: usize,
}

impl Default for PanelSection {
    fn default() -> Self {
        Self { rows: 2, cols: 12 }
    }
}

/// Grouping limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsSection {
    /// Maximum breakers per RCD (must be > 0).
    pub max_breakers_per_rcd: usize,
    /// Maximum capped-category breakers per RCD (must be > 0).
    pub max_capped_per_rcd: usize,
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            max_breakers_per_rcd: 6,
            max_capped_per_rcd: 2,
        }
    }
}

/// Weight-estimation overrides.
///
/// Empty lists keep the built-in English table; the keyword heuristics are
/// locale-specific, so plans in other languages replace them wholesale.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeightsSection {
    /// Weight when no keyword matches.
    pub default_weight: u32,
    /// Ordered keyword table.
    pub table: Vec<KeywordEntry>,
    /// Keywords marking wet-area circuits.
    pub exclusive: Vec<String>,
    /// Keywords marking capped categories.
    pub capped: Vec<String>,
}

impl Default for WeightsSection {
    fn default() -> Self {
        Self {
            default_weight: 2,
            table: Vec::new(),
            exclusive: Vec::new(),
            capped: Vec::new(),
        }
    }
}

impl WeightsSection {
    /// Builds the estimator, falling back to the built-in table and keyword
    /// lists wherever this section leaves them empty.
    pub fn estimator(&self) -> WeightEstimator {
        let builtin = WeightEstimator::default();
        let table = if self.table.is_empty() {
            builtin.table().to_vec()
        } else {
            self.table
                .iter()
                .map(|e| KeywordWeight {
                    keyword: e.keyword.clone(),
                    weight: e.weight,
                })
                .collect()
        };
        let exclusive = if self.exclusive.is_empty() {
            builtin.exclusive_keywords().to_vec()
        } else {
            self.exclusive.clone()
        };
        let capped = if self.capped.is_empty() {
            builtin.capped_keywords().to_vec()
        } else {
            self.capped.clone()
        };
        WeightEstimator::new(table, self.default_weight, exclusive, capped)
    }
}

/// One `{ keyword, weight }` row of the `[weights]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeywordEntry {
    /// Substring to look for.
    pub keyword: String,
    /// Relative load weight when the keyword matches.
    pub weight: u32,
}

/// One logical circuit.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CircuitEntry {
    /// Stable circuit id, e.g. `"O1"`.
    pub id: String,
    /// Free-text description; drives the weight heuristics.
    pub name: String,
    /// Breaker rating code, e.g. `"B16"`.
    pub breaker: String,
}

/// One pre-placed module.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleEntry {
    /// Row index, `0` at the top rail.
    pub row: usize,
    /// Starting column.
    pub col: usize,
    /// Width in slots; defaults to the device's conventional width.
    #[serde(default)]
    pub width: Option<usize>,
    /// Device code: `"FR"`, `"RCD"`, `"B16"`, `"SPD"`, `"AUX"`, `"BLANK"`.
    pub kind: String,
    /// Display label; defaults to the device code.
    #[serde(default)]
    pub label: Option<String>,
    /// Circuit this module protects.
    #[serde(default)]
    pub circuit: Option<String>,
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"panel.rows"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl Default for PlanConfig {
    fn default() -> Self {
        Self::two_row()
    }
}

impl PlanConfig {
    /// Returns an empty two-row board (2 rails of 12 slots).
    pub fn two_row() -> Self {
        Self {
            panel: PanelSection { rows: 2, cols: 12 },
            limits: LimitsSection::default(),
            weights: WeightsSection::default(),
            circuits: Vec::new(),
            modules: Vec::new(),
        }
    }

    /// Returns an empty three-row board (3 rails of 18 slots).
    pub fn three_row() -> Self {
        Self {
            panel: PanelSection { rows: 3, cols: 18 },
            ..Self::two_row()
        }
    }

    /// Returns an empty single-row board (1 rail of 12 slots).
    pub fn single_row() -> Self {
        Self {
            panel: PanelSection { rows: 1, cols: 12 },
            ..Self::two_row()
        }
    }

    /// Returns the populated demo board: main switch, surge protector, two
    /// RCDs, and five typical household circuits with breakers placed.
    pub fn demo() -> Self {
        let circuit = |id: &str, name: &str, breaker: &str| CircuitEntry {
            id: id.to_string(),
            name: name.to_string(),
            breaker: breaker.to_string(),
        };
        let device = |row: usize, col: usize, kind: &str, label: &str| ModuleEntry {
            row,
            col,
            width: None,
            kind: kind.to_string(),
            label: Some(label.to_string()),
            circuit: None,
        };
        let pinned = |row: usize, col: usize, kind: &str, circuit_id: &str| ModuleEntry {
            row,
            col,
            width: None,
            kind: kind.to_string(),
            label: Some(format!("{kind} {circuit_id}")),
            circuit: Some(circuit_id.to_string()),
        };

        Self {
            circuits: vec![
                circuit("O1", "Living room sockets x4", "B16"),
                circuit("O2", "Lighting ground floor", "B10"),
                circuit("O3", "Kitchen hood", "B16"),
                circuit("O4", "Bathroom washer", "B16"),
                circuit("O5", "Garage sockets", "B16"),
            ],
            modules: vec![
                device(0, 0, "FR", "Main switch"),
                device(0, 2, "SPD", "Surge protector"),
                device(0, 4, "RCD", "RCD 30mA A"),
                device(1, 0, "RCD", "RCD 30mA B"),
                pinned(0, 6, "B16", "O1"),
                pinned(0, 7, "B10", "O2"),
                pinned(0, 8, "B16", "O3"),
                pinned(1, 2, "B16", "O4"),
                pinned(1, 3, "B16", "O5"),
            ],
            ..Self::two_row()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "two_row", "three_row", "single_row"];

    /// Loads a plan from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Ok(Self::demo()),
            "two_row" => Ok(Self::two_row()),
            "three_row" => Ok(Self::three_row()),
            "single_row" => Ok(Self::single_row()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a plan from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "plan".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a plan from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// The grouping limits as an engine configuration.
    pub fn grouping(&self) -> GroupingConfig {
        GroupingConfig {
            max_breakers_per_rcd: self.limits.max_breakers_per_rcd,
            max_capped_per_rcd: self.limits.max_capped_per_rcd,
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the plan is valid. Placement conflicts
    /// between `[[modules]]` entries are reported by [`PlanConfig::build`].
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let p = &self.panel;
        if !(1..=8).contains(&p.rows) {
            errors.push(ConfigError {
                field: "panel.rows".into(),
                message: "must be between 1 and 8".into(),
            });
        }
        if !(4..=36).contains(&p.cols) {
            errors.push(ConfigError {
                field: "panel.cols".into(),
                message: "must be between 4 and 36".into(),
            });
        }

        let l = &self.limits;
        if l.max_breakers_per_rcd == 0 {
            errors.push(ConfigError {
                field: "limits.max_breakers_per_rcd".into(),
                message: "must be > 0".into(),
            });
        }
        if l.max_capped_per_rcd == 0 {
            errors.push(ConfigError {
                field: "limits.max_capped_per_rcd".into(),
                message: "must be > 0".into(),
            });
        }

        for (i, entry) in self.weights.table.iter().enumerate() {
            if entry.keyword.trim().is_empty() {
                errors.push(ConfigError {
                    field: format!("weights.table[{i}].keyword"),
                    message: "must not be empty".into(),
                });
            }
        }

        for (i, c) in self.circuits.iter().enumerate() {
            if c.id.trim().is_empty() {
                errors.push(ConfigError {
                    field: format!("circuits[{i}].id"),
                    message: "must not be empty".into(),
                });
            }
            if self.circuits[..i].iter().any(|prev| prev.id == c.id) {
                errors.push(ConfigError {
                    field: format!("circuits[{i}].id"),
                    message: format!("duplicate circuit id \"{}\"", c.id),
                });
            }
            if BreakerRating::from_code(&c.breaker).is_none() {
                errors.push(ConfigError {
                    field: format!("circuits[{i}].breaker"),
                    message: format!("unknown rating code \"{}\"", c.breaker),
                });
            }
        }

        for (i, m) in self.modules.iter().enumerate() {
            if ModuleKind::from_code(&m.kind).is_none() {
                errors.push(ConfigError {
                    field: format!("modules[{i}].kind"),
                    message: format!("unknown device code \"{}\"", m.kind),
                });
            }
            if m.width == Some(0) {
                errors.push(ConfigError {
                    field: format!("modules[{i}].width"),
                    message: "must be > 0".into(),
                });
            }
            if let Some(id) = &m.circuit {
                if !self.circuits.iter().any(|c| &c.id == id) {
                    errors.push(ConfigError {
                        field: format!("modules[{i}].circuit"),
                        message: format!("references unknown circuit \"{id}\""),
                    });
                }
            }
        }

        errors
    }

    /// Materializes the grid and circuit list.
    ///
    /// Placement problems in `[[modules]]` entries (out of bounds or
    /// colliding ranges) surface as errors naming the offending entry.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` encountered.
    pub fn build(&self) -> Result<(PanelGrid, Vec<Circuit>), ConfigError> {
        if self.panel.rows == 0 || self.panel.cols == 0 {
            return Err(ConfigError {
                field: "panel".into(),
                message: "rows and cols must be > 0".into(),
            });
        }

        let mut circuits = Vec::with_capacity(self.circuits.len());
        for (i, c) in self.circuits.iter().enumerate() {
            let rating = BreakerRating::from_code(&c.breaker).ok_or_else(|| ConfigError {
                field: format!("circuits[{i}].breaker"),
                message: format!("unknown rating code \"{}\"", c.breaker),
            })?;
            circuits.push(Circuit::new(c.id.clone(), c.name.clone(), rating));
        }

        let mut grid = PanelGrid::new(self.panel.rows, self.panel.cols);
        for (i, m) in self.modules.iter().enumerate() {
            let kind = ModuleKind::from_code(&m.kind).ok_or_else(|| ConfigError {
                field: format!("modules[{i}].kind"),
                message: format!("unknown device code \"{}\"", m.kind),
            })?;
            let width = m.width.unwrap_or_else(|| kind.default_width());
            let label = m.label.clone().unwrap_or_else(|| m.kind.clone());
            grid.place(m.row, m.col, width, kind, label, m.circuit.as_deref())
                .map_err(|e| ConfigError {
                    field: format!("modules[{i}]"),
                    message: e.to_string(),
                })?;
        }

        sync_assignments(&mut circuits, &grid);
        Ok((grid, circuits))
    }
}
