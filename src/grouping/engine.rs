//! RCD grouping: exclusivity, capacity-aware bin packing, diagnostics.

use std::collections::HashMap;

use crate::board::{Circuit, Module, ModuleId, ModuleKind, PanelGrid};

use super::types::{GroupingConfig, GroupingResult, RcdGroup};
use super::weight::WeightEstimator;

/// Assigns breaker modules to RCD modules under capacity, exclusivity, and
/// category constraints.
///
/// Every run recomputes the grouping from current grid and circuit state;
/// nothing is cached between invocations, so identical inputs produce
/// identical results.
#[derive(Debug, Clone, Default)]
pub struct GroupingEngine {
    estimator: WeightEstimator,
    config: GroupingConfig,
}

/// Mutable per-RCD state during a run.
struct Slot<'a> {
    module: &'a Module,
    breakers: Vec<ModuleId>,
    weight: u32,
    capped: usize,
    exclusive: bool,
    over_capacity: bool,
}

/// Descriptive text for a breaker: the linked circuit's name when the link
/// resolves, else the module's own label.
fn circuit_text<'a>(names: &HashMap<&'a str, &'a str>, module: &'a Module) -> &'a str {
    module
        .circuit
        .as_deref()
        .and_then(|id| names.get(id).copied())
        .unwrap_or(module.label.as_str())
}

impl GroupingEngine {
    /// Creates an engine with the given estimator and limits.
    pub fn new(estimator: WeightEstimator, config: GroupingConfig) -> Self {
        Self { estimator, config }
    }

    /// The configured limits.
    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    /// The weight estimator in use.
    pub fn estimator(&self) -> &WeightEstimator {
        &self.estimator
    }

    /// Runs one full grouping pass over the current board state.
    ///
    /// A breaker's descriptive text is its linked circuit's name when the
    /// link resolves, else its own label. With no RCD on the board the
    /// result only carries the suggested RCD count; missing capacity and
    /// unsatisfiable exclusivity are reported as diagnostics, never errors.
    pub fn run(&self, grid: &PanelGrid, circuits: &[Circuit]) -> GroupingResult {
        let names: HashMap<&str, &str> = circuits
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();

        let mut rcds: Vec<&Module> = grid
            .modules()
            .iter()
            .filter(|m| m.kind == ModuleKind::Rcd)
            .collect();
        rcds.sort_by_key(|m| (m.row, m.col));

        let mut breakers: Vec<&Module> = grid
            .modules()
            .iter()
            .filter(|m| m.kind.is_breaker())
            .collect();
        breakers.sort_by_key(|m| (m.row, m.col));

        if rcds.is_empty() {
            let needed = breakers
                .len()
                .div_ceil(self.config.max_breakers_per_rcd.max(1))
                .max(1);
            return GroupingResult {
                groups: Vec::new(),
                suggested_rcds: Some(needed),
                unassigned: Vec::new(),
            };
        }

        let mut slots: Vec<Slot<'_>> = rcds
            .iter()
            .map(|m| Slot {
                module: *m,
                breakers: Vec::new(),
                weight: 0,
                capped: 0,
                exclusive: false,
                over_capacity: false,
            })
            .collect();
        let mut unassigned = Vec::new();

        let (wet, dry): (Vec<&Module>, Vec<&Module>) = breakers
            .iter()
            .copied()
            .partition(|m| self.estimator.is_exclusive(circuit_text(&names, m)));

        // Exclusivity pass: each wet-area breaker claims the nearest RCD
        // not yet reserved; that RCD receives nothing else this run.
        for brk in &wet {
            let chosen = (0..slots.len())
                .filter(|&i| !slots[i].exclusive)
                .min_by(|&a, &b| {
                    brk.distance_to(slots[a].module)
                        .total_cmp(&brk.distance_to(slots[b].module))
                        .then(a.cmp(&b))
                });
            match chosen {
                Some(i) => {
                    let weight = self.estimator.estimate(circuit_text(&names, brk));
                    let capped = self.estimator.is_capped(circuit_text(&names, brk));
                    let slot = &mut slots[i];
                    slot.breakers.push(brk.id);
                    slot.weight += weight;
                    if capped {
                        slot.capped += 1;
                    }
                    slot.exclusive = true;
                }
                None => unassigned.push(brk.id),
            }
        }

        // General pass: heaviest first so the hardest items are seated
        // before remainders fill up; distance breaks ties toward locality.
        let mut queue: Vec<(&Module, u32, f32)> = dry
            .iter()
            .map(|m| {
                let weight = self.estimator.estimate(circuit_text(&names, m));
                let nearest = slots
                    .iter()
                    .map(|s| m.distance_to(s.module))
                    .fold(f32::INFINITY, f32::min);
                (*m, weight, nearest)
            })
            .collect();
        queue.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.total_cmp(&b.2)));

        for (brk, weight, _nearest) in queue {
            let capped = self.estimator.is_capped(circuit_text(&names, brk));
            let chosen = (0..slots.len())
                .filter(|&i| {
                    let s = &slots[i];
                    !s.exclusive
                        && s.breakers.len() < self.config.max_breakers_per_rcd
                        && (!capped || s.capped < self.config.max_capped_per_rcd)
                })
                .min_by(|&a, &b| {
                    slots[a]
                        .weight
                        .cmp(&slots[b].weight)
                        .then(
                            brk.distance_to(slots[a].module)
                                .total_cmp(&brk.distance_to(slots[b].module)),
                        )
                        .then(a.cmp(&b))
                });
            // Overflow fallback: capacity and category limits relaxed,
            // nearest non-exclusive RCD takes the breaker and is flagged.
            let target = match chosen {
                Some(i) => Some((i, false)),
                None => (0..slots.len())
                    .filter(|&i| !slots[i].exclusive)
                    .min_by(|&a, &b| {
                        brk.distance_to(slots[a].module)
                            .total_cmp(&brk.distance_to(slots[b].module))
                            .then(a.cmp(&b))
                    })
                    .map(|i| (i, true)),
            };
            match target {
                Some((i, overflow)) => {
                    let slot = &mut slots[i];
                    slot.breakers.push(brk.id);
                    slot.weight += weight;
                    if capped {
                        slot.capped += 1;
                    }
                    if overflow {
                        slot.over_capacity = true;
                    }
                }
                None => unassigned.push(brk.id),
            }
        }

        GroupingResult {
            groups: slots
                .into_iter()
                .map(|s| RcdGroup {
                    rcd: s.module.id,
                    breakers: s.breakers,
                    total_weight: s.weight,
                    capped_count: s.capped,
                    exclusive: s.exclusive,
                    over_capacity: s.over_capacity,
                })
                .collect(),
            suggested_rcds: None,
            unassigned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BreakerRating, TripCurve};

    fn breaker() -> ModuleKind {
        ModuleKind::Breaker(BreakerRating::new(TripCurve::B, 16))
    }

    fn engine() -> GroupingEngine {
        GroupingEngine::new(WeightEstimator::default(), GroupingConfig::default())
    }

    fn engine_with(max_breakers: usize, max_capped: usize) -> GroupingEngine {
        GroupingEngine::new(
            WeightEstimator::default(),
            GroupingConfig {
                max_breakers_per_rcd: max_breakers,
                max_capped_per_rcd: max_capped,
            },
        )
    }

    /// Grid with breakers labelled by the given names, no RCDs.
    fn grid_with_breakers(names: &[&str]) -> PanelGrid {
        let mut grid = PanelGrid::new(2, 12);
        for (i, name) in names.iter().enumerate() {
            grid.place(i / 12, i % 12, 1, breaker(), *name, None).ok();
        }
        grid
    }

    #[test]
    fn no_rcd_suggests_needed_count() {
        let grid = grid_with_breakers(&["a", "b", "c", "d", "e", "f", "g"]);
        let result = engine().run(&grid, &[]);
        assert!(result.groups.is_empty());
        assert_eq!(result.suggested_rcds, Some(2));
        assert!(result.unassigned.is_empty());
    }

    #[test]
    fn no_rcd_no_breakers_still_suggests_one() {
        let grid = PanelGrid::new(2, 12);
        let result = engine().run(&grid, &[]);
        assert_eq!(result.suggested_rcds, Some(1));
    }

    #[test]
    fn wet_area_breaker_gets_a_dedicated_rcd() {
        let mut grid = PanelGrid::new(2, 12);
        grid.place(0, 0, 2, ModuleKind::Rcd, "RCD A", None).ok();
        grid.place(1, 0, 2, ModuleKind::Rcd, "RCD B", None).ok();
        grid.place(0, 2, 1, breaker(), "Bathroom heater", None).ok();
        grid.place(0, 3, 1, breaker(), "Sockets", None).ok();
        grid.place(0, 4, 1, breaker(), "Lighting", None).ok();

        let result = engine().run(&grid, &[]);
        let bathroom_group = result
            .groups
            .iter()
            .find(|g| g.exclusive)
            .map(|g| g.breakers.len());
        // The exclusive RCD holds only the bathroom breaker even though
        // capacity remains.
        assert_eq!(bathroom_group, Some(1));
        let other = result.groups.iter().find(|g| !g.exclusive);
        assert_eq!(other.map(|g| g.breakers.len()), Some(2));
        assert!(result.unassigned.is_empty());
    }

    #[test]
    fn wet_area_without_free_rcd_is_reported_unassigned() {
        let mut grid = PanelGrid::new(2, 12);
        grid.place(0, 0, 2, ModuleKind::Rcd, "RCD A", None).ok();
        grid.place(0, 2, 1, breaker(), "Bathroom heater", None).ok();
        let second = grid.place(0, 3, 1, breaker(), "Shower pump", None);

        let result = engine().run(&grid, &[]);
        // One RCD, two wet-area breakers: the second has nowhere to go.
        assert_eq!(result.unassigned, vec![second.unwrap_or(ModuleId(0))]);
        assert_eq!(result.groups[0].breakers.len(), 1);
    }

    #[test]
    fn dry_breakers_left_stranded_when_all_rcds_are_exclusive() {
        let mut grid = PanelGrid::new(2, 12);
        grid.place(0, 0, 2, ModuleKind::Rcd, "RCD A", None).ok();
        grid.place(0, 2, 1, breaker(), "Bathroom heater", None).ok();
        let socket = grid.place(0, 3, 1, breaker(), "Sockets", None);

        let result = engine().run(&grid, &[]);
        assert_eq!(result.unassigned, vec![socket.unwrap_or(ModuleId(0))]);
        assert!(!result.has_overflow());
    }

    #[test]
    fn heavier_breakers_are_seated_first() {
        let mut grid = PanelGrid::new(2, 12);
        grid.place(0, 0, 2, ModuleKind::Rcd, "RCD A", None).ok();
        grid.place(1, 0, 2, ModuleKind::Rcd, "RCD B", None).ok();
        let heavy = grid.place(0, 11, 1, breaker(), "Sockets x6", None);
        grid.place(0, 2, 1, breaker(), "Lighting", None).ok();
        grid.place(0, 3, 1, breaker(), "Lighting upstairs", None).ok();

        let result = engine().run(&grid, &[]);
        // The weight-12 socket bank lands alone on the first-chosen RCD;
        // both weight-1 lighting circuits share the other.
        let heavy = heavy.unwrap_or(ModuleId(0));
        let heavy_group = result.groups.iter().find(|g| g.breakers.contains(&heavy));
        assert_eq!(heavy_group.map(|g| g.breakers.len()), Some(1));
        assert_eq!(heavy_group.map(|g| g.total_weight), Some(12));
        let light_group = result.groups.iter().find(|g| !g.breakers.contains(&heavy));
        assert_eq!(light_group.map(|g| g.total_weight), Some(2));
    }

    #[test]
    fn capped_category_respects_per_rcd_limit() {
        let mut grid = PanelGrid::new(2, 12);
        grid.place(0, 0, 2, ModuleKind::Rcd, "RCD A", None).ok();
        grid.place(1, 0, 2, ModuleKind::Rcd, "RCD B", None).ok();
        for col in 2..5 {
            grid.place(0, col, 1, breaker(), "Kitchen hood", None).ok();
        }

        let result = engine_with(6, 2).run(&grid, &[]);
        for group in &result.groups {
            assert!(group.capped_count <= 2);
            assert!(!group.over_capacity);
        }
        let total: usize = result.groups.iter().map(|g| g.breakers.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn overflow_fallback_flags_the_group() {
        let mut grid = PanelGrid::new(2, 12);
        grid.place(0, 0, 2, ModuleKind::Rcd, "RCD A", None).ok();
        for col in 2..6 {
            grid.place(0, col, 1, breaker(), "Sockets", None).ok();
        }

        let result = engine_with(3, 2).run(&grid, &[]);
        assert_eq!(result.groups[0].breakers.len(), 4);
        assert!(result.groups[0].over_capacity);
        assert!(result.has_overflow());
        assert!(result.unassigned.is_empty());
    }

    #[test]
    fn circuit_name_drives_classification_when_linked() {
        let mut grid = PanelGrid::new(2, 12);
        grid.place(0, 0, 2, ModuleKind::Rcd, "RCD A", None).ok();
        grid.place(1, 0, 2, ModuleKind::Rcd, "RCD B", None).ok();
        // Label alone says nothing; the linked circuit marks it wet-area.
        grid.place(0, 2, 1, breaker(), "B16 O1", Some("O1")).ok();
        let circuits = [Circuit::new(
            "O1",
            "Bathroom washer",
            BreakerRating::new(TripCurve::B, 16),
        )];

        let result = engine().run(&grid, &circuits);
        assert!(result.groups.iter().any(|g| g.exclusive));
    }

    #[test]
    fn rerun_on_identical_input_is_identical() {
        let mut grid = PanelGrid::new(2, 12);
        grid.place(0, 0, 2, ModuleKind::Rcd, "RCD A", None).ok();
        grid.place(1, 0, 2, ModuleKind::Rcd, "RCD B", None).ok();
        grid.place(0, 2, 1, breaker(), "Sockets x4", None).ok();
        grid.place(0, 3, 1, breaker(), "Kitchen hood", None).ok();
        grid.place(1, 2, 1, breaker(), "Bathroom heater", None).ok();
        grid.place(1, 3, 1, breaker(), "Lighting", None).ok();

        let eng = engine();
        let first = eng.run(&grid, &[]);
        let second = eng.run(&grid, &[]);
        assert_eq!(first, second);
    }

    #[test]
    fn groups_are_ordered_by_rcd_position() {
        let mut grid = PanelGrid::new(2, 12);
        // Placement order deliberately reversed from position order.
        let late = grid.place(1, 4, 2, ModuleKind::Rcd, "RCD B", None);
        let early = grid.place(0, 0, 2, ModuleKind::Rcd, "RCD A", None);

        let result = engine().run(&grid, &[]);
        let order: Vec<ModuleId> = result.groups.iter().map(|g| g.rcd).collect();
        assert_eq!(
            order,
            vec![
                early.unwrap_or(ModuleId(0)),
                late.unwrap_or(ModuleId(0))
            ]
        );
    }
}
