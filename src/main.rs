//! Panel planner entry point: CLI wiring and config-driven analysis.

use std::path::Path;
use std::process;

use panelboard::board::sync_assignments;
use panelboard::config::PlanConfig;
use panelboard::grouping::{GroupingEngine, PhaseBalancer};
use panelboard::io::export::{export_bom_csv, export_groups_csv};
use panelboard::report::BoardReport;

/// Parsed CLI arguments.
struct CliArgs {
    plan_path: Option<String>,
    preset: Option<String>,
    limit_override: Option<usize>,
    auto_place: bool,
    bom_out: Option<String>,
    groups_out: Option<String>,
}

fn print_help() {
    eprintln!("panelboard — distribution-panel layout and RCD grouping engine");
    eprintln!();
    eprintln!("Usage: panelboard [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --plan <path>        Load panel plan from TOML config file");
    eprintln!("  --preset <name>      Use a built-in preset (demo)");
    eprintln!("  --limit <n>          Override max breakers per RCD");
    eprintln!("  --auto-place         Place breakers for unassigned circuits first");
    eprintln!("  --bom-out <path>     Export bill of materials to CSV");
    eprintln!("  --groups-out <path>  Export RCD grouping table to CSV");
    eprintln!("  --help               Show this help message");
    eprintln!();
    eprintln!("If no --plan or --preset is given, the demo preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        plan_path: None,
        preset: None,
        limit_override: None,
        auto_place: false,
        bom_out: None,
        groups_out: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--plan" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --plan requires a path argument");
                    process::exit(1);
                }
                cli.plan_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--limit" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --limit requires a number argument");
                    process::exit(1);
                }
                match args[i].parse::<usize>() {
                    Ok(n) if n > 0 => cli.limit_override = Some(n),
                    _ => {
                        eprintln!(
                            "error: --limit value \"{}\" is not a positive integer",
                            args[i]
                        );
                        process::exit(1);
                    }
                }
            }
            "--auto-place" => {
                cli.auto_place = true;
            }
            "--bom-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --bom-out requires a path argument");
                    process::exit(1);
                }
                cli.bom_out = Some(args[i].clone());
            }
            "--groups-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --groups-out requires a path argument");
                    process::exit(1);
                }
                cli.groups_out = Some(args[i].clone());
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    // Load plan: --plan takes priority, then --preset, then the demo default
    let mut plan = if let Some(ref path) = cli.plan_path {
        match PlanConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match PlanConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        PlanConfig::demo()
    };

    // Apply limit override
    if let Some(limit) = cli.limit_override {
        plan.limits.max_breakers_per_rcd = limit;
    }

    // Validate
    let errors = plan.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Build board state
    let (mut grid, mut circuits) = match plan.build() {
        Ok(built) => built,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Pin breakers for circuits that have none yet
    if cli.auto_place {
        let placed = grid.auto_place_unassigned(&mut circuits);
        if !placed.is_empty() {
            eprintln!("Auto-placed {} breaker(s) for unassigned circuits", placed.len());
        }
        let left = circuits.iter().filter(|c| !c.assigned).count();
        if left > 0 {
            eprintln!("No free slot for {left} circuit(s); enlarge the panel or remove modules");
        }
    }
    sync_assignments(&mut circuits, &grid);

    // Group and balance
    let engine = GroupingEngine::new(plan.weights.estimator(), plan.grouping());
    let result = engine.run(&grid, &circuits);
    let balancer = PhaseBalancer;
    let phases = balancer.balance(&result.groups);

    // Print report
    let report = BoardReport::build(&grid, &circuits, &result, &phases);
    println!("{report}");

    // Export CSV if requested
    if let Some(ref path) = cli.bom_out {
        if let Err(e) = export_bom_csv(&grid, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Bill of materials written to {path}");
    }
    if let Some(ref path) = cli.groups_out {
        if let Err(e) = export_groups_csv(&grid, &result, &phases, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Grouping table written to {path}");
    }
}
