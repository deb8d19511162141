//! # Schedule Check
//!
//! Command-line tool that resolves a schedule manifest and prints the
//! execution order, or the reason it cannot be built.

use cadence_schedule::{ScheduleError, ScheduleManifest};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        println!("Usage: schedule_check <systems.toml>");
        println!();
        println!("Options:");
        println!("  --graph    Print each system's resolved dependencies");
        return;
    }

    let manifest_path = &args[1];
    let show_graph = args.iter().any(|a| a == "--graph");

    println!("Loading manifest: {manifest_path}");

    let manifest = match ScheduleManifest::from_path(manifest_path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    println!("Systems registered: {}", manifest.systems.len());
    println!();

    let resolution = match manifest.resolve() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Schedule rejected: {e}");
            if let ScheduleError::CircularDependency { members } = &e {
                eprintln!();
                eprintln!("Systems in or behind the cycle:");
                for member in members {
                    eprintln!("  - {member}");
                }
            }
            std::process::exit(1);
        }
    };

    println!("Update order:");
    for (position, name) in resolution.update_order.iter().enumerate() {
        println!("  {:>3}. {name}", position + 1);
        if show_graph {
            let deps = resolution.graph.dependencies_of(name);
            if !deps.is_empty() {
                println!("       after: {}", deps.join(", "));
            }
        }
    }

    println!();
    println!("Draw order:");
    if resolution.draw_order.is_empty() {
        println!("  (none)");
    }
    for (position, name) in resolution.draw_order.iter().enumerate() {
        println!("  {:>3}. {name}", position + 1);
    }

    if !resolution.pruned.is_empty() {
        println!();
        println!("Pruned optional systems: {}", resolution.pruned.join(", "));
    }
}
