//! `stats` command: amenity percentages and indexing diagnostics.

use hoodmap::index::AmenityStats;
use hoodmap::isochrone::Availability;
use hoodmap::keys::StreetCategory;
use hoodmap::panel::category_label;

use crate::error::CliError;
use crate::runner::CliRunner;

pub fn run(runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("stats");
    let controller = runner.start_session()?;
    let index = controller.index();
    println!("Source: {}", runner.config().data.source);
    println!();

    match controller.statistics() {
        Some(report) => {
            println!("City ({} streets)", report.city.street_count());
            print_stats(&report.city);
            for hood in &report.neighborhoods {
                println!();
                println!("{} ({} streets)", hood.name, hood.stats.street_count());
                print_stats(&hood.stats);
            }
        }
        None => println!("No street features loaded."),
    }

    let diagnostics = index.diagnostics();
    println!();
    println!("Neighborhoods: {}", index.neighborhoods().len());
    println!("Schools:       {}", index.schools().count());
    println!("Skipped boundaries:    {}", diagnostics.boundaries_skipped);
    println!("Dropped streets:       {}", diagnostics.streets_dropped);
    println!("Rejected school refs:  {}", diagnostics.school_refs_rejected);
    println!("Dropped buildings:     {}", diagnostics.buildings_dropped);
    println!("Skipped schools:       {}", diagnostics.schools_skipped);

    match controller.isochrones().availability() {
        Availability::Available => println!(
            "Isochrones: available ({} features skipped)",
            controller.isochrones().skipped()
        ),
        Availability::Unavailable { reason } => println!("Isochrones: unavailable ({})", reason),
    }

    Ok(())
}

fn print_stats(stats: &AmenityStats) {
    for category in StreetCategory::ALL {
        println!(
            "  {:<32} {:>5}%  ({})",
            category_label(category),
            stats.percentage_label(category),
            stats.count(category)
        );
    }
}
