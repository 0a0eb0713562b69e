use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use dialkit::{City, DialLayout, Orbit, conflict};
use worldorbit::config::{self, Config};
use worldorbit::events::AppEvent;
use worldorbit::report;
use worldorbit::sys::runtime;

/// Label length used to decide whether a gap is wide enough to be worth listing.
const TYPICAL_CODE_LETTERS: usize = 3;

#[derive(Parser, Debug)]
#[command(name = "worldorbit", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Instant to lay out, as RFC 3339 (defaults to now)
    #[arg(long, global = true)]
    at: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Print the orbit of every configured city
    Assign,
    /// Check whether a city can be added without crowding its label
    Check {
        /// Identifier of the new city
        id: String,

        /// Short label code, e.g. "TYO"
        #[arg(short = 'c', long)]
        code: String,

        /// IANA time zone, e.g. "Asia/Tokyo"
        #[arg(short = 'z', long)]
        zone: String,
    },
    /// List crowded label clusters in the configured selection
    Conflicts,
    /// List gaps on each orbit where another label would fit
    Free {
        /// Only list this orbit ("inner" or "outer")
        #[arg(short, long)]
        orbit: Option<Orbit>,
    },
    /// Re-print the layout on every refresh and config change
    Watch,
    /// Write the default config file if missing
    Init,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let at = parse_instant(cli.at.as_deref())?;

    match cli.command.unwrap_or(Commands::Assign) {
        Commands::Assign => {
            print_layout(&config::load_or_default(), at);
            Ok(())
        }
        Commands::Check { id, code, zone } => check(City::new(id, code, zone), at),
        Commands::Conflicts => {
            let config = config::load_or_default();
            let conflicts =
                conflict::find_conflicts(&config.cities, at, &config.label, &config.conflict);
            report::conflict_lines(&conflicts)
                .iter()
                .for_each(|line| println!("{line}"));
            Ok(())
        }
        Commands::Free { orbit: only } => {
            let config = config::load_or_default();
            let layout = DialLayout::compute(&config.cities, at, &config.label);
            let min_width = config.label.span_for_letters(TYPICAL_CODE_LETTERS);
            let orbits = [Orbit::Inner, Orbit::Outer]
                .into_iter()
                .filter(|orbit| only.is_none_or(|o| o == *orbit));
            for orbit in orbits {
                report::free_sector_lines(&layout, orbit, min_width)
                    .iter()
                    .for_each(|line| println!("{line}"));
            }
            Ok(())
        }
        Commands::Watch => watch(cli.at.is_some().then_some(at)),
        Commands::Init => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn parse_instant(at: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    at.map_or_else(
        || Ok(Utc::now()),
        |s| {
            DateTime::parse_from_rfc3339(s)
                .map(|t| t.with_timezone(&Utc))
                .with_context(|| format!("Invalid --at value '{}'", s))
        },
    )
}

fn print_layout(config: &Config, at: DateTime<Utc>) {
    let layout = DialLayout::compute(&config.cities, at, &config.label);
    println!("{}", at.format("%Y-%m-%d %H:%M UTC"));
    report::assignment_lines(&config.cities, &layout, at)
        .iter()
        .for_each(|line| println!("{line}"));
    for orbit in [Orbit::Inner, Orbit::Outer] {
        println!("{}", report::orbit_summary(&layout, orbit));
    }
}

fn check(candidate: City, at: DateTime<Utc>) -> anyhow::Result<()> {
    let config = config::load_or_default();
    let assignment = conflict::check_addition(
        &config.cities,
        &candidate,
        at,
        &config.label,
        &config.conflict,
    )?;

    if let Some(orbit) = assignment.get(&candidate.id) {
        println!(
            "{} fits on the {} orbit ({})",
            candidate.code,
            orbit,
            orbit.number()
        );
    }
    Ok(())
}

/// `fixed_at` pins every refresh to one instant, otherwise each refresh uses the
/// current time.
fn watch(fixed_at: Option<DateTime<Utc>>) -> anyhow::Result<()> {
    let mut config = config::load_or_default();
    let now = || fixed_at.unwrap_or_else(Utc::now);

    let (tx, rx) = async_channel::bounded(32);
    let refresh = runtime::start_background_services(tx, config.refresh)
        .context("Failed to start background services")?;

    print_layout(&config, now());

    while let Ok(event) = rx.recv_blocking() {
        match event {
            AppEvent::Tick => print_layout(&config, now()),
            AppEvent::ConfigReload => {
                config = config::load_or_default();
                log::info!("Configuration reloaded");
                refresh.send_if_modified(|period| {
                    let changed = *period != config.refresh;
                    *period = config.refresh;
                    changed
                });
                print_layout(&config, now());
            }
        }
    }
    Ok(())
}
