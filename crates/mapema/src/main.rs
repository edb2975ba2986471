//! `mapema` - CLI for the mapema traffic and transit core
//!
//! This binary lists routes and alerts, shows the corridor board, manages
//! the map access token, and drives a map session against a recording widget.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;

use mapema::cli::{
    AlertsCommand, Cli, Command, ConfigCommand, MapCommand, RoutesCommand, TokenCommand,
};
use mapema::filter::{active_alert_count, is_high_traffic};
use mapema::map::recording::RecordingBackend;
use mapema::map::ContainerId;
use mapema::{
    count_by_status, filter_alerts, filter_routes, init_logging, Config, Credential,
    CredentialStore, DataProvider, Dataset, MapSession, SqliteCredentialStore, SurfaceView,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Routes(cmd) => handle_routes(&config, &cmd),
        Command::Alerts(cmd) => handle_alerts(&config, &cmd),
        Command::Traffic(cmd) => handle_traffic(&config, cmd.json),
        Command::Token(cmd) => handle_token(&config, cmd),
        Command::Map(cmd) => handle_map(&config, &cmd).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn load_dataset(config: &Config) -> anyhow::Result<Dataset> {
    Dataset::load_or_seed(config.data.seed_path.as_deref()).context("loading dataset")
}

fn open_store(config: &Config) -> anyhow::Result<SqliteCredentialStore> {
    let path = config.database_path();
    SqliteCredentialStore::open(&path)
        .with_context(|| format!("opening credential store at {}", path.display()))
}

fn handle_routes(config: &Config, cmd: &RoutesCommand) -> anyhow::Result<()> {
    let data = load_dataset(config)?;
    let routes = filter_routes(data.routes(), &cmd.query, cmd.status.map(Into::into));

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&routes)?);
        return Ok(());
    }

    if routes.is_empty() {
        println!("No routes found. Try adjusting your search or filters.");
        return Ok(());
    }

    println!(
        "{:<10} {:<28} {:<9} {:<10} {:<9} {:<10} {:>4}",
        "ROUTE", "FROM -> TO", "DISTANCE", "TIME", "FARE", "STATUS", "RATE"
    );
    for route in routes {
        println!(
            "{:<10} {:<28} {:<9} {:<10} {:<9} {:<10} {:>4.1}",
            route.name,
            format!("{} -> {}", route.origin, route.destination),
            route.distance,
            route.avg_time,
            route.fare,
            route.status.label(),
            route.rating
        );
    }
    Ok(())
}

fn handle_alerts(config: &Config, cmd: &AlertsCommand) -> anyhow::Result<()> {
    let data = load_dataset(config)?;
    let alerts = filter_alerts(
        data.alerts(),
        cmd.category.map(Into::into),
        cmd.include_resolved,
    );

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&alerts)?);
        return Ok(());
    }

    println!("{} active alerts", active_alert_count(data.alerts()));
    println!();
    if alerts.is_empty() {
        println!("No alerts in this category.");
        return Ok(());
    }
    for alert in alerts {
        let marker = match alert.family() {
            Some(family) => format!("{family:?}").to_lowercase(),
            None => "resolved".to_string(),
        };
        println!(
            "[{marker}] {} ({}, {})",
            alert.title, alert.category, alert.severity
        );
        println!("    {}", alert.description);
        println!("    {} - {}", alert.location, alert.elapsed);
    }
    Ok(())
}

fn handle_traffic(config: &Config, json: bool) -> anyhow::Result<()> {
    let data = load_dataset(config)?;
    let corridors = data.corridors();
    let counts = count_by_status(corridors, |corridor| corridor.status);
    let high_traffic = is_high_traffic(corridors);

    if json {
        let board = serde_json::json!({
            "counts": counts,
            "high_traffic": high_traffic,
            "corridors": corridors,
        });
        println!("{}", serde_json::to_string_pretty(&board)?);
        return Ok(());
    }

    for (class, count) in &counts {
        println!("{:<10} {count}", class.label());
    }
    println!();
    for corridor in corridors {
        println!(
            "{:<20} {:<10} {:<10} {:>5}",
            corridor.name,
            corridor.status.label(),
            corridor.avg_time,
            corridor.change_label()
        );
    }
    if high_traffic {
        println!();
        println!("High traffic: multiple major roads are congested. Consider alternative routes.");
    }
    Ok(())
}

fn handle_token(config: &Config, cmd: TokenCommand) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    match cmd {
        TokenCommand::Set { value } => {
            let Some(credential) = Credential::parse(&value) else {
                bail!("access token must not be blank");
            };
            store.save(&credential)?;
            println!("Stored {credential}");
        }
        TokenCommand::Show => match store.load()? {
            Some(stored) => println!(
                "{} (updated {})",
                stored.credential,
                stored.updated_at.to_rfc3339()
            ),
            None => println!("No access token stored."),
        },
        TokenCommand::Clear => {
            if store.clear()? {
                println!("Access token removed.");
            } else {
                println!("No access token stored.");
            }
        }
    }
    Ok(())
}

async fn handle_map(config: &Config, cmd: &MapCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let data = load_dataset(config)?;
    let mut options = config.map_options();
    if cmd.no_controls {
        options.show_controls = false;
    }

    let backend = RecordingBackend::new();
    let log = backend.shared_log();
    let mut session = MapSession::new(backend, store, data, options)?;

    let view = session.mount(ContainerId("map".to_string()));
    if let SurfaceView::CredentialForm { error } = &view {
        if let Some(error) = error {
            println!("Map failed to load: {error}");
        }
        println!("No usable access token. Run `mapema token set <TOKEN>` first.");
        return Ok(());
    }

    session.controller_mut().backend_mut().fire_all_ready();
    session.wait_ready().await?;
    let final_view = session.view();
    session.unmount();

    let calls = log.borrow().clone();
    if cmd.json {
        let report = serde_json::json!({ "view": final_view, "calls": calls });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for call in &calls {
            println!("{}", serde_json::to_string(call)?);
        }
        println!();
        println!("{} widget calls, surface was {final_view:?}", calls.len());
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Map:");
                println!("  Style:          {}", config.map.style);
                println!(
                    "  Center:         {}, {}",
                    config.map.center.lng(),
                    config.map.center.lat()
                );
                println!("  Zoom:           {}", config.map.zoom);
                println!("  Pitch:          {}", config.map.pitch);
                println!("  Controls:       {}", config.map.show_controls);
                println!();
                println!("Storage:");
                println!("  Database:       {}", config.database_path().display());
                println!();
                println!("Data:");
                match &config.data.seed_path {
                    Some(path) => println!("  Seed file:      {}", path.display()),
                    None => println!("  Seed file:      (built-in)"),
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating: {}", path.display());
            Config::load_from(Some(path)).context("configuration is invalid")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
