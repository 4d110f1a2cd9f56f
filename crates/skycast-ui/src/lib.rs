//! Terminal dashboard for Skycast
//!
//! A line-oriented front end over the HTTP API: lists tracked cities and
//! shows their grouped 5-day forecasts.

pub mod api;
pub mod command;
pub mod dashboard;
pub mod render;

use skycast_core::{LocationPatch, Units};
use tokio::io::{AsyncBufReadExt, BufReader};

pub use api::{ApiClient, ApiError};
pub use command::Command;
pub use dashboard::Dashboard;

/// Run the interactive dashboard against a server until `quit` or EOF.
///
/// # Errors
/// Fails when the server URL is invalid or stdin cannot be read.
pub async fn run(base_url: &str, units: Units) -> anyhow::Result<()> {
    let api = ApiClient::new(base_url)?;
    match api.health().await {
        Ok(health) => tracing::info!("Connected to {} ({})", api.base_url(), health.status),
        Err(e) => tracing::warn!("Health check against {} failed: {}", api.base_url(), e),
    }

    let mut dashboard = Dashboard::new(api).with_units(units);
    dashboard.refresh().await;
    println!("{}", render::render(&dashboard));
    println!("{}", Command::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => {
                println!("{}", Command::HELP);
                continue;
            }
            Command::Refresh => dashboard.refresh().await,
            Command::Add(city) => dashboard.add_city(&city).await,
            Command::Delete(n) => {
                if let Some(id) = id_at(&dashboard, n) {
                    dashboard.delete(&id).await;
                }
            }
            Command::Sync(n) => {
                if let Some(id) = id_at(&dashboard, n) {
                    dashboard.sync(&id).await;
                }
            }
            Command::Forecast(n) => {
                if let Some(id) = id_at(&dashboard, n) {
                    dashboard.toggle_forecast(&id).await;
                }
            }
            Command::Favorite(n) => {
                if let Some(location) = dashboard.location_at(n).cloned() {
                    let patch = LocationPatch {
                        is_favorite: Some(!location.is_favorite),
                        ..LocationPatch::default()
                    };
                    let result = dashboard.api().update_location(&location.id, &patch).await;
                    match result {
                        Ok(_) => dashboard.refresh().await,
                        Err(e) => dashboard.error = Some(e.user_message()),
                    }
                }
            }
            Command::History(n) => {
                if let Some(id) = id_at(&dashboard, n) {
                    let result = dashboard.api().snapshots(&id).await;
                    match result {
                        Ok(snapshots) => {
                            println!("{}", render::render_snapshots(&snapshots, units));
                            continue;
                        }
                        Err(e) => dashboard.error = Some(e.user_message()),
                    }
                }
            }
        }

        println!("{}", render::render(&dashboard));
        dashboard.dismiss_error();
    }

    Ok(())
}

fn id_at(dashboard: &Dashboard, position: usize) -> Option<String> {
    let id = dashboard.location_at(position).map(|l| l.id.clone());
    if id.is_none() {
        println!("No city at position {}", position);
    }
    id
}
