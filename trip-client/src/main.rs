use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use trip_client::api::ApiClient;
use trip_client::config::{ClientConfig, TimelineConfig};
use trip_client::domain::PlanId;
use trip_client::map::{MapOverlay, OverlayOptions, Router};
use trip_client::session::Session;
use trip_client::timeline::{EditSession, EndTime};

const USAGE: &str = "usage: trip-client <plan-id> [selected-day]";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(plan_id) = args.next() else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };
    let selected_day = match args.next().map(|d| d.parse::<u32>()) {
        None => 1,
        Some(Ok(day)) if day > 0 => day,
        Some(_) => {
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let session = match &config.token {
        Some(token) => Session::with_token(token.clone()),
        None => Session::new(),
    };

    let api = match ApiClient::new(&config, session) {
        Ok(api) => api,
        Err(e) => {
            error!(error = %e, "failed to create API client");
            return ExitCode::FAILURE;
        }
    };
    let router = match Router::new(&config, Some(api.clone())) {
        Ok(router) => router,
        Err(e) => {
            error!(error = %e, "failed to create routing client");
            return ExitCode::FAILURE;
        }
    };

    info!(base_url = api.base_url(), plan = %plan_id, "fetching plan");
    let plan = match api.get_plan(&PlanId::new(plan_id)).await {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
    };

    let edit = EditSession::new(plan, TimelineConfig::default());
    let plan = edit.plan();

    println!("{} ({} days, {} people)", plan.title, plan.days, plan.people);
    for day in 1..=plan.days {
        println!();
        println!("Day {day}");
        for entry in edit.timeline(day) {
            let end = match entry.end {
                EndTime::At(time) if time.day_offset() > 0 => {
                    format!("{} (+{})", time.wrapped(), time.day_offset())
                }
                EndTime::At(time) => time.to_string(),
                EndTime::NextDay => "next day".to_string(),
            };
            println!("  {} - {}  {}", entry.start.wrapped(), end, entry.name);
            if let Some(segment) = entry.transport {
                let assumed = if segment.assumed { " (assumed)" } else { "" };
                println!("      ↓ {} {} min{assumed}", segment.mode, segment.minutes);
            }
        }
    }

    let options = OverlayOptions::selected(selected_day);
    let overlay =
        MapOverlay::build(Some(&plan.id), &plan.area, edit.spots(), &options, &router).await;

    println!();
    println!("Map: {} markers", overlay.markers.len());
    for day_route in &overlay.routes {
        let distance = day_route
            .route
            .distance_km
            .map(|km| format!("{km:.1} km"))
            .unwrap_or_else(|| "-".to_string());
        let duration = day_route
            .route
            .duration_minutes
            .map(|min| format!("{} min", min.round()))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  Day {} route ({}): {distance}, {duration} via {:?}",
            day_route.day, day_route.style.color, day_route.route.source
        );
    }

    ExitCode::SUCCESS
}
