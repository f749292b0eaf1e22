use anyhow::Result;
use compass_config::AppConfig;
use compass_engine::sim::{ScriptedLocationSource, SimulatedSensorSource, StaticPermissionGate};
use compass_engine::{CompassController, DisplayState, HeadingEngine};
use compass_geo::GeoPoint;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{info, warn};

/// How often the display heartbeat is logged.
const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Turn rate of the simulated device.
const SIM_TURN_RATE_DEG_PER_SEC: f32 = 15.0;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "compass_app=info,compass_engine=info,compass_sensors=info".into()
            }),
        )
        .init();

    info!("Heading engine demo starting");

    // Load config.
    let config = compass_config::load_config().unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    info!(
        target_lat = config.target.lat(),
        target_lng = config.target.lng(),
        delay = ?config.sensors.delay,
        "Config loaded"
    );

    let engine = HeadingEngine::start(&config);
    let mut controller = CompassController::new(
        &config,
        engine.sensor_sink(),
        engine.location_sink(),
        SimulatedSensorSource::new(SIM_TURN_RATE_DEG_PER_SEC),
        ScriptedLocationSource::new(demo_route()?),
        StaticPermissionGate::granting(),
    );

    let display_rx = engine.subscribe();
    {
        let mut session = controller.enter_foreground()?;
        if let Some(notice) = session.request_location().await? {
            info!(notice = notice.message(), "Notice");
        }

        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(?e, "Could not listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            info!("Ctrl-C received");
        };
        report_display(display_rx, ctrl_c).await;
        session.leave();
    }

    engine.shutdown().await;
    Ok(())
}

/// Log a display heartbeat until `stop` resolves or the engine goes away.
///
/// `stop` is created once and polled across iterations, so a signal that lands
/// while an update is being logged is not lost.
async fn report_display(
    mut display_rx: watch::Receiver<DisplayState>,
    stop: impl Future<Output = ()>,
) {
    tokio::pin!(stop);
    let mut last_report: Option<Instant> = None;
    loop {
        tokio::select! {
            changed = display_rx.changed() => {
                if changed.is_err() {
                    warn!("Display channel closed");
                    break;
                }
                let state = *display_rx.borrow_and_update();
                if last_report.map_or(true, |t| t.elapsed() >= REPORT_INTERVAL) {
                    last_report = Some(Instant::now());
                    info!(
                        dial = state.dial_rotation_deg,
                        marker = state.target_marker_rotation_deg,
                        on_screen = state.screen_target_angle(),
                        revision = state.revision,
                        "Display"
                    );
                }
            }
            _ = &mut stop => break,
        }
    }
}

/// A short drive west from the fallback origin.
fn demo_route() -> Result<Vec<GeoPoint>> {
    Ok(vec![
        GeoPoint::new(-6.9147, 107.6098)?,
        GeoPoint::new(-6.5971, 106.8060)?,
        GeoPoint::new(-6.2088, 106.8456)?,
    ])
}
