use hotspot_trilateration::ranging::{PathLossModel, PathLossRangeEstimator};
use hotspot_trilateration::utils::config::{ConfigurationManager, EngineConfig};
use hotspot_trilateration::{
    GeoPoint, PositioningEngine, PositioningError, PositioningModel, ReceiverObservation, SignalFeatures,
};
use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Receiver report as delivered by the network integration
#[derive(Debug, Deserialize)]
struct ReceiverJson {
    id: String,
    lat: f64,
    lng: f64,
    rssi: f64,
    snr: f64,
    datarate: String,
    frequency: f64,
}

#[derive(Debug, Deserialize)]
struct UplinkJson {
    device_id: String,
    receivers: Vec<ReceiverJson>,
}

fn parse_uplink(json: &str) -> Result<(String, Vec<ReceiverObservation>), Box<dyn std::error::Error>> {
    let uplink: UplinkJson = serde_json::from_str(json)?;
    let mut observations = Vec::with_capacity(uplink.receivers.len());
    for r in uplink.receivers {
        let features = SignalFeatures::from_report(r.rssi, r.snr, &r.datarate, r.frequency)?;
        observations.push(ReceiverObservation::new(r.id, GeoPoint::from((r.lat, r.lng)), features));
    }
    Ok((uplink.device_id, observations))
}

/// Short label for a failed estimate; collaborator failures are not retried here
fn failure_kind(err: &PositioningError) -> &'static str {
    if err.is_collaborator_failure() {
        "collaborator unavailable"
    } else {
        "rejected input"
    }
}

/// RSSI the path-loss model expects at `distance_m`
fn rssi_at(model: &PathLossModel, distance_m: f64) -> f64 {
    model.reference_rssi_dbm - 10.0 * model.path_loss_exponent * (distance_m / model.reference_distance_m).log10()
}

/// Synthetic device heard by one, two and then three receivers
fn demo(config: EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let model = config.path_loss;
    let engine = PositioningEngine::with_config(Box::new(PathLossRangeEstimator::new(model)), config)?;

    let target = GeoPoint::new(47.4777, 12.0531);
    let sites = [
        ("hotspot-north", GeoPoint::new(47.4827, 12.0531)),
        ("hotspot-southwest", GeoPoint::new(47.4747, 12.0471)),
        ("hotspot-southeast", GeoPoint::new(47.4747, 12.0591)),
    ];

    let observations: Vec<ReceiverObservation> = sites
        .iter()
        .map(|(id, location)| {
            let distance = hotspot_trilateration::algorithms::geodesic::distance(location, &target);
            ReceiverObservation::new(*id, *location, SignalFeatures::new(rssi_at(&model, distance), 5.0, 9, 868.1))
        })
        .collect();

    info!(target_position = %target, "running demo scenario");
    for count in 0..=observations.len() {
        let prediction = engine.estimate_position("demo-device", &observations[..count])?;
        let error_m = prediction
            .position()
            .map(|p| hotspot_trilateration::algorithms::geodesic::distance(&p, &target));
        match error_m {
            Some(e) => println!("{} receiver(s): {} (off by {:.1} m)", count, prediction, e),
            None => println!("{} receiver(s): {}", count, prediction),
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map_or("hotspot-trilateration", |s| s.as_str());

    let config = match args.get(2) {
        Some(path) => ConfigurationManager::from_file(path)?.get_config().clone(),
        None => EngineConfig::default(),
    };

    match args.get(1).map(|s| s.as_str()) {
        Some("--demo") => demo(config),
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            let (device_id, observations) = parse_uplink(&json)?;

            let estimator = PathLossRangeEstimator::new(config.path_loss);
            let engine = PositioningEngine::with_config(Box::new(estimator), config)?;
            let prediction = match engine.estimate_position(&device_id, &observations) {
                Ok(prediction) => prediction,
                Err(e) => {
                    error!(device = %device_id, kind = failure_kind(&e), "estimate failed: {}", e);
                    return Err(e.into());
                }
            };

            if prediction.model != Some(PositioningModel::Trilateration) {
                info!(receivers = observations.len(), "prediction used a reduced model");
            }
            println!("{}", serde_json::to_string_pretty(&prediction)?);
            Ok(())
        }
        None => {
            eprintln!("Usage: {} <uplink_json> [config_json]", program);
            eprintln!("   or: {} --demo [config_json]", program);
            Err("Invalid arguments".into())
        }
    }
}
