//! Positioning engine: model selection, degradation and trilateration
//!
//! One call turns the receivers that heard a device into a [`Prediction`].
//! The engine is stateless between calls and can be shared across threads.

use crate::algorithms::classification::IntersectionClassifier;
use crate::algorithms::estimation::PositionEstimator;
use crate::algorithms::fallback::{midpoint_model, nearest_neighbor, order_receivers};
use crate::algorithms::intersection::CircleIntersector;
use crate::algorithms::projection::UtmProjector;
use crate::api::types::{PositioningModel, Prediction};
use crate::core::{GeoPoint, RangeEstimate, ReceiverObservation, TRILATERATION_RECEIVERS};
use crate::ranging::{ObservationSource, RangeEstimator};
use crate::utils::config::{ConfigurationManager, EngineConfig};
use crate::validation::data::DataValidator;
use crate::validation::error::{PositioningError, PositioningResult};
use tracing::{debug, info, warn};

/// Multilateration engine for LoRa devices
pub struct PositioningEngine {
    /// Injected signal-to-distance model
    range_estimator: Box<dyn RangeEstimator>,
    config: EngineConfig,
    classifier: IntersectionClassifier,
    estimator: PositionEstimator,
    validator: DataValidator,
}

impl PositioningEngine {
    /// Create an engine with the default configuration
    pub fn new(range_estimator: Box<dyn RangeEstimator>) -> Self {
        Self::assemble(range_estimator, EngineConfig::default())
    }

    /// Create an engine with a validated configuration
    pub fn with_config(range_estimator: Box<dyn RangeEstimator>, config: EngineConfig) -> PositioningResult<Self> {
        let validation = ConfigurationManager::validate_config(&config);
        for warning in &validation.warnings {
            warn!("{}", warning);
        }
        if let Some(err) = validation.errors.into_iter().next() {
            return Err(PositioningError::Config(err));
        }

        Ok(Self::assemble(range_estimator, config))
    }

    fn assemble(range_estimator: Box<dyn RangeEstimator>, config: EngineConfig) -> Self {
        let classifier = build_classifier(&config);
        // Pair collapsing and candidate merging share one tolerance
        let estimator = PositionEstimator::new(classifier.merge_tolerance_m());
        Self {
            range_estimator,
            config,
            classifier,
            estimator,
            validator: DataValidator::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Estimate the position of `device_id` from the receivers that heard it.
    ///
    /// The configured model runs when enough receivers are present, otherwise
    /// the engine steps down to the next reduced model. Without receivers the
    /// prediction carries no coordinates. Range estimator failures are
    /// returned unchanged.
    pub fn estimate_position(
        &self,
        device_id: &str,
        observations: &[ReceiverObservation],
    ) -> PositioningResult<Prediction> {
        self.validator.validate_observations(observations)?;

        let Some(model) = self.select_model(observations.len()) else {
            info!(device = device_id, "no receivers, prediction not possible");
            return Ok(Prediction::unlocated(device_id));
        };

        if model != self.config.model {
            warn!(
                device = device_id,
                receivers = observations.len(),
                requested = %self.config.model,
                using = %model,
                "not enough receivers, using reduced model"
            );
        }

        let ordering = self.config.signal_ordering;
        let position = match model {
            PositioningModel::Trilateration => self.trilaterate(observations)?,
            PositioningModel::Midpoint => Some(midpoint_model(observations, ordering)?),
            PositioningModel::NearestNeighbor => nearest_neighbor(observations, ordering),
        };

        match position {
            Some(p) => {
                debug!(device = device_id, model = %model, position = %p, "position estimated");
                Ok(Prediction::located(device_id, p, model))
            }
            None => {
                warn!(device = device_id, model = %model, "intersection layout has no estimate");
                Ok(Prediction::unlocated(device_id))
            }
        }
    }

    /// Fetch the observations of `device_id` once and estimate its position
    pub fn predict_device(&self, source: &dyn ObservationSource, device_id: &str) -> PositioningResult<Prediction> {
        let observations = source.observations(device_id)?;
        debug!(device = device_id, receivers = observations.len(), "observations loaded");
        self.estimate_position(device_id, &observations)
    }

    /// Strongest model the receiver count supports, starting from the configured one
    fn select_model(&self, receivers: usize) -> Option<PositioningModel> {
        let mut model = Some(self.config.model);
        while let Some(m) = model {
            if receivers >= m.min_receivers() {
                return Some(m);
            }
            model = m.reduced();
        }
        None
    }

    /// Range every receiver, then intersect the first three in signal order
    fn trilaterate(&self, observations: &[ReceiverObservation]) -> PositioningResult<Option<GeoPoint>> {
        let ranked = order_receivers(observations, self.config.signal_ordering);
        if ranked.len() > TRILATERATION_RECEIVERS {
            debug!(
                ignored = ranked.len() - TRILATERATION_RECEIVERS,
                "using the first three receivers"
            );
        }

        let mut ranges = Vec::with_capacity(ranked.len());
        for receiver in ranked {
            let distance_m = self.range_estimator.estimate_range(&receiver.features)?;
            let range = RangeEstimate {
                receiver: receiver.clone(),
                distance_m,
            };
            self.validator.validate_range(&range)?;
            ranges.push(range);
        }
        ranges.truncate(TRILATERATION_RECEIVERS);

        let classified = self.classifier.classify(&ranges)?;
        debug!(
            singles = classified.singles.len(),
            doubles = classified.doubles.len(),
            empties = classified.empties,
            "intersections classified"
        );

        let centres: Vec<GeoPoint> = ranges.iter().map(|r| r.receiver.location).collect();
        Ok(self.estimator.estimate(&classified, &centres))
    }
}

fn build_classifier(config: &EngineConfig) -> IntersectionClassifier {
    IntersectionClassifier::new(
        UtmProjector::wgs84(),
        CircleIntersector::with_tangent_epsilon(config.tangent_epsilon_m),
        config.merge_tolerance_m,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SignalFeatures;
    use crate::ranging::{InMemoryDirectory, RangeError, SourceError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn obs(id: &str, lat: f64, lon: f64, rssi: f64) -> ReceiverObservation {
        ReceiverObservation::new(id, GeoPoint::new(lat, lon), SignalFeatures::new(rssi, 5.0, 9, 868.1))
    }

    fn fixed_range(distance_m: f64) -> Box<dyn RangeEstimator> {
        Box::new(move |_: &SignalFeatures| -> Result<f64, RangeError> { Ok(distance_m) })
    }

    #[test]
    fn test_no_receivers_is_unlocated() {
        let engine = PositioningEngine::new(fixed_range(100.0));
        let prediction = engine.estimate_position("dev", &[]).unwrap();
        assert_eq!(prediction, Prediction::unlocated("dev"));
    }

    #[test]
    fn test_model_selection_degrades() {
        let engine = PositioningEngine::new(fixed_range(100.0));
        assert_eq!(engine.select_model(0), None);
        assert_eq!(engine.select_model(1), Some(PositioningModel::NearestNeighbor));
        assert_eq!(engine.select_model(2), Some(PositioningModel::Midpoint));
        assert_eq!(engine.select_model(3), Some(PositioningModel::Trilateration));
        assert_eq!(engine.select_model(7), Some(PositioningModel::Trilateration));
    }

    #[test]
    fn test_configured_model_is_respected() {
        let config = EngineConfig {
            model: PositioningModel::NearestNeighbor,
            ..EngineConfig::default()
        };
        let engine = PositioningEngine::with_config(fixed_range(100.0), config).unwrap();
        let receivers = vec![
            obs("a", 47.0, 12.0, -90.0),
            obs("b", 47.01, 12.0, -110.0),
            obs("c", 47.0, 12.01, -100.0),
        ];

        let prediction = engine.estimate_position("dev", &receivers).unwrap();
        assert_eq!(prediction.model, Some(PositioningModel::NearestNeighbor));
        assert_eq!(prediction.position(), Some(GeoPoint::new(47.01, 12.0)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            merge_tolerance_m: -3.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            PositioningEngine::with_config(fixed_range(1.0), config),
            Err(PositioningError::Config(_))
        ));
    }

    #[test]
    fn test_every_receiver_ranged_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let estimator = move |_: &SignalFeatures| -> Result<f64, RangeError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(500.0)
        };
        let engine = PositioningEngine::new(Box::new(estimator));
        let receivers = vec![
            obs("a", 47.000, 12.000, -90.0),
            obs("b", 47.005, 12.000, -95.0),
            obs("c", 47.000, 12.005, -100.0),
            obs("d", 47.005, 12.005, -105.0),
        ];

        engine.estimate_position("dev", &receivers).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_trilateration_keeps_first_three_in_signal_order() {
        use crate::algorithms::fallback::SignalOrdering;
        use crate::algorithms::geodesic;

        let target = GeoPoint::new(47.004, 12.003);
        let strong_far = obs("a", 47.2, 12.3, -80.0);
        let cluster = [
            obs("b", 47.0, 12.0, -120.0),
            obs("c", 47.0, 12.01, -110.0),
            obs("d", 47.01, 12.0, -100.0),
        ];
        // Exact ranges for the cluster, a deliberately wrong one for the far receiver
        let mut table: Vec<(f64, f64)> = cluster
            .iter()
            .map(|r| (r.features.rssi, geodesic::distance(&r.location, &target)))
            .collect();
        table.push((strong_far.features.rssi, 100.0));
        let by_rssi = move || -> Box<dyn RangeEstimator> {
            let table = table.clone();
            Box::new(move |f: &SignalFeatures| -> Result<f64, RangeError> {
                Ok(table.iter().find(|(rssi, _)| *rssi == f.rssi).unwrap().1)
            })
        };

        let mut all = vec![strong_far.clone()];
        all.extend(cluster.iter().cloned());

        // Ascending: the three weakest, so the far receiver is dropped
        let ascending = PositioningEngine::new(by_rssi());
        let weakest_first = ascending.estimate_position("dev", &all).unwrap();
        assert_eq!(weakest_first, ascending.estimate_position("dev", &cluster).unwrap());
        let position = weakest_first.position().unwrap();
        assert!(geodesic::distance(&position, &target) < 25.0);

        // Descending: the three strongest, so receiver b is dropped
        let config = EngineConfig {
            signal_ordering: SignalOrdering::Descending,
            ..EngineConfig::default()
        };
        let descending = PositioningEngine::with_config(by_rssi(), config).unwrap();
        let strongest_first = descending.estimate_position("dev", &all).unwrap();
        let without_b = vec![strong_far, cluster[2].clone(), cluster[1].clone()];
        assert_eq!(strongest_first, descending.estimate_position("dev", &without_b).unwrap());
        assert_ne!(strongest_first, weakest_first);
    }

    #[test]
    fn test_negative_range_rejected() {
        let engine = PositioningEngine::new(fixed_range(-1.0));
        let receivers = vec![
            obs("a", 47.0, 12.0, -90.0),
            obs("b", 47.01, 12.0, -95.0),
            obs("c", 47.0, 12.01, -100.0),
        ];
        assert!(matches!(
            engine.estimate_position("dev", &receivers),
            Err(PositioningError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_coincident_receivers_yield_no_position() {
        let engine = PositioningEngine::new(fixed_range(100.0));
        let receivers = vec![
            obs("a", 47.0, 12.0, -90.0),
            obs("b", 47.0, 12.0, -95.0),
            obs("c", 47.0, 12.0, -100.0),
        ];

        let prediction = engine.estimate_position("dev", &receivers).unwrap();
        assert!(!prediction.is_located());
    }

    #[test]
    fn test_predict_device_from_directory() {
        let mut directory = InMemoryDirectory::new();
        directory.insert("dev-1", vec![obs("a", 10.0, 20.0, -100.0)]);
        let engine = PositioningEngine::new(fixed_range(100.0));

        let prediction = engine.predict_device(&directory, "dev-1").unwrap();
        assert_eq!(prediction.position(), Some(GeoPoint::new(10.0, 20.0)));

        match engine.predict_device(&directory, "dev-2") {
            Err(PositioningError::DirectoryUnavailable(SourceError::DeviceNotFound { device_id })) => {
                assert_eq!(device_id, "dev-2")
            }
            other => panic!("expected directory error, got {:?}", other),
        }
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PositioningEngine>();
    }
}
