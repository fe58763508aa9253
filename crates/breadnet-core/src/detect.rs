//! Seam to the upstream detector.
//!
//! The detector is loaded once per process and handed to request handlers as
//! an explicit [`Pipeline`] handle. Nothing in this crate loads weights or
//! keeps global state, so tests plug in canned [`Detections`] instead.

use std::sync::Arc;

use anyhow::Context;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ResolveConfig};
use crate::model::{Component, MarkerRef, Wire};
use crate::response::ResolveResponse;

/// Components and wires located in one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detections {
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub wires: Vec<Wire>,
}

/// Image-to-detections model. Must tolerate concurrent read-only calls.
pub trait Detector: Send + Sync {
    fn detect(&self, image: &[u8]) -> anyhow::Result<Detections>;
}

/// Fixed detections, returned for every image.
impl Detector for Detections {
    fn detect(&self, _image: &[u8]) -> anyhow::Result<Detections> {
        Ok(self.clone())
    }
}

/// Detector plus resolver settings, shared by every request handler.
#[derive(Clone)]
pub struct Pipeline {
    detector: Arc<dyn Detector>,
    config: ResolveConfig,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(detector: Arc<dyn Detector>, config: ResolveConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { detector, config })
    }

    pub fn config(&self) -> &ResolveConfig {
        &self.config
    }

    /// Detect, then resolve. Detector failures are errors; resolution
    /// failures are reported inside the response.
    pub fn analyze(
        &self,
        image: &[u8],
        ground_markers: &[MarkerRef],
        power_markers: &[MarkerRef],
    ) -> anyhow::Result<ResolveResponse> {
        let detections = self
            .detector
            .detect(image)
            .with_context(|| format!("Detection failed on {} byte image", image.len()))?;
        debug!(
            "detector returned {} components and {} wires",
            detections.components.len(),
            detections.wires.len()
        );

        let result = crate::resolve(
            &detections.components,
            &detections.wires,
            ground_markers,
            power_markers,
            &self.config,
        );
        Ok(ResolveResponse::from_result(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ComponentKind;

    struct Broken;

    impl Detector for Broken {
        fn detect(&self, _image: &[u8]) -> anyhow::Result<Detections> {
            anyhow::bail!("weights not loaded")
        }
    }

    fn canned() -> Detections {
        Detections {
            components: vec![
                Component::new(1, ComponentKind::Source, [(0.0, 0.0), (0.0, 100.0)])
                    .with_value("DC 5"),
                Component::new(2, ComponentKind::Resistor, [(100.0, 0.0), (100.0, 100.0)])
                    .with_value("220"),
            ],
            wires: vec![
                Wire::new(1, (0.0, 0.0), (100.0, 0.0)),
                Wire::new(2, (0.0, 100.0), (100.0, 100.0)),
            ],
        }
    }

    #[test]
    fn test_shared_pipeline_across_threads() {
        let pipeline = Pipeline::new(Arc::new(canned()), ResolveConfig::default()).unwrap();
        let ground = [MarkerRef::terminal(1, 1)];

        let netlists: Vec<Option<String>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| pipeline.analyze(b"jpeg", &ground, &[])))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap().netlist)
                .collect()
        });

        assert!(netlists.iter().all(|n| n == &netlists[0]));
        assert_eq!(
            netlists[0].as_deref(),
            Some("V1 1 0 DC 5\nR1 1 0 220\n.end\n")
        );
    }

    #[test]
    fn test_detector_failure_is_an_error() {
        let pipeline = Pipeline::new(Arc::new(Broken), ResolveConfig::default()).unwrap();
        let err = pipeline.analyze(&[0; 16], &[], &[]).unwrap_err();
        assert_eq!(err.to_string(), "Detection failed on 16 byte image");
        assert_eq!(err.root_cause().to_string(), "weights not loaded");
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(Pipeline::new(Arc::new(canned()), ResolveConfig::new(f64::INFINITY)).is_err());
    }
}
