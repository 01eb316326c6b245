//! Independent trackers for several camera streams, stepped in parallel.

use crate::config::TrackerConfig;
use crate::decoder::CodeCatalog;
use crate::error::ConfigError;
use crate::models::{GrayFrame, Quad, TrackedMarker};
use crate::tracker::{AssociationPolicy, GreedyNearest, Tracker};
use rayon::prelude::*;
use std::sync::Arc;

/// One stream's input for a frame.
#[derive(Debug, Clone, Copy)]
pub struct StreamInput<'a> {
    /// Grayscale frame
    pub frame: GrayFrame<'a>,
    /// Quads from the external detector
    pub detections: &'a [Quad],
}

/// A set of trackers sharing one catalog and nothing else.
#[derive(Debug)]
pub struct StreamSet<P = GreedyNearest> {
    trackers: Vec<Tracker<P>>,
}

impl StreamSet<GreedyNearest> {
    /// Create `streams` trackers with the same configuration.
    pub fn new(
        streams: usize,
        config: TrackerConfig,
        catalog: Arc<CodeCatalog>,
    ) -> Result<Self, ConfigError> {
        let trackers = (0..streams)
            .map(|_| Tracker::new(config, Arc::clone(&catalog)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { trackers })
    }
}

impl<P: AssociationPolicy + Send> StreamSet<P> {
    /// Wrap trackers built elsewhere.
    pub fn from_trackers(trackers: Vec<Tracker<P>>) -> Self {
        Self { trackers }
    }

    /// Number of streams
    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    /// No streams
    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    /// Tracker for stream `index`
    pub fn tracker(&self, index: usize) -> Option<&Tracker<P>> {
        self.trackers.get(index)
    }

    /// Step every stream with its own input, in parallel.
    ///
    /// `inputs[i]` goes to stream `i`. Streams without an input are not
    /// stepped this round; surplus inputs are ignored.
    pub fn step_all(&mut self, inputs: &[StreamInput<'_>]) -> Vec<Vec<TrackedMarker>> {
        if inputs.len() != self.trackers.len() {
            tracing::warn!(
                streams = self.trackers.len(),
                inputs = inputs.len(),
                "stream/input count mismatch"
            );
        }
        self.trackers
            .par_iter_mut()
            .zip(inputs.par_iter())
            .enumerate()
            .map(|(index, (tracker, input))| {
                let _span = tracing::info_span!("stream", index).entered();
                tracker.step(&input.frame, input.detections)
            })
            .collect()
    }
}
