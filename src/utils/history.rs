//! Fixed-capacity brightness window backed by a ring buffer.

/// Brightness range `(max, min)` reported when the window has no contrast yet
pub const FULL_SCALE: u8 = u8::MAX;

/// Sliding window of the most recent brightness samples for one candidate.
///
/// Pushing past capacity overwrites the oldest sample in place; no per-sample
/// allocation happens after construction.
#[derive(Debug, Clone)]
pub struct BrightnessHistory {
    buf: Box<[u8]>,
    head: usize,
    len: usize,
}

impl BrightnessHistory {
    /// Create an empty window holding at most `capacity` samples.
    ///
    /// Capacity is validated by the tracker configuration; a zero capacity
    /// is bumped to one so the buffer is never empty.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity.max(1)].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    /// Append a sample, evicting the oldest when full.
    pub fn push(&mut self, sample: u8) {
        let cap = self.buf.len();
        if self.len < cap {
            self.buf[(self.head + self.len) % cap] = sample;
            self.len += 1;
        } else {
            self.buf[self.head] = sample;
            self.head = (self.head + 1) % cap;
        }
    }

    /// `(max, min)` over every sample except the newest.
    ///
    /// `max` falls back to [`FULL_SCALE`] if nothing scanned is above 0 and
    /// `min` falls back to 0 if nothing scanned is below full scale, so an
    /// empty or flat window never yields `max < min`.
    pub fn stats(&self) -> (u8, u8) {
        let mut max = 0u8;
        let mut min = FULL_SCALE;
        for sample in self.iter().take(self.len.saturating_sub(1)) {
            max = max.max(sample);
            min = min.min(sample);
        }
        let max = if max != 0 { max } else { FULL_SCALE };
        let min = if min != FULL_SCALE { min } else { 0 };
        (max, min)
    }

    /// Samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        let cap = self.buf.len();
        (0..self.len).map(move |i| self.buf[(self.head + i) % cap])
    }

    /// Most recent sample
    pub fn latest(&self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }
        Some(self.buf[(self.head + self.len - 1) % self.buf.len()])
    }

    /// Number of samples held
    pub fn len(&self) -> usize {
        self.len
    }

    /// No samples yet
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of samples held
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }
}
