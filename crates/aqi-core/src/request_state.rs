//! Per-operation request tracking for the search/display flow.
//!
//! Every outgoing request is stamped with a generation. Only the result whose
//! generation is still current may touch state; older results are discarded.

/// The two asynchronous operations of the search flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    SearchPlaces,
    FetchReadings,
}

impl RequestKind {
    pub fn label(self) -> &'static str {
        match self {
            RequestKind::SearchPlaces => "place search",
            RequestKind::FetchReadings => "reading fetch",
        }
    }
}

/// Generation counter plus in-flight flag for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTracker {
    kind: RequestKind,
    generation: u64,
    in_flight: bool,
}

impl RequestTracker {
    pub fn new(kind: RequestKind) -> Self {
        Self {
            kind,
            generation: 0,
            in_flight: false,
        }
    }

    /// True while the current generation has not completed.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a new request; any older in-flight request becomes stale.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.in_flight = true;
        self.generation
    }

    /// Drop whatever is in flight without starting anything new.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.in_flight = false;
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Record completion of `generation`.
    ///
    /// Returns false for stale generations, which must not be applied.
    pub fn finish(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            tracing::debug!(
                "Discarding stale {} result (generation {}, current {})",
                self.kind.label(),
                generation,
                self.generation
            );
            return false;
        }
        self.in_flight = false;
        true
    }
}
