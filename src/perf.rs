//! Timing instrumentation for the drag engine.
//!
//! Intersection passes and frame processing run on every animation frame
//! while a drag is active, so both are timed:
//!
//! - **Scoped timers**: RAII timing of a block, logged when over threshold
//! - **Frame monitor**: rolling average of engine frame cost
//! - **Hit test profiler**: candidate counts per intersection pass
//!
//! Enable verbose timing with the `profiling` feature:
//! ```toml
//! [dependencies]
//! humanboard-dnd = { features = ["profiling"] }
//! ```
//!
//! ```ignore
//! fn calculate_drag_intersect() {
//!     profile_scope!("calculate_drag_intersect");
//!     // ... hit testing ...
//! }
//! ```

use std::collections::VecDeque;
use std::time::Instant;
#[cfg(feature = "profiling")]
use tracing::trace;
use tracing::warn;

/// Budget of one 60 FPS frame
pub const TARGET_FRAME_MS: f64 = 16.67;

/// Samples kept for rolling averages
const SAMPLE_COUNT: usize = 60;

/// Warn when engine work alone takes this share of a frame
const FRAME_WARN_RATIO: f64 = 0.5;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Time the enclosing scope. Only active with the `profiling` feature.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::for_profiling($name);
        #[cfg(not(feature = "profiling"))]
        let _ = $name;
    };
    ($name:expr, $threshold_ms:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::new($name, $threshold_ms);
        #[cfg(not(feature = "profiling"))]
        let _ = ($name, $threshold_ms);
    };
}

pub use profile_scope;

// ============================================================================
// Scoped Timer
// ============================================================================

/// Logs its lifetime on drop when it exceeds the threshold.
pub struct ScopedTimer {
    name: &'static str,
    start: Instant,
    threshold_ms: f64,
}

impl ScopedTimer {
    pub fn new(name: &'static str, threshold_ms: f64) -> Self {
        Self {
            name,
            start: Instant::now(),
            threshold_ms,
        }
    }

    /// Timer with a 1ms threshold.
    pub fn for_profiling(name: &'static str) -> Self {
        Self::new(name, 1.0)
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        if elapsed_ms <= self.threshold_ms {
            return;
        }

        #[cfg(feature = "profiling")]
        trace!("[PERF] {}: {:.2}ms", self.name, elapsed_ms);

        #[cfg(not(feature = "profiling"))]
        warn!(
            operation = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            threshold_ms = format!("{:.2}", self.threshold_ms),
            "Slow operation"
        );
    }
}

/// Run `f` and return its result with the elapsed milliseconds.
#[inline]
pub fn measure<T, F: FnOnce() -> T>(f: F) -> (T, f64) {
    let start = Instant::now();
    let result = f();
    (result, start.elapsed().as_secs_f64() * 1000.0)
}

// ============================================================================
// Frame Monitor
// ============================================================================

/// Rolling statistics of the engine's per-frame work.
#[derive(Debug, Default)]
pub struct FrameMonitor {
    samples: VecDeque<f64>,
    total_frames: u64,
    slow_frames: u64,
}

impl FrameMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the cost of one processed frame.
    pub fn record(&mut self, elapsed_ms: f64) {
        if self.samples.len() >= SAMPLE_COUNT {
            self.samples.pop_front();
        }
        self.samples.push_back(elapsed_ms);
        self.total_frames += 1;

        if elapsed_ms > TARGET_FRAME_MS * FRAME_WARN_RATIO {
            self.slow_frames += 1;
            warn!(
                frame_ms = format!("{:.2}", elapsed_ms),
                target_ms = format!("{:.2}", TARGET_FRAME_MS),
                "Drag frame over budget"
            );
        }
    }

    pub fn average_ms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn max_ms(&self) -> f64 {
        self.samples.iter().copied().fold(0.0, f64::max)
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn slow_frames(&self) -> u64 {
        self.slow_frames
    }
}

// ============================================================================
// Hit Test Profiler
// ============================================================================

/// Candidate counts and timing of intersection passes.
#[derive(Debug, Default)]
pub struct HitTestProfiler {
    /// Candidates after accept filtering in the last pass
    pub items_tested: usize,
    pub last_test_ms: f64,
    avg_items: f64,
    test_count: u64,
}

impl HitTestProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, items_tested: usize, elapsed_ms: f64) {
        self.items_tested = items_tested;
        self.last_test_ms = elapsed_ms;
        self.test_count += 1;

        // Exponential moving average
        let alpha = 0.1;
        self.avg_items = self.avg_items * (1.0 - alpha) + items_tested as f64 * alpha;
    }

    pub fn test_count(&self) -> u64 {
        self.test_count
    }

    /// Large candidate sets taking over a millisecond per pass.
    pub fn is_bottleneck(&self) -> bool {
        self.avg_items > 100.0 && self.last_test_ms > 1.0
    }
}
