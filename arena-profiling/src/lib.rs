/*!
Zero-cost profiling abstraction layer with Tracy integration.

These macros compile to no-ops when the `profiling` feature is disabled,
so the tick orchestrator and LOS engine can be instrumented unconditionally
without paying for it in a production build that ships without the feature.

## Usage

```rust,no_run
use arena_profiling::{span, frame_mark};

fn tick() {
    span!("tick");

    {
        span!("los");
        // visibility pass
    }

    frame_mark!();
}
```

## Tracy integration

Built with `--features profiling`, this crate wires up to the Tracy
profiler: run a Tracy server alongside the arena server binary and it
connects automatically.
*/

#![cfg_attr(not(feature = "profiling"), no_std)]

#[cfg(feature = "profiling")]
pub use tracy_client;

/// Measures the execution time of the enclosing scope.
#[macro_export]
macro_rules! span {
    ($name:expr) => {
        #[cfg(feature = "profiling")]
        let _tracy_span = $crate::tracy_client::span!($name);
    };
}

/// Marks a tick boundary so Tracy can compute tick rate.
#[macro_export]
macro_rules! frame_mark {
    () => {
        #[cfg(feature = "profiling")]
        $crate::tracy_client::Client::running()
            .expect("Tracy client should be running")
            .frame_mark();
    };
}

/// Plots a numeric value over time (used for the rolling tick/LOS stats).
#[macro_export]
macro_rules! plot {
    ($name:expr, $value:expr) => {
        #[cfg(feature = "profiling")]
        $crate::tracy_client::Client::running()
            .expect("Tracy client should be running")
            .plot($crate::tracy_client::PlotName::new_leak($name.to_string()), $value as f64);
    };
}

/// Emits a text message to the Tracy timeline.
#[macro_export]
macro_rules! message {
    ($($arg:tt)*) => {
        #[cfg(feature = "profiling")]
        {
            let msg = format!($($arg)*);
            $crate::tracy_client::Client::running()
                .expect("Tracy client should be running")
                .message(&msg, 0);
        }
    };
}

pub struct Profiler;

impl Profiler {
    /// Whether Tracy is connected and actively recording.
    pub fn is_enabled() -> bool {
        #[cfg(feature = "profiling")]
        {
            tracy_client::Client::is_running()
        }
        #[cfg(not(feature = "profiling"))]
        {
            false
        }
    }
}
