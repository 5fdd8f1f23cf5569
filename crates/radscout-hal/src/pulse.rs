//! The asynchronous radiation pulse line.
//!
//! A Geiger tube fires pulses from hardware context at its own rate; the
//! core never polls the tube directly.  Instead, a [`PulseSource`] driver is
//! handed a [`PulseSink`] once at startup and delivers every pulse event to
//! it.  The sink side (the pulse counter in `radscout-perception`) is the
//! only state shared between the pulse context and the control loop, and it
//! must therefore be `Send + Sync`.

use std::sync::Arc;
use std::time::Instant;

use radscout_types::RadError;

/// Consumer of raw pulse events.
///
/// `on_pulse` is invoked from the source's own context (interrupt handler or
/// background thread) and must never fail the caller or block indefinitely.
pub trait PulseSink: Send + Sync {
    /// A pulse fired at `at`.  Malformed or out-of-order events may be
    /// dropped silently by the implementation.
    fn on_pulse(&self, at: Instant);
}

/// A hardware line (or simulation) that raises pulse events asynchronously.
pub trait PulseSource {
    /// Stable identifier for this source, e.g. `"cajoe_gpio18"` or `"sim"`.
    fn id(&self) -> &str;

    /// Register `sink` and begin delivering pulse events to it.
    ///
    /// # Errors
    ///
    /// Returns [`RadError::PulseSource`] when the line cannot be opened or
    /// the source is already running.
    fn start(&mut self, sink: Arc<dyn PulseSink>) -> Result<(), RadError>;

    /// Stop delivering events.  Idempotent.
    fn stop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink {
        received: AtomicUsize,
    }

    impl PulseSink for CountingSink {
        fn on_pulse(&self, _at: Instant) {
            self.received.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn sink_is_callable_through_dyn_arc() {
        let sink: Arc<dyn PulseSink> = Arc::new(CountingSink {
            received: AtomicUsize::new(0),
        });
        sink.on_pulse(Instant::now());
        sink.on_pulse(Instant::now());

        // Downcast is not needed; just verify through a fresh reference.
        let concrete = Arc::new(CountingSink {
            received: AtomicUsize::new(0),
        });
        let as_dyn: Arc<dyn PulseSink> = concrete.clone();
        as_dyn.on_pulse(Instant::now());
        assert_eq!(concrete.received.load(Ordering::SeqCst), 1);
    }
}
