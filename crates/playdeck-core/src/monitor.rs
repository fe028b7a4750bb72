//! Buffering monitor - periodic buffered-fraction sampling

use crate::backend::BackendAdapter;
use crate::types::BufferInfo;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Samples the backend's buffered fraction on a fixed cadence and hands
/// each [`BufferInfo`] to the sink.
///
/// The published fraction is clamped to be non-decreasing for the lifetime
/// of the monitor; a monitor never outlives its source. The timer is
/// released the moment the buffer completes, and [`BufferingMonitor::stop`]
/// (or drop) tears it down early on a source switch.
pub struct BufferingMonitor {
    task: JoinHandle<()>,
}

impl BufferingMonitor {
    pub fn spawn(
        adapter: Arc<dyn BackendAdapter>,
        cadence: Duration,
        sink: impl Fn(BufferInfo) + Send + 'static,
    ) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(cadence);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            let mut high_water: f64 = 0.0;

            loop {
                ticker.tick().await;

                let sampled = adapter.buffered_fraction().clamp(0.0, 1.0);
                high_water = high_water.max(sampled);

                let info = BufferInfo {
                    fraction: high_water,
                    is_complete: high_water >= 1.0,
                };
                sink(info);

                if info.is_complete {
                    debug!("buffer complete, monitor releasing its timer");
                    break;
                }
            }
        });

        Self { task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for BufferingMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}
