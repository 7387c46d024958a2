//! Optional process resource sampling behind the `--monitor` switch.

#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy)]
pub struct ResourceSample {
    pub cpu_percent: f32,
    pub memory_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed: Duration,
}

#[cfg(feature = "cli")]
struct Probe {
    system: System,
    pid: Pid,
    peak_memory_mb: u64,
}

/// Samples the current process through `sysinfo`. A disabled monitor carries
/// no probe at all, so the disabled path costs nothing per stage.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    probe: Option<Mutex<Probe>>,
    started: Instant,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let probe = enabled
            .then(|| sysinfo::get_current_pid().ok())
            .flatten()
            .map(|pid| {
                Mutex::new(Probe {
                    system: System::new_all(),
                    pid,
                    peak_memory_mb: 0,
                })
            });

        Self {
            probe,
            started: Instant::now(),
        }
    }

    pub fn sample(&self) -> Option<ResourceSample> {
        let mut guard = self.probe.as_ref()?.lock().ok()?;
        let probe = &mut *guard;
        probe.system.refresh_all();

        let process = probe.system.process(probe.pid)?;
        let memory_mb = process.memory() / 1024 / 1024;
        let cpu_percent = process.cpu_usage();
        probe.peak_memory_mb = probe.peak_memory_mb.max(memory_mb);

        Some(ResourceSample {
            cpu_percent,
            memory_mb,
            peak_memory_mb: probe.peak_memory_mb,
            elapsed: self.started.elapsed(),
        })
    }

    pub fn log_stats(&self, stage: &str) {
        if let Some(sample) = self.sample() {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB (peak {}MB), Elapsed: {:?}",
                stage,
                sample.cpu_percent,
                sample.memory_mb,
                sample.peak_memory_mb,
                sample.elapsed
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(sample) = self.sample() {
            tracing::info!(
                "📊 Final stats - Total time: {:?}, Peak memory: {}MB",
                sample.elapsed,
                sample.peak_memory_mb
            );
        }
    }
}

// No-op when built without the CLI feature
#[cfg(not(feature = "cli"))]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _stage: &str) {}

    pub fn log_final_stats(&self) {}
}
