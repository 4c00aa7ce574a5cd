use std::time::Duration;
#[cfg(feature = "cli")]
use std::sync::{Arc, Mutex};
#[cfg(feature = "cli")]
use std::time::Instant;
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

#[derive(Debug, Clone, Default)]
pub struct ProcessStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub samples: u64,
    pub elapsed_time: Duration,
}

/// Samples CPU and memory of the pipeline process while it runs.
#[cfg(feature = "cli")]
pub struct ProcessMonitor {
    stats: Arc<Mutex<ProcessStats>>,
    task: tokio::task::JoinHandle<()>,
}

#[cfg(feature = "cli")]
impl ProcessMonitor {
    pub fn spawn(pid: u32, interval: Duration) -> Self {
        let stats = Arc::new(Mutex::new(ProcessStats::default()));
        let shared = Arc::clone(&stats);

        let task = tokio::spawn(async move {
            let pid = Pid::from_u32(pid);
            let mut system = System::new();
            let start_time = Instant::now();
            let mut ticker = tokio::time::interval(interval);

            loop {
                ticker.tick().await;
                system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
                let Some(process) = system.process(pid) else {
                    break;
                };
                let memory_mb = process.memory() / 1024 / 1024;
                let cpu_usage = process.cpu_usage();

                let Ok(mut stats) = shared.lock() else {
                    break;
                };
                stats.cpu_usage = cpu_usage;
                stats.memory_usage_mb = memory_mb;
                stats.peak_memory_mb = stats.peak_memory_mb.max(memory_mb);
                stats.samples += 1;
                stats.elapsed_time = start_time.elapsed();
                tracing::debug!(
                    "📊 pipeline - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Time: {:?}",
                    cpu_usage,
                    memory_mb,
                    stats.peak_memory_mb,
                    stats.elapsed_time
                );
            }
        });

        Self { stats, task }
    }

    /// Stops sampling and logs the totals.
    pub fn finish(self) -> Option<ProcessStats> {
        self.task.abort();
        let stats = self.stats.lock().ok()?.clone();
        tracing::info!(
            "📊 Pipeline stats - Time: {:?}, Peak Memory: {}MB, Samples: {}",
            stats.elapsed_time,
            stats.peak_memory_mb,
            stats.samples
        );
        Some(stats)
    }
}

// No-op monitor for builds without the `cli` feature
#[cfg(not(feature = "cli"))]
pub struct ProcessMonitor;

#[cfg(not(feature = "cli"))]
impl ProcessMonitor {
    pub fn spawn(_pid: u32, _interval: Duration) -> Self {
        Self
    }

    pub fn finish(self) -> Option<ProcessStats> {
        None
    }
}
