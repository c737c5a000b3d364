#[cfg(feature = "cli")]
use std::sync::Mutex;
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// 單一訓練階段結束時的資源快照
#[derive(Debug, Clone)]
pub struct StageStats {
    pub stage: String,
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed: Duration,
}

#[cfg(feature = "cli")]
struct ProcessTracker {
    system: System,
    pid: Pid,
    peak_memory_mb: u64,
}

#[cfg(feature = "cli")]
pub struct ResourceMonitor {
    tracker: Option<Mutex<ProcessTracker>>,
    start_time: Instant,
}

#[cfg(feature = "cli")]
impl ResourceMonitor {
    pub fn new(enabled: bool) -> Self {
        let tracker = if enabled {
            match sysinfo::get_current_pid() {
                Ok(pid) => {
                    let mut system = System::new();
                    system.refresh_processes_specifics(
                        ProcessesToUpdate::Some(&[pid]),
                        true,
                        ProcessRefreshKind::everything(),
                    );
                    Some(Mutex::new(ProcessTracker {
                        system,
                        pid,
                        peak_memory_mb: 0,
                    }))
                }
                Err(e) => {
                    tracing::warn!("⚠️ Resource monitoring unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            tracker,
            start_time: Instant::now(),
        }
    }

    pub fn snapshot(&self, stage: &str) -> Option<StageStats> {
        let mut tracker = self.tracker.as_ref()?.lock().ok()?;
        let pid = tracker.pid;
        tracker.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::everything(),
        );

        let (cpu_usage, memory_mb) = {
            let process = tracker.system.process(pid)?;
            (process.cpu_usage(), process.memory() / 1024 / 1024)
        };
        if memory_mb > tracker.peak_memory_mb {
            tracker.peak_memory_mb = memory_mb;
        }

        Some(StageStats {
            stage: stage.to_string(),
            cpu_usage,
            memory_usage_mb: memory_mb,
            peak_memory_mb: tracker.peak_memory_mb,
            elapsed: self.start_time.elapsed(),
        })
    }

    pub fn log_stage(&self, stage: &str) {
        if let Some(stats) = self.snapshot(stage) {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Time: {:?}",
                stats.stage,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.peak_memory_mb,
                stats.elapsed
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.tracker.is_some()
    }
}

// 非 CLI 建置只保留計時
#[cfg(not(feature = "cli"))]
pub struct ResourceMonitor {
    start_time: Instant,
}

#[cfg(not(feature = "cli"))]
impl ResourceMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    pub fn snapshot(&self, _stage: &str) -> Option<StageStats> {
        None
    }

    pub fn log_stage(&self, stage: &str) {
        tracing::debug!("{} finished after {:?}", stage, self.start_time.elapsed());
    }

    pub fn is_enabled(&self) -> bool {
        false
    }
}

impl Default for ResourceMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
