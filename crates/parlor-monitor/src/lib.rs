//! Periodic system-resource sampler for Parlor.
//!
//! A timer-driven Tokio task snapshots host resource usage on a fixed
//! interval and appends each snapshot as one JSON line to a datastore file.
//! The first sample fires immediately when the task starts. Sampling
//! carries no coordination invariants — failures are logged and skipped,
//! never fatal, and the lobby core runs the same with the monitor off.
//!
//! [`take_sample`] is also usable standalone for on-demand readings.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sysinfo::System;
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the sampler task.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Time between samples.
    pub interval: Duration,

    /// File the JSON-line snapshots are appended to.
    pub output: PathBuf,

    /// Also emit each sample through `tracing` at info level.
    pub log_samples: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            output: PathBuf::from("parlor-stats.jsonl"),
            log_samples: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// One snapshot of host resource usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSample {
    /// Milliseconds since the Unix epoch at sample time.
    pub time_ms: u64,
    /// Total physical memory in bytes.
    pub total_memory: u64,
    /// Memory currently in use, in bytes.
    pub used_memory: u64,
    /// Memory currently free, in bytes.
    pub free_memory: u64,
    /// Number of logical CPUs.
    pub cpus: usize,
    /// Global CPU usage percentage (0–100).
    pub cpu_percent: u32,
}

/// Takes a fresh reading of host resource usage.
///
/// Builds a new `sysinfo::System` each call; at sampler intervals the cost
/// is negligible. The CPU percentage may read 0 on the very first call —
/// sysinfo needs a previous reading to compute the delta.
pub fn take_sample() -> SystemSample {
    let mut sys = System::new_all();
    sys.refresh_all();

    let time_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    SystemSample {
        time_ms,
        total_memory: sys.total_memory(),
        used_memory: sys.used_memory(),
        free_memory: sys.free_memory(),
        cpus: sys.cpus().len(),
        cpu_percent: (sys.global_cpu_info().cpu_usage() as u32).min(100),
    }
}

/// Appends one sample as a JSON line to `path`, creating the file if needed.
pub async fn append_sample(path: &Path, sample: &SystemSample) -> std::io::Result<()> {
    let mut line = serde_json::to_string(sample).map_err(std::io::Error::other)?;
    line.push('\n');

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await
}

// ---------------------------------------------------------------------------
// Sampler task
// ---------------------------------------------------------------------------

/// Handle to a running sampler task.
pub struct MonitorHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Stops the sampler and waits for its task to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }
}

/// Spawns the sampler task. The first sample is taken immediately, then one
/// per configured interval until [`MonitorHandle::shutdown`].
pub fn spawn_monitor(config: MonitorConfig) -> MonitorHandle {
    let (stop_tx, mut stop_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        tracing::info!(
            interval_secs = config.interval.as_secs(),
            output = %config.output.display(),
            "system monitor started"
        );

        let mut ticker = tokio::time::interval(config.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let sample = take_sample();
                    if config.log_samples {
                        tracing::info!(
                            total_memory = sample.total_memory,
                            used_memory = sample.used_memory,
                            free_memory = sample.free_memory,
                            cpus = sample.cpus,
                            cpu_percent = sample.cpu_percent,
                            "system sample"
                        );
                    }
                    if let Err(e) = append_sample(&config.output, &sample).await {
                        tracing::warn!(error = %e, "failed to record system sample");
                    }
                }
                _ = stop_rx.changed() => break,
            }
        }

        tracing::info!("system monitor stopped");
    });

    MonitorHandle {
        stop: stop_tx,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_sample_is_plausible() {
        let sample = take_sample();
        assert!(sample.total_memory > 0);
        assert!(sample.used_memory <= sample.total_memory);
        assert!(sample.cpus > 0);
        assert!(sample.cpu_percent <= 100);
        assert!(sample.time_ms > 0);
    }

    #[tokio::test]
    async fn test_append_sample_writes_parseable_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.jsonl");

        let sample = take_sample();
        append_sample(&path, &sample).await.unwrap();
        append_sample(&path, &sample).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let parsed: SystemSample = serde_json::from_str(line).unwrap();
            assert_eq!(parsed.total_memory, sample.total_memory);
        }
    }

    #[tokio::test]
    async fn test_monitor_samples_then_shuts_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.jsonl");

        let handle = spawn_monitor(MonitorConfig {
            interval: Duration::from_secs(3600),
            output: path.clone(),
            log_samples: false,
        });

        // The first tick fires immediately; wait until a full line landed.
        let mut contents = String::new();
        for _ in 0..50 {
            contents = tokio::fs::read_to_string(&path).await.unwrap_or_default();
            if contents.ends_with('\n') {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        handle.shutdown().await;

        let first = contents.lines().next().expect("no sample written");
        let _: SystemSample = serde_json::from_str(first).unwrap();
    }
}
