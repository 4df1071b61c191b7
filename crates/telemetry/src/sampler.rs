//! Process and host resource sampling
//!
//! Memory and load figures come from `sysinfo`; per-process CPU time comes
//! from `getrusage` on Unix. Unsupported platforms report zeros.

use crate::models::{CpuUsage, MemoryUsage, SystemLoad};
use std::sync::{Mutex, PoisonError};
use sysinfo::{Pid, System};
use tracing::debug;

/// Source of process resource readings
pub trait ResourceSampler: Send + Sync {
    /// Current process memory
    fn memory(&self) -> MemoryUsage;

    /// Cumulative process CPU time
    fn cpu_time(&self) -> CpuUsage;

    /// Host load averages and memory
    fn system_load(&self) -> SystemLoad;
}

/// Sampler for the running process backed by `sysinfo`
pub struct ProcessSampler {
    system: Mutex<System>,
    pid: Option<Pid>,
}

impl ProcessSampler {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                debug!(error = %e, "Current pid unavailable, process memory will read as zero");
                None
            }
        };

        Self {
            system: Mutex::new(System::new()),
            pid,
        }
    }
}

impl Default for ProcessSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceSampler for ProcessSampler {
    fn memory(&self) -> MemoryUsage {
        let Some(pid) = self.pid else {
            return MemoryUsage::default();
        };

        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        if !system.refresh_process(pid) {
            return MemoryUsage::default();
        }

        system
            .process(pid)
            .map(|process| MemoryUsage {
                resident_bytes: process.memory(),
                virtual_bytes: process.virtual_memory(),
            })
            .unwrap_or_default()
    }

    fn cpu_time(&self) -> CpuUsage {
        process_cpu_time()
    }

    fn system_load(&self) -> SystemLoad {
        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        system.refresh_memory();

        let load_average = if cfg!(target_os = "linux") {
            let load = System::load_average();
            [load.one, load.five, load.fifteen]
        } else {
            [0.0; 3]
        };

        SystemLoad {
            load_average,
            free_memory_bytes: system.free_memory(),
            total_memory_bytes: system.total_memory(),
        }
    }
}

#[cfg(unix)]
fn process_cpu_time() -> CpuUsage {
    let mut usage = std::mem::MaybeUninit::<libc::rusage>::zeroed();
    // SAFETY: getrusage only writes into the struct we own; RUSAGE_SELF is always valid.
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if rc != 0 {
        return CpuUsage::default();
    }
    // SAFETY: zero-initialised and filled in by a successful getrusage call.
    let usage = unsafe { usage.assume_init() };

    CpuUsage {
        user_micros: timeval_micros(&usage.ru_utime),
        system_micros: timeval_micros(&usage.ru_stime),
    }
}

#[cfg(unix)]
fn timeval_micros(tv: &libc::timeval) -> u64 {
    let secs = u64::try_from(tv.tv_sec).unwrap_or(0);
    let micros = u64::try_from(tv.tv_usec).unwrap_or(0);
    secs * 1_000_000 + micros
}

#[cfg(not(unix))]
fn process_cpu_time() -> CpuUsage {
    CpuUsage::default()
}

/// Sampler returning constant readings, for tests and embedding
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSampler {
    pub memory: MemoryUsage,
    pub cpu: CpuUsage,
    pub load: SystemLoad,
}

impl ResourceSampler for FixedSampler {
    fn memory(&self) -> MemoryUsage {
        self.memory
    }

    fn cpu_time(&self) -> CpuUsage {
        self.cpu
    }

    fn system_load(&self) -> SystemLoad {
        self.load
    }
}
