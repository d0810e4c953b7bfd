//! Host setup and host information
//!
//! OS-level hints (CPU pinning, elevated priority) are requested once, at
//! startup, through an explicit [`ProcessSetup`]. Every hint is best-effort:
//! refusal only adds measurement noise and is logged, never fatal.

mod host;

pub use host::{detect_cache_levels, HostInfo};

/// One-time process configuration applied before any measurement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSetup {
    pub pin_core: Option<usize>,
    pub high_priority: bool,
}

/// What the OS actually granted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupReport {
    pub pinned_core: Option<usize>,
    pub priority_raised: bool,
}

impl ProcessSetup {
    pub fn apply(&self) -> SetupReport {
        let pinned_core = self.pin_core.filter(|&core| {
            let ok = pin_current_thread(core);
            if !ok {
                log::warn!("could not pin to CPU {core}; continuing unpinned");
            }
            ok
        });

        let priority_raised = self.high_priority && {
            let ok = raise_priority();
            if !ok {
                log::warn!("could not raise process priority (may need elevated privileges)");
            }
            ok
        };

        log::debug!("process setup: pinned={pinned_core:?} priority_raised={priority_raised}");
        SetupReport {
            pinned_core,
            priority_raised,
        }
    }
}

#[cfg(target_os = "linux")]
fn pin_current_thread(core: usize) -> bool {
    if core >= libc::CPU_SETSIZE as usize {
        return false;
    }
    // SAFETY: a zeroed cpu_set_t is a valid empty set, and we pass its exact
    // size for the calling thread (pid 0).
    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_SET(core, &mut set);
        libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set) == 0
    }
}

#[cfg(windows)]
fn pin_current_thread(core: usize) -> bool {
    use windows_sys::Win32::System::Threading::{GetCurrentThread, SetThreadAffinityMask};

    if core >= usize::BITS as usize {
        return false;
    }
    // SAFETY: GetCurrentThread returns a pseudo-handle valid for this thread.
    unsafe { SetThreadAffinityMask(GetCurrentThread(), 1usize << core) != 0 }
}

#[cfg(not(any(target_os = "linux", windows)))]
fn pin_current_thread(_core: usize) -> bool {
    false
}

#[cfg(unix)]
fn raise_priority() -> bool {
    // SAFETY: setpriority has no memory-safety preconditions.
    unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, -20) == 0 }
}

#[cfg(windows)]
fn raise_priority() -> bool {
    use windows_sys::Win32::System::Threading::{GetCurrentProcess, SetPriorityClass, HIGH_PRIORITY_CLASS};

    // SAFETY: GetCurrentProcess returns a pseudo-handle valid for this process.
    unsafe { SetPriorityClass(GetCurrentProcess(), HIGH_PRIORITY_CLASS) != 0 }
}

#[cfg(not(any(unix, windows)))]
fn raise_priority() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_setup_requests_nothing() {
        assert_eq!(ProcessSetup::default().apply(), SetupReport::default());
    }

    #[test]
    fn impossible_core_is_not_reported_as_pinned() {
        let report = ProcessSetup {
            pin_core: Some(usize::MAX),
            high_priority: false,
        }
        .apply();
        assert_eq!(report.pinned_core, None);
        assert!(!report.priority_raised);
    }
}
