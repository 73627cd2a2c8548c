//! Accelerated kernel availability probe
//!
//! Per INTEGRITY.md §4:
//! - Probed once per process, cached for the process lifetime
//! - Excluded architectures always use the portable path
//! - The flag selects a kernel; it never changes computed values

use std::sync::OnceLock;

/// Cached probe result, resolved on first use and never re-evaluated.
static ACCELERATION_AVAILABLE: OnceLock<bool> = OnceLock::new();

/// Architecture families with no accelerated kernels, matched by name
/// prefix against `std::env::consts::ARCH`.
const EXCLUDED_ARCHES: &[&str] = &["sparc"];

/// Returns whether the accelerated checksum kernels are usable on this
/// host.
///
/// Safe for unsynchronized concurrent reads from any number of threads;
/// the value never changes after the first call.
pub fn is_acceleration_available() -> bool {
    *ACCELERATION_AVAILABLE.get_or_init(|| probe(std::env::consts::ARCH))
}

/// Decides acceleration for a host architecture name.
///
/// Kept separate from the cache so the decision is testable with
/// arbitrary architecture names.
pub(crate) fn probe(arch: &str) -> bool {
    if EXCLUDED_ARCHES
        .iter()
        .any(|excluded| arch.starts_with(excluded))
    {
        return false;
    }
    accelerated_kernels_initialized()
}

/// Whether the accelerated kernels initialized on this CPU.
#[cfg(target_arch = "x86_64")]
fn accelerated_kernels_initialized() -> bool {
    std::arch::is_x86_feature_detected!("sse4.2")
}

#[cfg(target_arch = "aarch64")]
fn accelerated_kernels_initialized() -> bool {
    std::arch::is_aarch64_feature_detected!("crc")
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
fn accelerated_kernels_initialized() -> bool {
    false
}
