//! Shared plumbing for the exported entry points: errno reporting and the
//! two synthetic failures this layer can produce on its own (`EMFILE` on a
//! reserved-region collision, `ENOSYS` on a missing kernel backend).

use std::ffi::c_int;

use fdshunt_core::fdspace;

use crate::nextsym;

/// Write `err` into the host's errno slot.
///
/// This layer sits in front of a real libc rather than replacing it, so
/// synthetic errors must land in the host's thread-local errno, where the
/// caller will look for them.
pub(crate) fn set_errno(err: c_int) {
    // SAFETY: glibc's __errno_location returns a valid pointer to this
    // thread's errno for the life of the thread.
    unsafe {
        *libc::__errno_location() = err;
    }
}

/// Kernel-path failure when no next definition exists. The null target is
/// never invoked; the call fails with `ENOSYS` instead.
pub(crate) fn missing_next_int() -> c_int {
    set_errno(libc::ENOSYS);
    -1
}

/// `ssize_t` flavor of [`missing_next_int`].
pub(crate) fn missing_next_ssize() -> libc::ssize_t {
    set_errno(libc::ENOSYS);
    -1
}

/// Collision check for kernel calls that allocate descriptors.
///
/// A kernel result landing in the reserved alternate region would be
/// indistinguishable from a stack descriptor in every later call, so the
/// stray descriptor is closed again through the kernel backend and the
/// call fails with `EMFILE`. Failed results (negative) and descriptors
/// below the watermark pass through untouched, errno included.
pub(crate) fn reject_reserved(fd: c_int) -> c_int {
    if !fdspace::is_alternate(fd) {
        return fd;
    }
    if let Some(real_close) = nextsym::real_close() {
        // SAFETY: closing the descriptor the kernel just handed us.
        unsafe {
            real_close(fd);
        }
    }
    set_errno(libc::EMFILE);
    -1
}

/// Test-side view of the host errno this module writes.
#[cfg(test)]
pub(crate) fn last_errno() -> c_int {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}
