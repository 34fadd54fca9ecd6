use std::sync::atomic::{AtomicBool, Ordering};

/// Flag set by the SIGINT handler so the capture loop can wind down.
static SIGINT_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Signal handler for Ctrl+C.
///
/// Sets a flag that the capture loop checks between batches, then re-arms
/// the default handler so a second Ctrl+C terminates immediately.
/// Only uses async-signal-safe operations.
#[cfg(unix)]
extern "C" fn handle_sigint(_: libc::c_int) {
    SIGINT_RECEIVED.store(true, Ordering::SeqCst);
    unsafe {
        libc::signal(libc::SIGINT, libc::SIG_DFL);
    }
}

#[cfg(unix)]
pub(crate) fn install_sigint_handler() -> anyhow::Result<()> {
    unsafe {
        // SAFETY: handle_sigint is an extern "C" signal handler with no side effects
        // beyond flipping an atomic flag and re-arming the default disposition,
        // both of which are async-signal-safe.
        let handler = handle_sigint as *const () as libc::sighandler_t;
        if libc::signal(libc::SIGINT, handler) == libc::SIG_ERR {
            hearsay::log_debug("failed to install SIGINT handler");
            return Err(anyhow::anyhow!("failed to install SIGINT handler"));
        }
    }
    Ok(())
}

/// Without a handler the process dies on Ctrl+C before it can finalize,
/// which is the stock behavior anyway.
#[cfg(not(unix))]
pub(crate) fn install_sigint_handler() -> anyhow::Result<()> {
    Ok(())
}

pub(crate) fn interrupted() -> bool {
    SIGINT_RECEIVED.load(Ordering::SeqCst)
}
