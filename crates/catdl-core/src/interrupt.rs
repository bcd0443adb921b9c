//! Operator interrupt: a shared abort token set from a SIGINT handler.
//!
//! Transfers poll the token from their libcurl progress callback and the retry
//! loop checks it between attempts, so Ctrl-C ends the run instead of being
//! treated as one more transient failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable abort token. All clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst) || SIGINT_RECEIVED.load(Ordering::SeqCst)
    }
}

static SIGINT_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn on_sigint(_signum: libc::c_int) {
    // Second Ctrl-C falls through to the default action (terminate).
    if SIGINT_RECEIVED.swap(true, Ordering::SeqCst) {
        unsafe {
            libc::signal(libc::SIGINT, libc::SIG_DFL);
            libc::raise(libc::SIGINT);
        }
    }
}

/// Install a SIGINT handler that raises every `InterruptFlag` in the process.
/// On non-Unix targets the default Ctrl-C behaviour (terminate) is kept.
pub fn install_sigint_handler() {
    #[cfg(unix)]
    {
        let handler = on_sigint as extern "C" fn(libc::c_int);
        let previous = unsafe { libc::signal(libc::SIGINT, handler as libc::sighandler_t) };
        if previous == libc::SIG_ERR {
            tracing::warn!("could not install SIGINT handler; Ctrl-C will terminate immediately");
        } else {
            tracing::debug!("SIGINT handler installed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let a = InterruptFlag::new();
        let b = a.clone();
        assert!(!b.is_raised());
        a.raise();
        assert!(b.is_raised());
    }
}
