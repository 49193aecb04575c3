use thiserror::Error;
use tracing::{debug, info, warn};

/// Kind of wake lock to request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeLockKind {
    /// Keep the display on
    Screen,
}

/// Errors from the wake-lock collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WakeLockError {
    /// Platform has no wake-lock support (tolerated silently)
    #[error("wake lock not supported")]
    Unsupported,

    /// Platform refused the request
    #[error("wake lock request denied: {0}")]
    Denied(String),

    /// Releasing the lock failed
    #[error("failed to release wake lock: {0}")]
    Release(String),
}

/// A held wake lock
///
/// The platform may revoke the lock on its own (e.g. when the window is
/// hidden); implementations then report `is_active() == false` and notify
/// the session with a `WakeLockReleased` event.
pub trait WakeLock {
    /// Release the lock
    ///
    /// # Errors
    /// Returns error if the platform fails to release the lock
    fn release(&mut self) -> Result<(), WakeLockError>;

    /// Whether the lock is still held
    fn is_active(&self) -> bool;
}

/// Owned wake-lock handle
pub type WakeLockHandle = Box<dyn WakeLock + Send>;

/// Source of wake locks
#[cfg_attr(test, mockall::automock)]
pub trait WakeLockProvider {
    /// Request a lock of the given kind
    ///
    /// # Errors
    /// Returns `Unsupported` when the platform has no wake-lock API
    fn request(&mut self, kind: WakeLockKind) -> Result<WakeLockHandle, WakeLockError>;
}

/// Provider for platforms without wake locks
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWakeLock;

impl WakeLockProvider for NoWakeLock {
    fn request(&mut self, _kind: WakeLockKind) -> Result<WakeLockHandle, WakeLockError> {
        Err(WakeLockError::Unsupported)
    }
}

/// Holds at most one wake lock on behalf of a session
#[derive(Default)]
pub(crate) struct WakeLockSlot {
    held: Option<WakeLockHandle>,
}

impl WakeLockSlot {
    /// Whether a live lock is held
    pub(crate) fn is_held(&self) -> bool {
        self.held.as_ref().is_some_and(|lock| lock.is_active())
    }

    /// Request a lock unless a live one is already held
    ///
    /// Returns `true` if a new lock was acquired.
    pub(crate) fn acquire<P: WakeLockProvider>(&mut self, provider: &mut P) -> bool {
        if self.is_held() {
            debug!("wake lock already held");
            return false;
        }
        self.held = None;

        match provider.request(WakeLockKind::Screen) {
            Ok(lock) => {
                info!("wake lock acquired");
                self.held = Some(lock);
                true
            }
            Err(WakeLockError::Unsupported) => {
                debug!("wake lock unsupported, continuing without it");
                false
            }
            Err(e) => {
                warn!(error = %e, "wake lock request failed");
                false
            }
        }
    }

    /// Release the held lock, if any
    ///
    /// Returns `true` if a lock was held.
    pub(crate) fn release(&mut self) -> bool {
        let Some(mut lock) = self.held.take() else {
            return false;
        };
        if let Err(e) = lock.release() {
            warn!(error = %e, "wake lock release failed");
        }
        true
    }

    /// Forget a lock the platform revoked
    ///
    /// Returns `true` if the held lock was indeed no longer active.
    pub(crate) fn forget_revoked(&mut self) -> bool {
        if self.held.as_ref().is_some_and(|lock| !lock.is_active()) {
            self.held = None;
            return true;
        }
        false
    }
}
