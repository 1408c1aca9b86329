//! Shared utility functions

use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering the data if a previous holder panicked.
///
/// Controller state is plain data with no cross-field invariants that a
/// panicking reader could break halfway, so the last written value is
/// always safe to keep using.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
