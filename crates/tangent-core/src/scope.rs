// ── Coordinator scope ──
//
// Entities deep inside a UI tree find the active `Tuner` through a
// thread-local stack instead of threading it through every constructor.
// Using the coordinator with nothing installed is a programming error.

use std::cell::RefCell;
use std::marker::PhantomData;

use crate::error::CoreError;
use crate::tuner::Tuner;

thread_local! {
    static INSTALLED: RefCell<Vec<Tuner>> = const { RefCell::new(Vec::new()) };
}

/// Keeps a tuner installed on the current thread until dropped.
///
/// Scopes nest; the innermost one wins. The guard is `!Send` so it cannot be
/// dropped on a different thread than the one it was installed on.
#[must_use = "the tuner is uninstalled as soon as the guard is dropped"]
pub struct ScopeGuard {
    _not_send: PhantomData<*const ()>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        INSTALLED.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Install `tuner` for the current thread.
pub fn enter(tuner: &Tuner) -> ScopeGuard {
    INSTALLED.with(|stack| stack.borrow_mut().push(tuner.clone()));
    ScopeGuard {
        _not_send: PhantomData,
    }
}

/// Run `f` with `tuner` installed.
pub fn with<R>(tuner: &Tuner, f: impl FnOnce() -> R) -> R {
    let _guard = enter(tuner);
    f()
}

/// The innermost installed tuner.
pub fn try_current() -> Result<Tuner, CoreError> {
    INSTALLED
        .with(|stack| stack.borrow().last().cloned())
        .ok_or(CoreError::OutsideScope)
}

/// The innermost installed tuner.
///
/// # Panics
///
/// Panics when called outside any scope.
pub fn current() -> Tuner {
    match try_current() {
        Ok(tuner) => tuner,
        Err(e) => panic!("{e}"),
    }
}
