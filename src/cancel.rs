use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A shareable cancellation token for in-flight operations on an app.
///
/// Views cancel an on-going install or download through this; the app hands
/// out a fresh token once a previous one has been triggered, so the token
/// returned by [`crate::App::cancellable`] is always ready for a new
/// operation.
#[derive(Clone, Debug, Default)]
pub struct Cancellable {
    cancelled: Arc<AtomicBool>,
}

impl Cancellable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = Cancellable::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }
}
