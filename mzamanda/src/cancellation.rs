use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// A cooperative signal to stop a parse early. It is polled once after every data row, a
/// cancelled parse returns the matches aggregated so far.
pub trait CancellationSignal {
    /// Check if the work should stop
    fn is_cancelled(&self) -> bool;
}

/// A signal that never cancels
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NeverCancelled;

impl CancellationSignal for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl CancellationSignal for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: CancellationSignal + ?Sized> CancellationSignal for Arc<T> {
    fn is_cancelled(&self) -> bool {
        self.as_ref().is_cancelled()
    }
}

impl<F: Fn() -> bool> CancellationSignal for F {
    fn is_cancelled(&self) -> bool {
        self()
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn signals() {
        assert!(!NeverCancelled.is_cancelled());
        let flag = Arc::new(AtomicBool::new(false));
        assert!(!flag.is_cancelled());
        flag.store(true, Ordering::Relaxed);
        assert!(flag.is_cancelled());
        assert!((|| true).is_cancelled());
    }
}
