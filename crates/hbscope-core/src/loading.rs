// Loading-flag guard shared by the managers.
//
// Each manager counts its in-flight operations; the flag is true while the
// count is non-zero. The guard decrements on drop, so every exit path
// (early return, `?`, a dropped future) is covered, and nested or
// overlapping operations keep the flag up until the last one ends.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::watch;

pub(crate) struct LoadingGuard<'a, S> {
    tx: &'a watch::Sender<S>,
    in_flight: &'a AtomicUsize,
    flag: fn(&mut S) -> &mut bool,
}

impl<'a, S> LoadingGuard<'a, S> {
    pub(crate) fn start(
        tx: &'a watch::Sender<S>,
        in_flight: &'a AtomicUsize,
        flag: fn(&mut S) -> &mut bool,
    ) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        tx.send_modify(|state| *flag(state) = true);
        Self {
            tx,
            in_flight,
            flag,
        }
    }
}

impl<S> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        let flag = self.flag;
        let in_flight = self.in_flight;
        self.tx.send_modify(|state| {
            let remaining = in_flight.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
            *flag(state) = remaining > 0;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Flag {
        loading: bool,
    }

    #[test]
    fn flag_is_cleared_on_drop() {
        let (tx, rx) = watch::channel(Flag::default());
        let count = AtomicUsize::new(0);
        {
            let _guard = LoadingGuard::start(&tx, &count, |s| &mut s.loading);
            assert!(rx.borrow().loading);
        }
        assert!(!rx.borrow().loading);
    }

    #[test]
    fn overlapping_guards_keep_flag_until_last() {
        let (tx, rx) = watch::channel(Flag::default());
        let count = AtomicUsize::new(0);

        let first = LoadingGuard::start(&tx, &count, |s| &mut s.loading);
        let second = LoadingGuard::start(&tx, &count, |s| &mut s.loading);
        drop(first);
        assert!(rx.borrow().loading);
        drop(second);
        assert!(!rx.borrow().loading);
    }
}
