#![forbid(unsafe_code)]

//! Cooperative main-thread task queue.
//!
//! Work that must observe settled state (for example, reconciling after a host
//! transition has finished) is posted to the [`MainQueue`] and runs on a later
//! turn, when the event loop drains it.
//!
//! # Invariants
//!
//! 1. Tasks run in FIFO order, on the thread that posted them.
//! 2. [`MainQueue::run_turn`] only runs tasks that were queued before it was
//!    called; tasks they post wait for the next turn.
//! 3. No queue borrow is held while a task runs, so tasks may post more tasks.

use std::cell::RefCell;
use std::collections::VecDeque;

type Task = Box<dyn FnOnce()>;

thread_local! {
    static QUEUE: RefCell<VecDeque<Task>> = const { RefCell::new(VecDeque::new()) };
}

/// Turns after which [`MainQueue::run_until_idle`] gives up.
const MAX_IDLE_TURNS: usize = 1024;

/// Handle to the thread-local main queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct MainQueue;

impl MainQueue {
    /// Post `task` to run on a later turn.
    pub fn spawn(task: impl FnOnce() + 'static) {
        QUEUE.with(|queue| queue.borrow_mut().push_back(Box::new(task)));
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn pending() -> usize {
        QUEUE.with(|queue| queue.borrow().len())
    }

    /// Run one turn: every task queued before this call.
    ///
    /// Returns the number of tasks run.
    pub fn run_turn() -> usize {
        let budget = Self::pending();
        let mut ran = 0;
        while ran < budget {
            let Some(task) = QUEUE.with(|queue| queue.borrow_mut().pop_front()) else {
                break;
            };
            task();
            ran += 1;
        }
        ran
    }

    /// Run turns until the queue is empty.
    ///
    /// Returns the total number of tasks run.
    pub fn run_until_idle() -> usize {
        let mut total = 0;
        for _ in 0..MAX_IDLE_TURNS {
            let ran = Self::run_turn();
            if ran == 0 {
                return total;
            }
            total += ran;
        }
        tracing::warn!(
            target: "navstack",
            pending = Self::pending(),
            "main queue still busy after {MAX_IDLE_TURNS} turns"
        );
        total
    }

    /// Drop every queued task without running it.
    pub fn clear() {
        QUEUE.with(|queue| queue.borrow_mut().clear());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn tasks_run_in_order() {
        MainQueue::clear();
        let log = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let log = Rc::clone(&log);
            MainQueue::spawn(move || log.borrow_mut().push(i));
        }
        assert_eq!(MainQueue::pending(), 3);
        assert_eq!(MainQueue::run_turn(), 3);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn tasks_posted_during_turn_wait() {
        MainQueue::clear();
        let ran = Rc::new(Cell::new(0));
        let r = Rc::clone(&ran);
        MainQueue::spawn(move || {
            r.set(r.get() + 1);
            let r = Rc::clone(&r);
            MainQueue::spawn(move || r.set(r.get() + 10));
        });

        assert_eq!(MainQueue::run_turn(), 1);
        assert_eq!(ran.get(), 1);
        assert_eq!(MainQueue::pending(), 1);

        assert_eq!(MainQueue::run_until_idle(), 1);
        assert_eq!(ran.get(), 11);
    }

    #[test]
    fn clear_discards() {
        MainQueue::spawn(|| panic!("must not run"));
        MainQueue::clear();
        assert_eq!(MainQueue::run_until_idle(), 0);
    }
}
