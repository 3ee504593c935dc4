//! Periodic refresh timers.
//!
//! One [`Scheduler`] per page.  `start` arms the timer and hands back a
//! handle that owns the timer thread exclusively; `stop` (also run on drop)
//! cancels it, after which no further ticks are delivered.  Each elapsed
//! interval unconditionally sends one [`Msg::Tick`] — there is no backoff
//! and no skip-if-already-refreshing; the store's token fencing handles
//! overlap.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::fetch::{Msg, Page};

pub struct Scheduler {
    stop_tx: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Arm the timer: every `interval`, send `Msg::Tick(page)` on `tx` until
    /// stopped or until the receiving side hangs up.
    pub fn start(interval: Duration, tx: Sender<Msg>, page: Page) -> Scheduler {
        let (stop_tx, stop_rx) = mpsc::channel();
        let thread = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    debug!(?page, "refresh tick");
                    if tx.send(Msg::Tick(page)).is_err() {
                        return;
                    }
                }
                // Stop requested, or the handle was dropped.
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            }
        });
        Scheduler {
            stop_tx,
            thread: Some(thread),
        }
    }

    /// Cancel the timer and wait for the thread to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    const INTERVAL: Duration = Duration::from_millis(25);

    fn expect_tick(rx: &mpsc::Receiver<Msg>) {
        // Allow generous slack over the nominal interval.
        match rx.recv_timeout(INTERVAL * 10) {
            Ok(Msg::Tick(page)) => assert_eq!(page, Page::Breaking),
            other => panic!("expected a tick, got {other:?}"),
        }
    }

    #[test]
    fn fires_once_per_elapsed_interval() {
        let (tx, rx) = mpsc::channel();
        let sched = Scheduler::start(INTERVAL, tx, Page::Breaking);
        for _ in 0..3 {
            expect_tick(&rx);
        }
        sched.stop();
    }

    #[test]
    fn no_ticks_after_stop() {
        let (tx, rx) = mpsc::channel();
        let sched = Scheduler::start(INTERVAL, tx, Page::Breaking);
        expect_tick(&rx);
        sched.stop();

        // Drain anything that raced the stop, then verify silence.
        while rx.try_recv().is_ok() {}
        match rx.recv_timeout(INTERVAL * 4) {
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {}
            Ok(msg) => panic!("tick after stop: {msg:?}"),
        }
    }

    #[test]
    fn dropping_the_handle_stops_the_timer() {
        let (tx, rx) = mpsc::channel();
        {
            let _sched = Scheduler::start(INTERVAL, tx, Page::Breaking);
            expect_tick(&rx);
        }
        while rx.try_recv().is_ok() {}
        assert!(matches!(
            rx.recv_timeout(INTERVAL * 4),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected)
        ));
    }

    #[test]
    fn stop_returns_promptly() {
        let (tx, _rx) = mpsc::channel();
        let sched = Scheduler::start(Duration::from_secs(300), tx, Page::Breaking);
        let started = Instant::now();
        sched.stop();
        assert!(
            started.elapsed() < Duration::from_secs(1),
            "stop must not wait out the interval"
        );
    }
}
