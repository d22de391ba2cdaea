//! Off-thread fetch dispatch.
//!
//! Catalog calls run on background threads; results come back over a channel
//! and are applied on the caller's thread. Each dispatch is tagged with a
//! monotonic sequence number captured at issue time, and a completed result
//! is dropped unless it belongs to the most recently issued request, so a
//! slow early search can never overwrite a newer one.

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

pub struct FetchQueue<T> {
    tx: Sender<(u64, T)>,
    rx: Receiver<(u64, T)>,
    latest: u64,
}

impl<T: Send + 'static> FetchQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        FetchQueue { tx, rx, latest: 0 }
    }

    /// Runs `job` on a background thread. Returns the sequence number the
    /// result will carry.
    pub fn dispatch<F>(&mut self, job: F) -> u64
    where
        F: FnOnce() -> T + Send + 'static,
    {
        self.latest += 1;
        let seq = self.latest;
        let tx = self.tx.clone();
        thread::spawn(move || {
            // The receiver may be gone if the queue was dropped mid-flight.
            let _ = tx.send((seq, job()));
        });
        seq
    }

    /// Waits for the result of the most recently dispatched request,
    /// discarding results of any request it superseded. `None` on timeout or
    /// if nothing was dispatched.
    pub fn recv_latest(&self, timeout: Duration) -> Option<T> {
        if self.latest == 0 {
            return None;
        }
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            match self.rx.recv_timeout(remaining) {
                Ok((seq, value)) if seq == self.latest => return Some(value),
                Ok((seq, _)) => log::debug!("discarding stale fetch result #{}", seq),
                Err(RecvTimeoutError::Timeout) => return None,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn latest_request_wins() {
        let mut queue: FetchQueue<&'static str> = FetchQueue::new();
        // The first job finishes only after the second one; its result must
        // still be dropped because a newer request was issued.
        let (release_tx, release_rx) = mpsc::channel();
        queue.dispatch(move || {
            release_rx.recv().unwrap();
            "stale"
        });
        queue.dispatch(|| "fresh");
        release_tx.send(()).unwrap();
        assert_eq!(queue.recv_latest(Duration::from_secs(5)), Some("fresh"));
    }

    #[test]
    fn stale_results_left_in_channel_are_skipped() {
        let mut queue: FetchQueue<u64> = FetchQueue::new();
        queue.dispatch(|| 1);
        // Let the first result land in the channel before superseding it.
        std::thread::sleep(Duration::from_millis(50));
        queue.dispatch(|| 2);
        assert_eq!(queue.recv_latest(Duration::from_secs(5)), Some(2));
    }

    #[test]
    fn empty_queue_and_timeout_yield_none() {
        let mut queue: FetchQueue<u64> = FetchQueue::new();
        assert_eq!(queue.recv_latest(Duration::from_millis(10)), None);
        let (_hold_tx, hold_rx) = mpsc::channel::<()>();
        queue.dispatch(move || {
            let _ = hold_rx.recv();
            7
        });
        assert_eq!(queue.recv_latest(Duration::from_millis(50)), None);
    }
}
