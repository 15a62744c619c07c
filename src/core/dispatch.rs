//! Serialized animation command dispatch.
//!
//! Every outgoing animation command, whether from the flip monitor or from
//! the notification policy engine, goes through one `Dispatcher`. Commands are
//! executed on a single dedicated worker thread in strict submission order,
//! so two overlapping triggers can never interleave animation start calls.
//!
//! When a command needs the device awake through the animation start, a
//! self-expiring wake-lock is taken *before* the command enters the queue;
//! the worker never releases it explicitly, so a crashed or slow worker
//! cannot hold power indefinitely.
//!
//! `stop_essential_now` bypasses the queue for the teardown path, where
//! immediacy matters more than ordering.

use std::sync::mpsc::{Sender, channel};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::io::wakelock::WakeLock;
use crate::sink::AnimationSink;

/// One command for the animation sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationCommand {
    /// Play a one-shot animation by id.
    Play(String),
    /// Start the looping essential animation.
    PlayEssential,
    /// Stop the essential animation.
    StopEssential,
}

/// FIFO dispatcher owning the sink and its worker thread.
pub struct Dispatcher {
    tx: Option<Sender<AnimationCommand>>,
    sink: Arc<Mutex<Box<dyn AnimationSink>>>,
    wake_lock: Arc<dyn WakeLock>,
    worker: Option<JoinHandle<()>>,
}

impl Dispatcher {
    /// Create the dispatcher and start its worker thread.
    pub fn new(sink: Box<dyn AnimationSink>, wake_lock: Arc<dyn WakeLock>) -> Self {
        let sink = Arc::new(Mutex::new(sink));
        let (tx, rx) = channel::<AnimationCommand>();

        let worker_sink = Arc::clone(&sink);
        let worker = std::thread::spawn(move || {
            // Exits when the sender side is dropped
            for command in rx {
                let mut sink = worker_sink.lock().unwrap();
                execute(&mut **sink, &command);
            }
        });

        Self {
            tx: Some(tx),
            sink,
            wake_lock,
            worker: Some(worker),
        }
    }

    /// Queue a command for the worker.
    ///
    /// With `wake_for` set, the wake-lock is acquired for that duration
    /// before the command is queued, covering worst-case animation start
    /// latency.
    pub fn enqueue(&self, command: AnimationCommand, wake_for: Option<Duration>) {
        if let Some(duration) = wake_for {
            self.wake_lock.acquire_for(duration);
        }
        if let Some(tx) = &self.tx
            && tx.send(command).is_err()
        {
            log_warning!("Dispatch worker is gone; animation command dropped");
        }
    }

    /// Stop the essential animation immediately, bypassing the queue.
    ///
    /// Teardown-only path: the regular `StopEssential` command goes through
    /// `enqueue` like everything else.
    pub fn stop_essential_now(&self) {
        let mut sink = self.sink.lock().unwrap();
        if let Err(e) = sink.stop_essential() {
            log_warning!("Failed to stop essential animation: {e}");
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain the queue and exit
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Run one command against the sink. Sink failures are logged, never
/// retried; the next trigger is the retry.
fn execute(sink: &mut dyn AnimationSink, command: &AnimationCommand) {
    let result = match command {
        AnimationCommand::Play(animation) => sink.play(animation),
        AnimationCommand::PlayEssential => sink.play_essential(),
        AnimationCommand::StopEssential => sink.stop_essential(),
    };
    if let Err(e) = result {
        log_warning!("Animation dispatch failed on {} sink: {e}", sink.sink_name());
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::io::wakelock::NoopWakeLock;

    #[test]
    fn commands_execute_in_submission_order() {
        let (sink, log) = RecordingSink::new();
        {
            let dispatcher = Dispatcher::new(Box::new(sink), Arc::new(NoopWakeLock));
            dispatcher.enqueue(AnimationCommand::Play("flip".into()), None);
            dispatcher.enqueue(AnimationCommand::PlayEssential, None);
            dispatcher.enqueue(AnimationCommand::Play("pulse".into()), None);
            dispatcher.enqueue(AnimationCommand::StopEssential, None);
            // Drop joins the worker after the queue drains
        }

        assert_eq!(
            *log.lock().unwrap(),
            vec!["play flip", "essential start", "play pulse", "essential stop"]
        );
    }

    #[test]
    fn wake_lock_taken_before_queueing() {
        let (sink, _log) = RecordingSink::new();
        let (wake, acquisitions) = CountingWakeLock::new();
        let dispatcher = Dispatcher::new(Box::new(sink), Arc::new(wake));

        dispatcher.enqueue(
            AnimationCommand::Play("flip".into()),
            Some(Duration::from_millis(2500)),
        );
        dispatcher.enqueue(AnimationCommand::PlayEssential, None);

        // The lock is taken synchronously on the enqueue path
        assert_eq!(*acquisitions.lock().unwrap(), vec![Duration::from_millis(2500)]);
    }

    #[test]
    fn stop_essential_now_bypasses_the_queue() {
        let (sink, log) = RecordingSink::new();
        let dispatcher = Dispatcher::new(Box::new(sink), Arc::new(NoopWakeLock));

        dispatcher.stop_essential_now();

        // Immediate, no queue round-trip required
        assert_eq!(*log.lock().unwrap(), vec!["essential stop"]);
    }
}
