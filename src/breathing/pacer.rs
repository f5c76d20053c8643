use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::info;

use super::timer::{BreathingState, PhaseTimer};

/// Drives a [`PhaseTimer`] on a one-second tokio interval and publishes
/// each snapshot on a watch channel.
///
/// Start and stop are idempotent; stop cancels the tick task and leaves
/// the last snapshot in place for display.
pub struct BreathingPacer {
    timer: Arc<Mutex<PhaseTimer>>,
    active: Arc<AtomicBool>,
    snapshot_tx: watch::Sender<BreathingState>,
    tick_task: Mutex<Option<JoinHandle<()>>>,
}

impl BreathingPacer {
    pub fn new() -> Self {
        let (snapshot_tx, _) = watch::channel(BreathingState::default());

        Self {
            timer: Arc::new(Mutex::new(PhaseTimer::new())),
            active: Arc::new(AtomicBool::new(false)),
            snapshot_tx,
            tick_task: Mutex::new(None),
        }
    }

    /// Subscribe to state snapshots (one per tick, plus start/stop edges).
    pub fn subscribe(&self) -> watch::Receiver<BreathingState> {
        self.snapshot_tx.subscribe()
    }

    /// Current snapshot without subscribing.
    pub fn state(&self) -> BreathingState {
        *self.snapshot_tx.borrow()
    }

    /// Reset the cycle and begin ticking once per second.
    pub async fn start(&self) {
        if self.active.swap(true, Ordering::SeqCst) {
            return;
        }

        let state = {
            let mut timer = self.timer.lock().await;
            timer.start()
        };
        let _ = self.snapshot_tx.send(state);

        info!("Breathing exercise started");

        let timer = Arc::clone(&self.timer);
        let active = Arc::clone(&self.active);
        let snapshot_tx = self.snapshot_tx.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // First tick of a tokio interval fires immediately; burn it so
            // the opening 4-second count is not cut short.
            interval.tick().await;

            loop {
                interval.tick().await;

                if !active.load(Ordering::SeqCst) {
                    break;
                }

                let state = {
                    let mut timer = timer.lock().await;
                    timer.tick()
                };
                let _ = snapshot_tx.send(state);
            }
        });

        {
            let mut handle = self.tick_task.lock().await;
            *handle = Some(task);
        }
    }

    /// Cancel the tick task. The last phase/countdown stays visible.
    pub async fn stop(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }

        {
            let mut handle = self.tick_task.lock().await;
            if let Some(task) = handle.take() {
                task.abort();
                let _ = task.await;
            }
        }

        let state = {
            let mut timer = self.timer.lock().await;
            timer.stop()
        };
        let _ = self.snapshot_tx.send(state);

        info!("Breathing exercise stopped");
    }
}

impl Default for BreathingPacer {
    fn default() -> Self {
        Self::new()
    }
}
