use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::heatmap::domain::heatmap_engine::EmitRequest;
use crate::pipeline::emit_dispatcher::{EmitDispatcher, EmitStats};
use crate::pipeline::heatmap_renderer::HeatmapRenderer;

/// Runs colorize → composite → write on a dedicated worker thread so the
/// tick loop never waits on encoding or disk I/O.
///
/// Layout: `tick loop → bounded queue → emit worker`
///
/// When the queue is full the oldest pending request is discarded in favour
/// of the new one: only the most recent heatmap matters. `finish` closes the
/// queue and waits for the worker to drain it.
pub struct ThreadedEmitDispatcher {
    tx: Sender<EmitRequest>,
    // Second handle on the queue, used only to evict the oldest request.
    evict_rx: Receiver<EmitRequest>,
    worker: JoinHandle<EmitStats>,
    dropped: usize,
}

impl ThreadedEmitDispatcher {
    pub fn new(renderer: HeatmapRenderer, capacity: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded::<EmitRequest>(capacity.max(1));
        let evict_rx = rx.clone();
        let worker = spawn_worker(renderer, rx);
        Self {
            tx,
            evict_rx,
            worker,
            dropped: 0,
        }
    }

    fn drop_request(&mut self, sequence: u64, reason: &str) {
        self.dropped += 1;
        log::debug!("Tick {sequence}: heatmap emit dropped ({reason})");
    }
}

fn spawn_worker(renderer: HeatmapRenderer, rx: Receiver<EmitRequest>) -> JoinHandle<EmitStats> {
    std::thread::spawn(move || {
        let mut stats = EmitStats::default();
        for request in rx {
            let result = renderer.render(&request);
            stats.record(result, request.sequence);
        }
        stats
    })
}

impl EmitDispatcher for ThreadedEmitDispatcher {
    fn dispatch(&mut self, request: EmitRequest) {
        let request = match self.tx.try_send(request) {
            Ok(()) => return,
            Err(TrySendError::Full(request)) => request,
            Err(TrySendError::Disconnected(request)) => {
                self.drop_request(request.sequence, "emit worker stopped");
                return;
            }
        };

        if let Ok(stale) = self.evict_rx.try_recv() {
            self.drop_request(stale.sequence, "superseded");
        }
        match self.tx.try_send(request) {
            Ok(()) => {}
            Err(TrySendError::Full(request)) => self.drop_request(request.sequence, "queue full"),
            Err(TrySendError::Disconnected(request)) => {
                self.drop_request(request.sequence, "emit worker stopped")
            }
        }
    }

    fn finish(self: Box<Self>) -> EmitStats {
        let Self {
            tx,
            evict_rx,
            worker,
            dropped,
        } = *self;
        drop(tx);
        drop(evict_rx);

        match worker.join() {
            Ok(mut stats) => {
                stats.dropped += dropped;
                stats
            }
            Err(_) => {
                log::error!("Emit worker thread panicked");
                EmitStats {
                    dropped,
                    ..EmitStats::default()
                }
            }
        }
    }
}
