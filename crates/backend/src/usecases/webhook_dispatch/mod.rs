pub mod dispatcher;

pub use dispatcher::WebhookDispatcher;

use contracts::usecases::csv_import::ImportEvent;
use once_cell::sync::Lazy;
use std::sync::Mutex;
use tokio::sync::mpsc;

const EVENT_QUEUE_DEPTH: usize = 64;

/// Completion-event channel between the import executor and the
/// dispatcher task. Sender side is cloned freely; the receiver is taken
/// exactly once at startup.
static EVENT_QUEUE: Lazy<(
    mpsc::Sender<ImportEvent>,
    Mutex<Option<mpsc::Receiver<ImportEvent>>>,
)> = Lazy::new(|| {
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    (tx, Mutex::new(Some(rx)))
});

pub fn event_sender() -> mpsc::Sender<ImportEvent> {
    EVENT_QUEUE.0.clone()
}

pub fn take_event_receiver() -> Option<mpsc::Receiver<ImportEvent>> {
    EVENT_QUEUE.1.lock().unwrap().take()
}
