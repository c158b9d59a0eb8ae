/*!
 * Progress events emitted during a translation pass.
 *
 * A pass opens one channel; the translator (model download/preparation) and
 * the batch executor (batch boundaries) send into it, and the controller
 * forwards whatever arrives to the status reporter while the pass runs.
 */

use tokio::sync::mpsc;

/// Something worth telling the user while a pass is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Translator preparation progress, e.g. a model download
    Download {
        /// Units loaded so far
        loaded: u64,
        /// Total units to load
        total: u64,
    },
    /// A batch of text units has settled
    Batch {
        /// Units processed so far, including this batch
        processed: usize,
        /// Units in the whole pass
        total: usize,
    },
}

impl ProgressEvent {
    /// Completion percentage, rounded to the nearest integer
    pub fn percent(&self) -> u64 {
        let (done, total) = match *self {
            Self::Download { loaded, total } => (loaded, total),
            Self::Batch { processed, total } => (processed as u64, total as u64),
        };
        if total == 0 {
            return 100;
        }
        ((done.min(total) as f64 / total as f64) * 100.0).round() as u64
    }
}

/// Sending half of a pass progress stream
pub type ProgressSender = mpsc::UnboundedSender<ProgressEvent>;

/// Receiving half of a pass progress stream
pub type ProgressReceiver = mpsc::UnboundedReceiver<ProgressEvent>;

/// Open a progress stream for one pass
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}

/// Send an event, ignoring a receiver that has gone away
pub fn emit(sender: &ProgressSender, event: ProgressEvent) {
    let _ = sender.send(event);
}
