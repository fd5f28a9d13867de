//! Runs tickets on the tokio runtime and reports back over the action
//! channel. The only path from a background task into `update()`.

use std::sync::{Arc, mpsc};

use log::{debug, warn};

use crate::core::action::Action;
use crate::core::state::Ticket;
use crate::core::workflow;
use crate::remote::Backend;

#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn Backend>,
    tx: mpsc::Sender<Action>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn Backend>, tx: mpsc::Sender<Action>) -> Self {
        Self { backend, tx }
    }

    /// Spawns the ticket's job. The task is never cancelled; a result the
    /// UI no longer wants is dropped by `update()`.
    pub fn spawn(&self, ticket: Ticket) {
        let Ticket { seq, job } = ticket;
        let slot = job.slot();
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        debug!("Dispatching job #{}: {}", seq, job.label());
        tokio::spawn(async move {
            let result = workflow::run(backend.as_ref(), job).await;
            if tx.send(Action::Completed { seq, slot, result }).is_err() {
                warn!("Failed to deliver result of job #{}: receiver dropped", seq);
            }
        });
    }
}
