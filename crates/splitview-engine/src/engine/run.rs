use splitview_common::SplitviewError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info};

use super::ReconcileEngine;
use crate::browser::BrowserEvent;
use crate::commands::{CommandResponse, SplitCommand};

/// A command plus the channel its result is sent back on.
pub type CommandRequest = (SplitCommand, oneshot::Sender<Result<CommandResponse, SplitviewError>>);

impl ReconcileEngine {
    /// Process browser events and commands until both channels close.
    ///
    /// Restores persisted controllers first. Debounced bounds work runs
    /// whenever its quiet period expires between messages.
    pub async fn run(mut self, mut events: mpsc::Receiver<BrowserEvent>, mut commands: mpsc::Receiver<CommandRequest>) {
        self.restore_persisted().await;
        let mut events_open = true;
        let mut commands_open = true;

        while events_open || commands_open {
            let deadline = self.debounce.next_deadline();
            tokio::select! {
                event = events.recv(), if events_open => match event {
                    Some(event) => self.handle_event(event).await,
                    None => {
                        debug!("browser event channel closed");
                        events_open = false;
                    }
                },
                request = commands.recv(), if commands_open => match request {
                    Some((command, reply)) => {
                        let result = command.execute(&mut self).await;
                        // The caller may have stopped waiting.
                        let _ = reply.send(result);
                    }
                    None => {
                        debug!("command channel closed");
                        commands_open = false;
                    }
                },
                _ = sleep_until(deadline) => {
                    self.run_due().await;
                }
            }
        }
        info!(controllers = self.repo.len(), "reconcile engine stopped");
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
