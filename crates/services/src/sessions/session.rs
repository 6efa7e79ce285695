use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use quiz_core::model::{Direction, QuizId, SubmitReason};

use super::controller::Command;
use super::view::{QuizResult, SessionEvent, SessionSnapshot};
use crate::error::SessionError;

/// Host-side handle to a running quiz attempt.
///
/// Dropping the handle tears the attempt down: the command channel closes, the
/// session task returns, and its countdown and host subscription go with it.
/// A submission already in progress still runs to completion.
pub struct QuizSession {
    quiz_id: QuizId,
    commands: mpsc::UnboundedSender<Command>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    snapshot: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<()>,
}

impl QuizSession {
    pub(crate) fn new(
        quiz_id: QuizId,
        commands: mpsc::UnboundedSender<Command>,
        events: mpsc::UnboundedReceiver<SessionEvent>,
        snapshot: watch::Receiver<SessionSnapshot>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            quiz_id,
            commands,
            events,
            snapshot,
            task,
        }
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    /// Latest published state of the attempt.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Choose an option for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Attempt` for an unknown option and
    /// `SessionError::Closed` once the attempt has ended.
    pub async fn select_option(&self, option: usize) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Select { option, reply })?;
        rx.await.map_err(|_| SessionError::Closed)??;
        Ok(())
    }

    /// Move to the previous or next question; returns the new index.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` once the attempt has ended.
    pub async fn navigate(&self, direction: Direction) -> Result<usize, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Navigate { direction, reply })?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Request submission. Only the first request of an attempt has any effect.
    ///
    /// The submit gate in `SessionSnapshot::submit_enabled` is for the host to
    /// honour; forced submissions go through here as well.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` once the attempt has ended.
    pub fn submit(&self, reason: SubmitReason) -> Result<(), SessionError> {
        self.send(Command::Submit { reason })
    }

    /// Next notice or the final result. `None` once the attempt is over.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Wait for the hand-off, skipping notices.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the attempt ended without a result.
    pub async fn finished(&mut self) -> Result<QuizResult, SessionError> {
        while let Some(event) = self.next_event().await {
            if let SessionEvent::Finished(result) = event {
                return Ok(result);
            }
        }
        Err(SessionError::Closed)
    }

    /// Leave the attempt and wait until its task has stopped.
    ///
    /// Nothing is submitted unless a submission was already under way.
    pub async fn teardown(self) {
        let Self { commands, task, .. } = self;
        drop(commands);
        let _ = task.await;
    }

    fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands.send(command).map_err(|_| SessionError::Closed)
    }
}
