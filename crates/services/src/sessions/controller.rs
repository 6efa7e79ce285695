use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Instant};

use quiz_core::Clock;
use quiz_core::model::{AttemptError, Direction, QuizAttempt, SubmitReason, TickOutcome};
use storage::repository::AttemptMarkerStore;

use super::host::HostSubscription;
use super::view::{QuizResult, SessionEvent, SessionNotice, SessionSnapshot};
use crate::quiz_api::{QuizApi, ResultReport};

const TICK: Duration = Duration::from_secs(1);

/// Requests a host sends into a running attempt.
pub(crate) enum Command {
    Select {
        option: usize,
        reply: oneshot::Sender<Result<(), AttemptError>>,
    },
    Navigate {
        direction: Direction,
        reply: oneshot::Sender<usize>,
    },
    Submit {
        reason: SubmitReason,
    },
}

/// Single owner of a `QuizAttempt`.
///
/// Commands, countdown ticks and host signals are polled from one task, so
/// every trigger is applied in order and only the first submission wins.
pub(crate) struct SessionActor {
    pub(crate) attempt: QuizAttempt,
    pub(crate) clock: Clock,
    pub(crate) api: Arc<dyn QuizApi>,
    pub(crate) markers: Arc<dyn AttemptMarkerStore>,
    pub(crate) events: mpsc::UnboundedSender<SessionEvent>,
    pub(crate) snapshot: watch::Sender<SessionSnapshot>,
}

impl SessionActor {
    pub(crate) async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut host: HostSubscription,
    ) {
        let mut ticker = time::interval_at(Instant::now() + TICK, TICK);
        let mut host_open = true;

        let reason = loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Select { option, reply }) => {
                        let outcome = self.attempt.select_option(option);
                        self.publish();
                        let _ = reply.send(outcome);
                    }
                    Some(Command::Navigate { direction, reply }) => {
                        let index = self.attempt.navigate(direction);
                        self.publish();
                        let _ = reply.send(index);
                    }
                    Some(Command::Submit { reason }) => break reason,
                    None => {
                        debug!("quiz {} session dropped by host", self.attempt.quiz_id());
                        return;
                    }
                },
                _ = ticker.tick() => match self.attempt.tick() {
                    TickOutcome::Running(_) => self.publish(),
                    TickOutcome::Expired => break SubmitReason::TimeExpired,
                    TickOutcome::Stopped => return,
                },
                signal = host.recv(), if host_open => match signal {
                    Some(signal) if signal.is_focus_loss() => break SubmitReason::FocusLost,
                    Some(signal) => debug!("ignoring host signal {signal:?}"),
                    None => host_open = false,
                },
            }
        };

        // Countdown and focus observers end with the attempt.
        drop(ticker);
        drop(host);
        drop(commands);

        self.submit(reason).await;
    }

    async fn submit(mut self, reason: SubmitReason) {
        let Some(submission) = self.attempt.submit(reason) else {
            return;
        };
        self.publish();
        if let Some(notice) = SessionNotice::for_reason(reason) {
            let _ = self.events.send(SessionEvent::Notice(notice));
        }

        let submitted_at = self.clock.now();
        if let Err(err) = self.markers.set(&submission.quiz_id, submitted_at).await {
            error!(
                "failed to persist attempt marker for quiz {}: {err}",
                submission.quiz_id
            );
        }

        let report = ResultReport {
            score: submission.score,
            total_questions: submission.total,
        };
        if let Err(err) = self.api.report_result(&submission.quiz_id, &report).await {
            warn!("failed to report result for quiz {}: {err}", submission.quiz_id);
        }

        info!(
            "quiz {} submitted ({reason:?}): {}/{}",
            submission.quiz_id, submission.score, submission.total
        );
        let _ = self.events.send(SessionEvent::Finished(QuizResult {
            quiz_id: submission.quiz_id,
            quiz_title: submission.quiz_title,
            score: submission.score,
            total: submission.total,
            reason,
            submitted_at,
        }));
    }

    fn publish(&self) {
        self.snapshot
            .send_replace(SessionSnapshot::from_attempt(&self.attempt));
    }
}
