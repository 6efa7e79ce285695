//! Line-oriented host for taking a quiz in a terminal.

use std::fmt::Write as _;

use log::{debug, warn};
use quiz_core::model::{Direction, QuizId, SubmitReason};
use services::{
    AppServices, HostEvents, HostSignal, QuizResult, QuizSession, SessionError, SessionEvent,
    SessionSnapshot,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Select(usize),
    Move(Direction),
    Submit,
    Signal(HostSignal),
    Time,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    if let Ok(n) = line.parse::<usize>() {
        return n.checked_sub(1).map(Input::Select);
    }
    match line.to_ascii_lowercase().as_str() {
        "n" | "next" => Some(Input::Move(Direction::Next)),
        "p" | "prev" => Some(Input::Move(Direction::Previous)),
        "s" | "submit" => Some(Input::Submit),
        "blur" => Some(Input::Signal(HostSignal::Blurred)),
        "hide" => Some(Input::Signal(HostSignal::Hidden)),
        "t" | "time" => Some(Input::Time),
        "h" | "help" | "?" => Some(Input::Help),
        "q" | "quit" => Some(Input::Quit),
        _ => None,
    }
}

const HELP: &str = "commands: <number> select option, n/next, p/prev, s/submit, t/time, q/quit";

fn render(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    let urgent = if snapshot.is_low_time() { " !" } else { "" };
    let _ = writeln!(
        out,
        "\n{}  [{}{}]  question {}/{} ({}%)",
        snapshot.title,
        snapshot.formatted_time(),
        urgent,
        snapshot.current_index + 1,
        snapshot.total,
        snapshot.progress_percent()
    );
    let _ = writeln!(out, "{}", snapshot.question);
    for (i, option) in snapshot.options.iter().enumerate() {
        let mark = if snapshot.selected == Some(i) { '*' } else { ' ' };
        let _ = writeln!(out, " {mark} {}. {option}", i + 1);
    }
    if snapshot.submit_visible {
        let hint = if snapshot.submit_enabled {
            "ready to submit (s)"
        } else {
            "answer every question to submit"
        };
        let _ = writeln!(out, "{hint}");
    }
    out
}

fn render_result(result: &QuizResult) -> String {
    format!(
        "\nQuiz Results: {}\nscore: {}/{} ({}%)",
        result.quiz_title,
        result.score,
        result.total,
        result.percent()
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Render,
    Stay,
    Quit,
}

fn explain_refusal(err: &SessionError) {
    match err {
        SessionError::Closed => println!("quiz submitted, waiting for the result..."),
        other => println!("{other}"),
    }
}

/// Apply one line of input to the running attempt.
///
/// Never fails: once the attempt is submitted, commands are refused with a
/// message and the result still arrives through the event stream.
async fn apply(session: &QuizSession, host: &HostEvents, input: Input) -> Flow {
    match input {
        Input::Select(option) => match session.select_option(option).await {
            Ok(()) => Flow::Render,
            Err(err) => {
                explain_refusal(&err);
                Flow::Stay
            }
        },
        Input::Move(direction) => match session.navigate(direction).await {
            Ok(_) => Flow::Render,
            Err(err) => {
                explain_refusal(&err);
                Flow::Stay
            }
        },
        Input::Submit => {
            let snapshot = session.snapshot();
            if snapshot.submitted {
                explain_refusal(&SessionError::Closed);
            } else if !snapshot.submit_visible {
                println!("submit is available on the last question");
            } else if !snapshot.submit_enabled {
                println!("answer every question before submitting");
            } else if let Err(err) = session.submit(SubmitReason::Manual) {
                explain_refusal(&err);
            }
            Flow::Stay
        }
        Input::Signal(signal) => {
            if host.emit(signal) == 0 {
                warn!("host signal {signal:?} had no live session");
            }
            Flow::Stay
        }
        Input::Time => {
            println!("time left: {}", session.snapshot().formatted_time());
            Flow::Stay
        }
        Input::Help => {
            println!("{HELP}");
            Flow::Stay
        }
        Input::Quit => Flow::Quit,
    }
}

/// Run one attempt against stdin until it is submitted or abandoned.
///
/// Closing stdin counts as hiding the host, so the attempt is auto-submitted.
pub async fn take_quiz(
    services: &AppServices,
    quiz_id: &QuizId,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = services.host();
    let mut session = match services.sessions().start(quiz_id, &host).await {
        Ok(session) => session,
        Err(err) => {
            if let Some(notice) = err.notice() {
                println!("{}", notice.message());
            }
            return Err(err.into());
        }
    };

    println!("{HELP}");
    print!("{}", render(&session.snapshot()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = session.next_event() => match event {
                Some(SessionEvent::Notice(notice)) => println!("{}", notice.message()),
                Some(SessionEvent::Finished(result)) => {
                    println!("{}", render_result(&result));
                    break;
                }
                None => break,
            },
            line = lines.next_line(), if stdin_open => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) | Err(_) => {
                        debug!("stdin closed, treating host as hidden");
                        stdin_open = false;
                        host.emit(HostSignal::Hidden);
                        continue;
                    }
                };
                let Some(input) = parse_input(&line) else {
                    println!("{HELP}");
                    continue;
                };
                match apply(&session, &host, input).await {
                    Flow::Render => print!("{}", render(&session.snapshot())),
                    Flow::Stay => {}
                    Flow::Quit => {
                        println!("leaving without submitting");
                        session.teardown().await;
                        return Ok(());
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use quiz_core::model::{Question, Quiz, QuizDraft};
    use quiz_core::time::fixed_clock;
    use services::{QuizApi, QuizApiError, ResultReport, SessionNotice};
    use storage::repository::Storage;

    use super::*;

    /// Serves one quiz and holds score reports for five seconds.
    struct SlowReports {
        quiz: Quiz,
    }

    #[async_trait]
    impl QuizApi for SlowReports {
        async fn fetch_quiz(&self, _id: &QuizId) -> Result<Quiz, QuizApiError> {
            Ok(self.quiz.clone())
        }

        async fn report_result(
            &self,
            _id: &QuizId,
            _report: &ResultReport,
        ) -> Result<(), QuizApiError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }

        async fn create_quiz(&self, _draft: &QuizDraft) -> Result<QuizId, QuizApiError> {
            Err(QuizApiError::NotFound)
        }

        async fn update_quiz(&self, _id: &QuizId, _draft: &QuizDraft) -> Result<(), QuizApiError> {
            Err(QuizApiError::NotFound)
        }
    }

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            quiz_id: QuizId::new("q1").unwrap(),
            title: "Capitals".into(),
            question: "Capital of France?".into(),
            options: vec!["Berlin".into(), "Paris".into()],
            current_index: 1,
            total: 2,
            selected: Some(1),
            answered: 2,
            time_remaining: 45,
            submit_visible: true,
            submit_enabled: true,
            submitted: false,
        }
    }

    #[test]
    fn numbers_select_one_based_options() {
        assert_eq!(parse_input(" 2 "), Some(Input::Select(1)));
        assert_eq!(parse_input("0"), None);
        assert_eq!(parse_input("NEXT"), Some(Input::Move(Direction::Next)));
        assert_eq!(parse_input("hide"), Some(Input::Signal(HostSignal::Hidden)));
        assert_eq!(parse_input("what"), None);
    }

    #[test]
    fn render_marks_selection_and_low_time() {
        let out = render(&snapshot());
        assert!(out.contains("[0:45 !]"));
        assert!(out.contains("question 2/2 (100%)"));
        assert!(out.contains(" * 2. Paris"));
        assert!(out.contains("   1. Berlin"));
        assert!(out.contains("ready to submit"));
    }

    #[tokio::test(start_paused = true)]
    async fn input_after_a_forced_submit_keeps_the_result() {
        let quiz_id = QuizId::new("q1").unwrap();
        let question = Question::new(
            "Capital of France?",
            vec!["Berlin".into(), "Paris".into()],
            1,
        )
        .unwrap();
        let quiz = Quiz::new(quiz_id.clone(), "Capitals", vec![question]).unwrap();
        let api: Arc<dyn QuizApi> = Arc::new(SlowReports { quiz });
        let services = AppServices::from_parts(Storage::in_memory(), api, fixed_clock());
        let host = services.host();
        let mut session = services.sessions().start(&quiz_id, &host).await.unwrap();

        assert_eq!(apply(&session, &host, Input::Select(1)).await, Flow::Render);
        assert_eq!(
            apply(&session, &host, Input::Signal(HostSignal::Blurred)).await,
            Flow::Stay
        );
        assert_eq!(
            session.next_event().await,
            Some(SessionEvent::Notice(SessionNotice::FocusLost))
        );

        for input in [Input::Move(Direction::Next), Input::Select(0), Input::Submit] {
            assert_eq!(apply(&session, &host, input).await, Flow::Stay);
        }

        let Some(SessionEvent::Finished(result)) = session.next_event().await else {
            panic!("expected result hand-off");
        };
        assert_eq!(result.score, 1);
        assert_eq!(result.reason, SubmitReason::FocusLost);
    }
}
