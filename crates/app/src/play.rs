use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use quiz_core::model::Question;
use quiz_core::{Advance, AnswerReveal, AnswerSource, SessionProgress};
use quiz_services::{DriverEvent, QuizScreen, SessionDriver, SessionLoopService, StepOutcome};

/// Options on screen; typed digits pick from here.
type Choices = Arc<Mutex<Vec<String>>>;

/// Spawn the stdin reader. Lines are trimmed; `1`..`n` map to the option on screen.
fn spawn_input(choices: Choices) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(8);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_owned();
            let picked = line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| choices.lock().ok().and_then(|c| c.get(i).cloned()));
            if tx.send(picked.unwrap_or(line)).await.is_err() {
                break;
            }
        }
    });
    rx
}

fn spawn_printer(
    questions: Vec<Question>,
    choices: Choices,
    mut events: mpsc::UnboundedReceiver<DriverEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                DriverEvent::QuestionShown {
                    index,
                    total,
                    seconds_left,
                } => {
                    let Some(question) = questions.get(index) else {
                        continue;
                    };
                    println!();
                    println!("Question {}/{total}", index + 1);
                    println!("{}", question.prompt());
                    for (i, option) in question.options().iter().enumerate() {
                        println!("  {}. {option}", i + 1);
                    }
                    if let Some(secs) = seconds_left {
                        println!("({secs}s to answer)");
                    }
                    if let Ok(mut current) = choices.lock() {
                        *current = question.options().to_vec();
                    }
                }
                DriverEvent::Countdown { seconds_left } => {
                    if seconds_left <= 5 || seconds_left % 5 == 0 {
                        println!("  ... {seconds_left}s");
                    }
                }
                DriverEvent::OpponentRevealed { seat, action } => println!("  {seat}: {action}"),
                DriverEvent::AnswerRevealed(reveal) => print_reveal(&reveal),
                DriverEvent::Advanced(_) => {}
            }
        }
    })
}

fn print_reveal(reveal: &AnswerReveal) {
    match (reveal.source, reveal.is_correct) {
        (_, true) => println!("Correct!"),
        (AnswerSource::Timeout, false) => {
            println!("Time's up! The answer was {}.", reveal.correct_answer);
        }
        (AnswerSource::Manual, false) => {
            println!("Not quite. The answer was {}.", reveal.correct_answer);
        }
    }
    match reveal.lives_remaining {
        Some(lives) => println!("Score: {}  Lives: {lives}", reveal.score),
        None => println!("Score: {}", reveal.score),
    }
}

fn print_outcome(outcome: &StepOutcome, progress: SessionProgress, score: u32) {
    println!();
    match outcome.advance {
        Advance::GameOver => println!(
            "Game over after {}/{} questions. Final score: {score}",
            progress.answered, progress.total
        ),
        _ => println!("Quiz complete! Final score: {score}/{}", progress.total),
    }
    if outcome.login_prompt {
        println!("Sign in (set POKER_QUIZ_USER_ID) to save your progress and scores.");
    }
}

fn render_screen(screen: &QuizScreen) {
    match screen {
        QuizScreen::Loading => println!("Loading questions..."),
        QuizScreen::Failed { message } => {
            println!("Could not load questions: {message}");
            println!("Retry? [y/N]");
        }
        QuizScreen::Ready(session) => {
            let progress = session.progress();
            if progress.answered > 0 {
                println!(
                    "Resuming at question {} of {} with score {}.",
                    progress.answered + 1,
                    progress.total,
                    session.score()
                );
            }
        }
    }
}

/// Play `service`'s quiz in the terminal until the player declines a rematch.
pub async fn play(service: Arc<SessionLoopService>) -> Result<(), Box<dyn Error>> {
    let choices: Choices = Arc::default();
    let mut answers = spawn_input(Arc::clone(&choices));
    let driver = SessionDriver::new(Arc::clone(&service));

    let mut screen = QuizScreen::Loading;
    loop {
        render_screen(&screen);
        screen = service.open().await;
        render_screen(&screen);
        if screen.is_ready() {
            break;
        }
        match answers.recv().await {
            Some(reply) if reply.eq_ignore_ascii_case("y") => screen = QuizScreen::Loading,
            _ => return Ok(()),
        }
    }
    let session = screen
        .session_mut()
        .ok_or("quiz did not finish loading")?;

    loop {
        let (events_tx, events) = mpsc::unbounded_channel();
        let printer = spawn_printer(session.questions().to_vec(), Arc::clone(&choices), events);

        let outcome = driver.run(session, &mut answers, &events_tx).await;
        drop(events_tx);
        printer.await?;
        let outcome = outcome?;
        print_outcome(&outcome, session.progress(), session.score());
        if service.settle().await {
            println!("New personal best on the leaderboard.");
        }

        println!("Play again? [y/N]");
        match answers.recv().await {
            Some(reply) if reply.eq_ignore_ascii_case("y") => service.restart(session)?,
            _ => return Ok(()),
        }
    }
}
