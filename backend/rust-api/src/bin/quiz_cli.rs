//! Terminal quiz: generates questions for the topic given on the command
//! line and walks through them one at a time.

use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use flashquiz_api::{
    config::Config,
    models::question::{Question, OPTION_LABELS},
    services::{
        question_generator::QuestionGenerator,
        quiz_session::{QuizSession, SessionState},
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let topic = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let topic = topic.trim();
    if topic.is_empty() {
        bail!("usage: quiz-cli <topic>");
    }

    let config = Config::load().context("Failed to load configuration")?;
    let validation = config.validate();
    if !validation.is_valid {
        bail!("configuration error: {}", validation.errors.join("; "));
    }

    println!("Generating questions about \"{}\"...", topic);
    let generator = QuestionGenerator::new(&config)?;
    let outcome = generator.generate(topic, config.question_count()).await?;
    if outcome.is_fallback() {
        println!("The model answer was unusable, showing sample questions instead.");
    }

    let mut session = QuizSession::new();
    if session.load(outcome.questions)? == SessionState::Failed {
        bail!("no questions could be generated for this topic, try another one");
    }

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match session.state() {
            SessionState::Active { .. } => ask_current(&mut session, &mut input).await?,
            SessionState::Revealed { .. } => {
                session.advance_after_reveal().await?;
            }
            SessionState::Completed => {
                print_result(&session);
                println!("\nPress r to try again, anything else to quit.");
                match input.next_line().await? {
                    Some(line) if line.trim().eq_ignore_ascii_case("r") => {
                        session.restart()?;
                    }
                    _ => return Ok(()),
                }
            }
            SessionState::Loading | SessionState::Failed => return Ok(()),
        }
    }
}

async fn ask_current(
    session: &mut QuizSession,
    input: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<()> {
    let (question, progress) = match (session.current_question(), session.progress()) {
        (Some(question), Some(progress)) => (question.clone(), progress),
        _ => return Ok(()),
    };

    println!(
        "\n[{}/{}] {}",
        progress.position, progress.total, question.question
    );
    for (label, option) in OPTION_LABELS.iter().zip(question.options.iter()) {
        println!("  {}. {}", label, option);
    }

    let choice = loop {
        let Some(line) = input.next_line().await? else {
            bail!("input closed");
        };
        match parse_choice(&line) {
            Some(choice) => break choice,
            None => println!("Answer with A, B, C or D."),
        }
    };

    session.select_option(choice)?;
    let answer = session.submit()?;
    print_reveal(&question, answer.is_correct);
    Ok(())
}

fn parse_choice(line: &str) -> Option<usize> {
    let line = line.trim();
    let mut chars = line.chars();
    let first = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    OPTION_LABELS
        .iter()
        .position(|label| label.eq_ignore_ascii_case(&first))
        .or_else(|| {
            first
                .to_digit(10)
                .and_then(|digit| (digit as usize).checked_sub(1))
                .filter(|index| *index < OPTION_LABELS.len())
        })
}

fn print_reveal(question: &Question, is_correct: bool) {
    if is_correct {
        println!("Correct!");
    } else {
        println!(
            "Not quite. The answer is {}. {}",
            OPTION_LABELS[question.correct_answer],
            question.correct_option()
        );
    }
    if !question.explanation.is_empty() {
        println!("{}", question.explanation);
    }
}

fn print_result(session: &QuizSession) {
    let Some(result) = session.result() else {
        return;
    };
    println!("\n{}", result.tier().message());
    println!("{} / {}", result.correct_answers, result.total_questions);
    println!("Accuracy: {}%", result.percentage);
    println!("Time: {}s", result.completion_time_ms / 1000);
}
