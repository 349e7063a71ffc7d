use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quizmaster::clients::mock::{canned_quiz, MockClient, MockResponse};
use quizmaster::clients::GeminiClient;
use quizmaster::core::LowLevelClient;
use quizmaster::service::{GenerateRequest, GenerateResponse, SubmitRequest};
use quizmaster::store::{InMemoryQuizCatalog, InMemoryResultStore};
use quizmaster::{QuizConfig, QuizMaster};
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Generate AI multiple-choice quizzes and grade your answers")]
#[command(after_help = "ENVIRONMENT VARIABLES:
    GEMINI_API_KEY                 Credential for the Gemini API (required unless --mock)
    GEMINI_MODEL                   Model identifier [default: gemini-2.5-flash]
    QUIZ_MIN_QUESTIONS             Smallest allowed quiz [default: 5]
    QUIZ_MAX_QUESTIONS             Largest allowed quiz [default: 10]
    QUIZ_DEFAULT_USER              Name recorded for anonymous results [default: anonymous]
    QUIZ_GENERATION_TIMEOUT_SECS   Abort generation after this many seconds
    RUST_LOG                       Log filter, e.g. quizmaster=debug")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a quiz and take it in the terminal
    Play {
        /// What the quiz should be about
        #[arg(short, long)]
        topic: String,

        /// Number of questions [default: QUIZ_MIN_QUESTIONS]
        #[arg(short = 'n', long)]
        count: Option<i64>,

        /// easy, medium or hard [default: medium]
        #[arg(short, long)]
        difficulty: Option<String>,

        /// Name to record the result under
        #[arg(short, long)]
        user: Option<String>,

        /// Use canned questions instead of calling the API
        #[arg(long)]
        mock: bool,
    },
    /// Show the resolved configuration and whether generation is available
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = QuizConfig::from_env().context("failed to load configuration")?;

    match args.command {
        Command::Play { topic, count, difficulty, user, mock } => {
            let client = build_client(&config, mock, &topic, count);
            let master = build_master(&config, client);
            play(&master, topic, count, difficulty, user).await
        }
        Command::Health => {
            let client = build_client(&config, false, "", None);
            let master = build_master(&config, client);
            println!("Configuration: {config:?}");
            println!("{}", serde_json::to_string_pretty(&master.health())?);
            Ok(())
        }
    }
}

fn build_client(
    config: &QuizConfig,
    mock: bool,
    topic: &str,
    count: Option<i64>,
) -> Option<Box<dyn LowLevelClient>> {
    if mock {
        let count = count
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(config.min_questions);
        let (client, _handle) =
            MockClient::with_responses(vec![MockResponse::success(canned_quiz(topic, count))]);
        return Some(Box::new(client));
    }
    match GeminiClient::from_config(config) {
        Ok(client) => Some(Box::new(client)),
        Err(e) => {
            warn!(error = %e, "Gemini client unavailable");
            None
        }
    }
}

fn build_master(
    config: &QuizConfig,
    client: Option<Box<dyn LowLevelClient>>,
) -> QuizMaster<Box<dyn LowLevelClient>> {
    QuizMaster::new(
        config,
        client,
        Arc::new(InMemoryQuizCatalog::new()),
        Arc::new(InMemoryResultStore::new()),
    )
}

async fn play(
    master: &QuizMaster<Box<dyn LowLevelClient>>,
    topic: String,
    count: Option<i64>,
    difficulty: Option<String>,
    user: Option<String>,
) -> Result<()> {
    println!("Generating quiz on \"{topic}\"...");
    let quiz = master
        .generate_quiz(GenerateRequest {
            topic: Some(topic),
            question_count: count.map(Value::from),
            difficulty,
        })
        .await
        .context("quiz generation failed")?;

    let answers = ask_questions(&quiz)?;

    let outcome = master
        .submit(SubmitRequest {
            quiz_id: Some(quiz.quiz_id.to_string()),
            answers: Some(Value::Array(answers.clone())),
            user: user.clone(),
        })
        .await
        .context("grading failed")?;

    println!();
    println!(
        "Score: {}% ({} of {} correct)",
        outcome.score, outcome.correct_count, outcome.total
    );
    for ((question, correct), answer) in quiz
        .questions
        .iter()
        .zip(&outcome.correct_answers)
        .zip(&answers)
    {
        let picked = answer.as_u64().and_then(|i| usize::try_from(i).ok());
        let mark = if picked == Some(*correct) { "✓" } else { "✗" };
        println!("{mark} {} -> {}", question.question, question.options[*correct]);
    }

    let history = master.history(user.as_deref()).await?;
    println!("\nResults recorded this session: {}", history.len());
    Ok(())
}

/// Ask each question on stdin. Answers are 1-based; anything unparseable is
/// submitted as `null` and graded as wrong.
fn ask_questions(quiz: &GenerateResponse) -> Result<Vec<Value>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut answers = Vec::with_capacity(quiz.questions.len());

    println!(
        "\n{} ({} questions, {})\n",
        quiz.topic, quiz.question_count, quiz.difficulty
    );
    for (number, question) in quiz.questions.iter().enumerate() {
        println!("{}. {}", number + 1, question.question);
        for (i, option) in question.options.iter().enumerate() {
            println!("   {}) {}", i + 1, option);
        }
        print!("Your answer (1-{}): ", question.options.len());
        io::stdout().flush()?;

        let line = lines.next().transpose()?.unwrap_or_default();
        answers.push(parse_choice(&line));
    }
    Ok(answers)
}

/// Turn a typed 1-based choice into the submitted 0-based index.
fn parse_choice(line: &str) -> Value {
    line.trim()
        .parse::<i64>()
        .ok()
        .and_then(|choice| choice.checked_sub(1))
        .map_or(Value::Null, Value::from)
}
