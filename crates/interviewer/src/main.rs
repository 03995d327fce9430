//! Scripted interview replay.
//!
//! Runs the conversation controller over a scenario (question arc) and a
//! script (ordered player responses), both TOML, and prints one JSON line
//! per resulting action on stdout. Logs and the closing summary go to
//! stderr so stdout stays a clean jsonl stream.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

use interview_events::{PlayerResponse, QuestionSpec, ResponseTone};
use interviewer::{config, ControllerConfig, ConversationController};

#[derive(Parser, Debug)]
#[command(name = "interview_sim", about = "Replay a scripted interview and print the action stream")]
struct Args {
    /// Scenario TOML holding the question arc
    #[arg(long)]
    scenario: PathBuf,

    /// Script TOML holding the ordered player responses
    #[arg(long)]
    script: PathBuf,

    /// Seed for the controller's random source
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Controller configuration TOML; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the default configuration TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    questions: Vec<QuestionSpec>,
}

#[derive(Debug, Deserialize)]
struct Script {
    responses: Vec<ScriptedResponse>,
}

#[derive(Debug, Deserialize)]
struct ScriptedResponse {
    question_id: String,
    text: String,
    tone: ResponseTone,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    contradicts_previous: bool,
}

impl From<ScriptedResponse> for PlayerResponse {
    fn from(scripted: ScriptedResponse) -> Self {
        let mut response =
            PlayerResponse::new(scripted.question_id, scripted.text, scripted.tone);
        if let Some(topic) = scripted.topic {
            response = response.with_topic(topic);
        }
        if scripted.contradicts_previous {
            response = response.with_contradiction();
        }
        response
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.print_default_config {
        print!("{}", config::default_config_toml());
        return Ok(());
    }

    let scenario: Scenario = toml::from_str(&std::fs::read_to_string(&args.scenario)?)?;
    let script: Script = toml::from_str(&std::fs::read_to_string(&args.script)?)?;
    let config = match &args.config {
        Some(path) => ControllerConfig::from_file(path)?,
        None => ControllerConfig::default(),
    };

    eprintln!(
        "replaying {} responses over a {}-question arc (seed {})",
        script.responses.len(),
        scenario.questions.len(),
        args.seed
    );

    let mut controller = ConversationController::new(scenario.questions, config, args.seed);
    for scripted in script.responses {
        let action = controller.process_response(scripted.into());
        println!("{}", serde_json::to_string(&action)?);
        if action.is_conclusion() {
            break;
        }
    }

    let analytics = controller.conversation_analytics();
    eprintln!(
        "done after {} turns: mood {}, frustration {:.0}, {} interruptions, {} rapid-fire sessions, {}/{} questions answered",
        analytics.turns,
        analytics.mood,
        analytics.frustration_level,
        analytics.interruption_count,
        analytics.rapid_fire_sessions,
        analytics.questions_answered,
        analytics.questions_total
    );

    Ok(())
}
