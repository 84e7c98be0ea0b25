use crate::assess::{run_assessment, run_practice, AssessArgs, PracticeArgs};
use crate::catalog::{render_drills, render_levels};
use crate::infra::AppContext;
use crate::profile::{run_profile_set, run_profile_show, ProfileSetArgs};
use cefr_speak::config::AppConfig;
use cefr_speak::error::AppError;
use cefr_speak::telemetry;
use clap::{Parser, Subcommand};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "cefr-speak",
    about = "Self-assess your English speaking level on the CEFR scale",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create, edit or show the learner profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
    /// Describe the six CEFR levels
    Levels,
    /// Take the timed speaking assessment
    Assess(AssessArgs),
    /// Answer a single practice topic
    Practice(PracticeArgs),
    /// List the targeted practice drills
    Drills,
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// Save the profile, keeping the id of an existing one
    Set(ProfileSetArgs),
    /// Print the saved profile
    Show,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(?config.environment, data_dir = %config.storage.data_dir.display(), "configuration loaded");

    match cli.command {
        Command::Levels => {
            render_levels();
            Ok(())
        }
        Command::Drills => {
            render_drills();
            Ok(())
        }
        Command::Profile { command } => {
            let context = AppContext::open(config);
            match command {
                ProfileCommand::Set(args) => run_profile_set(&context, args),
                ProfileCommand::Show => run_profile_show(&context),
            }
        }
        Command::Assess(args) => run_assessment(AppContext::open(config), args).await,
        Command::Practice(args) => run_practice(AppContext::open(config), args).await,
    }
}
