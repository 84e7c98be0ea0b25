use std::path::PathBuf;

use crate::infra::{cancel_on_ctrl_c, score_bar, AppContext, ConsoleObserver};
use cefr_speak::assessment::export::{issue_certificate, ResultsReport};
use cefr_speak::assessment::progress::next_step;
use cefr_speak::assessment::prompts::{find_topic, practice_topics, PromptScript};
use cefr_speak::assessment::scale::info_for;
use cefr_speak::assessment::{SessionDriver, TestResult, UserProfile};
use cefr_speak::error::AppError;
use clap::Args;
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct AssessArgs {
    /// Write the results report (and certificate, once earned) here
    #[arg(long)]
    pub(crate) export_dir: Option<PathBuf>,
    /// Make the analysis backend reject the recording
    #[arg(long)]
    pub(crate) simulate_failure: bool,
    /// Seed for reproducible mock scores
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

#[derive(Args, Debug)]
pub(crate) struct PracticeArgs {
    /// Topic id, see `cefr-speak drills`
    #[arg(long)]
    pub(crate) topic: String,
    /// Seed for reproducible mock scores
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

pub(crate) async fn run_assessment(mut context: AppContext, args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        export_dir,
        simulate_failure,
        seed,
    } = args;

    let analyzer = context.analyzer(seed, simulate_failure);
    let driver = SessionDriver::new(analyzer, context.config.session.clone());
    let cancel = cancel_on_ctrl_c();

    println!(
        "Speaking assessment: {} prompts, about {} seconds",
        PromptScript::standard().len(),
        driver.config().time_budget
    );
    let result = driver
        .run_assessment(&mut context.store, &cancel, &mut ConsoleObserver)
        .await?;

    let Some(user) = context.store.current_user() else {
        return Ok(());
    };
    render_result(&result, user);

    if let Some(dir) = export_dir {
        let report = ResultsReport::new(&result, user).to_document();
        let path = report.write_to(&dir)?;
        println!("Report written to {}", path.display());

        match issue_certificate(&result, user) {
            Ok(certificate) => {
                let path = certificate.to_document().write_to(&dir)?;
                println!("Certificate written to {}", path.display());
            }
            Err(err) => {
                info!(error = %err, "certificate not issued");
                println!("Certificate locked: {err}");
            }
        }
    }
    Ok(())
}

fn render_result(result: &TestResult, user: &UserProfile) {
    let level = info_for(result.cefr_level);
    println!(
        "\nYour level: {} {} (overall {:.1}/6.0)",
        result.cefr_level, level.description, result.overall_score
    );
    for (skill, score) in result.subskills.entries() {
        println!("  {:<14} {} {:.1}", skill.label(), score_bar(score), score);
    }
    println!("Focus area: {}", result.subskills.weakest().label());
    println!("\n{}", result.feedback);
    println!(
        "\nTarget {}: {}",
        user.target_cefr,
        next_step(result, user).label()
    );
}

pub(crate) async fn run_practice(mut context: AppContext, args: PracticeArgs) -> Result<(), AppError> {
    let Some(topic) = find_topic(&args.topic) else {
        let known: Vec<&str> = practice_topics().iter().map(|topic| topic.key).collect();
        return Err(AppError::Usage(format!(
            "unknown practice topic '{}' (expected one of: {})",
            args.topic,
            known.join(", ")
        )));
    };

    let analyzer = context.analyzer(args.seed, false);
    let driver = SessionDriver::new(analyzer, context.config.session.clone());
    let cancel = cancel_on_ctrl_c();

    println!("Practice: {}", topic.title);
    let session = driver
        .run_practice(topic, &mut context.store, &cancel, &mut ConsoleObserver)
        .await?;

    println!("\nScore {:.1}/6.0 after {}s", session.score, session.duration);
    for (skill, score) in session.subskills.entries() {
        println!("  {:<14} {} {:.1}", skill.label(), score_bar(score), score);
    }
    println!("\n{}", session.feedback);
    Ok(())
}
