use crate::infra::{parse_goal, parse_level, AppContext};
use cefr_speak::assessment::profile::save_profile;
use cefr_speak::assessment::scale::info_for;
use cefr_speak::assessment::{CefrLevel, LearningGoal, ProfileDraft};
use cefr_speak::error::AppError;
use chrono::Utc;
use clap::Args;

#[derive(Args, Debug)]
pub(crate) struct ProfileSetArgs {
    /// Display name
    #[arg(long)]
    pub(crate) name: String,
    /// Age in years
    #[arg(long)]
    pub(crate) age: Option<i64>,
    /// Native language
    #[arg(long)]
    pub(crate) native_language: Option<String>,
    /// fluency, ielts, study-abroad or job-interview [new profiles: fluency]
    #[arg(long, value_parser = parse_goal)]
    pub(crate) goal: Option<LearningGoal>,
    /// Target level, A1-C2 [new profiles: B2]
    #[arg(long, value_parser = parse_level)]
    pub(crate) target: Option<CefrLevel>,
}

pub(crate) fn run_profile_set(context: &AppContext, args: ProfileSetArgs) -> Result<(), AppError> {
    let ProfileSetArgs {
        name,
        age,
        native_language,
        goal,
        target,
    } = args;

    // Editing keeps every field the flags leave out.
    let existing = context.store.current_user();
    let mut draft = existing.map(ProfileDraft::from_profile).unwrap_or_default();
    draft.name = name;
    if age.is_some() {
        draft.age = age;
    }
    if native_language.is_some() {
        draft.native_language = native_language;
    }
    if let Some(goal) = goal {
        draft.learning_goal = goal;
    }
    if let Some(target) = target {
        draft.target_cefr = target;
    }
    let profile = save_profile(&context.profiles, draft, existing, Utc::now())?;

    let verb = if existing.is_some() { "Updated" } else { "Created" };
    println!(
        "{verb} profile for {} (target {} {})",
        profile.name,
        profile.target_cefr,
        info_for(profile.target_cefr).description
    );
    println!("Saved to {}", context.profiles.path().display());
    Ok(())
}

pub(crate) fn run_profile_show(context: &AppContext) -> Result<(), AppError> {
    let Some(profile) = context.store.current_user() else {
        println!("No profile saved yet. Create one with `cefr-speak profile set --name <NAME>`.");
        return Ok(());
    };

    println!("Profile {}", profile.id);
    println!("- Name: {}", profile.name);
    if let Some(age) = profile.age {
        println!("- Age: {age}");
    }
    if let Some(language) = &profile.native_language {
        println!("- Native language: {language}");
    }
    println!("- Goal: {}", profile.learning_goal.label());
    println!(
        "- Target: {} ({})",
        profile.target_cefr,
        info_for(profile.target_cefr).description
    );
    println!("- Member since: {}", profile.created_at.format("%Y-%m-%d"));
    Ok(())
}
