use cefr_speak::assessment::prompts::{drills, practice_topics};
use cefr_speak::assessment::scale::{info_for, level_to_score};
use cefr_speak::assessment::CefrLevel;

pub(crate) fn render_levels() {
    println!("CEFR speaking levels");
    for level in CefrLevel::ordered() {
        let info = info_for(level);
        println!(
            "- {level} {} (score {}): {}",
            info.description,
            level_to_score(level),
            info.skill_description
        );
    }
}

pub(crate) fn render_drills() {
    println!("Practice topics (use with `cefr-speak practice --topic <id>`)");
    for topic in practice_topics() {
        println!(
            "- {}: {} [{}]",
            topic.key,
            topic.title,
            topic.difficulty.label()
        );
        println!("    {}", topic.prompt);
    }

    println!("\nTargeted drills");
    for drill in drills() {
        println!("- {}: {}", drill.title, drill.description);
        for exercise in &drill.exercises {
            println!("    * {exercise}");
        }
    }
}
