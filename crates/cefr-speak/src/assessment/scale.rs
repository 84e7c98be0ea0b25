//! Level metadata and numeric conversions for the CEFR scale.

use serde::Serialize;

use super::domain::CefrLevel;

/// Display metadata for a single level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CefrInfo {
    pub level: CefrLevel,
    pub color: &'static str,
    pub background_color: &'static str,
    pub description: &'static str,
    pub skill_description: &'static str,
}

const LEVEL_INFO: [CefrInfo; 6] = [
    CefrInfo {
        level: CefrLevel::A1,
        color: "red-600",
        background_color: "red-100",
        description: "Beginner",
        skill_description: "Can use familiar everyday expressions and basic phrases.",
    },
    CefrInfo {
        level: CefrLevel::A2,
        color: "orange-600",
        background_color: "orange-100",
        description: "Elementary",
        skill_description: "Can communicate simple, routine tasks and familiar topics.",
    },
    CefrInfo {
        level: CefrLevel::B1,
        color: "yellow-600",
        background_color: "yellow-100",
        description: "Intermediate",
        skill_description: "Can handle situations while traveling and express opinions.",
    },
    CefrInfo {
        level: CefrLevel::B2,
        color: "green-600",
        background_color: "green-100",
        description: "Upper Intermediate",
        skill_description:
            "Can interact fluently with native speakers and present clear arguments.",
    },
    CefrInfo {
        level: CefrLevel::C1,
        color: "blue-600",
        background_color: "blue-100",
        description: "Advanced",
        skill_description:
            "Can express ideas fluently and spontaneously without searching for expressions.",
    },
    CefrInfo {
        level: CefrLevel::C2,
        color: "purple-600",
        background_color: "purple-100",
        description: "Proficient",
        skill_description:
            "Can understand virtually everything and express themselves precisely.",
    },
];

/// Lower bound (inclusive) of every level above A1.
const THRESHOLDS: [(f64, CefrLevel); 5] = [
    (5.5, CefrLevel::C2),
    (4.5, CefrLevel::C1),
    (3.5, CefrLevel::B2),
    (2.5, CefrLevel::B1),
    (1.5, CefrLevel::A2),
];

pub fn info_for(level: CefrLevel) -> &'static CefrInfo {
    &LEVEL_INFO[level_to_score(level) as usize - 1]
}

/// A1 maps to 1, C2 to 6.
pub const fn level_to_score(level: CefrLevel) -> u8 {
    match level {
        CefrLevel::A1 => 1,
        CefrLevel::A2 => 2,
        CefrLevel::B1 => 3,
        CefrLevel::B2 => 4,
        CefrLevel::C1 => 5,
        CefrLevel::C2 => 6,
    }
}

/// Scores sitting exactly on a threshold belong to the higher level.
/// Anything below 1.5, including NaN, is A1.
pub fn score_to_level(score: f64) -> CefrLevel {
    THRESHOLDS
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, level)| *level)
        .unwrap_or(CefrLevel::A1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_scores_strictly_increase() {
        let scores: Vec<u8> = CefrLevel::ordered().into_iter().map(level_to_score).collect();
        assert_eq!(scores, vec![1, 2, 3, 4, 5, 6]);
        assert!(scores.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn every_level_has_descriptive_metadata() {
        for level in CefrLevel::ordered() {
            let info = info_for(level);
            assert_eq!(info.level, level);
            assert!(!info.description.is_empty());
            assert!(!info.skill_description.is_empty());
            assert!(!info.color.is_empty());
            assert!(!info.background_color.is_empty());
        }
        assert_eq!(info_for(CefrLevel::B2).description, "Upper Intermediate");
    }

    #[test]
    fn boundaries_belong_to_the_higher_level() {
        assert_eq!(score_to_level(1.5), CefrLevel::A2);
        assert_eq!(score_to_level(1.4999), CefrLevel::A1);
        assert_eq!(score_to_level(2.5), CefrLevel::B1);
        assert_eq!(score_to_level(3.5), CefrLevel::B2);
        assert_eq!(score_to_level(4.5), CefrLevel::C1);
        assert_eq!(score_to_level(5.5), CefrLevel::C2);
        assert_eq!(score_to_level(5.4999), CefrLevel::C1);
    }

    #[test]
    fn out_of_scale_scores_clamp_to_the_ends() {
        assert_eq!(score_to_level(0.0), CefrLevel::A1);
        assert_eq!(score_to_level(-3.0), CefrLevel::A1);
        assert_eq!(score_to_level(6.0), CefrLevel::C2);
        assert_eq!(score_to_level(f64::NAN), CefrLevel::A1);
    }

    #[test]
    fn level_round_trips_through_its_score() {
        for level in CefrLevel::ordered() {
            assert_eq!(score_to_level(f64::from(level_to_score(level))), level);
        }
    }
}
