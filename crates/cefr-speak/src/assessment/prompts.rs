use serde::Serialize;

/// Ordered prompts spoken during an assessment conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptScript {
    prompts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("a prompt script needs at least one prompt")]
pub struct EmptyScript;

impl PromptScript {
    pub fn new<I, S>(prompts: I) -> Result<Self, EmptyScript>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prompts: Vec<String> = prompts.into_iter().map(Into::into).collect();
        if prompts.is_empty() {
            return Err(EmptyScript);
        }
        Ok(Self { prompts })
    }

    pub fn standard() -> Self {
        Self {
            prompts: STANDARD_PROMPTS.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn get(&self, turn: usize) -> Option<&str> {
        self.prompts.get(turn).map(String::as_str)
    }

    pub fn last_turn(&self) -> usize {
        self.prompts.len() - 1
    }
}

impl Default for PromptScript {
    fn default() -> Self {
        Self::standard()
    }
}

const STANDARD_PROMPTS: [&str; 5] = [
    "Hello! Let's start with something simple. Tell me about your favorite hobby and why you enjoy it.",
    "That's interesting! How long have you been doing this hobby?",
    "Now, let's talk about travel. Describe a place you've visited or would like to visit.",
    "What do you think is the most important skill for success in today's world?",
    "Finally, tell me about a challenge you've overcome and what you learned from it.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PracticeTopic {
    pub key: &'static str,
    pub title: &'static str,
    pub prompt: &'static str,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drill {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub exercises: Vec<&'static str>,
}

pub fn practice_topics() -> Vec<PracticeTopic> {
    vec![
        PracticeTopic {
            key: "climate",
            title: "Climate Change",
            prompt: "What are your thoughts on climate change and how can individuals make a difference?",
            difficulty: Difficulty::Advanced,
        },
        PracticeTopic {
            key: "technology",
            title: "Technology in Education",
            prompt: "How do you think technology is changing the way we learn?",
            difficulty: Difficulty::Intermediate,
        },
        PracticeTopic {
            key: "travel",
            title: "Travel Experiences",
            prompt: "Tell me about a memorable travel experience and what made it special.",
            difficulty: Difficulty::Intermediate,
        },
        PracticeTopic {
            key: "career",
            title: "Career Goals",
            prompt: "What are your career aspirations and how are you working towards them?",
            difficulty: Difficulty::Advanced,
        },
    ]
}

pub fn find_topic(key: &str) -> Option<PracticeTopic> {
    let key = key.trim().to_ascii_lowercase();
    practice_topics().into_iter().find(|topic| topic.key == key)
}

pub fn drills() -> Vec<Drill> {
    vec![
        Drill {
            key: "pronunciation",
            title: "Pronunciation Practice",
            description: "Practice difficult sounds and word stress patterns",
            exercises: vec![
                "Repeat: \"The weather is particularly pleasant today\"",
                "Focus on the \"th\" sound: \"Think, thank, thought, through\"",
                "Word stress: \"PHO-to-graph, pho-TOG-ra-phy, pho-to-GRAPH-ic\"",
            ],
        },
        Drill {
            key: "connectors",
            title: "Using Connectors",
            description: "Learn to use linking words effectively",
            exercises: vec![
                "Use \"however\" in a sentence about technology",
                "Connect two ideas using \"therefore\"",
                "Express contrast using \"on the other hand\"",
            ],
        },
        Drill {
            key: "vocabulary",
            title: "Vocabulary Expansion",
            description: "Learn and practice advanced vocabulary",
            exercises: vec![
                "Use \"substantial\" instead of \"big\" in a sentence",
                "Replace \"good\" with more specific adjectives",
                "Practice academic vocabulary: analyze, evaluate, synthesize",
            ],
        },
    ]
}
