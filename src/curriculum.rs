//! The curriculum that shapes every portfolio.
//!
//! Episodes, vocabulary words and assessment topics are configuration, not
//! presentation: the store and its tests depend only on a [`Curriculum`] value.
//! The built-in corvid unit is returned by [`Curriculum::default`], and any
//! other unit can be loaded from JSON.

use crate::types::*;
use serde::{Deserialize, Serialize};

/// Metadata for a single curriculum episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeTemplate {
    /// Stable 1-based identifier
    pub id: u32,
    /// Display title
    pub title: String,
    /// One-line prompt shown above the reflection fields
    pub description: String,
}

/// Fixed lists that every portfolio is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curriculum {
    /// Episodes in teaching order
    pub episodes: Vec<EpisodeTemplate>,
    /// Vocabulary words in teaching order
    pub vocabulary: Vec<String>,
    /// Self-assessment topics
    pub assessment_topics: Vec<String>,
}

const CORVID_EPISODES: &[(&str, &str)] = &[
    ("Meet the Corvids", "Crows, ravens, jays and magpies: who belongs to the family?"),
    ("Clever Problem Solvers", "Puzzle boxes, water displacement and multi-step tasks."),
    ("Crow Communication", "Calls, mimicry and what different sounds might mean."),
    ("Tool Makers", "How New Caledonian crows shape hooks from twigs and leaves."),
    ("Faces and Memory", "Crows remember people, and they tell each other."),
    ("Family Life", "Nesting, helpers at the nest and raising fledglings."),
    ("Caching Food", "Hiding food for later and keeping track of thousands of caches."),
    ("Play and Curiosity", "Sliding down roofs, dropping sticks and playing games."),
    ("Corvids and People", "Living alongside us in cities, farms and folklore."),
    ("Citizen Science", "How anyone can observe and record corvid behavior."),
];

const CORVID_VOCABULARY: &[&str] = &[
    "Corvid",
    "Cognition",
    "Mimicry",
    "Cache",
    "Fledgling",
    "Murder",
    "Roost",
    "Adaptation",
    "Habitat",
    "Mobbing",
];

const CORVID_TOPICS: &[&str] = &[
    "I can identify different corvid species",
    "I can explain how corvids solve problems",
    "I can describe how corvids communicate",
    "I can record careful observations",
    "I can use new vocabulary correctly",
];

impl Default for Curriculum {
    /// The built-in corvid learning unit.
    fn default() -> Self {
        Self {
            episodes: CORVID_EPISODES
                .iter()
                .enumerate()
                .map(|(i, (title, description))| EpisodeTemplate {
                    id: i as u32 + 1,
                    title: (*title).to_string(),
                    description: (*description).to_string(),
                })
                .collect(),
            vocabulary: CORVID_VOCABULARY.iter().map(|w| (*w).to_string()).collect(),
            assessment_topics: CORVID_TOPICS.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

impl Curriculum {
    /// Serialize the curriculum to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a curriculum from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Builds a fresh portfolio: every mutable field empty, `progress = 0`.
    pub fn blank_portfolio(&self) -> PortfolioData {
        PortfolioData {
            student_info: StudentInfo::default(),
            episodes: self
                .episodes
                .iter()
                .map(|e| EpisodeReflection::new(e.id, e.title.clone()))
                .collect(),
            vocabulary: self.vocabulary.iter().map(VocabularyWord::new).collect(),
            observations: String::new(),
            canvas_data: String::new(),
            self_assessment: self
                .assessment_topics
                .iter()
                .map(SelfAssessment::new)
                .collect(),
            progress: 0,
        }
    }

    /// Description for an episode id, if the curriculum has one.
    pub fn episode_description(&self, id: u32) -> Option<&str> {
        self.episodes
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.description.as_str())
    }

    /// Checks that a loaded portfolio has exactly this curriculum's lists,
    /// in order, with the fixed fields untouched.
    pub fn matches(&self, data: &PortfolioData) -> bool {
        data.episodes.len() == self.episodes.len()
            && data.vocabulary.len() == self.vocabulary.len()
            && data.self_assessment.len() == self.assessment_topics.len()
            && data
                .episodes
                .iter()
                .zip(&self.episodes)
                .all(|(e, t)| e.id == t.id && e.title == t.title)
            && data
                .vocabulary
                .iter()
                .zip(&self.vocabulary)
                .all(|(v, w)| &v.word == w)
            && data
                .self_assessment
                .iter()
                .zip(&self.assessment_topics)
                .all(|(a, t)| &a.topic == t)
    }
}
