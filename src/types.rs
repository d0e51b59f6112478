//! Core data types for the learning portfolio.
//!
//! This module defines the portfolio aggregate and its parts: student identity,
//! one reflection per curriculum episode, the vocabulary list, self-assessment
//! ratings, the observations journal and the committed canvas snapshot.
//!
//! Field names serialize in camelCase so the persisted blob and the export file
//! keep the `studentInfo` / `canvasData` / `selfAssessment` layout.

use serde::{Deserialize, Serialize};

/// Free-text identity fields for the student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    /// Student's name, also used for the export filename
    pub name: String,
    /// Teacher's name
    pub teacher: String,
    /// School name
    pub school: String,
    /// Grade or year group
    pub grade: String,
    /// Date the student started the unit
    pub start_date: String,
}

impl StudentInfo {
    /// Returns the value of a single field.
    pub fn get(&self, field: StudentField) -> &str {
        match field {
            StudentField::Name => &self.name,
            StudentField::Teacher => &self.teacher,
            StudentField::School => &self.school,
            StudentField::Grade => &self.grade,
            StudentField::StartDate => &self.start_date,
        }
    }

    /// Returns a mutable reference to a single field.
    pub fn get_mut(&mut self, field: StudentField) -> &mut String {
        match field {
            StudentField::Name => &mut self.name,
            StudentField::Teacher => &mut self.teacher,
            StudentField::School => &mut self.school,
            StudentField::Grade => &mut self.grade,
            StudentField::StartDate => &mut self.start_date,
        }
    }
}

/// Selects one of the [`StudentInfo`] fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StudentField {
    /// Student's name
    Name,
    /// Teacher's name
    Teacher,
    /// School name
    School,
    /// Grade
    Grade,
    /// Start date
    StartDate,
}

impl StudentField {
    /// Every student field, in display order.
    pub const ALL: [StudentField; 5] = [
        StudentField::Name,
        StudentField::Teacher,
        StudentField::School,
        StudentField::Grade,
        StudentField::StartDate,
    ];

    /// Human-readable label for forms.
    pub fn label(self) -> &'static str {
        match self {
            StudentField::Name => "Name",
            StudentField::Teacher => "Teacher",
            StudentField::School => "School",
            StudentField::Grade => "Grade",
            StudentField::StartDate => "Start date",
        }
    }
}

/// The student's reflection on one curriculum episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeReflection {
    /// Curriculum episode id (1-based, fixed)
    pub id: u32,
    /// Episode title (fixed)
    pub title: String,
    /// Date the episode was watched
    pub date: String,
    /// What the student learned
    pub learning: String,
    /// Questions the episode raised
    pub questions: String,
    /// True iff `learning` is non-empty after trimming
    pub completed: bool,
}

impl EpisodeReflection {
    /// Creates an empty reflection for the given curriculum episode.
    pub fn new(id: u32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            date: String::new(),
            learning: String::new(),
            questions: String::new(),
            completed: false,
        }
    }

    /// Returns the value of a mutable field.
    pub fn get(&self, field: EpisodeField) -> &str {
        match field {
            EpisodeField::Date => &self.date,
            EpisodeField::Learning => &self.learning,
            EpisodeField::Questions => &self.questions,
        }
    }

    /// Sets a mutable field and refreshes the `completed` flag.
    pub fn set(&mut self, field: EpisodeField, value: String) {
        match field {
            EpisodeField::Date => self.date = value,
            EpisodeField::Learning => self.learning = value,
            EpisodeField::Questions => self.questions = value,
        }
        self.refresh_completed();
    }

    /// Completion only looks at `learning`; `questions` is ignored.
    pub fn refresh_completed(&mut self) {
        self.completed = !self.learning.trim().is_empty();
    }
}

/// Selects one of the user-editable [`EpisodeReflection`] fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EpisodeField {
    /// Date watched
    Date,
    /// What I learned
    Learning,
    /// Questions I still have
    Questions,
}

/// A vocabulary entry; `word` is fixed by the curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyWord {
    /// The curriculum word (fixed)
    pub word: String,
    /// Student's definition
    pub definition: String,
    /// Student's example sentence
    pub example: String,
}

impl VocabularyWord {
    /// Creates an entry with empty definition and example.
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            definition: String::new(),
            example: String::new(),
        }
    }

    /// Returns the value of a mutable field.
    pub fn get(&self, field: VocabularyField) -> &str {
        match field {
            VocabularyField::Definition => &self.definition,
            VocabularyField::Example => &self.example,
        }
    }

    /// Sets a mutable field.
    pub fn set(&mut self, field: VocabularyField, value: String) {
        match field {
            VocabularyField::Definition => self.definition = value,
            VocabularyField::Example => self.example = value,
        }
    }
}

/// Selects one of the user-editable [`VocabularyWord`] fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VocabularyField {
    /// Definition in the student's own words
    Definition,
    /// Example sentence
    Example,
}

/// A self-assessment rating for one fixed topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfAssessment {
    /// Topic being rated (fixed)
    pub topic: String,
    /// Rating from 0 (unrated) to 5
    pub rating: u8,
}

impl SelfAssessment {
    /// Creates an unrated topic.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            rating: 0,
        }
    }
}

/// The portfolio aggregate: all state for one student in one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioData {
    /// Identity fields
    pub student_info: StudentInfo,
    /// One reflection per curriculum episode, in curriculum order
    pub episodes: Vec<EpisodeReflection>,
    /// Vocabulary entries, in curriculum order
    pub vocabulary: Vec<VocabularyWord>,
    /// Free-form observation journal
    pub observations: String,
    /// PNG data URI of the last committed drawing, or empty
    pub canvas_data: String,
    /// Ratings per assessment topic, in curriculum order
    pub self_assessment: Vec<SelfAssessment>,
    /// Derived completion percentage (0..=100)
    pub progress: u8,
}

impl PortfolioData {
    /// Serialize the portfolio to a 2-space indented JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a portfolio from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Looks up an episode by its curriculum id.
    pub fn episode(&self, id: u32) -> Option<&EpisodeReflection> {
        self.episodes.iter().find(|e| e.id == id)
    }
}
