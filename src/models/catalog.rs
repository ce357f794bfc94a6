// src/models/catalog.rs

use serde::Serialize;

use crate::error::AppError;

/// Academic subject a quiz is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Subject {
    English,
    Mathematics,
    Science,
    #[serde(rename = "ICT")]
    Ict,
}

impl Subject {
    pub const ALL: [Subject; 4] = [
        Subject::English,
        Subject::Mathematics,
        Subject::Science,
        Subject::Ict,
    ];

    /// Label persisted in leaderboard entries and pending questions.
    pub fn label(self) -> &'static str {
        match self {
            Subject::English => "English",
            Subject::Mathematics => "Mathematics",
            Subject::Science => "Science",
            Subject::Ict => "ICT",
        }
    }

    /// UI labels that resolve to this subject besides its own label.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Subject::Ict => &["Computing"],
            _ => &[],
        }
    }

    /// Open Trivia DB category id.
    pub fn category_id(self) -> u32 {
        match self {
            Subject::English => 10,     // Entertainment: Books
            Subject::Mathematics => 19, // Science: Mathematics
            Subject::Science => 17,     // Science & Nature
            Subject::Ict => 18,         // Science: Computers
        }
    }

    pub fn parse(input: &str) -> Option<Subject> {
        let input = input.trim();
        Subject::ALL.into_iter().find(|s| {
            s.label().eq_ignore_ascii_case(input)
                || s.aliases().iter().any(|a| a.eq_ignore_ascii_case(input))
        })
    }
}

/// Maps a subject label to the form used as a storage and filter key.
///
/// Known subjects (and their aliases, so "Computing" becomes "ICT") map to their
/// canonical label; anything else is only trimmed.
pub fn normalize_subject(input: &str) -> String {
    match Subject::parse(input) {
        Some(subject) => subject.label().to_string(),
        None => input.trim().to_string(),
    }
}

/// Grade band, each band mapped to one difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Level {
    Primary,
    #[serde(rename = "JHS")]
    Jhs,
    #[serde(rename = "SHS")]
    Shs,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Primary, Level::Jhs, Level::Shs];

    pub fn label(self) -> &'static str {
        match self {
            Level::Primary => "Primary",
            Level::Jhs => "JHS",
            Level::Shs => "SHS",
        }
    }

    pub fn difficulty(self) -> Difficulty {
        match self {
            Level::Primary => Difficulty::Easy,
            Level::Jhs => Difficulty::Medium,
            Level::Shs => Difficulty::Hard,
        }
    }

    pub fn parse(input: &str) -> Option<Level> {
        let input = input.trim();
        Level::ALL
            .into_iter()
            .find(|l| l.label().eq_ignore_ascii_case(input))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// A validated subject/level pair chosen on the setup screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSelection {
    pub subject: Subject,
    pub level: Level,
}

impl QuizSelection {
    pub fn resolve(subject: &str, level: &str) -> Result<Self, AppError> {
        let subject = Subject::parse(subject)
            .ok_or_else(|| AppError::InvalidSelection(format!("Unknown subject '{}'", subject)))?;
        let level = Level::parse(level)
            .ok_or_else(|| AppError::InvalidSelection(format!("Unknown level '{}'", level)))?;
        Ok(Self { subject, level })
    }

    pub fn category_id(&self) -> u32 {
        self.subject.category_id()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.level.difficulty()
    }
}

/// DTO describing what the setup screen can offer.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub subjects: Vec<SubjectInfo>,
    pub levels: Vec<LevelInfo>,
}

#[derive(Debug, Serialize)]
pub struct SubjectInfo {
    pub label: &'static str,
    pub aliases: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct LevelInfo {
    pub label: &'static str,
    pub difficulty: Difficulty,
}

impl CatalogResponse {
    pub fn build() -> Self {
        Self {
            subjects: Subject::ALL
                .into_iter()
                .map(|s| SubjectInfo {
                    label: s.label(),
                    aliases: s.aliases(),
                })
                .collect(),
            levels: Level::ALL
                .into_iter()
                .map(|l| LevelInfo {
                    label: l.label(),
                    difficulty: l.difficulty(),
                })
                .collect(),
        }
    }
}
