use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Failure to map a stored code or an import label onto the lookup tables.
///
/// For codes read back from the database this indicates a data-integrity bug:
/// every write path validates codes before persisting them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Unknown term kind code {0}")]
    UnknownKindCode(i32),

    #[error("Unknown day of week code {0}")]
    UnknownDayCode(i32),

    #[error("Unknown term kind label '{0}'")]
    UnknownKindLabel(String),

    #[error("Unknown day of week label '{0}'")]
    UnknownDayLabel(String),
}

/// Kind of a scheduled term.
///
/// Each kind has a stable integer code (what the database stores), an import
/// label (as it appears in schedule exports) and a display name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum TermKind {
    Lecture,
    ProjectClass,
    Lab,
    Seminar,
    Course,
    Conversatorium,
}

impl TermKind {
    /// All kinds, in code order.
    pub const ALL: &'static [TermKind] = &[
        Self::Lecture,
        Self::ProjectClass,
        Self::Lab,
        Self::Seminar,
        Self::Course,
        Self::Conversatorium,
    ];

    pub fn code(&self) -> i32 {
        match self {
            Self::Lecture => 1,
            Self::ProjectClass => 2,
            Self::Lab => 3,
            Self::Seminar => 4,
            Self::Course => 5,
            Self::Conversatorium => 6,
        }
    }

    pub fn from_code(code: i32) -> Result<Self, LookupError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.code() == code)
            .ok_or(LookupError::UnknownKindCode(code))
    }

    /// Label used by schedule imports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Lecture => "Wykład",
            Self::ProjectClass => "Ćwiczenia Projektowe",
            Self::Lab => "Lab.",
            Self::Seminar => "Zajęcia Seminaryjne",
            Self::Course => "Course",
            Self::Conversatorium => "Konwersatorium",
        }
    }

    pub fn from_label(label: &str) -> Result<Self, LookupError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.label() == label)
            .ok_or_else(|| LookupError::UnknownKindLabel(label.to_string()))
    }

    /// Human-readable name shown to students.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Lecture => "Wykład",
            Self::ProjectClass => "Ćwiczenia Projektowe",
            Self::Lab => "Laboratorium",
            Self::Seminar => "Seminarium",
            Self::Course => "Kurs",
            Self::Conversatorium => "Konwersatorium",
        }
    }

    /// Only lab terms take part in point allocation.
    pub fn is_choosable(&self) -> bool {
        matches!(self, Self::Lab)
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for TermKind {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

/// Teaching day. Weekends are not scheduled.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl DayOfWeek {
    pub const ALL: &'static [DayOfWeek] = &[
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
    ];

    pub fn code(&self) -> i32 {
        match self {
            Self::Monday => 1,
            Self::Tuesday => 2,
            Self::Wednesday => 3,
            Self::Thursday => 4,
            Self::Friday => 5,
        }
    }

    pub fn from_code(code: i32) -> Result<Self, LookupError> {
        Self::ALL
            .iter()
            .copied()
            .find(|day| day.code() == code)
            .ok_or(LookupError::UnknownDayCode(code))
    }

    /// Short label used by schedule imports ("M", "T", "W", "Th", "F").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Monday => "M",
            Self::Tuesday => "T",
            Self::Wednesday => "W",
            Self::Thursday => "Th",
            Self::Friday => "F",
        }
    }

    pub fn from_label(label: &str) -> Result<Self, LookupError> {
        Self::ALL
            .iter()
            .copied()
            .find(|day| day.label() == label)
            .ok_or_else(|| LookupError::UnknownDayLabel(label.to_string()))
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Monday => "Poniedziałek",
            Self::Tuesday => "Wtorek",
            Self::Wednesday => "Środa",
            Self::Thursday => "Czwartek",
            Self::Friday => "Piątek",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for DayOfWeek {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}
