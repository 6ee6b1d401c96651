//! Closed status sets shared with the backend. The wire spelling is the
//! SCREAMING_SNAKE variant name, including the backend's own misspellings.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, VariantNames};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    New,
    Closed,
    Ended,
    Active,
    Deleted,
    Stoped,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskAndProjectStatus {
    New,
    Closed,
    Ended,
    Active,
    Deleted,
    Stoped,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentStatus {
    New,
    Posted,
    Deleted,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    New,
    Readed,
    Edited,
    Deleted,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    #[serde(rename = "WAITING_FOR_A_TASK")]
    #[strum(serialize = "WAITING_FOR_A_TASK")]
    WaitingForATask,
    Busy,
    TemporarilyInactive,
    AcademicLeave,
    Deleted,
    Banned,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_wire_names_match_backend() {
        assert_eq!(
            TaskAndProjectStatus::VARIANTS,
            &["NEW", "CLOSED", "ENDED", "ACTIVE", "DELETED", "STOPED"]
        );
        assert_eq!(MessageStatus::VARIANTS, &["NEW", "READED", "EDITED", "DELETED"]);
        assert_eq!(CommentStatus::VARIANTS, &["NEW", "POSTED", "DELETED"]);
        assert_eq!(
            UserStatus::VARIANTS,
            &[
                "WAITING_FOR_A_TASK",
                "BUSY",
                "TEMPORARILY_INACTIVE",
                "ACADEMIC_LEAVE",
                "DELETED",
                "BANNED"
            ]
        );
    }

    #[test]
    fn test_serde_and_display_agree() {
        for status in UserStatus::iter() {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
        let parsed: ProjectStatus = serde_json::from_str("\"STOPED\"").unwrap();
        assert_eq!(parsed, ProjectStatus::Stoped);
    }
}
