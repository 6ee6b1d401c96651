use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::VariantNames;

use super::{
    DomainError, DomainResult, Entity, EntityId, EntityKind, FieldSpec, FieldValue, Related,
    UserStatus,
};

/// Weekly hours can never exceed the hours in a week.
pub const MAX_WEEKLY_HOURS: i64 = 169;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_hub_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited: Option<DateTime<Utc>>,
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::required_text("email", "Email"),
    FieldSpec::text("gitHubId", "Git Hub Id"),
    FieldSpec::required_text("name", "Name"),
    FieldSpec::number("hours", "Hours", Some(0), Some(MAX_WEEKLY_HOURS)),
    FieldSpec::choice("status", "Status", UserStatus::VARIANTS),
    FieldSpec::date("birthday", "Birthday"),
    FieldSpec::text("comment", "Comment"),
    FieldSpec::date_time("created", "Created"),
    FieldSpec::date_time("edited", "Edited"),
];

impl Entity for UserInfo {
    const KIND: EntityKind = EntityKind::UserInfo;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn get_field(&self, name: &str) -> DomainResult<FieldValue> {
        Ok(match name {
            "email" => FieldValue::Text(self.email.clone()),
            "gitHubId" => FieldValue::Text(self.git_hub_id.clone()),
            "name" => FieldValue::Text(self.name.clone()),
            "hours" => FieldValue::Number(self.hours),
            "status" => FieldValue::Choice(self.status.map(|s| s.to_string())),
            "birthday" => FieldValue::Date(self.birthday),
            "comment" => FieldValue::Text(self.comment.clone()),
            "created" => FieldValue::DateTime(self.created),
            "edited" => FieldValue::DateTime(self.edited),
            _ => return Err(DomainError::UnknownField(name.to_string())),
        })
    }

    fn set_field(&mut self, name: &str, value: FieldValue, _related: &Related<'_>) -> DomainResult<()> {
        match name {
            "email" => self.email = Some(value.into_required_text(name)?),
            "gitHubId" => self.git_hub_id = value.into_text(name)?,
            "name" => self.name = Some(value.into_required_text(name)?),
            "hours" => {
                let hours = value.into_number(name)?;
                match hours {
                    Some(h) if h < 0 => {
                        return Err(DomainError::BelowMinimum { field: name.to_string(), min: 0 })
                    }
                    Some(h) if h > MAX_WEEKLY_HOURS => {
                        return Err(DomainError::AboveMaximum {
                            field: name.to_string(),
                            max: MAX_WEEKLY_HOURS,
                        })
                    }
                    _ => self.hours = hours,
                }
            }
            "status" => self.status = value.into_choice(name)?,
            "birthday" => self.birthday = value.into_date(name)?,
            "comment" => self.comment = value.into_text(name)?,
            "created" => self.created = value.into_date_time(name)?,
            "edited" => self.edited = value.into_date_time(name)?,
            _ => return Err(DomainError::UnknownField(name.to_string())),
        }
        Ok(())
    }

    fn title(&self) -> String {
        match (&self.name, &self.email) {
            (Some(name), Some(email)) => format!("{name} <{email}>"),
            (Some(name), None) => name.clone(),
            (None, Some(email)) => email.clone(),
            (None, None) => self
                .id
                .map(|id| format!("User #{id}"))
                .unwrap_or_else(|| "New user".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_birthday_is_a_plain_date_on_the_wire() {
        let user = UserInfo {
            email: Some("a@b.c".to_string()),
            git_hub_id: Some("octo".to_string()),
            birthday: NaiveDate::from_ymd_opt(1990, 2, 28),
            ..Default::default()
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["birthday"], "1990-02-28");
        assert_eq!(json["gitHubId"], "octo");
    }

    #[test]
    fn test_hours_are_bounded() {
        let mut user = UserInfo::default();
        let related = Related::default();

        user.set_field("hours", FieldValue::Number(Some(169)), &related)
            .unwrap();
        assert_eq!(user.hours, Some(169));

        let err = user
            .set_field("hours", FieldValue::Number(Some(170)), &related)
            .unwrap_err();
        assert!(matches!(err, DomainError::AboveMaximum { max: 169, .. }));
        assert_eq!(user.hours, Some(169));
    }

    #[test]
    fn test_title_prefers_name_and_email() {
        let user = UserInfo {
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(user.title(), "Ada <ada@example.com>");
    }
}
