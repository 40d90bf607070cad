//! Notices published by administrators and read from every role's home page.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, FieldErrors, Result,
  academic::missing_fields,
  account::Role,
  registration::{parse_date, required},
};

/// Who a notice is addressed to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Audience {
  All,
  Faculty,
  Student,
}

impl Audience {
  /// Admins read every notice; other roles read their own and `all`.
  pub fn reaches(self, role: Role) -> bool {
    match (self, role) {
      (_, Role::Admin) | (Self::All, _) => true,
      (Self::Faculty, Role::Faculty) | (Self::Student, Role::Student) => true,
      _ => false,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
  pub id:         Uuid,
  pub topic:      String,
  pub date:       NaiveDate,
  pub content:    String,
  pub from:       String,
  pub notice_for: Audience,
  pub created_at: DateTime<Utc>,
}

/// A notice that passed validation and is ready to store.
#[derive(Debug, Clone)]
pub struct NewNotice {
  pub topic:      String,
  pub date:       NaiveDate,
  pub content:    String,
  pub from:       String,
  pub notice_for: Audience,
}

/// Body of `POST /api/admin/createnotice`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NoticeForm {
  pub topic:      Option<String>,
  pub date:       Option<String>,
  pub content:    Option<String>,
  pub from:       Option<String>,
  pub notice_for: Option<String>,
}

impl NoticeForm {
  pub fn validate(self) -> Result<NewNotice> {
    let mut missing = FieldErrors::new();
    let topic = required(&mut missing, "topic", self.topic);
    let date = required(&mut missing, "date", self.date);
    let content = required(&mut missing, "content", self.content);
    let from = required(&mut missing, "from", self.from);
    let notice_for = required(&mut missing, "noticeFor", self.notice_for);

    let (Some(topic), Some(date), Some(content), Some(from), Some(notice_for)) =
      (topic, date, content, from, notice_for)
    else {
      return Err(missing_fields(missing));
    };
    let notice_for = notice_for
      .trim()
      .to_ascii_lowercase()
      .parse::<Audience>()
      .map_err(|_| {
        Error::invalid_field(
          "noticeFor",
          "noticeFor must be one of all, faculty, student",
        )
      })?;
    Ok(NewNotice {
      topic: topic.trim().to_owned(),
      date: parse_date("date", date.trim())?,
      content: content.trim().to_owned(),
      from: from.trim().to_owned(),
      notice_for,
    })
  }
}
