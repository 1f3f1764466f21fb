use crate::schema::sql_types::{
    IssuePriority as IssuePriorityType, IssueStatus as IssueStatusType,
    SprintStatus as SprintStatusType,
};
use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::pg::Pg;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::{AsExpression, FromSqlRow};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Kanban column of an issue. Declaration order matches the Postgres enum,
/// which is what "status ascending" sorts by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    AsExpression, FromSqlRow,
)]
#[diesel(sql_type = IssueStatusType)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    Todo,
    InProgress,
    InReview,
    Done,
}

impl FromSql<IssueStatusType, Pg> for IssueStatus {
    fn from_sql(bytes: <Pg as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        match s.as_str() {
            "TODO" => Ok(IssueStatus::Todo),
            "IN_PROGRESS" => Ok(IssueStatus::InProgress),
            "IN_REVIEW" => Ok(IssueStatus::InReview),
            "DONE" => Ok(IssueStatus::Done),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl ToSql<IssueStatusType, Pg> for IssueStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            IssueStatus::Todo => out.write_all(b"TODO")?,
            IssueStatus::InProgress => out.write_all(b"IN_PROGRESS")?,
            IssueStatus::InReview => out.write_all(b"IN_REVIEW")?,
            IssueStatus::Done => out.write_all(b"DONE")?,
        }
        Ok(IsNull::No)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = IssuePriorityType)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssuePriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl FromSql<IssuePriorityType, Pg> for IssuePriority {
    fn from_sql(bytes: <Pg as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        match s.as_str() {
            "LOW" => Ok(IssuePriority::Low),
            "MEDIUM" => Ok(IssuePriority::Medium),
            "HIGH" => Ok(IssuePriority::High),
            "URGENT" => Ok(IssuePriority::Urgent),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl ToSql<IssuePriorityType, Pg> for IssuePriority {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            IssuePriority::Low => out.write_all(b"LOW")?,
            IssuePriority::Medium => out.write_all(b"MEDIUM")?,
            IssuePriority::High => out.write_all(b"HIGH")?,
            IssuePriority::Urgent => out.write_all(b"URGENT")?,
        }
        Ok(IsNull::No)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = SprintStatusType)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SprintStatus {
    Planned,
    Active,
    Completed,
}

impl FromSql<SprintStatusType, Pg> for SprintStatus {
    fn from_sql(bytes: <Pg as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        match s.as_str() {
            "PLANNED" => Ok(SprintStatus::Planned),
            "ACTIVE" => Ok(SprintStatus::Active),
            "COMPLETED" => Ok(SprintStatus::Completed),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl ToSql<SprintStatusType, Pg> for SprintStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            SprintStatus::Planned => out.write_all(b"PLANNED")?,
            SprintStatus::Active => out.write_all(b"ACTIVE")?,
            SprintStatus::Completed => out.write_all(b"COMPLETED")?,
        }
        Ok(IsNull::No)
    }
}
