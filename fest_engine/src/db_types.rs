use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use fest_common::Rupees;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------  ParticipationType  ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParticipationType {
    /// The leader is the only participant.
    Solo,
    /// The leader plus one or more team members.
    Team,
}

impl Display for ParticipationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParticipationType::Solo => write!(f, "solo"),
            ParticipationType::Team => write!(f, "team"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid participation type: {0}")]
pub struct ConversionError(String);

impl FromStr for ParticipationType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solo" => Ok(Self::Solo),
            "team" => Ok(Self::Team),
            _ => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------     TeamMember      ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub mobile: String,
    pub email: String,
    pub college: String,
}

impl TeamMember {
    pub fn new<S: Into<String>>(name: S, mobile: S, email: S, college: S) -> Self {
        Self { name: name.into(), mobile: mobile.into(), email: email.into(), college: college.into() }
    }
}

//--------------------------------------   NewRegistration   ---------------------------------------------------------
/// A registration that has passed validation and normalisation, and is ready to be written to the store.
///
/// Registration numbers and timestamps are assigned by the store at insert time, so they are not part of this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRegistration {
    pub leader_name: String,
    pub leader_email: String,
    pub leader_mobile: String,
    pub leader_college: String,
    pub leader_department: String,
    pub leader_year: String,
    pub leader_city: String,
    pub selected_event: String,
    pub paper_presentation_dept: String,
    pub participation_type: ParticipationType,
    pub team_size: i64,
    pub team_members: Vec<TeamMember>,
    pub payment_id: String,
    pub order_id: String,
    pub signature: String,
    pub total_fee: Rupees,
}

impl NewRegistration {
    /// The key used to match registrations for the same event: trimmed and lower-cased.
    pub fn event_key(&self) -> String {
        event_key(&self.selected_event)
    }

    /// The lower-cased leader name, email, mobile, college and event that admin searches match against. SQLite only
    /// folds ASCII case itself, so the folding happens here.
    pub fn search_text(&self) -> String {
        [&self.leader_name, &self.leader_email, &self.leader_mobile, &self.leader_college, &self.selected_event]
            .map(|s| s.to_lowercase())
            .join("\u{1f}")
    }
}

pub fn event_key(event: &str) -> String {
    event.trim().to_lowercase()
}

//--------------------------------------     Registration    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: i64,
    pub registration_id: i64,
    pub leader_name: String,
    pub leader_email: String,
    pub leader_mobile: String,
    pub leader_college: String,
    pub leader_department: String,
    pub leader_year: String,
    pub leader_city: String,
    pub selected_event: String,
    pub paper_presentation_dept: String,
    pub participation_type: ParticipationType,
    pub team_size: i64,
    #[sqlx(skip)]
    pub team_members: Vec<TeamMember>,
    pub payment_id: String,
    pub order_id: String,
    pub signature: String,
    pub total_fee: Rupees,
    pub created_at: DateTime<Utc>,
}

impl Registration {
    pub fn from_new(id: i64, registration_id: i64, created_at: DateTime<Utc>, reg: NewRegistration) -> Self {
        Self {
            id,
            registration_id,
            leader_name: reg.leader_name,
            leader_email: reg.leader_email,
            leader_mobile: reg.leader_mobile,
            leader_college: reg.leader_college,
            leader_department: reg.leader_department,
            leader_year: reg.leader_year,
            leader_city: reg.leader_city,
            selected_event: reg.selected_event,
            paper_presentation_dept: reg.paper_presentation_dept,
            participation_type: reg.participation_type,
            team_size: reg.team_size,
            team_members: reg.team_members,
            payment_id: reg.payment_id,
            order_id: reg.order_id,
            signature: reg.signature,
            total_fee: reg.total_fee,
            created_at,
        }
    }
}

//--------------------------------------  RegistrationFilter  --------------------------------------------------------
/// Narrows down the set of registrations returned by the admin queries. Every criterion is optional and they are
/// combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationFilter {
    /// Matches the selected event, ignoring case and surrounding whitespace.
    pub event: Option<String>,
    /// Case-insensitive substring match against leader name, email, mobile, college and the event name.
    pub search: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub created_until: Option<DateTime<Utc>>,
}

impl RegistrationFilter {
    pub fn with_event<S: Into<String>>(mut self, event: S) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn with_search<S: Into<String>>(mut self, search: S) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn created_from(mut self, since: DateTime<Utc>) -> Self {
        self.created_from = Some(since);
        self
    }

    pub fn created_until(mut self, until: DateTime<Utc>) -> Self {
        self.created_until = Some(until);
        self
    }
}

//--------------------------------------       Sorting       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    RegistrationId,
    LeaderName,
    LeaderEmail,
    LeaderMobile,
    LeaderCollege,
    LeaderDepartment,
    LeaderYear,
    LeaderCity,
    SelectedEvent,
    PaperPresentationDept,
    ParticipationType,
    TeamSize,
    TotalFee,
    PaymentId,
    OrderId,
    #[default]
    CreatedAt,
}

impl SortField {
    /// Maps the JSON field name used by the dashboard onto a sortable field. Unknown names fall back to `createdAt`.
    pub fn from_json_name(name: &str) -> Self {
        match name.trim() {
            "registrationId" => Self::RegistrationId,
            "leaderName" => Self::LeaderName,
            "leaderEmail" => Self::LeaderEmail,
            "leaderMobile" => Self::LeaderMobile,
            "leaderCollege" => Self::LeaderCollege,
            "leaderDepartment" => Self::LeaderDepartment,
            "leaderYear" => Self::LeaderYear,
            "leaderCity" => Self::LeaderCity,
            "selectedEvent" => Self::SelectedEvent,
            "paperPresentationDept" => Self::PaperPresentationDept,
            "participationType" => Self::ParticipationType,
            "teamSize" => Self::TeamSize,
            "totalFee" => Self::TotalFee,
            "paymentId" => Self::PaymentId,
            "orderId" => Self::OrderId,
            _ => Self::CreatedAt,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::RegistrationId => "registration_id",
            Self::LeaderName => "leader_name",
            Self::LeaderEmail => "leader_email",
            Self::LeaderMobile => "leader_mobile",
            Self::LeaderCollege => "leader_college",
            Self::LeaderDepartment => "leader_department",
            Self::LeaderYear => "leader_year",
            Self::LeaderCity => "leader_city",
            Self::SelectedEvent => "selected_event",
            Self::PaperPresentationDept => "paper_presentation_dept",
            Self::ParticipationType => "participation_type",
            Self::TeamSize => "team_size",
            Self::TotalFee => "total_fee",
            Self::PaymentId => "payment_id",
            Self::OrderId => "order_id",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// `asc` (any case) sorts ascending; anything else sorts descending.
    pub fn from_param(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("asc") {
            Self::Ascending
        } else {
            Self::Descending
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sorting {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sorting {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }
}

//--------------------------------------     Pagination      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: i64,
    pub limit: i64,
}

//--------------------------------------     Statistics      ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOverview {
    pub total_registrations: i64,
    pub solo_registrations: i64,
    pub team_registrations: i64,
    pub total_revenue: Rupees,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStat {
    pub event: String,
    pub count: i64,
    pub total_fees: Rupees,
}
