use std::collections::HashMap;

use chrono::Utc;
use log::trace;
use sqlx::{FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewRegistration, Registration, TeamMember},
};

// Keeps `IN (...)` lists well below SQLite's host parameter limit.
const MEMBER_LOOKUP_CHUNK: usize = 500;

/// Inserts a new registration and its team members using the given connection. This is not atomic on its own: run it
/// inside a transaction and pass `&mut tx` as the connection.
///
/// The registration number is computed by the INSERT itself, under SQLite's write lock, so concurrent writers cannot
/// observe the same maximum.
pub async fn insert_registration(
    reg: NewRegistration,
    conn: &mut SqliteConnection,
) -> Result<Registration, SqliteDatabaseError> {
    let created_at = Utc::now();
    let (id, registration_id): (i64, i64) = sqlx::query_as(
        r#"
            INSERT INTO registrations (
                registration_id,
                event_key,
                leader_name,
                leader_email,
                leader_mobile,
                leader_college,
                leader_department,
                leader_year,
                leader_city,
                selected_event,
                paper_presentation_dept,
                participation_type,
                team_size,
                payment_id,
                order_id,
                signature,
                total_fee,
                created_at,
                search_text
            ) VALUES (
                (SELECT COALESCE(MAX(registration_id), 1000) + 1 FROM registrations),
                ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
            )
            RETURNING id, registration_id;
        "#,
    )
    .bind(reg.event_key())
    .bind(&reg.leader_name)
    .bind(&reg.leader_email)
    .bind(&reg.leader_mobile)
    .bind(&reg.leader_college)
    .bind(&reg.leader_department)
    .bind(&reg.leader_year)
    .bind(&reg.leader_city)
    .bind(&reg.selected_event)
    .bind(&reg.paper_presentation_dept)
    .bind(reg.participation_type)
    .bind(reg.team_size)
    .bind(&reg.payment_id)
    .bind(&reg.order_id)
    .bind(&reg.signature)
    .bind(reg.total_fee)
    .bind(created_at)
    .bind(reg.search_text())
    .fetch_one(&mut *conn)
    .await
    .map_err(SqliteDatabaseError::from_write_error)?;
    for (position, member) in reg.team_members.iter().enumerate() {
        #[allow(clippy::cast_possible_wrap)]
        let position = position as i64;
        sqlx::query(
            "INSERT INTO team_members (parent_id, position, name, mobile, email, college) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(position)
        .bind(&member.name)
        .bind(&member.mobile)
        .bind(&member.email)
        .bind(&member.college)
        .execute(&mut *conn)
        .await
        .map_err(SqliteDatabaseError::from_write_error)?;
    }
    trace!("🗃️ Registration #{registration_id} stored with id {id} and {} team members", reg.team_members.len());
    Ok(Registration::from_new(id, registration_id, created_at, reg))
}

/// Checks whether any registration for the event (matched on its normalised key) uses the email or the mobile number.
pub async fn registration_exists(
    event_key: &str,
    email: &str,
    mobile: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM registrations WHERE event_key = ? AND (leader_email = ? OR leader_mobile = ?) LIMIT 1",
    )
    .bind(event_key)
    .bind(email)
    .bind(mobile)
    .fetch_optional(conn)
    .await?;
    Ok(found.is_some())
}

#[derive(FromRow)]
struct MemberRow {
    parent_id: i64,
    #[sqlx(flatten)]
    member: TeamMember,
}

/// Fills in the team members of every registration in the list, preserving the order in which they were submitted.
pub async fn attach_team_members(
    registrations: &mut [Registration],
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    let ids = registrations.iter().map(|r| r.id).collect::<Vec<i64>>();
    let mut members: HashMap<i64, Vec<TeamMember>> = HashMap::new();
    for chunk in ids.chunks(MEMBER_LOOKUP_CHUNK) {
        let mut builder =
            QueryBuilder::new("SELECT parent_id, name, mobile, email, college FROM team_members WHERE parent_id IN (");
        let mut list = builder.separated(", ");
        for id in chunk {
            list.push_bind(*id);
        }
        builder.push(") ORDER BY parent_id, position");
        let rows = builder.build_query_as::<MemberRow>().fetch_all(&mut *conn).await?;
        for row in rows {
            members.entry(row.parent_id).or_default().push(row.member);
        }
    }
    for registration in registrations.iter_mut() {
        if let Some(team) = members.remove(&registration.id) {
            registration.team_members = team;
        }
    }
    Ok(())
}
