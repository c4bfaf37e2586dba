use log::trace;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db::sqlite::{registrations::attach_team_members, SqliteDatabaseError},
    db_types::{
        event_key,
        EventStat,
        Pagination,
        Registration,
        RegistrationFilter,
        RegistrationOverview,
        Sorting,
    },
};

const REGISTRATION_COLUMNS: &str = "id, registration_id, leader_name, leader_email, leader_mobile, leader_college, \
                                    leader_department, leader_year, leader_city, selected_event, \
                                    paper_presentation_dept, participation_type, team_size, payment_id, order_id, \
                                    signature, total_fee, created_at";

/// Escapes the LIKE wildcards in user-supplied search text. Used together with `ESCAPE '\'`.
pub fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &RegistrationFilter) {
    let search = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let event = filter.event.as_deref().map(event_key).filter(|s| !s.is_empty());
    if event.is_none() && search.is_none() && filter.created_from.is_none() && filter.created_until.is_none() {
        return;
    }
    builder.push(" WHERE ");
    let mut where_clause = builder.separated(" AND ");
    if let Some(event) = event {
        where_clause.push("event_key = ");
        where_clause.push_bind_unseparated(event);
    }
    if let Some(search) = search {
        let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
        where_clause.push("search_text LIKE ");
        where_clause.push_bind_unseparated(pattern);
        where_clause.push_unseparated(" ESCAPE '\\'");
    }
    if let Some(since) = filter.created_from {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = filter.created_until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
}

/// Fetches registrations according to the filter, sorted by the requested field with the insertion order as a
/// tie-breaker. Team members are loaded for every returned registration.
pub async fn fetch_registrations(
    filter: &RegistrationFilter,
    sorting: Sorting,
    page: Option<Pagination>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Registration>, SqliteDatabaseError> {
    let mut builder = QueryBuilder::new(format!("SELECT {REGISTRATION_COLUMNS} FROM registrations"));
    push_filter(&mut builder, filter);
    // Column names come from a closed set, never from user input.
    let direction = sorting.order.as_sql();
    builder.push(format!(" ORDER BY {} {direction}, id {direction}", sorting.field.column()));
    if let Some(page) = page {
        builder.push(" LIMIT ");
        builder.push_bind(page.limit);
        builder.push(" OFFSET ");
        builder.push_bind(page.offset);
    }
    trace!("🗃️ Executing query: {}", builder.sql());
    let mut registrations = builder.build_query_as::<Registration>().fetch_all(&mut *conn).await?;
    attach_team_members(&mut registrations, conn).await?;
    trace!("🗃️ Result of fetch_registrations: {}", registrations.len());
    Ok(registrations)
}

pub async fn count_registrations(
    filter: &RegistrationFilter,
    conn: &mut SqliteConnection,
) -> Result<i64, SqliteDatabaseError> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM registrations");
    push_filter(&mut builder, filter);
    let count = builder.build_query_scalar::<i64>().fetch_one(conn).await?;
    Ok(count)
}

pub async fn registered_events(conn: &mut SqliteConnection) -> Result<Vec<String>, SqliteDatabaseError> {
    let events = sqlx::query_scalar("SELECT DISTINCT selected_event FROM registrations ORDER BY selected_event")
        .fetch_all(conn)
        .await?;
    Ok(events)
}

pub async fn registration_overview(conn: &mut SqliteConnection) -> Result<RegistrationOverview, SqliteDatabaseError> {
    let overview = sqlx::query_as(
        r#"
            SELECT
                COUNT(*) AS total_registrations,
                COALESCE(SUM(CASE WHEN participation_type = 'solo' THEN 1 ELSE 0 END), 0) AS solo_registrations,
                COALESCE(SUM(CASE WHEN participation_type = 'team' THEN 1 ELSE 0 END), 0) AS team_registrations,
                CAST(COALESCE(SUM(total_fee), 0) AS REAL) AS total_revenue
            FROM registrations
        "#,
    )
    .fetch_one(conn)
    .await?;
    Ok(overview)
}

pub async fn event_statistics(conn: &mut SqliteConnection) -> Result<Vec<EventStat>, SqliteDatabaseError> {
    let stats = sqlx::query_as(
        r#"
            SELECT
                MIN(selected_event) AS event,
                COUNT(*) AS count,
                CAST(COALESCE(SUM(total_fee), 0) AS REAL) AS total_fees
            FROM registrations
            GROUP BY event_key
            ORDER BY count DESC, event ASC
        "#,
    )
    .fetch_all(conn)
    .await?;
    Ok(stats)
}
