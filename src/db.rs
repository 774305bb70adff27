use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Notification, Report, ReportPatch, ReportStatus};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let users = vec![
        (
            "6f1f4f6a-8f6e-4f14-9f35-0f8d8d8d2a01",
            "Alice Navarro",
            "alice.navarro@example.com",
        ),
        (
            "a4f0b2c9-55d1-4f4d-8f0e-9a7c6b5d4e02",
            "Bob Okafor",
            "bob.okafor@example.com",
        ),
        (
            "c91e7d35-2b8a-4c6f-b1d2-3e4f5a6b7c03",
            "Kiara Patel",
            "kiara.patel@example.com",
        ),
    ];

    for (id, display_name, email) in &users {
        sqlx::query(
            r#"
            INSERT INTO report_desk.users (id, display_name, email, blocked, created_at)
            VALUES ($1, $2, $3, FALSE, $4)
            ON CONFLICT (email) DO UPDATE
            SET display_name = EXCLUDED.display_name
            "#,
        )
        .bind(id)
        .bind(display_name)
        .bind(email)
        .bind(Utc::now().timestamp_millis())
        .execute(pool)
        .await?;
    }

    let reports = vec![
        (
            "seed-report-001",
            users[0].0,
            "Alice Navarro",
            "alice.navarro@example.com",
            "555-0101",
            "Community",
            "Water leak in the shared stairwell",
        ),
        (
            "seed-report-002",
            users[1].0,
            "Bob Okafor",
            "bob.okafor@example.com",
            "555-0102",
            "Billing",
            "Charged twice for the same month",
        ),
        (
            "seed-report-003",
            users[0].0,
            "Alice Navarro",
            "alice.navarro@example.com",
            "555-0101",
            "Community",
            "Broken light at the north entrance",
        ),
        (
            "seed-report-004",
            users[2].0,
            "Kiara Patel",
            "kiara.patel@example.com",
            "555-0103",
            "Community",
            "Noise complaints after hours",
        ),
    ];

    for (id, user_id, name, email, phone, matter_type, description) in reports {
        sqlx::query(
            r#"
            INSERT INTO report_desk.reports
            (id, created_at, description, email, phone, matter_type, name, user_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending')
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(Utc::now().timestamp_millis())
        .bind(description)
        .bind(email)
        .bind(phone)
        .bind(matter_type)
        .bind(name)
        .bind(user_id)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Full snapshot of the reports collection, in store key order. This is the
/// order the aggregation preserves; it is not chronological.
pub async fn fetch_reports(pool: &PgPool) -> Result<Vec<Report>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, created_at, description, email, phone, matter_type,
               name, user_id, status, resolved_at, response
        FROM report_desk.reports
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(report_from_row).collect())
}

fn report_from_row(row: &sqlx::postgres::PgRow) -> Report {
    let status: Option<String> = row.get("status");
    Report {
        id: row.get("id"),
        created_at: row.get("created_at"),
        description: row.get("description"),
        email: row.get("email"),
        phone: row.get("phone"),
        matter_type: row.get("matter_type"),
        name: row.get("name"),
        user_id: row.get("user_id"),
        status: ReportStatus::parse(status.as_deref()),
        resolved_at: row.get("resolved_at"),
        response: row.get("response"),
    }
}

pub async fn fetch_report(pool: &PgPool, report_id: &str) -> Result<Option<Report>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, created_at, description, email, phone, matter_type,
               name, user_id, status, resolved_at, response
        FROM report_desk.reports
        WHERE id = $1
        "#,
    )
    .bind(report_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(report_from_row))
}

pub async fn count_users(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM report_desk.users")
        .fetch_one(pool)
        .await
}

/// Server-side filter on the literal string 'resolved'; rows with any other
/// status value, including NULL, are excluded from the count.
pub async fn count_resolved_reports(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM report_desk.reports WHERE status = 'resolved'")
        .fetch_one(pool)
        .await
}

/// Blind overwrite of status, response and resolved_at. No prior read, so
/// two operators toggling the same report can clobber each other's response
/// text; accepted lost-update window.
pub async fn toggle_resolve_status(
    pool: &PgPool,
    report_id: &str,
    current_status: ReportStatus,
    response: Option<&str>,
) -> Result<ReportStatus, StoreError> {
    let patch = ReportPatch::for_toggle(current_status, response);

    sqlx::query(
        r#"
        UPDATE report_desk.reports
        SET status = $2, response = $3, resolved_at = $4
        WHERE id = $1
        "#,
    )
    .bind(report_id)
    .bind(patch.status.as_str())
    .bind(&patch.response)
    .bind(patch.resolved_at)
    .execute(pool)
    .await
    .map_err(StoreError::StatusUpdate)?;

    Ok(patch.status)
}

/// Full replace at (user_id, report_id); rewriting the same key swaps the
/// old notification for the new one.
pub async fn send_notification(
    pool: &PgPool,
    user_id: &str,
    report_id: &str,
    response: &str,
) -> Result<(), StoreError> {
    let note = Notification::for_response(user_id, report_id, response);

    sqlx::query(
        r#"
        INSERT INTO report_desk.notifications
        (user_id, report_id, kind, message, response, created_at, read)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id, report_id) DO UPDATE
        SET kind = EXCLUDED.kind,
            message = EXCLUDED.message,
            response = EXCLUDED.response,
            created_at = EXCLUDED.created_at,
            read = EXCLUDED.read
        "#,
    )
    .bind(&note.user_id)
    .bind(&note.report_id)
    .bind(&note.kind)
    .bind(&note.message)
    .bind(&note.response)
    .bind(note.created_at)
    .bind(note.read)
    .execute(pool)
    .await
    .map_err(StoreError::Notification)?;

    Ok(())
}

pub async fn block_user(pool: &PgPool, user_id: &str) -> Result<(), StoreError> {
    sqlx::query("UPDATE report_desk.users SET blocked = TRUE WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(StoreError::BlockUser)?;

    Ok(())
}

pub async fn insert_report(
    pool: &PgPool,
    user_id: &str,
    name: &str,
    email: &str,
    phone: &str,
    matter_type: &str,
    description: &str,
) -> Result<String, sqlx::Error> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO report_desk.reports
        (id, created_at, description, email, phone, matter_type, name, user_id, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending')
        "#,
    )
    .bind(&id)
    .bind(Utc::now().timestamp_millis())
    .bind(description)
    .bind(email)
    .bind(phone)
    .bind(matter_type)
    .bind(name)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(id)
}
