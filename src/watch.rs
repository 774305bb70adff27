use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::dashboard::{self, DashboardEvent, DashboardState};
use crate::db;
use crate::error::StoreError;

/// Run the live console: three independent subscriptions feed one event
/// queue, and the reducer folds each event into the next state. Events from
/// different subscriptions interleave in whatever order the store emits
/// them; within one subscription, snapshots arrive in emission order.
pub async fn run(pool: PgPool) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel::<DashboardEvent>(32);

    tokio::spawn(reports_feed(pool.clone(), tx.clone()));
    tokio::spawn(users_feed(pool.clone(), tx.clone()));
    tokio::spawn(resolved_feed(pool.clone(), tx));

    let mut state = DashboardState::new();
    println!("{}", dashboard::summary_line(&state));

    while let Some(event) = rx.recv().await {
        state = dashboard::apply(state, event);
        println!("{}", dashboard::summary_line(&state));
    }

    Ok(())
}

async fn reports_feed(pool: PgPool, tx: mpsc::Sender<DashboardEvent>) {
    if let Err(err) = subscribe_reports(&pool, &tx).await {
        surface_failure(&tx, err).await;
    }
}

async fn users_feed(pool: PgPool, tx: mpsc::Sender<DashboardEvent>) {
    if let Err(err) = subscribe_users(&pool, &tx).await {
        surface_failure(&tx, err).await;
    }
}

async fn resolved_feed(pool: PgPool, tx: mpsc::Sender<DashboardEvent>) {
    if let Err(err) = subscribe_resolved(&pool, &tx).await {
        surface_failure(&tx, err).await;
    }
}

/// A failed subscription ends its task; the failure is surfaced once and is
/// terminal until the operator restarts the watch. No retries.
async fn surface_failure(tx: &mpsc::Sender<DashboardEvent>, err: StoreError) {
    tracing::warn!(error = %err, "subscription ended");
    let _ = tx
        .send(DashboardEvent::StoreFailed {
            kind: err.kind(),
            message: err.to_string(),
        })
        .await;
}

async fn subscribe_reports(
    pool: &PgPool,
    tx: &mpsc::Sender<DashboardEvent>,
) -> Result<(), StoreError> {
    let mut listener = listen(pool, "reports_changed", "reports").await?;

    loop {
        let reports = db::fetch_reports(pool)
            .await
            .map_err(|source| StoreError::Subscription {
                collection: "reports",
                source,
            })?;
        if tx
            .send(DashboardEvent::ReportsSnapshot(reports))
            .await
            .is_err()
        {
            // Consumer gone; dropping the listener releases the channel.
            return Ok(());
        }
        recv(&mut listener, "reports").await?;
    }
}

async fn subscribe_users(
    pool: &PgPool,
    tx: &mpsc::Sender<DashboardEvent>,
) -> Result<(), StoreError> {
    let mut listener = listen(pool, "users_changed", "users").await?;

    loop {
        let count = db::count_users(pool)
            .await
            .map_err(|source| StoreError::Subscription {
                collection: "users",
                source,
            })?;
        if tx.send(DashboardEvent::UserCount(count)).await.is_err() {
            return Ok(());
        }
        recv(&mut listener, "users").await?;
    }
}

/// Same change feed as the full reports subscription, but the count is
/// filtered server-side to status = 'resolved'.
async fn subscribe_resolved(
    pool: &PgPool,
    tx: &mpsc::Sender<DashboardEvent>,
) -> Result<(), StoreError> {
    let mut listener = listen(pool, "reports_changed", "resolved reports").await?;

    loop {
        let count =
            db::count_resolved_reports(pool)
                .await
                .map_err(|source| StoreError::Subscription {
                    collection: "resolved reports",
                    source,
                })?;
        if tx.send(DashboardEvent::ResolvedCount(count)).await.is_err() {
            return Ok(());
        }
        recv(&mut listener, "resolved reports").await?;
    }
}

async fn listen(
    pool: &PgPool,
    channel: &str,
    collection: &'static str,
) -> Result<PgListener, StoreError> {
    let mut listener =
        PgListener::connect_with(pool)
            .await
            .map_err(|source| StoreError::Subscription { collection, source })?;
    listener
        .listen(channel)
        .await
        .map_err(|source| StoreError::Subscription { collection, source })?;

    tracing::info!(collection, channel, "subscription open");
    Ok(listener)
}

async fn recv(listener: &mut PgListener, collection: &'static str) -> Result<(), StoreError> {
    listener
        .recv()
        .await
        .map_err(|source| StoreError::Subscription { collection, source })?;
    tracing::debug!(collection, "change notification received");
    Ok(())
}
