use super::error::{is_table_exists, StoreError, StoreResult};
use super::model::{PageParams, Subscriber};
use crate::translate::{epoch_from_timestamp, timestamp_from_epoch};
use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info, instrument};

pub type Pool = SqlitePool;

const CREATE_SUBSCRIBERS: &str = "CREATE TABLE subscribers (
    id           INTEGER PRIMARY KEY,
    address      TEXT NOT NULL UNIQUE,
    confirmed_at INTEGER NOT NULL DEFAULT 0,
    opt_out      INTEGER NOT NULL DEFAULT 0
)";

pub async fn init_pool(database_url: &str, max_connections: u32) -> StoreResult<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    // WAL with full durability; sqlx's busy timeout covers writer contention.
    let options = SqliteConnectOptions::from_str(&normalized)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Full);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// If using a file-backed SQLite URL, expand a leading `~/` and ensure the parent
/// directory exists. Leaves in-memory URLs untouched. Returns possibly-updated URL.
pub(crate) fn prepare_sqlite_url(url: &str) -> String {
    if !url.starts_with("sqlite:") || url.starts_with("sqlite::memory") {
        return url.to_string();
    }

    let rest = &url["sqlite:".len()..];
    let path_with_query = rest.strip_prefix("//").unwrap_or(rest);

    let (path_part, query_part) = match path_with_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_with_query, None),
    };

    if path_part.is_empty() {
        return url.to_string();
    }

    let expanded_path = match (path_part.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
        _ => path_part.to_string(),
    };

    if let Some(parent) = std::path::Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let mut rebuilt = String::from("sqlite://");
    rebuilt.push_str(&expanded_path);
    if let Some(q) = query_part {
        rebuilt.push('?');
        rebuilt.push_str(q);
    }
    rebuilt
}

/// Create the `subscribers` table. Re-running against an existing table is a
/// no-op; every other failure is returned to the caller.
#[instrument(skip_all)]
pub async fn ensure_schema(pool: &Pool) -> StoreResult<()> {
    match sqlx::query(CREATE_SUBSCRIBERS).execute(pool).await {
        Ok(_) => {
            info!("created subscribers table");
            Ok(())
        }
        Err(err) if is_table_exists(&err) => {
            debug!("subscribers table already present");
            Ok(())
        }
        Err(err) => Err(StoreError::Storage(err)),
    }
}

fn subscriber_from_row(row: &SqliteRow) -> StoreResult<Subscriber> {
    let confirmed_at: i64 = row.try_get("confirmed_at")?;
    Ok(Subscriber {
        id: row.try_get("id")?,
        address: row.try_get("address")?,
        confirmed_at: timestamp_from_epoch(confirmed_at),
        opt_out: row.try_get("opt_out")?,
    })
}

/// Insert a new subscriber with an epoch-zero confirmation time and opt-out
/// cleared. Returns the generated id.
#[instrument(skip_all)]
pub async fn create_subscriber(pool: &Pool, address: &str) -> StoreResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO subscribers (address, confirmed_at, opt_out) VALUES (?, 0, 0) RETURNING id",
    )
    .bind(address)
    .fetch_one(pool)
    .await
    .map_err(|err| StoreError::from_insert(err, address))?;
    Ok(id)
}

#[instrument(skip_all)]
pub async fn get_subscriber(pool: &Pool, address: &str) -> StoreResult<Option<Subscriber>> {
    let row = sqlx::query(
        "SELECT id, address, confirmed_at, opt_out FROM subscribers WHERE address = ?",
    )
    .bind(address)
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(subscriber_from_row).transpose()
}

#[instrument(skip_all)]
pub async fn get_subscriber_page(pool: &Pool, params: PageParams) -> StoreResult<Vec<Subscriber>> {
    let rows = sqlx::query(
        "SELECT id, address, confirmed_at, opt_out FROM subscribers \
         ORDER BY id ASC LIMIT ? OFFSET ?",
    )
    .bind(params.count)
    .bind(params.offset())
    .fetch_all(pool)
    .await?;
    rows.iter().map(subscriber_from_row).collect()
}

/// Overwrite `confirmed_at` and `opt_out` of the subscriber matching
/// `subscriber.address`. The id and address are never changed.
#[instrument(skip_all)]
pub async fn update_subscriber(pool: &Pool, subscriber: &Subscriber) -> StoreResult<()> {
    let res = sqlx::query("UPDATE subscribers SET confirmed_at = ?, opt_out = ? WHERE address = ?")
        .bind(epoch_from_timestamp(&subscriber.confirmed_at))
        .bind(subscriber.opt_out)
        .bind(&subscriber.address)
        .execute(pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(StoreError::NotFound(subscriber.address.clone()));
    }
    Ok(())
}

/// Hard delete. Returns the number of rows removed, zero when nothing matched.
#[instrument(skip_all)]
pub async fn delete_subscriber(pool: &Pool, address: &str) -> StoreResult<u64> {
    let res = sqlx::query("DELETE FROM subscribers WHERE address = ?")
        .bind(address)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Persistence seam handed to the service layer.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    async fn ensure_schema(&self) -> StoreResult<()>;
    async fn create(&self, address: &str) -> StoreResult<i64>;
    async fn get_by_address(&self, address: &str) -> StoreResult<Option<Subscriber>>;
    async fn get_page(&self, params: PageParams) -> StoreResult<Vec<Subscriber>>;
    async fn update(&self, subscriber: &Subscriber) -> StoreResult<()>;
    async fn delete(&self, address: &str) -> StoreResult<u64>;
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: Pool,
}

impl SqliteStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriberStore for SqliteStore {
    async fn ensure_schema(&self) -> StoreResult<()> {
        ensure_schema(&self.pool).await
    }

    async fn create(&self, address: &str) -> StoreResult<i64> {
        create_subscriber(&self.pool, address).await
    }

    async fn get_by_address(&self, address: &str) -> StoreResult<Option<Subscriber>> {
        get_subscriber(&self.pool, address).await
    }

    async fn get_page(&self, params: PageParams) -> StoreResult<Vec<Subscriber>> {
        get_subscriber_page(&self.pool, params).await
    }

    async fn update(&self, subscriber: &Subscriber) -> StoreResult<()> {
        update_subscriber(&self.pool, subscriber).await
    }

    async fn delete(&self, address: &str) -> StoreResult<u64> {
        delete_subscriber(&self.pool, address).await
    }
}
