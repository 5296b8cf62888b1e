//! Repository over the server-side reconciliation mirror.

use crate::domain::Decimal;
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;

/// Mirrored investment position row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorPosition {
    pub property_id: i64,
    pub brx_invested: Decimal,
    pub tokens_owned: Decimal,
}

/// Mirrored transaction row, keyed by the event's idempotency key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorTransaction {
    pub event_key: String,
    pub user_address: String,
    pub tx_type: String,
    pub amount: Decimal,
    pub property_id: Option<i64>,
    pub status: String,
    pub created_at_ms: i64,
}

/// Raw event journal row. Append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub event_key: String,
    pub event_type: String,
    pub user_address: String,
    pub transaction_hash: Option<String>,
    pub block_number: i64,
    pub chain_id: i64,
    pub contract_address: String,
    pub event_data: String,
    pub processed_at_ms: i64,
}

/// Repository for mirror database operations.
pub struct MirrorRepository {
    pool: SqlitePool,
}

fn parse_decimal(raw: &str, context: &str) -> Decimal {
    Decimal::from_str(raw).unwrap_or_else(|e| {
        warn!(
            value = %raw,
            context = %context,
            error = %e,
            "Failed to parse stored decimal, using zero"
        );
        Decimal::zero()
    })
}

impl MirrorRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        MirrorRepository { pool }
    }

    // =========================================================================
    // Balance operations
    // =========================================================================

    /// Last-write upsert of a user's mirrored BRX balance.
    pub async fn set_balance(
        &self,
        user: &str,
        balance: Decimal,
        at_ms: i64,
    ) -> Result<(), sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        set_balance_in_tx(&mut *conn, user, balance, at_ms).await
    }

    /// Mirrored balance, or None when the user has never been reconciled.
    pub async fn get_balance(&self, user: &str) -> Result<Option<Decimal>, sqlx::Error> {
        let row = sqlx::query("SELECT brx_balance FROM mirror_balances WHERE user_address = ?")
            .bind(user)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| {
            let raw: String = r.get("brx_balance");
            parse_decimal(&raw, "mirror_balances.brx_balance")
        }))
    }

    // =========================================================================
    // Position operations
    // =========================================================================

    /// Last-write upsert of a mirrored position's `brx_invested`.
    ///
    /// `tokens_owned` is only replaced when the event supplied a token
    /// amount; otherwise the stored value is preserved.
    pub async fn upsert_position(
        &self,
        user: &str,
        property_id: i64,
        brx_invested: Decimal,
        tokens_owned: Option<Decimal>,
        at_ms: i64,
    ) -> Result<(), sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        upsert_position_in_tx(&mut *conn, user, property_id, brx_invested, tokens_owned, at_ms).await
    }

    /// One mirrored position, or None when never reconciled.
    pub async fn get_position(
        &self,
        user: &str,
        property_id: i64,
    ) -> Result<Option<MirrorPosition>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT property_id, brx_invested, tokens_owned
            FROM mirror_positions
            WHERE user_address = ? AND property_id = ?
            "#,
        )
        .bind(user)
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_position))
    }

    /// All mirrored positions for a user, ordered by property id.
    pub async fn get_positions(&self, user: &str) -> Result<Vec<MirrorPosition>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT property_id, brx_invested, tokens_owned
            FROM mirror_positions
            WHERE user_address = ?
            ORDER BY property_id ASC
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_position).collect())
    }

    // =========================================================================
    // Event application (guard + mutation in one transaction)
    // =========================================================================

    /// Apply a token exchange atomically with its replay guard.
    ///
    /// The event-keyed transaction record and the balance write commit in
    /// one write-locked transaction: a storage failure rolls both back,
    /// leaving redelivery free to retry. `BEGIN IMMEDIATE` takes SQLite's
    /// write lock before the guard read, so concurrent deliveries of the
    /// same event serialize and exactly one applies. Returns false when
    /// the event key was already recorded.
    pub async fn apply_token_exchange(
        &self,
        event_key: &str,
        user: &str,
        brx_amount: Decimal,
        at_ms: i64,
    ) -> Result<bool, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result = token_exchange_in_tx(&mut *conn, event_key, user, brx_amount, at_ms).await;
        commit_or_rollback(&mut *conn, result).await
    }

    /// Apply a property investment atomically with its replay guard.
    ///
    /// Same transaction discipline as [`Self::apply_token_exchange`].
    /// Returns false when the event key was already recorded.
    pub async fn apply_property_investment(
        &self,
        event_key: &str,
        user: &str,
        property_id: i64,
        brx_invested: Decimal,
        tokens_owned: Option<Decimal>,
        at_ms: i64,
    ) -> Result<bool, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result = investment_in_tx(
            &mut *conn,
            event_key,
            user,
            property_id,
            brx_invested,
            tokens_owned,
            at_ms,
        )
        .await;
        commit_or_rollback(&mut *conn, result).await
    }

    /// Apply a property withdrawal atomically with its replay guard.
    ///
    /// Holding the write lock across the read-compute-write also closes
    /// the lost-update window between overlapping decrements. Returns the
    /// remaining `brx_invested`, or None when the event key was already
    /// recorded.
    pub async fn apply_property_withdrawal(
        &self,
        event_key: &str,
        user: &str,
        property_id: i64,
        brx_amount: Decimal,
        token_amount: Option<Decimal>,
        at_ms: i64,
    ) -> Result<Option<Decimal>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result = withdrawal_in_tx(
            &mut *conn,
            event_key,
            user,
            property_id,
            brx_amount,
            token_amount,
            at_ms,
        )
        .await;
        commit_or_rollback(&mut *conn, result).await
    }

    // =========================================================================
    // Transaction + journal operations
    // =========================================================================

    /// Record a reconciled transaction idempotently.
    ///
    /// Returns false when a row for `event_key` already exists.
    pub async fn record_transaction(
        &self,
        event_key: &str,
        user: &str,
        tx_type: &str,
        amount: Decimal,
        property_id: Option<i64>,
        at_ms: i64,
    ) -> Result<bool, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        record_transaction_in_tx(&mut *conn, event_key, user, tx_type, amount, property_id, at_ms)
            .await
    }

    /// Mirrored transactions for a user, newest first.
    pub async fn get_transactions(
        &self,
        user: &str,
    ) -> Result<Vec<MirrorTransaction>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT event_key, user_address, tx_type, amount, property_id, status, created_at_ms
            FROM mirror_transactions
            WHERE user_address = ?
            ORDER BY created_at_ms DESC, id DESC
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let amount_raw: String = row.get("amount");
                MirrorTransaction {
                    event_key: row.get("event_key"),
                    user_address: row.get("user_address"),
                    tx_type: row.get("tx_type"),
                    amount: parse_decimal(&amount_raw, "mirror_transactions.amount"),
                    property_id: row.get("property_id"),
                    status: row.get("status"),
                    created_at_ms: row.get("created_at_ms"),
                }
            })
            .collect())
    }

    /// Append a raw event to the journal.
    pub async fn insert_journal_entry(&self, entry: &JournalEntry) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO event_journal
                (event_key, event_type, user_address, transaction_hash, block_number,
                 chain_id, contract_address, event_data, processed_at_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.event_key)
        .bind(&entry.event_type)
        .bind(&entry.user_address)
        .bind(entry.transaction_hash.as_deref())
        .bind(entry.block_number)
        .bind(entry.chain_id)
        .bind(&entry.contract_address)
        .bind(&entry.event_data)
        .bind(entry.processed_at_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Journal rows for a user, oldest first.
    pub async fn get_journal_entries(&self, user: &str) -> Result<Vec<JournalEntry>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT event_key, event_type, user_address, transaction_hash, block_number,
                   chain_id, contract_address, event_data, processed_at_ms
            FROM event_journal
            WHERE user_address = ?
            ORDER BY processed_at_ms ASC, id ASC
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| JournalEntry {
                event_key: row.get("event_key"),
                event_type: row.get("event_type"),
                user_address: row.get("user_address"),
                transaction_hash: row.get("transaction_hash"),
                block_number: row.get("block_number"),
                chain_id: row.get("chain_id"),
                contract_address: row.get("contract_address"),
                event_data: row.get("event_data"),
                processed_at_ms: row.get("processed_at_ms"),
            })
            .collect())
    }
}

async fn commit_or_rollback<T>(
    conn: &mut SqliteConnection,
    result: Result<T, sqlx::Error>,
) -> Result<T, sqlx::Error> {
    match result {
        Ok(value) => {
            sqlx::query("COMMIT").execute(&mut *conn).await?;
            Ok(value)
        }
        Err(e) => {
            let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
            Err(e)
        }
    }
}

async fn token_exchange_in_tx(
    conn: &mut SqliteConnection,
    event_key: &str,
    user: &str,
    brx_amount: Decimal,
    at_ms: i64,
) -> Result<bool, sqlx::Error> {
    let fresh = record_transaction_in_tx(
        &mut *conn,
        event_key,
        user,
        "token_purchase",
        brx_amount,
        None,
        at_ms,
    )
    .await?;
    if fresh {
        set_balance_in_tx(&mut *conn, user, brx_amount, at_ms).await?;
    }
    Ok(fresh)
}

async fn investment_in_tx(
    conn: &mut SqliteConnection,
    event_key: &str,
    user: &str,
    property_id: i64,
    brx_invested: Decimal,
    tokens_owned: Option<Decimal>,
    at_ms: i64,
) -> Result<bool, sqlx::Error> {
    let fresh = record_transaction_in_tx(
        &mut *conn,
        event_key,
        user,
        "property_investment",
        brx_invested,
        Some(property_id),
        at_ms,
    )
    .await?;
    if fresh {
        upsert_position_in_tx(&mut *conn, user, property_id, brx_invested, tokens_owned, at_ms)
            .await?;
    }
    Ok(fresh)
}

async fn withdrawal_in_tx(
    conn: &mut SqliteConnection,
    event_key: &str,
    user: &str,
    property_id: i64,
    brx_amount: Decimal,
    token_amount: Option<Decimal>,
    at_ms: i64,
) -> Result<Option<Decimal>, sqlx::Error> {
    let fresh = record_transaction_in_tx(
        &mut *conn,
        event_key,
        user,
        "property_withdrawal",
        brx_amount,
        Some(property_id),
        at_ms,
    )
    .await?;
    if !fresh {
        return Ok(None);
    }
    let remaining =
        decrement_in_tx(&mut *conn, user, property_id, brx_amount, token_amount, at_ms).await?;
    Ok(Some(remaining))
}

async fn set_balance_in_tx(
    conn: &mut SqliteConnection,
    user: &str,
    balance: Decimal,
    at_ms: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO mirror_balances (user_address, brx_balance, updated_at_ms)
        VALUES (?, ?, ?)
        ON CONFLICT(user_address) DO UPDATE SET
            brx_balance = excluded.brx_balance,
            updated_at_ms = excluded.updated_at_ms
        "#,
    )
    .bind(user)
    .bind(balance.to_canonical_string())
    .bind(at_ms)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn upsert_position_in_tx(
    conn: &mut SqliteConnection,
    user: &str,
    property_id: i64,
    brx_invested: Decimal,
    tokens_owned: Option<Decimal>,
    at_ms: i64,
) -> Result<(), sqlx::Error> {
    let tokens = tokens_owned.map(|t| t.to_canonical_string());

    sqlx::query(
        r#"
        INSERT INTO mirror_positions
            (user_address, property_id, brx_invested, tokens_owned, updated_at_ms)
        VALUES (?, ?, ?, COALESCE(?, '0'), ?)
        ON CONFLICT(user_address, property_id) DO UPDATE SET
            brx_invested = excluded.brx_invested,
            tokens_owned = COALESCE(?, mirror_positions.tokens_owned),
            updated_at_ms = excluded.updated_at_ms
        "#,
    )
    .bind(user)
    .bind(property_id)
    .bind(brx_invested.to_canonical_string())
    .bind(tokens.clone())
    .bind(at_ms)
    .bind(tokens)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn record_transaction_in_tx(
    conn: &mut SqliteConnection,
    event_key: &str,
    user: &str,
    tx_type: &str,
    amount: Decimal,
    property_id: Option<i64>,
    at_ms: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO mirror_transactions
            (event_key, user_address, tx_type, amount, property_id, status, created_at_ms)
        VALUES (?, ?, ?, ?, ?, 'completed', ?)
        ON CONFLICT(event_key) DO NOTHING
        "#,
    )
    .bind(event_key)
    .bind(user)
    .bind(tx_type)
    .bind(amount.to_canonical_string())
    .bind(property_id)
    .bind(at_ms)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

fn row_to_position(row: sqlx::sqlite::SqliteRow) -> MirrorPosition {
    let invested_raw: String = row.get("brx_invested");
    let tokens_raw: String = row.get("tokens_owned");
    MirrorPosition {
        property_id: row.get("property_id"),
        brx_invested: parse_decimal(&invested_raw, "mirror_positions.brx_invested"),
        tokens_owned: parse_decimal(&tokens_raw, "mirror_positions.tokens_owned"),
    }
}

async fn decrement_in_tx(
    conn: &mut SqliteConnection,
    user: &str,
    property_id: i64,
    brx_amount: Decimal,
    token_amount: Option<Decimal>,
    at_ms: i64,
) -> Result<Decimal, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT brx_invested, tokens_owned
        FROM mirror_positions
        WHERE user_address = ? AND property_id = ?
        "#,
    )
    .bind(user)
    .bind(property_id)
    .fetch_optional(&mut *conn)
    .await?;

    let (current_invested, current_tokens) = match row {
        Some(r) => {
            let invested_raw: String = r.get("brx_invested");
            let tokens_raw: String = r.get("tokens_owned");
            (
                parse_decimal(&invested_raw, "mirror_positions.brx_invested"),
                parse_decimal(&tokens_raw, "mirror_positions.tokens_owned"),
            )
        }
        None => (Decimal::zero(), Decimal::zero()),
    };

    let remaining_invested = (current_invested - brx_amount).clamp_at_zero();
    let remaining_tokens = match token_amount {
        Some(t) => (current_tokens - t).clamp_at_zero(),
        None => current_tokens,
    };

    sqlx::query(
        r#"
        INSERT INTO mirror_positions
            (user_address, property_id, brx_invested, tokens_owned, updated_at_ms)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(user_address, property_id) DO UPDATE SET
            brx_invested = excluded.brx_invested,
            tokens_owned = excluded.tokens_owned,
            updated_at_ms = excluded.updated_at_ms
        "#,
    )
    .bind(user)
    .bind(property_id)
    .bind(remaining_invested.to_canonical_string())
    .bind(remaining_tokens.to_canonical_string())
    .bind(at_ms)
    .execute(&mut *conn)
    .await?;

    Ok(remaining_invested)
}
