//! Signature and contract snapshot queries (insert-only)

use shared::models::{ContractSnapshot, Signature};
use sqlx::{SqliteConnection, SqliteExecutor};

pub async fn insert_signature(
    conn: &mut SqliteConnection,
    s: &Signature,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO signatures (id, estimate_id, signer_name, ip_address, signed_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(s.id)
    .bind(s.estimate_id)
    .bind(&s.signer_name)
    .bind(&s.ip_address)
    .bind(s.signed_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn insert_contract(
    conn: &mut SqliteConnection,
    c: &ContractSnapshot,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO contract_snapshots (id, estimate_id, content, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(c.id)
    .bind(c.estimate_id)
    .bind(&c.content)
    .bind(c.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_signature(
    executor: impl SqliteExecutor<'_>,
    id: i64,
) -> Result<Option<Signature>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, estimate_id, signer_name, ip_address, signed_at FROM signatures WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn find_contract(
    executor: impl SqliteExecutor<'_>,
    id: i64,
) -> Result<Option<ContractSnapshot>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, estimate_id, content, created_at FROM contract_snapshots WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}
