//! Customer queries

use shared::models::{Customer, ListQuery};
use sqlx::{SqliteExecutor, SqlitePool};

const SELECT: &str = "SELECT id, org_id, name, email, phone, address, city, state, zip_code, notes, stripe_customer_id, created_at, updated_at FROM customers";

pub async fn insert(pool: &SqlitePool, c: &Customer) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO customers (id, org_id, name, email, phone, address, city, state, zip_code, notes, stripe_customer_id, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(c.id)
    .bind(c.org_id)
    .bind(&c.name)
    .bind(&c.email)
    .bind(&c.phone)
    .bind(&c.address)
    .bind(&c.city)
    .bind(&c.state)
    .bind(&c.zip_code)
    .bind(&c.notes)
    .bind(&c.stripe_customer_id)
    .bind(c.created_at)
    .bind(c.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(
    executor: impl SqliteExecutor<'_>,
    id: i64,
) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Page of customers in an organization, filtered by name or email.
/// Returns the page and the total match count.
pub async fn list(pool: &SqlitePool, q: &ListQuery) -> Result<(Vec<Customer>, i64), sqlx::Error> {
    let pattern = q.like_pattern();
    let filter = "WHERE org_id = ?1 AND (?2 IS NULL OR lower(name) LIKE ?2 ESCAPE '\\' OR lower(coalesce(email, '')) LIKE ?2 ESCAPE '\\')";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM customers {filter}"))
        .bind(q.org_id)
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as(&format!(
        "{SELECT} {filter} ORDER BY name COLLATE NOCASE, id LIMIT ?3 OFFSET ?4"
    ))
    .bind(q.org_id)
    .bind(&pattern)
    .bind(i64::from(q.limit()))
    .bind(q.offset())
    .fetch_all(pool)
    .await?;

    Ok((rows, total))
}

/// Write every mutable column of `c`. Returns `false` when the row is gone.
pub async fn update(pool: &SqlitePool, c: &Customer) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE customers SET name = ?, email = ?, phone = ?, address = ?, city = ?, state = ?, zip_code = ?, notes = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&c.name)
    .bind(&c.email)
    .bind(&c.phone)
    .bind(&c.address)
    .bind(&c.city)
    .bind(&c.state)
    .bind(&c.zip_code)
    .bind(&c.notes)
    .bind(c.updated_at)
    .bind(c.id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Mirror the remote customer id, only while the organization is still
/// linked to `account`.
pub async fn set_stripe_customer(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    account: &str,
    stripe_customer_id: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE customers SET stripe_customer_id = ?1, updated_at = ?2
         WHERE id = ?3
           AND EXISTS (SELECT 1 FROM organizations o WHERE o.id = customers.org_id AND o.stripe_account_id = ?4)",
    )
    .bind(stripe_customer_id)
    .bind(now)
    .bind(id)
    .bind(account)
    .execute(executor)
    .await?;
    Ok(())
}

/// Drop the remote customer ids of an organization unless it is already
/// linked to `account`. Returns the number of customers reset.
pub async fn reset_stripe_customers(
    executor: impl SqliteExecutor<'_>,
    org_id: i64,
    account: &str,
    now: i64,
) -> Result<u64, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE customers SET stripe_customer_id = NULL, updated_at = ?1
         WHERE org_id = ?2 AND stripe_customer_id IS NOT NULL
           AND EXISTS (SELECT 1 FROM organizations WHERE id = ?2 AND stripe_account_id IS NOT ?3)",
    )
    .bind(now)
    .bind(org_id)
    .bind(account)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected())
}

/// Number of estimates and invoices referencing the customer
pub async fn document_counts(pool: &SqlitePool, id: i64) -> Result<(i64, i64), sqlx::Error> {
    sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM estimates WHERE customer_id = ?1),
                (SELECT COUNT(*) FROM invoices WHERE customer_id = ?1)",
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("DELETE FROM customers WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
