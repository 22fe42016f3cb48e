//! Customer directory

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Customer, CustomerCreate, CustomerUpdate, ListQuery, PaginatedResponse};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

use super::{normalize, page, require_text};
use crate::db;
use crate::error::ServiceResult;

fn validate_email(email: Option<String>) -> AppResult<Option<String>> {
    match normalize(email) {
        Some(email) if !email.contains('@') => Err(AppError::with_message(
            ErrorCode::InvalidFormat,
            "email must contain '@'",
        )
        .with_detail("field", "email")),
        other => Ok(other),
    }
}

pub async fn create(pool: &SqlitePool, req: CustomerCreate) -> ServiceResult<Customer> {
    if db::organizations::find_by_id(pool, req.org_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::OrganizationNotFound).into());
    }

    let now = now_millis();
    let customer = Customer {
        id: snowflake_id(),
        org_id: req.org_id,
        name: require_text(&req.name, "name")?,
        email: validate_email(req.email)?,
        phone: normalize(req.phone),
        address: normalize(req.address),
        city: normalize(req.city),
        state: normalize(req.state),
        zip_code: normalize(req.zip_code),
        notes: normalize(req.notes),
        stripe_customer_id: None,
        created_at: now,
        updated_at: now,
    };
    db::customers::insert(pool, &customer).await?;
    Ok(customer)
}

pub async fn get(pool: &SqlitePool, id: i64) -> ServiceResult<Customer> {
    Ok(db::customers::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))?)
}

pub async fn list(pool: &SqlitePool, q: &ListQuery) -> ServiceResult<PaginatedResponse<Customer>> {
    let (rows, total) = db::customers::list(pool, q).await?;
    Ok(page(rows, total, q))
}

/// Apply the supplied fields; absent fields keep their value.
pub async fn update(pool: &SqlitePool, id: i64, req: CustomerUpdate) -> ServiceResult<Customer> {
    let mut customer = get(pool, id).await?;

    if let Some(name) = req.name {
        customer.name = require_text(&name, "name")?;
    }
    if req.email.is_some() {
        customer.email = validate_email(req.email)?;
    }
    if req.phone.is_some() {
        customer.phone = normalize(req.phone);
    }
    if req.address.is_some() {
        customer.address = normalize(req.address);
    }
    if req.city.is_some() {
        customer.city = normalize(req.city);
    }
    if req.state.is_some() {
        customer.state = normalize(req.state);
    }
    if req.zip_code.is_some() {
        customer.zip_code = normalize(req.zip_code);
    }
    if req.notes.is_some() {
        customer.notes = normalize(req.notes);
    }
    customer.updated_at = now_millis();

    if !db::customers::update(pool, &customer).await? {
        return Err(AppError::new(ErrorCode::CustomerNotFound).into());
    }
    Ok(customer)
}

/// Delete a customer that no estimate or invoice references.
pub async fn delete(pool: &SqlitePool, id: i64) -> ServiceResult<()> {
    let (estimates, invoices) = db::customers::document_counts(pool, id).await?;
    if estimates > 0 {
        return Err(AppError::new(ErrorCode::CustomerHasEstimates)
            .with_detail("estimates", estimates)
            .into());
    }
    if invoices > 0 {
        return Err(AppError::new(ErrorCode::CustomerHasInvoices)
            .with_detail("invoices", invoices)
            .into());
    }
    if !db::customers::delete(pool, id).await? {
        return Err(AppError::new(ErrorCode::CustomerNotFound).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, test_pool};

    fn new_customer(org_id: i64, name: &str, email: Option<&str>) -> CustomerCreate {
        CustomerCreate {
            org_id,
            name: name.into(),
            email: email.map(String::from),
            phone: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_validates_email() {
        let pool = test_pool().await;
        let org = test_support::seed_org(&pool, None).await;

        let err = create(&pool, new_customer(org.id, "Ana", Some("ana.example.com")))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidFormat);

        let err = create(&pool, new_customer(org.id, "  ", None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::RequiredField);

        let c = create(&pool, new_customer(org.id, "Ana", Some(" ana@example.com ")))
            .await
            .unwrap();
        assert_eq!(c.email.as_deref(), Some("ana@example.com"));
    }

    #[tokio::test]
    async fn test_create_requires_org() {
        let pool = test_pool().await;
        let err = create(&pool, new_customer(999, "Ana", None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::OrganizationNotFound);
    }

    #[tokio::test]
    async fn test_list_search_and_paging() {
        let pool = test_pool().await;
        let org = test_support::seed_org(&pool, None).await;
        for name in ["Alice Silva", "Bruno Costa", "Carla Silva"] {
            create(&pool, new_customer(org.id, name, None)).await.unwrap();
        }

        let q = ListQuery {
            org_id: org.id,
            search: Some("silva".into()),
            page: None,
            limit: None,
        };
        let page = list(&pool, &q).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.data[0].name, "Alice Silva");

        let q = ListQuery {
            org_id: org.id,
            search: None,
            page: Some(2),
            limit: Some(2),
        };
        let page = list(&pool, &q).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].name, "Carla Silva");
    }

    #[tokio::test]
    async fn test_search_wildcards_match_literally() {
        let pool = test_pool().await;
        let org = test_support::seed_org(&pool, None).await;
        for (name, email) in [
            ("Ana", "ana@example.com"),
            ("Beto", "beto_costa@example.com"),
            ("Caio 100%", "caio@example.com"),
        ] {
            create(&pool, new_customer(org.id, name, Some(email)))
                .await
                .unwrap();
        }

        let search = |text: &str| ListQuery {
            org_id: org.id,
            search: Some(text.into()),
            page: None,
            limit: None,
        };
        let page = list(&pool, &search("_")).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].name, "Beto");

        let page = list(&pool, &search("%")).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].name, "Caio 100%");
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let pool = test_pool().await;
        let org = test_support::seed_org(&pool, None).await;
        let c = create(&pool, new_customer(org.id, "Ana", Some("ana@example.com")))
            .await
            .unwrap();

        let updated = update(
            &pool,
            c.id,
            CustomerUpdate {
                city: Some("Lisboa".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.city.as_deref(), Some("Lisboa"));
        assert_eq!(updated.email.as_deref(), Some("ana@example.com"));
    }

    #[tokio::test]
    async fn test_delete_guarded_by_estimates() {
        let pool = test_pool().await;
        let org = test_support::seed_org(&pool, None).await;
        let customer = test_support::seed_customer(&pool, org.id).await;
        test_support::seed_estimate(&pool, org.id, customer.id, 10_000).await;

        let err = delete(&pool, customer.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CustomerHasEstimates);

        let lonely = test_support::seed_customer(&pool, org.id).await;
        delete(&pool, lonely.id).await.unwrap();
        let err = get(&pool, lonely.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CustomerNotFound);
    }
}
