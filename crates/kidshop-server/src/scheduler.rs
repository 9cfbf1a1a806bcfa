//! Background jobs.
//!
//! The only job mirrors Steadfast delivery statuses onto orders that have a
//! consignment but no final courier status. It is registered only when
//! `KIDSHOP_COURIER_SYNC_CRON` is set.

use std::sync::Arc;

use chrono::Utc;
use kidshop_courier::SteadfastClient;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the scheduler. The returned handle must be kept alive;
/// dropping it stops every job.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot start or the cron
/// expression is invalid.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<kidshop_core::AppConfig>,
    courier: SteadfastClient,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    if let Some(cron) = config.courier_sync_cron.as_deref() {
        register_courier_sync_job(&scheduler, cron, pool, courier).await?;
        tracing::info!(cron, "scheduler: courier status sync registered");
    }

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_courier_sync_job(
    scheduler: &JobScheduler,
    cron: &str,
    pool: PgPool,
    courier: SteadfastClient,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);
    let courier = Arc::new(courier);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let courier = Arc::clone(&courier);

        Box::pin(async move {
            tracing::info!("scheduler: starting courier status sync");
            let synced = sync_courier_statuses(&pool, &courier).await;
            tracing::info!(synced, "scheduler: courier status sync complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Checks every pending consignment once; returns how many statuses were
/// written. Failures are logged per consignment and do not stop the run.
async fn sync_courier_statuses(pool: &PgPool, courier: &SteadfastClient) -> usize {
    let pending = match kidshop_db::list_courier_pending_orders(pool).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to load pending consignments");
            return 0;
        }
    };
    if pending.is_empty() {
        return 0;
    }

    let settings = tokio::try_join!(
        kidshop_db::get_courier_settings(pool),
        kidshop_db::get_general_settings(pool),
    );
    let credentials = match settings {
        Ok((courier_settings, general)) => {
            match kidshop_courier::resolve_credentials(&courier_settings, &general) {
                Ok(credentials) => credentials,
                Err(e) => {
                    tracing::warn!(error = %e, "scheduler: skipping courier sync");
                    return 0;
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to load settings");
            return 0;
        }
    };

    let mut synced = 0;
    for consignment_id in &pending {
        let outcome = match courier
            .status_by_consignment(&credentials, consignment_id)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    consignment_id = %consignment_id,
                    error = %e,
                    "scheduler: status check failed"
                );
                continue;
            }
        };
        let Some(status) = outcome.delivery_status else {
            continue;
        };
        match kidshop_db::mark_courier_status(pool, consignment_id, &status, Utc::now()).await {
            Ok(_) => synced += 1,
            Err(e) => {
                tracing::error!(
                    consignment_id = %consignment_id,
                    error = %e,
                    "scheduler: failed to store status"
                );
            }
        }
    }
    synced
}

#[cfg(test)]
mod tests {
    use kidshop_core::{CourierProvider, CourierSettings};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn seed_consignment(
        pool: &PgPool,
        order_number: &str,
        consignment: &str,
        status: Option<&str>,
    ) {
        sqlx::query(
            "INSERT INTO orders (order_number, customer_name, consignment_id, courier_status) \
             VALUES ($1, 'Rina', $2, $3)",
        )
        .bind(order_number)
        .bind(consignment)
        .bind(status)
        .execute(pool)
        .await
        .expect("seed order");
    }

    async fn courier_status(pool: &PgPool, order_number: &str) -> Option<String> {
        sqlx::query_scalar("SELECT courier_status FROM orders WHERE order_number = $1")
            .bind(order_number)
            .fetch_one(pool)
            .await
            .expect("courier_status")
    }

    async fn mock_status(
        server: &MockServer,
        consignment: &str,
        response: ResponseTemplate,
        calls: u64,
    ) {
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/status_by_cid/{consignment}")))
            .respond_with(response)
            .expect(calls)
            .mount(server)
            .await;
    }

    fn delivered(status: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "delivery_status": status
        }))
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn sync_skips_final_statuses_and_survives_failures(pool: PgPool) {
        let server = MockServer::start().await;
        kidshop_db::save_courier_settings(
            &pool,
            &CourierSettings {
                providers: vec![CourierProvider {
                    id: "steadfast".to_string(),
                    name: "Steadfast Courier".to_string(),
                    base_url: Some(format!("{}/api/v1", server.uri())),
                    api_key: "key".to_string(),
                    secret_key: "secret".to_string(),
                    is_active: true,
                    is_default: true,
                }],
            },
        )
        .await
        .expect("save courier settings");

        seed_consignment(&pool, "ORD-1", "101", Some("sent_to_courier")).await;
        seed_consignment(&pool, "ORD-2", "102", Some("in_review")).await;
        seed_consignment(&pool, "ORD-3", "103", Some("delivered")).await;
        seed_consignment(&pool, "ORD-4", "104", None).await;

        mock_status(&server, "101", delivered("delivered"), 1).await;
        mock_status(&server, "102", ResponseTemplate::new(500), 1).await;
        mock_status(&server, "103", delivered("cancelled"), 0).await;
        mock_status(&server, "104", delivered("pending"), 1).await;

        let courier = SteadfastClient::new(5).expect("client");
        let synced = sync_courier_statuses(&pool, &courier).await;

        assert_eq!(synced, 2);
        assert_eq!(courier_status(&pool, "ORD-1").await.as_deref(), Some("delivered"));
        assert_eq!(courier_status(&pool, "ORD-2").await.as_deref(), Some("in_review"));
        assert_eq!(courier_status(&pool, "ORD-3").await.as_deref(), Some("delivered"));
        assert_eq!(courier_status(&pool, "ORD-4").await.as_deref(), Some("pending"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn sync_without_credentials_writes_nothing(pool: PgPool) {
        seed_consignment(&pool, "ORD-1", "101", None).await;

        let courier = SteadfastClient::new(5).expect("client");
        assert_eq!(sync_courier_statuses(&pool, &courier).await, 0);
        assert_eq!(courier_status(&pool, "ORD-1").await, None);
    }
}
