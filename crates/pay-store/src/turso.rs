//! # Turso Store
//!
//! `PricingStore` over the libSQL HTTP pipeline API. Each call is one
//! pipeline request: the statements run in order on a fresh stream which is
//! closed at the end.

use crate::config::StoreConfig;
use crate::hrana::{PipelineRequest, PipelineResponse, Stmt, StmtResult, StreamResponse, StreamResult, Value};
use async_trait::async_trait;
use pay_core::pricing::{DEFAULT_BASE_PRICE, DEFAULT_DISCOUNT_PERCENTAGE};
use pay_core::{PaymentError, PaymentRecord, PaymentResult, PricingRecord, PricingStore};
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashMap;
use tracing::{debug, error, info, instrument};

const CREATE_PRICING_TABLE: &str = "CREATE TABLE IF NOT EXISTS pricing (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    basePrice REAL NOT NULL,
    discountPercentage REAL NOT NULL,
    lastUpdated INTEGER NOT NULL
)";

const CREATE_PAYMENTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS payments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    fullName TEXT NOT NULL,
    phone TEXT NOT NULL,
    email TEXT NOT NULL,
    paymentId TEXT NOT NULL,
    orderId TEXT,
    amount INTEGER,
    status TEXT NOT NULL,
    date INTEGER NOT NULL
)";

const SEED_PRICING: &str = "INSERT INTO pricing (basePrice, discountPercentage, lastUpdated)
    SELECT ?, ?, ? WHERE NOT EXISTS (SELECT 1 FROM pricing)";

const SELECT_PRICING: &str =
    "SELECT id, basePrice, discountPercentage, lastUpdated FROM pricing ORDER BY id LIMIT 1";

const INSERT_PAYMENT: &str = "INSERT INTO payments
    (fullName, phone, email, paymentId, orderId, amount, status, date)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)";

/// Hosted libSQL store
pub struct TursoStore {
    pipeline_url: String,
    auth_token: Option<String>,
    client: Client,
}

impl TursoStore {
    /// Create a store client; no connection is made until the first call
    pub fn new(config: StoreConfig) -> PaymentResult<Self> {
        let pipeline_url = config.pipeline_url()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            pipeline_url,
            auth_token: config.auth_token,
            client,
        })
    }

    /// Run statements in one pipeline and return one result per statement
    async fn execute(&self, stmts: Vec<Stmt>) -> PaymentResult<Vec<StmtResult>> {
        let expected = stmts.len();
        let mut request = self
            .client
            .post(&self.pipeline_url)
            .json(&PipelineRequest::execute_all(stmts));
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PaymentError::Store(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::Store(format!("reading response: {}", e)))?;

        if !status.is_success() {
            error!("libSQL pipeline error: status={}, body={}", status, body);
            return Err(PaymentError::Store(format!("HTTP {}: {}", status, body)));
        }

        let pipeline: PipelineResponse = serde_json::from_str(&body)
            .map_err(|e| PaymentError::Store(format!("malformed pipeline response: {}", e)))?;

        let mut results = Vec::with_capacity(expected);
        for result in pipeline.results.into_iter().take(expected) {
            match result {
                StreamResult::Ok {
                    response: StreamResponse::Execute { result },
                } => results.push(result),
                StreamResult::Ok { .. } => results.push(StmtResult::default()),
                StreamResult::Error { error } => {
                    return Err(PaymentError::Store(match error.code {
                        Some(code) => format!("{}: {}", code, error.message),
                        None => error.message,
                    }))
                }
            }
        }

        if results.len() != expected {
            return Err(PaymentError::Store(format!(
                "expected {} results, got {}",
                expected,
                results.len()
            )));
        }
        Ok(results)
    }
}

#[async_trait]
impl PricingStore for TursoStore {
    #[instrument(skip(self))]
    async fn ensure_schema(&self) -> PaymentResult<()> {
        let seed = PricingRecord::new(DEFAULT_BASE_PRICE, DEFAULT_DISCOUNT_PERCENTAGE);
        let results = self
            .execute(vec![
                Stmt::new(CREATE_PRICING_TABLE),
                Stmt::new(CREATE_PAYMENTS_TABLE),
                Stmt::new(SEED_PRICING).with_args(vec![
                    Value::float(seed.base_price.to_f64().unwrap_or(0.0)),
                    Value::float(seed.discount_percentage.to_f64().unwrap_or(0.0)),
                    Value::integer(seed.last_updated),
                ]),
            ])
            .await?;

        if results.last().map(|r| r.affected_row_count).unwrap_or(0) > 0 {
            info!("Seeded default pricing: basePrice={}", seed.base_price);
        }
        info!("Store schema ready");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn current_pricing(&self) -> PaymentResult<Option<PricingRecord>> {
        let results = self.execute(vec![Stmt::new(SELECT_PRICING)]).await?;
        let rows = results.first().map(|r| r.named_rows()).unwrap_or_default();

        let Some(row) = rows.first() else {
            debug!("No pricing row");
            return Ok(None);
        };

        pricing_from_row(row).map(Some)
    }

    #[instrument(skip(self, record), fields(payment_id = %record.payment_id))]
    async fn record_payment(&self, record: &PaymentRecord) -> PaymentResult<i64> {
        let amount = match record.amount {
            Some(a) => Value::integer(i64::try_from(a).unwrap_or(i64::MAX)),
            None => Value::Null,
        };
        let results = self
            .execute(vec![Stmt::new(INSERT_PAYMENT).with_args(vec![
                Value::text(&record.full_name),
                Value::text(&record.phone),
                Value::text(&record.email),
                Value::text(&record.payment_id),
                Value::opt_text(record.order_id.as_deref()),
                amount,
                Value::text(record.status.as_str()),
                Value::integer(record.date),
            ])])
            .await?;

        let id = results
            .first()
            .and_then(StmtResult::last_insert_rowid)
            .ok_or_else(|| PaymentError::Store("insert returned no row id".to_string()))?;

        debug!("Recorded payment row {}", id);
        Ok(id)
    }

    fn backend_name(&self) -> &'static str {
        "turso"
    }
}

fn column<'a>(row: &HashMap<&str, &'a Value>, name: &str) -> PaymentResult<&'a Value> {
    row.get(name)
        .copied()
        .ok_or_else(|| PaymentError::Store(format!("pricing row lacks {}", name)))
}

fn pricing_from_row(row: &HashMap<&str, &Value>) -> PaymentResult<PricingRecord> {
    let base_price = column(row, "basePrice")?
        .as_decimal()
        .ok_or_else(|| PaymentError::Store("basePrice is not numeric".to_string()))?;
    if base_price.is_sign_negative() {
        return Err(PaymentError::Store("basePrice is negative".to_string()));
    }

    let discount_percentage = column(row, "discountPercentage")?
        .as_decimal()
        .ok_or_else(|| PaymentError::Store("discountPercentage is not numeric".to_string()))?;

    let mut record = PricingRecord::new(base_price, discount_percentage);
    record.id = column(row, "id")?.as_i64();
    if let Some(ts) = column(row, "lastUpdated")?.as_i64() {
        record.last_updated = ts;
    }
    Ok(record)
}
