//! Router fixtures for HTTP tests.
//!
//! Each test app owns an in-memory SQLite database and a router wired the
//! same way the server wires it.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use chrono::{NaiveDate, Utc};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DatabaseConnection, EntityTrait, Schema};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use steward_api::{AppState, create_router};
use steward_db::entities::{payments, prelude::*, transactions};
use steward_shared::{JwtConfig, JwtService, SecurityConfig};

pub const HOST: &str = "steward.test";
pub const SAME_ORIGIN: &str = "http://steward.test";
pub const TRUSTED_ORIGIN: &str = "https://admin.steward.test";
const SECRET: &str = "test-secret-key-for-testing";

const MONEY_TABLES: [&str; 2] = [
    "CREATE TABLE transactions (
        id BLOB NOT NULL PRIMARY KEY,
        upload_history_id BLOB REFERENCES upload_history (id) ON DELETE SET NULL,
        transaction_date TEXT NOT NULL,
        amount NUMERIC(19, 4) NOT NULL,
        description TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE payments (
        id BLOB NOT NULL PRIMARY KEY,
        upload_history_id BLOB REFERENCES upload_history (id) ON DELETE SET NULL,
        payment_date TEXT NOT NULL,
        amount NUMERIC(19, 4) NOT NULL,
        reference TEXT,
        created_at TEXT NOT NULL
    )",
];

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    jwt: JwtService,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = steward_db::connect_with_pool("sqlite::memory:", 1, 1)
            .await
            .expect("Failed to connect to database");

        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        for stmt in [
            schema.create_table_from_entity(FinancialYears),
            schema.create_table_from_entity(UploadHistory),
        ] {
            db.execute(backend.build(&stmt))
                .await
                .expect("Failed to create table");
        }
        // SQLite builds of sea-query reject decimal precision above 16.
        for sql in MONEY_TABLES {
            db.execute_unprepared(sql)
                .await
                .expect("Failed to create money table");
        }

        let jwt = JwtService::new(JwtConfig {
            secret: SECRET.to_string(),
            access_token_expires_minutes: 15,
        });

        let state = AppState {
            db: Arc::new(db.clone()),
            jwt_service: Arc::new(jwt.clone()),
            security: Arc::new(SecurityConfig {
                trusted_origins: vec![TRUSTED_ORIGIN.to_string()],
            }),
        };

        Self {
            router: create_router(state),
            db,
            jwt,
        }
    }

    pub fn token(&self, role: &str) -> String {
        self.jwt
            .generate_access_token(Uuid::new_v4(), role)
            .expect("Failed to generate token")
    }

    pub fn expired_token(&self, role: &str) -> String {
        JwtService::new(JwtConfig {
            secret: SECRET.to_string(),
            access_token_expires_minutes: -10,
        })
        .generate_access_token(Uuid::new_v4(), role)
        .expect("Failed to generate token")
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, body)
    }

    /// Authenticated GET.
    pub async fn get(&self, path: &str, role: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(format!("/api/v1{path}"))
            .header("host", HOST)
            .header("authorization", format!("Bearer {}", self.token(role)))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Authenticated same-origin POST with a JSON body.
    pub async fn post(&self, path: &str, role: &str, body: Value) -> (StatusCode, Value) {
        self.post_from(path, role, Some(SAME_ORIGIN), body).await
    }

    /// Authenticated POST with an explicit `Origin` header, or none.
    pub async fn post_from(
        &self,
        path: &str,
        role: &str,
        origin: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(format!("/api/v1{path}"))
            .header("host", HOST)
            .header("authorization", format!("Bearer {}", self.token(role)))
            .header("content-type", "application/json");
        if let Some(origin) = origin {
            builder = builder.header("origin", origin);
        }

        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn insert_transaction(db: &DatabaseConnection, on: NaiveDate, upload: Option<Uuid>) {
    Transactions::insert(transactions::ActiveModel {
        id: Set(Uuid::new_v4()),
        upload_history_id: Set(upload),
        transaction_date: Set(on),
        amount: Set(dec!(50.00)),
        description: Set("Tithe".to_string()),
        created_at: Set(Utc::now().fixed_offset()),
    })
    .exec_without_returning(db)
    .await
    .expect("Failed to insert transaction");
}

pub async fn insert_payment(db: &DatabaseConnection, on: NaiveDate, upload: Option<Uuid>) {
    Payments::insert(payments::ActiveModel {
        id: Set(Uuid::new_v4()),
        upload_history_id: Set(upload),
        payment_date: Set(on),
        amount: Set(dec!(20.00)),
        reference: Set(None),
        created_at: Set(Utc::now().fixed_offset()),
    })
    .exec_without_returning(db)
    .await
    .expect("Failed to insert payment");
}
