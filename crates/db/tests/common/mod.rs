//! Shared fixtures for repository tests.
//!
//! Each test gets its own in-memory SQLite database. Year and upload tables
//! are created from the entity definitions; the money tables use the DDL in
//! [`MONEY_TABLES`].

#![allow(dead_code)]

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Schema, prelude::DateTimeWithTimeZone,
};
use uuid::Uuid;

use steward_db::entities::{
    financial_years, payments, prelude::*, sea_orm_active_enums::UploadStatus, transactions,
    upload_history,
};

/// SQLite builds of sea-query cap decimal precision at 16, so the
/// `NUMERIC(19, 4)` amount columns are declared by hand.
pub const MONEY_TABLES: [&str; 2] = [
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

pub async fn setup_db() -> DatabaseConnection {
    // One pooled connection: every connection to `sqlite::memory:` is a fresh database.
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
    for sql in MONEY_TABLES {
        db.execute_unprepared(sql)
            .await
            .expect("Failed to create money table");
    }

    db
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTimeWithTimeZone {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap().fixed_offset()
}

pub async fn insert_year(
    db: &DatabaseConnection,
    label: &str,
    start: NaiveDate,
    end: NaiveDate,
    is_current: bool,
) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now().fixed_offset();
    FinancialYears::insert(financial_years::ActiveModel {
        id: Set(id),
        label: Set(label.to_string()),
        start_date: Set(start),
        end_date: Set(end),
        is_current: Set(is_current),
        created_at: Set(now),
        updated_at: Set(now),
    })
    .exec_without_returning(db)
    .await
    .expect("Failed to insert financial year");
    id
}

pub async fn insert_upload(
    db: &DatabaseConnection,
    status: UploadStatus,
    uploaded_at: DateTimeWithTimeZone,
) -> Uuid {
    let id = Uuid::new_v4();
    UploadHistory::insert(upload_history::ActiveModel {
        id: Set(id),
        file_name: Set(format!("import-{id}.csv")),
        status: Set(status),
        uploaded_by: Set(Uuid::new_v4()),
        uploaded_at: Set(uploaded_at),
        rolled_back_by: Set(None),
        rolled_back_at: Set(None),
    })
    .exec_without_returning(db)
    .await
    .expect("Failed to insert upload");
    id
}

pub async fn insert_transaction(
    db: &DatabaseConnection,
    transaction_date: NaiveDate,
    upload: Option<Uuid>,
) -> Uuid {
    let id = Uuid::new_v4();
    Transactions::insert(transactions::ActiveModel {
        id: Set(id),
        upload_history_id: Set(upload),
        transaction_date: Set(transaction_date),
        amount: Set(dec!(125.50)),
        description: Set("Sunday offering".to_string()),
        created_at: Set(Utc::now().fixed_offset()),
    })
    .exec_without_returning(db)
    .await
    .expect("Failed to insert transaction");
    id
}

pub async fn insert_payment(
    db: &DatabaseConnection,
    payment_date: NaiveDate,
    upload: Option<Uuid>,
) -> Uuid {
    let id = Uuid::new_v4();
    Payments::insert(payments::ActiveModel {
        id: Set(id),
        upload_history_id: Set(upload),
        payment_date: Set(payment_date),
        amount: Set(dec!(80.00)),
        reference: Set(Some("REF-001".to_string())),
        created_at: Set(Utc::now().fixed_offset()),
    })
    .exec_without_returning(db)
    .await
    .expect("Failed to insert payment");
    id
}

pub async fn count_transactions(db: &DatabaseConnection) -> u64 {
    Transactions::find().count(db).await.unwrap()
}

pub async fn count_payments(db: &DatabaseConnection) -> u64 {
    Payments::find().count(db).await.unwrap()
}

pub async fn count_uploads(db: &DatabaseConnection) -> u64 {
    UploadHistory::find().count(db).await.unwrap()
}

pub async fn count_current_years(db: &DatabaseConnection) -> u64 {
    FinancialYears::find()
        .filter(financial_years::Column::IsCurrent.eq(true))
        .count(db)
        .await
        .unwrap()
}

pub async fn transaction_exists(db: &DatabaseConnection, id: Uuid) -> bool {
    Transactions::find_by_id(id).count(db).await.unwrap() == 1
}

pub async fn payment_exists(db: &DatabaseConnection, id: Uuid) -> bool {
    Payments::find_by_id(id).count(db).await.unwrap() == 1
}

pub async fn transaction_has_upload(db: &DatabaseConnection, id: Uuid) -> bool {
    Transactions::find_by_id(id)
        .filter(transactions::Column::UploadHistoryId.is_not_null())
        .count(db)
        .await
        .unwrap()
        == 1
}
