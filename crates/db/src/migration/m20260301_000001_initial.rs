//! Initial database migration.
//!
//! Creates the financial-year, upload history, transaction and payment
//! tables for PostgreSQL.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(FINANCIAL_YEARS_SQL).await?;
        db.execute_unprepared(UPLOAD_HISTORY_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const FINANCIAL_YEARS_SQL: &str = r"
CREATE TABLE financial_years (
    id UUID PRIMARY KEY,
    label VARCHAR(32) NOT NULL UNIQUE,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    is_current BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT financial_years_date_range CHECK (start_date < end_date)
);

-- At most one current year; a racing promotion fails here and is retried.
CREATE UNIQUE INDEX financial_years_single_current
    ON financial_years (is_current)
    WHERE is_current;
";

const UPLOAD_HISTORY_SQL: &str = r"
CREATE TABLE upload_history (
    id UUID PRIMARY KEY,
    file_name VARCHAR(255) NOT NULL,
    status VARCHAR(16) NOT NULL DEFAULT 'PROCESSING',
    uploaded_by UUID NOT NULL,
    uploaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    rolled_back_by UUID,
    rolled_back_at TIMESTAMPTZ,

    CONSTRAINT upload_history_status_valid
        CHECK (status IN ('PROCESSING', 'COMPLETED', 'ROLLED_BACK')),
    CONSTRAINT upload_history_rollback_stamped
        CHECK ((status = 'ROLLED_BACK') = (rolled_back_at IS NOT NULL))
);

CREATE INDEX idx_upload_history_uploaded_at ON upload_history (uploaded_at);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    upload_history_id UUID REFERENCES upload_history(id) ON DELETE SET NULL,
    transaction_date DATE NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_transactions_date ON transactions (transaction_date);
CREATE INDEX idx_transactions_upload ON transactions (upload_history_id)
    WHERE upload_history_id IS NOT NULL;
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    upload_history_id UUID REFERENCES upload_history(id) ON DELETE SET NULL,
    payment_date DATE NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    reference VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_payments_date ON payments (payment_date);
CREATE INDEX idx_payments_upload ON payments (upload_history_id)
    WHERE upload_history_id IS NOT NULL;
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS upload_history CASCADE;
DROP TABLE IF EXISTS financial_years CASCADE;
";
