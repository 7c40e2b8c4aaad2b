//! Initial database migration.
//!
//! Creates enums, people, leave, attendance, payroll and audit tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: PEOPLE
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(EMPLOYEE_PROFILES_SQL).await?;

        // ============================================================
        // PART 3: LEAVE
        // ============================================================
        db.execute_unprepared(LEAVE_BALANCES_SQL).await?;
        db.execute_unprepared(LEAVE_REQUESTS_SQL).await?;

        // ============================================================
        // PART 4: ATTENDANCE
        // ============================================================
        db.execute_unprepared(ATTENDANCE_SQL).await?;

        // ============================================================
        // PART 5: PAYROLL
        // ============================================================
        db.execute_unprepared(PAYRUNS_SQL).await?;
        db.execute_unprepared(PAYSLIPS_SQL).await?;

        // ============================================================
        // PART 6: AUDIT
        // ============================================================
        db.execute_unprepared(AUDIT_LOGS_SQL).await?;

        // ============================================================
        // PART 7: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

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

const ENUMS_SQL: &str = r"
CREATE TYPE user_role AS ENUM ('employee', 'hr', 'payroll', 'admin');
CREATE TYPE leave_type AS ENUM ('SICK', 'CASUAL', 'EARNED', 'UNPAID');
CREATE TYPE leave_status AS ENUM ('PENDING', 'APPROVED', 'REJECTED', 'CANCELLED');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    role user_role NOT NULL DEFAULT 'employee',
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Payroll eligibility scan
CREATE INDEX idx_users_role_active ON users(role) WHERE is_active;
";

const EMPLOYEE_PROFILES_SQL: &str = r"
CREATE TABLE employee_profiles (
    user_id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    basic_salary NUMERIC(14, 2),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_basic_salary_non_negative CHECK (basic_salary IS NULL OR basic_salary >= 0)
);
";

const LEAVE_BALANCES_SQL: &str = r"
CREATE TABLE leave_balances (
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    leave_type leave_type NOT NULL,
    balance INTEGER NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (user_id, leave_type),
    CONSTRAINT chk_balance_non_negative CHECK (balance >= 0),
    CONSTRAINT chk_balance_paid_only CHECK (leave_type <> 'UNPAID')
);
";

const LEAVE_REQUESTS_SQL: &str = r"
CREATE TABLE leave_requests (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    leave_type leave_type NOT NULL,
    status leave_status NOT NULL DEFAULT 'PENDING',
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    reason TEXT,
    computed_days INTEGER NOT NULL,
    approved_by UUID REFERENCES users(id),
    approved_at TIMESTAMPTZ,
    decided_by UUID REFERENCES users(id),
    decision_reason TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_leave_range CHECK (end_date >= start_date),
    CONSTRAINT chk_computed_days CHECK (computed_days = end_date - start_date + 1),
    CONSTRAINT chk_approval_fields CHECK (
        status <> 'APPROVED' OR (approved_by IS NOT NULL AND approved_at IS NOT NULL)
    )
);

-- Listing: own requests newest first
CREATE INDEX idx_leave_requests_user ON leave_requests(user_id, created_at DESC);

-- Overlap and payroll scans only look at approved rows
CREATE INDEX idx_leave_requests_approved ON leave_requests(user_id, start_date, end_date)
    WHERE status = 'APPROVED';
";

const ATTENDANCE_SQL: &str = r"
CREATE TABLE attendance (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    date DATE NOT NULL,
    check_in TIMESTAMPTZ,
    check_out TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_attendance_user_date UNIQUE (user_id, date)
);

CREATE INDEX idx_attendance_date ON attendance(date) WHERE check_in IS NOT NULL;
";

const PAYRUNS_SQL: &str = r"
CREATE TABLE payruns (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_payruns_year_month UNIQUE (year, month),
    CONSTRAINT chk_payrun_month CHECK (month BETWEEN 1 AND 12)
);
";

const PAYSLIPS_SQL: &str = r"
CREATE TABLE payslips (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    payrun_id UUID NOT NULL REFERENCES payruns(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id),
    gross NUMERIC(14, 2) NOT NULL,
    net NUMERIC(14, 2) NOT NULL,
    components JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_payslips_payrun_user UNIQUE (payrun_id, user_id),
    CONSTRAINT chk_payslip_net_range CHECK (net >= 0 AND net <= gross)
);

CREATE INDEX idx_payslips_user ON payslips(user_id, created_at DESC);
";

const AUDIT_LOGS_SQL: &str = r"
CREATE TABLE audit_logs (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    actor_id UUID NOT NULL,
    action VARCHAR(50) NOT NULL,
    entity VARCHAR(50) NOT NULL,
    entity_id UUID NOT NULL,
    meta JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_audit_logs_entity ON audit_logs(entity, entity_id);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_users_updated_at BEFORE UPDATE ON users
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_employee_profiles_updated_at BEFORE UPDATE ON employee_profiles
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_leave_balances_updated_at BEFORE UPDATE ON leave_balances
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_leave_requests_updated_at BEFORE UPDATE ON leave_requests
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS audit_logs CASCADE;
DROP TABLE IF EXISTS payslips CASCADE;
DROP TABLE IF EXISTS payruns CASCADE;
DROP TABLE IF EXISTS attendance CASCADE;
DROP TABLE IF EXISTS leave_requests CASCADE;
DROP TABLE IF EXISTS leave_balances CASCADE;
DROP TABLE IF EXISTS employee_profiles CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP FUNCTION IF EXISTS set_updated_at() CASCADE;
DROP TYPE IF EXISTS leave_status;
DROP TYPE IF EXISTS leave_type;
DROP TYPE IF EXISTS user_role;
";
