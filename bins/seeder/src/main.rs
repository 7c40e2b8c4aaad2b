//! Database seeder for Payline development and testing.
//!
//! Seeds staff accounts, employees with salaries and leave balances, and
//! weekday attendance for the current month, then prints a bearer token for
//! each account so the API can be exercised right away.
//!
//! Usage: cargo run --bin seeder

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use payline_core::Role;
use payline_core::leave::LeaveType;
use payline_core::payroll::PayPeriod;
use payline_db::{AttendanceRepository, ProfileRepository, UserRepository};
use payline_shared::types::UserId;
use payline_shared::{AppConfig, JwtConfig, JwtService};

/// Token lifetime for printed demo tokens (12 hours).
const TOKEN_TTL_HOURS: i64 = 12;

struct DemoUser {
    email: &'static str,
    full_name: &'static str,
    role: Role,
    salary: Option<i64>,
    /// Every n-th weekday is skipped; 0 means perfect attendance.
    absent_every: u32,
}

const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        email: "admin@payline.dev",
        full_name: "Ada Admin",
        role: Role::Admin,
        salary: None,
        absent_every: 0,
    },
    DemoUser {
        email: "payroll@payline.dev",
        full_name: "Pat Payroll",
        role: Role::Payroll,
        salary: None,
        absent_every: 0,
    },
    DemoUser {
        email: "hr@payline.dev",
        full_name: "Harper Hr",
        role: Role::Hr,
        salary: None,
        absent_every: 0,
    },
    DemoUser {
        email: "alex@payline.dev",
        full_name: "Alex Employee",
        role: Role::Employee,
        salary: Some(30_000),
        absent_every: 0,
    },
    DemoUser {
        email: "sam@payline.dev",
        full_name: "Sam Employee",
        role: Role::Employee,
        salary: Some(80_000),
        absent_every: 7,
    },
    DemoUser {
        email: "robin@payline.dev",
        full_name: "Robin Employee",
        role: Role::Employee,
        salary: None,
        absent_every: 4,
    },
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    println!("Connecting to database...");
    let db = payline_db::connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    let jwt = JwtService::new(&JwtConfig {
        secret: config.jwt.secret.clone(),
    });

    let today = Utc::now().date_naive();
    let period = current_month(today);

    for user in DEMO_USERS {
        println!("Seeding {}...", user.email);
        let id = seed_user(&db, user).await;

        if user.role == Role::Employee {
            seed_profile(&db, id, user).await;
            seed_attendance(&db, id, user, &period, today).await;
        }

        let token = jwt
            .issue_token(UserId::from_uuid(id), user.role.as_str(), Duration::hours(TOKEN_TTL_HOURS))
            .expect("Failed to issue token");
        println!("  {} ({}) token: {}", user.email, user.role, token);
    }

    println!("Seeding complete!");
}

fn current_month(today: NaiveDate) -> PayPeriod {
    PayPeriod::calendar_month(today.year(), today.month()).expect("Current month is valid")
}

/// Creates the user unless the email is already taken.
async fn seed_user(db: &DatabaseConnection, user: &DemoUser) -> Uuid {
    let users = UserRepository::new(db.clone());
    if let Some(existing) = users
        .find_by_email(user.email)
        .await
        .expect("Failed to look up user")
    {
        println!("  Already exists, skipping...");
        return existing.id;
    }

    users
        .create(user.email, user.full_name, user.role)
        .await
        .expect("Failed to create user")
        .id
}

/// Sets the salary and resets paid balances to their default allowance.
async fn seed_profile(db: &DatabaseConnection, user_id: Uuid, user: &DemoUser) {
    let profiles = ProfileRepository::new(db.clone());
    profiles
        .upsert_salary(user_id, user.salary.map(Decimal::from))
        .await
        .expect("Failed to seed profile");

    for leave_type in LeaveType::PAID {
        if let Some(days) = leave_type.default_allowance() {
            profiles
                .set_balance(user_id, leave_type, days)
                .await
                .expect("Failed to seed balance");
        }
    }
}

/// Records a 09:00 UTC check-in on weekdays of `period` up to `today`.
async fn seed_attendance(
    db: &DatabaseConnection,
    user_id: Uuid,
    user: &DemoUser,
    period: &PayPeriod,
    today: NaiveDate,
) {
    let attendance = AttendanceRepository::new(db.clone());
    let mut weekday_index = 0u32;
    let mut day = period.start;

    while day <= period.end.min(today) {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            weekday_index += 1;
            let skip = user.absent_every != 0 && weekday_index % user.absent_every == 0;
            if !skip {
                let check_in = day
                    .and_hms_opt(9, 0, 0)
                    .expect("09:00 is a valid time")
                    .and_utc();
                attendance
                    .record_check_in(user_id, day, check_in)
                    .await
                    .expect("Failed to seed attendance");
            }
        }
        day += Duration::days(1);
    }
}
