use catnap::domain::models::user::User;
use catnap::infrastructure::persistence::users;
use catnap::Database;

pub async fn setup_test_db() -> Database {
    // Install drivers for AnyPool (required for tests)
    sqlx::any::install_default_drivers();

    // Use file-based SQLite for tests (unique UUID per test for parallel execution)
    use uuid::Uuid;
    let temp_file = format!("test_{}.db", Uuid::new_v4());
    let db_url = format!("sqlite://{}?mode=rwc", temp_file);

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    setup_schema(&db).await;

    db
}

async fn setup_schema(db: &Database) {
    let pool = db.pool();

    sqlx::query(
        "CREATE TABLE users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_digest TEXT NOT NULL,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create users table");

    sqlx::query("CREATE INDEX idx_users_email ON users(email)")
        .execute(pool)
        .await
        .ok();

    sqlx::query(
        "CREATE TABLE cats (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            name TEXT NOT NULL,
            gender TEXT NOT NULL CHECK(gender IN ('MALE', 'FEMALE')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create cats table");

    sqlx::query("CREATE INDEX idx_cats_user ON cats(user_id)")
        .execute(pool)
        .await
        .ok();
}

/// Insert a user with a known id so foreign keys and ownership checks have
/// something to point at. The digest is a throwaway; tests that exercise
/// login hash their own passwords.
pub async fn create_test_user(db: &Database, id: &str, email: &str) -> User {
    let mut user = User::new(
        email.to_string(),
        "$2b$04$invaliddigestinvaliddigestinvalidd".to_string(),
        "Test".to_string(),
        "User".to_string(),
    );
    user.id = id.to_string();
    users::insert(db.pool(), &user)
        .await
        .expect("Failed to insert test user");
    user
}

pub async fn count_cats(db: &Database) -> i64 {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cats")
        .fetch_one(db.pool())
        .await
        .expect("Failed to count cats");
    row.0
}
