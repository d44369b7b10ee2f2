//! SQLite connection pool, schema and seed data

use std::path::Path;

use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;

use crate::domain::repositories::StoreResult;

/// Open the pool and bring the schema up to date
///
/// For file-backed URLs the parent directory is created first.
pub async fn connect(database_url: &str) -> StoreResult<SqlitePool> {
    if let Some(parent) = database_file(database_url).and_then(|p| p.parent()) {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    run_migrations(&pool).await?;
    seed_knowledge(&pool).await?;
    Ok(pool)
}

/// In-memory database for tests
///
/// Limited to a single connection; every new in-memory connection would
/// otherwise see its own empty database.
pub async fn in_memory() -> StoreResult<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

fn database_file(database_url: &str) -> Option<&Path> {
    let rest = database_url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Some(Path::new(path))
}

pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'created',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS interactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL REFERENCES projects (id),
            agent TEXT NOT NULL,
            step_id TEXT NOT NULL,
            content TEXT,
            status TEXT NOT NULL DEFAULT 'processing',
            created_at TEXT NOT NULL,
            completed_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feedback (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL REFERENCES projects (id),
            step_id TEXT NOT NULL,
            agent TEXT,
            feedback TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS knowledge (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            agent TEXT NOT NULL,
            category TEXT NOT NULL,
            query TEXT,
            content TEXT NOT NULL,
            project_id INTEGER REFERENCES projects (id),
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_interactions_project ON interactions (project_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_knowledge_category ON knowledge (category)")
        .execute(pool)
        .await?;

    Ok(())
}

const SEED_KNOWLEDGE: &[(&str, &str, &str)] = &[
    (
        "vision",
        "Methodology",
        "Design Thinking runs in five phases: empathise, define, ideate, prototype and test. \
         It keeps the work anchored on what users actually need.",
    ),
    (
        "pixel",
        "UI principles",
        "Nielsen's ten usability heuristics cover system status visibility, match with the real \
         world, user control, consistency, error prevention, recognition over recall, \
         flexibility, minimalist design, error recovery and help.",
    ),
    (
        "arch",
        "Patterns",
        "Model-View-Controller splits an application into data, presentation and control logic \
         so each can evolve independently.",
    ),
    (
        "script",
        "Frameworks",
        "React builds interfaces from reusable components over a virtual DOM, with one-way data \
         flow and component state for dynamic data.",
    ),
    (
        "node",
        "REST APIs",
        "RESTful services use a uniform interface, stay stateless, allow caching and name \
         endpoints consistently with the matching HTTP verbs.",
    ),
    (
        "data",
        "Optimisation",
        "Index the columns used in WHERE, JOIN and ORDER BY clauses so queries avoid full table \
         scans.",
    ),
    (
        "secure",
        "OWASP",
        "The OWASP Top 10 lists injection, broken authentication, sensitive data exposure, \
         broken access control, security misconfiguration, XSS and insufficient logging among \
         the most common web risks.",
    ),
    (
        "test",
        "Methods",
        "The test pyramid favours many unit tests, fewer integration tests and a thin layer of \
         end-to-end tests.",
    ),
    (
        "deploy",
        "CI/CD",
        "Continuous integration merges and verifies every change automatically; continuous \
         delivery ships each verified build to production environments.",
    ),
    (
        "pm",
        "Agile",
        "Scrum organises work in two to four week sprints with a Product Owner, a Scrum Master \
         and a delivery team, punctuated by planning, daily stand-ups, review and retrospective.",
    ),
];

/// Fill an empty knowledge table with one methodology note per default worker
pub async fn seed_knowledge(pool: &SqlitePool) -> StoreResult<()> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM knowledge")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for (agent, category, content) in SEED_KNOWLEDGE {
        sqlx::query(
            "INSERT INTO knowledge (agent, category, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(*agent)
        .bind(*category)
        .bind(*content)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!(entries = SEED_KNOWLEDGE.len(), "Knowledge base seeded");
    Ok(())
}
