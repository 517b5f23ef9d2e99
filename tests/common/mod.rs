#![allow(dead_code)]

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::Connection;
use news_api::db::{self, Db, DbConfig};
use rocket::local::blocking::Client;
use std::env;
use std::sync::{Mutex, MutexGuard};

const SCHEMA_DOWN: &str = include_str!("../../migrations/2020-11-01-000000_create_news/down.sql");
const SCHEMA_UP: &str = include_str!("../../migrations/2020-11-01-000000_create_news/up.sql");
const TEST_DATA: &str = include_str!("../data/test_data.sql");

// Nothing listens on port 1, so any checkout from this pool fails.
const UNREACHABLE_DATABASE: &str = "postgres://news@127.0.0.1:1/unreachable";

// Every seeded test rebuilds the same database.
static DATABASE_LOCK: Mutex<()> = Mutex::new(());

/// A client for requests that must be answered before the database is used.
pub fn offline_client() -> Client {
    let pool = db::lazy_pool(&DbConfig::new(UNREACHABLE_DATABASE));
    Client::tracked(news_api::rocket(Db::new(pool))).expect("valid rocket instance")
}

pub struct SeededApp {
    pub client: Client,
    _lock: MutexGuard<'static, ()>,
}

/// Recreates the schema in `TEST_DATABASE_URL`, loads the fixtures and
/// returns a client over it. Tests using it are `#[ignore]`d; run them with
/// `cargo test -- --ignored` once the variable points at a database.
pub fn seeded_app() -> SeededApp {
    let url = env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let lock = DATABASE_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let mut connection = PgConnection::establish(&url).expect("connect to test database");
    connection
        .batch_execute(SCHEMA_DOWN)
        .and_then(|_| connection.batch_execute(SCHEMA_UP))
        .and_then(|_| connection.batch_execute(TEST_DATA))
        .expect("seed test database");

    let mut config = DbConfig::new(url);
    config.pool_size = 2;
    let pool = db::init_pool(&config).expect("test database pool");
    let client = Client::tracked(news_api::rocket(Db::new(pool))).expect("valid rocket instance");
    SeededApp {
        client,
        _lock: lock,
    }
}
