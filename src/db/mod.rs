use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use dotenv::dotenv;
use rocket::request::{self, FromRequest};
use rocket::tokio::task;
use rocket::{Request, State};
use std::env;
use std::time::Duration;
use tracing::{error, info};

use crate::types::ApiError;

pub mod schema;

// An alias to the type for a pool of Diesel Postgres connections.
pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

error_chain! {
    foreign_links {
        Var(::std::env::VarError);
        ParseInt(::std::num::ParseIntError);
        R2D2(r2d2::Error);
    }
}

const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Connection settings for the Postgres pool.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub pool_size: u32,
    pub connection_timeout: Duration,
}

impl DbConfig {
    pub fn new<S: Into<String>>(url: S) -> DbConfig {
        DbConfig {
            url: url.into(),
            pool_size: DEFAULT_POOL_SIZE,
            connection_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads `DATABASE_URL`, `DATABASE_POOL_SIZE` and `DATABASE_TIMEOUT_SECS`,
    /// loading `.env` first when one is present.
    pub fn from_env() -> Result<DbConfig> {
        dotenv().ok();
        let mut config = DbConfig::new(env::var("DATABASE_URL")?);
        if let Ok(size) = env::var("DATABASE_POOL_SIZE") {
            config.pool_size = size.trim().parse()?;
        }
        if let Ok(secs) = env::var("DATABASE_TIMEOUT_SECS") {
            config.connection_timeout = Duration::from_secs(secs.trim().parse()?);
        }
        Ok(config)
    }

    fn builder(&self) -> r2d2::Builder<ConnectionManager<PgConnection>> {
        Pool::builder()
            .max_size(self.pool_size)
            .connection_timeout(self.connection_timeout)
    }
}

/// Builds the pool and waits until its initial connections are open.
pub fn init_pool(config: &DbConfig) -> Result<Pool> {
    let manager = ConnectionManager::<PgConnection>::new(config.url.as_str());
    Ok(config.builder().build(manager)?)
}

/// Builds the pool without opening anything; connections are made on first
/// checkout.
pub fn lazy_pool(config: &DbConfig) -> Pool {
    let manager = ConnectionManager::<PgConnection>::new(config.url.as_str());
    config.builder().min_idle(Some(0)).build_unchecked(manager)
}

/// Handle to the connection pool, managed by Rocket and handed to every
/// route through its request guard.
#[derive(Clone)]
pub struct Db {
    pool: Pool,
}

impl Db {
    pub fn new(pool: Pool) -> Db {
        Db { pool }
    }

    /// Checks a connection out of the pool and runs `query` on it off the
    /// async executor. The connection goes back to the pool when `query`
    /// returns, whether it succeeded or not.
    pub async fn run<F, T>(&self, query: F) -> ::std::result::Result<T, ApiError>
    where
        F: FnOnce(&mut PgConnection) -> ::std::result::Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut connection = pool.get()?;
            query(&mut *connection)
        })
        .await
        .map_err(|e| {
            error!(error = %e, "database task did not complete");
            ApiError::Internal
        })?
    }

    /// Logs what the pool holds as the server stops. The connections close
    /// when the last handle to the pool is dropped, which Rocket does when it
    /// releases its managed state.
    pub fn log_release(&self) {
        let state = self.pool.state();
        info!(
            connections = state.connections,
            idle = state.idle_connections,
            "releasing database pool"
        );
    }
}

// Hands out a clone of the managed `Db`. If no pool is managed the request
// fails with an `InternalServerError` status.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for Db {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Db, ()> {
        request
            .guard::<&State<Db>>()
            .await
            .map(|db| db.inner().clone())
    }
}
