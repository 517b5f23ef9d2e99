extern crate news_api;
extern crate rocket;

use news_api::db::{self, Db, DbConfig};
use std::error::Error;

#[rocket::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = DbConfig::from_env()?;
    let pool = db::init_pool(&config)?;
    let _ = news_api::rocket(Db::new(pool)).launch().await?;
    Ok(())
}
