use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::select;
use rocket::serde::json::Json;

use crate::db::schema::topics;
use crate::db::Db;
use crate::types::{ApiError, ApiResult};

pub const TOPIC_NOT_FOUND: &str = "Topic not found";

#[derive(Debug, Queryable, Serialize)]
pub struct Topic {
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    topics: Vec<Topic>,
}

impl Topic {
    pub fn load_all(connection: &mut PgConnection) -> Result<Vec<Topic>, ApiError> {
        topics::table.load::<Topic>(connection).map_err(|e| e.into())
    }

    pub fn ensure_exists(slug: &str, connection: &mut PgConnection) -> Result<(), ApiError> {
        let found = select(exists(topics::table.find(slug))).get_result::<bool>(connection)?;
        if found {
            Ok(())
        } else {
            Err(ApiError::NotFound(TOPIC_NOT_FOUND))
        }
    }
}

#[get("/")]
pub async fn list(db: Db) -> ApiResult<TopicsResponse> {
    let topics = db.run(|conn| Topic::load_all(conn)).await?;
    Ok(Json(TopicsResponse { topics }))
}
