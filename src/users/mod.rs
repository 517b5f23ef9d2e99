use rocket::serde::json::Json;

use crate::db::Db;
use crate::types::ApiResult;

pub mod models;

use self::models::User;

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    user: User,
}

#[get("/")]
pub async fn list(db: Db) -> ApiResult<UsersResponse> {
    let users = db.run(|conn| User::load_all(conn)).await?;
    Ok(Json(UsersResponse { users }))
}

#[get("/<username>")]
pub async fn get(db: Db, username: String) -> ApiResult<UserResponse> {
    let user = db
        .run(move |conn| User::load_by_name(&username, conn))
        .await?;
    Ok(Json(UserResponse { user }))
}
