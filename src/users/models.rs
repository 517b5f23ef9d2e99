use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::select;

use crate::db::schema::users;
use crate::types::ApiError;

pub const USER_NOT_FOUND: &str = "The user does not exist";

#[derive(Debug, Queryable, Serialize)]
pub struct User {
    pub username: String,
    pub name: String,
    pub avatar_url: String,
}

impl User {
    pub fn load_all(connection: &mut PgConnection) -> Result<Vec<User>, ApiError> {
        users::table.load::<User>(connection).map_err(|e| e.into())
    }

    pub fn load_by_name(name: &str, connection: &mut PgConnection) -> Result<User, ApiError> {
        users::table
            .find(name)
            .get_result::<User>(connection)
            .optional()?
            .ok_or(ApiError::NotFound(USER_NOT_FOUND))
    }

    pub fn ensure_exists(name: &str, connection: &mut PgConnection) -> Result<(), ApiError> {
        let found = select(exists(users::table.find(name))).get_result::<bool>(connection)?;
        if found {
            Ok(())
        } else {
            Err(ApiError::NotFound(USER_NOT_FOUND))
        }
    }
}
