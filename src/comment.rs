use chrono::{NaiveDateTime, Utc};
use diesel::insert_into;
use diesel::prelude::*;
use rocket::response::status::{Created, NoContent};
use rocket::serde::json::Json;
use tracing::debug;

use crate::article::Article;
use crate::db::schema::comments;
use crate::db::Db;
use crate::types::{ApiError, ApiResult, Validate};
use crate::users::models::User;
use crate::utils::serialize_date;
use crate::validation::{parse_body, parse_id, CommentDraft, CommentRequest, JsonBody};

pub const COMMENT_NOT_FOUND: &str = "The comment ID does not exist";

#[derive(Debug, Queryable, Serialize)]
pub struct Comment {
    pub comment_id: i32,
    pub body: String,
    pub votes: i32,
    pub author: String,
    pub article_id: i32,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    body: String,
    votes: i32,
    author: String,
    article_id: i32,
    created_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
pub struct CommentContainer<T> {
    comment: T,
}

#[derive(Debug, Serialize)]
pub struct CommentsContainer<T> {
    comments: T,
}

impl Comment {
    pub fn for_article(article_id: i32, connection: &mut PgConnection) -> Result<Vec<Comment>, ApiError> {
        comments::table
            .filter(comments::article_id.eq(article_id))
            .order(comments::created_at.desc())
            .load::<Comment>(connection)
            .map_err(|e| e.into())
    }

    pub fn create(
        article_id: i32,
        draft: CommentDraft,
        connection: &mut PgConnection,
    ) -> Result<Comment, ApiError> {
        let new_comment = NewComment {
            body: draft.body,
            votes: 0,
            author: draft.username,
            article_id,
            created_at: Utc::now().naive_utc(),
        };
        insert_into(comments::table)
            .values(&new_comment)
            .get_result::<Comment>(connection)
            .map_err(|e| e.into())
    }

    pub fn delete_by_id(id: i32, connection: &mut PgConnection) -> Result<(), ApiError> {
        let deleted = diesel::delete(comments::table.find(id)).execute(connection)?;
        if deleted == 0 {
            Err(ApiError::NotFound(COMMENT_NOT_FOUND))
        } else {
            Ok(())
        }
    }
}

#[get("/<article_id>/comments")]
pub async fn list(db: Db, article_id: &str) -> ApiResult<CommentsContainer<Vec<Comment>>> {
    let article_id = parse_id(article_id)?;
    let comments = db
        .run(move |conn| {
            Article::ensure_exists(article_id, conn)?;
            Comment::for_article(article_id, conn)
        })
        .await?;
    Ok(Json(CommentsContainer { comments }))
}

#[post("/<article_id>/comments", data = "<details>")]
pub async fn add(
    db: Db,
    article_id: &str,
    details: JsonBody<'_, CommentRequest>,
) -> Result<Created<Json<CommentContainer<Comment>>>, ApiError> {
    let article_id = parse_id(article_id)?;
    let draft = parse_body(details)?.validate()?;
    let comment = db
        .run(move |conn| {
            User::ensure_exists(&draft.username, conn)?;
            Article::ensure_exists(article_id, conn)?;
            Comment::create(article_id, draft, conn)
        })
        .await?;
    debug!(comment_id = comment.comment_id, article_id, "comment posted");
    let location = format!("/api/comments/{}", comment.comment_id);
    Ok(Created::new(location).body(Json(CommentContainer { comment })))
}

#[delete("/<comment_id>")]
pub async fn delete(db: Db, comment_id: &str) -> Result<NoContent, ApiError> {
    let comment_id = parse_id(comment_id)?;
    db.run(move |conn| Comment::delete_by_id(comment_id, conn))
        .await?;
    debug!(comment_id, "comment deleted");
    Ok(NoContent)
}
