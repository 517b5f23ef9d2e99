use chrono::NaiveDateTime;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text, Timestamp};
use diesel::{select, sql_query, update as diesel_update};
use rocket::serde::json::Json;
use tracing::debug;

use crate::db::schema::articles;
use crate::db::Db;
use crate::topic::Topic;
use crate::types::{ApiError, ApiResult, Validate};
use crate::utils::{serialize_count, serialize_date};
use crate::validation::{parse_body, parse_id, ArticleQuery, JsonBody, VoteUpdate};

pub const ID_NOT_FOUND: &str = "The ID does not exist";
pub const ARTICLE_NOT_FOUND: &str = "The article does not exist";

static SELECT_ARTICLE_WITH_COUNT: &str = "SELECT articles.article_id,
       articles.title,
       articles.topic,
       articles.author,
       articles.body,
       articles.created_at,
       articles.votes,
       COUNT(comments.comment_id) AS comment_count
  FROM articles
  LEFT JOIN comments ON comments.article_id = articles.article_id";

#[derive(Debug, Queryable, Serialize)]
pub struct Article {
    pub article_id: i32,
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    pub votes: i32,
}

/// An article together with the number of comments posted on it.
#[derive(Debug, QueryableByName, Serialize)]
pub struct ArticleWithCount {
    #[diesel(sql_type = Integer)]
    pub article_id: i32,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub topic: String,
    #[diesel(sql_type = Text)]
    pub author: String,
    #[diesel(sql_type = Text)]
    pub body: String,
    #[diesel(sql_type = Timestamp)]
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    #[diesel(sql_type = Integer)]
    pub votes: i32,
    #[diesel(sql_type = BigInt)]
    #[serde(serialize_with = "serialize_count")]
    pub comment_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse<T> {
    article: T,
}

#[derive(Debug, Serialize)]
pub struct ArticlesResponse {
    articles: Vec<ArticleWithCount>,
}

// The sort column and direction come from closed enums, never from raw input.
fn list_sql(query: &ArticleQuery) -> String {
    let filter = if query.topic.is_some() {
        "\n WHERE articles.topic = $1"
    } else {
        ""
    };
    format!(
        "{}{}\n GROUP BY articles.article_id\n ORDER BY articles.{} {}",
        SELECT_ARTICLE_WITH_COUNT,
        filter,
        query.sort_by.column(),
        query.order.keyword()
    )
}

impl ArticleWithCount {
    pub fn load_by_id(id: i32, connection: &mut PgConnection) -> Result<ArticleWithCount, ApiError> {
        let sql = format!(
            "{}\n WHERE articles.article_id = $1\n GROUP BY articles.article_id",
            SELECT_ARTICLE_WITH_COUNT
        );
        sql_query(sql)
            .bind::<Integer, _>(id)
            .get_result::<ArticleWithCount>(connection)
            .optional()?
            .ok_or(ApiError::NotFound(ID_NOT_FOUND))
    }

    pub fn load_all(
        query: &ArticleQuery,
        connection: &mut PgConnection,
    ) -> Result<Vec<ArticleWithCount>, ApiError> {
        let sql = list_sql(query);
        debug!(sql = %sql, topic = ?query.topic, "listing articles");
        let articles = match query.topic {
            Some(ref topic) => sql_query(sql)
                .bind::<Text, _>(topic.as_str())
                .load::<ArticleWithCount>(connection)?,
            None => sql_query(sql).load::<ArticleWithCount>(connection)?,
        };
        Ok(articles)
    }
}

impl Article {
    /// Adds `delta` to the stored vote count in a single statement.
    pub fn add_votes(id: i32, delta: i32, connection: &mut PgConnection) -> Result<Article, ApiError> {
        diesel_update(articles::table.find(id))
            .set(articles::votes.eq(articles::votes + delta))
            .get_result::<Article>(connection)
            .optional()?
            .ok_or(ApiError::NotFound(ID_NOT_FOUND))
    }

    pub fn ensure_exists(id: i32, connection: &mut PgConnection) -> Result<(), ApiError> {
        let found = select(exists(articles::table.find(id))).get_result::<bool>(connection)?;
        if found {
            Ok(())
        } else {
            Err(ApiError::NotFound(ARTICLE_NOT_FOUND))
        }
    }
}

#[get("/?<sort_by>&<order_by>&<topic>")]
pub async fn list(
    db: Db,
    sort_by: Option<String>,
    order_by: Option<String>,
    topic: Option<String>,
) -> ApiResult<ArticlesResponse> {
    // An unknown topic is reported before a bad sort column or order.
    let articles = match topic.filter(|t| !t.is_empty()) {
        None => {
            let query = ArticleQuery::parse(sort_by.as_deref(), order_by.as_deref(), None)?;
            db.run(move |conn| ArticleWithCount::load_all(&query, conn))
                .await?
        }
        Some(topic) => {
            db.run(move |conn| {
                Topic::ensure_exists(&topic, conn)?;
                let query =
                    ArticleQuery::parse(sort_by.as_deref(), order_by.as_deref(), Some(topic))?;
                ArticleWithCount::load_all(&query, conn)
            })
            .await?
        }
    };
    Ok(Json(ArticlesResponse { articles }))
}

#[get("/<article_id>")]
pub async fn get(db: Db, article_id: &str) -> ApiResult<ArticleResponse<ArticleWithCount>> {
    let article_id = parse_id(article_id)?;
    let article = db
        .run(move |conn| ArticleWithCount::load_by_id(article_id, conn))
        .await?;
    Ok(Json(ArticleResponse { article }))
}

#[patch("/<article_id>", data = "<update>")]
pub async fn update(
    db: Db,
    article_id: &str,
    update: JsonBody<'_, VoteUpdate>,
) -> ApiResult<ArticleResponse<Article>> {
    let inc_votes = parse_body(update)?.validate()?;
    let article_id = parse_id(article_id)?;
    let article = db
        .run(move |conn| Article::add_votes(article_id, inc_votes, conn))
        .await?;
    debug!(article_id, votes = article.votes, "votes updated");
    Ok(Json(ArticleResponse { article }))
}
