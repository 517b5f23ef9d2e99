use rocket::serde::json::{self, Json};
use serde::de::{DeserializeOwned, Deserializer};
use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::debug;

use crate::types::{ApiError, Validate};

pub const NO_UPDATE: &str = "Invalid request: No information to update";
pub const USERNAME_REQUIRED: &str = "Invalid request: username required";
pub const COMMENT_BODY_REQUIRED: &str = "Invalid request: comment body required";

/// A JSON body that is handed to the handler even when it fails to parse.
pub type JsonBody<'r, T> = Result<Json<T>, json::Error<'r>>;

/// Parses an id path segment. Anything that is not a 32-bit integer is
/// rejected before the database sees it.
pub fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>().map_err(|_| ApiError::invalid_request())
}

/// Unwraps a request body. A missing or blank body reads as an empty one.
pub fn parse_body<T>(body: JsonBody<'_, T>) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    match body {
        Ok(Json(value)) => Ok(value),
        Err(json::Error::Parse(raw, _)) if raw.trim().is_empty() => Ok(T::default()),
        Err(e) => {
            debug!(error = ?e, "unreadable request body");
            Err(ApiError::invalid_request())
        }
    }
}

// Mirrors what a JSON client considers "no value".
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    ArticleId,
    Title,
    Topic,
    Author,
    Body,
    CreatedAt,
    Votes,
}

impl SortBy {
    pub fn column(self) -> &'static str {
        match self {
            SortBy::ArticleId => "article_id",
            SortBy::Title => "title",
            SortBy::Topic => "topic",
            SortBy::Author => "author",
            SortBy::Body => "body",
            SortBy::CreatedAt => "created_at",
            SortBy::Votes => "votes",
        }
    }
}

impl Default for SortBy {
    fn default() -> SortBy {
        SortBy::CreatedAt
    }
}

impl FromStr for SortBy {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<SortBy, ApiError> {
        match s {
            "article_id" => Ok(SortBy::ArticleId),
            "title" => Ok(SortBy::Title),
            "topic" => Ok(SortBy::Topic),
            "author" => Ok(SortBy::Author),
            "body" => Ok(SortBy::Body),
            "created_at" => Ok(SortBy::CreatedAt),
            "votes" => Ok(SortBy::Votes),
            _ => Err(ApiError::invalid_request()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn keyword(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

impl Default for Order {
    fn default() -> Order {
        Order::Desc
    }
}

impl FromStr for Order {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Order, ApiError> {
        match s {
            "asc" => Ok(Order::Asc),
            "desc" => Ok(Order::Desc),
            _ => Err(ApiError::invalid_request()),
        }
    }
}

/// The validated query string of `GET /api/articles`.
#[derive(Debug, Default, PartialEq)]
pub struct ArticleQuery {
    pub sort_by: SortBy,
    pub order: Order,
    pub topic: Option<String>,
}

impl ArticleQuery {
    pub fn parse(
        sort_by: Option<&str>,
        order_by: Option<&str>,
        topic: Option<String>,
    ) -> Result<ArticleQuery, ApiError> {
        let sort_by = match sort_by {
            Some(raw) => raw.parse::<SortBy>()?,
            None => SortBy::default(),
        };
        let order = match order_by {
            Some(raw) => raw.parse::<Order>()?,
            None => Order::default(),
        };
        Ok(ArticleQuery {
            sort_by,
            order,
            topic: topic.filter(|t| !t.is_empty()),
        })
    }
}

/// Body of `PATCH /api/articles/:article_id`.
#[derive(Debug, Default, Deserialize)]
pub struct VoteUpdate {
    #[serde(default)]
    pub inc_votes: Option<Value>,
}

impl Validate for VoteUpdate {
    type Output = i32;

    fn validate(self) -> Result<i32, ApiError> {
        match self.inc_votes {
            Some(Value::String(ref s)) if !s.is_empty() => {
                s.trim().parse::<i32>().map_err(|_| ApiError::invalid_request())
            }
            Some(ref votes) if !is_falsy(votes) => votes
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .ok_or_else(ApiError::invalid_request),
            _ => Err(ApiError::InvalidInput(NO_UPDATE)),
        }
    }
}

// A key that is present reads as `Some`, even when its value is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    <Value as serde::Deserialize>::deserialize(deserializer).map(Some)
}

/// Body of `POST /api/articles/:article_id/comments`.
#[derive(Debug, Default, Deserialize)]
pub struct CommentRequest {
    #[serde(default, deserialize_with = "present")]
    pub username: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub body: Option<Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, PartialEq)]
pub struct CommentDraft {
    pub username: String,
    pub body: String,
}

fn required_text(value: Option<Value>, missing: &'static str) -> Result<String, ApiError> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(ref v) if !is_falsy(v) => Err(ApiError::invalid_request()),
        _ => Err(ApiError::InvalidInput(missing)),
    }
}

impl Validate for CommentRequest {
    type Output = CommentDraft;

    fn validate(self) -> Result<CommentDraft, ApiError> {
        if self.username.is_none() && self.body.is_none() && self.other.is_empty() {
            return Err(ApiError::invalid_request());
        }
        let username = required_text(self.username, USERNAME_REQUIRED)?;
        let body = required_text(self.body, COMMENT_BODY_REQUIRED)?;
        Ok(CommentDraft { username, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::INVALID_REQUEST;
    use serde_json::json;

    fn message<T: std::fmt::Debug>(result: Result<T, ApiError>) -> &'static str {
        result.unwrap_err().status_and_message().1
    }

    fn votes(body: Value) -> Result<i32, ApiError> {
        serde_json::from_value::<VoteUpdate>(body).unwrap().validate()
    }

    fn comment(body: Value) -> Result<CommentDraft, ApiError> {
        serde_json::from_value::<CommentRequest>(body).unwrap().validate()
    }

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("3").unwrap(), 3);
        assert_eq!(parse_id("-7").unwrap(), -7);
        assert_eq!(message(parse_id("words")), INVALID_REQUEST);
        assert_eq!(message(parse_id("1.5")), INVALID_REQUEST);
        assert_eq!(message(parse_id("")), INVALID_REQUEST);
        assert_eq!(message(parse_id("99999999999")), INVALID_REQUEST);
    }

    #[test]
    fn article_query_defaults() {
        let query = ArticleQuery::parse(None, None, None).unwrap();
        assert_eq!(query.sort_by, SortBy::CreatedAt);
        assert_eq!(query.order, Order::Desc);
        assert_eq!(query.topic, None);
    }

    #[test]
    fn article_query_accepts_every_sort_column() {
        for column in &["article_id", "title", "topic", "author", "body", "created_at", "votes"] {
            let query = ArticleQuery::parse(Some(*column), Some("asc"), None).unwrap();
            assert_eq!(query.sort_by.column(), *column);
            assert_eq!(query.order.keyword(), "ASC");
        }
    }

    #[test]
    fn article_query_rejects_unknown_values() {
        assert_eq!(message(ArticleQuery::parse(Some("comment_count;"), None, None)), INVALID_REQUEST);
        assert_eq!(message(ArticleQuery::parse(Some(""), None, None)), INVALID_REQUEST);
        assert_eq!(message(ArticleQuery::parse(None, Some("up"), None)), INVALID_REQUEST);
        assert_eq!(message(ArticleQuery::parse(None, Some("DESC"), None)), INVALID_REQUEST);
    }

    #[test]
    fn empty_topic_means_no_filter() {
        let query = ArticleQuery::parse(None, None, Some(String::new())).unwrap();
        assert_eq!(query.topic, None);
        let query = ArticleQuery::parse(None, None, Some("cats".into())).unwrap();
        assert_eq!(query.topic.as_deref(), Some("cats"));
    }

    #[test]
    fn vote_increments() {
        assert_eq!(votes(json!({ "inc_votes": 10 })).unwrap(), 10);
        assert_eq!(votes(json!({ "inc_votes": -100 })).unwrap(), -100);
    }

    #[test]
    fn numeric_string_votes_are_accepted() {
        assert_eq!(votes(json!({ "inc_votes": "5" })).unwrap(), 5);
        assert_eq!(votes(json!({ "inc_votes": " -3 " })).unwrap(), -3);
        assert_eq!(message(votes(json!({ "inc_votes": "5.5" }))), INVALID_REQUEST);
        assert_eq!(message(votes(json!({ "inc_votes": "4294967296" }))), INVALID_REQUEST);
    }

    #[test]
    fn falsy_votes_mean_nothing_to_update() {
        for body in vec![
            json!({}),
            json!({ "inc_votes": null }),
            json!({ "inc_votes": 0 }),
            json!({ "inc_votes": false }),
            json!({ "inc_votes": "" }),
        ] {
            assert_eq!(message(votes(body)), NO_UPDATE);
        }
    }

    #[test]
    fn non_integer_votes_are_invalid() {
        for body in vec![
            json!({ "inc_votes": "words" }),
            json!({ "inc_votes": 1.5 }),
            json!({ "inc_votes": true }),
            json!({ "inc_votes": [1] }),
            json!({ "inc_votes": 4294967296i64 }),
        ] {
            assert_eq!(message(votes(body)), INVALID_REQUEST);
        }
    }

    #[test]
    fn comment_fields_are_checked_in_order() {
        assert_eq!(message(comment(json!({}))), INVALID_REQUEST);
        assert_eq!(message(comment(json!({ "username": null }))), USERNAME_REQUIRED);
        assert_eq!(
            message(comment(json!({ "username": "lurker", "body": null }))),
            COMMENT_BODY_REQUIRED
        );
        assert_eq!(message(comment(json!({ "body": "hi" }))), USERNAME_REQUIRED);
        assert_eq!(message(comment(json!({ "votes": 3 }))), USERNAME_REQUIRED);
        assert_eq!(
            message(comment(json!({ "username": "", "body": "" }))),
            USERNAME_REQUIRED
        );
        assert_eq!(
            message(comment(json!({ "username": "lurker" }))),
            COMMENT_BODY_REQUIRED
        );
        assert_eq!(
            message(comment(json!({ "username": 12, "body": "hi" }))),
            INVALID_REQUEST
        );
    }

    #[test]
    fn complete_comment() {
        let draft = comment(json!({ "username": "lurker", "body": "first!" })).unwrap();
        assert_eq!(
            draft,
            CommentDraft {
                username: "lurker".into(),
                body: "first!".into(),
            }
        );
    }
}
