use rocket::serde::json::Json;
use serde_json::{json, Value};

lazy_static! {
    static ref ENDPOINTS: Value = json!({
        "GET /api": {
            "description": "serves up a json representation of all the available endpoints of the api"
        },
        "GET /api/topics": {
            "description": "serves an array of all topics",
            "queries": [],
            "exampleResponse": {
                "topics": [{ "slug": "football", "description": "Footie!" }]
            }
        },
        "GET /api/users": {
            "description": "serves an array of all users",
            "queries": [],
            "exampleResponse": {
                "users": [{
                    "username": "butter_bridge",
                    "name": "jonny",
                    "avatar_url": "https://www.healthytherapies.com/wp-content/uploads/2016/06/Lime3.jpg"
                }]
            }
        },
        "GET /api/users/:username": {
            "description": "serves the user with the given username",
            "queries": [],
            "exampleResponse": {
                "user": {
                    "username": "butter_bridge",
                    "name": "jonny",
                    "avatar_url": "https://www.healthytherapies.com/wp-content/uploads/2016/06/Lime3.jpg"
                }
            }
        },
        "GET /api/articles": {
            "description": "serves an array of all articles with their comment counts",
            "queries": ["topic", "sort_by", "order_by"],
            "exampleResponse": {
                "articles": [{
                    "article_id": 3,
                    "title": "Eight pug gifs that remind me of mitch",
                    "topic": "mitch",
                    "author": "icellusedkars",
                    "body": "some gifs",
                    "created_at": "2020-11-03T09:12:00.000Z",
                    "votes": 0,
                    "comment_count": "2"
                }]
            }
        },
        "GET /api/articles/:article_id": {
            "description": "serves the article with the given id and its comment count",
            "queries": [],
            "exampleResponse": {
                "article": {
                    "article_id": 3,
                    "title": "Eight pug gifs that remind me of mitch",
                    "topic": "mitch",
                    "author": "icellusedkars",
                    "body": "some gifs",
                    "created_at": "2020-11-03T09:12:00.000Z",
                    "votes": 0,
                    "comment_count": "2"
                }
            }
        },
        "PATCH /api/articles/:article_id": {
            "description": "adds inc_votes to the article's votes and serves the updated article",
            "queries": [],
            "exampleRequest": { "inc_votes": 10 },
            "exampleResponse": {
                "article": {
                    "article_id": 3,
                    "title": "Eight pug gifs that remind me of mitch",
                    "topic": "mitch",
                    "author": "icellusedkars",
                    "body": "some gifs",
                    "created_at": "2020-11-03T09:12:00.000Z",
                    "votes": 10
                }
            }
        },
        "GET /api/articles/:article_id/comments": {
            "description": "serves an array of the comments posted on the article",
            "queries": [],
            "exampleResponse": {
                "comments": [{
                    "comment_id": 10,
                    "votes": 0,
                    "created_at": "2020-06-20T07:24:00.000Z",
                    "author": "icellusedkars",
                    "body": "git push origin master",
                    "article_id": 3
                }]
            }
        },
        "POST /api/articles/:article_id/comments": {
            "description": "posts a comment on the article and serves it back",
            "queries": [],
            "exampleRequest": { "username": "lurker", "body": "first!" },
            "exampleResponse": {
                "comment": {
                    "comment_id": 19,
                    "votes": 0,
                    "created_at": "2021-01-01T12:00:00.000Z",
                    "author": "lurker",
                    "body": "first!",
                    "article_id": 3
                }
            }
        },
        "DELETE /api/comments/:comment_id": {
            "description": "deletes the comment with the given id and responds with no content",
            "queries": []
        }
    });
}

#[get("/")]
pub fn index() -> Json<Value> {
    Json(ENDPOINTS.clone())
}
