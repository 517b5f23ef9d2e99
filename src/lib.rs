#![recursion_limit = "256"]

#[macro_use]
extern crate rocket;
#[macro_use]
extern crate diesel;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate serde_derive;

pub mod article;
pub mod comment;
pub mod db;
pub mod endpoints;
pub mod topic;
pub mod types;
pub mod users;
pub mod utils;
pub mod validation;

use rocket::fairing::AdHoc;
use rocket::http::{Status, StatusClass};
use rocket::request::Request;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{Build, Rocket};
use serde_json::Value;

use db::Db;
use types::{INTERNAL_ERROR, INVALID_REQUEST, ROUTE_NOT_FOUND};
use utils::error_response;

#[catch(404)]
fn not_found(_req: &Request) -> Custom<Json<Value>> {
    error_response(Status::NotFound, ROUTE_NOT_FOUND)
}

// Requests turned away before a handler ran.
#[catch(default)]
fn fallback(status: Status, _req: &Request) -> Custom<Json<Value>> {
    match status.class() {
        StatusClass::ClientError => error_response(status, INVALID_REQUEST),
        _ => error_response(Status::InternalServerError, INTERNAL_ERROR),
    }
}

/// Assembles the application around an already constructed pool handle.
pub fn rocket(db: Db) -> Rocket<Build> {
    rocket::build()
        .manage(db)
        .mount("/api", routes![endpoints::index])
        .mount("/api/topics", routes![topic::list])
        .mount("/api/users", routes![users::list, users::get])
        .mount(
            "/api/articles",
            routes![
                article::list,
                article::get,
                article::update,
                comment::list,
                comment::add
            ],
        )
        .mount("/api/comments", routes![comment::delete])
        .register("/", catchers![not_found, fallback])
        .attach(AdHoc::on_shutdown("Database pool", |rocket| {
            Box::pin(async move {
                if let Some(db) = rocket.state::<Db>() {
                    db.log_release();
                }
            })
        }))
}
