use chrono::{NaiveDateTime, SecondsFormat, TimeZone, Utc};
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::Serializer;
use serde_json::{json, Value};

/// The `{"msg": ...}` body every failed request answers with.
pub fn error_response(status: Status, msg: &str) -> Custom<Json<Value>> {
    Custom(status, Json(json!({ "msg": msg })))
}

// Timestamps are stored without a zone and always mean UTC.
pub fn serialize_date<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = Utc
        .from_utc_datetime(date)
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    serializer.serialize_str(&s)
}

pub fn serialize_count<S>(count: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&count.to_string())
}
