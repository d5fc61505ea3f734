use actix_web::{body::BoxBody, http::header::ContentType, HttpRequest, HttpResponse, Responder};
use serde::Serialize;

use crate::extraction::progress::ProgressState;

fn json_body<T: Serialize>(value: &T) -> HttpResponse {
    let body = match serde_json::to_string(value) {
        Ok(val) => val,
        Err(err) => {
            return HttpResponse::InternalServerError()
                .body(format!("Error serializing response: {}", err))
        }
    };

    HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body)
}

impl Responder for ProgressState {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        json_body(&self)
    }
}
