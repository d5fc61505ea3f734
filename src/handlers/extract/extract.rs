use actix_web::{
    error::{InternalError, JsonPayloadError},
    web, HttpRequest, HttpResponse, Responder,
};
use uuid::Uuid;

use crate::app_state::AppState;

use super::models::{ErrorOutDTO, StartInDTO, StartOutDTO};

async fn start_processing(
    state: web::Data<AppState>,
    request: web::Json<StartInDTO>,
) -> HttpResponse {
    let Some(run_request) = request.into_inner().into_run_request() else {
        return HttpResponse::BadRequest().json(ErrorOutDTO::new("All fields are required"));
    };

    match state
        .registry
        .start(state.connector.clone(), state.config.clone(), run_request)
    {
        Ok(run_id) => HttpResponse::Ok().json(StartOutDTO {
            message: "Processing started".to_string(),
            run_id,
        }),
        Err(active) => {
            tracing::warn!(run_id = %active, "Rejected start while a run is active");
            HttpResponse::Conflict().json(ErrorOutDTO {
                error: "An extraction run is already in progress".to_string(),
                run_id: Some(active),
            })
        }
    }
}

async fn get_progress(state: web::Data<AppState>) -> impl Responder {
    state.registry.latest()
}

async fn get_run_progress(state: web::Data<AppState>, run_id: web::Path<Uuid>) -> HttpResponse {
    match state.registry.get(run_id.into_inner()) {
        Some(progress) => HttpResponse::Ok().json(progress),
        None => HttpResponse::NotFound().json(ErrorOutDTO::new("Unknown run")),
    }
}

/// Undecodable bodies get the same answer as missing fields.
fn start_body_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected undecodable start request");
    let response = HttpResponse::BadRequest().json(ErrorOutDTO::new("All fields are required"));
    InternalError::from_response(err, response).into()
}

pub fn extract_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/start")
            .app_data(web::JsonConfig::default().error_handler(start_body_error))
            .route(web::post().to(start_processing)),
    )
    .service(web::resource("/progress").route(web::get().to(get_progress)))
    .service(web::resource("/progress/{run_id}").route(web::get().to(get_run_progress)));
}
