use std::path::Path;

use actix_files::NamedFile;
use actix_web::{
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web, HttpRequest, HttpResponse,
};
use chrono::{DateTime, Local};

use crate::{
    app_state::AppState,
    constants::FILE_MODIFIED_FORMAT,
    error::{ExtractError, Result},
    handlers::extract::models::ErrorOutDTO,
    utils::utils_files::contained_path,
};

use super::models::{FileEntryOutDTO, FileListOutDTO};

/// Regular files currently in `dir`, sorted by name. A missing directory
/// lists as empty.
pub fn read_listing(dir: &Path) -> Result<Vec<FileEntryOutDTO>> {
    if !dir.exists() {
        return Ok(vec![]);
    }

    let mut files = vec![];
    for entry in std::fs::read_dir(dir).map_err(|err| ExtractError::io(dir, err))? {
        let entry = entry.map_err(|err| ExtractError::io(dir, err))?;
        let metadata = entry
            .metadata()
            .map_err(|err| ExtractError::io(entry.path(), err))?;
        if !metadata.is_file() {
            continue;
        }

        let modified = metadata
            .modified()
            .map(|time| {
                DateTime::<Local>::from(time)
                    .format(FILE_MODIFIED_FORMAT)
                    .to_string()
            })
            .map_err(|err| ExtractError::io(entry.path(), err))?;

        files.push(FileEntryOutDTO {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
            modified,
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

async fn list_files(state: web::Data<AppState>) -> HttpResponse {
    let dir = state.config.download_dir.clone();
    match web::block(move || read_listing(&dir)).await {
        Ok(Ok(files)) => HttpResponse::Ok().json(FileListOutDTO { files }),
        Ok(Err(err)) => {
            tracing::error!(error = %err, "Listing downloads failed");
            HttpResponse::InternalServerError().json(ErrorOutDTO::new(err.to_string()))
        }
        Err(err) => HttpResponse::InternalServerError().json(ErrorOutDTO::new(err.to_string())),
    }
}

async fn download_file(
    req: HttpRequest,
    state: web::Data<AppState>,
    filename: web::Path<String>,
) -> HttpResponse {
    let requested = filename.into_inner();
    let Some(path) = contained_path(&state.config.download_dir, &requested) else {
        tracing::warn!(requested = %requested, "Rejected download outside the download directory");
        return HttpResponse::BadRequest().json(ErrorOutDTO::new("Invalid file name"));
    };

    if !path.is_file() {
        return HttpResponse::NotFound().body("404 Not Found");
    }

    match NamedFile::open_async(&path).await {
        Ok(file) => file
            .set_content_disposition(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(requested)],
            })
            .into_response(&req),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            HttpResponse::NotFound().body("404 Not Found")
        }
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "Opening download failed");
            HttpResponse::InternalServerError().json(ErrorOutDTO::new(err.to_string()))
        }
    }
}

pub fn files_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/files").route(web::get().to(list_files)))
        .service(web::resource("/downloads/{filename:.*}").route(web::get().to(download_file)));
}
