use actix_files::{Files, NamedFile};
use actix_multipart::Multipart;
use actix_web::{web, Error, HttpResponse};
use futures::{StreamExt, TryStreamExt};
use log::{error, info};
use shared::{BackendStatus, DetectResponse, ErrorResponse};
use std::path::PathBuf;

use crate::analyzer::Analyzer;
use crate::upload::{allowed_file, storage_filename, unique_stored_name};

/// Shell-side settings the handlers need.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub model_path: PathBuf,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: PathBuf) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/detect").route(web::post().to(detect)))
        .service(web::resource("/api/status").route(web::get().to(status)))
        .service(Files::new("/static", static_dir));
}

fn rejection(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: message.to_string(),
    })
}

async fn index(settings: web::Data<UploadSettings>) -> actix_web::Result<NamedFile> {
    Ok(NamedFile::open(settings.static_dir.join("index.html"))?)
}

async fn status(
    analyzer: web::Data<Analyzer>,
    settings: web::Data<UploadSettings>,
) -> HttpResponse {
    HttpResponse::Ok().json(BackendStatus {
        mode: analyzer.mode(),
        model_path: settings.model_path.display().to_string(),
    })
}

async fn detect(
    analyzer: web::Data<Analyzer>,
    settings: web::Data<UploadSettings>,
    mut payload: Multipart,
) -> Result<HttpResponse, Error> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = payload.try_next().await? {
        let disposition = field.content_disposition().cloned();
        let is_file = disposition
            .as_ref()
            .and_then(|cd| cd.get_name())
            .is_some_and(|name| name == "file");
        if !is_file || upload.is_some() {
            while field.try_next().await?.is_some() {}
            continue;
        }

        let filename = disposition
            .as_ref()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();
        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if data.len() + chunk.len() > settings.max_upload_bytes {
                return Ok(HttpResponse::PayloadTooLarge().json(ErrorResponse {
                    error: "File too large".into(),
                }));
            }
            data.extend_from_slice(&chunk);
        }
        upload = Some((filename, data));
    }

    let Some((original_name, data)) = upload else {
        return Ok(rejection("No file part"));
    };
    if original_name.is_empty() {
        return Ok(rejection("No selected file"));
    }
    if !allowed_file(&original_name) {
        return Ok(rejection("Invalid file type"));
    }
    let Some(filename) = storage_filename(&original_name) else {
        return Ok(rejection("Invalid file type"));
    };

    let stored_filename = unique_stored_name(&filename);
    let upload_dir = settings.upload_dir.clone();
    let filepath = upload_dir.join(&stored_filename);
    info!("Received {} ({} bytes) -> {}", original_name, data.len(), filepath.display());

    let analyzer = analyzer.clone();
    let outcome = web::block(move || -> std::io::Result<_> {
        std::fs::create_dir_all(&upload_dir)?;
        std::fs::write(&filepath, &data)?;
        Ok(analyzer.analyze(&filepath))
    })
    .await?;

    let result = outcome.map_err(|e| {
        error!("Failed to store upload {}: {:?}", filename, e);
        actix_web::error::ErrorInternalServerError("Failed to store upload")
    })?;

    Ok(HttpResponse::Ok().json(DetectResponse {
        status: "success".into(),
        filename,
        stored_filename,
        result,
    }))
}
