// src/web/mod.rs
//! Stub analysis service speaking the same HTTP contract as the real one

pub mod fixtures;
pub mod store;
pub mod types;

pub use store::AnalysisStore;
pub use types::{ResumeUploadForm, StoredAnalysis};

use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::figment::Figment;
use rocket::form::Form;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use tracing::{info, warn};
use uuid::Uuid;

use crate::types::analysis::AnalysisRecord;
use crate::types::response::{ErrorBody, HistoryEntry};
use crate::utils::{base_file_name, validate_file_extension};

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "doc"];
pub const MAX_UPLOAD_MIB: u64 = 16;

type ApiError = (Status, Json<ErrorBody>);

fn api_error(status: Status, message: impl Into<String>, code: &str) -> ApiError {
    (status, Json(ErrorBody::new(message, code)))
}

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[post("/upload", data = "<upload>")]
pub async fn upload_resume(
    upload: Form<ResumeUploadForm<'_>>,
    store: &State<AnalysisStore>,
) -> Result<Json<AnalysisRecord>, ApiError> {
    let file = upload.into_inner().into_file().ok_or_else(|| {
        api_error(Status::BadRequest, "No file part in the request", "NO_FILE")
    })?;

    let filename = file
        .raw_name()
        .map(|name| base_file_name(name.dangerous_unsafe_unsanitized_raw().as_str()).trim())
        .unwrap_or_default()
        .to_string();

    if filename.is_empty() {
        return Err(api_error(Status::BadRequest, "No selected file", "NO_FILE"));
    }

    if let Err(e) = validate_file_extension(&filename, &ALLOWED_EXTENSIONS) {
        warn!("Rejected upload {}: {}", filename, e);
        return Err(api_error(
            Status::BadRequest,
            format!("File type not allowed. {}", e),
            "INVALID_FORMAT",
        ));
    }

    let id = Uuid::new_v4().to_string();
    let record = fixtures::fixture_record(&id, &filename);
    store.insert(&id, &filename, record.clone()).await;

    info!("Analyzed {} ({} bytes) as {}", filename, file.len(), id);
    Ok(Json(record))
}

#[get("/analysis/<id>")]
pub async fn get_analysis(
    id: &str,
    store: &State<AnalysisStore>,
) -> Result<Json<AnalysisRecord>, ApiError> {
    store.get(id).await.map(Json).ok_or_else(|| {
        api_error(
            Status::NotFound,
            format!("Analysis {} not found", id),
            "NOT_FOUND",
        )
    })
}

#[get("/history")]
pub async fn get_history(store: &State<AnalysisStore>) -> Json<Vec<HistoryEntry>> {
    Json(store.history().await)
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorBody> {
    Json(ErrorBody::new("Invalid request format", "BAD_REQUEST"))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<ErrorBody> {
    Json(ErrorBody::new("Resource not found", "NOT_FOUND"))
}

#[rocket::catch(413)]
pub fn payload_too_large() -> Json<ErrorBody> {
    Json(ErrorBody::new(
        format!("File size exceeds {}MB limit", MAX_UPLOAD_MIB),
        "FILE_TOO_LARGE",
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<ErrorBody> {
    Json(ErrorBody::new("Malformed upload form", "BAD_REQUEST"))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorBody> {
    Json(ErrorBody::new("Internal server error", "INTERNAL_ERROR"))
}

/// Rocket configuration for the stub: loopback address, upload limits
pub fn stub_figment(port: u16) -> Figment {
    let limits = Limits::default()
        .limit("file", MAX_UPLOAD_MIB.mebibytes())
        .limit("data-form", (MAX_UPLOAD_MIB + 1).mebibytes());

    rocket::Config::figment()
        .merge(("address", "127.0.0.1"))
        .merge(("port", port))
        .merge(("limits", limits))
}

pub fn stub_rocket(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(Cors)
        .manage(AnalysisStore::new())
        .register(
            "/",
            catchers![
                bad_request,
                not_found,
                payload_too_large,
                unprocessable,
                internal_error
            ],
        )
        .mount(
            "/api",
            routes![upload_resume, get_analysis, get_history, options],
        )
}

// Main server start function
pub async fn start_stub_server(port: u16) -> Result<()> {
    info!("Starting stub analysis service on http://127.0.0.1:{}", port);
    info!("Accepted upload types: {}", ALLOWED_EXTENSIONS.join(", "));

    stub_rocket(stub_figment(port))
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Stub analysis service failed: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;

    const BOUNDARY: &str = "X-RESUME-BOUNDARY";

    fn multipart(field: &str, filename: &str, body: &str) -> String {
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n{body}\r\n--{b}--\r\n",
            b = BOUNDARY,
            field = field,
            filename = filename,
            body = body
        )
    }

    async fn client() -> Client {
        let figment = stub_figment(0).merge(("log_level", "off"));
        Client::tracked(stub_rocket(figment))
            .await
            .expect("valid rocket instance")
    }

    async fn upload(client: &Client, field: &str, filename: &str) -> (Status, serde_json::Value) {
        let response = client
            .post("/api/upload")
            .header(Header::new(
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .body(multipart(field, filename, "%PDF-1.4 fake"))
            .dispatch()
            .await;
        let status = response.status();
        let body = response.into_json::<serde_json::Value>().await.unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_upload_then_fetch_and_history() {
        let client = client().await;

        let (status, body) = upload(&client, "file", "jane_doe.pdf").await;
        assert_eq!(status, Status::Ok);
        let id = body["resume_id"].as_str().unwrap().to_string();
        assert_eq!(body["id"], body["resume_id"]);
        assert_eq!(body["personal_data"]["name"], "Jane Doe");

        let response = client.get(format!("/api/analysis/{}", id)).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let record: AnalysisRecord = response.into_json().await.unwrap();
        assert_eq!(record.identifier(), Some(id.as_str()));

        let (status, _) = upload(&client, "resume", "ivan.docx").await;
        assert_eq!(status, Status::Ok);

        let history: Vec<HistoryEntry> = client
            .get("/api/history")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].filename.as_deref(), Some("ivan.docx"));
        assert_eq!(history[1].id.as_deref(), Some(id.as_str()));
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_extension() {
        let client = client().await;
        let (status, body) = upload(&client, "file", "notes.txt").await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().contains("not allowed"));
    }

    #[tokio::test]
    async fn test_upload_without_file_part() {
        let client = client().await;
        let (status, body) = upload(&client, "attachment", "jane.pdf").await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body["error_code"], "NO_FILE");
    }

    #[tokio::test]
    async fn test_unknown_analysis_is_json_404() {
        let client = client().await;
        let response = client.get("/api/analysis/does-not-exist").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.content_type(), Some(ContentType::JSON));
        let body: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(body.status, "error");
    }

    #[tokio::test]
    async fn test_cors_headers_and_preflight() {
        let client = client().await;
        let response = client.options("/api/upload").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some("*")
        );
    }
}
