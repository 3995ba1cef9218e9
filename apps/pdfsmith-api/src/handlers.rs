//! HTTP handlers for the PDF transform endpoints.

use axum::extract::multipart::{Field, Multipart};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::models::{ConvertTarget, WatermarkForm};

const PDF_CONTENT_TYPE: &str = "application/pdf";
const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Acknowledge an uploaded file without reading or storing its content.
pub async fn upload(mut multipart: Multipart) -> Result<String, ApiError> {
    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" || name == "files" {
            let file_name = field.file_name().unwrap_or("unnamed").to_string();
            let data = field_bytes(field).await?;

            tracing::info!(file = %file_name, bytes = data.len(), "upload acknowledged");
            return Ok(format!(
                "The file name {}, size {} uploaded successfully.",
                file_name,
                data.len()
            ));
        }
    }
    Err(ApiError::MissingFile("file"))
}

/// Merge every uploaded PDF, in form order, into one document.
pub async fn combine(mut multipart: Multipart) -> Result<Response, ApiError> {
    let mut sources: Vec<Vec<u8>> = Vec::new();
    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "files" || name == "files[]" {
            sources.push(field_bytes(field).await?);
        }
    }
    if sources.is_empty() {
        return Err(ApiError::MissingFile("files"));
    }

    let count = sources.len();
    let merged = pdfsmith_core::merge_documents(sources)?;

    tracing::info!(files = count, bytes = merged.len(), "documents combined");
    Ok(attachment(PDF_CONTENT_TYPE, "combined.pdf", merged))
}

/// Stamp translucent text on every page of the uploaded PDF.
pub async fn add_watermark(mut multipart: Multipart) -> Result<Response, ApiError> {
    let mut file: Option<Vec<u8>> = None;
    let mut form = WatermarkForm::default();

    while let Some(field) = next_field(&mut multipart).await? {
        match field.name().unwrap_or_default().to_string().as_str() {
            "file" => file = Some(field_bytes(field).await?),
            "watermarkText" => form.set_text(field_text(field).await?),
            "fontSize" => form.set_font_size(&field_text(field).await?)?,
            "rotation" => form.set_rotation(&field_text(field).await?)?,
            _ => {}
        }
    }

    let bytes = file.ok_or(ApiError::MissingFile("file"))?;
    let spec = form.into_spec();
    let stamped = pdfsmith_core::apply_watermark(&bytes, &spec)?;

    tracing::info!(
        text = %spec.text,
        bytes_in = bytes.len(),
        bytes_out = stamped.len(),
        "watermark applied"
    );
    Ok(attachment(PDF_CONTENT_TYPE, "watermarked.pdf", stamped))
}

/// Convert the uploaded PDF to a DOCX (extracted text) or a zip of page
/// rasters, selected by the `fileType` field.
pub async fn convert(mut multipart: Multipart) -> Result<Response, ApiError> {
    let mut file: Option<Vec<u8>> = None;
    let mut target = ConvertTarget::default();

    while let Some(field) = next_field(&mut multipart).await? {
        match field.name().unwrap_or_default().to_string().as_str() {
            "file" => file = Some(field_bytes(field).await?),
            "fileType" => {
                target = field_text(field)
                    .await?
                    .parse()
                    .map_err(ApiError::InvalidField)?;
            }
            _ => {}
        }
    }

    let bytes = file.ok_or(ApiError::MissingFile("file"))?;
    match target {
        ConvertTarget::Docx => {
            let docx = pdfsmith_core::pdf_to_docx(&bytes)?;
            tracing::info!(bytes_in = bytes.len(), bytes_out = docx.len(), "converted to docx");
            Ok(attachment(DOCX_CONTENT_TYPE, "word.docx", docx))
        }
        ConvertTarget::Png => {
            let archive = pdfsmith_core::rasterize_to_archive(&bytes)?;
            tracing::info!(
                bytes_in = bytes.len(),
                bytes_out = archive.len(),
                "converted to png archive"
            );
            Ok(attachment(ZIP_CONTENT_TYPE, "images.zip", archive))
        }
    }
}

async fn next_field(multipart: &mut Multipart) -> Result<Option<Field<'_>>, ApiError> {
    multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidField(format!("reading multipart field: {e}")))
}

async fn field_bytes(field: Field<'_>) -> Result<Vec<u8>, ApiError> {
    let name = field.name().unwrap_or_default().to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::InvalidField(format!("reading part {name}: {e}")))?;
    Ok(bytes.to_vec())
}

async fn field_text(field: Field<'_>) -> Result<String, ApiError> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map_err(|e| ApiError::InvalidField(format!("reading part {name}: {e}")))
}

fn attachment(content_type: &'static str, filename: &str, body: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        body,
    )
        .into_response()
}
