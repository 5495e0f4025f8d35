use actix_web::{HttpResponse, http::header, web};
use anyhow::anyhow;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::pdf::{DEFAULT_TEXT, render_arabic_pdf};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PdfQuery {
    /// Arabic text to render; a fixed greeting when empty
    pub text: Option<String>,
}

/// Renders Arabic text into a downloadable single-page PDF.
#[utoipa::path(
    get,
    path = "/api/pdf/arabic",
    params(PdfQuery),
    responses(
        (status = 200, description = "PDF document (application/pdf attachment)"),
        (status = 500, description = "Font unavailable or rendering failed")
    ),
    security(("bearer_auth" = [])),
    tag = "PDF"
)]
pub async fn arabic_pdf(
    _auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<PdfQuery>,
) -> Result<HttpResponse, AppError> {
    let font = state
        .pdf_font
        .clone()
        .ok_or_else(|| anyhow!("PDF font is not loaded"))?;

    let text = query
        .into_inner()
        .text
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TEXT.to_string());

    let bytes = web::block(move || render_arabic_pdf(&text, &font))
        .await
        .map_err(|e| anyhow!("PDF rendering task failed: {e}"))??;

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"arabic.pdf\"",
        ))
        .body(bytes))
}
