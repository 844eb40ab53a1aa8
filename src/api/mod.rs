pub mod attendee;
pub mod check_in;
pub mod slot;
pub mod statistics;
pub mod volunteer;

use actix_web::HttpResponse;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};

use crate::sheet::XLSX_CONTENT_TYPE;

/// Serve generated workbook bytes as a download
pub(crate) fn xlsx_response(bytes: Vec<u8>, filename: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename.to_string())],
        })
        .body(bytes)
}
