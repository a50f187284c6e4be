use actix_web::http::header::ContentType;
use actix_web::web::ServiceConfig;
use actix_web::HttpResponse;
use derive_more::{Display, Error};

use crate::parser::ParseError;

pub mod image_proxy;
pub mod product;

pub type Response = Result<HttpResponse, ControllerError>;

#[derive(Debug, Display, Error)]
pub enum ControllerError {
    #[error(ignore)]
    #[display("{_0}")]
    InvalidInput(String),
    #[error(ignore)]
    #[display("{message}: {cause}")]
    Upstream {
        message: String,
        cause: anyhow::Error,
    },
    #[error(ignore)]
    InternalServerError(anyhow::Error),
}

impl ControllerError {
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Message sent to the client, without internal causes.
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidInput(msg) => msg.clone(),
            Self::Upstream { message, .. } => message.clone(),
            Self::InternalServerError(_) => "Internal server error".to_string(),
        }
    }
}

impl From<anyhow::Error> for ControllerError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalServerError(err)
    }
}

impl From<ParseError> for ControllerError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnsupportedFormat(_) => Self::invalid_input(product::UNSUPPORTED_FORMAT),
            err => Self::InvalidInput(format!("Error processing file: {err}")),
        }
    }
}

impl actix_web::error::ResponseError for ControllerError {
    fn error_response(&self) -> HttpResponse {
        log::warn!("{self}");
        let mut res = match self {
            Self::InvalidInput(_) => HttpResponse::BadRequest(),
            Self::Upstream { .. } | Self::InternalServerError(_) => {
                HttpResponse::InternalServerError()
            }
        };
        res.content_type(ContentType::plaintext())
            .body(self.public_message())
    }
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(image_proxy::fetch_image)
        .service(product::bulk_upload)
        .service(product::bulk_preview);
}
