mod device;
mod energy;
mod profile;
mod room;

use actix_web::{HttpResponse, ResponseError, http::StatusCode, web};
use derive_more::derive::{Display, Error};

use crate::{
    core::RegistryError, device::DeviceClient, meter::MeterClient, profile::ProfileClient, profile::ProfileError,
    room::RoomClient,
};

type ApiResponse = Result<HttpResponse, ApiError>;

pub fn routes(meter: MeterClient, devices: DeviceClient, rooms: RoomClient, profile: ProfileClient) -> actix_web::Scope {
    web::scope("/api")
        .app_data(web::Data::new(meter))
        .app_data(web::Data::new(devices))
        .app_data(web::Data::new(rooms))
        .app_data(web::Data::new(profile))
        .service(energy::routes())
        .service(device::routes())
        .service(device::analytics_routes())
        .service(room::routes())
        .service(profile::routes())
}

#[derive(Debug, Display, Error)]
enum ApiError {
    #[display("{_0}")]
    NotFound(#[error(not(source))] String),

    #[display("{_0}")]
    BadRequest(#[error(not(source))] String),

    #[display("Internal error")]
    Internal(#[error(not(source))] anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        if let Some(registry_error) = e.downcast_ref::<RegistryError>() {
            return registry_error.clone().into();
        }

        if let Some(profile_error) = e.downcast_ref::<ProfileError>() {
            return ApiError::BadRequest(profile_error.to_string());
        }

        ApiError::Internal(e)
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        ApiError::NotFound(e.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Internal(e) => tracing::error!("Error handling API request: {:?}", e),
            _ => tracing::debug!("Rejected API request: {}", self),
        }

        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": self.to_string() }))
    }
}
