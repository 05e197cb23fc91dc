use actix_web::{
    HttpResponse,
    web::{self, Json, Path},
};
use serde::Deserialize;

use crate::adapter::api::{ApiError, ApiResponse};
use crate::core::{RegistryError, time::DateTime};
use crate::device::{DeviceCategory, DeviceClient, DeviceUpdate, NewDevice, Schedule};

pub fn routes() -> actix_web::Scope {
    web::scope("/devices")
        .route("", web::get().to(list_devices))
        .route("", web::post().to(add_device))
        .route("/{id}", web::get().to(get_device))
        .route("/{id}", web::patch().to(update_device))
        .route("/{id}", web::delete().to(delete_device))
        .route("/{id}/toggle", web::post().to(toggle_device))
        .route("/{id}/schedules", web::post().to(add_schedule))
        .route("/{id}/schedules/{index}", web::delete().to(remove_schedule))
        .route("/{id}/category", web::put().to(update_category))
        .route("/{id}/usage", web::get().to(get_usage))
}

pub fn analytics_routes() -> actix_web::Scope {
    web::scope("/analytics").route("/categories", web::get().to(get_usage_by_category))
}

#[derive(Debug, Deserialize)]
struct CategoryDto {
    category: DeviceCategory,
}

async fn list_devices(devices: web::Data<DeviceClient>) -> HttpResponse {
    HttpResponse::Ok().json(devices.list())
}

async fn get_device(devices: web::Data<DeviceClient>, id: Path<String>) -> ApiResponse {
    let device = devices.get(&id).ok_or_else(|| RegistryError::NotFound {
        kind: "device",
        id: id.into_inner(),
    })?;

    Ok(HttpResponse::Ok().json(device))
}

async fn add_device(devices: web::Data<DeviceClient>, Json(new_device): Json<NewDevice>) -> ApiResponse {
    if new_device.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Device name must not be empty".to_owned()));
    }

    let device = devices.add(new_device).await?;
    Ok(HttpResponse::Created().json(device))
}

async fn update_device(
    devices: web::Data<DeviceClient>,
    id: Path<String>,
    Json(update): Json<DeviceUpdate>,
) -> ApiResponse {
    Ok(HttpResponse::Ok().json(devices.update(&id, update).await?))
}

async fn delete_device(devices: web::Data<DeviceClient>, id: Path<String>) -> ApiResponse {
    devices.delete(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn toggle_device(devices: web::Data<DeviceClient>, id: Path<String>) -> ApiResponse {
    Ok(HttpResponse::Ok().json(devices.toggle(&id).await?))
}

async fn add_schedule(devices: web::Data<DeviceClient>, id: Path<String>, Json(schedule): Json<Schedule>) -> ApiResponse {
    Ok(HttpResponse::Ok().json(devices.add_schedule(&id, schedule).await?))
}

async fn remove_schedule(devices: web::Data<DeviceClient>, path: Path<(String, usize)>) -> ApiResponse {
    let (id, index) = path.into_inner();
    Ok(HttpResponse::Ok().json(devices.remove_schedule(&id, index).await?))
}

async fn update_category(
    devices: web::Data<DeviceClient>,
    id: Path<String>,
    Json(dto): Json<CategoryDto>,
) -> ApiResponse {
    Ok(HttpResponse::Ok().json(devices.update_category(&id, dto.category).await?))
}

async fn get_usage(devices: web::Data<DeviceClient>, id: Path<String>) -> ApiResponse {
    Ok(HttpResponse::Ok().json(devices.usage(&id, DateTime::now())?))
}

async fn get_usage_by_category(devices: web::Data<DeviceClient>) -> HttpResponse {
    HttpResponse::Ok().json(devices.usage_by_category(DateTime::now()))
}
