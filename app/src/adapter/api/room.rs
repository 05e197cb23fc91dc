use actix_web::{
    HttpResponse,
    web::{self, Json, Path},
};

use crate::adapter::api::{ApiError, ApiResponse};
use crate::core::RegistryError;
use crate::room::{NewRoom, RoomClient, RoomUpdate};

pub fn routes() -> actix_web::Scope {
    web::scope("/rooms")
        .route("", web::get().to(list_rooms))
        .route("", web::post().to(add_room))
        .route("/{id}", web::get().to(get_room))
        .route("/{id}", web::patch().to(update_room))
        .route("/{id}", web::delete().to(delete_room))
}

async fn list_rooms(rooms: web::Data<RoomClient>) -> HttpResponse {
    HttpResponse::Ok().json(rooms.list())
}

async fn get_room(rooms: web::Data<RoomClient>, id: Path<String>) -> ApiResponse {
    let room = rooms.get(&id).ok_or_else(|| RegistryError::NotFound {
        kind: "room",
        id: id.into_inner(),
    })?;

    Ok(HttpResponse::Ok().json(room))
}

async fn add_room(rooms: web::Data<RoomClient>, Json(new_room): Json<NewRoom>) -> ApiResponse {
    if new_room.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Room name must not be empty".to_owned()));
    }

    Ok(HttpResponse::Created().json(rooms.add(new_room).await?))
}

async fn update_room(rooms: web::Data<RoomClient>, id: Path<String>, Json(update): Json<RoomUpdate>) -> ApiResponse {
    Ok(HttpResponse::Ok().json(rooms.update(&id, update).await?))
}

async fn delete_room(rooms: web::Data<RoomClient>, id: Path<String>) -> ApiResponse {
    rooms.delete(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}
