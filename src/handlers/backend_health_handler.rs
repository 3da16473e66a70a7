use actix_web::{HttpResponse, Responder};

pub async fn backend_health_check() -> impl Responder {
    HttpResponse::Ok().finish()
}
