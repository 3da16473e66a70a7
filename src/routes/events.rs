use actix_web::web;

use crate::handlers::event_handler;

pub fn init_event_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/events")
            .route(web::get().to(event_handler::list_events))
            .route(web::post().to(event_handler::create_event)),
    )
    .service(
        web::resource("/events/{id}")
            .route(web::get().to(event_handler::get_event_by_id))
            .route(web::patch().to(event_handler::update_event))
            .route(web::delete().to(event_handler::delete_event)),
    )
    .service(
        web::resource("/events/{id}/registrations")
            .route(web::post().to(event_handler::register_team)),
    )
    .service(
        web::resource("/events/{event_id}/registrations/{registration_id}")
            .route(web::patch().to(event_handler::update_registration)),
    );
}
