use actix_web::web;

use crate::handlers::match_handler;

pub fn init_match_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/matches")
            .route(web::get().to(match_handler::list_matches))
            .route(web::post().to(match_handler::create_match)),
    )
    .service(
        web::resource("/matches/{id}")
            .route(web::get().to(match_handler::get_match_by_id))
            .route(web::patch().to(match_handler::update_match))
            .route(web::delete().to(match_handler::delete_match)),
    );
}
