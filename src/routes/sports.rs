use actix_web::web;

use crate::handlers::sport_handler;

pub fn init_sport_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/sports")
            .route(web::get().to(sport_handler::list_sports))
            .route(web::post().to(sport_handler::create_sport)),
    )
    .service(
        web::resource("/sports/{id}")
            .route(web::get().to(sport_handler::get_sport_by_id))
            .route(web::patch().to(sport_handler::update_sport))
            .route(web::delete().to(sport_handler::delete_sport)),
    );
}
