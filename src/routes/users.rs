use actix_web::web;

use crate::handlers::user_handler;

pub fn init_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/users")
            .route(web::get().to(user_handler::list_users))
            .route(web::post().to(user_handler::create_user)),
    );
}
