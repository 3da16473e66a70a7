use actix_web::web;

pub mod backend_health;
pub mod events;
pub mod matches;
pub mod sports;
pub mod teams;
pub mod users;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(backend_health::backend_health);

    sports::init_sport_routes(cfg);
    teams::init_team_routes(cfg);
    events::init_event_routes(cfg);
    matches::init_match_routes(cfg);
    users::init_user_routes(cfg);
}
