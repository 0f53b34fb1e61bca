use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{admin, auth, course};
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .merge(course_routes())
        .nest("/admin", admin_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::register))
        .routes(routes!(auth::login))
        .routes(routes!(auth::me))
}

fn course_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(course::list_courses))
        .routes(routes!(course::get_course))
        .routes(routes!(course::choosable_terms))
        .routes(routes!(course::join_course, course::leave_course))
        .routes(routes!(course::get_selections, course::submit_selections))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(admin::list_students))
        .routes(routes!(admin::reset_student))
        .routes(routes!(admin::promote_student))
        .routes(routes!(admin::demote_student))
        .routes(routes!(admin::delete_course))
        .routes(routes!(admin::list_terms))
        .routes(routes!(admin::delete_term))
        .routes(routes!(admin::import_schedule))
        .routes(routes!(
            admin::list_unavailable_terms,
            admin::create_unavailable_terms
        ))
        .routes(routes!(
            admin::get_unavailable_terms,
            admin::update_unavailable_terms
        ))
        .routes(routes!(admin::get_settings, admin::update_settings))
}
