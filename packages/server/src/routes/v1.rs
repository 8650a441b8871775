use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{event, image, wish};
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/wishes", wish_routes())
        .nest("/images", image_routes())
        .nest("/event", event_routes())
}

fn wish_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(wish::list_wishes, wish::create_wish))
        .routes(routes!(wish::list_my_wishes))
        .routes(routes!(wish::update_wish, wish::delete_wish))
        .routes(routes!(wish::set_wish_approval))
}

fn image_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(image::create_image, image::list_images))
        .routes(routes!(image::delete_image))
}

fn event_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(event::get_event))
        .routes(routes!(event::get_schedule))
        .routes(routes!(event::get_guests))
        .routes(routes!(event::get_countdown))
}
