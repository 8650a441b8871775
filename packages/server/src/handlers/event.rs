use axum::Json;
use axum::extract::State;
use tracing::instrument;
use vivah_common::event::{Countdown, EventDetails, RsvpList, ScheduleDay};

use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Event",
    operation_id = "getEvent",
    summary = "Event details",
    description = "Title, couple, start instant and venue.",
    responses(
        (status = 200, description = "Event details", body = EventDetails),
    ),
)]
#[instrument(skip(state))]
pub async fn get_event(State(state): State<AppState>) -> Json<EventDetails> {
    Json(state.content.event.clone())
}

#[utoipa::path(
    get,
    path = "/schedule",
    tag = "Event",
    operation_id = "getSchedule",
    summary = "Event schedule",
    responses(
        (status = 200, description = "Schedule grouped by day", body = Vec<ScheduleDay>),
    ),
)]
#[instrument(skip(state))]
pub async fn get_schedule(State(state): State<AppState>) -> Json<Vec<ScheduleDay>> {
    Json(state.content.schedule.clone())
}

#[utoipa::path(
    get,
    path = "/guests",
    tag = "Event",
    operation_id = "getGuests",
    summary = "RSVP list",
    description = "Confirmed guests split into the groom's and the bride's side.",
    responses(
        (status = 200, description = "RSVP list", body = RsvpList),
    ),
)]
#[instrument(skip(state))]
pub async fn get_guests(State(state): State<AppState>) -> Json<RsvpList> {
    Json(state.content.rsvp.clone())
}

#[utoipa::path(
    get,
    path = "/countdown",
    tag = "Event",
    operation_id = "getCountdown",
    summary = "Time until the event starts",
    responses(
        (status = 200, description = "Countdown", body = Countdown),
    ),
)]
#[instrument(skip(state))]
pub async fn get_countdown(State(state): State<AppState>) -> Json<Countdown> {
    Json(Countdown::until(
        state.content.event.starts_at,
        chrono::Utc::now(),
    ))
}
