use crate::common::{TestApp, routes};

#[tokio::test]
async fn event_content_is_public() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::EVENT, None).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["venue"]["name"], "Kadva Patel Samaj");

    let res = app.get(routes::SCHEDULE, None).await;
    let days = res.body.as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["items"][0]["title"], "Ring Ceremony");

    let res = app.get(routes::GUESTS, None).await;
    assert!(!res.body["groom"].as_array().unwrap().is_empty());
    assert!(!res.body["bride"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn countdown_reports_started_for_past_events() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::COUNTDOWN, None).await;
    assert_eq!(res.status, 200);
    // The bundled event date is in the past.
    assert_eq!(res.body["started"], true);
    assert_eq!(res.body["days"], 0);
}

#[tokio::test]
async fn openapi_document_lists_the_routes() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::OPENAPI, None).await;
    assert_eq!(res.status, 200);
    let paths = res.body["paths"].as_object().unwrap();
    assert!(paths.keys().any(|p| p.contains("/api/v1/wishes/{id}/approval")));
    assert!(paths.keys().any(|p| p.contains("/api/v1/images/{id}")));
    assert!(res.body["components"]["securitySchemes"]["jwt"].is_object());
}
