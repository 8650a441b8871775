use sea_orm::EntityTrait;
use serde_json::json;
use uuid::Uuid;

use vivah_server::entity::uploaded_image;

use crate::common::{TestApp, routes};

mod recording {
    use super::*;

    #[tokio::test]
    async fn owner_is_always_the_caller() {
        let app = TestApp::spawn().await;
        let token = app.token("user_alice");

        let res = app
            .post(
                routes::IMAGES,
                &json!({
                    "image_url": "https://res.cloudinary.com/test/image/upload/v1/gallery/abc.jpg",
                    "public_id": "gallery/abc",
                    "original_name": "abc.jpg",
                    "user_id": "user_someone_else",
                }),
                Some(&token),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["image"]["user_id"], "user_alice");
        assert_eq!(
            res.body["image"]["thumbnail_url"],
            "https://res.cloudinary.com/test/image/upload/\
             c_fill,g_auto,w_400,h_400,q_auto:low,f_auto,dpr_auto/v1/gallery/abc.jpg"
        );
    }

    #[tokio::test]
    async fn missing_required_fields_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app.token("user_alice");

        let res = app
            .post(
                routes::IMAGES,
                &json!({"image_url": "https://cdn/x.jpg", "original_name": "x.jpg"}),
                Some(&token),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::IMAGES,
                &json!({"image_url": "u", "public_id": "p", "original_name": "n"}),
                None,
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn same_public_id_twice_conflicts() {
        let app = TestApp::spawn().await;
        let token = app.token("user_alice");
        app.create_image("gallery/dup", &token).await;

        let res = app
            .post(
                routes::IMAGES,
                &json!({"image_url": "u", "public_id": "gallery/dup", "original_name": "n"}),
                Some(&token),
            )
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");

        let listed = app.get(routes::IMAGES, Some(&token)).await;
        assert_eq!(listed.body["count"], 1);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn user_only_restricts_to_the_caller() {
        let app = TestApp::spawn().await;
        let alice = app.token("user_alice");
        let bob = app.token("user_bob");
        app.create_image("gallery/a1", &alice).await;
        app.create_image("gallery/a2", &alice).await;
        app.create_image("gallery/b1", &bob).await;

        let res = app
            .get(&format!("{}?user_only=true", routes::IMAGES), Some(&alice))
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["count"], 2);
        assert_eq!(res.body["images"][0]["public_id"], "gallery/a2");

        let res = app
            .get(&format!("{}?user_only=false", routes::IMAGES), Some(&alice))
            .await;
        assert_eq!(res.body["count"], 3);
    }

    #[tokio::test]
    async fn gallery_lists_every_guest_by_default() {
        let app = TestApp::spawn().await;
        let alice = app.token("user_alice");
        let bob = app.token("user_bob");
        app.create_image("gallery/a1", &alice).await;
        app.create_image("gallery/b1", &bob).await;

        let res = app.get(routes::IMAGES, Some(&alice)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["count"], 2);
        assert_eq!(res.body["images"][0]["user_id"], "user_bob");
    }

    #[tokio::test]
    async fn oversized_offset_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.token("user_alice");

        let res = app
            .get(&format!("{}?offset={}", routes::IMAGES, u64::MAX), Some(&token))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn limit_caps_the_page() {
        let app = TestApp::spawn().await;
        let token = app.token("user_alice");
        for i in 0..3 {
            app.create_image(&format!("gallery/{i}"), &token).await;
        }

        let res = app
            .get(&format!("{}?limit=2", routes::IMAGES), Some(&token))
            .await;
        assert_eq!(res.body["count"], 2);
        assert_eq!(res.body["images"].as_array().unwrap().len(), 2);
    }
}

mod deleting {
    use super::*;

    #[tokio::test]
    async fn owner_delete_soft_deletes_and_destroys_on_the_cdn() {
        let app = TestApp::spawn().await;
        let token = app.token("user_alice");
        let id = app.create_image("gallery/bye", &token).await;

        let res = app.delete(&routes::image(&id), &token).await;
        assert_eq!(res.status, 204, "{}", res.text);
        assert_eq!(app.destroyed(), vec!["gallery/bye".to_string()]);

        let row = uploaded_image::Entity::find_by_id(Uuid::parse_str(&id).unwrap())
            .one(&app.db)
            .await
            .unwrap()
            .expect("row should still exist");
        assert!(row.is_deleted);

        let list = app.get(routes::IMAGES, Some(&token)).await;
        assert_eq!(list.body["count"], 0);
    }

    #[tokio::test]
    async fn other_users_image_reports_not_found() {
        let app = TestApp::spawn().await;
        let alice = app.token("user_alice");
        let bob = app.token("user_bob");
        let id = app.create_image("gallery/alice", &alice).await;

        let res = app.delete(&routes::image(&id), &bob).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
        assert!(app.destroyed().is_empty());
    }

    #[tokio::test]
    async fn moderators_get_no_override_for_images() {
        let app = TestApp::spawn().await;
        let alice = app.token("user_alice");
        let admin = app.token_with_role("user_admin", Some("admin"));
        let id = app.create_image("gallery/alice", &alice).await;

        let res = app.delete(&routes::image(&id), &admin).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn cdn_failure_does_not_fail_the_delete() {
        let app = TestApp::spawn_with_failing_cdn().await;
        let token = app.token("user_alice");
        let id = app.create_image("gallery/stuck", &token).await;

        let res = app.delete(&routes::image(&id), &token).await;
        assert_eq!(res.status, 204);
        assert_eq!(app.destroyed(), vec!["gallery/stuck".to_string()]);

        let again = app.delete(&routes::image(&id), &token).await;
        assert_eq!(again.status, 404);
    }
}
