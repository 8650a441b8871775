use serde_json::json;

use crate::common::{TestApp, routes};

mod creating {
    use super::*;

    #[tokio::test]
    async fn anonymous_guest_can_post_a_wish() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::WISHES,
                &json!({"text": "Congratulations!", "author": "Auntie Meera"}),
                None,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["wish"]["text"], "Congratulations!");
        assert!(res.body["wish"]["user_id"].is_null());
        assert_eq!(res.body["wish"]["is_approved"], true);
    }

    #[tokio::test]
    async fn signed_in_wish_is_linked_to_the_caller() {
        let app = TestApp::spawn().await;
        let token = app.token("user_alice");

        let res = app
            .post(
                routes::WISHES,
                &json!({
                    "text": "  Best wishes  ",
                    "author": "Alice",
                    "image_url": "https://res.cloudinary.com/test/image/upload/v1/best-wishes/a.jpg",
                    "image_filename": "a.jpg",
                    "image_size": 120_000,
                }),
                Some(&token),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["wish"]["user_id"], "user_alice");
        assert_eq!(res.body["wish"]["text"], "Best wishes");
        assert_eq!(res.body["wish"]["image_size"], 120_000);
    }

    #[tokio::test]
    async fn missing_text_or_author_is_rejected() {
        let app = TestApp::spawn().await;

        for body in [
            json!({"author": "Alice"}),
            json!({"text": "Hello"}),
            json!({"text": "   ", "author": "Alice"}),
            json!({}),
        ] {
            let res = app.post(routes::WISHES, &body, None).await;
            assert_eq!(res.status, 400, "body {body} gave {}", res.text);
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn overlong_text_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::WISHES,
                &json!({"text": "a".repeat(2001), "author": "Alice"}),
                None,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn malformed_json_gets_a_structured_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::WISHES, &json!({"text": 42, "author": "x"}), None)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn invalid_token_is_rejected_even_though_auth_is_optional() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::WISHES,
                &json!({"text": "Hi", "author": "Bob"}),
                Some("not-a-jwt"),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn list_returns_newest_first_and_hides_deleted() {
        let app = TestApp::spawn().await;
        let token = app.token("user_alice");

        let first = app.create_wish("First", "Alice", Some(&token)).await;
        let second = app.create_wish("Second", "Alice", Some(&token)).await;
        let gone = app.create_wish("Gone", "Alice", Some(&token)).await;
        assert_eq!(app.delete(&routes::wish(&gone), &token).await.status, 204);

        let res = app.get(routes::WISHES, None).await;
        assert_eq!(res.status, 200);
        let ids: Vec<&str> = res.body["wishes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|w| w["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec![second.as_str(), first.as_str()]);
    }

    #[tokio::test]
    async fn list_respects_limit_and_offset() {
        let app = TestApp::spawn().await;
        for i in 0..5 {
            app.create_wish(&format!("Wish {i}"), "Guest", None).await;
        }

        let res = app
            .get(&format!("{}?limit=2&offset=1", routes::WISHES), None)
            .await;
        let wishes = res.body["wishes"].as_array().unwrap();
        assert_eq!(wishes.len(), 2);
        assert_eq!(wishes[0]["text"], "Wish 3");
        assert_eq!(wishes[1]["text"], "Wish 2");
    }

    #[tokio::test]
    async fn offset_beyond_bigint_range_is_a_validation_error() {
        let app = TestApp::spawn().await;
        app.create_wish("Hello", "Guest", None).await;

        let res = app
            .get(&format!("{}?offset={}", routes::WISHES, u64::MAX), None)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unapproved_wishes_stay_off_the_wall_but_show_in_mine() {
        let app = TestApp::spawn_moderated().await;
        let token = app.token("user_alice");
        app.create_wish("Pending", "Alice", Some(&token)).await;

        let wall = app.get(routes::WISHES, None).await;
        assert!(wall.body["wishes"].as_array().unwrap().is_empty());

        let mine = app.get(routes::MY_WISHES, Some(&token)).await;
        assert_eq!(mine.status, 200);
        let mine = mine.body["wishes"].as_array().unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0]["is_approved"], false);
    }

    #[tokio::test]
    async fn mine_requires_a_token_and_only_returns_own_wishes() {
        let app = TestApp::spawn().await;
        let alice = app.token("user_alice");
        let bob = app.token("user_bob");
        app.create_wish("From Alice", "Alice", Some(&alice)).await;
        app.create_wish("From Bob", "Bob", Some(&bob)).await;
        app.create_wish("Anonymous", "Someone", None).await;

        let res = app.get(routes::MY_WISHES, None).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");

        let res = app.get(routes::MY_WISHES, Some(&bob)).await;
        let wishes = res.body["wishes"].as_array().unwrap();
        assert_eq!(wishes.len(), 1);
        assert_eq!(wishes[0]["text"], "From Bob");
    }
}

mod updating {
    use super::*;

    #[tokio::test]
    async fn owner_can_edit_and_clear_the_image() {
        let app = TestApp::spawn().await;
        let token = app.token("user_alice");
        let res = app
            .post(
                routes::WISHES,
                &json!({
                    "text": "Original",
                    "author": "Alice",
                    "image_url": "https://cdn/x.jpg",
                    "image_filename": "x.jpg",
                    "image_size": 10,
                }),
                Some(&token),
            )
            .await;
        let id = res.id();

        let res = app
            .patch(
                &routes::wish(&id),
                &json!({"text": "Edited", "image_url": null, "image_filename": null, "image_size": null}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["wish"]["text"], "Edited");
        assert_eq!(res.body["wish"]["author"], "Alice");
        assert!(res.body["wish"]["image_url"].is_null());
        assert!(res.body["wish"]["image_size"].is_null());
    }

    #[tokio::test]
    async fn non_owner_cannot_edit() {
        let app = TestApp::spawn().await;
        let alice = app.token("user_alice");
        let mallory = app.token("user_mallory");
        let id = app.create_wish("Mine", "Alice", Some(&alice)).await;

        let res = app
            .patch(&routes::wish(&id), &json!({"text": "Hacked"}), &mallory)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn anonymous_wishes_can_only_be_edited_by_moderators() {
        let app = TestApp::spawn().await;
        let guest = app.token("user_guest");
        let moderator = app.token_with_role("user_mod", Some("moderator"));
        let id = app.create_wish("Anonymous", "Someone", None).await;

        let res = app
            .patch(&routes::wish(&id), &json!({"text": "Mine now"}), &guest)
            .await;
        assert_eq!(res.status, 403);

        let res = app
            .patch(&routes::wish(&id), &json!({"text": "Cleaned up"}), &moderator)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["wish"]["text"], "Cleaned up");
    }

    #[tokio::test]
    async fn unknown_role_claims_get_no_moderation_rights() {
        let app = TestApp::spawn().await;
        let alice = app.token("user_alice");
        let pretender = app.token_with_role("user_eve", Some("superuser"));
        let id = app.create_wish("Mine", "Alice", Some(&alice)).await;

        let res = app
            .patch(&routes::wish(&id), &json!({"text": "x"}), &pretender)
            .await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn deleted_wish_cannot_be_updated() {
        let app = TestApp::spawn().await;
        let token = app.token("user_alice");
        let id = app.create_wish("Bye", "Alice", Some(&token)).await;
        app.delete(&routes::wish(&id), &token).await;

        let res = app
            .patch(&routes::wish(&id), &json!({"text": "Back"}), &token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn unknown_or_malformed_ids() {
        let app = TestApp::spawn().await;
        let token = app.token("user_alice");

        let res = app
            .patch(
                &routes::wish("0190a0b2-0000-7000-8000-000000000000"),
                &json!({"text": "x"}),
                &token,
            )
            .await;
        assert_eq!(res.status, 404);

        let res = app
            .patch(&routes::wish("not-a-uuid"), &json!({"text": "x"}), &token)
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn blank_text_in_update_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.token("user_alice");
        let id = app.create_wish("Hello", "Alice", Some(&token)).await;

        let res = app
            .patch(&routes::wish(&id), &json!({"text": "  "}), &token)
            .await;
        assert_eq!(res.status, 400);
    }
}

mod deleting {
    use super::*;

    #[tokio::test]
    async fn owner_deletes_once_then_gets_not_found() {
        let app = TestApp::spawn().await;
        let token = app.token("user_alice");
        let id = app.create_wish("Bye", "Alice", Some(&token)).await;

        assert_eq!(app.delete(&routes::wish(&id), &token).await.status, 204);
        assert_eq!(app.delete(&routes::wish(&id), &token).await.status, 404);
    }

    #[tokio::test]
    async fn non_owner_cannot_delete_but_admin_can() {
        let app = TestApp::spawn().await;
        let alice = app.token("user_alice");
        let bob = app.token("user_bob");
        let admin = app.token_with_role("user_admin", Some("admin"));
        let id = app.create_wish("Keep", "Alice", Some(&alice)).await;

        let res = app.delete(&routes::wish(&id), &bob).await;
        assert_eq!(res.status, 403);

        let res = app.delete(&routes::wish(&id), &admin).await;
        assert_eq!(res.status, 204);
    }
}

mod moderation {
    use super::*;

    #[tokio::test]
    async fn moderator_approves_a_pending_wish() {
        let app = TestApp::spawn_moderated().await;
        let moderator = app.token_with_role("user_mod", Some("moderator"));
        let id = app.create_wish("Please approve", "Guest", None).await;

        let res = app
            .put(&routes::wish_approval(&id), &json!({"is_approved": true}), &moderator)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["wish"]["is_approved"], true);

        let wall = app.get(routes::WISHES, None).await;
        assert_eq!(wall.body["wishes"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn guests_cannot_moderate() {
        let app = TestApp::spawn().await;
        let alice = app.token("user_alice");
        let id = app.create_wish("Mine", "Alice", Some(&alice)).await;

        let res = app
            .put(&routes::wish_approval(&id), &json!({"is_approved": false}), &alice)
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}
