//! Conversation handler integration tests

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::{
    authed_request, conversation_uri, conversations_uri, create_test_jwt, messages_uri,
    parse_body, TestApp,
};

mod test_create_conversation {
    use super::*;

    #[tokio::test]
    async fn test_create_conversation_returns_201() {
        let app = TestApp::new().await.unwrap();
        let user = app.create_test_user().await.unwrap();
        let project_id = app.create_test_project().await.unwrap();
        let jwt = create_test_jwt(&user, &app.config.jwt_secret).unwrap();

        let req = authed_request(Method::POST, &conversations_uri(project_id), &jwt, None);
        let resp = app.test_router().await.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = parse_body(resp).await;
        assert!(body["id"].as_str().is_some());
        assert_eq!(body["projectId"], project_id.to_string());
        assert_eq!(body["userId"], user.id.to_string());
        assert_eq!(body["createdAt"], body["updatedAt"]);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_create_conversation_without_auth_returns_401() {
        let app = TestApp::new().await.unwrap();
        let project_id = app.create_test_project().await.unwrap();

        let req = Request::builder()
            .method(Method::POST)
            .uri(conversations_uri(project_id))
            .body(Body::empty())
            .unwrap();
        let resp = app.test_router().await.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_create_conversation_in_unknown_project_returns_500() {
        let app = TestApp::new().await.unwrap();
        let user = app.create_test_user().await.unwrap();
        let jwt = create_test_jwt(&user, &app.config.jwt_secret).unwrap();

        let req = authed_request(Method::POST, &conversations_uri(Uuid::new_v4()), &jwt, None);
        let resp = app.test_router().await.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = parse_body(resp).await;
        assert_eq!(body["error"]["message"], "Internal server error");

        app.cleanup().await.unwrap();
    }
}

mod test_list_conversations {
    use super::*;

    #[tokio::test]
    async fn test_list_empty_project_returns_empty_array() {
        let app = TestApp::new().await.unwrap();
        let user = app.create_test_user().await.unwrap();
        let project_id = app.create_test_project().await.unwrap();
        let jwt = create_test_jwt(&user, &app.config.jwt_secret).unwrap();

        let req = authed_request(Method::GET, &conversations_uri(project_id), &jwt, None);
        let resp = app.test_router().await.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(parse_body(resp).await, json!([]));

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_list_orders_by_most_recent_activity() {
        let app = TestApp::new().await.unwrap();
        let user = app.create_test_user().await.unwrap();
        let project_id = app.create_test_project().await.unwrap();
        let jwt = create_test_jwt(&user, &app.config.jwt_secret).unwrap();
        let router = app.test_router().await;

        let mut ids = Vec::new();
        for _ in 0..2 {
            let req = authed_request(Method::POST, &conversations_uri(project_id), &jwt, None);
            let body = parse_body(router.clone().oneshot(req).await.unwrap()).await;
            ids.push(body["id"].as_str().unwrap().parse::<Uuid>().unwrap());
        }

        // Newest conversation comes first until the older one sees activity
        let req = authed_request(Method::GET, &conversations_uri(project_id), &jwt, None);
        let body = parse_body(router.clone().oneshot(req).await.unwrap()).await;
        assert_eq!(body[0]["id"], ids[1].to_string());
        assert_eq!(body[1]["id"], ids[0].to_string());
        assert_eq!(body[1]["messageCount"], 0);
        assert!(body[1]["lastMessage"].is_null());

        let req = authed_request(
            Method::POST,
            &messages_uri(project_id, ids[0]),
            &jwt,
            Some(json!({"content": "Hello"})),
        );
        let resp = router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let req = authed_request(Method::GET, &conversations_uri(project_id), &jwt, None);
        let body = parse_body(router.oneshot(req).await.unwrap()).await;
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["id"], ids[0].to_string());
        assert_eq!(list[0]["messageCount"], 2);
        assert_eq!(list[0]["lastMessage"]["sender"], "ASSISTANT");
        assert_eq!(list[1]["messageCount"], 0);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_user_and_project() {
        let app = TestApp::new().await.unwrap();
        let alice = app.create_test_user().await.unwrap();
        let bob = app.create_test_user().await.unwrap();
        let project_a = app.create_test_project().await.unwrap();
        let project_b = app.create_test_project().await.unwrap();
        let alice_jwt = create_test_jwt(&alice, &app.config.jwt_secret).unwrap();
        let bob_jwt = create_test_jwt(&bob, &app.config.jwt_secret).unwrap();
        let router = app.test_router().await;

        for (jwt, project_id) in [
            (&alice_jwt, project_a),
            (&alice_jwt, project_b),
            (&bob_jwt, project_a),
        ] {
            let req = authed_request(Method::POST, &conversations_uri(project_id), jwt, None);
            let resp = router.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let req = authed_request(Method::GET, &conversations_uri(project_a), &alice_jwt, None);
        let body = parse_body(router.clone().oneshot(req).await.unwrap()).await;
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 1);

        let req = authed_request(Method::GET, &conversations_uri(project_b), &bob_jwt, None);
        let body = parse_body(router.oneshot(req).await.unwrap()).await;
        assert_eq!(body, json!([]));

        app.cleanup().await.unwrap();
    }
}

mod test_get_conversation {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_messages_in_chronological_order() {
        let app = TestApp::new().await.unwrap();
        let user = app.create_test_user().await.unwrap();
        let project_id = app.create_test_project().await.unwrap();
        let jwt = create_test_jwt(&user, &app.config.jwt_secret).unwrap();
        let router = app.test_router().await;

        let req = authed_request(Method::POST, &conversations_uri(project_id), &jwt, None);
        let conv = parse_body(router.clone().oneshot(req).await.unwrap()).await;
        let conv_id: Uuid = conv["id"].as_str().unwrap().parse().unwrap();

        for content in ["first", "second"] {
            let req = authed_request(
                Method::POST,
                &messages_uri(project_id, conv_id),
                &jwt,
                Some(json!({ "content": content })),
            );
            let resp = router.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let req = authed_request(Method::GET, &conversation_uri(project_id, conv_id), &jwt, None);
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        assert_eq!(body["id"], conv_id.to_string());
        let messages = body["messages"].as_array().unwrap();
        let senders: Vec<&str> = messages
            .iter()
            .map(|m| m["sender"].as_str().unwrap())
            .collect();
        assert_eq!(senders, vec!["USER", "ASSISTANT", "USER", "ASSISTANT"]);
        assert_eq!(messages[0]["content"], "first");
        assert_eq!(messages[2]["content"], "second");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_new_conversation_has_no_messages() {
        let app = TestApp::new().await.unwrap();
        let user = app.create_test_user().await.unwrap();
        let project_id = app.create_test_project().await.unwrap();
        let jwt = create_test_jwt(&user, &app.config.jwt_secret).unwrap();
        let router = app.test_router().await;

        let req = authed_request(Method::POST, &conversations_uri(project_id), &jwt, None);
        let conv = parse_body(router.clone().oneshot(req).await.unwrap()).await;
        let conv_id: Uuid = conv["id"].as_str().unwrap().parse().unwrap();

        let req = authed_request(Method::GET, &conversation_uri(project_id, conv_id), &jwt, None);
        let body = parse_body(router.oneshot(req).await.unwrap()).await;
        assert_eq!(body["messages"], json!([]));

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_other_users_conversation_returns_404() {
        let app = TestApp::new().await.unwrap();
        let owner = app.create_test_user().await.unwrap();
        let intruder = app.create_test_user().await.unwrap();
        let project_id = app.create_test_project().await.unwrap();
        let owner_jwt = create_test_jwt(&owner, &app.config.jwt_secret).unwrap();
        let intruder_jwt = create_test_jwt(&intruder, &app.config.jwt_secret).unwrap();
        let router = app.test_router().await;

        let req = authed_request(Method::POST, &conversations_uri(project_id), &owner_jwt, None);
        let conv = parse_body(router.clone().oneshot(req).await.unwrap()).await;
        let conv_id: Uuid = conv["id"].as_str().unwrap().parse().unwrap();

        let req = authed_request(
            Method::GET,
            &conversation_uri(project_id, conv_id),
            &intruder_jwt,
            None,
        );
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = parse_body(resp).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_through_wrong_project_returns_404() {
        let app = TestApp::new().await.unwrap();
        let user = app.create_test_user().await.unwrap();
        let project_id = app.create_test_project().await.unwrap();
        let other_project = app.create_test_project().await.unwrap();
        let jwt = create_test_jwt(&user, &app.config.jwt_secret).unwrap();
        let router = app.test_router().await;

        let req = authed_request(Method::POST, &conversations_uri(project_id), &jwt, None);
        let conv = parse_body(router.clone().oneshot(req).await.unwrap()).await;
        let conv_id: Uuid = conv["id"].as_str().unwrap().parse().unwrap();

        let req = authed_request(
            Method::GET,
            &conversation_uri(other_project, conv_id),
            &jwt,
            None,
        );
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_invalid_id_returns_400() {
        let app = TestApp::new().await.unwrap();
        let user = app.create_test_user().await.unwrap();
        let project_id = app.create_test_project().await.unwrap();
        let jwt = create_test_jwt(&user, &app.config.jwt_secret).unwrap();

        let uri = format!("{}/not-a-uuid", conversations_uri(project_id));
        let req = authed_request(Method::GET, &uri, &jwt, None);
        let resp = app.test_router().await.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        app.cleanup().await.unwrap();
    }
}
