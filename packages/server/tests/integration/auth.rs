use serde_json::json;

use crate::common::{STUDENT_PASSWORD, TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn new_student_registers_as_pending() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "index": 212345,
                    "name": "Anna",
                    "surname": "Kowalska",
                    "group_id": 3,
                    "password": STUDENT_PASSWORD,
                }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["id"].is_number());
        assert_eq!(res.body["index"], 212345);
        assert_eq!(res.body["activation"], "pending");
        assert!(res.body.get("password").is_none());
    }

    #[tokio::test]
    async fn cannot_register_an_index_twice() {
        let app = TestApp::spawn().await;
        app.register_student(212345, "Anna", "Kowalska").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "index": 212345,
                    "name": "Other",
                    "surname": "Person",
                    "group_id": 1,
                    "password": STUDENT_PASSWORD,
                }),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "INDEX_TAKEN");
    }

    #[tokio::test]
    async fn cannot_register_with_a_short_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "index": 212345,
                    "name": "Anna",
                    "surname": "Kowalska",
                    "group_id": 3,
                    "password": "short",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn cannot_register_with_a_blank_name() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "index": 212345,
                    "name": "   ",
                    "surname": "Kowalska",
                    "group_id": 3,
                    "password": STUDENT_PASSWORD,
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::REGISTER, &json!({"index": "abc"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn closed_registration_rejects_new_students() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let res = app
            .patch_with_token(routes::SETTINGS, &json!({"registration_open": false}), &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "index": 212345,
                    "name": "Anna",
                    "surname": "Kowalska",
                    "group_id": 3,
                    "password": STUDENT_PASSWORD,
                }),
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "REGISTRATION_CLOSED");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn pending_student_cannot_log_in() {
        let app = TestApp::spawn().await;
        app.register_student(212345, "Anna", "Kowalska").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"index": 212345, "password": STUDENT_PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "ACCOUNT_NOT_ACTIVATED");
    }

    #[tokio::test]
    async fn active_student_gets_student_permissions() {
        let app = TestApp::spawn().await;
        app.create_active_student(212345).await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"index": 212345, "password": STUDENT_PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["token"].is_string());
        assert_eq!(res.body["activation"], "active");
        assert_eq!(
            res.body["permissions"],
            json!(["course:join", "selection:submit"])
        );
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_active_student(212345).await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"index": 212345, "password": "wrong-password"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_index_is_rejected_like_a_wrong_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"index": 999999, "password": STUDENT_PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn returns_profile_and_joined_courses() {
        let app = TestApp::spawn().await;
        let course_id = app.import_sample().await;
        let (id, token) = app.create_active_student(212345).await;
        let res = app
            .post_with_token(&routes::join(course_id), &json!({}), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["id"], id);
        assert_eq!(res.body["name"], "Anna");
        assert_eq!(res.body["surname"], "Kowalska");
        assert_eq!(res.body["joined_course_ids"], json!([course_id]));
    }

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn rejects_a_garbage_token() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not-a-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn token_of_an_unknown_student_is_rejected() {
        let app = TestApp::spawn().await;
        let token = enrollment_server::utils::jwt::sign(
            999,
            999999,
            vec!["student:manage".into()],
            crate::common::JWT_SECRET,
            1,
        )
        .unwrap();

        let res = app.get_with_token(routes::ADMIN_STUDENTS, &token).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}
