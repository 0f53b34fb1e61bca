use serde_json::json;

use crate::common::{TestApp, routes};

mod browsing {
    use super::*;

    #[tokio::test]
    async fn lists_courses_by_name_with_joined_flag() {
        let app = TestApp::spawn().await;
        let algorithms = app.import_sample().await;
        let (_, token) = app.create_active_student(212345).await;
        app.post_with_token(&routes::join(algorithms), &json!({}), &token)
            .await;

        let res = app.get_with_token(routes::COURSES, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let courses = res.body.as_array().unwrap();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0]["name"], "Algorithms");
        assert_eq!(courses[0]["joined"], true);
        assert_eq!(courses[1]["name"], "Databases");
        assert_eq!(courses[1]["joined"], false);
    }

    #[tokio::test]
    async fn course_detail_shows_display_names_and_instructors() {
        let app = TestApp::spawn().await;
        let course_id = app.import_sample().await;
        let (_, token) = app.create_active_student(212345).await;

        let res = app.get_with_token(&routes::course(course_id), &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Algorithms");
        assert_eq!(res.body["joined"], false);

        let terms = res.body["terms"].as_array().unwrap();
        assert_eq!(terms.len(), 5);
        let lecture = &terms[0];
        assert_eq!(lecture["kind"], "Lecture");
        assert_eq!(lecture["type_name"], "Wykład");
        assert_eq!(lecture["day_of_week"], "Monday");
        assert_eq!(lecture["day_name"], "Poniedziałek");
        assert_eq!(lecture["starts_at"], "08:15");
        assert_eq!(lecture["ends_at"], "10:00");
        assert_eq!(lecture["location"]["name"], "A-1");
        assert_eq!(lecture["location"]["capacity"], 120);
        assert_eq!(lecture["instructors"][0]["name"], "dr Jan Nowak");
        assert_eq!(lecture["unavailable"], false);

        let lab = &terms[1];
        assert_eq!(lab["type_name"], "Laboratorium");
        assert_eq!(lab["day_name"], "Wtorek");
        assert_eq!(lab["location"]["capacity"], 15);

        let instructors: Vec<&str> = res.body["instructors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["name"].as_str().unwrap())
            .collect();
        assert_eq!(instructors, vec!["dr Jan Nowak", "mgr Ewa Lis"]);
    }

    #[tokio::test]
    async fn choosable_terms_are_labs_ordered_by_day_then_start() {
        let app = TestApp::spawn().await;
        let course_id = app.import_sample().await;
        let (_, token) = app.create_active_student(212345).await;

        let res = app
            .get_with_token(&routes::choosable_terms(course_id), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let terms = res.body.as_array().unwrap();
        let slots: Vec<(&str, &str)> = terms
            .iter()
            .map(|t| {
                assert_eq!(t["kind"], "Lab");
                (
                    t["day_of_week"].as_str().unwrap(),
                    t["starts_at"].as_str().unwrap(),
                )
            })
            .collect();
        assert_eq!(
            slots,
            vec![
                ("Monday", "08:15"),
                ("Monday", "12:15"),
                ("Tuesday", "10:15"),
            ]
        );
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_active_student(212345).await;

        let res = app.get_with_token(&routes::course(999), &token).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn non_positive_course_id_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_active_student(212345).await;

        let res = app.get_with_token(&routes::course(0), &token).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod enrollment {
    use super::*;

    #[tokio::test]
    async fn joining_twice_is_idempotent() {
        let app = TestApp::spawn().await;
        let course_id = app.import_sample().await;
        let (_, token) = app.create_active_student(212345).await;

        let first = app
            .post_with_token(&routes::join(course_id), &json!({}), &token)
            .await;
        let second = app
            .post_with_token(&routes::join(course_id), &json!({}), &token)
            .await;

        assert_eq!(first.status, 200, "{}", first.text);
        assert_eq!(first.body["changed"], true);
        assert_eq!(second.status, 200);
        assert_eq!(second.body["joined"], true);
        assert_eq!(second.body["changed"], false);
    }

    #[tokio::test]
    async fn joining_an_unknown_course_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_active_student(212345).await;

        let res = app
            .post_with_token(&routes::join(999), &json!({}), &token)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn leaving_removes_enrollment_and_selections() {
        let app = TestApp::spawn().await;
        let course_id = app.import_sample().await;
        let labs = app.term_ids(course_id, "Lab").await;
        let (_, token) = app.create_active_student(212345).await;
        app.post_with_token(&routes::join(course_id), &json!({}), &token)
            .await;
        let res = app
            .put_with_token(
                &routes::selections(course_id),
                &json!({"selections": [{"term_id": labs[0], "points": 10}]}),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app.delete_with_token(&routes::join(course_id), &token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["joined"], false);
        assert_eq!(res.body["changed"], true);

        let me = app.get_with_token(routes::ME, &token).await;
        assert_eq!(me.body["joined_course_ids"], json!([]));
        let res = app
            .get_with_token(&routes::selections(course_id), &token)
            .await;
        assert_eq!(res.body["selections"], json!([]));
        assert_eq!(res.body["lab_points_used"], 0);
    }

    #[tokio::test]
    async fn leaving_a_course_not_joined_changes_nothing() {
        let app = TestApp::spawn().await;
        let course_id = app.import_sample().await;
        let (_, token) = app.create_active_student(212345).await;

        let res = app.delete_with_token(&routes::join(course_id), &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["changed"], false);
    }
}

mod import {
    use super::*;

    #[tokio::test]
    async fn reports_created_records() {
        let app = TestApp::spawn().await;

        let res = app.import(&crate::common::sample_schedule()).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["courses_created"], 2);
        assert_eq!(res.body["courses_reused"], 0);
        assert_eq!(res.body["terms_created"], 6);
        assert_eq!(res.body["locations_created"], 3);
        assert_eq!(res.body["instructors_created"], 2);
        assert_eq!(res.body["instructor_links_created"], 4);
    }

    #[tokio::test]
    async fn importing_again_reuses_everything() {
        let app = TestApp::spawn().await;
        let schedule = crate::common::sample_schedule();
        app.import(&schedule).await;

        let res = app.import(&schedule).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["courses_created"], 0);
        assert_eq!(res.body["courses_reused"], 2);
        assert_eq!(res.body["terms_created"], 0);
        assert_eq!(res.body["terms_reused"], 6);
        assert_eq!(res.body["locations_created"], 0);
        assert_eq!(res.body["instructors_created"], 0);
        assert_eq!(res.body["instructor_links_created"], 0);
    }

    #[tokio::test]
    async fn unknown_label_persists_nothing() {
        let app = TestApp::spawn().await;

        let res = app
            .import(&json!({
                "courses": [{
                    "name": "Algorithms",
                    "terms": [{
                        "kind": "Warsztaty", "day": "M",
                        "starts_at": "08:15", "ends_at": "10:00",
                        "location": {"name": "A-1"}
                    }]
                }]
            }))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        let admin = app.admin_token().await;
        let courses = app.get_with_token(routes::COURSES, &admin).await;
        assert_eq!(courses.body, json!([]));
    }

    #[tokio::test]
    async fn term_must_end_after_it_starts() {
        let app = TestApp::spawn().await;

        let res = app
            .import(&json!({
                "courses": [{
                    "name": "Algorithms",
                    "terms": [{
                        "kind": "Lab.", "day": "W",
                        "starts_at": "10:00", "ends_at": "08:15",
                        "location": {"name": "L-1"}
                    }]
                }]
            }))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn students_cannot_import() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_active_student(212345).await;

        let res = app
            .post_with_token(routes::IMPORT, &crate::common::sample_schedule(), &token)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}
