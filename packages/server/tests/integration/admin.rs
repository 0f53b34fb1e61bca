use serde_json::json;

use crate::common::{TestApp, routes};

mod students {
    use super::*;

    #[tokio::test]
    async fn lists_students_by_surname_with_pagination() {
        let app = TestApp::spawn().await;
        app.register_student(300001, "Zofia", "Wiśniewska").await;
        app.register_student(300002, "Piotr", "Bąk").await;
        app.register_student(300003, "Jan", "Kowalski").await;
        let admin = app.admin_token().await;

        let res = app
            .get_with_token(&format!("{}?page=1&per_page=2", routes::ADMIN_STUDENTS), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        // The bootstrap administrator is a student too.
        assert_eq!(res.body["pagination"]["total"], 4);
        assert_eq!(res.body["pagination"]["total_pages"], 2);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["surname"], "Admin");
        assert_eq!(data[1]["surname"], "Bąk");
    }

    #[tokio::test]
    async fn search_matches_surname_case_insensitively() {
        let app = TestApp::spawn().await;
        app.register_student(300001, "Jan", "Kowalski").await;
        app.register_student(300002, "Piotr", "Nowak").await;
        let admin = app.admin_token().await;

        let res = app
            .get_with_token(&format!("{}?search=KOWAL", routes::ADMIN_STUDENTS), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["index"], 300001);
    }

    #[tokio::test]
    async fn search_matches_an_exact_index() {
        let app = TestApp::spawn().await;
        app.register_student(300001, "Jan", "Kowalski").await;
        app.register_student(300002, "Piotr", "Nowak").await;
        let admin = app.admin_token().await;

        let res = app
            .get_with_token(&format!("{}?search=300002", routes::ADMIN_STUDENTS), &admin)
            .await;

        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["surname"], "Nowak");
    }

    #[tokio::test]
    async fn filters_by_activation_state() {
        let app = TestApp::spawn().await;
        app.register_student(300001, "Jan", "Kowalski").await;
        app.create_active_student(300002).await;
        let admin = app.admin_token().await;

        let res = app
            .get_with_token(&format!("{}?activation=pending", routes::ADMIN_STUDENTS), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["index"], 300001);
        assert_eq!(data[0]["activation"], "pending");
    }

    #[tokio::test]
    async fn active_students_cannot_list_students() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_active_student(300001).await;

        let res = app.get_with_token(routes::ADMIN_STUDENTS, &token).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn page_far_past_the_end_is_empty() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .get_with_token(
                &format!("{}?page={}&per_page=100", routes::ADMIN_STUDENTS, u64::MAX),
                &admin,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"], json!([]));
        assert_eq!(res.body["pagination"]["total"], 1);
    }
}

mod transitions {
    use super::*;

    #[tokio::test]
    async fn promote_walks_up_and_saturates() {
        let app = TestApp::spawn().await;
        let id = app.register_student(300001, "Jan", "Kowalski").await;
        let admin = app.admin_token().await;

        let mut states = Vec::new();
        for _ in 0..3 {
            let res = app
                .post_with_token(&routes::student_promote(id), &json!({}), &admin)
                .await;
            assert_eq!(res.status, 200, "{}", res.text);
            states.push(res.body["activation"].as_str().unwrap().to_string());
        }

        assert_eq!(states, vec!["active", "promoted", "promoted"]);
    }

    #[tokio::test]
    async fn demote_walks_down_and_saturates() {
        let app = TestApp::spawn().await;
        let id = app.register_student(300001, "Jan", "Kowalski").await;
        let admin = app.admin_token().await;
        app.post_with_token(&routes::student_promote(id), &json!({}), &admin)
            .await;

        let first = app
            .post_with_token(&routes::student_demote(id), &json!({}), &admin)
            .await;
        let second = app
            .post_with_token(&routes::student_demote(id), &json!({}), &admin)
            .await;

        assert_eq!(first.body["activation"], "pending");
        assert_eq!(second.status, 200);
        assert_eq!(second.body["activation"], "pending");
    }

    #[tokio::test]
    async fn reset_returns_a_promoted_student_to_pending() {
        let app = TestApp::spawn().await;
        let id = app.register_student(300001, "Jan", "Kowalski").await;
        let admin = app.admin_token().await;
        app.post_with_token(&routes::student_promote(id), &json!({}), &admin)
            .await;
        app.post_with_token(&routes::student_promote(id), &json!({}), &admin)
            .await;

        let res = app
            .post_with_token(&routes::student_reset(id), &json!({}), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["activation"], "pending");
        assert_eq!(res.body["surname"], "Kowalski");
    }

    #[tokio::test]
    async fn reset_of_a_missing_student_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .post_with_token(&routes::student_reset(42), &json!({}), &admin)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn promoted_student_gains_admin_permissions() {
        let app = TestApp::spawn().await;
        let (id, _) = app.create_active_student(300001).await;
        let admin = app.admin_token().await;
        app.post_with_token(&routes::student_promote(id), &json!({}), &admin)
            .await;

        let token = app.login(300001, crate::common::STUDENT_PASSWORD).await;
        let res = app.get_with_token(routes::ADMIN_STUDENTS, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
    }

    #[tokio::test]
    async fn reset_takes_effect_on_an_issued_token() {
        let app = TestApp::spawn().await;
        let course_id = app.import_sample().await;
        let labs = app.term_ids(course_id, "Lab").await;
        let (id, token) = app.create_active_student(300001).await;
        let res = app
            .post_with_token(&routes::join(course_id), &json!({}), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let admin = app.admin_token().await;

        let res = app
            .post_with_token(&routes::student_reset(id), &json!({}), &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app
            .put_with_token(
                &routes::selections(course_id),
                &json!({"selections": [{"term_id": labs[0], "points": 5}]}),
                &token,
            )
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "ACCOUNT_NOT_ACTIVATED");

        let res = app
            .post_with_token(&routes::join(course_id), &json!({}), &token)
            .await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn demoted_admin_loses_admin_access_on_an_issued_token() {
        let app = TestApp::spawn().await;
        let (id, _) = app.create_active_student(300001).await;
        let admin = app.admin_token().await;
        app.post_with_token(&routes::student_promote(id), &json!({}), &admin)
            .await;
        let token = app.login(300001, crate::common::STUDENT_PASSWORD).await;
        let res = app.get_with_token(routes::ADMIN_STUDENTS, &token).await;
        assert_eq!(res.status, 200, "{}", res.text);

        app.post_with_token(&routes::student_demote(id), &json!({}), &admin)
            .await;

        let res = app.get_with_token(routes::ADMIN_STUDENTS, &token).await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");

        let res = app
            .post_with_token(&routes::student_promote(id), &json!({}), &token)
            .await;
        assert_eq!(res.status, 403);
    }
}

mod deletes {
    use super::*;

    #[tokio::test]
    async fn deleting_a_course_removes_terms_selections_and_enrollments() {
        let app = TestApp::spawn().await;
        let course_id = app.import_sample().await;
        let labs = app.term_ids(course_id, "Lab").await;
        let (_, token) = app.create_active_student(300001).await;
        app.post_with_token(&routes::join(course_id), &json!({}), &token)
            .await;
        app.put_with_token(
            &routes::selections(course_id),
            &json!({"selections": [
                {"term_id": labs[0], "points": 5},
                {"term_id": labs[1], "points": 5},
            ]}),
            &token,
        )
        .await;
        let admin = app.admin_token().await;

        let res = app
            .delete_with_token(&routes::admin_course(course_id), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["terms_deleted"], 5);
        assert_eq!(res.body["selections_deleted"], 2);
        assert_eq!(res.body["enrollments_deleted"], 1);

        let res = app.get_with_token(&routes::course(course_id), &admin).await;
        assert_eq!(res.status, 404);
        let res = app
            .get_with_token(
                &format!("{}?course_id={course_id}", routes::ADMIN_TERMS),
                &admin,
            )
            .await;
        assert_eq!(res.status, 404);
        let me = app.get_with_token(routes::ME, &token).await;
        assert_eq!(me.body["joined_course_ids"], json!([]));
    }

    #[tokio::test]
    async fn deleting_a_course_leaves_other_courses_alone() {
        let app = TestApp::spawn().await;
        let course_id = app.import_sample().await;
        let databases = app.course_id("Databases").await;
        let admin = app.admin_token().await;

        app.delete_with_token(&routes::admin_course(course_id), &admin)
            .await;

        let res = app.get_with_token(routes::ADMIN_TERMS, &admin).await;
        let terms = res.body.as_array().unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0]["course_id"], databases);
    }

    #[tokio::test]
    async fn deleting_a_missing_course_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app.delete_with_token(&routes::admin_course(999), &admin).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn deleting_a_term_removes_only_its_selections() {
        let app = TestApp::spawn().await;
        let course_id = app.import_sample().await;
        let labs = app.term_ids(course_id, "Lab").await;
        let (_, token) = app.create_active_student(300001).await;
        app.post_with_token(&routes::join(course_id), &json!({}), &token)
            .await;
        app.put_with_token(
            &routes::selections(course_id),
            &json!({"selections": [
                {"term_id": labs[0], "points": 5},
                {"term_id": labs[1], "points": 5},
            ]}),
            &token,
        )
        .await;
        let admin = app.admin_token().await;

        let res = app.delete_with_token(&routes::admin_term(labs[0]), &admin).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["terms_deleted"], 1);
        assert_eq!(res.body["selections_deleted"], 1);
        assert_eq!(res.body["enrollments_deleted"], 0);

        let remaining = app
            .get_with_token(&routes::selections(course_id), &token)
            .await;
        let selections = remaining.body["selections"].as_array().unwrap();
        assert_eq!(selections.len(), 1);
        assert_eq!(selections[0]["term_id"], labs[1]);
        let course = app.get_with_token(&routes::course(course_id), &admin).await;
        assert_eq!(course.body["terms"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn students_cannot_delete_courses() {
        let app = TestApp::spawn().await;
        let course_id = app.import_sample().await;
        let (_, token) = app.create_active_student(300001).await;

        let res = app
            .delete_with_token(&routes::admin_course(course_id), &token)
            .await;

        assert_eq!(res.status, 403);
    }
}

mod unavailable_terms {
    use super::*;

    #[tokio::test]
    async fn created_set_flags_its_terms() {
        let app = TestApp::spawn().await;
        let course_id = app.import_sample().await;
        let labs = app.term_ids(course_id, "Lab").await;
        let admin = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::UNAVAILABLE_TERMS,
                &json!({"name": "Rector's day", "term_ids": [labs[1]]}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["name"], "Rector's day");
        assert_eq!(res.body["term_ids"], json!([labs[1]]));

        let course = app.get_with_token(&routes::course(course_id), &admin).await;
        let flagged: Vec<i64> = course.body["terms"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|t| t["unavailable"] == true)
            .map(|t| t["id"].as_i64().unwrap())
            .collect();
        assert_eq!(flagged, vec![labs[1] as i64]);
    }

    #[tokio::test]
    async fn update_replaces_name_and_terms() {
        let app = TestApp::spawn().await;
        let course_id = app.import_sample().await;
        let labs = app.term_ids(course_id, "Lab").await;
        let admin = app.admin_token().await;
        let created = app
            .post_with_token(
                routes::UNAVAILABLE_TERMS,
                &json!({"name": "Holiday", "term_ids": [labs[0], labs[1]]}),
                &admin,
            )
            .await;
        let id = created.id();

        let res = app
            .put_with_token(
                &routes::unavailable_terms(id),
                &json!({"name": "Renovation", "term_ids": [labs[2]]}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let fetched = app
            .get_with_token(&routes::unavailable_terms(id), &admin)
            .await;
        assert_eq!(fetched.body["name"], "Renovation");
        assert_eq!(fetched.body["term_ids"], json!([labs[2]]));

        let list = app.get_with_token(routes::UNAVAILABLE_TERMS, &admin).await;
        assert_eq!(list.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_term_is_not_found_and_nothing_is_saved() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::UNAVAILABLE_TERMS,
                &json!({"name": "Holiday", "term_ids": [9999]}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 404);
        let list = app.get_with_token(routes::UNAVAILABLE_TERMS, &admin).await;
        assert_eq!(list.body, json!([]));
    }

    #[tokio::test]
    async fn unknown_set_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .get_with_token(&routes::unavailable_terms(7), &admin)
            .await;

        assert_eq!(res.status, 404);
    }
}

mod settings {
    use super::*;

    #[tokio::test]
    async fn defaults_are_open() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app.get_with_token(routes::SETTINGS, &admin).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["registration_open"], true);
        assert_eq!(res.body["selections_open"], true);
    }

    #[tokio::test]
    async fn patch_changes_only_given_fields() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .patch_with_token(routes::SETTINGS, &json!({"selections_open": false}), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["registration_open"], true);
        assert_eq!(res.body["selections_open"], false);
    }

    #[tokio::test]
    async fn students_cannot_change_settings() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_active_student(300001).await;

        let res = app
            .patch_with_token(routes::SETTINGS, &json!({"registration_open": false}), &token)
            .await;

        assert_eq!(res.status, 403);
    }
}
