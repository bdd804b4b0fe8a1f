//! End-to-end tests over a real socket.

use axum::http::StatusCode;
use catalog_sdk::{CatalogClient, Course as SdkCourse};
use course_catalog::catalog::RequiredFieldPolicy;
use course_catalog::observability::logging::{read_records, LogLevel};

mod common;

#[tokio::test]
async fn test_add_course_via_form_then_view() {
    let server = common::start_server(RequiredFieldPolicy::Minimal).await;
    let client = common::no_redirect_client();

    let res = client
        .post(server.url("/add_course"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(common::form_body(&[
            ("code", "CS101"),
            ("name", "Intro to CS"),
            ("instructor", "Dr. Smith"),
        ]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let location = res.headers()["location"].to_str().unwrap().to_string();
    assert!(location.starts_with("/catalog"));

    let html = client
        .get(server.url(&location))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("added successfully!"));
    assert!(html.contains("Intro to CS"));

    let res = client.get(server.url("/course/CS101")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("Dr. Smith"));

    let persisted: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(server.catalog_path()).unwrap()).unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0]["code"], "CS101");
    assert_eq!(persisted[0]["description"], "");

    let messages: Vec<String> = read_records(&server.log_path())
        .unwrap()
        .into_iter()
        .filter(|r| r.level == LogLevel::Info)
        .map(|r| r.message)
        .collect();
    assert!(messages.contains(&"Course 'Intro to CS' added with code 'CS101'".to_string()));
    assert_eq!(server.service.error_count(), 0);
}

#[tokio::test]
async fn test_missing_name_is_rejected_and_counted() {
    let server = common::start_server(RequiredFieldPolicy::Minimal).await;
    let client = common::no_redirect_client();

    let res = client
        .post(server.url("/add_course"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(common::form_body(&[("code", "CS101")]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(res.text().await.unwrap().contains("Missing required fields: name"));

    assert!(!server.catalog_path().exists());
    assert_eq!(server.service.error_count(), 1);

    let errors: Vec<String> = read_records(&server.log_path())
        .unwrap()
        .into_iter()
        .filter(|r| r.level == LogLevel::Error)
        .map(|r| r.message)
        .collect();
    assert_eq!(errors, vec!["Missing required fields: name".to_string()]);

    let spans = server.finished_spans();
    let span = spans.iter().find(|s| s.name == "add_course").unwrap();
    assert_eq!(common::attribute(span, "error.type").as_deref(), Some("MissingFields"));
}

#[tokio::test]
async fn test_unknown_course_leaves_counter_unchanged() {
    let server = common::start_server(RequiredFieldPolicy::Minimal).await;
    let sdk = CatalogClient::new(&server.url(""));

    sdk.add_course(&SdkCourse {
        code: "CS101".into(),
        name: "Intro".into(),
        ..SdkCourse::default()
    })
    .await
    .unwrap();

    assert_eq!(sdk.get_course("CS999").await.unwrap(), None);
    let res = reqwest::get(server.url("/course/CS999")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let status = sdk.status().await.unwrap();
    assert_eq!(status.error_count, 0);
    assert_eq!(status.required_fields, "minimal");
}

#[tokio::test]
async fn test_api_lists_courses_in_insertion_order() {
    let server = common::start_server(RequiredFieldPolicy::Minimal).await;
    let sdk = CatalogClient::new(&server.url(""));

    for (code, name) in [("CS102", "Data Structures"), ("CS101", "Intro"), ("CS101", "Intro again")] {
        sdk.add_course(&SdkCourse {
            code: code.into(),
            name: name.into(),
            ..SdkCourse::default()
        })
        .await
        .unwrap();
    }

    let codes: Vec<String> = sdk
        .list_courses()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.code)
        .collect();
    assert_eq!(codes, vec!["CS102", "CS101", "CS101"]);

    // Duplicates are kept; lookup returns the first.
    let first = sdk.get_course("CS101").await.unwrap().unwrap();
    assert_eq!(first.name, "Intro");

    let status = sdk.status().await.unwrap();
    assert_eq!(status.catalog_access_count, 1);
}

#[tokio::test]
async fn test_strict_policy_over_api() {
    let server = common::start_server(RequiredFieldPolicy::Strict).await;

    let res = reqwest::Client::new()
        .post(server.url("/api/courses"))
        .json(&serde_json::json!({ "code": "CS101", "name": "Intro" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: serde_json::Value = res.json().await.unwrap();
    let missing = body["missing_fields"].as_array().unwrap();
    assert_eq!(missing.len(), 7);
    assert_eq!(missing[0], "instructor");
}

#[tokio::test]
async fn test_index_logs_each_client_once() {
    let server = common::start_server(RequiredFieldPolicy::Minimal).await;

    for _ in 0..3 {
        let res = reqwest::get(server.url("/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let visits: Vec<String> = read_records(&server.log_path())
        .unwrap()
        .into_iter()
        .map(|r| r.message)
        .filter(|m| m.starts_with("User IP: "))
        .collect();
    assert_eq!(visits, vec!["User IP: 127.0.0.1".to_string()]);

    let spans = server.finished_spans();
    assert_eq!(spans.iter().filter(|s| s.name == "index").count(), 3);
    assert!(spans
        .iter()
        .all(|s| common::attribute(s, "http.client_ip").as_deref() == Some("127.0.0.1")));
}

#[tokio::test]
async fn test_manual_and_auto_instrumented_routes() {
    let server = common::start_server(RequiredFieldPolicy::Minimal).await;

    let text = reqwest::get(server.url("/manual-trace"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(text, "Manual trace recorded!");

    let text = reqwest::get(server.url("/auto-instrumented"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(text, "This route is auto-instrumented!");

    let names: Vec<String> = server
        .finished_spans()
        .into_iter()
        .map(|s| s.name.into_owned())
        .collect();
    assert_eq!(names, vec!["manual-span"]);
}

#[tokio::test]
async fn test_codes_with_reserved_characters_round_trip() {
    let server = common::start_server(RequiredFieldPolicy::Minimal).await;
    let sdk = CatalogClient::new(&server.url(""));
    let code = "CS 101/#2?";

    sdk.add_course(&SdkCourse {
        code: code.into(),
        name: "Odd Code".into(),
        ..SdkCourse::default()
    })
    .await
    .unwrap();

    let found = sdk.get_course(code).await.unwrap().unwrap();
    assert_eq!(found.code, code);
    assert_eq!(sdk.get_course("CS 101").await.unwrap(), None);

    let html = reqwest::get(server.url("/catalog"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let href = "/course/CS%20101%2F%232%3F";
    assert!(html.contains(&format!("href=\"{}\"", href)), "{}", html);

    let res = reqwest::get(server.url(href)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("Odd Code"));
}
