mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn check(
    client: &reqwest::Client,
    base_url: &str,
    token: Option<&str>,
    question_id: &str,
    selected: Value,
) -> Result<reqwest::Response> {
    let mut req = client
        .post(format!("{}/api/quiz/questions/{}/check", base_url, question_id))
        .json(&json!({ "selected_choice_ids": selected }));
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    Ok(req.send().await?)
}

#[tokio::test]
async fn single_choice_grading() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await {
        eprintln!("skipping: no database configured");
        return Ok(());
    }
    let client = reqwest::Client::new();

    let (owner, _) = common::register_and_login(&client, &server.base_url, "gsingle").await?;
    let (solver, _) = common::register_and_login(&client, &server.base_url, "ssingle").await?;
    let title = common::create_title(&client, &server.base_url, &owner, "Grading deck", "public").await?;
    let question = common::create_question(
        &client,
        &server.base_url,
        &owner,
        title["id"].as_str().unwrap(),
        "single",
        json!([
            { "text": "right", "is_correct": true, "position": 1 },
            { "text": "wrong", "is_correct": false, "position": 2 },
        ]),
    )
    .await?;
    let qid = question["id"].as_str().unwrap();
    let (correct, incorrect) = common::split_choice_ids(&question);

    // The single correct choice grades correct, and the correct ids are revealed
    let res = check(&client, &server.base_url, Some(&solver), qid, json!([correct[0]])).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["is_correct"], true);
    assert_eq!(body["data"]["question_id"].as_str().unwrap(), qid);
    assert_eq!(body["data"]["explanation"], "Explained after grading");
    assert_eq!(
        body["data"]["correct_choice_ids"].as_array().unwrap().len(),
        1
    );

    // The wrong choice grades incorrect but still reveals the correct ids
    let res = check(&client, &server.base_url, Some(&solver), qid, json!([incorrect[0]])).await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["is_correct"], false);
    assert_eq!(
        body["data"]["correct_choice_ids"][0].as_str().unwrap(),
        correct[0]
    );
    Ok(())
}

#[tokio::test]
async fn multiple_choice_requires_exact_set() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await {
        eprintln!("skipping: no database configured");
        return Ok(());
    }
    let client = reqwest::Client::new();

    let (owner, _) = common::register_and_login(&client, &server.base_url, "gmulti").await?;
    let title = common::create_title(&client, &server.base_url, &owner, "Multi deck", "public").await?;
    let question = common::create_question(
        &client,
        &server.base_url,
        &owner,
        title["id"].as_str().unwrap(),
        "multiple",
        json!([
            { "text": "right 1", "is_correct": true, "position": 1 },
            { "text": "right 2", "is_correct": true, "position": 2 },
            { "text": "wrong", "is_correct": false, "position": 3 },
        ]),
    )
    .await?;
    let qid = question["id"].as_str().unwrap();
    let (correct, incorrect) = common::split_choice_ids(&question);

    // Exact set: correct
    let res = check(&client, &server.base_url, Some(&owner), qid, json!([correct[0], correct[1]])).await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["is_correct"], true);

    // Proper subset: incorrect
    let res = check(&client, &server.base_url, Some(&owner), qid, json!([correct[0]])).await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["is_correct"], false);

    // Correct set plus a wrong choice: incorrect
    let res = check(
        &client,
        &server.base_url,
        Some(&owner),
        qid,
        json!([correct[0], correct[1], incorrect[0]]),
    )
    .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["is_correct"], false);
    Ok(())
}

#[tokio::test]
async fn grading_access_control() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await {
        eprintln!("skipping: no database configured");
        return Ok(());
    }
    let client = reqwest::Client::new();

    let (owner, _) = common::register_and_login(&client, &server.base_url, "gacl").await?;
    let (other, _) = common::register_and_login(&client, &server.base_url, "gaclother").await?;

    let public = common::create_title(&client, &server.base_url, &owner, "Open deck", "public").await?;
    let public_q = common::create_question(
        &client,
        &server.base_url,
        &owner,
        public["id"].as_str().unwrap(),
        "single",
        json!([
            { "text": "right", "is_correct": true, "position": 1 },
            { "text": "wrong", "is_correct": false, "position": 2 },
        ]),
    )
    .await?;
    let (correct, _) = common::split_choice_ids(&public_q);

    // Anonymous submission: unauthorized even on a public question
    let res = check(
        &client,
        &server.base_url,
        None,
        public_q["id"].as_str().unwrap(),
        json!([correct[0]]),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Draft title: authenticated non-owner is forbidden, before any
    // validation detail about the choices can leak
    let draft = common::create_title(&client, &server.base_url, &owner, "Draft deck", "draft").await?;
    let draft_q = common::create_question(
        &client,
        &server.base_url,
        &owner,
        draft["id"].as_str().unwrap(),
        "single",
        json!([
            { "text": "right", "is_correct": true, "position": 1 },
            { "text": "wrong", "is_correct": false, "position": 2 },
        ]),
    )
    .await?;
    let res = check(
        &client,
        &server.base_url,
        Some(&other),
        draft_q["id"].as_str().unwrap(),
        json!(["00000000-0000-0000-0000-000000000000"]),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The owner can grade questions under a draft title
    let (draft_correct, _) = common::split_choice_ids(&draft_q);
    let res = check(
        &client,
        &server.base_url,
        Some(&owner),
        draft_q["id"].as_str().unwrap(),
        json!([draft_correct[0]]),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn grading_validation_failures() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await {
        eprintln!("skipping: no database configured");
        return Ok(());
    }
    let client = reqwest::Client::new();

    let (owner, _) = common::register_and_login(&client, &server.base_url, "gval").await?;
    let title = common::create_title(&client, &server.base_url, &owner, "Validation deck", "public").await?;
    let question = common::create_question(
        &client,
        &server.base_url,
        &owner,
        title["id"].as_str().unwrap(),
        "multiple",
        json!([
            { "text": "right 1", "is_correct": true, "position": 1 },
            { "text": "right 2", "is_correct": true, "position": 2 },
            { "text": "wrong", "is_correct": false, "position": 3 },
        ]),
    )
    .await?;
    let qid = question["id"].as_str().unwrap();
    let (correct, _) = common::split_choice_ids(&question);

    // Empty selection
    let res = check(&client, &server.base_url, Some(&owner), qid, json!([])).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");

    // Duplicate ids
    let res = check(
        &client,
        &server.base_url,
        Some(&owner),
        qid,
        json!([correct[0], correct[0]]),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // A choice id that belongs to no choice of this question, named in the error
    let foreign = "11111111-2222-3333-4444-555555555555";
    let res = check(&client, &server.base_url, Some(&owner), qid, json!([foreign])).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    let message = body["field_errors"]["selected_choice_ids"]
        .as_str()
        .unwrap_or_default();
    assert!(message.contains(foreign), "error should name the id: {}", message);
    Ok(())
}

#[tokio::test]
async fn authoring_rules_enforced_on_create() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await {
        eprintln!("skipping: no database configured");
        return Ok(());
    }
    let client = reqwest::Client::new();

    let (owner, _) = common::register_and_login(&client, &server.base_url, "author").await?;
    let title = common::create_title(&client, &server.base_url, &owner, "Author deck", "draft").await?;
    let title_id = title["id"].as_str().unwrap();

    let attempt = |choices: Value, question_type: &'static str| {
        let client = client.clone();
        let url = format!("{}/api/quiz/questions", server.base_url);
        let owner = owner.clone();
        let title_id = title_id.to_string();
        async move {
            client
                .post(url)
                .bearer_auth(owner)
                .json(&json!({
                    "title_id": title_id,
                    "text": "Will this validate?",
                    "question_type": question_type,
                    "position": 0,
                    "choices": choices,
                }))
                .send()
                .await
        }
    };

    // One choice only: rejected
    let res = attempt(json!([{ "text": "only", "is_correct": true, "position": 1 }]), "single").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Single-choice question with two correct choices: rejected
    let res = attempt(
        json!([
            { "text": "a", "is_correct": true, "position": 1 },
            { "text": "b", "is_correct": true, "position": 2 },
        ]),
        "single",
    )
    .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Multiple-choice question with one correct choice: rejected
    let res = attempt(
        json!([
            { "text": "a", "is_correct": true, "position": 1 },
            { "text": "b", "is_correct": false, "position": 2 },
        ]),
        "multiple",
    )
    .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Six choices: rejected
    let res = attempt(
        json!([
            { "text": "a", "is_correct": true, "position": 1 },
            { "text": "b", "is_correct": false, "position": 2 },
            { "text": "c", "is_correct": false, "position": 3 },
            { "text": "d", "is_correct": false, "position": 4 },
            { "text": "e", "is_correct": false, "position": 5 },
            { "text": "f", "is_correct": false, "position": 6 },
        ]),
        "single",
    )
    .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
