mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn anonymous_sees_only_public_titles() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await {
        eprintln!("skipping: no database configured");
        return Ok(());
    }
    let client = reqwest::Client::new();

    let (token, _) = common::register_and_login(&client, &server.base_url, "lister").await?;
    let public = common::create_title(&client, &server.base_url, &token, "Visible deck", "public").await?;
    let private = common::create_title(&client, &server.base_url, &token, "Hidden deck", "private").await?;

    // Anonymous listing contains the public title but never the private one
    let res = client
        .get(format!("{}/api/quiz/titles?page_size=50", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let ids: Vec<&str> = body["data"]["results"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["id"].as_str())
        .collect();
    assert!(ids.contains(&public["id"].as_str().unwrap()));
    assert!(!ids.contains(&private["id"].as_str().unwrap()));

    // The owner sees both
    let res = client
        .get(format!("{}/api/quiz/titles?page_size=50", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    let body: Value = res.json().await?;
    let ids: Vec<&str> = body["data"]["results"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["id"].as_str())
        .collect();
    assert!(ids.contains(&private["id"].as_str().unwrap()));
    Ok(())
}

#[tokio::test]
async fn private_title_detail_is_owner_only() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await {
        eprintln!("skipping: no database configured");
        return Ok(());
    }
    let client = reqwest::Client::new();

    let (owner, _) = common::register_and_login(&client, &server.base_url, "owner").await?;
    let (other, _) = common::register_and_login(&client, &server.base_url, "other").await?;
    let title = common::create_title(&client, &server.base_url, &owner, "Secret deck", "private").await?;
    let url = format!("{}/api/quiz/titles/{}", server.base_url, title["id"].as_str().unwrap());

    // Anonymous: unauthorized
    let res = client.get(&url).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Authenticated non-owner: forbidden
    let res = client.get(&url).bearer_auth(&other).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Owner: ok
    let res = client.get(&url).bearer_auth(&owner).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn writes_are_owner_only_with_distinct_denials() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await {
        eprintln!("skipping: no database configured");
        return Ok(());
    }
    let client = reqwest::Client::new();

    let (owner, _) = common::register_and_login(&client, &server.base_url, "wowner").await?;
    let (other, _) = common::register_and_login(&client, &server.base_url, "wother").await?;
    let title = common::create_title(&client, &server.base_url, &owner, "Editable deck", "public").await?;
    let url = format!("{}/api/quiz/titles/{}", server.base_url, title["id"].as_str().unwrap());
    let patch = json!({ "name": "Renamed deck" });

    // Anonymous write on an existing title: unauthorized
    let res = client.patch(&url).json(&patch).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Authenticated non-owner write: forbidden
    let res = client.patch(&url).bearer_auth(&other).json(&patch).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Owner write: ok, and the change sticks
    let res = client.patch(&url).bearer_auth(&owner).json(&patch).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["name"], "Renamed deck");
    Ok(())
}

#[tokio::test]
async fn create_requires_authentication() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/quiz/titles", server.base_url))
        .json(&json!({ "name": "Nope", "status": "public" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn deleting_a_title_cascades_to_questions() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await {
        eprintln!("skipping: no database configured");
        return Ok(());
    }
    let client = reqwest::Client::new();

    let (token, _) = common::register_and_login(&client, &server.base_url, "cascade").await?;
    let title = common::create_title(&client, &server.base_url, &token, "Doomed deck", "public").await?;
    let title_id = title["id"].as_str().unwrap();

    let question = common::create_question(
        &client,
        &server.base_url,
        &token,
        title_id,
        "single",
        json!([
            { "text": "right", "is_correct": true, "position": 1 },
            { "text": "wrong", "is_correct": false, "position": 2 },
        ]),
    )
    .await?;
    let question_id = question["id"].as_str().unwrap();

    let res = client
        .delete(format!("{}/api/quiz/titles/{}", server.base_url, title_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // The question went with it
    let res = client
        .get(format!("{}/api/quiz/questions/{}", server.base_url, question_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn title_questions_listing_respects_visibility_and_order() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_ready(server).await {
        eprintln!("skipping: no database configured");
        return Ok(());
    }
    let client = reqwest::Client::new();

    let (token, _) = common::register_and_login(&client, &server.base_url, "qlist").await?;
    let title = common::create_title(&client, &server.base_url, &token, "Ordered deck", "draft").await?;
    let title_id = title["id"].as_str().unwrap();

    // Two questions with auto-assigned positions 1 and 2
    for _ in 0..2 {
        common::create_question(
            &client,
            &server.base_url,
            &token,
            title_id,
            "single",
            json!([
                { "text": "right", "is_correct": true, "position": 1 },
                { "text": "wrong", "is_correct": false, "position": 2 },
            ]),
        )
        .await?;
    }

    let url = format!("{}/api/quiz/titles/{}/questions", server.base_url, title_id);

    // Draft titles hide their questions from anonymous callers
    let res = client.get(&url).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Owner sees them in display order
    let res = client.get(&url).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let positions: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|q| q["position"].as_i64())
        .collect();
    assert_eq!(positions, vec![1, 2]);

    // Random mode still returns the same set
    let res = client
        .get(format!("{}?random=true", url))
        .bearer_auth(&token)
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    Ok(())
}
