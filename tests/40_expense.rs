mod common;

use anyhow::Result;
use chrono::Utc;
use portfolio_api::database::{Document, DocumentStore};
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

async fn category(server: &common::TestServer, token: &str, kind: &str) -> Result<String> {
    let (status, body) = server
        .post(
            "/portfolio/expense/category/create",
            Some(token),
            json!({ "title": format!("cat {}", kind), "type": kind }),
        )
        .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "category create: {} {}", status, body);

    let (_, body) = server.get("/portfolio/expense/category/get-all", Some(token)).await?;
    let id = body["categories"]
        .as_array()
        .and_then(|all| all.iter().find(|c| c["type"] == json!(kind)))
        .and_then(|c| c["_id"].as_str())
        .map(str::to_string);
    id.ok_or_else(|| anyhow::anyhow!("created category not listed"))
}

fn item_doc(user_id: &str, category_id: &str, kind: &str, title: &str, created_at: &str) -> Document {
    let doc = json!({
        "_id": Uuid::new_v4().to_string(),
        "category_id": category_id,
        "user_id": user_id,
        "type": kind,
        "title": title,
        "remark": "",
        "amount": 10.0,
        "t1": "",
        "t2": "",
        "created_at": created_at,
        "updated_at": created_at,
    });
    doc.as_object().cloned().expect("item literal is an object")
}

#[tokio::test]
async fn categories_are_scoped_to_their_owner() -> Result<()> {
    let server = common::spawn().await?;
    let (ann, ann_id) = server.account("ann@example.com", "secret1").await?;
    let (bob, _) = server.account("bob@example.com", "secret2").await?;

    let cat = category(&server, &ann, "001").await?;
    let stored = server.all("ExpenseCategories").await?;
    assert_eq!(stored[0]["user_id"], json!(ann_id));

    let (_, body) = server.get("/portfolio/expense/category/get-all", Some(&bob)).await?;
    assert_eq!(body["categories"], json!([]));

    let (status, _) = server
        .get(&format!("/portfolio/expense/category/get-one/{}", cat), Some(&bob))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = server
        .delete(&format!("/portfolio/expense/category/delete/{}", cat), Some(&bob))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], json!("You are not allowed to delete this expense category"));
    assert_eq!(server.count("ExpenseCategories").await?, 1);

    let (status, _) = server
        .put(
            &format!("/portfolio/expense/category/update/{}", cat),
            Some(&ann),
            json!({ "title": "Salary" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = server
        .get(&format!("/portfolio/expense/category/get-one/{}", cat), Some(&ann))
        .await?;
    assert_eq!(body["category"]["title"], json!("Salary"));

    // The site owner has no account to own expense data
    let owner = server.owner_token().await?;
    let (status, _) = server.get("/portfolio/expense/category/get-all", Some(&owner)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn foreign_items_cannot_be_changed() -> Result<()> {
    let server = common::spawn().await?;
    let (ann, _) = server.account("ann@example.com", "secret1").await?;
    let (bob, _) = server.account("bob@example.com", "secret2").await?;
    let cat = category(&server, &ann, "002").await?;

    let (status, _) = server
        .post(
            "/portfolio/expense/item/create",
            Some(&bob),
            json!({ "category_id": cat, "title": "sneaky", "amount": 1.0 }),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server
        .post(
            "/portfolio/expense/item/create",
            Some(&ann),
            json!({ "category_id": cat, "title": "Rent", "amount": 500.0, "user_id": "someone-else" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let before = server.all("ExpenseItems").await?;
    assert_eq!(before.len(), 1);
    // Type inherited from the category
    assert_eq!(before[0]["type"], json!("002"));
    let item_id = before[0]["_id"].as_str().unwrap().to_string();

    let (status, _) = server
        .put(
            &format!("/portfolio/expense/item/update/{}", item_id),
            Some(&bob),
            json!({ "amount": 1.0 }),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = server
        .delete(&format!("/portfolio/expense/item/delete/{}", item_id), Some(&bob))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(server.all("ExpenseItems").await?, before);

    let (status, _) = server
        .put(
            &format!("/portfolio/expense/item/update/{}", item_id),
            Some(&ann),
            json!({ "amount": -3 }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .put(
            &format!("/portfolio/expense/item/update/{}", item_id),
            Some(&ann),
            json!({ "amount": 450.5 }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = server
        .get(&format!("/portfolio/expense/item/get-one/{}", item_id), Some(&ann))
        .await?;
    assert_eq!(body["item"]["amount"], json!(450.5));

    let (status, body) = server
        .delete(&format!("/portfolio/expense/item/delete/{}", Uuid::new_v4()), Some(&ann))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Expense item not found or access denied"));
    Ok(())
}

#[tokio::test]
async fn incomes_and_outcomes_are_partitioned_by_year_and_type() -> Result<()> {
    let server = common::spawn().await?;
    let (ann, ann_id) = server.account("ann@example.com", "secret1").await?;
    let (_, bob_id) = server.account("bob@example.com", "secret2").await?;
    let cat = Uuid::new_v4().to_string();

    let docs = [
        item_doc(&ann_id, &cat, "001", "salary-2023", "2023-12-31T23:59:59Z"),
        item_doc(&ann_id, &cat, "001", "salary-jan", "2024-01-01T00:00:00Z"),
        item_doc(&ann_id, &cat, "001", "salary-dec", "2024-12-31T23:59:59.500Z"),
        item_doc(&ann_id, &cat, "002", "rent", "2024-06-01T12:00:00Z"),
        item_doc(&ann_id, &cat, "001", "salary-2025", "2025-01-01T00:00:00Z"),
        item_doc(&bob_id, &cat, "001", "bob-salary", "2024-03-01T00:00:00Z"),
    ];
    for doc in docs {
        server.store.insert_one("ExpenseItems", doc).await?;
    }

    let titles = |body: &Value, key: &str| -> Vec<String> {
        body[key]
            .as_array()
            .map(|items| items.iter().filter_map(|i| i["title"].as_str().map(str::to_string)).collect())
            .unwrap_or_default()
    };

    let (status, body) = server.get("/portfolio/expense/item/incomes?year=2024", Some(&ann)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body, "incomes"), vec!["salary-jan", "salary-dec"]);

    let (status, body) = server.get("/portfolio/expense/item/outcomes?year=2024", Some(&ann)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body, "outcomes"), vec!["rent"]);

    let (_, body) = server.get("/portfolio/expense/item/incomes?year=2023", Some(&ann)).await?;
    assert_eq!(titles(&body, "incomes"), vec!["salary-2023"]);

    let (status, body) = server.get("/portfolio/expense/item/incomes", Some(&ann)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Year is required"));

    let (status, body) = server.get("/portfolio/expense/item/outcomes?year=twenty", Some(&ann)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Invalid year format"));

    // Freshly created items land in the current year
    let real_cat = category(&server, &ann, "001").await?;
    server
        .post(
            "/portfolio/expense/item/create",
            Some(&ann),
            json!({ "category_id": real_cat, "title": "today", "amount": 5 }),
        )
        .await?;
    let year = Utc::now().format("%Y").to_string();
    let (_, body) = server
        .get(&format!("/portfolio/expense/item/incomes?year={}", year), Some(&ann))
        .await?;
    assert!(titles(&body, "incomes").contains(&"today".to_string()));
    Ok(())
}
