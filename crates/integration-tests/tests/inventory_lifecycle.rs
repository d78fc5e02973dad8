//! End-to-end tests for the inventory reservation workflow.
//!
//! All tests here talk to a running server over HTTP and are ignored
//! by default; see the crate docs for setup. Each test creates its own
//! uniquely-named item so runs don't interfere.

use serde_json::{Value, json};
use uuid::Uuid;

use crewdesk_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, EMPLOYEE_EMAIL, EMPLOYEE_PASSWORD, TestContext,
};

async fn create_item(ctx: &TestContext, admin: &str, quantity: i32, item_type: &str) -> Value {
    let name = format!("test-item-{}", Uuid::new_v4());
    let response = ctx
        .post(
            admin,
            "/api/inventory/items",
            &json!({ "name": name, "quantity": quantity, "type": item_type }),
        )
        .await;
    assert_eq!(response.status(), 200, "item creation");
    response.json().await.expect("item body")
}

async fn item_quantity(ctx: &TestContext, token: &str, item_id: &str) -> i64 {
    let response = ctx.get(token, "/api/inventory/items").await;
    assert_eq!(response.status(), 200);
    let items: Vec<Value> = response.json().await.expect("items body");
    items
        .iter()
        .find(|i| i["id"] == item_id)
        .expect("item present")["quantity"]
        .as_i64()
        .expect("quantity")
}

async fn create_job(ctx: &TestContext, admin: &str) -> String {
    let response = ctx
        .post(admin, "/api/jobs", &json!({ "title": "lifecycle test job" }))
        .await;
    assert_eq!(response.status(), 200, "job creation");
    let job: Value = response.json().await.expect("job body");
    job["id"].as_str().expect("job id").to_owned()
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn reject_restores_reserved_stock() {
    // Scenario: stock 5, request 3, reject. The reservation comes back.
    let ctx = TestContext::new();
    let admin = ctx.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let employee = ctx.login(EMPLOYEE_EMAIL, EMPLOYEE_PASSWORD).await;

    let item = create_item(&ctx, &admin, 5, "consumable").await;
    let item_id = item["id"].as_str().expect("item id");

    let response = ctx
        .post(
            &employee,
            "/api/inventory/requests",
            &json!({ "item_id": item_id, "quantity": 3 }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let request: Value = response.json().await.expect("request body");
    assert_eq!(request["status"], "pending");
    assert_eq!(item_quantity(&ctx, &employee, item_id).await, 2);

    let request_id = request["id"].as_str().expect("request id");
    let response = ctx
        .post(
            &admin,
            &format!("/api/inventory/requests/{request_id}/reject"),
            &json!({}),
        )
        .await;
    assert_eq!(response.status(), 200);
    let rejected: Value = response.json().await.expect("reject body");
    assert_eq!(rejected["status"], "rejected");
    assert_eq!(item_quantity(&ctx, &employee, item_id).await, 5);

    // A second reject must not release the stock again.
    let response = ctx
        .post(
            &admin,
            &format!("/api/inventory/requests/{request_id}/reject"),
            &json!({}),
        )
        .await;
    assert_eq!(response.status(), 409);
    assert_eq!(item_quantity(&ctx, &employee, item_id).await, 5);
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn completing_a_job_restocks_approved_reusables() {
    // Scenario: reusable item, approved request tied to a job; moving
    // the job to completed gives the stock back.
    let ctx = TestContext::new();
    let admin = ctx.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let employee = ctx.login(EMPLOYEE_EMAIL, EMPLOYEE_PASSWORD).await;

    let item = create_item(&ctx, &admin, 5, "reusable").await;
    let item_id = item["id"].as_str().expect("item id");
    let job_id = create_job(&ctx, &admin).await;

    let response = ctx
        .post(
            &employee,
            "/api/inventory/requests",
            &json!({ "item_id": item_id, "job_id": job_id, "quantity": 2 }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let request: Value = response.json().await.expect("request body");
    let request_id = request["id"].as_str().expect("request id");
    assert_eq!(item_quantity(&ctx, &employee, item_id).await, 3);

    let response = ctx
        .post(
            &admin,
            &format!("/api/inventory/requests/{request_id}/approve"),
            &json!({}),
        )
        .await;
    assert_eq!(response.status(), 200);
    // Approval keeps the stock deducted.
    assert_eq!(item_quantity(&ctx, &employee, item_id).await, 3);

    let response = ctx
        .patch(
            &employee,
            &format!("/api/jobs/{job_id}/status"),
            &json!({ "status": "completed" }),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(item_quantity(&ctx, &employee, item_id).await, 5);
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn lost_items_stay_deducted() {
    // Scenario: completing with a 'lost' disposition records it but
    // never restocks.
    let ctx = TestContext::new();
    let admin = ctx.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let employee = ctx.login(EMPLOYEE_EMAIL, EMPLOYEE_PASSWORD).await;

    let item = create_item(&ctx, &admin, 5, "reusable").await;
    let item_id = item["id"].as_str().expect("item id");
    let job_id = create_job(&ctx, &admin).await;

    let response = ctx
        .post(
            &employee,
            "/api/inventory/requests",
            &json!({ "item_id": item_id, "job_id": job_id, "quantity": 3 }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let request: Value = response.json().await.expect("request body");
    let request_id = request["id"].as_str().expect("request id");
    assert_eq!(item_quantity(&ctx, &employee, item_id).await, 2);

    let response = ctx
        .post(
            &employee,
            &format!("/api/jobs/{job_id}/complete"),
            &json!({
                "returned_items": [
                    { "request_id": request_id, "return_status": "lost" }
                ]
            }),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(item_quantity(&ctx, &employee, item_id).await, 2);

    let response = ctx.get(&employee, "/api/inventory/requests/me").await;
    let requests: Vec<Value> = response.json().await.expect("requests body");
    let request = requests
        .iter()
        .find(|r| r["id"] == request_id)
        .expect("request present");
    assert_eq!(request["return_status"], "lost");
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn completing_with_a_finalized_request_aborts() {
    // A return manifest naming an already-rejected request answers 409
    // and rolls everything back: no second release, job not completed.
    let ctx = TestContext::new();
    let admin = ctx.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let employee = ctx.login(EMPLOYEE_EMAIL, EMPLOYEE_PASSWORD).await;

    let item = create_item(&ctx, &admin, 5, "reusable").await;
    let item_id = item["id"].as_str().expect("item id");
    let job_id = create_job(&ctx, &admin).await;

    let response = ctx
        .post(
            &employee,
            "/api/inventory/requests",
            &json!({ "item_id": item_id, "job_id": job_id, "quantity": 2 }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let request: Value = response.json().await.expect("request body");
    let request_id = request["id"].as_str().expect("request id");

    let response = ctx
        .post(
            &admin,
            &format!("/api/inventory/requests/{request_id}/reject"),
            &json!({}),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(item_quantity(&ctx, &employee, item_id).await, 5);

    let response = ctx
        .post(
            &employee,
            &format!("/api/jobs/{job_id}/complete"),
            &json!({
                "returned_items": [
                    { "request_id": request_id, "return_status": "returned" }
                ]
            }),
        )
        .await;
    assert_eq!(response.status(), 409);
    // The rejection already released the stock; the manifest must not
    // release it again, and the job's status update rolls back too.
    assert_eq!(item_quantity(&ctx, &employee, item_id).await, 5);

    let response = ctx.get(&employee, &format!("/api/jobs/{job_id}")).await;
    assert_eq!(response.status(), 200);
    let job: Value = response.json().await.expect("job body");
    assert_ne!(job["status"], "completed");
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn duplicate_manifest_entries_release_stock_once() {
    // The same request listed twice in a return manifest must not be
    // restocked twice.
    let ctx = TestContext::new();
    let admin = ctx.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let employee = ctx.login(EMPLOYEE_EMAIL, EMPLOYEE_PASSWORD).await;

    let item = create_item(&ctx, &admin, 5, "reusable").await;
    let item_id = item["id"].as_str().expect("item id");
    let job_id = create_job(&ctx, &admin).await;

    let response = ctx
        .post(
            &employee,
            "/api/inventory/requests",
            &json!({ "item_id": item_id, "job_id": job_id, "quantity": 2 }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let request: Value = response.json().await.expect("request body");
    let request_id = request["id"].as_str().expect("request id");
    assert_eq!(item_quantity(&ctx, &employee, item_id).await, 3);

    let response = ctx
        .post(
            &employee,
            &format!("/api/jobs/{job_id}/complete"),
            &json!({
                "returned_items": [
                    { "request_id": request_id, "return_status": "returned" },
                    { "request_id": request_id, "return_status": "returned" }
                ]
            }),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(item_quantity(&ctx, &employee, item_id).await, 5);
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn oversized_request_fails_and_changes_nothing() {
    // Scenario: asking for more than the stock on hand answers 409 and
    // leaves no request row behind.
    let ctx = TestContext::new();
    let admin = ctx.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let employee = ctx.login(EMPLOYEE_EMAIL, EMPLOYEE_PASSWORD).await;

    let item = create_item(&ctx, &admin, 5, "consumable").await;
    let item_id = item["id"].as_str().expect("item id");

    let response = ctx
        .post(
            &employee,
            "/api/inventory/requests",
            &json!({ "item_id": item_id, "quantity": 6 }),
        )
        .await;
    assert_eq!(response.status(), 409);
    assert_eq!(item_quantity(&ctx, &employee, item_id).await, 5);

    let response = ctx.get(&employee, "/api/inventory/requests/me").await;
    let requests: Vec<Value> = response.json().await.expect("requests body");
    assert!(
        !requests.iter().any(|r| r["item_id"] == item_id),
        "no request row for the failed reservation"
    );
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn concurrent_unit_requests_win_exactly_stock_times() {
    // N concurrent one-unit requests against stock S: exactly S
    // succeed and the quantity lands on zero.
    const WORKERS: usize = 8;
    const STOCK: i32 = 5;

    let ctx = TestContext::new();
    let admin = ctx.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let employee = ctx.login(EMPLOYEE_EMAIL, EMPLOYEE_PASSWORD).await;

    let item = create_item(&ctx, &admin, STOCK, "consumable").await;
    let item_id = item["id"].as_str().expect("item id").to_owned();

    let mut handles = Vec::with_capacity(WORKERS);
    for _ in 0..WORKERS {
        let ctx = TestContext::new();
        let token = employee.clone();
        let item_id = item_id.clone();
        handles.push(tokio::spawn(async move {
            let response = ctx
                .post(
                    &token,
                    "/api/inventory/requests",
                    &json!({ "item_id": item_id, "quantity": 1 }),
                )
                .await;
            response.status().as_u16()
        }));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.expect("task") {
            200 => successes += 1,
            409 => conflicts += 1,
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(successes, STOCK as usize);
    assert_eq!(conflicts, WORKERS - STOCK as usize);
    assert_eq!(item_quantity(&ctx, &employee, &item_id).await, 0);
}
