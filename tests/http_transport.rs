//! End-to-end tests over HTTP against a mock ExpenseVista server

use expensevista_client::{
    ClientConfig, ClientError, ExpenseClient, LoginRequest, PageRequest, ProfileStorage,
    ReportPeriod, ReqwestTransport,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ExpenseClient {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let config = ClientConfig::builder().base_url(&server.uri()).build();
    let transport = Arc::new(ReqwestTransport::new(&config).unwrap());
    ExpenseClient::with_transport(config, transport, ProfileStorage::session_only())
}

fn dashboard_body() -> serde_json::Value {
    json!({
        "summary": { "totalIncome": 1200.0, "totalExpenses": 450.5 },
        "budget": {
            "id": 3,
            "monthlyLimit": 1000.0,
            "budgetMonth": "2024-05-01T00:00:00",
            "currentUsage": 450.5,
            "remainingAmount": 549.5,
            "percentageUsed": 45.05
        }
    })
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "ada@example.com", "password": "pw" })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "refreshToken=r1; Path=/; HttpOnly")
                .set_body_json(json!({
                    "token": { "accessToken": "T1" },
                    "user": { "id": "u1", "firstName": "Ada", "email": "ada@example.com" }
                })),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_attaches_bearer_credential() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .and(header("Authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dashboard_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let user = client
        .login(&LoginRequest::new("ada@example.com", "pw"))
        .await
        .unwrap();
    assert_eq!(user.display_name(), "Ada");

    let dashboard = client.dashboard().get().await.unwrap();
    assert_eq!(dashboard.budget.monthly_limit, 1000.0);
}

#[tokio::test]
async fn test_expired_credential_is_renewed_with_session_cookie() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .and(header("Authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    // The renewal call carries the cookie from login and no bearer credential
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(header("cookie", "refreshToken=r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "T2" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .and(header("Authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dashboard_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .login(&LoginRequest::new("ada@example.com", "pw"))
        .await
        .unwrap();

    let dashboard = client.dashboard().get().await.unwrap();
    assert_eq!(dashboard.budget.percentage_used, 45.05);
    assert_eq!(client.credentials().get().unwrap().as_str(), "T2");

    let requests = server.received_requests().await.unwrap();
    let refresh = requests
        .iter()
        .find(|r| r.url.path() == "/api/auth/refresh")
        .unwrap();
    assert!(!refresh.headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_unconfirmed_email_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "EMAIL_NOT_CONFIRMED" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .login(&LoginRequest::new("ada@example.com", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::EmailNotConfirmed));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_validation_messages_are_extracted() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Validation failed",
            "errors": { "Name": ["Name is required"] }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .login(&LoginRequest::new("ada@example.com", "pw"))
        .await
        .unwrap();

    let err = client.categories().create("").await.unwrap_err();
    assert_eq!(
        err.user_messages(),
        vec!["Validation failed", "Name: Name is required"]
    );
}

#[tokio::test]
async fn test_analytics_report_and_export() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/analytics"))
        .and(query_param("period", "Last 3 Months"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "timePeriod": "Last 3 Months",
            "budgetProgress": { "spent": 100.0, "total": 400.0, "percentage": 25.0 },
            "spendingByCategory": [{ "name": "Food", "value": 100.0, "percentage": 100.0 }],
            "incomeVsExpenses": [{ "month": "May", "income": 500.0, "expenses": 100.0 }],
            "financialTrend": [],
            "keyInsights": {
                "topSpendingCategory": "Food",
                "topSpendingAmount": 100.0,
                "totalTransactions": 3,
                "totalIncomeTransactions": 1,
                "totalExpenseTransactions": 2
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/report-export/export"))
        .and(body_json(json!({ "period": "This Year" })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7".to_vec()))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .login(&LoginRequest::new("ada@example.com", "pw"))
        .await
        .unwrap();

    let report = client
        .analytics()
        .report(ReportPeriod::LastThreeMonths)
        .await
        .unwrap();
    assert_eq!(report.key_insights.top_spending_category, "Food");

    let document = client
        .analytics()
        .export(ReportPeriod::ThisYear)
        .await
        .unwrap();
    assert_eq!(document.as_ref(), b"%PDF-1.7");
}

#[tokio::test]
async fn test_delete_with_no_content() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("DELETE"))
        .and(path("/transactions/42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .login(&LoginRequest::new("ada@example.com", "pw"))
        .await?;
    client.transactions().delete(42.into()).await?;
    Ok(())
}

fn transaction_json(id: u64) -> serde_json::Value {
    json!({
        "id": id,
        "amount": "12.50",
        "description": "Lunch",
        "type": 0,
        "transactionDate": "2024-05-02T12:00:00",
        "category": { "id": 1, "name": "Food" },
        "currency": "NGN",
        "convertedAmount": "12.50"
    })
}

#[tokio::test]
async fn test_transaction_stream_walks_every_page() {
    use futures::StreamExt;

    let server = MockServer::start().await;
    mount_login(&server).await;

    for (page, ids) in [(1u32, vec![1u64, 2]), (2, vec![3])] {
        Mock::given(method("GET"))
            .and(path("/transactions/paged"))
            .and(query_param("page", page.to_string()))
            .and(query_param("recordsPerPage", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": ids.iter().map(|id| transaction_json(*id)).collect::<Vec<_>>(),
                "page": page,
                "recordsPerPage": 2,
                "totalRecords": 3,
                "totalPages": 2
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    client
        .login(&LoginRequest::new("ada@example.com", "pw"))
        .await
        .unwrap();

    let transactions: Vec<_> = client
        .transactions()
        .stream(PageRequest::first(2))
        .collect()
        .await;
    let ids: Vec<String> = transactions
        .into_iter()
        .map(|t| t.unwrap().id.to_string())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_wallet_budget_and_top_up() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/wallet/balance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "balance": 2500.75 })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/budgets/3"))
        .and(body_json(json!({ "monthlyLimit": 800.0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "monthlyLimit": 800.0,
            "budgetMonth": "2024-05-01T00:00:00",
            "currentUsage": 450.5,
            "remainingAmount": 349.5,
            "percentageUsed": 56.31
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The API misspells the URL field
    Mock::given(method("POST"))
        .and(path("/paystack/initialize"))
        .and(body_json(json!({ "email": "ada@example.com", "amount": 100.0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "authoriazationUrl": "https://checkout.example/abc"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .login(&LoginRequest::new("ada@example.com", "pw"))
        .await
        .unwrap();

    assert_eq!(client.wallet().balance().await.unwrap(), 2500.75);

    let budget = client.budgets().update_monthly(3.into(), 800.0).await.unwrap();
    assert_eq!(budget.remaining_amount, 349.5);

    let url = client
        .top_up()
        .initialize("ada@example.com", 100.0)
        .await
        .unwrap();
    assert_eq!(url, "https://checkout.example/abc");
}
