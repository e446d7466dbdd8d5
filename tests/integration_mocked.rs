/// Integration tests with a mocked core API
/// Exercises the HTTP client and identifier resolution without a real backend
use painel_credito::api_client::CoreApiClient;
use painel_credito::config::Config;
use painel_credito::errors::AppError;
use painel_credito::resolver::EmpresaResolver;
use painel_credito::score::score_to_percent;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to create a test config pointing at the mock server
fn create_test_config(api_base_url: String) -> Config {
    Config {
        api_base_url,
        ..Config::default()
    }
}

fn create_test_client(mock_server: &MockServer) -> CoreApiClient {
    let config = create_test_config(mock_server.uri());
    CoreApiClient::new(&config, None).expect("client should build")
}

#[tokio::test]
async fn test_direct_lookup_resolves_to_backend_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empresas/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "CNPJ_00042",
            "cnpj": "12345678000195"
        })))
        .mount(&mock_server)
        .await;

    let resolver = EmpresaResolver::new(create_test_client(&mock_server));
    assert_eq!(resolver.resolve("42").await, "CNPJ_00042");
}

#[tokio::test]
async fn test_resolution_is_idempotent_for_canonical_ids() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empresas/CNPJ_00042"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "CNPJ_00042"
        })))
        .mount(&mock_server)
        .await;

    let resolver = EmpresaResolver::new(create_test_client(&mock_server));
    assert_eq!(resolver.resolve("CNPJ_00042").await, "CNPJ_00042");
    // Second resolution hits the cache and stays stable
    assert_eq!(resolver.resolve("CNPJ_00042").await, "CNPJ_00042");
}

#[tokio::test]
async fn test_list_scan_matches_cnpj_digits() {
    let mock_server = MockServer::start().await;

    // Direct lookups all miss (unmatched requests 404), the list scan wins
    Mock::given(method("GET"))
        .and(path("/empresas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "EMP_1", "cnpj": "99.999.999/9999-99" },
            { "id": "EMP_2", "cnpj": "12.345.678/0001-95" }
        ])))
        .mount(&mock_server)
        .await;

    let resolver = EmpresaResolver::new(create_test_client(&mock_server));
    assert_eq!(resolver.resolve("12345678000195").await, "EMP_2");
}

#[tokio::test]
async fn test_unresolvable_input_is_returned_unchanged() {
    let mock_server = MockServer::start().await;
    // No mocks at all: every lookup fails, the list comes back empty

    Mock::given(method("GET"))
        .and(path("/empresas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let resolver = EmpresaResolver::new(create_test_client(&mock_server));
    assert_eq!(resolver.resolve("  nada-disso  ").await, "nada-disso");
}

#[tokio::test]
async fn test_candidate_lookup_wins_after_list_scan_misses() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empresas"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    // Only the symbolic candidate exists
    Mock::given(method("GET"))
        .and(path("/empresas/CNPJ_00042"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "CNPJ_00042"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/empresas/42"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/empresas/00000000000042"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let resolver = EmpresaResolver::new(create_test_client(&mock_server));
    assert_eq!(resolver.resolve("42").await, "CNPJ_00042");
}

#[tokio::test]
async fn test_score_payload_normalizes_to_percent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empresas/CNPJ_00042/score"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "empresaId": "CNPJ_00042",
            "score": 0.82,
            "modelo": "rf-baseline",
            "versao": "1.0.0"
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let score = client.get_empresa_score("CNPJ_00042").await.unwrap();
    assert_eq!(score_to_percent(score.score), 82.0);
    assert_eq!(score.modelo.as_deref(), Some("rf-baseline"));
}

#[tokio::test]
async fn test_missing_company_maps_to_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empresas/NADA/score"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    match client.get_empresa_score("NADA").await {
        Err(AppError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_macro_request_repeats_serie_param() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/macro"))
        .and(query_param("from", "2024-01-01"))
        .and(query_param("horizonte", "6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "serieId": "selic",
                "serie": [10.5],
                "historicoTimestamps": ["2024-01-01"],
                "forecast": [10.0],
                "forecastTimestamps": ["2024-02-01"],
                "fonte": "Banco Central do Brasil - SGS 432"
            }
        ])))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let series = client
        .get_macro_series(&["selic", "ipca"], "2024-01-01", 6)
        .await
        .unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].serie_id.as_deref(), Some("selic"));
}

#[tokio::test]
async fn test_single_macro_object_is_wrapped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/macro"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "serieId": "ipca",
            "serie": [4.2],
            "historicoTimestamps": ["2024-03-01"]
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let series = client
        .get_macro_series(&["ipca"], "2024-01-01", 0)
        .await
        .unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].serie_id.as_deref(), Some("ipca"));
}

#[tokio::test]
async fn test_decisoes_filter_and_creation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/decisoes"))
        .and(query_param("empresaId", "CNPJ_00042"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "empresaId": "CNPJ_00042",
                "dtDecisao": "2024-05-01T10:00:00",
                "score": 0.82,
                "aprovacao": true,
                "limite": 150000.0,
                "moeda": "BRL"
            }
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/decisoes"))
        .and(body_json(json!({ "empresaId": "CNPJ_00042" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 2,
            "empresaId": "CNPJ_00042",
            "aprovacao": false
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let decisoes = client
        .list_decisoes(Some("CNPJ_00042"), 50)
        .await
        .unwrap();
    assert_eq!(decisoes.len(), 1);
    assert_eq!(decisoes[0].empresa_id, "CNPJ_00042");

    let created = client.create_decisao("CNPJ_00042").await.unwrap();
    assert_eq!(created.id, 2);
    assert_eq!(created.aprovacao, Some(false));
}

#[tokio::test]
async fn test_bearer_token_is_sent_when_present() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empresas"))
        .and(wiremock::matchers::header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let client = CoreApiClient::new(&config, Some("tok-1".to_string())).unwrap();
    assert!(client.list_empresas().await.unwrap().is_empty());
}
