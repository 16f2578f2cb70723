//! Campaign workflow against a recording fake backend

mod common;

use bunyang::api::{
    AnalysisResult, CopySamples, HistoryEntry, LeadForm, RoiForecast, SiteDetails,
};
use bunyang::workflow::{AnalysisSource, Selection, Workflow, WorkflowError};
use common::{site, FakeBackend};

fn remote_result() -> AnalysisResult {
    AnalysisResult {
        score: 91.0,
        market_diagnosis: "수요 대비 공급 부족".to_string(),
        roi_forecast: RoiForecast {
            expected_leads: 60.0,
            expected_cpl: 30_000.0,
            conversion_rate: 5.0,
        },
        lms_copy_samples: vec!["기존 카피".to_string()],
        channel_talk_samples: vec!["기존 채널톡".to_string()],
        ..AnalysisResult::default()
    }
}

#[tokio::test]
async fn test_prepare_uses_site_details() {
    let backend = FakeBackend::new();
    backend.details.lock().unwrap().insert(
        "s1".to_string(),
        SiteDetails {
            id: Some("s1".into()),
            name: "의정부 자이".into(),
            address: Some("의정부시 신곡동".into()),
            category: Some("오피스텔".into()),
            price: Some(2100.0),
            target_price: None,
            supply: Some(0.0),
        },
    );
    let workflow = Workflow::new(backend);

    let config = workflow
        .prepare(Selection::Site(site("s1", "의정부 자이", "의정부시")))
        .await;

    assert_eq!(config.field_name, "의정부 자이");
    assert_eq!(config.address, "의정부시 신곡동");
    assert_eq!(config.product_category, "오피스텔");
    assert_eq!(config.sales_price, 2100);
    assert_eq!(config.target_price, 3200, "missing figure keeps default");
    assert_eq!(config.supply, 300, "zero figure keeps default");
    assert!(!config.is_manual());
}

#[tokio::test]
async fn test_prepare_keeps_site_with_fractional_figures() {
    let backend = FakeBackend::new();
    backend.details.lock().unwrap().insert(
        "s2".to_string(),
        serde_json::from_value(serde_json::json!({
            "name": "힐스테이트 의정부",
            "price": 2850.5,
            "supply": 1816.0
        }))
        .unwrap(),
    );
    let workflow = Workflow::new(backend);

    let config = workflow
        .prepare(Selection::Site(site("s2", "힐스테이트 의정부", "의정부시")))
        .await;

    assert!(!config.is_manual());
    assert_eq!(config.sales_price, 2851);
    assert_eq!(config.supply, 1816);
}

#[tokio::test]
async fn test_analyze_keeps_fractional_remote_score() {
    let backend = FakeBackend::new();
    *backend.analysis.lock().unwrap() = Some(
        serde_json::from_value(serde_json::json!({"score": 82.5, "market_diagnosis": "양호"}))
            .unwrap(),
    );
    let workflow = Workflow::new(backend);

    let config = workflow.prepare(Selection::Manual("양주".into())).await;
    let analysis = workflow.analyze(&config, None).await;

    assert_eq!(analysis.source, AnalysisSource::Remote);
    assert_eq!(analysis.result.score, 82.5);
}

#[tokio::test]
async fn test_prepare_falls_back_to_manual_when_details_fail() {
    let workflow = Workflow::new(FakeBackend::new());

    let config = workflow
        .prepare(Selection::Site(site("gone", "사라진 현장", "어딘가")))
        .await;

    assert_eq!(config.field_name, "사라진 현장 (신규 등록)");
    assert!(config.is_manual());
}

#[tokio::test]
async fn test_prepare_manual_selection() {
    let workflow = Workflow::new(FakeBackend::new());
    let config = workflow
        .prepare(Selection::Manual("  양주 옥정  ".into()))
        .await;

    assert_eq!(config.field_name, "양주 옥정 (신규 등록)");
    assert_eq!(config.address, "양주 옥정");
}

#[tokio::test]
async fn test_analyze_remote_result() {
    let backend = FakeBackend::new();
    *backend.analysis.lock().unwrap() = Some(remote_result());
    let workflow = Workflow::new(backend.clone());

    let mut config = workflow.prepare(Selection::Manual("양주".into())).await;
    config.monthly_budget = 2000;

    let analysis = workflow.analyze(&config, Some("agent@example.com")).await;

    assert_eq!(analysis.source, AnalysisSource::Remote);
    assert_eq!(analysis.result.score, 91.0);
    assert_eq!(analysis.monthly_budget, 2000);

    let sent = backend.analyze_requests.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user_email.as_deref(), Some("agent@example.com"));
    assert_eq!(sent[0].monthly_budget, 2000);

    // Doubling the budget doubles the leads.
    let projection = analysis.project(4000);
    assert!((projection.expected_leads - 120.0).abs() < 1e-9);
    assert!((projection.expected_contracts - 6.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_analyze_falls_back_to_local_report() {
    let workflow = Workflow::new(FakeBackend::new());
    let mut config = workflow.prepare(Selection::Manual("양주".into())).await;
    config.sales_price = 1900;

    let analysis = workflow.analyze(&config, None).await;

    assert_eq!(analysis.source, AnalysisSource::LocalFallback);
    assert_eq!(analysis.result.score, 82.0);
    assert_eq!(analysis.result.price_data[0].price, 1900.0);
    assert!(!analysis.result.lms_copy_samples.is_empty());
}

#[tokio::test]
async fn test_regenerate_copy_replaces_only_samples() {
    let backend = FakeBackend::new();
    *backend.analysis.lock().unwrap() = Some(remote_result());
    *backend.copy.lock().unwrap() = Some(CopySamples {
        lms_copy_samples: vec!["새 카피 1".into(), "새 카피 2".into()],
        channel_talk_samples: vec!["새 채널톡".into()],
    });
    let workflow = Workflow::new(backend.clone());

    let config = workflow.prepare(Selection::Manual("양주".into())).await;
    let mut analysis = workflow.analyze(&config, Some("agent@example.com")).await;
    workflow.regenerate_copy(&config, &mut analysis).await.unwrap();

    assert_eq!(analysis.result.lms_copy_samples, vec!["새 카피 1", "새 카피 2"]);
    assert_eq!(analysis.result.channel_talk_samples, vec!["새 채널톡"]);
    assert_eq!(analysis.result.score, 91.0);
    assert_eq!(analysis.result.market_diagnosis, "수요 대비 공급 부족");

    let copy_requests = backend.copy_requests.lock().unwrap();
    assert_eq!(copy_requests[0].user_email, None);
}

#[tokio::test]
async fn test_failed_regeneration_leaves_report_untouched() {
    let backend = FakeBackend::new();
    *backend.analysis.lock().unwrap() = Some(remote_result());
    let workflow = Workflow::new(backend);

    let config = workflow.prepare(Selection::Manual("양주".into())).await;
    let mut analysis = workflow.analyze(&config, None).await;
    let before = analysis.clone();

    let err = workflow
        .regenerate_copy(&config, &mut analysis)
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Api(_)));
    assert_eq!(analysis, before);
}

#[tokio::test]
async fn test_submit_lead_requires_every_field() {
    let backend = FakeBackend::new();
    let workflow = Workflow::new(backend.clone());

    let partial = LeadForm {
        name: "홍길동".into(),
        phone: "  ".into(),
        rank: String::new(),
        site: "의정부 자이".into(),
    };
    match workflow.submit_lead(&partial).await {
        Err(WorkflowError::MissingFields(fields)) => assert_eq!(fields, vec!["phone", "rank"]),
        other => panic!("expected missing fields, got {other:?}"),
    }
    assert!(backend.leads.lock().unwrap().is_empty());

    let complete = LeadForm {
        phone: "010-0000-0000".into(),
        rank: "본부장".into(),
        ..partial
    };
    workflow.submit_lead(&complete).await.unwrap();
    assert_eq!(backend.leads.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_history_and_reload() {
    let backend = FakeBackend::new();
    let stored = remote_result();
    backend.history.lock().unwrap().push(HistoryEntry {
        id: 12,
        field_name: "의정부 자이".into(),
        address: "의정부시".into(),
        score: stored.score,
        created_at: "2026-02-10T08:00:00Z".into(),
        response_json: serde_json::to_string(&stored).unwrap(),
    });
    let workflow = Workflow::new(backend.clone());

    let entries = workflow.history(Some("agent@example.com")).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        *backend.history_queries.lock().unwrap(),
        vec![Some("agent@example.com".to_string())]
    );

    let (config, analysis) = workflow.load_history(&entries[0]).unwrap();
    assert_eq!(config.field_name, "의정부 자이");
    assert_eq!(analysis.source, AnalysisSource::History);
    assert_eq!(analysis.result, stored);
}

#[tokio::test]
async fn test_corrupt_history_entry() {
    let workflow = Workflow::new(FakeBackend::new());
    let entry = HistoryEntry {
        id: 1,
        field_name: "깨진 이력".into(),
        address: String::new(),
        score: 0.0,
        created_at: String::new(),
        response_json: "{not json".into(),
    };

    assert!(matches!(
        workflow.load_history(&entry),
        Err(WorkflowError::CorruptHistory(_))
    ));
}
