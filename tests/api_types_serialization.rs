use bunyang::api::{AnalysisResult, HistoryEntry, RadarPoint, SiteDetails, SiteResult};
use bunyang::workflow::CampaignConfig;
use serde_json::json;

#[test]
fn serializes_default_campaign_as_analysis_request() {
    let request = CampaignConfig::manual("의정부 신곡동").to_request(None);
    let value = serde_json::to_value(request).unwrap();
    assert_eq!(
        value,
        json!({
            "field_name": "의정부 신곡동 (신규 등록)",
            "address": "의정부 신곡동",
            "product_category": "아파트",
            "sales_stage": "사전 의향서",
            "down_payment": "10%",
            "interest_benefit": "무이자",
            "additional_benefits": [],
            "main_concern": "DB 수량 부족",
            "monthly_budget": 1000,
            "existing_media": ["인스타그램", "블로그"],
            "sales_price": 2800,
            "target_area_price": 3200,
            "down_payment_amount": 3000,
            "supply_volume": 300,
            "field_keypoints": ""
        })
    );
}

#[test]
fn serializes_request_with_email() {
    let request = CampaignConfig::default().to_request(Some("agent@example.com"));
    let value = serde_json::to_value(request).unwrap();
    assert_eq!(value["user_email"], "agent@example.com");
}

#[test]
fn radar_point_uses_chart_keys() {
    let point = RadarPoint {
        subject: "입지".to_string(),
        site: 80.0,
        market: 65.0,
        full_mark: 100.0,
    };
    let value = serde_json::to_value(&point).unwrap();
    assert_eq!(
        value,
        json!({ "subject": "입지", "A": 80.0, "B": 65.0, "fullMark": 100.0 })
    );

    let back: RadarPoint = serde_json::from_value(value).unwrap();
    assert_eq!(back, point);
}

#[test]
fn site_result_omits_unknown_optional_fields() {
    let site = SiteResult::new("s1", "힐스테이트 A", "서울시");
    let value = serde_json::to_value(site).unwrap();
    assert_eq!(
        value,
        json!({ "id": "s1", "name": "힐스테이트 A", "address": "서울시" })
    );
}

#[test]
fn site_result_rejects_missing_name() {
    let parsed = serde_json::from_value::<SiteResult>(json!({ "id": "s1", "address": "서울시" }));
    assert!(parsed.is_err());
}

#[test]
fn decodes_fractional_scores() {
    let result: AnalysisResult = serde_json::from_value(json!({
        "score": 82.5,
        "score_breakdown": {
            "price_score": 34.5,
            "location_score": 25,
            "benefit_score": 23.0,
            "total_score": 82.5
        }
    }))
    .unwrap();

    assert_eq!(result.score, 82.5);
    assert_eq!(result.score_breakdown.price_score, 34.5);
    assert_eq!(result.score_breakdown.location_score, 25.0);
}

#[test]
fn decodes_fractional_history_score() {
    let entry: HistoryEntry = serde_json::from_value(json!({
        "id": 4,
        "field_name": "의정부 자이",
        "address": "의정부시",
        "score": 81.2,
        "created_at": "2026-03-01T09:30:00",
        "response_json": "{\"score\": 81.2}"
    }))
    .unwrap();

    assert_eq!(entry.score, 81.2);
    assert_eq!(entry.result().unwrap().score, 81.2);
}

#[test]
fn decodes_fractional_site_figures() {
    let details: SiteDetails = serde_json::from_value(json!({
        "name": "힐스테이트 의정부",
        "price": 2850.5,
        "target_price": 3100,
        "supply": 1816.0
    }))
    .unwrap();

    assert_eq!(details.price, Some(2850.5));
    assert_eq!(details.target_price, Some(3100.0));
    assert_eq!(details.supply, Some(1816.0));
}
