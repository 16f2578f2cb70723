use super::CampaignConfig;
use crate::api::types::{
    AnalysisResult, Competitor, MediaPlan, PricePoint, RadarPoint, RoiForecast, ScoreBreakdown,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn media(media: &str, feature: &str, reason: &str, strategy_example: &str) -> MediaPlan {
    MediaPlan {
        media: media.to_string(),
        feature: feature.to_string(),
        reason: reason.to_string(),
        strategy_example: strategy_example.to_string(),
    }
}

fn radar(subject: &str, site: f64, market: f64) -> RadarPoint {
    RadarPoint {
        subject: subject.to_string(),
        site,
        market,
        full_mark: 100.0,
    }
}

/// Canned report shown when the analysis backend cannot be reached
///
/// Only the price comparison reflects the configuration; everything else is
/// a fixed template.
pub fn local_analysis(config: &CampaignConfig) -> AnalysisResult {
    let sales_price = config.sales_price as f64;
    let target_price = config.target_price as f64;

    AnalysisResult {
        score: 82.0,
        score_breakdown: ScoreBreakdown {
            price_score: 35.0,
            location_score: 25.0,
            benefit_score: 22.0,
            total_score: 82.0,
        },
        market_diagnosis: "연결 오류가 발생했으나 로컬 분석 모드로 전환합니다.".to_string(),
        market_gap_percent: 12.5,
        price_data: vec![
            PricePoint {
                name: "우리 현장".to_string(),
                price: sales_price,
            },
            PricePoint {
                name: "비교군".to_string(),
                price: target_price,
            },
            PricePoint {
                name: "대장주".to_string(),
                price: target_price * 1.1,
            },
        ],
        radar_data: vec![
            radar("분양가", 85.0, 70.0),
            radar("브랜드", 90.0, 75.0),
            radar("단지규모", 70.0, 60.0),
            radar("입지", 80.0, 65.0),
            radar("분양조건", 95.0, 50.0),
            radar("상품성", 85.0, 70.0),
        ],
        ad_recommendation: "메타 광고 위주 집행 추천 (로컬 모드)".to_string(),
        media_mix: vec![
            media(
                "메타 릴스",
                "인스타그램/페이스북 노출",
                "초기 인지도 확산 및 잠재 고객 확보 유리",
                "인테리어와 혜택을 강조한 숏폼 영상 광고 집행",
            ),
            media(
                "네이버",
                "키워드/블로그 검색",
                "관심 고객의 능동적 검색 대응",
                "키워드 상위 노출 및 블로그 리뷰 확보",
            ),
            media(
                "당근마켓",
                "지역 기반 타겟팅",
                "인근 거주 실거주 수요 공략",
                "인근 주민 대상 타겟 광고 및 이벤트 노출",
            ),
        ],
        copywriting: "지금이 바로 기회입니다. 놓치지 마세요!".to_string(),
        target_audience: strings(&["실거주자", "투자자"]),
        target_persona: "수도권 거주 3040 세대".to_string(),
        competitors: vec![Competitor {
            name: "A단지".to_string(),
            price: target_price,
            gap_label: "비슷함".to_string(),
        }],
        roi_forecast: RoiForecast {
            expected_leads: 50.0,
            expected_cpl: 45_000.0,
            conversion_rate: 2.1,
        },
        keyword_strategy: strings(&["분양", "신축", "역세권"]),
        weekly_plan: strings(&[
            "1주차: 타겟 분석 및 광고 소재 기획",
            "2주차: 메인 매체 광고 집행 및 초기 반응 테스트",
            "3주차: 고효율 소재 집중 집행 및 리타겟팅 시작",
            "4주차: 잔여 물량 소진을 위한 마감 임박 메시지 전송",
        ]),
        lms_copy_samples: strings(&[
            "(광고) [신뢰/종합] 샘플 카피입니다.",
            "(광고) [혜택집중] 샘플 카피입니다.",
            "(광고) [마감임박] 샘플 카피입니다.",
            "(광고) [투자전략] 샘플 카피입니다.",
            "(광고) [거주안심] 샘플 카피입니다.",
        ]),
        channel_talk_samples: strings(&[
            "【종합】 샘플 카탈로그입니다. 💥",
            "【혜택】 샘플 카탈로그입니다. 🔥",
            "【긴급】 샘플 카탈로그입니다. 🚨",
            "【교통】 샘플 카탈로그입니다. 🚅",
            "【이벤트】 샘플 카탈로그입니다. 🎁",
        ]),
    }
}
