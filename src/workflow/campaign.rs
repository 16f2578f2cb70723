use crate::api::{AnalysisRequest, SiteDetails};
use serde::{Deserialize, Serialize};

pub const PRODUCT_CATEGORIES: &[&str] = &[
    "아파트",
    "민간임대",
    "오피스텔",
    "지식산업센터",
    "상가",
    "숙박시설",
    "타운하우스",
];

pub const DOWN_PAYMENT_OPTIONS: &[&str] = &["5%", "10%", "정액제"];

pub const ADDITIONAL_BENEFITS: &[&str] =
    &["전매 제한 해제", "풀옵션 무상", "발코니 확장", "중도금 무이자"];

pub const MAIN_CONCERNS: &[&str] = &["DB 수량 부족", "DB 질 저하", "방문객 없음"];

const DEFAULT_CATEGORY: &str = "아파트";
const MANUAL_SUFFIX: &str = " (신규 등록)";

/// Free-text selling points, one per theme
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Keypoints {
    /// Location upside (new lines, stations)
    pub location: String,
    /// Complex features (size, layout)
    pub product: String,
    /// Pricing or financing benefits
    pub benefit: String,
    /// Gifts for visitors
    pub gift: String,
    pub extra: String,
}

impl Keypoints {
    /// Non-empty entries joined by newlines, in theme order
    pub fn joined(&self) -> String {
        [
            &self.location,
            &self.product,
            &self.benefit,
            &self.gift,
            &self.extra,
        ]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
    }
}

/// Marketing parameters for one site, edited before analysis
///
/// Prices and budgets are in 만원.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    pub field_name: String,
    pub address: String,
    pub product_category: String,
    pub sales_stage: String,
    pub down_payment: String,
    pub interest_benefit: String,
    pub additional_benefits: Vec<String>,
    pub main_concern: String,
    pub monthly_budget: u32,
    pub existing_media: Vec<String>,
    pub sales_price: u32,
    pub target_price: u32,
    pub down_payment_amount: u32,
    pub supply: u32,
    pub keypoints: Keypoints,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            field_name: String::new(),
            address: String::new(),
            product_category: DEFAULT_CATEGORY.to_string(),
            sales_stage: "사전 의향서".to_string(),
            down_payment: "10%".to_string(),
            interest_benefit: "무이자".to_string(),
            additional_benefits: Vec::new(),
            main_concern: "DB 수량 부족".to_string(),
            monthly_budget: 1000,
            existing_media: vec!["인스타그램".to_string(), "블로그".to_string()],
            sales_price: 2800,
            target_price: 3200,
            down_payment_amount: 3000,
            supply: 300,
            keypoints: Keypoints::default(),
        }
    }
}

impl CampaignConfig {
    /// Configuration for a site typed in by hand
    pub fn manual(address: &str) -> Self {
        let address = address.trim();
        Self {
            field_name: format!("{address}{MANUAL_SUFFIX}"),
            address: address.to_string(),
            ..Self::default()
        }
    }

    /// Configuration seeded from backend site details
    ///
    /// Missing or non-positive figures keep their defaults; fractional ones
    /// are rounded to the nearest 만원 or unit.
    pub fn from_details(details: &SiteDetails) -> Self {
        let defaults = Self::default();
        let pick = |value: Option<f64>, default: u32| {
            value
                .filter(|v| v.is_finite() && *v >= 0.5)
                .map(|v| v.round().min(u32::MAX as f64) as u32)
                .unwrap_or(default)
        };

        Self {
            field_name: details.name.clone(),
            address: details.address.clone().unwrap_or_default(),
            product_category: details
                .category
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(defaults.product_category.clone()),
            sales_price: pick(details.price, defaults.sales_price),
            target_price: pick(details.target_price, defaults.target_price),
            supply: pick(details.supply, defaults.supply),
            ..defaults
        }
    }

    pub fn is_manual(&self) -> bool {
        self.field_name.ends_with(MANUAL_SUFFIX)
    }

    /// Add `benefit` if absent, remove it if present
    pub fn toggle_benefit(&mut self, benefit: &str) {
        let benefits = &mut self.additional_benefits;
        if let Some(pos) = benefits.iter().position(|b| b == benefit) {
            benefits.remove(pos);
        } else {
            benefits.push(benefit.to_string());
        }
    }

    /// Gap between the comparison-area price and the sales price, in percent
    pub fn market_gap_percent(&self) -> f64 {
        if self.target_price == 0 {
            return 0.0;
        }
        (self.target_price as f64 - self.sales_price as f64) / self.target_price as f64 * 100.0
    }

    pub fn to_request(&self, user_email: Option<&str>) -> AnalysisRequest {
        AnalysisRequest {
            field_name: self.field_name.clone(),
            address: self.address.clone(),
            product_category: self.product_category.clone(),
            sales_stage: self.sales_stage.clone(),
            down_payment: self.down_payment.clone(),
            interest_benefit: self.interest_benefit.clone(),
            additional_benefits: self.additional_benefits.clone(),
            main_concern: self.main_concern.clone(),
            monthly_budget: self.monthly_budget,
            existing_media: self.existing_media.clone(),
            sales_price: self.sales_price,
            target_area_price: self.target_price,
            down_payment_amount: self.down_payment_amount,
            supply_volume: self.supply,
            field_keypoints: self.keypoints.joined(),
            user_email: user_email.map(str::to_string),
        }
    }
}
