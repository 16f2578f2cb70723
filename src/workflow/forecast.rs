use crate::api::RoiForecast;

/// Budget slider bounds, in 만원
pub const MIN_SIMULATED_BUDGET: u32 = 100;
pub const MAX_SIMULATED_BUDGET: u32 = 10_000;
pub const SIMULATED_BUDGET_STEP: u32 = 100;

/// Outcome of re-running a forecast at a different monthly budget
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiProjection {
    /// Budget actually used after clamping, in 만원
    pub budget: u32,
    pub expected_leads: f64,
    pub expected_contracts: f64,
    /// Cost per lead, in 원; unaffected by budget
    pub expected_cpl: f64,
}

/// Snap a requested budget onto the slider grid
pub fn clamp_budget(budget: u32) -> u32 {
    let clamped = budget.clamp(MIN_SIMULATED_BUDGET, MAX_SIMULATED_BUDGET);
    let snapped = ((clamped + SIMULATED_BUDGET_STEP / 2) / SIMULATED_BUDGET_STEP) * SIMULATED_BUDGET_STEP;
    snapped.clamp(MIN_SIMULATED_BUDGET, MAX_SIMULATED_BUDGET)
}

impl RoiForecast {
    /// Scale the forecast made for `monthly_budget` to `simulated_budget`
    ///
    /// Leads scale linearly with spend; contracts follow the conversion rate.
    pub fn project(&self, monthly_budget: u32, simulated_budget: u32) -> RoiProjection {
        let budget = clamp_budget(simulated_budget);
        let expected_leads = if monthly_budget == 0 {
            0.0
        } else {
            self.expected_leads / monthly_budget as f64 * budget as f64
        };

        RoiProjection {
            budget,
            expected_leads,
            expected_contracts: expected_leads * self.conversion_rate / 100.0,
            expected_cpl: self.expected_cpl,
        }
    }
}
