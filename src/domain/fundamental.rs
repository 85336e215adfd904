//! Financial facts consumed by the fundamental scorer.
//!
//! Growth figures are percentages (`25.0` means +25%).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyFinancials {
    pub year: i32,
    pub quarter: u8,
    pub revenue: f64,
    pub gross_profit: f64,
    pub operating_income: f64,
    pub net_income: f64,
    pub eps: f64,
    #[serde(default)]
    pub total_assets: Option<f64>,
    #[serde(default)]
    pub total_equity: Option<f64>,
    #[serde(default)]
    pub operating_cash_flow: Option<f64>,
}

impl QuarterlyFinancials {
    fn key(&self) -> (i32, u8) {
        (self.year, self.quarter)
    }

    pub fn gross_margin(&self) -> Option<f64> {
        ratio_pct(self.gross_profit, self.revenue)
    }

    pub fn operating_margin(&self) -> Option<f64> {
        ratio_pct(self.operating_income, self.revenue)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u8,
    pub revenue: f64,
    #[serde(default)]
    pub mom_growth: Option<f64>,
    #[serde(default)]
    pub yoy_growth: Option<f64>,
}

impl MonthlyRevenue {
    pub fn new(year: i32, month: u8, revenue: f64) -> Self {
        Self {
            year,
            month,
            revenue,
            mom_growth: None,
            yoy_growth: None,
        }
    }

    fn key(&self) -> (i32, u8) {
        (self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dividend {
    pub year: i32,
    pub cash_dividend: f64,
    #[serde(default)]
    pub stock_dividend: f64,
}

/// Everything known about one instrument's financials.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialFacts {
    pub quarters: Vec<QuarterlyFinancials>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub dividends: Vec<Dividend>,
}

fn growth_pct(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous.abs() * 100.0)
}

fn ratio_pct(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator * 100.0)
}

fn previous_month(year: i32, month: u8) -> (i32, u8) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Fills in MoM/YoY growth where the supplier left it out.
///
/// Sorts chronologically first. A growth figure is only derived when the
/// comparison month is present and its revenue is non-zero.
pub fn fill_revenue_growth(months: &mut [MonthlyRevenue]) {
    months.sort_by_key(MonthlyRevenue::key);

    let revenue_of = |months: &[MonthlyRevenue], key: (i32, u8)| {
        months
            .binary_search_by_key(&key, MonthlyRevenue::key)
            .ok()
            .map(|i| months[i].revenue)
    };

    for i in 0..months.len() {
        let (year, month) = months[i].key();
        let revenue = months[i].revenue;
        if months[i].mom_growth.is_none() {
            let prev = revenue_of(&*months, previous_month(year, month));
            months[i].mom_growth = prev.and_then(|p| growth_pct(revenue, p));
        }
        if months[i].yoy_growth.is_none() {
            let prev = revenue_of(&*months, (year - 1, month));
            months[i].yoy_growth = prev.and_then(|p| growth_pct(revenue, p));
        }
    }
}

impl FinancialFacts {
    /// Sorts every table chronologically and derives missing revenue growth.
    pub fn normalized(mut self) -> Self {
        self.quarters.sort_by_key(QuarterlyFinancials::key);
        self.dividends.sort_by_key(|d| d.year);
        fill_revenue_growth(&mut self.monthly_revenue);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.quarters.is_empty() && self.monthly_revenue.is_empty() && self.dividends.is_empty()
    }

    fn ttm_eps_ending(&self, end: usize) -> Option<f64> {
        let start = end.checked_sub(4)?;
        Some(self.quarters[start..end].iter().map(|q| q.eps).sum())
    }

    /// Sum of the latest four quarters' EPS.
    pub fn eps_ttm(&self) -> Option<f64> {
        self.ttm_eps_ending(self.quarters.len())
    }

    /// TTM EPS growth against the four quarters before it.
    pub fn eps_ttm_yoy(&self) -> Option<f64> {
        let n = self.quarters.len();
        let current = self.ttm_eps_ending(n)?;
        let previous = self.ttm_eps_ending(n.checked_sub(4)?)?;
        growth_pct(current, previous)
    }

    /// Latest monthly YoY growth, falling back to the latest quarter
    /// against the same quarter a year earlier.
    pub fn latest_revenue_yoy(&self) -> Option<f64> {
        if let Some(yoy) = self.monthly_revenue.last().and_then(|m| m.yoy_growth) {
            return Some(yoy);
        }
        let latest = self.quarters.last()?;
        let year_ago = self
            .quarters
            .iter()
            .find(|q| q.year == latest.year - 1 && q.quarter == latest.quarter)?;
        growth_pct(latest.revenue, year_ago.revenue)
    }

    /// Price over TTM EPS; only meaningful for positive earnings.
    pub fn pe_ratio(&self, price: f64) -> Option<f64> {
        let eps = self.eps_ttm()?;
        if eps <= 0.0 {
            return None;
        }
        Some(price / eps)
    }

    /// Latest cash dividend over price, as a percentage.
    pub fn dividend_yield(&self, price: f64) -> Option<f64> {
        let latest = self.dividends.last()?;
        if price <= 0.0 {
            return None;
        }
        ratio_pct(latest.cash_dividend, price)
    }
}
