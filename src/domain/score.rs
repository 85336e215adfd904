//! Composite technical and fundamental scores.
//!
//! Both scores start at [`BASELINE`] and add independent adjustments. An
//! adjustment whose inputs are absent is skipped and does not appear in
//! [`Score::adjustments`]; one that ran and produced zero does.

use crate::domain::fundamental::FinancialFacts;
use crate::domain::record::IndicatorRecord;
use serde::Serialize;
use std::collections::BTreeMap;

pub const BASELINE: f64 = 50.0;

pub const RSI_LOW: f64 = 30.0;
pub const RSI_MID: f64 = 50.0;
pub const RSI_HIGH: f64 = 70.0;
pub const KD_OVERBOUGHT: f64 = 80.0;
pub const KD_OVERSOLD: f64 = 20.0;
/// Volume above this multiple of the 20-day average confirms a move.
pub const VOLUME_CONFIRM_MULTIPLE: f64 = 1.5;
pub const ADX_TRENDING: f64 = 25.0;
pub const PERCENT_B_LOW: f64 = 0.2;
pub const PERCENT_B_HIGH: f64 = 0.8;

// Fundamental thresholds, pending product review.
pub const PE_CHEAP: f64 = 12.0;
pub const PE_FAIR: f64 = 20.0;
pub const PE_EXPENSIVE: f64 = 30.0;
/// Percent.
pub const HIGH_DIVIDEND_YIELD: f64 = 5.0;

/// Points awarded to each technical component at full strength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub rsi: f64,
    pub ma: f64,
    pub macd: f64,
    pub kd: f64,
    pub volume: f64,
    pub adx: f64,
    pub bollinger: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            rsi: 20.0,
            ma: 20.0,
            macd: 15.0,
            kd: 15.0,
            volume: 10.0,
            adx: 10.0,
            bollinger: 10.0,
        }
    }
}

/// Price context the record alone does not carry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceContext {
    pub previous_close: Option<f64>,
    pub average_volume_20: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adjustment {
    pub component: &'static str,
    pub points: f64,
}

impl Adjustment {
    fn new(component: &'static str, points: f64) -> Self {
        Self { component, points }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Score {
    pub value: u8,
    /// Raw inputs that were present when scoring.
    pub breakdown: BTreeMap<String, f64>,
    pub adjustments: Vec<Adjustment>,
}

impl Score {
    fn from_parts(breakdown: BTreeMap<String, f64>, adjustments: Vec<Adjustment>) -> Self {
        Self {
            value: combine(&adjustments),
            breakdown,
            adjustments,
        }
    }

    pub fn adjustment(&self, component: &str) -> Option<f64> {
        self.adjustments
            .iter()
            .find(|a| a.component == component)
            .map(|a| a.points)
    }
}

/// Baseline plus the sum of `adjustments`, clamped to [0,100] and rounded.
pub fn combine(adjustments: &[Adjustment]) -> u8 {
    let total = BASELINE + adjustments.iter().map(|a| a.points).sum::<f64>();
    total.clamp(0.0, 100.0).round() as u8
}

/// Arithmetic mean of the two scores when both exist.
pub fn combined_score(technical: Option<&Score>, fundamental: Option<&Score>) -> Option<u8> {
    match (technical, fundamental) {
        (Some(t), Some(f)) => Some(((t.value as f64 + f.value as f64) / 2.0).round() as u8),
        (Some(s), None) | (None, Some(s)) => Some(s.value),
        (None, None) => None,
    }
}

fn rsi_adjustment(record: &IndicatorRecord, w: f64) -> Option<Adjustment> {
    let rsi = record.rsi14?;
    let points = if rsi < RSI_LOW {
        w
    } else if rsi > RSI_HIGH {
        -w
    } else if rsi >= RSI_MID {
        w / 2.0
    } else {
        -w / 2.0
    };
    Some(Adjustment::new("rsi", points))
}

fn ma_adjustment(record: &IndicatorRecord, w: f64) -> Option<Adjustment> {
    let ma20 = record.ma20?;
    let stack: Vec<f64> = [record.ma5, record.ma10, Some(ma20), record.ma60]
        .into_iter()
        .flatten()
        .collect();

    let mut chain = Vec::with_capacity(stack.len() + 1);
    chain.push(record.close);
    chain.extend(stack);

    let bullish = chain.windows(2).all(|p| p[0] > p[1]);
    let bearish = chain.windows(2).all(|p| p[0] < p[1]);
    let points = if bullish {
        w
    } else if bearish {
        -w
    } else if record.close > ma20 {
        w / 2.0
    } else if record.close < ma20 {
        -w / 2.0
    } else {
        0.0
    };
    Some(Adjustment::new("ma", points))
}

fn macd_adjustment(record: &IndicatorRecord, w: f64) -> Option<Adjustment> {
    let hist = record.macd_histogram?;
    let points = if hist > 0.0 {
        w
    } else if hist < 0.0 {
        -w
    } else {
        0.0
    };
    Some(Adjustment::new("macd", points))
}

fn kd_adjustment(record: &IndicatorRecord, w: f64) -> Option<Adjustment> {
    let (k, d) = (record.stoch_k?, record.stoch_d?);
    let mut points = if k > d {
        w
    } else if k < d {
        -w
    } else {
        0.0
    };
    if k > KD_OVERBOUGHT {
        points = points.min(0.0);
    } else if k < KD_OVERSOLD {
        points = points.max(0.0);
    }
    Some(Adjustment::new("kd", points))
}

fn volume_adjustment(
    record: &IndicatorRecord,
    context: &PriceContext,
    w: f64,
) -> Option<Adjustment> {
    let average = context.average_volume_20?;
    let previous = context.previous_close?;
    let confirmed = average > 0.0 && record.volume as f64 > VOLUME_CONFIRM_MULTIPLE * average;
    let points = if !confirmed {
        0.0
    } else if record.close > previous {
        w
    } else if record.close < previous {
        -w
    } else {
        0.0
    };
    Some(Adjustment::new("volume", points))
}

fn adx_adjustment(record: &IndicatorRecord, w: f64) -> Option<Adjustment> {
    let adx = record.adx14?;
    let points = match (record.plus_di14, record.minus_di14) {
        (Some(plus), Some(minus)) if adx > ADX_TRENDING => {
            if plus > minus {
                w
            } else if plus < minus {
                -w
            } else {
                0.0
            }
        }
        _ => 0.0,
    };
    Some(Adjustment::new("adx", points))
}

fn bollinger_adjustment(record: &IndicatorRecord, w: f64) -> Option<Adjustment> {
    let pct_b = record.percent_b()?;
    let points = if pct_b < PERCENT_B_LOW {
        w
    } else if pct_b > PERCENT_B_HIGH {
        -w
    } else {
        0.0
    };
    Some(Adjustment::new("bollinger", points))
}

fn technical_breakdown(record: &IndicatorRecord, context: &PriceContext) -> BTreeMap<String, f64> {
    let fields = [
        ("close", Some(record.close)),
        ("volume", Some(record.volume as f64)),
        ("previous_close", context.previous_close),
        ("average_volume_20", context.average_volume_20),
        ("ma5", record.ma5),
        ("ma10", record.ma10),
        ("ma20", record.ma20),
        ("ma60", record.ma60),
        ("rsi14", record.rsi14),
        ("macd_histogram", record.macd_histogram),
        ("stoch_k", record.stoch_k),
        ("stoch_d", record.stoch_d),
        ("adx14", record.adx14),
        ("plus_di14", record.plus_di14),
        ("minus_di14", record.minus_di14),
        ("percent_b", record.percent_b()),
    ];
    fields
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
        .collect()
}

pub fn technical_score(
    record: &IndicatorRecord,
    context: &PriceContext,
    weights: &ScoringWeights,
) -> Score {
    let adjustments: Vec<Adjustment> = [
        rsi_adjustment(record, weights.rsi),
        ma_adjustment(record, weights.ma),
        macd_adjustment(record, weights.macd),
        kd_adjustment(record, weights.kd),
        volume_adjustment(record, context, weights.volume),
        adx_adjustment(record, weights.adx),
        bollinger_adjustment(record, weights.bollinger),
    ]
    .into_iter()
    .flatten()
    .collect();

    Score::from_parts(technical_breakdown(record, context), adjustments)
}

fn revenue_adjustment(yoy: f64) -> Adjustment {
    let points = if yoy > 20.0 {
        15.0
    } else if yoy > 10.0 {
        10.0
    } else if yoy > 0.0 {
        5.0
    } else if yoy < -10.0 {
        -10.0
    } else if yoy < 0.0 {
        -5.0
    } else {
        0.0
    };
    Adjustment::new("revenue_yoy", points)
}

fn eps_growth_adjustment(yoy: f64) -> Adjustment {
    let points = if yoy > 20.0 {
        10.0
    } else if yoy > 0.0 {
        5.0
    } else if yoy < 0.0 {
        -5.0
    } else {
        0.0
    };
    Adjustment::new("eps_ttm_yoy", points)
}

fn pe_adjustment(pe: f64) -> Adjustment {
    let points = if pe < PE_CHEAP {
        10.0
    } else if pe < PE_FAIR {
        5.0
    } else if pe > PE_EXPENSIVE {
        -5.0
    } else {
        0.0
    };
    Adjustment::new("pe_ratio", points)
}

/// Fundamental score from `facts` valued at `price`.
pub fn fundamental_score(facts: &FinancialFacts, price: f64) -> Score {
    let revenue_yoy = facts.latest_revenue_yoy();
    let eps_ttm = facts.eps_ttm();
    let eps_ttm_yoy = facts.eps_ttm_yoy();
    let pe = facts.pe_ratio(price);
    let dividend_yield = facts.dividend_yield(price);

    let mut adjustments = Vec::new();
    adjustments.extend(revenue_yoy.map(revenue_adjustment));
    adjustments.extend(
        eps_ttm.map(|eps| Adjustment::new("eps_ttm", if eps > 0.0 { 10.0 } else { -10.0 })),
    );
    adjustments.extend(eps_ttm_yoy.map(eps_growth_adjustment));
    adjustments.extend(pe.map(pe_adjustment));
    adjustments.extend(dividend_yield.map(|y| {
        Adjustment::new(
            "dividend_yield",
            if y > HIGH_DIVIDEND_YIELD { 10.0 } else { 0.0 },
        )
    }));

    let latest_quarter = facts.quarters.last();
    let breakdown = [
        ("price", Some(price)),
        ("gross_margin", latest_quarter.and_then(|q| q.gross_margin())),
        ("operating_margin", latest_quarter.and_then(|q| q.operating_margin())),
        ("revenue_yoy", revenue_yoy),
        ("eps_ttm", eps_ttm),
        ("eps_ttm_yoy", eps_ttm_yoy),
        ("pe_ratio", pe),
        ("dividend_yield", dividend_yield),
    ]
    .into_iter()
    .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
    .collect();

    Score::from_parts(breakdown, adjustments)
}
