//! End-to-end analysis through the public API.
//!
//! Tests cover:
//! - Engine behaviour on constant, rising, alternating and flat series
//! - Signals and screening on a volume spike
//! - Batch isolation of bad instruments
//! - Bounded oscillators under random walks

mod common;

use approx::assert_relative_eq;
use common::*;
use marketlens::domain::engine::{MIN_HISTORY, compute_history, compute_latest};
use marketlens::domain::error::MarketLensError;
use marketlens::domain::indicator::stochastic::rsv;
use marketlens::domain::indicator::williams::williams_r;
use marketlens::domain::score::{ScoringWeights, technical_score};
use marketlens::domain::screener::{ScreenParams, ScreenStrategy, screen};
use marketlens::domain::series::{ema_series, sma};
use marketlens::domain::signal::{SignalKind, detect_signals};
use marketlens::domain::universe::{SkipReason, analyze_instrument, analyze_universe};
use proptest::prelude::*;

mod engine {
    use super::*;

    #[test]
    fn below_floor_is_insufficient_history() {
        let bars = flat_bars("AAA", &constant_closes(MIN_HISTORY - 1, 100.0));
        let err = compute_latest("AAA", &bars).unwrap_err();
        assert!(matches!(
            err,
            MarketLensError::InsufficientHistory { bars: 19, minimum: 20, .. }
        ));
    }

    #[test]
    fn constant_series_collapses() {
        let bars = flat_bars("AAA", &constant_closes(60, 100.0));
        let r = compute_latest("AAA", &bars).unwrap();

        assert_eq!(r.rsi14, Some(100.0));
        assert_eq!(r.obv, Some(0));
        assert_eq!(r.bollinger_upper, Some(100.0));
        assert_eq!(r.bollinger_middle, Some(100.0));
        assert_eq!(r.bollinger_lower, Some(100.0));
        assert_eq!(r.ma60, Some(100.0));
        assert!(r.plus_di14.is_none());
        assert!(r.minus_di14.is_none());
        assert_relative_eq!(r.macd_histogram.unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn ma5_round_trip_over_record_closes() {
        let bars = ranged_bars("AAA", &rising_closes(40, 50.0, 90.0));
        let history = compute_history("AAA", &bars).unwrap();
        let tail = &history[history.len() - 5..];
        let closes: Vec<f64> = tail.iter().map(|r| r.close).collect();
        let latest = history.last().unwrap();
        assert_relative_eq!(sma(&closes, 5).unwrap(), latest.ma5.unwrap(), epsilon = 1e-9);
    }

    #[test]
    fn ema_seed_is_plain_mean() {
        let values: Vec<f64> = (1..=30).map(|i| (i * i) as f64).collect();
        let ema = ema_series(&values, 12);
        let mean = values[..12].iter().sum::<f64>() / 12.0;
        assert_relative_eq!(ema[11].unwrap(), mean, epsilon = 1e-9);
        assert!(ema[10].is_none());
    }

    #[test]
    fn history_has_one_record_per_date_past_floor() {
        let bars = flat_bars("AAA", &constant_closes(25, 100.0));
        let history = compute_history("AAA", &bars).unwrap();
        assert_eq!(history.len(), 6);
        assert_eq!(history[0].date, bars[19].date);
        assert_eq!(history.last().unwrap().date, bars[24].date);
    }

    #[test]
    fn malformed_row_rejects_instrument() {
        let mut bars = flat_bars("AAA", &constant_closes(30, 100.0));
        bars[10].close = -1.0;
        let err = compute_latest("AAA", &bars).unwrap_err();
        assert!(matches!(err, MarketLensError::MalformedInput { .. }));
    }
}

mod scenarios {
    use super::*;

    #[test]
    fn volume_spike_fires_breakout_and_tops_screen() {
        let bars = volume_spike_bars("AAA", 5000);
        let history = compute_history("AAA", &bars).unwrap();
        let signals = detect_signals(&history, &bars);
        let breakout = signals
            .iter()
            .find(|s| s.kind == SignalKind::VolumeBreakout)
            .expect("volume breakout");
        assert!(breakout.description.contains("5000"));
        assert_eq!(breakout.date, bars[20].date);

        let port = MockDataPort::new()
            .with_bars("AAA", bars)
            .with_bars("BBB", volume_spike_bars("BBB", 3000))
            .with_bars("CCC", volume_spike_bars("CCC", 1000));
        let codes = vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()];
        let analysis = analyze_universe(&port, &codes);
        let matches = screen(
            &analysis.rows(),
            ScreenStrategy::VolumeBreakout,
            &ScreenParams::default(),
        );
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].code, "AAA");
        assert_eq!(matches[0].volume, 5000);
        assert_eq!(matches[1].code, "BBB");
    }

    #[test]
    fn rising_month_maxes_moving_average_component() {
        let bars = ranged_bars("AAA", &rising_closes(30, 100.0, 200.0));
        let port = MockDataPort::new().with_bars("AAA", bars);
        let analysis = analyze_instrument(&port, "AAA").unwrap();
        let latest = analysis.latest().unwrap();

        assert!(latest.ma60.is_none());
        assert!(latest.ma5.unwrap() > latest.ma10.unwrap());
        assert!(latest.ma10.unwrap() > latest.ma20.unwrap());
        assert!(latest.rsi14.unwrap() > 70.0);

        let weights = ScoringWeights::default();
        let score = technical_score(latest, &analysis.price_context(), &weights);
        assert_eq!(score.adjustment("ma"), Some(weights.ma));
    }

    #[test]
    fn alternating_moves_are_directionless() {
        let bars = ranged_bars("AAA", &alternating_closes(60));
        let r = compute_latest("AAA", &bars).unwrap();
        let rsi = r.rsi14.unwrap();
        assert!((45.0..=55.0).contains(&rsi), "rsi {rsi}");
        let adx = r.adx14.unwrap();
        assert!(adx < 10.0, "adx {adx}");
    }

    #[test]
    fn flat_window_uses_fallbacks() {
        let bars = flat_bars("AAA", &constant_closes(20, 42.0));
        assert_eq!(rsv(&bars[11..]), Some(50.0));
        assert_eq!(williams_r(&bars[6..]), Some(-50.0));

        let r = compute_latest("AAA", &bars).unwrap();
        assert_relative_eq!(r.stoch_k.unwrap(), 50.0, epsilon = 1e-9);
        assert_relative_eq!(r.stoch_d.unwrap(), 50.0, epsilon = 1e-9);
        assert_eq!(r.williams_r14, Some(-50.0));
    }
}

mod batch {
    use super::*;

    #[test]
    fn bad_instruments_are_skipped_not_fatal() {
        let mut malformed = flat_bars("BAD", &constant_closes(30, 10.0));
        malformed[3].volume = -5;
        let port = MockDataPort::new()
            .with_bars("GOOD", flat_bars("GOOD", &constant_closes(30, 10.0)))
            .with_bars("SHORT", flat_bars("SHORT", &constant_closes(5, 10.0)))
            .with_bars("BAD", malformed)
            .with_error("DOWN", "connection refused");
        let codes: Vec<String> = ["GOOD", "SHORT", "BAD", "DOWN", "NONE"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let analysis = analyze_universe(&port, &codes);
        assert_eq!(analysis.instruments.len(), 1);
        assert_eq!(analysis.instruments[0].code, "GOOD");

        let reasons: Vec<(&str, &SkipReason)> = analysis
            .skipped
            .iter()
            .map(|s| (s.code.as_str(), &s.reason))
            .collect();
        assert_eq!(reasons.len(), 4);
        assert_eq!(reasons[0], ("SHORT", &SkipReason::InsufficientHistory { bars: 5 }));
        assert!(matches!(reasons[1], ("BAD", SkipReason::Malformed { .. })));
        assert!(matches!(reasons[2], ("DOWN", SkipReason::Failed { .. })));
        assert_eq!(reasons[3], ("NONE", &SkipReason::NoData));
    }
}

fn random_walk() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(-1.0f64..1.0, 20..70).prop_map(|steps| {
        let mut price = 100.0;
        steps
            .into_iter()
            .map(|s| {
                price += s;
                price
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn oscillators_stay_bounded(closes in random_walk()) {
        let bars = ranged_bars("RW", &closes);
        let r = compute_latest("RW", &bars).unwrap();
        let k = r.stoch_k.unwrap();
        let d = r.stoch_d.unwrap();
        prop_assert!((0.0..=100.0).contains(&k));
        prop_assert!((0.0..=100.0).contains(&d));
        let wr = r.williams_r14.unwrap();
        prop_assert!((-100.0..=0.0).contains(&wr));
        let rsi = r.rsi14.unwrap();
        prop_assert!((0.0..=100.0).contains(&rsi));

        let score = technical_score(&r, &Default::default(), &ScoringWeights::default());
        prop_assert!(score.value <= 100);
    }
}
