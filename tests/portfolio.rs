use tribarrier::config::SimulationConfig;
use tribarrier::sim::{PortfolioSimulator, SizingMode};
use tribarrier::types::LabeledEvent;

fn event(entry_idx: usize, entry_price: f64, exit_price: f64) -> LabeledEvent {
    LabeledEvent {
        entry_idx,
        entry_time: String::new(),
        exit_idx: entry_idx + 3,
        exit_time: String::new(),
        entry_price,
        exit_price,
        hard_label: if exit_price >= entry_price { 1 } else { -1 },
        ttbm_label: 0.0,
        periods_to_exit: 3,
        time_elapsed_ratio: 0.75,
        decay_factor: 1.0,
        profit_barrier: entry_price * 1.02,
        stop_barrier: entry_price * 0.99,
        entry_volatility: 0.01,
    }
}

#[test]
fn capital_is_the_product_of_traded_step_growth() {
    let mut config = SimulationConfig::default();
    config.hard_position_pct = 0.25;
    let mut sim = PortfolioSimulator::new(config, SizingMode::Hard);

    let events: Vec<LabeledEvent> = (0..30)
        .map(|k| {
            let entry = 100.0;
            let exit = 100.0 + 8.0 * (k as f64 * 0.7).sin();
            event(k * 10, entry, exit)
        })
        .collect();
    let predictions: Vec<f64> = (0..30)
        .map(|k| match k % 3 {
            0 => 1.0,
            1 => -1.0,
            _ => 0.0,
        })
        .collect();

    sim.walk(&predictions, &events);

    let mut expected = 10_000.0;
    for (k, event) in events.iter().enumerate() {
        let position = match k % 3 {
            0 => 0.25,
            1 => -0.25,
            _ => 0.0,
        };
        expected *= 1.0 + position * event.realized_return();
    }
    assert!((sim.capital - expected).abs() < 1e-6);

    // snapshots follow the same product step by step
    let mut running = 10_000.0;
    for (k, event) in events.iter().enumerate() {
        let position = match k % 3 {
            0 => 0.25,
            1 => -0.25,
            _ => 0.0,
        };
        running *= 1.0 + position * event.realized_return();
        assert!((sim.capital_curve[k + 1] - running).abs() < 1e-6);
    }
}

#[test]
fn hard_mode_ignores_mid_range_predictions() {
    let mut sim = PortfolioSimulator::new(SimulationConfig::default(), SizingMode::Hard);
    let events = vec![
        event(0, 100.0, 110.0),
        event(10, 100.0, 110.0),
        event(20, 100.0, 110.0),
    ];
    // only the first prediction sits within 0.1 of +/-1
    sim.walk(&[0.95, 0.5, -0.7], &events);
    assert_eq!(sim.trades.len(), 1);
    assert_eq!(sim.trades[0].entry_idx, 0);
}

#[test]
fn soft_mode_caps_the_position_fraction() {
    let config = SimulationConfig::default();
    let cap = config.soft_position_max;
    let mut sim = PortfolioSimulator::new(config, SizingMode::Soft);

    let events = vec![event(0, 100.0, 104.0), event(10, 100.0, 96.0)];
    sim.walk(&[1.0, -0.95], &events);

    assert_eq!(sim.trades.len(), 2);
    assert!((sim.trades[0].position_pct - cap).abs() < 1e-12);
    assert!((sim.trades[1].position_pct + cap).abs() < 1e-12);
}

#[test]
fn summary_statistics_agree_with_direct_formulas() {
    let mut config = SimulationConfig::default();
    config.hard_position_pct = 1.0;
    let mut sim = PortfolioSimulator::new(config, SizingMode::Hard);

    let events = vec![
        event(0, 100.0, 102.0),
        event(10, 100.0, 99.0),
        event(20, 100.0, 103.0),
    ];
    sim.walk(&[1.0, 1.0, 1.0], &events);
    let summary = sim.summary();

    // capital: 10000 * 1.02 * 0.99 * 1.03
    let expected_final = 10_000.0 * 1.02 * 0.99 * 1.03;
    assert!((summary.final_capital - expected_final).abs() < 1e-6);
    assert!(
        (summary.total_return - (expected_final / 10_000.0 - 1.0)).abs() < 1e-12
    );
    assert!(
        (summary.annualized_return
            - ((expected_final / 10_000.0_f64).powf(252.0 / 3.0) - 1.0))
            .abs()
            < 1e-9
    );

    // pnl fractions 0.02, -0.01, 0.03: mean 0.04/3
    let mean: f64 = (0.02 - 0.01 + 0.03) / 3.0;
    let variance =
        ((0.02 - mean).powi(2) + (-0.01 - mean).powi(2) + (0.03 - mean).powi(2)) / 3.0;
    let expected_sharpe = mean * 252.0 / (variance.sqrt() * 252.0_f64.sqrt());
    assert!((summary.sharpe_ratio - expected_sharpe).abs() < 1e-9);

    assert_eq!(summary.total_trades, 3);
    assert_eq!(summary.winning_trades, 2);
    assert!((summary.win_rate - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn drawdown_tracks_the_worst_peak_to_valley_move() {
    let mut config = SimulationConfig::default();
    config.hard_position_pct = 1.0;
    let mut sim = PortfolioSimulator::new(config, SizingMode::Hard);

    let events = vec![
        event(0, 100.0, 120.0),
        event(10, 100.0, 75.0),
        event(20, 100.0, 90.0),
    ];
    sim.walk(&[1.0, 1.0, -1.0], &events);

    // 10000 -> 12000 -> 9000 -> 9900
    assert!((sim.capital - 9_900.0).abs() < 1e-6);
    let summary = sim.summary();
    assert!((summary.max_drawdown - 3_000.0 / 12_000.0).abs() < 1e-9);
    assert!((sim.peak_capital - 12_000.0).abs() < 1e-9);
    assert!((sim.trough_capital - 9_000.0).abs() < 1e-9);
}

#[test]
fn zero_positions_never_count_as_trades() {
    let mut sim = PortfolioSimulator::new(SimulationConfig::default(), SizingMode::Hard);
    let events = vec![event(0, 100.0, 150.0); 5];
    sim.walk(&[0.0, 0.2, -0.3, 0.5, 0.0], &events);

    assert_eq!(sim.trades.len(), 0);
    assert_eq!(sim.capital, 10_000.0);
    let summary = sim.summary();
    assert_eq!(summary.total_trades, 0);
    assert_eq!(summary.sharpe_ratio, 0.0);
}
