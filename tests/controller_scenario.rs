//! End-to-end walk through the fixed/refit state machine on a small bank
//! peer set.

use peer_regression::domain::{AxisLabels, CoefficientSource, FitMode, Peer, PeerDataset, RegressionCoefficients};
use peer_regression::fit::{Action, SelectionController};
use peer_regression::math::fit_ols;

fn fixed() -> RegressionCoefficients {
    RegressionCoefficients {
        slope: 0.1244,
        intercept: -0.1483,
        r_squared: Some(0.96),
        n: 3,
    }
}

fn dataset() -> PeerDataset {
    PeerDataset {
        labels: AxisLabels::default(),
        peers: vec![
            Peer::new("HOPE", 8.65, 0.930),
            Peer::new("CVBF", 14.10, 1.730),
            Peer::new("EWBC", 16.38, 1.830),
        ],
        target: Peer::new("CATY", 11.95, 1.269),
        fixed: Some(fixed()),
    }
}

#[test]
fn fixed_to_refit_and_back() {
    let mut controller = SelectionController::new(dataset()).unwrap();

    let view = controller.view();
    assert_eq!(view.mode, FitMode::Fixed);
    assert!(!view.using_fallback);
    assert!((view.target_record.predicted - 1.33828).abs() < 1e-9);
    assert!((view.target_record.residual - (-0.06928)).abs() < 1e-9);
    assert!((view.target_record.residual_pct.unwrap() - (-5.1768)).abs() < 1e-3);

    let view = controller.apply(Action::EnableRefit).clone();
    assert_eq!(view.source, CoefficientSource::Refit);
    assert_eq!(view.selected.len(), 3);
    assert!((view.coefficients.slope - 0.12197).abs() < 1e-4);
    assert!((view.coefficients.intercept - (-0.09424)).abs() < 1e-4);
    let r2 = view.coefficients.r_squared.unwrap();
    assert!((r2 - 0.9645).abs() < 1e-3);

    // Down to one peer: no regression possible, fixed line comes back.
    controller.apply(Action::TogglePeer("CVBF".into()));
    let view = controller.apply(Action::TogglePeer("EWBC".into()));
    assert_eq!(view.mode, FitMode::Refit);
    assert!(view.using_fallback);
    assert_eq!(view.source, CoefficientSource::RefitFallback);
    assert_eq!(view.coefficients, fixed());
    assert_eq!(view.selected, vec!["HOPE"]);

    // Back to two: refit resumes and passes exactly through both points.
    let view = controller.apply(Action::TogglePeer("EWBC".into()));
    assert!(!view.using_fallback);
    for p in view.included() {
        assert!(p.record.residual.abs() < 1e-12);
    }

    let view = controller.apply(Action::DisableRefit);
    assert_eq!(view.mode, FitMode::Fixed);
    assert_eq!(view.coefficients, fixed());
    assert_eq!(view.selected.len(), 3);
}

#[test]
fn residuals_are_reported_for_excluded_peers_too() {
    let mut controller = SelectionController::new(dataset()).unwrap();
    controller.apply(Action::EnableRefit);
    let view = controller.apply(Action::SetSelection(vec!["HOPE".into(), "EWBC".into()]));

    assert_eq!(view.peers.len(), 3);
    let cvbf = view.peers.iter().find(|p| p.peer.id == "CVBF").unwrap();
    assert!(!cvbf.included);
    let expected = view.coefficients.predict(14.10);
    assert!((cvbf.record.predicted - expected).abs() < 1e-12);
    assert!((cvbf.record.residual - (1.730 - expected)).abs() < 1e-12);
}

#[test]
fn custom_estimator_is_used_for_refits() {
    let halve = |points: &[(f64, f64)]| {
        fit_ols(points).map(|c| RegressionCoefficients {
            slope: c.slope / 2.0,
            ..c
        })
    };
    let mut controller = SelectionController::with_estimator(dataset(), halve).unwrap();
    let view = controller.apply(Action::SetRefit(true));
    assert!((view.coefficients.slope - 0.12197 / 2.0).abs() < 1e-4);
}
