//! Numerical antiderivative verification command.
//!
//! Checks, for every curve, that `ad1' = func` and `ad2' = ad1` by central
//! differences over the base table domain, and that both antiderivatives
//! vanish at zero.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use grit_core::{Curve, CurveKind, Nonlinearity};
use serde::Serialize;

/// Half-width of the checked interval, matching the `f` table domain.
const DOMAIN: f64 = 10.0;

/// Fold amounts exercised for the wavefolder.
const FOLD_AMOUNTS: [f64; 3] = [0.0, 1.0, 4.0];

#[derive(Args)]
pub struct VerifyArgs {
    /// Grid spacing over [-10, 10]
    #[arg(long, default_value = "0.01")]
    step: f64,

    /// Central-difference step
    #[arg(long, default_value = "1e-4")]
    h: f64,

    /// Largest accepted absolute error
    #[arg(long, default_value = "1e-4")]
    tolerance: f64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// Verification result for one curve.
#[derive(Debug, Serialize)]
struct CurveReport {
    curve: String,
    fold_amount: Option<f64>,
    /// Largest `|d/dx ad1 - func|` over the grid.
    ad1_error: f64,
    /// Largest `|d/dx ad2 - ad1|` over the grid.
    ad2_error: f64,
    /// `max(|ad1(0)|, |ad2(0)|)`.
    anchor_error: f64,
    passed: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    step: f64,
    h: f64,
    tolerance: f64,
    curves: Vec<CurveReport>,
}

pub fn run(args: VerifyArgs) -> anyhow::Result<()> {
    if !(args.step > 0.0 && args.step.is_finite()) {
        anyhow::bail!("--step must be positive, got {}", args.step);
    }
    if !(args.h > 0.0 && args.h.is_finite()) {
        anyhow::bail!("--h must be positive, got {}", args.h);
    }

    let report = Report {
        step: args.step,
        h: args.h,
        tolerance: args.tolerance,
        curves: curves()
            .into_iter()
            .map(|curve| {
                check(
                    curve.kind(),
                    fold_of(&curve),
                    &curve,
                    args.step,
                    args.h,
                    args.tolerance,
                )
            })
            .collect(),
    };

    tracing::debug!(curves = report.curves.len(), "verification complete");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report);
    }

    let failed = report.curves.iter().filter(|c| !c.passed).count();
    if failed > 0 {
        anyhow::bail!("{failed} curve(s) failed antiderivative verification");
    }
    Ok(())
}

fn curves() -> Vec<Curve> {
    let mut curves = Vec::new();
    for kind in CurveKind::ALL {
        if kind.has_fold_amount() {
            curves.extend(
                FOLD_AMOUNTS
                    .iter()
                    .map(|&m| Curve::new(kind).with_fold_amount(m)),
            );
        } else {
            curves.push(Curve::new(kind));
        }
    }
    curves
}

fn fold_of(curve: &Curve) -> Option<f64> {
    match curve {
        Curve::Wavefolder(folder) => Some(folder.fold_amount()),
        _ => None,
    }
}

fn check<N: Nonlinearity + ?Sized>(
    kind: CurveKind,
    fold_amount: Option<f64>,
    nl: &N,
    step: f64,
    h: f64,
    tolerance: f64,
) -> CurveReport {
    let points = (2.0 * DOMAIN / step).floor() as usize;
    let mut ad1_error = 0.0_f64;
    let mut ad2_error = 0.0_f64;

    for i in 0..=points {
        let x = -DOMAIN + step * i as f64;
        let d1 = (nl.ad1(x + h) - nl.ad1(x - h)) / (2.0 * h);
        let d2 = (nl.ad2(x + h) - nl.ad2(x - h)) / (2.0 * h);
        ad1_error = ad1_error.max((d1 - nl.func(x)).abs());
        ad2_error = ad2_error.max((d2 - nl.ad1(x)).abs());
    }

    let anchor_error = nl.ad1(0.0).abs().max(nl.ad2(0.0).abs());
    let passed = ad1_error <= tolerance && ad2_error <= tolerance && anchor_error <= 1e-12;

    CurveReport {
        curve: kind.name().to_string(),
        fold_amount,
        ad1_error,
        ad2_error,
        anchor_error,
        passed,
    }
}

fn print_table(report: &Report) {
    println!(
        "Antiderivative check over [-{DOMAIN}, {DOMAIN}], step {}, h {}, tolerance {:e}",
        report.step, report.h, report.tolerance
    );
    println!();
    println!(
        "  {:18}  {:>10}  {:>10}  {:>10}  {}",
        "Curve", "ad1' err", "ad2' err", "anchor", "Result"
    );
    println!(
        "  {:18}  {:>10}  {:>10}  {:>10}  {}",
        "-----", "--------", "--------", "------", "------"
    );

    for c in &report.curves {
        let label = match c.fold_amount {
            Some(m) => format!("{} (m={m})", c.curve),
            None => c.curve.clone(),
        };
        println!(
            "  {:18}  {:>10.2e}  {:>10.2e}  {:>10.2e}  {}",
            label,
            c.ad1_error,
            c.ad2_error,
            c.anchor_error,
            if c.passed { "ok" } else { "FAIL" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_curve_passes_default_check() {
        for curve in curves() {
            let report = check(curve.kind(), fold_of(&curve), &curve, 0.01, 1e-4, 1e-4);
            assert!(report.passed, "{report:?}");
        }
    }

    #[test]
    fn wrong_antiderivative_fails() {
        struct Broken;
        impl Nonlinearity for Broken {
            fn func(&self, x: f64) -> f64 {
                x
            }
            fn ad1(&self, x: f64) -> f64 {
                x * x
            }
            fn ad2(&self, x: f64) -> f64 {
                x * x * x / 3.0
            }
        }

        let report = check(CurveKind::HardClip, None, &Broken, 0.1, 1e-4, 1e-4);
        assert!(!report.passed);
        assert!(report.ad1_error > 1.0);
        assert!(report.ad2_error < 1e-6);
    }

    #[test]
    fn wavefolder_checked_at_each_fold_amount() {
        let folders: Vec<_> = curves().iter().filter_map(fold_of).collect();
        assert_eq!(folders, FOLD_AMOUNTS);
    }
}
