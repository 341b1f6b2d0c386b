//! Integration tests for the point-process pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end path from simulation, through binding and
//!   maximum-likelihood fitting, to time-rescaling diagnostics.
//! - Exercise every family through the public API only, including behind
//!   `dyn PointProcess`.
//!
//! Coverage
//! --------
//! - `process::simulation::simulate` for all three families.
//! - `process::fitting::fit` with the softplus link and both line searches.
//! - `process::diagnostics::{time_rescaling, ks_exp1}` on a correctly and an
//!   incorrectly specified model.
//!
//! Exclusions
//! ----------
//! - Per-family closed forms and contract properties (unit tests).
//! - Python bindings.
use ndarray::array;
use rust_pointprocess::{
    optimization::loglik_optimizer::{LineSearcher, MLEOptions, Tolerances},
    process::{
        diagnostics::{RescalingOpts, ks_exp1, time_rescaling},
        fitting::{FitOptions, ParamLink, fit},
        models::{ExpHawkes, HomogeneousPoisson, PointProcess, SelfCorrecting},
        simulation::{SimOpts, simulate},
    },
};

fn tight_fit_opts(line_searcher: LineSearcher) -> FitOptions {
    let tols = Tolerances::new(Some(1e-8), None, Some(1_000)).unwrap();
    FitOptions::new(MLEOptions::new(tols, line_searcher, false, None).unwrap(), ParamLink::Softplus)
}

fn true_hawkes() -> ExpHawkes {
    let mut model = ExpHawkes::with_uniform_decay(1, 2.0).unwrap();
    model.set_parameters(array![0.5, 0.8]).unwrap();
    model
}

#[test]
// Purpose
// -------
// A Poisson fit to simulated data lands on `μ̂_n = N_n / T`.
//
// Given
// -----
// - A two-dimensional Poisson process with μ = [1.5, 0.4], horizon 200.
//
// Expect
// ------
// - Fitted rates equal the per-dimension counts over the horizon.
fn poisson_fit_matches_counts_over_horizon() {
    let mut truth = HomogeneousPoisson::new(2).unwrap();
    truth.set_parameters(array![1.5, 0.4]).unwrap();
    let seq = simulate(&truth, &SimOpts::new(200.0, Some(11), None).unwrap()).unwrap();
    let counts = seq.counts_by_dim();

    let mut model = HomogeneousPoisson::new(2).unwrap();
    model.bind(seq).unwrap();
    let out = fit(&mut model, array![1.0, 1.0], &tight_fit_opts(LineSearcher::HagerZhang)).unwrap();

    assert!(out.optim.converged);
    for (n, &count) in counts.iter().enumerate() {
        let expected = count as f64 / 200.0;
        assert!((out.params[n] - expected).abs() < 1e-4 * expected.max(1.0));
    }
}

#[test]
// Purpose
// -------
// Simulate, refit, and diagnose a Hawkes process.
//
// Given
// -----
// - D = 1, μ = 0.5, α = 0.8, β = 2 (branching ratio 0.4), horizon 2000.
//
// Expect
// ------
// - The fitted NLL is no worse than the NLL at the true parameters.
// - Estimates are close to the truth.
// - Hawkes residuals fit Exp(1) better than residuals under a Poisson fit.
fn hawkes_simulate_fit_and_diagnose() {
    let truth = true_hawkes();
    let seq = simulate(&truth, &SimOpts::new(2_000.0, Some(42), None).unwrap()).unwrap();
    assert!(seq.len() > 500);

    let mut model = ExpHawkes::with_uniform_decay(1, 2.0).unwrap();
    model.bind(seq.clone()).unwrap();
    model.set_parameters(array![0.5, 0.8]).unwrap();
    let nll_true = model.neg_loglikelihood().unwrap().value;

    let out = fit(&mut model, array![1.0, 0.3], &tight_fit_opts(LineSearcher::MoreThuente)).unwrap();

    assert!(out.neg_loglikelihood <= nll_true + 1e-6);
    assert!((out.params[0] - 0.5).abs() < 0.15, "μ̂ = {}", out.params[0]);
    assert!((out.params[1] - 0.8).abs() < 0.3, "α̂ = {}", out.params[1]);

    let mut poisson = HomogeneousPoisson::new(1).unwrap();
    poisson.bind(seq.clone()).unwrap();
    fit(&mut poisson, array![1.0], &FitOptions::default()).unwrap();

    let opts = RescalingOpts::default();
    let hawkes_ks = ks_exp1(&time_rescaling(&model, &seq, &opts).unwrap().pooled()).unwrap();
    let poisson_ks = ks_exp1(&time_rescaling(&poisson, &seq, &opts).unwrap().pooled()).unwrap();

    assert_eq!(hawkes_ks.n, seq.len());
    assert!(hawkes_ks.statistic < poisson_ks.statistic);
    assert!(hawkes_ks.p_value > poisson_ks.p_value);
}

#[test]
// Purpose
// -------
// A self-correcting fit improves on the true parameters' likelihood and
// its residuals have mean close to one.
//
// Given
// -----
// - D = 1, μ = 1, α = 0.8, look-ahead 0.5, horizon 300.
//
// Expect
// ------
// - Fitted NLL <= true NLL; mean rescaled time within 0.15 of 1.
fn self_correcting_simulate_and_fit() {
    let mut truth = SelfCorrecting::new(1, 0.5).unwrap();
    truth.set_parameters(array![1.0, 0.8]).unwrap();
    let seq = simulate(&truth, &SimOpts::new(300.0, Some(5), None).unwrap()).unwrap();

    let mut model = SelfCorrecting::new(1, 0.5).unwrap();
    model.bind(seq.clone()).unwrap();
    model.set_parameters(array![1.0, 0.8]).unwrap();
    let nll_true = model.neg_loglikelihood().unwrap().value;

    let out = fit(&mut model, array![0.5, 0.5], &tight_fit_opts(LineSearcher::MoreThuente)).unwrap();
    assert!(out.neg_loglikelihood <= nll_true + 1e-6);

    let residuals = time_rescaling(&model, &seq, &RescalingOpts::default()).unwrap().pooled();
    let mean = residuals.iter().sum::<f64>() / residuals.len() as f64;
    assert!((mean - 1.0).abs() < 0.15, "mean rescaled time = {mean}");
}

#[test]
// Purpose
// -------
// Every family works behind `Box<dyn PointProcess>` through the same calls.
//
// Given
// -----
// - One instance per family with positive parameters.
//
// Expect
// ------
// - Simulation, binding, and per-event gradients summing to the full
//   gradient all succeed through the trait object.
fn families_work_as_trait_objects() {
    let mut poisson = HomogeneousPoisson::new(2).unwrap();
    poisson.set_parameters(array![0.6, 0.9]).unwrap();
    let mut hawkes = ExpHawkes::with_uniform_decay(2, 3.0).unwrap();
    hawkes.set_parameters(array![0.3, 0.4, 0.5, 0.2, 0.1, 0.6]).unwrap();
    let mut sc = SelfCorrecting::new(2, 1.0).unwrap();
    sc.set_parameters(array![0.7, 0.5, 0.6, 0.9]).unwrap();

    let models: Vec<Box<dyn PointProcess>> = vec![Box::new(poisson), Box::new(hawkes), Box::new(sc)];
    for mut model in models {
        let seq = simulate(model.as_ref(), &SimOpts::new(30.0, Some(3), None).unwrap()).unwrap();
        assert_eq!(seq.num_dims(), 2);
        model.bind(seq).unwrap();

        let nll = model.neg_loglikelihood().unwrap();
        let len = model.history().unwrap().len();
        let mut summed = ndarray::Array1::<f64>::zeros(model.num_params());
        for k in 0..len {
            summed += &model.gradient(k).unwrap();
        }
        for (a, b) in summed.iter().zip(nll.gradient.iter()) {
            assert!((a - b).abs() <= 1e-9 * b.abs().max(1.0), "{}: {a} vs {b}", model.name());
        }
    }
}
