//! loglik_optimizer::finite_diff — finite-difference gradients of the cost.
//!
//! Purpose
//! -------
//! Approximate `∇c(θ)` when a [`LogLikelihood`] does not supply an analytic
//! gradient, hiding the `finitediff` API and its `Fn(&Theta) -> f64`
//! closure shape from the rest of the optimizer.
//!
//! Key behaviors
//! -------------
//! - [`fd_gradient`] tries central differences first and falls back to
//!   forward differences when a cost evaluation fails or the central
//!   estimate is not finite.
//! - [`run_fd_diff`] performs the forward-difference pass with error capture
//!   and validation.
//!
//! Invariants & assumptions
//! ------------------------
//! - The first error raised by the cost during differencing is parked in a
//!   `RefCell` slot and the closure returns `NaN`; the slot is inspected
//!   after each pass.
//! - Every gradient returned from here has passed [`validate_grad`].
//!
//! Downstream usage
//! ----------------
//! - [`ArgMinAdapter::gradient`](crate::optimization::loglik_optimizer::adapter::ArgMinAdapter)
//!   calls [`fd_gradient`] on `GradientNotImplemented`.
//!
//! [`LogLikelihood`]: crate::optimization::loglik_optimizer::LogLikelihood
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{Grad, Theta, validation::validate_grad},
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Forward-difference gradient with error capture and validation.
///
/// Parameters
/// ----------
/// - `theta`: point at which to differentiate; its length is the expected
///   gradient dimension.
/// - `func`: scalar objective that writes any failure into `closure_err` and
///   returns `NaN`.
/// - `closure_err`: shared error slot, cleared on entry.
///
/// Errors
/// ------
/// - The captured closure error, converted into `OptError`.
/// - `OptError::GradientDimMismatch` / `OptError::InvalidGradient` from
///   [`validate_grad`].
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// Finite-difference gradient of a fallible cost, central first.
///
/// The central pass is kept only if no evaluation failed and every entry is
/// finite; otherwise a single forward pass is run through [`run_fd_diff`]
/// and its outcome is returned as-is.
///
/// # Errors
/// Whatever the forward pass reports when the central pass was rejected.
pub fn fd_gradient<C>(theta: &Theta, cost: C) -> OptResult<Grad>
where
    C: Fn(&Theta) -> Result<f64, Error>,
{
    let closure_err: RefCell<Option<Error>> = RefCell::new(None);
    let func = |x: &Theta| -> f64 {
        match cost(x) {
            Ok(val) => val,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };
    let central = theta.central_diff(&func);
    if closure_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
        return Ok(central);
    }
    run_fd_diff(theta, &func, &closure_err)
}
