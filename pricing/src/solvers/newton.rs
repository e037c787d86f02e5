use log::{trace, warn};

use super::{RootFindResult, SolverConfig, MIN_DERIVATIVE, NUMERICAL_DERIVATIVE_STEP};

/// Newton-Raphson iteration `x_{n+1} = x_n - f(x_n) / f'(x_n)` with an
/// analytic derivative.
///
/// Stops with `converged = true` as soon as `|f(x)| < tolerance`. Running out
/// of iterations, a vanishing derivative or a non-finite value end the search
/// with `converged = false` and the last iterate.
/// https://en.wikipedia.org/wiki/Newton%27s_method
pub fn newton_raphson<F, DF>(f: F, df: DF, initial_guess: f64, config: &SolverConfig) -> RootFindResult
where
    F: Fn(f64) -> f64,
    DF: Fn(f64) -> f64,
{
    let mut x = initial_guess;

    for iteration in 0..config.max_iterations {
        let fx = f(x);
        trace!("newton iteration {}: x = {}, f(x) = {}", iteration, x, fx);

        if !fx.is_finite() {
            warn!("newton: residual is not finite at x = {}", x);
            return RootFindResult::failed(x, iteration);
        }
        if fx.abs() < config.tolerance {
            return RootFindResult::converged(x, iteration);
        }

        let dfx = df(x);
        if !(dfx.abs() >= MIN_DERIVATIVE) {
            warn!("newton: derivative {:e} too small at x = {}", dfx, x);
            return RootFindResult::failed(x, iteration);
        }

        let next = x - fx / dfx;
        if !next.is_finite() {
            warn!("newton: step from x = {} left the finite range", x);
            return RootFindResult::failed(x, iteration + 1);
        }
        x = next;
    }

    let fx = f(x);
    if fx.abs() < config.tolerance {
        return RootFindResult::converged(x, config.max_iterations);
    }
    warn!(
        "newton: no convergence after {} iterations, last x = {}, f(x) = {}",
        config.max_iterations, x, fx
    );
    RootFindResult::failed(x, config.max_iterations)
}

/// Newton-Raphson with a central difference estimate of the derivative.
pub fn newton_raphson_numerical<F>(f: F, initial_guess: f64, config: &SolverConfig) -> RootFindResult
where
    F: Fn(f64) -> f64,
{
    let h = NUMERICAL_DERIVATIVE_STEP;
    let df = |x: f64| (f(x + h) - f(x - h)) / (2.0 * h);
    newton_raphson(&f, df, initial_guess, config)
}

/// Uses the analytic derivative when one is supplied, a numerical one otherwise.
pub fn solve<F, DF>(f: F, df: Option<DF>, initial_guess: f64, config: &SolverConfig) -> RootFindResult
where
    F: Fn(f64) -> f64,
    DF: Fn(f64) -> f64,
{
    match df {
        Some(df) => newton_raphson(f, df, initial_guess, config),
        None => newton_raphson_numerical(f, initial_guess, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn sqrt_2() {
        let f = |x: f64| x * x - 2.0;
        let df = |x: f64| 2.0 * x;

        let result = newton_raphson(f, df, 1.5, &SolverConfig::default().with_tolerance(1e-12));
        assert!(result.converged);
        assert_approx_eq!(result.value, std::f64::consts::SQRT_2, 1e-10);
        assert!(result.iterations < 10);
    }

    #[test]
    fn numerical_derivative() {
        let f = |x: f64| x * x * x - 27.0;

        let result = newton_raphson_numerical(f, 2.0, &SolverConfig::default());
        assert!(result.converged);
        assert_approx_eq!(result.value, 3.0, 1e-6);
    }

    #[test]
    fn initial_guess_already_a_root() {
        let result = newton_raphson_numerical(|x: f64| x - 4.0, 4.0, &SolverConfig::default());
        assert_eq!(result, RootFindResult::converged(4.0, 0));
    }

    #[test]
    fn zero_derivative_is_not_fatal() {
        let f = |x: f64| x * x * x - 1.0;
        let df = |x: f64| 3.0 * x * x;

        let result = newton_raphson(f, df, 0.0, &SolverConfig::default());
        assert!(!result.converged);
        assert_eq!(result.value, 0.0);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn flat_function_with_numerical_derivative() {
        let result = newton_raphson_numerical(|_x: f64| 1.0, 0.3, &SolverConfig::default());
        assert!(!result.converged);
        assert_eq!(result.value, 0.3);
    }

    #[test]
    fn exhausted_iterations() {
        // x^2 + 1 has no real root, the iterates wander around forever
        let f = |x: f64| x * x + 1.0;
        let df = |x: f64| 2.0 * x;

        let result = newton_raphson(f, df, 0.5, &SolverConfig::default().with_max_iterations(25));
        assert!(!result.converged);
        assert_eq!(result.iterations, 25);
        assert!(result.root().is_none());
    }

    #[test]
    fn non_finite_residual_stops_the_search() {
        let f = |x: f64| x.ln() + 1.0;
        let result = newton_raphson_numerical(f, -1.0, &SolverConfig::default());
        assert!(!result.converged);
    }

    #[test]
    fn negative_iterates_are_not_rejected() {
        // the root is negative; the solver must be allowed to go there
        let f = |x: f64| x + 0.75;
        let result = newton_raphson(f, |_| 1.0, 0.25, &SolverConfig::default());
        assert!(result.converged);
        assert_approx_eq!(result.value, -0.75, 1e-12);
    }

    #[test]
    fn solve_dispatches_on_derivative() {
        let f = |x: f64| x * x - 2.0;
        let config = SolverConfig::default();

        let analytic = solve(f, Some(|x: f64| 2.0 * x), 1.0, &config);
        let numeric = solve(f, None::<fn(f64) -> f64>, 1.0, &config);
        assert!(analytic.converged && numeric.converged);
        assert_approx_eq!(analytic.value, numeric.value, 1e-5);
    }
}
