//! Limited-memory BFGS with a backtracking Armijo line search.

use std::collections::VecDeque;

use ndarray::Array1;

/// Sufficient-decrease constant for the Armijo condition.
const ARMIJO_C1: f64 = 1e-4;
const MAX_LINE_SEARCH_STEPS: usize = 40;
/// Curvature pairs with `s·y` at or below this are skipped.
const CURVATURE_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Lbfgs {
    pub memory: usize,
    pub max_iter: usize,
    /// Converged once the largest absolute gradient component is at or below this.
    pub tolerance: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct Minimum {
    pub point: Array1<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// One step `s`, the gradient change `y` it caused, and `1 / s·y`.
#[derive(Debug)]
struct CurvaturePair {
    s: Array1<f64>,
    y: Array1<f64>,
    rho: f64,
}

impl Lbfgs {
    /// Minimise `objective`, which returns the value and gradient at a point.
    ///
    /// Every accepted step strictly decreases the objective, so the returned
    /// point is the best one visited even when the iteration cap is reached or
    /// the line search stalls.
    pub fn minimize<F>(&self, objective: F, start: Array1<f64>) -> Minimum
    where
        F: Fn(&Array1<f64>) -> (f64, Array1<f64>),
    {
        let mut point = start;
        let (mut value, mut gradient) = objective(&point);
        let mut history: VecDeque<CurvaturePair> = VecDeque::with_capacity(self.memory);

        if max_abs(&gradient) <= self.tolerance {
            return Minimum {
                point,
                value,
                iterations: 0,
                converged: true,
            };
        }

        for iteration in 1..=self.max_iter {
            let mut direction = two_loop(&gradient, &history);
            let mut slope = direction.dot(&gradient);
            if slope >= 0.0 {
                history.clear();
                direction = gradient.mapv(|g| -g);
                slope = -gradient.dot(&gradient);
            }

            let mut step = if history.is_empty() {
                (1.0 / norm(&gradient)).min(1.0)
            } else {
                1.0
            };

            let mut accepted = None;
            for _ in 0..MAX_LINE_SEARCH_STEPS {
                let mut candidate = point.clone();
                candidate.scaled_add(step, &direction);
                let (candidate_value, candidate_gradient) = objective(&candidate);
                if candidate_value <= value + ARMIJO_C1 * step * slope {
                    accepted = Some((candidate, candidate_value, candidate_gradient));
                    break;
                }
                step *= 0.5;
            }

            let Some((next, next_value, next_gradient)) = accepted else {
                tracing::debug!(iteration, value, "line search stalled");
                return Minimum {
                    converged: max_abs(&gradient) <= self.tolerance,
                    point,
                    value,
                    iterations: iteration,
                };
            };

            let s = &next - &point;
            let y = &next_gradient - &gradient;
            let sy = s.dot(&y);
            if sy > CURVATURE_EPS {
                if history.len() == self.memory {
                    history.pop_front();
                }
                history.push_back(CurvaturePair { s, y, rho: 1.0 / sy });
            }

            point = next;
            value = next_value;
            gradient = next_gradient;

            if max_abs(&gradient) <= self.tolerance {
                return Minimum {
                    point,
                    value,
                    iterations: iteration,
                    converged: true,
                };
            }
        }

        Minimum {
            point,
            value,
            iterations: self.max_iter,
            converged: false,
        }
    }
}

/// Two-loop recursion: returns `-H·g` for the implicit inverse Hessian `H`.
fn two_loop(gradient: &Array1<f64>, history: &VecDeque<CurvaturePair>) -> Array1<f64> {
    let mut q = gradient.clone();
    let mut alphas = Vec::with_capacity(history.len());

    for pair in history.iter().rev() {
        let alpha = pair.rho * pair.s.dot(&q);
        q.scaled_add(-alpha, &pair.y);
        alphas.push(alpha);
    }

    if let Some(latest) = history.back() {
        q *= latest.s.dot(&latest.y) / latest.y.dot(&latest.y);
    }

    for (pair, alpha) in history.iter().zip(alphas.into_iter().rev()) {
        let beta = pair.rho * pair.y.dot(&q);
        q.scaled_add(alpha - beta, &pair.s);
    }

    q.mapv_inplace(|v| -v);
    q
}

fn norm(v: &Array1<f64>) -> f64 {
    v.dot(v).sqrt()
}

fn max_abs(v: &Array1<f64>) -> f64 {
    v.fold(0.0_f64, |m, x| m.max(x.abs()))
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn solver(max_iter: usize) -> Lbfgs {
        Lbfgs {
            memory: 10,
            max_iter,
            tolerance: 1e-8,
        }
    }

    fn rosenbrock(x: &Array1<f64>) -> (f64, Array1<f64>) {
        let (a, b) = (x[0], x[1]);
        let value = (1.0 - a).powi(2) + 100.0 * (b - a * a).powi(2);
        let gradient = array![
            -2.0 * (1.0 - a) - 400.0 * a * (b - a * a),
            200.0 * (b - a * a),
        ];
        (value, gradient)
    }

    #[test]
    fn minimises_a_shifted_quadratic() {
        // f(x) = (x0 - 3)^2 + 10 (x1 + 1)^2
        let objective = |x: &Array1<f64>| {
            let value = (x[0] - 3.0).powi(2) + 10.0 * (x[1] + 1.0).powi(2);
            let gradient = array![2.0 * (x[0] - 3.0), 20.0 * (x[1] + 1.0)];
            (value, gradient)
        };

        let min = solver(200).minimize(objective, array![0.0, 0.0]);

        assert!(min.converged);
        assert!((min.point[0] - 3.0).abs() < 1e-6, "x0 = {}", min.point[0]);
        assert!((min.point[1] + 1.0).abs() < 1e-6, "x1 = {}", min.point[1]);
    }

    #[test]
    fn minimises_rosenbrock() {
        let min = solver(1000).minimize(rosenbrock, array![-1.2, 1.0]);

        assert!((min.point[0] - 1.0).abs() < 1e-4, "x0 = {}", min.point[0]);
        assert!((min.point[1] - 1.0).abs() < 1e-4, "x1 = {}", min.point[1]);
    }

    #[test]
    fn iteration_cap_returns_best_point_without_converging() {
        let (start_value, _) = rosenbrock(&array![-1.2, 1.0]);

        let min = solver(2).minimize(rosenbrock, array![-1.2, 1.0]);

        assert!(!min.converged);
        assert_eq!(min.iterations, 2);
        assert!(min.value < start_value);
    }

    #[test]
    fn starting_at_the_minimum_converges_immediately() {
        let objective = |x: &Array1<f64>| (x[0] * x[0], array![2.0 * x[0]]);
        let min = solver(10).minimize(objective, array![0.0]);
        assert!(min.converged);
        assert_eq!(min.iterations, 0);
    }

    #[test]
    fn two_loop_without_history_is_steepest_descent() {
        let gradient = array![1.5, -2.0, 0.0];
        let direction = two_loop(&gradient, &VecDeque::new());
        assert_eq!(direction, array![-1.5, 2.0, 0.0]);
    }
}
