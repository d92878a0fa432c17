use std::f64::consts::TAU;

const TOLERANCE: f64 = 1e-8;
const MAX_ITERATIONS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolution {
    /// Eccentric anomaly (rad)
    pub eccentric_anomaly: f64,
    pub iterations: usize,
    /// False when the iteration cap was hit; the last iterate is still returned.
    pub converged: bool,
}

/// Solves M = E - e*sin(E) by fixed-point iteration.
///
/// Mean anomaly is wrapped into [0, 2pi) first so long propagations do not
/// lose precision in the sine terms.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> KeplerSolution {
    let m = mean_anomaly.rem_euclid(TAU);
    let mut e_anomaly = m;

    for i in 0..MAX_ITERATIONS {
        let next = m + eccentricity * e_anomaly.sin();
        if (next - e_anomaly).abs() < TOLERANCE {
            return KeplerSolution {
                eccentric_anomaly: next,
                iterations: i + 1,
                converged: true,
            };
        }
        e_anomaly = next;
    }

    log::warn!(
        "Kepler solver did not converge after {} iterations (M={:.6} rad, e={})",
        MAX_ITERATIONS,
        m,
        eccentricity
    );
    KeplerSolution {
        eccentric_anomaly: e_anomaly,
        iterations: MAX_ITERATIONS,
        converged: false,
    }
}

/// tan(nu/2) = sqrt((1+e)/(1-e)) * tan(E/2)
pub fn eccentric_to_true(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let factor = ((1.0 + eccentricity) / (1.0 - eccentricity)).sqrt();
    2.0 * (factor * (eccentric_anomaly / 2.0).tan()).atan()
}

/// True anomaly to mean anomaly via the eccentric anomaly.
pub fn true_to_mean(true_anomaly: f64, eccentricity: f64) -> f64 {
    let factor = ((1.0 - eccentricity) / (1.0 + eccentricity)).sqrt();
    let e_anomaly = 2.0 * (factor * (true_anomaly / 2.0).tan()).atan();
    e_anomaly - eccentricity * e_anomaly.sin()
}
