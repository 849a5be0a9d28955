//! Relativistic energy/momentum helpers (natural units, GeV).

/// Total momentum of a particle with total energy `energy`.
pub fn momentum(energy: f64, rest_mass: f64) -> f64 {
    (energy * energy - rest_mass * rest_mass).sqrt()
}

/// Total energy of a particle with momentum `momentum`.
pub fn energy(momentum: f64, rest_mass: f64) -> f64 {
    (momentum * momentum + rest_mass * rest_mass).sqrt()
}

/// Converts a momentum-domain mean and spread into the energy domain.
///
/// The spread is scaled by the squared relativistic velocity of the mean
/// particle, `sigma_E = sigma_P * beta^2`.
pub fn momentum_to_energy(mean_p: f64, sigma_p: f64, rest_mass: f64) -> (f64, f64) {
    let mean_e = energy(mean_p, rest_mass);
    let gamma = mean_e / rest_mass;
    let beta = (1.0 - 1.0 / (gamma * gamma)).sqrt();
    (mean_e, sigma_p * beta * beta)
}
