use thiserror::Error;

/// Non-fatal conditions raised by the simulation core.
///
/// None of these abort a tick; callers inside the core log them and carry on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Spawn origin and target coincide, so there is no travel direction
    #[error("projectile origin and target coincide; direction is undefined")]
    DegenerateDirection,

    /// Pointer ray does not cross the ground plane
    #[error("pointer ray does not intersect the ground plane")]
    DegenerateAimRay,

    #[error("invalid projectile parameters: speed={speed}, max_distance={max_distance}")]
    InvalidProjectile { speed: f64, max_distance: f64 },

    #[error("projectile limit of {limit} reached")]
    CapacityExceeded { limit: usize },
}

pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SimError::CapacityExceeded { limit: 4 }.to_string(),
            "projectile limit of 4 reached"
        );
        assert!(SimError::DegenerateAimRay.to_string().contains("ground plane"));
    }
}
