use std::time::Duration;

const BASE_TIMEOUT: Duration = Duration::from_secs(60);
const PER_DEPENDENCY_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_TIMEOUT: Duration = Duration::from_secs(900);

/// Timeout for a build submission, scaled to how many dependencies the
/// service will have to install. Saturates at the cap so huge requests still
/// get a bounded wait.
pub fn compute_timeout(dependency_count: usize) -> Duration {
    let scaled = BASE_TIMEOUT + PER_DEPENDENCY_TIMEOUT * dependency_count as u32;
    scaled.min(MAX_TIMEOUT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(compute_timeout(0), Duration::from_secs(60));
        assert_eq!(compute_timeout(3), Duration::from_secs(420));
        assert_eq!(compute_timeout(5), Duration::from_secs(660));
        assert_eq!(compute_timeout(100), Duration::from_secs(900));
    }

    #[test]
    fn test_monotone_and_capped() {
        let mut previous = Duration::ZERO;
        for count in 0..64 {
            let timeout = compute_timeout(count);
            assert!(timeout >= previous);
            assert!(timeout <= Duration::from_secs(900));
            previous = timeout;
        }
    }
}
