use failsafe::backoff::{self, Exponential};
use failsafe::failure_policy::{self, ConsecutiveFailures};
use failsafe::{Config, StateMachine};
use std::time::Duration;

/// Concrete breaker type guarding core API calls, so it can live inside the
/// client struct.
pub type ApiCircuitBreaker = StateMachine<ConsecutiveFailures<Exponential>, ()>;

/// Creates a circuit breaker for core API requests to prevent hammering a
/// backend that is already failing.
///
/// # Configuration
///
/// - **Failure threshold**: 5 consecutive failures triggers OPEN state.
/// - **Backoff**: Exponential backoff from 10s to 60s before attempting recovery.
///
/// # States
///
/// - **CLOSED**: Normal operation, requests pass through.
/// - **OPEN**: Too many failures, requests fail fast.
/// - **HALF_OPEN**: Testing if service recovered.
pub fn create_api_circuit_breaker() -> ApiCircuitBreaker {
    let backoff_strategy = backoff::exponential(
        Duration::from_secs(10), // Initial delay
        Duration::from_secs(60), // Maximum delay
    );

    let failure_policy = failure_policy::consecutive_failures(5, backoff_strategy);

    Config::new().failure_policy(failure_policy).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use failsafe::{CircuitBreaker, Error};

    #[test]
    fn test_circuit_breaker_opens_after_failures() {
        let cb = create_api_circuit_breaker();

        // Simulate 5 consecutive failures
        for _ in 0..5 {
            let result: Result<(), Error<&str>> = cb.call(|| Err::<(), &str>("simulated error"));
            assert!(result.is_err());
        }

        // Next call should be rejected (circuit is open)
        let result: Result<(), Error<&str>> = cb.call(|| Ok::<(), &str>(()));

        match result {
            Err(Error::Rejected) => {
                // Circuit is open, expected behavior
            }
            _ => panic!("Expected circuit to be open and reject requests"),
        }
    }

    #[test]
    fn test_circuit_breaker_allows_success() {
        let cb = create_api_circuit_breaker();

        let result: Result<i32, Error<&str>> = cb.call(|| Ok::<i32, &str>(42));

        assert_eq!(result.unwrap(), 42);
    }
}
