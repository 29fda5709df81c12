//! Liveness-probe timing derived from the HA agent's lease and sync period

use pgha_cluster::PatroniSpec;
use serde::{Deserialize, Serialize};

/// Probe thresholds, named as the orchestration platform names them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeTiming {
    /// Seconds before a single check times out
    pub timeout_seconds: i32,
    /// Seconds between checks
    pub period_seconds: i32,
    /// Consecutive successes to be considered healthy; always 1 for liveness
    pub success_threshold: i32,
    /// Consecutive failures before the container is restarted
    pub failure_threshold: i32,
}

impl ProbeTiming {
    /// Derive thresholds from a lease duration and a sync period, in seconds
    ///
    /// A check must finish within half a heartbeat, and the probe must not
    /// fail faster than the lease can expire. Inputs below 1 are raised to 1.
    #[must_use]
    pub fn from_durations(lease: i32, sync: i32) -> Self {
        if lease < 1 || sync < 1 {
            tracing::debug!(lease, sync, "raising probe durations to the 1 second minimum");
        }
        let lease = lease.max(1);
        let sync = sync.max(1);

        let period_seconds = sync;
        let timeout_seconds = (sync / 2).max(1);
        let success_threshold = 1;
        let failure_threshold = (lease / sync).max(1);

        Self {
            timeout_seconds,
            period_seconds,
            success_threshold,
            failure_threshold,
        }
    }
}

/// Probe timing for the HA agent's container; unset durations use their
/// defaults
#[must_use]
pub fn probe_timing(spec: &PatroniSpec) -> ProbeTiming {
    ProbeTiming::from_durations(spec.lease_or_default(), spec.sync_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn timing(timeout: i32, period: i32, failure: i32) -> ProbeTiming {
        ProbeTiming {
            timeout_seconds: timeout,
            period_seconds: period,
            success_threshold: 1,
            failure_threshold: failure,
        }
    }

    #[test]
    fn defaults_match_documented_timing() {
        let spec = PatroniSpec::new().with_defaults();
        assert_eq!(probe_timing(&spec), timing(5, 10, 3));
        assert_eq!(probe_timing(&PatroniSpec::new()), timing(5, 10, 3));
    }

    #[test]
    fn known_durations() {
        for (lease, sync, expected) in [
            // smallest values the cluster specification accepts
            (3, 1, timing(1, 1, 3)),
            (60, 15, timing(7, 15, 4)),
            (10, 5, timing(2, 5, 2)),
            // not multiples of each other; failure triggers before the lease ends
            (19, 7, timing(3, 7, 2)),
            (13, 7, timing(3, 7, 1)),
            // infeasible for the agent, still valid probes
            (60, 60, timing(30, 60, 1)),
            (10, 20, timing(10, 20, 1)),
        ] {
            let spec = PatroniSpec::new()
                .with_leader_lease_duration_seconds(lease)
                .with_sync_period_seconds(sync);
            assert_eq!(probe_timing(&spec), expected, "lease={lease} sync={sync}");
        }
    }

    #[test]
    fn out_of_range_inputs_are_raised() {
        assert_eq!(ProbeTiming::from_durations(0, 0), timing(1, 1, 1));
        assert_eq!(ProbeTiming::from_durations(-5, 4), timing(2, 4, 1));
    }

    proptest! {
        #[test]
        fn prop_timing_law(lease in 1..=100_000i32, sync in 1..=100_000i32) {
            let probe = ProbeTiming::from_durations(lease, sync);

            prop_assert_eq!(probe.period_seconds, sync);
            prop_assert_eq!(probe.timeout_seconds, std::cmp::max(1, sync / 2));
            prop_assert_eq!(probe.success_threshold, 1);
            prop_assert_eq!(probe.failure_threshold, std::cmp::max(1, lease / sync));

            prop_assert!(probe.timeout_seconds >= 1);
            prop_assert!(probe.period_seconds >= 1);
            prop_assert!(probe.failure_threshold >= 1);
        }

        #[test]
        fn prop_timeout_fits_in_period(sync in 2..=100_000i32) {
            let probe = ProbeTiming::from_durations(30, sync);
            prop_assert!(probe.timeout_seconds * 2 <= probe.period_seconds);
        }
    }
}
