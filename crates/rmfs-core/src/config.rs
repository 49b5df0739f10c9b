//! Top-level simulation configuration.
//!
//! One flat struct of scalar knobs, typically loaded from a TOML file by the
//! application crate and validated once before the run starts.  An
//! obviously-invalid instance (zero capacity, zero duration) is rejected up
//! front rather than failing mid-run.

use crate::{FleetError, FleetResult};

/// Scalar configuration surface consumed by the managers.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Total simulated seconds.
    pub duration_secs: f64,

    /// Master RNG seed.  The same seed always produces identical runs.
    pub seed: u64,

    /// Orders a station may hold at once (assigned, not yet completed).
    pub station_capacity: u32,

    /// Seconds to pick up or set down a pallet at a stand.
    pub pallet_service_secs: f64,

    /// Seconds to re-secure a partially filled bin before resuming a
    /// previously interrupted gather.
    pub prepare_secs: f64,

    /// Multiplier on a pick's service time when a station picks without a
    /// mate (`bots_self_assist`).
    pub self_pick_factor: f64,

    /// A new mate assignment must beat the current cover's predicted arrival
    /// by at least this many seconds to trigger a switch.
    pub mate_switching_threshold: f64,

    /// Upper bound on cover changes for one assist request before the assist
    /// begins.  Prevents oscillation between competing assignments.
    pub max_mate_switches: u32,

    /// Select the see-off scheduling strategy instead of the default.
    pub see_off_scheduling: bool,

    /// Stations pick items themselves (no mates requested).
    pub bots_self_assist: bool,

    /// A mate already standing at the assist location is preferred over any
    /// switch arithmetic.
    pub same_assist_location: bool,

    /// Lock the rendezvous waypoint for the robot/mate pair while an assist
    /// is scheduled.
    pub reserve_same_assist_location: bool,

    /// Additionally lock the robot's next assist location (one past the
    /// currently registered rendezvous).
    pub reserve_next_assist_location: bool,

    /// An input stand must be this many inbound agents less congested than
    /// the nearest one to win selection on congestion grounds.
    pub input_stand_margin: u32,

    /// Same, for output stands.
    pub output_stand_margin: u32,

    /// Base URL of the remote optimizer, e.g. `http://localhost:5000`.
    /// `None` selects the greedy batching policy.
    pub optimizer_url: Option<String>,

    /// At most this many pending whole orders are included in an optimizer
    /// batch snapshot (in-progress partial orders are always included).
    pub pending_batch_limit: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            duration_secs: 3_600.0,
            seed: 42,
            station_capacity: 2,
            pallet_service_secs: 10.0,
            prepare_secs: 5.0,
            self_pick_factor: 1.5,
            mate_switching_threshold: 30.0,
            max_mate_switches: 3,
            see_off_scheduling: false,
            bots_self_assist: false,
            same_assist_location: true,
            reserve_same_assist_location: false,
            reserve_next_assist_location: false,
            input_stand_margin: 3,
            output_stand_margin: 2,
            optimizer_url: None,
            pending_batch_limit: 100,
        }
    }
}

impl SimConfig {
    /// Reject an instance that could not possibly run correctly.
    ///
    /// Resource exhaustion at runtime (no free slot, no available mate) is
    /// normal operation; the conditions checked here are configuration
    /// mistakes and fail before the first event fires.
    pub fn validate(&self) -> FleetResult<()> {
        if !(self.duration_secs > 0.0) {
            return Err(FleetError::Config("duration_secs must be > 0".into()));
        }
        if self.station_capacity == 0 {
            return Err(FleetError::Config("station_capacity must be > 0".into()));
        }
        if self.pallet_service_secs < 0.0 || self.prepare_secs < 0.0 {
            return Err(FleetError::Config("service durations must be >= 0".into()));
        }
        if self.self_pick_factor < 1.0 {
            return Err(FleetError::Config("self_pick_factor must be >= 1".into()));
        }
        if self.mate_switching_threshold < 0.0 {
            return Err(FleetError::Config(
                "mate_switching_threshold must be >= 0".into(),
            ));
        }
        if self.pending_batch_limit == 0 {
            return Err(FleetError::Config("pending_batch_limit must be > 0".into()));
        }
        Ok(())
    }
}
