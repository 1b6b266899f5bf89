//! Campaign constants and fixed tuning parameters.
//!
//! Values a scenario designer may want to change live in
//! [`crate::config::CampaignConfig`]; what stays here is structural.

// --- Time ---

pub const SECONDS_PER_HOUR: f64 = 3_600.0;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Timer value of a freshly activated campaign (09:00 on day 0).
pub const CAMPAIGN_START_TIMER: f64 = 32_400.0;

// --- Flight planning ---

/// Default cruise speed of fixed-wing packages (m/s).
pub const CRUISE_SPEED: f64 = 170.0;

/// Cruise speed of helicopter packages (m/s).
pub const HELICOPTER_CRUISE_SPEED: f64 = 55.0;

/// Distance of the landing navigation point from the home base (m).
pub const LANDING_NAV_DISTANCE: f64 = 20_000.0;

/// Strike ingress point distance from the target, toward home (m).
pub const STRIKE_INGRESS_DISTANCE: f64 = 15_000.0;

/// Strike egress point distance from the target (m).
pub const STRIKE_EGRESS_DISTANCE: f64 = 20_000.0;

/// DEAD ingress stand-off beyond the SAM's own range (m).
pub const DEAD_INGRESS_MARGIN: f64 = 5_000.0;

/// CAS ingress point distance from the target group (m).
pub const CAS_INGRESS_DISTANCE: f64 = 10_000.0;

/// AWACS racetrack start/end distances from home, away from the enemy (m).
pub const AWACS_RACETRACK_START: f64 = 20_000.0;
pub const AWACS_RACETRACK_END: f64 = 40_000.0;

/// CAP racetrack stand-off from the home base toward the enemy (m).
pub const CAP_RACETRACK_OFFSET: f64 = 40_000.0;

/// CAP racetrack length, perpendicular to the threat axis (m).
pub const CAP_RACETRACK_LENGTH: f64 = 30_000.0;

/// Minimum delay before strike-family packages take off (minutes).
pub const STRIKE_START_DELAY_MIN: u32 = 30;

/// Maximum delay before strike-family packages take off (minutes).
pub const STRIKE_START_DELAY_MAX: u32 = 60;

/// Time spent on the ground at a CSAR pickup or an air assault landing zone (minutes).
pub const HELICOPTER_GROUND_TIME: f64 = 5.0;

// --- Radio ---

/// Fixed AWACS package frequencies per coalition (MHz).
pub const BLUE_AWACS_FREQUENCY: f64 = 285.0;
pub const RED_AWACS_FREQUENCY: f64 = 280.0;

/// Fallback frequency band when the aircraft declares none (MHz).
pub const DEFAULT_FREQUENCY_MIN: u32 = 310;
pub const DEFAULT_FREQUENCY_MAX: u32 = 343;

// --- Call signs ---

/// Flight numbers are assigned from 1 upward per call sign name.
pub const FIRST_FLIGHT_NUMBER: u32 = 1;

// --- Ground war ---

/// Ground group cruise speed (m/s).
pub const GROUND_GROUP_SPEED: f64 = 6.0;

/// Unit count bounds of a freshly generated ground group (inclusive).
pub const GROUND_GROUP_MIN_UNITS: u32 = 4;
pub const GROUND_GROUP_MAX_UNITS: u32 = 8;

/// Maximum number of SHORAD units attached to an armor group (inclusive).
pub const GROUND_GROUP_MAX_SHORAD: u32 = 2;

/// Percent chance (1..=100 roll above this value) that a generated group is armor.
pub const ARMOR_ROLL_THRESHOLD: u32 = 40;

/// Engagement range of a SAM site whose definition gives none (m).
pub const DEFAULT_SAM_RANGE: f64 = 30_000.0;

/// Onboard numbers painted on generated aircraft (inclusive).
pub const ONBOARD_NUMBER_MIN: u32 = 1;
pub const ONBOARD_NUMBER_MAX: u32 = 99;

// --- Snapshots ---

/// Version tag written into every snapshot and save file.
pub const SNAPSHOT_VERSION: u32 = 1;
