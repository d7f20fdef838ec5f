//! Static policy over negotiated session parameters.
//!
//! Checked exactly once, at record-session construction. Empty allow-lists
//! mean "no restriction" for that dimension; the rotation window is always
//! bounded.

use std::collections::HashSet;
use std::time::Duration;

/// Rotation window floor applied when the config leaves it unset.
pub const DEFAULT_MIN_ROTATION: Duration = Duration::from_secs(5 * 60);
/// Rotation window ceiling applied when the config leaves it unset.
pub const DEFAULT_MAX_ROTATION: Duration = Duration::from_secs(60 * 60);

/// Allowed session characteristics.
#[derive(Debug, Clone, Default)]
pub struct PolicyConfig {
    /// Permitted mode strings; empty means any.
    pub allowed_modes: Vec<String>,
    /// Permitted AEAD suite names; empty means any.
    pub allowed_aeads: Vec<String>,
    /// Minimum rotation window (0 selects the default).
    pub min_rotation: Duration,
    /// Maximum rotation window (0 selects the default).
    pub max_rotation: Duration,
}

/// Negotiated parameters of a session under validation.
#[derive(Debug, Clone)]
pub struct Parameters {
    pub mode: String,
    pub aead: String,
    pub rotation_window: Duration,
}

/// Validates negotiated parameters against the configured policy.
#[derive(Debug)]
pub struct PolicyEnforcer {
    modes: HashSet<String>,
    aeads: HashSet<String>,
    min_rotation: Duration,
    max_rotation: Duration,
}

impl PolicyEnforcer {
    /// Build an enforcer, filling unset rotation bounds with defaults.
    #[must_use]
    pub fn new(cfg: PolicyConfig) -> Self {
        Self {
            modes: cfg.allowed_modes.into_iter().collect(),
            aeads: cfg.allowed_aeads.into_iter().collect(),
            min_rotation: if cfg.min_rotation.is_zero() {
                DEFAULT_MIN_ROTATION
            } else {
                cfg.min_rotation
            },
            max_rotation: if cfg.max_rotation.is_zero() {
                DEFAULT_MAX_ROTATION
            } else {
                cfg.max_rotation
            },
        }
    }

    /// Check `params`, returning the first violation.
    ///
    /// # Errors
    /// Returns the first of: unknown mode, unknown AEAD, rotation window
    /// below minimum, rotation window above maximum.
    pub fn validate(&self, params: &Parameters) -> Result<(), PolicyError> {
        if !self.modes.is_empty() && !self.modes.contains(&params.mode) {
            return Err(PolicyError::ModeNotPermitted(params.mode.clone()));
        }
        if !self.aeads.is_empty() && !self.aeads.contains(&params.aead) {
            return Err(PolicyError::AeadNotPermitted(params.aead.clone()));
        }
        if params.rotation_window < self.min_rotation {
            return Err(PolicyError::RotationTooShort {
                window: params.rotation_window,
                min: self.min_rotation,
            });
        }
        if params.rotation_window > self.max_rotation {
            return Err(PolicyError::RotationTooLong {
                window: params.rotation_window,
                max: self.max_rotation,
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("mode {0:?} not permitted")]
    ModeNotPermitted(String),
    #[error("AEAD {0:?} not permitted")]
    AeadNotPermitted(String),
    #[error("rotation interval {window:?} below minimum {min:?}")]
    RotationTooShort { window: Duration, min: Duration },
    #[error("rotation interval {window:?} exceeds maximum {max:?}")]
    RotationTooLong { window: Duration, max: Duration },
}
