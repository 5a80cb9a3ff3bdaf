//! Two-channel rumble effect value.

use std::ops::{Add, AddAssign, Mul};

/// Knee of the soft-clip curve. Values at or below pass through unchanged.
pub const SOFT_CLIP_KNEE: f64 = 0.7;

/// Motor intensities for one tick.
///
/// `right` drives the high-frequency ("strong") motor, `left` the
/// low-frequency ("weak") one. Engines produce values in `[0, 1]`; sums
/// may exceed that range until [`RumbleEffect::soft_clipped`] or
/// [`RumbleEffect::clamped`] is applied.
///
/// # Examples
///
/// ```
/// use padhaptics_effects::RumbleEffect;
///
/// let road = RumbleEffect::new(0.2, 0.03);
/// let kerb = RumbleEffect::new(0.5, 0.25);
/// let mixed = road * 0.5 + kerb;
/// assert!((mixed.right - 0.6).abs() < 1e-9);
/// assert_eq!(RumbleEffect::new(1.0, 0.0).to_bytes(), [255, 0]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RumbleEffect {
    pub right: f64,
    pub left: f64,
}

impl RumbleEffect {
    pub const NONE: Self = Self {
        right: 0.0,
        left: 0.0,
    };

    pub const fn new(right: f64, left: f64) -> Self {
        Self { right, left }
    }

    /// Both channels exactly zero.
    pub fn is_none(&self) -> bool {
        self.right.abs() < f64::EPSILON && self.left.abs() < f64::EPSILON
    }

    /// Both channels clamped to `[0, 1]`. Non-finite values become 0.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            right: clamp_unit(self.right),
            left: clamp_unit(self.left),
        }
    }

    /// Applies [`soft_clip`] per channel.
    #[must_use]
    pub fn soft_clipped(self) -> Self {
        Self {
            right: soft_clip(self.right),
            left: soft_clip(self.left),
        }
    }

    /// Right channel quantized to `0..=255`.
    pub fn right_byte(&self) -> u8 {
        to_byte(self.right)
    }

    /// Left channel quantized to `0..=255`.
    pub fn left_byte(&self) -> u8 {
        to_byte(self.left)
    }

    /// `[right, left]` quantized to `0..=255`.
    pub fn to_bytes(&self) -> [u8; 2] {
        [self.right_byte(), self.left_byte()]
    }
}

impl Add for RumbleEffect {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            right: self.right + rhs.right,
            left: self.left + rhs.left,
        }
    }
}

impl AddAssign for RumbleEffect {
    fn add_assign(&mut self, rhs: Self) {
        self.right += rhs.right;
        self.left += rhs.left;
    }
}

impl Mul<f64> for RumbleEffect {
    type Output = Self;

    fn mul(self, gain: f64) -> Self {
        Self {
            right: self.right * gain,
            left: self.left * gain,
        }
    }
}

/// Saturating compression above [`SOFT_CLIP_KNEE`].
///
/// Non-positive input maps to 0; the curve approaches 1.0 asymptotically.
pub fn soft_clip(x: f64) -> f64 {
    if x.is_nan() || x <= 0.0 {
        return 0.0;
    }
    if x <= SOFT_CLIP_KNEE {
        return x;
    }
    let headroom = 1.0 - SOFT_CLIP_KNEE;
    SOFT_CLIP_KNEE + headroom * ((x - SOFT_CLIP_KNEE) / headroom).tanh()
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped to [0, 255] before the cast"
)]
fn to_byte(v: f64) -> u8 {
    (clamp_unit(v) * 255.0).round() as u8
}
