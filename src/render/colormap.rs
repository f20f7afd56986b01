//! Fixed perceptual color ramp for escape-time counts.
//!
//! Polynomial fit of the inferno colormap (deepest near-black purple at
//! `t = 0`, bright yellow at `t = 1`). A fixed-degree polynomial in f32 keeps
//! the ramp deterministic and dependency-free; exact color-space fidelity is
//! a non-goal.

const C0: [f32; 3] = [0.000_218_940_4, 0.001_651_004_6, -0.019_480_898];
const C1: [f32; 3] = [0.106_513_42, 0.563_956_44, 3.932_712_4];
const C2: [f32; 3] = [11.602_493, -3.972_854, -15.942_394];
const C3: [f32; 3] = [-41.703_996, 17.436_399, 44.354_145];
const C4: [f32; 3] = [77.162_94, -33.402_36, -81.807_31];
const C5: [f32; 3] = [-71.319_43, 32.626_064, 73.209_52];
const C6: [f32; 3] = [25.131_126, -12.242_669, -23.070_325];

/// Map a normalized escape value in `[0, 1]` to an RGB8 triple.
///
/// Input is clamped; NaN maps to the deepest ramp value.
pub fn inferno(t: f32) -> [u8; 3] {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let mut out = [0u8; 3];
    for (i, o) in out.iter_mut().enumerate() {
        let v = C0[i]
            + t * (C1[i] + t * (C2[i] + t * (C3[i] + t * (C4[i] + t * (C5[i] + t * C6[i])))));
        *o = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    out
}
