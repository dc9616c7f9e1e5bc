//! Unison detune distribution.
//!
//! Spreads up to [`MAX_UNISON`] oscillator voices symmetrically around a
//! center pitch. Odd counts keep one voice exactly on pitch and stack
//! alternating ± pairs outward; even counts split symmetrically with no
//! center voice, the outermost pair sitting at the full detune amount.
//! Either way the offsets sum to zero, so the perceived pitch stays put.

/// Maximum number of unison voices per oscillator engine.
pub const MAX_UNISON: usize = 9;

/// Fill `out[..count]` with detune offsets in semitones.
///
/// `detune` is the spread amount (the outermost pair lands at `±detune`).
/// Offsets are ordered center-out with alternating sign, which keeps voice
/// state assignment stable as the count changes.
///
/// # Example
///
/// ```rust
/// use voce_vfx::unison::detune_offsets;
///
/// let mut out = [0.0f32; 9];
/// detune_offsets(5, 1.0, &mut out);
/// assert_eq!(&out[..5], &[0.0, -0.5, 0.5, -1.0, 1.0]);
/// ```
///
/// # Panics
///
/// Panics if `out` is shorter than `count` or `count` is zero.
pub fn detune_offsets(count: usize, detune: f32, out: &mut [f32]) {
    assert!(count >= 1, "unison count must be at least 1");
    let out = &mut out[..count];

    if count % 2 == 1 {
        out[0] = 0.0;
        if count > 2 {
            let offset_unit = 1.0 / (count / 2) as f32;
            let mut counter: i32 = 0;
            for i in 1..count {
                if i % 2 == 0 {
                    counter -= 1;
                }
                let tid = (i as i32 + counter) as f32 * offset_unit * detune;
                out[i] = if i % 2 == 0 { tid } else { -tid };
            }
        }
    } else {
        let offset_unit = 1.0 / (count / 2) as f32;
        let mut counter: i32 = 1;
        for i in 0..count {
            if i % 2 == 1 {
                counter -= 1;
            }
            let tid = (i as i32 + counter) as f32 * offset_unit * detune;
            out[i] = if i % 2 == 0 { tid } else { -tid };
        }
    }
}
