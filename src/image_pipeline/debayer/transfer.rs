//! sRGB colour component transfer function (encoding direction)

const LINEAR_CUTOFF: f32 = 0.003_130_8;
const LINEAR_SLOPE: f32 = 12.92;
const GAMMA: f32 = 2.4;

/// Encodes one linear-light sample with the sRGB curve.
///
/// Values at or below the cutoff (negatives included) follow the linear
/// segment, so the function is defined on the whole real line.
pub fn srgb_encode(linear: f32) -> f32 {
    if linear <= LINEAR_CUTOFF {
        linear * LINEAR_SLOPE
    } else {
        1.055 * linear.powf(1.0 / GAMMA) - 0.055
    }
}

pub fn srgb_encode_in_place(samples: &mut [f32]) {
    samples.iter_mut().for_each(|v| *v = srgb_encode(*v));
}
