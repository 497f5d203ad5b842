use crate::core::math::Vector3;

/// ACES filmic curve (Narkowicz fit), HDR to [0, 1].
pub fn aces_tone_mapping(color: Vector3) -> Vector3 {
    let a = 2.51;
    let b = 0.03;
    let c = 2.43;
    let d = 0.59;
    let e = 0.14;

    color.map(|x| ((x * (a * x + b)) / (x * (c * x + d) + e)).clamp(0.0, 1.0))
}

/// Reinhard operator `c / (1 + c)`, kept for configurations without ACES.
pub fn reinhard_tone_mapping(color: Vector3) -> Vector3 {
    color.map(|x| x.max(0.0) / (1.0 + x.max(0.0)))
}

/// Gamma 2.2 encode.
pub fn linear_to_srgb(color: Vector3) -> Vector3 {
    let gamma = 1.0 / 2.2;
    color.map(|x| x.max(0.0).powf(gamma))
}

/// Exposure, tone mapping and gamma, quantized to 8 bits per channel.
pub fn encode_rgb8(color: Vector3, exposure: f32, use_aces: bool) -> [u8; 3] {
    let exposed = color * exposure;
    let mapped = if use_aces {
        aces_tone_mapping(exposed)
    } else {
        reinhard_tone_mapping(exposed)
    };
    let srgb = linear_to_srgb(mapped);
    let q = |x: f32| (x.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
    [q(srgb.x), q(srgb.y), q(srgb.z)]
}
