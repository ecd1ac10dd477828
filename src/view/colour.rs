//! Level → colour mapping.

/// HSV (all components in [0, 1], hue in turns) to 8-bit RGB
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> [u8; 3] {
    let h = hue.rem_euclid(1.0) * 6.0;
    let s = saturation.clamp(0.0, 1.0);
    let v = value.clamp(0.0, 1.0);

    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    [to_u8(r), to_u8(g), to_u8(b)]
}

fn to_u8(c: f32) -> u8 {
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Hue for a level, interpolated across `hue_range` and wrapped into [0, 1)
pub fn level_to_hue(level: f32, hue_range: (f32, f32)) -> f32 {
    let (low, high) = hue_range;
    (low + level * (high - low)).rem_euclid(1.0)
}

/// RGBA colour for a level: hue from the gradient, brightness = level
pub fn level_to_rgba(level: f32, hue_range: (f32, f32)) -> [u8; 4] {
    let level = level.clamp(0.0, 1.0);
    let [r, g, b] = hsv_to_rgb(level_to_hue(level, hue_range), 1.0, level);
    [r, g, b, 255]
}
