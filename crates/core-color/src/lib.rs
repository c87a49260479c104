//! Integer RGB/HSV color math used to derive frame and dim-hint colors.
//!
//! All three channels of both [`Rgb`] and [`Hsv`] are `u8` (0..=255); the
//! conversions use the standard six-region integer hue formula rather than
//! floating point, matching how the rest of this engine avoids float state.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Convert RGB to HSV. `s` and `v` saturate at 0 when `v == 0` (pure black
/// has no defined hue or saturation).
pub fn rgb_to_hsv(c: Rgb) -> Hsv {
    let rgb_min = c.r.min(c.g).min(c.b);
    let rgb_max = c.r.max(c.g).max(c.b);
    let v = rgb_max;
    if v == 0 {
        return Hsv { h: 0, s: 0, v: 0 };
    }
    let s = (255 * u32::from(rgb_max - rgb_min) / u32::from(v)) as u8;
    if s == 0 {
        return Hsv { h: 0, s: 0, v };
    }
    let delta = i32::from(rgb_max - rgb_min);
    let h_raw: i32 = if rgb_max == c.r {
        43 * (i32::from(c.g) - i32::from(c.b)) / delta
    } else if rgb_max == c.g {
        85 + 43 * (i32::from(c.b) - i32::from(c.r)) / delta
    } else {
        171 + 43 * (i32::from(c.r) - i32::from(c.g)) / delta
    };
    Hsv {
        h: h_raw as u8,
        s,
        v,
    }
}

/// Convert HSV back to RGB using the six-region color wheel: `region =
/// h / 43` selects one of six 60-degree wedges, `remainder = (h - region*43)
/// * 6` interpolates within it.
pub fn hsv_to_rgb(c: Hsv) -> Rgb {
    if c.s == 0 {
        return Rgb::new(c.v, c.v, c.v);
    }
    let region = c.h / 43;
    let remainder = u32::from(c.h - region * 43) * 6;
    let v = u32::from(c.v);
    let s = u32::from(c.s);
    let p = ((v * (255 - s)) >> 8) as u8;
    let q = ((v * (255 - ((s * remainder) >> 8))) >> 8) as u8;
    let t = ((v * (255 - ((s * (255 - remainder)) >> 8))) >> 8) as u8;
    match region {
        0 => Rgb::new(c.v, t, p),
        1 => Rgb::new(q, c.v, p),
        2 => Rgb::new(p, c.v, t),
        3 => Rgb::new(p, q, c.v),
        4 => Rgb::new(t, p, c.v),
        _ => Rgb::new(c.v, p, q),
    }
}

/// Shift `fg`'s brightness toward black or white depending on `bg`'s
/// luminance and the sign of `delta`.
///
/// `delta >= 0` moves `fg` toward black when `bg` is light (`v >= 128`) and
/// toward white when `bg` is dark; a negative `delta` inverts both cases.
/// The hue and saturation of `fg` are preserved.
pub fn adjust(fg: Rgb, bg: Rgb, delta: i16) -> Rgb {
    let fg_hsv = rgb_to_hsv(fg);
    let bg_hsv = rgb_to_hsv(bg);
    let toward_black = (delta >= 0) == (bg_hsv.v >= 128);
    let magnitude = delta.unsigned_abs().min(255) as i16;
    let shifted = if toward_black {
        i16::from(fg_hsv.v) - magnitude
    } else {
        i16::from(fg_hsv.v) + magnitude
    };
    let new_v = shifted.clamp(0, 255) as u8;
    hsv_to_rgb(Hsv {
        v: new_v,
        ..fg_hsv
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn black_has_zero_saturation_and_value() {
        let hsv = rgb_to_hsv(Rgb::new(0, 0, 0));
        assert_eq!(hsv, Hsv { h: 0, s: 0, v: 0 });
    }

    #[test]
    fn white_has_zero_saturation_full_value() {
        let hsv = rgb_to_hsv(Rgb::new(255, 255, 255));
        assert_eq!(hsv.s, 0);
        assert_eq!(hsv.v, 255);
    }

    #[test]
    fn pure_red_round_trips_through_hsv() {
        let red = Rgb::new(255, 0, 0);
        let hsv = rgb_to_hsv(red);
        assert_eq!(hsv.v, 255);
        assert_eq!(hsv.s, 255);
        let back = hsv_to_rgb(hsv);
        assert_eq!(back, red);
    }

    #[test]
    fn adjust_darkens_fg_on_light_background_with_positive_delta() {
        let fg = Rgb::new(200, 200, 200);
        let light_bg = Rgb::new(240, 240, 240);
        let darker = adjust(fg, light_bg, 48);
        let original_v = rgb_to_hsv(fg).v;
        let new_v = rgb_to_hsv(darker).v;
        assert!(new_v < original_v);
    }

    #[test]
    fn adjust_lightens_fg_on_dark_background_with_positive_delta() {
        let fg = Rgb::new(60, 60, 60);
        let dark_bg = Rgb::new(10, 10, 10);
        let lighter = adjust(fg, dark_bg, 48);
        let original_v = rgb_to_hsv(fg).v;
        let new_v = rgb_to_hsv(lighter).v;
        assert!(new_v > original_v);
    }

    #[test]
    fn negative_delta_inverts_direction() {
        let fg = Rgb::new(200, 200, 200);
        let light_bg = Rgb::new(240, 240, 240);
        let positive = adjust(fg, light_bg, 48);
        let negative = adjust(fg, light_bg, -48);
        let original_v = rgb_to_hsv(fg).v;
        let positive_v = rgb_to_hsv(positive).v;
        let negative_v = rgb_to_hsv(negative).v;
        assert!(positive_v < original_v);
        assert!(negative_v > original_v);
    }
}
