//! Heuristic attribute estimates for when no trained model can be used.
//!
//! Every function here is total: it always returns a label from the kind's
//! vocabulary with a confidence inside the fallback band, and the result is
//! always marked `using_fallback`.

use crate::frame::{luma, FrameStats, ImageFrame};
use crate::types::{AttributeDetails, AttributeKind, AttributeResult, Gender, Rgb, Undertone};
use rand::Rng;

/// Weighted label prior. Weights need not sum to 1.
type Prior = &'static [(&'static str, f32)];

const FACE_PRIOR: Prior = &[
    ("oval", 0.25),
    ("round", 0.20),
    ("square", 0.15),
    ("heart", 0.15),
    ("diamond", 0.10),
    ("rectangle", 0.10),
    ("triangle", 0.05),
];

const BODY_PRIOR_FEMALE: Prior = &[
    ("hourglass", 0.25),
    ("rectangle", 0.25),
    ("pear", 0.20),
    ("apple", 0.15),
    ("inverted-triangle", 0.15),
];

const BODY_PRIOR_MALE: Prior = &[
    ("trapezoid", 0.30),
    ("rectangle", 0.25),
    ("triangle", 0.20),
    ("oval", 0.15),
    ("inverted-triangle", 0.10),
];

const SKIN_PRIOR: Prior = &[
    ("very-fair", 0.10),
    ("fair", 0.20),
    ("medium", 0.30),
    ("olive", 0.20),
    ("brown", 0.15),
    ("deep", 0.05),
];

const UNDERTONE_PRIOR: &[(Undertone, f32)] = &[
    (Undertone::Cool, 0.3),
    (Undertone::Neutral, 0.4),
    (Undertone::Warm, 0.3),
];

/// Frames taller than this (height / width) look like a full-length shot of
/// a slim silhouette; rectangle gets extra weight.
const TALL_ASPECT_RATIO: f32 = 2.2;
const TALL_RECTANGLE_BOOST: f32 = 1.5;

/// Centre-region luma lower bounds, lightest first.
const SKIN_LUMA_BUCKETS: &[(f32, &str)] = &[
    (215.0, "very-fair"),
    (190.0, "fair"),
    (160.0, "medium"),
    (130.0, "olive"),
    (95.0, "brown"),
    (0.0, "deep"),
];

/// Red minus blue in the centre region: above WARM is warm, below COOL is cool.
const UNDERTONE_WARM_RB: f32 = 45.0;
const UNDERTONE_COOL_RB: f32 = 25.0;

/// Per-tone channel ranges for the swatch, `[(r_lo, r_hi), (g_lo, g_hi), (b_lo, b_hi)]`.
fn swatch_range(label: &str) -> [(u8, u8); 3] {
    match label {
        "very-fair" => [(240, 255), (220, 240), (200, 225)],
        "fair" => [(225, 245), (200, 220), (175, 200)],
        "medium" => [(200, 225), (170, 200), (140, 170)],
        "olive" => [(180, 200), (150, 180), (120, 150)],
        "brown" => [(150, 180), (120, 150), (90, 120)],
        _ => [(90, 120), (70, 90), (60, 80)],
    }
}

fn undertone_shift(undertone: Undertone) -> [i16; 3] {
    match undertone {
        Undertone::Cool => [-10, 0, 10],
        Undertone::Neutral => [0, 0, 0],
        Undertone::Warm => [10, 5, -10],
    }
}

/// Heuristic result for `kind`. `image` may be absent or invalid.
pub fn fallback<R: Rng + ?Sized>(
    kind: AttributeKind,
    image: Option<&ImageFrame>,
    gender: Gender,
    rng: &mut R,
) -> AttributeResult {
    let stats = image.and_then(ImageFrame::stats);
    let band = kind.fallback_band();
    let confidence = rng.gen_range(band.min..=band.max);

    let result = match kind {
        AttributeKind::Body => {
            let label = body_label(stats.as_ref(), gender, rng);
            AttributeResult::fallback(kind, label, confidence)
        }
        AttributeKind::Face => {
            let label = pick(FACE_PRIOR, kind.default_label(), rng);
            AttributeResult::fallback(kind, label, confidence)
        }
        AttributeKind::Skin => {
            let label = match &stats {
                Some(s) => skin_label_from_luma(luma_of(s.center_rgb)),
                None => pick(SKIN_PRIOR, kind.default_label(), rng),
            };
            let undertone = match &stats {
                Some(s) => undertone_from_rgb(s.center_rgb),
                None => pick(UNDERTONE_PRIOR, Undertone::Neutral, rng),
            };
            let rgb = swatch(label, undertone, rng);
            AttributeResult::fallback(kind, label, confidence).with_details(AttributeDetails {
                undertone: Some(undertone),
                rgb: Some(rgb),
            })
        }
    };

    tracing::debug!(
        %kind,
        label = %result.label,
        confidence = result.confidence,
        from_image = stats.is_some(),
        "fallback estimate"
    );
    result
}

fn body_label<R: Rng + ?Sized>(stats: Option<&FrameStats>, gender: Gender, rng: &mut R) -> &'static str {
    let prior = match gender {
        Gender::Female => BODY_PRIOR_FEMALE,
        Gender::Male => BODY_PRIOR_MALE,
    };
    let tall = stats.is_some_and(|s| s.aspect_ratio > TALL_ASPECT_RATIO);
    if !tall {
        return pick(prior, AttributeKind::Body.default_label(), rng);
    }

    let boosted: Vec<(&'static str, f32)> = prior
        .iter()
        .map(|&(label, w)| {
            if label == "rectangle" {
                (label, w * TALL_RECTANGLE_BOOST)
            } else {
                (label, w)
            }
        })
        .collect();
    pick(&boosted, AttributeKind::Body.default_label(), rng)
}

fn luma_of(rgb: [f32; 3]) -> f32 {
    luma(
        rgb[0].clamp(0.0, 255.0) as u8,
        rgb[1].clamp(0.0, 255.0) as u8,
        rgb[2].clamp(0.0, 255.0) as u8,
    )
}

fn skin_label_from_luma(y: f32) -> &'static str {
    SKIN_LUMA_BUCKETS
        .iter()
        .find(|(floor, _)| y >= *floor)
        .map(|&(_, label)| label)
        .unwrap_or("deep")
}

fn undertone_from_rgb(rgb: [f32; 3]) -> Undertone {
    let rb = rgb[0] - rgb[2];
    if rb > UNDERTONE_WARM_RB {
        Undertone::Warm
    } else if rb < UNDERTONE_COOL_RB {
        Undertone::Cool
    } else {
        Undertone::Neutral
    }
}

fn swatch<R: Rng + ?Sized>(label: &str, undertone: Undertone, rng: &mut R) -> Rgb {
    let ranges = swatch_range(label);
    let shift = undertone_shift(undertone);
    let mut channel = |i: usize| {
        let (lo, hi) = ranges[i];
        (rng.gen_range(lo..=hi) as i16 + shift[i]).clamp(0, 255) as u8
    };
    Rgb {
        r: channel(0),
        g: channel(1),
        b: channel(2),
    }
}

/// Weighted choice. Returns `default` when no weight is positive.
fn pick<T: Copy, R: Rng + ?Sized>(prior: &[(T, f32)], default: T, rng: &mut R) -> T {
    let total: f32 = prior.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 {
        return default;
    }
    let mut roll = rng.gen::<f32>() * total;
    let mut last = default;
    for &(item, w) in prior {
        let w = w.max(0.0);
        if w == 0.0 {
            continue;
        }
        if roll < w {
            return item;
        }
        roll -= w;
        last = item;
    }
    // Rounding can leave `roll` a hair above the last bucket.
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn solid(w: u32, h: u32, rgb: [u8; 3]) -> ImageFrame {
        let data = rgb.iter().copied().cycle().take((w * h * 3) as usize).collect();
        ImageFrame::new(data, w, h)
    }

    #[test]
    fn test_fallback_always_in_vocabulary_and_band() {
        let mut rng = StdRng::seed_from_u64(7);
        let img = solid(8, 8, [200, 170, 150]);
        for kind in AttributeKind::ALL {
            for gender in [Gender::Female, Gender::Male] {
                for image in [None, Some(&img)] {
                    for _ in 0..200 {
                        let r = fallback(kind, image, gender, &mut rng);
                        assert!(r.using_fallback);
                        assert_eq!(r.kind, kind);
                        assert!(kind.is_label(&r.label), "{kind}: {} not in vocabulary", r.label);
                        assert!(kind.fallback_band().contains(r.confidence));
                    }
                }
            }
        }
    }

    #[test]
    fn test_fallback_seeded_is_reproducible() {
        let a = fallback(AttributeKind::Face, None, Gender::Female, &mut StdRng::seed_from_u64(42));
        let b = fallback(AttributeKind::Face, None, Gender::Female, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_male_body_prior_uses_male_shapes() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let r = fallback(AttributeKind::Body, None, Gender::Male, &mut rng);
            assert!(BODY_PRIOR_MALE.iter().any(|(l, _)| *l == r.label));
        }
    }

    #[test]
    fn test_skin_label_follows_center_luma() {
        let mut rng = StdRng::seed_from_u64(3);
        let light = solid(9, 9, [250, 245, 240]);
        let dark = solid(9, 9, [60, 45, 40]);
        assert_eq!(fallback(AttributeKind::Skin, Some(&light), Gender::Female, &mut rng).label, "very-fair");
        assert_eq!(fallback(AttributeKind::Skin, Some(&dark), Gender::Female, &mut rng).label, "deep");
    }

    #[test]
    fn test_skin_details_present() {
        let mut rng = StdRng::seed_from_u64(9);
        let warm = solid(6, 6, [200, 160, 120]);
        let r = fallback(AttributeKind::Skin, Some(&warm), Gender::Female, &mut rng);
        let details = r.details.unwrap();
        assert_eq!(details.undertone, Some(Undertone::Warm));
        assert!(details.rgb.is_some());
    }

    #[test]
    fn test_invalid_image_treated_as_absent() {
        let mut rng = StdRng::seed_from_u64(5);
        let broken = ImageFrame::new(vec![1, 2, 3], 10, 10);
        let r = fallback(AttributeKind::Skin, Some(&broken), Gender::Female, &mut rng);
        assert!(AttributeKind::Skin.is_label(&r.label));
    }

    #[test]
    fn test_tall_frame_boosts_rectangle() {
        let mut rng = StdRng::seed_from_u64(11);
        let tall = solid(10, 30, [128, 128, 128]);
        let n = 2000;
        let rect = (0..n)
            .filter(|_| fallback(AttributeKind::Body, Some(&tall), Gender::Female, &mut rng).label == "rectangle")
            .count();
        // Prior share is 0.25; boosted share is 0.375 / 1.125 ≈ 0.33.
        assert!(rect as f32 / n as f32 > 0.28, "rectangle share {rect}/{n}");
    }

    #[test]
    fn test_pick_zero_weights_returns_default() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(pick(&[("a", 0.0), ("b", 0.0)], "z", &mut rng), "z");
    }

    #[test]
    fn test_undertone_thresholds() {
        assert_eq!(undertone_from_rgb([200.0, 150.0, 190.0]), Undertone::Cool);
        assert_eq!(undertone_from_rgb([200.0, 150.0, 165.0]), Undertone::Neutral);
        assert_eq!(undertone_from_rgb([200.0, 150.0, 100.0]), Undertone::Warm);
    }
}
