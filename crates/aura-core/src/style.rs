//! Styling tips keyed by attribute label, plus MBTI style blurbs.

use crate::types::AttributeKind;

const PERSONALITY_STYLES: &[(&str, &str)] = &[
    ("ISTJ", "Classic, traditional pieces in quality fabrics with timeless cuts."),
    ("ISFJ", "Comfortable, practical clothing in soft fabrics and quiet patterns."),
    ("INFJ", "Minimal silhouettes lifted by one artistic detail or unusual accessory."),
    ("INTJ", "Sleek, sophisticated looks with clean lines and little ornament."),
    ("ISTP", "Durable, functional clothes with a relaxed edge and useful pockets."),
    ("ISFP", "Bohemian layers, tactile textures and experimental combinations."),
    ("INFP", "Soft, romantic layers and pieces that carry personal meaning."),
    ("INTP", "Comfortable, unconventional clothing with a nod to your interests."),
    ("ESTP", "Bold, on-trend statement pieces worn with confidence."),
    ("ESFP", "Vibrant colour, playful prints and attention-grabbing accessories."),
    ("ENFP", "Eclectic outfits mixing patterns and expressive details."),
    ("ENTP", "Smart-casual with an unexpected twist that starts conversations."),
    ("ESTJ", "Structured, coordinated outfits with careful attention to detail."),
    ("ESFJ", "Polished, put-together looks that follow current trends."),
    ("ENFJ", "Warm, approachable styles in harmonious colours with elegant touches."),
    ("ENTJ", "Sharp tailoring and power dressing."),
];

const GENERIC_ADVICE: &str = "Explore styles that express your individuality while enhancing \
your natural features; a personal stylist can tailor this further.";

/// MBTI style blurb, case-insensitive. `None` for unknown codes.
pub fn personality_style(code: &str) -> Option<&'static str> {
    let code = code.trim().to_ascii_uppercase();
    PERSONALITY_STYLES
        .iter()
        .find(|(k, _)| *k == code)
        .map(|&(_, style)| style)
}

/// Advice line used when nothing about the user is known.
pub fn generic_advice() -> &'static str {
    GENERIC_ADVICE
}

/// Styling tip for one attribute label. Unknown labels get a kind-level tip.
pub fn attribute_advice(kind: AttributeKind, label: &str) -> &'static str {
    match (kind, label) {
        (AttributeKind::Body, "hourglass") => {
            "Fitted styles highlight your balanced proportions; wrap dresses and belted jackets work especially well."
        }
        (AttributeKind::Body, "rectangle") => {
            "Create shape with peplum tops, layering and statement belts that define the waist."
        }
        (AttributeKind::Body, "pear") => {
            "Balance wider hips with structured shoulders, boat necklines and A-line skirts."
        }
        (AttributeKind::Body, "apple") => {
            "Empire waists, V-necks and fluid fabrics draw the eye up and lengthen the torso."
        }
        (AttributeKind::Body, "inverted-triangle") => {
            "Balance broader shoulders with full skirts, wide-leg trousers and detail at the hip."
        }
        (AttributeKind::Body, "trapezoid") => {
            "Most cuts suit you; slim-fit shirts and straight trousers keep the natural taper."
        }
        (AttributeKind::Body, "triangle") => {
            "Structured jackets and horizontal detail on top balance a wider lower half."
        }
        (AttributeKind::Body, "oval") => {
            "Vertical lines, single-breasted jackets and mid-weight fabrics lengthen the silhouette."
        }
        (AttributeKind::Body, _) => "Choose styles that enhance your unique body shape.",
        (AttributeKind::Face, "oval") => {
            "You can wear most necklines and frames; experiment freely with accessories."
        }
        (AttributeKind::Face, "round") => {
            "Add length with V-necks, long earrings and angular frames."
        }
        (AttributeKind::Face, "square") => {
            "Soften strong angles with round necklines, curved frames and hoops."
        }
        (AttributeKind::Face, "heart") => {
            "Balance a wider forehead with chokers, wider necklines and bottom-heavy frames."
        }
        (AttributeKind::Face, "diamond") => {
            "Show off your cheekbones with statement earrings; avoid oversized eyewear."
        }
        (AttributeKind::Face, "rectangle") => {
            "Round necklines and curved accessories soften a longer jawline."
        }
        (AttributeKind::Face, "triangle") => {
            "Draw attention upward with detailed collars, top-heavy frames and hats."
        }
        (AttributeKind::Face, _) => "Pick necklines and accessories that complement your face shape.",
        (AttributeKind::Skin, "very-fair" | "fair") => {
            "Jewel tones such as emerald, sapphire and ruby give striking contrast; soft pastels also flatter."
        }
        (AttributeKind::Skin, "medium") => {
            "Both warm and cool colours work; olive green, teal and coral pink are especially flattering."
        }
        (AttributeKind::Skin, "olive") => {
            "Earthy terracotta, mustard and olive suit you, as do vibrant jewel tones."
        }
        (AttributeKind::Skin, _) => {
            "Bright, saturated colours and rich jewel tones stand out; white and cream give beautiful contrast."
        }
    }
}
