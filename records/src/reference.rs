//! Studios, class types and themes every new journal starts with.

/// `(name, neighborhood, address)`
pub const LOCATIONS: &[(&str, &str, &str)] = &[
    ("Equinox Pine Street", "FiDi", "301 Pine St, San Francisco, CA"),
    ("Equinox Beale Street", "FiDi", "350 Beale St, San Francisco, CA"),
    ("Equinox Van Ness", "Van Ness", "1550 Van Ness Ave, San Francisco, CA"),
    ("Equinox Market Street", "Mid-Market", "747 Market St, San Francisco, CA"),
    ("Equinox Palo Alto", "Palo Alto", "440 Portage Ave, Palo Alto, CA"),
];

/// `(class_name, duration_minutes, is_heated, display_name)`
pub const CLASS_TYPES: &[(&str, u32, bool, &str)] = &[
    ("Vinyasa", 60, true, "Vinyasa 60 (Heated)"),
    ("Vinyasa", 75, true, "Vinyasa 75 (Heated)"),
    ("Vinyasa", 60, false, "Vinyasa 60"),
    ("Vinyasa", 75, false, "Vinyasa 75"),
    ("Yin", 60, false, "Yin 60"),
    ("Yin", 75, false, "Yin 75"),
    ("Restorative", 60, false, "Restorative 60"),
    ("Power", 60, true, "Power 60 (Heated)"),
    ("Slow Flow", 60, false, "Slow Flow 60"),
];

/// `(name, category, notes)`
pub const THEMES: &[(&str, &str, &str)] = &[
    ("Hip Openers", "Physical", "Pigeon, lizard, frog, 90/90"),
    ("Heart Opening", "Physical", "Backbends, chest openers"),
    ("Balance", "Physical", "Standing balances, core stability"),
    ("Twists & Detox", "Physical", "Seated and standing twists"),
    ("Core Strength", "Physical", "Plank variations, boat pose"),
    ("Hamstrings", "Physical", "Forward folds, splits prep"),
    ("Letting Go", "Emotional", "Release what no longer serves"),
    ("Self-Compassion", "Emotional", "Kindness toward self"),
    ("Gratitude", "Emotional", "Appreciation practice"),
    ("Courage", "Emotional", "Facing fears, trying new things"),
    ("Joy", "Emotional", "Playfulness, lightness"),
    ("Presence", "Philosophical", "Being here now"),
    ("Impermanence", "Philosophical", "Everything changes"),
    ("Surrender", "Philosophical", "Accepting what is"),
];
