//! Nearest reference-tone lookup for detected frequencies

/// Reference tones the tuner view recognizes, paired with note names.
const REFERENCE_TONES: [(f32, &str); 6] = [
    (110.0, "A2"),
    (116.54, "A#2"),
    (220.0, "A3"),
    (233.08, "A#3"),
    (440.0, "A4"),
    (466.16, "A#4"),
];

/// Match window around each reference tone, in Hz.
const TOLERANCE_HZ: f32 = 3.0;

/// Name of the reference tone within tolerance of `frequency_hz`, if any.
pub fn note_for_frequency(frequency_hz: f32) -> Option<&'static str> {
    REFERENCE_TONES
        .iter()
        .find(|(tone, _)| (tone - frequency_hz).abs() <= TOLERANCE_HZ)
        .map(|&(_, name)| name)
}
