//! Input context keys populated by bootstrap

/// Subject (patient) identifier
pub const SUBJECT_ID: &str = "subject_id";
/// Reference to the recorded consultation audio
pub const AUDIO_REF: &str = "audio_ref";
/// Reference to the medical image
pub const IMAGE_REF: &str = "image_ref";
/// Free-text clinical notes
pub const CLINICAL_NOTES: &str = "clinical_notes";

/// Every input key, in the order bootstrap writes them.
pub const INPUT_KEYS: [&str; 4] = [SUBJECT_ID, AUDIO_REF, IMAGE_REF, CLINICAL_NOTES];

/// Returns `true` if `key` is one of the fixed input keys.
pub fn is_input_key(key: &str) -> bool {
    INPUT_KEYS.contains(&key)
}
