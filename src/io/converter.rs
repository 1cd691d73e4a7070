use crate::NoteId;

/// Equal-tempered pitch of a note identity, with note 69 at 440 Hz.
pub fn frequency(note: NoteId) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn octaves_double_around_a4() {
        assert_abs_diff_eq!(frequency(69), 440.0);
        assert_abs_diff_eq!(frequency(81), 880.0, epsilon = 1e-3);
        assert_abs_diff_eq!(frequency(57), 220.0, epsilon = 1e-3);
    }

    #[test]
    fn middle_c() {
        assert_abs_diff_eq!(frequency(60), 261.6256, epsilon = 1e-3);
    }

    #[test]
    fn accepts_identities_outside_the_keyboard() {
        assert!(frequency(-12) > 0.0);
        assert!(frequency(200).is_finite());
    }
}
