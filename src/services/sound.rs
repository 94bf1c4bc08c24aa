//! Alert sound selection

/// Sound played on completion, chosen by preference index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSound {
    Silent,
    Default,
    Second,
    Third,
}

impl AlertSound {
    /// `-1` is silence, `0..=2` pick a sound, anything else falls back to
    /// the default sound
    pub fn from_index(index: i32) -> Self {
        match index {
            -1 => AlertSound::Silent,
            0 => AlertSound::Default,
            1 => AlertSound::Second,
            2 => AlertSound::Third,
            _ => AlertSound::Default,
        }
    }

    /// Sound theme name, `None` when silent
    pub fn sound_name(&self) -> Option<&'static str> {
        match self {
            AlertSound::Silent => None,
            AlertSound::Default => Some("alert-sound"),
            AlertSound::Second => Some("alert-sound-2"),
            AlertSound::Third => Some("alert-sound-3"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_names() {
        assert_eq!(AlertSound::from_index(-1).sound_name(), None);
        assert_eq!(AlertSound::from_index(0).sound_name(), Some("alert-sound"));
        assert_eq!(AlertSound::from_index(1).sound_name(), Some("alert-sound-2"));
        assert_eq!(AlertSound::from_index(2).sound_name(), Some("alert-sound-3"));
        assert_eq!(AlertSound::from_index(99).sound_name(), Some("alert-sound"));
    }
}
