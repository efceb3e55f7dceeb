use serde::{Deserialize, Serialize};

/// Synthesis algorithm for an ambient sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SoundType {
    WhiteNoise,
    BrownNoise,
    Rain,
}

impl SoundType {
    pub fn as_str(self) -> &'static str {
        match self {
            SoundType::WhiteNoise => "white-noise",
            SoundType::BrownNoise => "brown-noise",
            SoundType::Rain => "rain",
        }
    }
}

/// One entry of the static catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmbientSound {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub sound_type: SoundType,
    /// Nominal base frequency in Hz.
    pub frequency: f32,
}

static CATALOG: [AmbientSound; 4] = [
    AmbientSound {
        id: "warm-static",
        name: "Warm Static",
        icon: "radio",
        description: "Soft, warm brown noise",
        sound_type: SoundType::BrownNoise,
        frequency: 200.0,
    },
    AmbientSound {
        id: "light-rain",
        name: "Light Rain",
        icon: "cloud-rain",
        description: "Gentle rain with slowly shifting intensity",
        sound_type: SoundType::Rain,
        frequency: 400.0,
    },
    AmbientSound {
        id: "deep-focus",
        name: "Deep Focus",
        icon: "brain",
        description: "Low rumble for long concentration",
        sound_type: SoundType::BrownNoise,
        frequency: 100.0,
    },
    AmbientSound {
        id: "soft-wind",
        name: "Soft Wind",
        icon: "wind",
        description: "Quiet white noise that masks distractions",
        sound_type: SoundType::WhiteNoise,
        frequency: 800.0,
    },
];

/// The fixed ambient sound catalog.
pub fn catalog() -> &'static [AmbientSound] {
    &CATALOG
}

pub fn find(id: &str) -> Option<&'static AmbientSound> {
    CATALOG.iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_has_four_unique_entries() {
        let ids: HashSet<_> = catalog().iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn every_algorithm_is_used() {
        let types: HashSet<_> = catalog().iter().map(|s| s.sound_type).collect();
        assert!(types.contains(&SoundType::WhiteNoise));
        assert!(types.contains(&SoundType::BrownNoise));
        assert!(types.contains(&SoundType::Rain));
    }

    #[test]
    fn find_by_id() {
        assert_eq!(find("light-rain").map(|s| s.name), Some("Light Rain"));
        assert!(find("thunder").is_none());
    }
}
