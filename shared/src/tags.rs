use std::fmt;

/// What a physics body stands for, as far as contact handling is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BodyTag {
    Player,
    Land,
    WaterParticle,
    Wall,
    SeaLevel,
    Building,
    Fragment,
}

impl BodyTag {
    pub const fn as_str(&self) -> &'static str {
        match self {
            BodyTag::Player => "Player",
            BodyTag::Land => "Land",
            BodyTag::WaterParticle => "WaterParticle",
            BodyTag::Wall => "Wall",
            BodyTag::SeaLevel => "SeaLevel",
            BodyTag::Building => "Building",
            BodyTag::Fragment => "Fragment",
        }
    }
}

impl fmt::Display for BodyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
