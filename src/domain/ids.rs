use std::fmt;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(MonsterId);
id_newtype!(RuneId);
id_newtype!(ArtifactId);
id_newtype!(TeamIndex);

/// Rune slot, one of the six physical slots on a monster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Slot(u8);

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot(1),
        Slot(2),
        Slot(3),
        Slot(4),
        Slot(5),
        Slot(6),
    ];

    pub fn new(n: u8) -> Option<Self> {
        (1..=6).contains(&n).then_some(Slot(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Slots 2, 4, 6 accept only a restricted mainstat family.
    pub fn is_even(self) -> bool {
        self.0 % 2 == 0
    }
}

impl TryFrom<u8> for Slot {
    type Error = String;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Slot::new(value).ok_or_else(|| format!("invalid rune slot {value}"))
    }
}

impl From<Slot> for u8 {
    fn from(value: Slot) -> Self {
        value.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Artifact slot family: attribute artifacts vs type artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum ArtifactKind {
    Attribute = 1,
    Type = 2,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Attribute, ArtifactKind::Type];
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Attribute => write!(f, "1"),
            ArtifactKind::Type => write!(f, "2"),
        }
    }
}
