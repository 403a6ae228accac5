//! Resource identifiers and the capability set shared by persisted assets.
//!
//! All resources share one 64-bit identifier space. The identifier divided by
//! [`CATEGORY_DIVISOR`] is the category prefix, which is how animation clips
//! and state machines are told apart from meshes, textures and materials.

use std::fmt;

use bytes::Bytes;

use crate::error::Result;

/// Divisor that turns an identifier into its category prefix
pub const CATEGORY_DIVISOR: u64 = 1_000_000_000_000_000_000;

/// Opaque 64-bit resource identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceId(pub u64);

impl ResourceId {
    /// Build an identifier inside a category. Returns `None` when `local`
    /// does not fit below the divisor.
    pub fn new(category: ResourceCategory, local: u64) -> Option<Self> {
        if local >= CATEGORY_DIVISOR {
            return None;
        }
        category
            .prefix()
            .checked_mul(CATEGORY_DIVISOR)
            .and_then(|base| base.checked_add(local))
            .map(Self)
    }

    /// High-order category prefix
    pub fn prefix(self) -> u64 {
        self.0 / CATEGORY_DIVISOR
    }

    pub fn category(self) -> ResourceCategory {
        ResourceCategory::from_prefix(self.prefix())
    }

    /// Identifier with the category prefix stripped
    pub fn local(self) -> u64 {
        self.0 % CATEGORY_DIVISOR
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ResourceId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceCategory {
    Mesh,
    Texture,
    Material,
    Animation,
    StateMachine,
    Unknown(u64),
}

impl ResourceCategory {
    pub fn from_prefix(prefix: u64) -> Self {
        match prefix {
            1 => Self::Mesh,
            2 => Self::Texture,
            3 => Self::Material,
            4 => Self::Animation,
            5 => Self::StateMachine,
            other => Self::Unknown(other),
        }
    }

    pub fn prefix(self) -> u64 {
        match self {
            Self::Mesh => 1,
            Self::Texture => 2,
            Self::Material => 3,
            Self::Animation => 4,
            Self::StateMachine => 5,
            Self::Unknown(prefix) => prefix,
        }
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mesh => write!(f, "mesh"),
            Self::Texture => write!(f, "texture"),
            Self::Material => write!(f, "material"),
            Self::Animation => write!(f, "animation"),
            Self::StateMachine => write!(f, "state machine"),
            Self::Unknown(prefix) => write!(f, "unknown ({prefix})"),
        }
    }
}

/// Load/save capability shared by the persisted animation assets
pub trait Resource: Sized {
    const CATEGORY: ResourceCategory;

    fn uid(&self) -> ResourceId;

    fn name(&self) -> &str;

    fn encode(&self) -> Result<Bytes>;

    /// The identifier and display name are not part of the payload; the
    /// loader supplies them.
    fn decode(uid: ResourceId, name: &str, data: &[u8]) -> Result<Self>;
}
