use serde::{Deserialize, Serialize};

/// A single trait/value pair attached to an asset or collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// The trait being described (e.g. "background", "rarity")
    pub trait_type: String,

    /// The value of the trait
    pub value: String,
}

impl Attribute {
    pub fn new(trait_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            trait_type: trait_type.into(),
            value: value.into(),
        }
    }
}

/// Display metadata carried by an asset
///
/// The same shape is used for the replacement payload embedded in an update
/// ticket and for the snapshot stored on a claimed asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    /// Human-readable asset name
    pub name: String,

    /// Longer description for display
    pub description: String,

    /// Image reference (URL or content id)
    pub image: String,

    /// Attribute list
    pub attributes: Vec<Attribute>,
}

impl AssetMetadata {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
        attributes: Vec<Attribute>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image: image.into(),
            attributes,
        }
    }
}
