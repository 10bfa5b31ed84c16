use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Node type name the image view is registered under.
pub const IMAGE_NODE_TYPE: &str = "image";

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImageAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Attributes persisted on an image node.
///
/// Serialized shape: `{ src, alt, title, align, width }` where `width` is a
/// positive pixel count or `null` for the intrinsic size.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageAttributes {
    pub src: String,
    pub alt: String,
    pub title: String,
    pub align: ImageAlign,
    pub width: Option<u32>,
}

/// A document node as handed over by the host editor.
///
/// `attrs` is kept as an untyped bag; `editor::attrs::normalize_image_attrs`
/// is the only place that interprets it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NodeData {
    pub type_name: String,
    #[serde(default)]
    pub attrs: serde_json::Value,
}

impl NodeData {
    pub fn new(type_name: impl Into<String>, attrs: serde_json::Value) -> Self {
        Self {
            type_name: type_name.into(),
            attrs,
        }
    }

    pub fn image(attrs: serde_json::Value) -> Self {
        Self::new(IMAGE_NODE_TYPE, attrs)
    }

    pub fn is_image(&self) -> bool {
        self.type_name == IMAGE_NODE_TYPE
    }
}

/// Partial attribute update committed at the end of a resize gesture.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WidthPatch {
    pub width: u32,
}
