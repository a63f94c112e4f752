use crate::manifest::{Field, ManifestDocument};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconSize {
    Any,
    Fixed { width: u32, height: u32 },
}

impl IconSize {
    pub fn parse(token: &str) -> Option<Self> {
        let t = token.trim();
        if t.eq_ignore_ascii_case("any") {
            return Some(IconSize::Any);
        }
        let (w, h) = t.split_once(['x', 'X'])?;
        let width = w.parse::<u32>().ok()?;
        let height = h.parse::<u32>().ok()?;
        if width == 0 || height == 0 {
            return None;
        }
        Some(IconSize::Fixed { width, height })
    }

    /// `Any` (scalable) satisfies every minimum.
    pub fn at_least(&self, min: u32) -> bool {
        match self {
            IconSize::Any => true,
            IconSize::Fixed { width, height } => *width >= min && *height >= min,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: Vec<IconSize>,
    pub purposes: Vec<String>,
}

impl ManifestIcon {
    fn from_value(v: &Value) -> Option<Self> {
        let obj = v.as_object()?;
        let src = obj.get("src")?.as_str()?.trim();
        if src.is_empty() {
            return None;
        }
        let sizes = obj
            .get("sizes")
            .and_then(|s| s.as_str())
            .map(|s| s.split_whitespace().filter_map(IconSize::parse).collect())
            .unwrap_or_default();
        // Absent purpose means "any" per the manifest format.
        let purposes = obj
            .get("purpose")
            .and_then(|p| p.as_str())
            .map(|p| {
                p.split_whitespace()
                    .map(|x| x.to_ascii_lowercase())
                    .collect::<Vec<_>>()
            })
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| vec!["any".to_string()]);
        Some(Self {
            src: src.to_string(),
            sizes,
            purposes,
        })
    }

    pub fn has_purpose(&self, purpose: &str) -> bool {
        self.purposes.iter().any(|p| p.eq_ignore_ascii_case(purpose))
    }

    pub fn at_least(&self, min: u32) -> bool {
        self.sizes.iter().any(|s| s.at_least(min))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconSet {
    pub icons: Vec<ManifestIcon>,
    pub malformed_entries: usize,
}

/// Reads `icons` leniently: unusable entries are counted, never fatal.
pub fn read_icons(manifest: &ManifestDocument) -> Field<IconSet> {
    let items = match manifest.array("icons") {
        Field::Present(items) => items,
        Field::Absent => return Field::Absent,
        Field::Malformed { expected, found } => return Field::Malformed { expected, found },
    };
    let mut set = IconSet::default();
    for item in items {
        match ManifestIcon::from_value(item) {
            Some(icon) => set.icons.push(icon),
            None => set.malformed_entries += 1,
        }
    }
    Field::Present(set)
}
