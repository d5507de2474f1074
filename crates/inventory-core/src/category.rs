//! Item categories and their UID prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of an inventory item. Drives the UID prefix.
///
/// Serialized as its human label (`"Networking Device"`). Deserializing an
/// unrecognised label yields [`Category::Other`] rather than an error, so the
/// item still gets an `OTH` UID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// Laptops (`LAP`).
    Laptop,
    /// Monitors (`MON`).
    Monitor,
    /// Printers (`PRN`).
    Printer,
    /// Servers (`SRV`).
    Server,
    /// Switches, routers, access points (`NET`).
    NetworkingDevice,
    /// Desktop PCs (`DESK`).
    DesktopPc,
    /// Non-physical software licenses (`SWL`).
    SoftwareLicense,
    /// Anything else (`OTH`).
    #[default]
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 8] = [
        Self::Laptop,
        Self::Monitor,
        Self::Printer,
        Self::Server,
        Self::NetworkingDevice,
        Self::DesktopPc,
        Self::SoftwareLicense,
        Self::Other,
    ];

    /// The fixed UID prefix for this category.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Laptop => "LAP",
            Self::Monitor => "MON",
            Self::Printer => "PRN",
            Self::Server => "SRV",
            Self::NetworkingDevice => "NET",
            Self::DesktopPc => "DESK",
            Self::SoftwareLicense => "SWL",
            Self::Other => "OTH",
        }
    }

    /// The human label for this category.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Laptop => "Laptop",
            Self::Monitor => "Monitor",
            Self::Printer => "Printer",
            Self::Server => "Server",
            Self::NetworkingDevice => "Networking Device",
            Self::DesktopPc => "Desktop PC",
            Self::SoftwareLicense => "Software License",
            Self::Other => "Other",
        }
    }

    /// Look up a category by its label, case-insensitively.
    ///
    /// Returns `None` for unknown labels; callers that want the `OTH`
    /// fallback use [`Category::from_label_or_other`].
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
    }

    /// Look up a category by label, defaulting to [`Category::Other`].
    #[must_use]
    pub fn from_label_or_other(label: &str) -> Self {
        Self::from_label(label).unwrap_or(Self::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::from_label_or_other(&value)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_match_lookup_table() {
        assert_eq!(Category::Laptop.prefix(), "LAP");
        assert_eq!(Category::NetworkingDevice.prefix(), "NET");
        assert_eq!(Category::DesktopPc.prefix(), "DESK");
        assert_eq!(Category::Other.prefix(), "OTH");
    }

    #[test]
    fn label_lookup_is_case_insensitive() {
        assert_eq!(Category::from_label("desktop pc"), Some(Category::DesktopPc));
        assert_eq!(Category::from_label(" Laptop "), Some(Category::Laptop));
    }

    #[test]
    fn unknown_label_defaults_to_other() {
        assert_eq!(Category::from_label("Toaster"), None);
        assert_eq!(Category::from_label_or_other("Toaster"), Category::Other);
        assert_eq!(Category::from_label_or_other("Toaster").prefix(), "OTH");
    }

    #[test]
    fn serde_uses_labels() {
        let json = serde_json::to_string(&Category::SoftwareLicense).unwrap();
        assert_eq!(json, "\"Software License\"");

        let parsed: Category = serde_json::from_str("\"Printer\"").unwrap();
        assert_eq!(parsed, Category::Printer);

        let unknown: Category = serde_json::from_str("\"Projector\"").unwrap();
        assert_eq!(unknown, Category::Other);
    }
}
