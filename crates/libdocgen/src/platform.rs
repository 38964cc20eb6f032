//! Sets of target platforms.

use bitflags::bitflags;

bitflags! {
    /// A set of platforms an API is available on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PlatformSet: u8 {
        /// Android.
        const ANDROID = 1 << 0;
        /// BlackBerry (add-on).
        const BLACKBERRY = 1 << 1;
        /// iPhone.
        const IPHONE = 1 << 2;
        /// iPad.
        const IPAD = 1 << 3;
        /// Windows Phone (add-on).
        const WINDOWSPHONE = 1 << 4;
        /// macOS.
        const MACOS = 1 << 5;
    }
}

impl Default for PlatformSet {
    /// The core platforms an API targets when it lists none.
    fn default() -> Self {
        Self::ANDROID | Self::IPHONE | Self::IPAD | Self::MACOS
    }
}

impl PlatformSet {
    /// Flag for a single platform name.
    pub fn platform(name: &str) -> Option<Self> {
        Some(match name {
            "android" => Self::ANDROID,
            "blackberry" => Self::BLACKBERRY,
            "iphone" => Self::IPHONE,
            "ipad" => Self::IPAD,
            "windowsphone" => Self::WINDOWSPHONE,
            "macos" => Self::MACOS,
            _ => return None,
        })
    }

    /// Builds a set from platform names. Unknown names are skipped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|n| Self::platform(n.as_ref()))
            .fold(Self::empty(), |acc, p| acc | p)
    }

    /// Platform names in canonical order.
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names()
            .map(|(name, _)| match name {
                "ANDROID" => "android",
                "BLACKBERRY" => "blackberry",
                "IPHONE" => "iphone",
                "IPAD" => "ipad",
                "WINDOWSPHONE" => "windowsphone",
                _ => "macos",
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn names_roundtrip() {
        let set = PlatformSet::from_names(["ipad", "android", "bogus"]);
        assert_eq!(set, PlatformSet::ANDROID | PlatformSet::IPAD);
        assert_eq!(set.names(), vec!["android", "ipad"]);
    }

    #[test]
    fn single_platform_by_doc_name() {
        assert_eq!(PlatformSet::platform("iphone"), Some(PlatformSet::IPHONE));
        assert_eq!(PlatformSet::platform("IPHONE"), None);
        assert_eq!(PlatformSet::platform("windows"), None);
    }

    #[test]
    fn default_is_core_platforms() {
        let set = PlatformSet::default();
        assert!(set.contains(PlatformSet::MACOS));
        assert!(!set.contains(PlatformSet::BLACKBERRY));
    }
}
