//! Capability detection: does the host fire an animation-start event we can
//! use as an insertion signal, and under which vendor prefix?

use std::fmt;

use crate::host::StyleSurface;

/// Vendor spelling of the CSS Animations properties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum VendorPrefix {
    /// Unprefixed.
    #[default]
    None,
    Webkit,
    Moz,
    O,
    Ms,
    Khtml,
}

impl VendorPrefix {
    /// Probe order after the unprefixed property.
    pub const PREFIXED: [VendorPrefix; 5] = [
        VendorPrefix::Webkit,
        VendorPrefix::Moz,
        VendorPrefix::O,
        VendorPrefix::Ms,
        VendorPrefix::Khtml,
    ];

    /// Prefix for CSS property names and `@keyframes`.
    pub fn css(self) -> &'static str {
        match self {
            VendorPrefix::None => "",
            VendorPrefix::Webkit => "-webkit-",
            VendorPrefix::Moz => "-moz-",
            VendorPrefix::O => "-o-",
            VendorPrefix::Ms => "-ms-",
            VendorPrefix::Khtml => "-khtml-",
        }
    }

    /// The style declaration member that reveals support for this spelling.
    pub fn style_member(self) -> &'static str {
        match self {
            VendorPrefix::None => "animationName",
            VendorPrefix::Webkit => "WebkitAnimationName",
            VendorPrefix::Moz => "MozAnimationName",
            VendorPrefix::O => "OAnimationName",
            VendorPrefix::Ms => "msAnimationName",
            VendorPrefix::Khtml => "KhtmlAnimationName",
        }
    }
}

impl fmt::Display for VendorPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VendorPrefix::None => f.write_str("(none)"),
            other => f.write_str(other.css()),
        }
    }
}

/// Result of probing the host. Computed once and passed to the engine;
/// immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Capability {
    supported: bool,
    prefix: VendorPrefix,
}

impl Capability {
    pub const UNSUPPORTED: Capability = Capability {
        supported: false,
        prefix: VendorPrefix::None,
    };

    pub fn supported(prefix: VendorPrefix) -> Self {
        Self {
            supported: true,
            prefix,
        }
    }

    pub fn unsupported() -> Self {
        Self::UNSUPPORTED
    }

    /// Probe the unprefixed member first, then each vendor spelling in
    /// order. The first one present wins.
    pub fn detect<S: StyleSurface + ?Sized>(surface: &S) -> Self {
        let detected = std::iter::once(VendorPrefix::None)
            .chain(VendorPrefix::PREFIXED)
            .find(|prefix| surface.has_style_property(prefix.style_member()))
            .map_or(Self::UNSUPPORTED, Self::supported);
        tracing::debug!(
            supported = detected.supported,
            prefix = %detected.prefix,
            "probed animation support"
        );
        detected
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn prefix(&self) -> VendorPrefix {
        self.prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Members(&'static [&'static str]);

    impl StyleSurface for Members {
        fn has_style_property(&self, name: &str) -> bool {
            self.0.contains(&name)
        }
    }

    #[test]
    fn unprefixed_wins_over_vendor_spellings() {
        let cap = Capability::detect(&Members(&["WebkitAnimationName", "animationName"]));
        assert_eq!(cap, Capability::supported(VendorPrefix::None));
        assert_eq!(cap.prefix().css(), "");
    }

    #[test]
    fn vendor_spellings_probe_in_order() {
        let cap = Capability::detect(&Members(&["msAnimationName", "MozAnimationName"]));
        assert!(cap.is_supported());
        assert_eq!(cap.prefix(), VendorPrefix::Moz);

        let cap = Capability::detect(&Members(&["KhtmlAnimationName"]));
        assert_eq!(cap.prefix().css(), "-khtml-");
    }

    #[test]
    fn nothing_exposed_is_unsupported() {
        let cap = Capability::detect(&Members(&["opacity", "color"]));
        assert!(!cap.is_supported());
        assert_eq!(cap, Capability::UNSUPPORTED);
    }

    #[test]
    fn every_prefix_has_a_distinct_member() {
        let mut members: Vec<&str> = VendorPrefix::PREFIXED.iter().map(|p| p.style_member()).collect();
        members.push(VendorPrefix::None.style_member());
        members.sort_unstable();
        members.dedup();
        assert_eq!(members.len(), 6);
    }
}
