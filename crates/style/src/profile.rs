//! Engine profiles: which vendor spelling of CSS Animations a style engine
//! implements.
//!
//! Historical engines shipped animations behind vendor prefixes before the
//! unprefixed names were standardized. A profile fixes the property prefix,
//! the `@keyframes` spelling, the camel-cased `CSSStyleDeclaration` property
//! exposed to scripts, and the name of the animation-start event.

/// Which animation surface the style engine exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum EngineProfile {
    /// Unprefixed CSS Animations (`animation`, `@keyframes`, `animationstart`).
    #[default]
    Standard,
    /// `-webkit-animation`, `webkitAnimationStart`.
    Webkit,
    /// `-moz-animation`; Gecko fired unprefixed event names.
    Moz,
    /// Presto: `-o-animation`, `oanimationstart`.
    Presto,
    /// Trident: `-ms-animation`, `MSAnimationStart`.
    Trident,
    /// No CSS Animations at all.
    Legacy,
}

impl EngineProfile {
    pub const ALL: [EngineProfile; 6] = [
        EngineProfile::Standard,
        EngineProfile::Webkit,
        EngineProfile::Moz,
        EngineProfile::Presto,
        EngineProfile::Trident,
        EngineProfile::Legacy,
    ];

    /// CSS vendor prefix for animation properties and `@keyframes`, or
    /// `None` when animations are unsupported.
    pub fn css_prefix(self) -> Option<&'static str> {
        match self {
            EngineProfile::Standard => Some(""),
            EngineProfile::Webkit => Some("-webkit-"),
            EngineProfile::Moz => Some("-moz-"),
            EngineProfile::Presto => Some("-o-"),
            EngineProfile::Trident => Some("-ms-"),
            EngineProfile::Legacy => None,
        }
    }

    /// The `CSSStyleDeclaration` member naming the animation name property.
    pub fn animation_name_member(self) -> Option<&'static str> {
        match self {
            EngineProfile::Standard => Some("animationName"),
            EngineProfile::Webkit => Some("WebkitAnimationName"),
            EngineProfile::Moz => Some("MozAnimationName"),
            EngineProfile::Presto => Some("OAnimationName"),
            EngineProfile::Trident => Some("msAnimationName"),
            EngineProfile::Legacy => None,
        }
    }

    /// Event type fired when an animation starts on an element.
    pub fn animation_start_event(self) -> Option<&'static str> {
        match self {
            EngineProfile::Standard | EngineProfile::Moz => Some("animationstart"),
            EngineProfile::Webkit => Some("webkitAnimationStart"),
            EngineProfile::Presto => Some("oanimationstart"),
            EngineProfile::Trident => Some("MSAnimationStart"),
            EngineProfile::Legacy => None,
        }
    }

    /// The `@keyframes` at-keyword this engine honors (without `@`).
    pub fn keyframes_keyword(self) -> Option<String> {
        self.css_prefix().map(|p| format!("{p}keyframes"))
    }

    /// Whether a script-visible style declaration exposes `member`.
    pub fn exposes_style_member(self, member: &str) -> bool {
        const COMMON: [&str; 4] = ["color", "display", "opacity", "clip"];
        COMMON.contains(&member) || self.animation_name_member() == Some(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_line_up_with_keyframes_keyword() {
        assert_eq!(EngineProfile::Webkit.keyframes_keyword().as_deref(), Some("-webkit-keyframes"));
        assert_eq!(EngineProfile::Standard.keyframes_keyword().as_deref(), Some("keyframes"));
        assert_eq!(EngineProfile::Legacy.keyframes_keyword(), None);
    }

    #[test]
    fn style_surface_exposes_one_animation_member() {
        for profile in EngineProfile::ALL {
            let exposed: Vec<&str> = [
                "animationName",
                "WebkitAnimationName",
                "MozAnimationName",
                "OAnimationName",
                "msAnimationName",
            ]
            .into_iter()
            .filter(|m| profile.exposes_style_member(m))
            .collect();
            let expected = usize::from(profile != EngineProfile::Legacy);
            assert_eq!(exposed.len(), expected, "{profile:?}");
        }
        assert!(EngineProfile::Legacy.exposes_style_member("opacity"));
    }

    #[test]
    fn gecko_uses_unprefixed_events() {
        assert_eq!(EngineProfile::Moz.animation_start_event(), Some("animationstart"));
        assert_eq!(EngineProfile::Legacy.animation_start_event(), None);
    }
}
