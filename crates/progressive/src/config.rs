//! Engine configuration.

/// How the fallback scan decides an element was already handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DedupPolicy {
    /// Skip elements whose callback already ran for this rule.
    #[default]
    ElementIdentity,
    /// Compare the rule's passive firing count with the number of current
    /// matches; if the count is lower, invoke for every match. Approximate:
    /// can both miss and repeat elements once the matched set changes.
    InvocationCount,
}

/// Knobs for the generated trigger rules and the fallback scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnhanceConfig {
    /// Animation duration in the generated style rule. Must be non-zero or
    /// engines skip the animation entirely.
    pub duration: String,
    /// Property animated by the keyframes; chosen to have no visible effect.
    pub inert_property: String,
    pub inert_from: String,
    pub inert_to: String,
    pub dedup: DedupPolicy,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            duration: "0.001s".to_string(),
            inert_property: "opacity".to_string(),
            inert_from: "0.99".to_string(),
            inert_to: "1".to_string(),
            dedup: DedupPolicy::default(),
        }
    }
}

impl EnhanceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    pub fn with_inert_keyframes(
        mut self,
        property: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.inert_property = property.into();
        self.inert_from = from.into();
        self.inert_to = to.into();
        self
    }

    pub fn with_dedup(mut self, dedup: DedupPolicy) -> Self {
        self.dedup = dedup;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_trigger() {
        let config = EnhanceConfig::default();
        assert_eq!(config.duration, "0.001s");
        assert_eq!(
            (config.inert_property.as_str(), config.inert_from.as_str(), config.inert_to.as_str()),
            ("opacity", "0.99", "1")
        );
        assert_eq!(config.dedup, DedupPolicy::ElementIdentity);
    }

    #[test]
    fn setters_chain() {
        let config = EnhanceConfig::new()
            .with_duration("1ms")
            .with_inert_keyframes("outline-color", "#000", "#001")
            .with_dedup(DedupPolicy::InvocationCount);
        assert_eq!(config.duration, "1ms");
        assert_eq!(config.inert_property, "outline-color");
        assert_eq!(config.dedup, DedupPolicy::InvocationCount);
    }
}
