//! Compiling rules into passive triggers: one style rule and one keyframes
//! rule per registered rule.
//!
//! ```text
//! .note { animation: highlight 0.001s; }
//! @keyframes highlight { from { opacity: 0.99; } to { opacity: 1; } }
//! ```
//!
//! The animation does nothing visible; its only purpose is the
//! animation-start event the engine fires when a matching element is
//! rendered.

use std::hash::Hash;

use crate::capability::VendorPrefix;
use crate::config::EnhanceConfig;
use crate::host::{InstallReport, TriggerSheet};
use crate::registry::Registry;

/// The generated CSS for one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub rule: String,
    pub style_rule: String,
    pub keyframes_rule: String,
}

/// Whether `name` can stand as a CSS `<custom-ident>` without escaping.
pub fn is_animation_ident(name: &str) -> bool {
    let mut chars = name.chars();
    let valid_start = match chars.next() {
        Some('-') => chars
            .clone()
            .next()
            .is_some_and(|c| c == '-' || c == '_' || c.is_ascii_alphabetic() || !c.is_ascii()),
        Some(c) => c == '_' || c.is_ascii_alphabetic() || !c.is_ascii(),
        None => false,
    };
    let reserved = ["none", "initial", "inherit", "unset", "default"]
        .iter()
        .any(|k| name.eq_ignore_ascii_case(k));
    valid_start
        && !reserved
        && chars.all(|c| c == '-' || c == '_' || c.is_ascii_alphanumeric() || !c.is_ascii())
}

/// Generate the trigger for one rule.
pub fn compile_rule(name: &str, selector: &str, prefix: VendorPrefix, config: &EnhanceConfig) -> Trigger {
    let p = prefix.css();
    let EnhanceConfig {
        duration,
        inert_property: prop,
        inert_from: from,
        inert_to: to,
        ..
    } = config;
    Trigger {
        rule: name.to_string(),
        style_rule: format!("{selector} {{ {p}animation: {name} {duration}; }}"),
        keyframes_rule: format!(
            "@{p}keyframes {name} {{ from {{ {prop}: {from}; }} to {{ {prop}: {to}; }} }}"
        ),
    }
}

/// Generate triggers for every rule of `registry`, in registry order.
/// Rules whose name cannot be an animation name are skipped; the fallback
/// scan still covers them.
pub fn compile<E: Clone + Eq + Hash>(
    registry: &Registry<E>,
    prefix: VendorPrefix,
    config: &EnhanceConfig,
) -> Vec<Trigger> {
    registry
        .iter()
        .filter(|rule| {
            if !is_animation_ident(rule.name()) {
                tracing::warn!(rule = %rule.name(), "rule name is not a valid animation name, no trigger");
                return false;
            }
            if rule.selector().trim().is_empty() {
                tracing::warn!(rule = %rule.name(), "rule has an empty selector, no trigger");
                return false;
            }
            true
        })
        .map(|rule| compile_rule(rule.name(), rule.selector(), prefix, config))
        .collect()
}

/// Install `triggers` as one batch. Returns `true` if at least one trigger
/// had both of its rules accepted.
pub fn install<S: TriggerSheet + ?Sized>(sheet: &S, triggers: &[Trigger]) -> bool {
    if triggers.is_empty() {
        return false;
    }
    let batch: Vec<String> = triggers
        .iter()
        .flat_map(|t| [t.style_rule.clone(), t.keyframes_rule.clone()])
        .collect();

    match sheet.install(&batch) {
        Ok(InstallReport { accepted, rejected }) => {
            for (index, reason) in &rejected {
                let (Some(trigger), Some(css)) = (triggers.get(index / 2), batch.get(*index)) else {
                    tracing::warn!(index, %reason, "host rejected a rule outside the batch");
                    continue;
                };
                tracing::warn!(
                    rule = %trigger.rule,
                    %css,
                    %reason,
                    "trigger rule rejected, relying on the fallback scan"
                );
            }
            tracing::debug!(accepted, rejected = rejected.len(), "installed trigger rules");
            (0..triggers.len()).any(|i| !rejected.iter().any(|(index, _)| index / 2 == i))
        }
        Err(err) => {
            tracing::warn!(error = %err, "could not install trigger rules, relying on the fallback scan");
            false
        }
    }
}
