//! The engine: wires the registry, the triggers, the bridge and the
//! fallback scan to a host.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::bridge;
use crate::capability::Capability;
use crate::compiler;
use crate::config::EnhanceConfig;
use crate::fallback;
use crate::host::Host;
use crate::registry::{Registry, RuleSet};

/// Lifecycle of one `enhance` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Phase {
    #[default]
    Uninitialized,
    /// The registry is built and triggers (if any) are generated.
    RulesCompiled,
    /// Trigger rules reached the host's style sheet.
    TriggersInstalled,
    /// Waiting for the content-loaded signal.
    Listening,
    /// The fallback scan is invoking callbacks.
    FallbackRan,
    /// The scan is done; only passive triggers remain.
    Steady,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

fn advance(phase: &Cell<Phase>, next: Phase) {
    tracing::debug!(from = %phase.get(), to = %next, "enhancement phase");
    phase.set(next);
}

// ─────────────────────────────────────────────────────────────────────────────
// Enhancement
// ─────────────────────────────────────────────────────────────────────────────

/// Instrumentation handle returned by [`Enhancer::enhance`]. Dropping it
/// does not unregister anything.
pub struct Enhancement<E> {
    registry: Rc<Registry<E>>,
    phase: Rc<Cell<Phase>>,
    capability: Capability,
    triggers_installed: bool,
}

impl<E: Clone + Eq + std::hash::Hash> Enhancement<E> {
    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn triggers_installed(&self) -> bool {
        self.triggers_installed
    }

    /// Passive firings of rule `name`.
    pub fn invocation_count(&self, name: &str) -> Option<u64> {
        self.registry.get(name).map(|r| r.invocation_count())
    }

    /// Callbacks the fallback scan issued for rule `name`.
    pub fn fallback_invocations(&self, name: &str) -> Option<u64> {
        self.registry.get(name).map(|r| r.fallback_invocations())
    }

    /// Distinct elements rule `name` has been invoked for.
    pub fn notified_count(&self, name: &str) -> Option<usize> {
        self.registry.get(name).map(|r| r.notified_count())
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.registry.names().collect()
    }
}

impl<E> fmt::Debug for Enhancement<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enhancement")
            .field("phase", &self.phase.get())
            .field("capability", &self.capability)
            .field("triggers_installed", &self.triggers_installed)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Enhancer
// ─────────────────────────────────────────────────────────────────────────────

/// Registers rules against one host.
///
/// The host handle is cloned into the content-loaded listener, so it should
/// be a cheap shared handle.
pub struct Enhancer<H> {
    host: H,
    capability: Capability,
    config: EnhanceConfig,
    last_phase: Option<Rc<Cell<Phase>>>,
}

impl<H> Enhancer<H>
where
    H: Host + Clone + 'static,
{
    pub fn new(host: H, capability: Capability, config: EnhanceConfig) -> Self {
        Self {
            host,
            capability,
            config,
            last_phase: None,
        }
    }

    /// Probe the host for the capability and use the default configuration.
    pub fn detect(host: H) -> Self {
        let capability = Capability::detect(&host);
        Self::new(host, capability, EnhanceConfig::default())
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn config(&self) -> &EnhanceConfig {
        &self.config
    }

    /// Phase of the most recent `enhance` call.
    pub fn phase(&self) -> Phase {
        self.last_phase.as_ref().map_or(Phase::Uninitialized, |p| p.get())
    }

    /// Register `rules`. Elements matching a rule get its callback once
    /// they enter the document; elements already present are covered when
    /// the content-loaded signal arrives. Never fails.
    pub fn enhance(&mut self, rules: RuleSet<H::Element>) -> Enhancement<H::Element> {
        let phase = Rc::new(Cell::new(Phase::Uninitialized));
        self.last_phase = Some(Rc::clone(&phase));

        let registry = Rc::new(Registry::from_rules(rules));
        let triggers = if self.capability.is_supported() {
            compiler::compile(&*registry, self.capability.prefix(), &self.config)
        } else {
            tracing::debug!("animation events unsupported, fallback scan only");
            Vec::new()
        };
        advance(&phase, Phase::RulesCompiled);

        let policy = self.config.dedup;
        let triggers_installed = compiler::install(&self.host, &triggers);
        if triggers_installed {
            advance(&phase, Phase::TriggersInstalled);
            bridge::subscribe(&self.host, &registry, policy);
        }

        let host = self.host.clone();
        let scan_registry = Rc::clone(&registry);
        let scan_phase = Rc::clone(&phase);
        advance(&phase, Phase::Listening);
        self.host.on_content_loaded(Box::new(move || {
            advance(&scan_phase, Phase::FallbackRan);
            fallback::scan(&host, &*scan_registry, policy);
            advance(&scan_phase, Phase::Steady);
        }));

        Enhancement {
            registry,
            phase,
            capability: self.capability,
            triggers_installed,
        }
    }
}

/// Detect the capability on `host` and register `rules` with the default
/// configuration.
pub fn enhance<H>(host: H, rules: RuleSet<H::Element>) -> Enhancement<H::Element>
where
    H: Host + Clone + 'static,
{
    Enhancer::detect(host).enhance(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::VendorPrefix;
    use crate::config::DedupPolicy;
    use crate::testing::{FakeHost, Recorder};
    use std::cell::RefCell;

    fn notes(host: &FakeHost, n: usize) -> Vec<usize> {
        (0..n).map(|_| host.add("div", None, &["note"])).collect()
    }

    #[test]
    fn supported_host_gets_triggers_and_listeners() {
        let host = FakeHost::supporting();
        let rec = Recorder::default();
        let mut enhancer = Enhancer::detect(host.clone());
        assert_eq!(enhancer.phase(), Phase::Uninitialized);

        let handle = enhancer.enhance(RuleSet::new().rule("highlight", ".note", rec.callback()));
        assert!(handle.triggers_installed());
        assert_eq!(handle.phase(), Phase::Listening);
        assert_eq!(enhancer.phase(), Phase::Listening);
        assert_eq!(
            host.installed(),
            [
                ".note { animation: highlight 0.001s; }",
                "@keyframes highlight { from { opacity: 0.99; } to { opacity: 1; } }",
            ]
        );
        assert_eq!(host.subscribed_events().len(), 4);
    }

    #[test]
    fn unsupported_host_gets_nothing_but_the_scan() {
        let host = FakeHost::unsupporting();
        let els = notes(&host, 3);
        let rec = Recorder::default();
        let handle = enhance(host.clone(), RuleSet::new().rule("highlight", ".note", rec.callback()));

        assert!(!handle.capability().is_supported());
        assert!(!handle.triggers_installed());
        assert_eq!(host.install_calls(), 0);
        assert!(host.subscribed_events().is_empty());

        host.load();
        assert_eq!(rec.seen(), els);
        assert_eq!(handle.invocation_count("highlight"), Some(0));
        assert_eq!(handle.fallback_invocations("highlight"), Some(3));
        assert_eq!(handle.phase(), Phase::Steady);
    }

    #[test]
    fn passive_firings_before_load_are_not_repeated() {
        let host = FakeHost::supporting();
        let els = notes(&host, 3);
        let rec = Recorder::default();
        let handle = enhance(host.clone(), RuleSet::new().rule("highlight", ".note", rec.callback()));

        for &el in &els {
            host.fire("animationstart", el, "highlight");
        }
        host.load();

        assert_eq!(rec.seen(), els);
        assert_eq!(handle.invocation_count("highlight"), Some(3));
        assert_eq!(handle.fallback_invocations("highlight"), Some(0));
    }

    #[test]
    fn failed_install_degrades_to_fallback_only() {
        let host = FakeHost::supporting();
        host.fail_installs(crate::error::InstallError::SheetUnavailable("detached".into()));
        let els = notes(&host, 2);
        let rec = Recorder::default();
        let handle = enhance(host.clone(), RuleSet::new().rule("hl", ".note", rec.callback()));

        assert!(handle.capability().is_supported());
        assert!(!handle.triggers_installed());
        assert!(host.subscribed_events().is_empty());
        host.load();
        assert_eq!(rec.seen(), els);
    }

    #[test]
    fn phase_moves_through_the_scan() {
        let host = FakeHost::supporting();
        host.add("p", None, &[]);
        let seen_phase = Rc::new(RefCell::new(Vec::new()));
        let phase_slot: Rc<RefCell<Option<Rc<Cell<Phase>>>>> = Rc::default();

        let (sp, slot) = (seen_phase.clone(), phase_slot.clone());
        let handle = Enhancer::new(host.clone(), Capability::supported(VendorPrefix::None), EnhanceConfig::default())
            .enhance(RuleSet::new().rule("para", "p", move |_: &usize| {
                if let Some(phase) = slot.borrow().as_ref() {
                    sp.borrow_mut().push(phase.get());
                }
            }));
        *phase_slot.borrow_mut() = Some(Rc::clone(&handle.phase));

        host.load();
        assert_eq!(*seen_phase.borrow(), vec![Phase::FallbackRan]);
        assert_eq!(handle.phase(), Phase::Steady);
    }

    #[test]
    fn injected_capability_overrides_the_host() {
        let host = FakeHost::supporting();
        let mut enhancer = Enhancer::new(host.clone(), Capability::UNSUPPORTED, EnhanceConfig::default());
        let handle = enhancer.enhance(RuleSet::new().rule("hl", "p", |_: &usize| {}));
        assert!(!handle.triggers_installed());
        assert_eq!(host.install_calls(), 0);

        let mut enhancer = Enhancer::new(
            host.clone(),
            Capability::supported(VendorPrefix::Webkit),
            EnhanceConfig::default().with_dedup(DedupPolicy::InvocationCount),
        );
        enhancer.enhance(RuleSet::new().rule("hl", "p", |_: &usize| {}));
        assert!(host.installed()[0].contains("-webkit-animation: hl"));
    }

    #[test]
    fn missing_target_never_invokes() {
        let host = FakeHost::supporting();
        host.add("div", Some("other"), &[]);
        let rec = Recorder::default();
        let handle = enhance(host.clone(), RuleSet::new().rule("flag", "#widget", rec.callback()));
        host.load();
        assert!(rec.seen().is_empty());
        assert_eq!(handle.notified_count("flag"), Some(0));
        assert_eq!(handle.invocation_count("missing"), None);
    }
}
