//! Progressive enhancement demo.
//!
//! Runs two scenarios against a document that fires animation events and
//! one that does not:
//!
//! 1. three `.note` elements present while parsing get highlighted;
//! 2. a `.note` inserted by a script after load gets highlighted too.
//!
//! Set `RUST_LOG=progressive=trace` to watch the engine work.

use std::cell::RefCell;
use std::rc::Rc;

use dom::NodeId;
use page::{Document, DocumentError};
use progressive::RuleSet;
use style::EngineProfile;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    init_logging();

    for profile in [EngineProfile::Standard, EngineProfile::Legacy] {
        println!("── {profile:?} engine ──");
        if let Err(err) = run(profile) {
            eprintln!("   error: {err}");
        }
        println!();
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

fn run(profile: EngineProfile) -> Result<(), DocumentError> {
    let doc = Document::with_profile(profile);
    let marked: Rc<RefCell<Vec<NodeId>>> = Rc::default();

    let mark = {
        let doc = doc.clone();
        let marked = marked.clone();
        move |el: &NodeId| {
            marked.borrow_mut().push(*el);
            if let Err(err) = doc.set_attribute(*el, "data-highlighted", "true") {
                tracing::warn!(error = %err, "could not mark element");
            }
        }
    };
    let handle = progressive::enhance(doc.clone(), RuleSet::new().rule("highlight", ".note", mark));
    println!(
        "   animation events: {}",
        if handle.capability().is_supported() { "yes" } else { "no" }
    );

    // Parse time.
    for text in ["first", "second", "third"] {
        let note = doc.create_element("div", &[("class", "note")]);
        let body = doc.create_text(text);
        doc.append_child(note, body)?;
        doc.append_child(doc.body(), note)?;
    }
    doc.finish_parsing();
    doc.run_until_idle();
    println!(
        "   after load: {} highlighted ({} passive, {} by the fallback scan), phase {}",
        marked.borrow().len(),
        handle.invocation_count("highlight").unwrap_or(0),
        handle.fallback_invocations("highlight").unwrap_or(0),
        handle.phase(),
    );

    // A script inserts another note.
    let late = doc.create_element("div", &[("class", "note")]);
    doc.append_child(doc.body(), late)?;
    doc.run_until_idle();
    let highlighted = doc.attribute(late, "data-highlighted").is_some();
    println!(
        "   inserted after load: {}",
        if highlighted { "highlighted" } else { "not highlighted (no insertion signal)" }
    );
    Ok(())
}
