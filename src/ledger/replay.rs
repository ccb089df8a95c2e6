//! Re-applying a ledger to a freshly rendered surface.

use tracing::debug;

use super::EditLedger;
use crate::dom::Dom;
use crate::render::Surface;
use crate::selector;

/// Outcome of a replay pass. An entry counts as applied when it changed at
/// least one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub applied: usize,
    pub skipped: usize,
}

/// Apply every entry to every node its selector matches inside the surface.
/// Misses are skipped per entry; replaying twice leaves the same tree as
/// replaying once.
pub fn replay(ledger: &EditLedger, dom: &mut Dom, surface: &Surface) -> ReplayReport {
    let mut report = ReplayReport::default();
    for entry in ledger.entries() {
        let matcher = selector::parse(&entry.selector);
        let targets = matcher.find_all(dom, surface.root());
        let mut hit = false;
        for node in targets {
            hit |= surface.apply_edit(dom, node, &entry.property, &entry.value);
        }
        if hit {
            report.applied += 1;
        } else {
            debug!(selector = %entry.selector, property = %entry.property, "replay skipped entry");
            report.skipped += 1;
        }
    }
    debug!(applied = report.applied, skipped = report.skipped, "ledger replayed");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::markup::outer_html;
    use crate::render::{render, GeneratedDocument, HostTree};
    use pretty_assertions::assert_eq;

    const DOC: &str = "<body><main><h1 class=\"hero-title\">Hi</h1><p>one</p><p>two</p></main></body>";

    fn setup() -> (HostTree, Surface) {
        let mut host = HostTree::new();
        let surface = render(
            &mut host.dom,
            host.stage,
            &GeneratedDocument::from_html(DOC),
            &EditorConfig::default(),
            1280.0,
        );
        (host, surface)
    }

    #[test]
    fn applies_each_kind_of_entry() {
        let (mut host, surface) = setup();
        let mut ledger = EditLedger::new("p");
        ledger.record(".hero-title", "color", "#00ff00");
        ledger.record("p:nth-of-type(2)", "textContent", "second");
        ledger.record("main:nth-of-type(1)", "pageBackground", "#101010");

        let report = replay(&ledger, &mut host.dom, &surface);
        assert_eq!(report, ReplayReport { applied: 3, skipped: 0 });

        let title = host.dom.query_by_class(surface.root(), "hero-title")[0];
        assert_eq!(surface.compute(&host.dom, title).get("color"), "#00ff00");
        let paragraphs = host.dom.query_by_tag(surface.root(), "p");
        assert_eq!(host.dom.text_of(paragraphs[1]), "second");
        assert_eq!(
            host.dom.get(surface.root()).unwrap().style.get("background"),
            Some("#101010")
        );
    }

    #[test]
    fn misses_are_skipped() {
        let (mut host, surface) = setup();
        let mut ledger = EditLedger::new("p");
        ledger.record("#gone", "color", "red");
        ledger.record("p:nth-of-type(9)", "color", "red");
        ledger.record("[[[", "color", "red");
        ledger.record("p:nth-of-type(1)", "color", "red");
        let report = replay(&ledger, &mut host.dom, &surface);
        assert_eq!(report, ReplayReport { applied: 1, skipped: 3 });
    }

    #[test]
    fn replay_is_idempotent() {
        let (mut host, surface) = setup();
        let mut ledger = EditLedger::new("p");
        ledger.record(".hero-title", "textContent", "Welcome");
        ledger.record(".hero-title", "background", "linear-gradient(135deg, #667eea 0%, #764ba2 100%)");
        ledger.record("main:nth-of-type(1)", "pageBackground", "#000");

        replay(&ledger, &mut host.dom, &surface);
        let once = outer_html(&host.dom, surface.root());
        replay(&ledger, &mut host.dom, &surface);
        assert_eq!(outer_html(&host.dom, surface.root()), once);
    }
}
