//! Project session: the per-project owner of the host tree, surface,
//! selection, inline editor, inspector panel, ledger and viewport.
//!
//! Input arrives as [`InputEvent`]s already targeted at a node. The session
//! routes them between components and is the only place that records edits
//! and schedules persistence.

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::dom::{Dom, NodeId};
use crate::event::{
    InputEvent, KeyBindingRegistry, KeyEvent, PointerAction, PointerButton, PointerEvent, SessionAction,
};
use crate::gradient::GradientDescriptor;
use crate::inline_edit::{Commit, EditOutcome, InlineEditError, InlineEditor};
use crate::inspector::panel::{control_at, InspectorPanel, PanelControl};
use crate::inspector::{self, EditableProperty, Preset, PropertyWrite, StyleValue};
use crate::ledger::{replay, EditLedger, LedgerStore, MemoryStore, ReplayReport, StoreError, WriteScheduler};
use crate::project::{GenerationError, GenerationResponse};
use crate::render::{render, GeneratedDocument, HostTree, Surface};
use crate::selection::{resolve_target, PointerOutcome, SelectedElement, SelectionController};
use crate::selector;
use crate::viewport::{DeviceClass, ViewportEmulator};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no node is selected")]
    NothingSelected,
    #[error("node is not part of the rendering surface")]
    OutsideSurface,
    #[error("the `color` control holds no gradient")]
    NoGradient,
    #[error(transparent)]
    InlineEdit(#[from] InlineEditError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct ProjectSession<S: LedgerStore = MemoryStore> {
    config: EditorConfig,
    host: HostTree,
    document: GeneratedDocument,
    surface: Surface,
    selection: SelectionController,
    editor: InlineEditor,
    panel: InspectorPanel,
    bindings: KeyBindingRegistry,
    ledger: EditLedger,
    scheduler: WriteScheduler,
    store: S,
    viewport: ViewportEmulator,
    message: Option<String>,
    last_replay: ReplayReport,
}

impl<S: LedgerStore> ProjectSession<S> {
    /// Open a project: load its ledger, render the document, replay.
    ///
    /// A ledger that fails to load is logged and treated as empty.
    pub fn open(project_id: impl Into<String>, document: GeneratedDocument, config: EditorConfig, store: S) -> Self {
        let project_id = project_id.into();
        let entries = store.load(&project_id).unwrap_or_else(|err| {
            warn!(error = %err, "could not load ledger, starting empty");
            Vec::new()
        });
        let mut host = HostTree::new();
        let viewport = ViewportEmulator::new(config.devices);
        let surface = render(&mut host.dom, host.stage, &document, &config, viewport.width());
        let mut session = Self {
            selection: SelectionController::new(config.drag_threshold),
            editor: InlineEditor::new(),
            panel: InspectorPanel::new(),
            bindings: KeyBindingRegistry::with_defaults(),
            ledger: EditLedger::from_entries(project_id, entries),
            scheduler: WriteScheduler::new(config.debounce()),
            store,
            viewport,
            message: None,
            last_replay: ReplayReport::default(),
            config,
            host,
            document,
            surface,
        };
        session.replay_and_reflow();
        session.panel.render(&mut session.host.dom, session.host.panel);
        info!(project = session.ledger.project_id(), entries = session.ledger.len(), "project opened");
        session
    }

    // -- accessors -----------------------------------------------------------

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn host(&self) -> &HostTree {
        &self.host
    }

    pub fn dom(&self) -> &Dom {
        &self.host.dom
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn document(&self) -> &GeneratedDocument {
        &self.document
    }

    pub fn selected(&self) -> Option<&SelectedElement> {
        self.selection.selected()
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.selection.hovered()
    }

    pub fn editor(&self) -> &InlineEditor {
        &self.editor
    }

    pub fn panel(&self) -> &InspectorPanel {
        &self.panel
    }

    pub fn ledger(&self) -> &EditLedger {
        &self.ledger
    }

    pub fn scheduler(&self) -> &WriteScheduler {
        &self.scheduler
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn viewport(&self) -> &ViewportEmulator {
        &self.viewport
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindingRegistry {
        &mut self.bindings
    }

    /// The visible status message, set when generation fails.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn last_replay(&self) -> ReplayReport {
        self.last_replay
    }

    // -- input routing -------------------------------------------------------

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pointer(pointer) => self.handle_pointer(&pointer),
            InputEvent::Key(key) => self.handle_key(&key),
            InputEvent::Paste(text) => self.editor.paste(&mut self.host.dom, &text),
            InputEvent::Blur => {
                if let Some(commit) = self.editor.commit(&mut self.host.dom) {
                    self.record_commit(commit);
                }
            }
        }
    }

    fn handle_pointer(&mut self, event: &PointerEvent) {
        let target = event.target.filter(|&t| self.host.dom.contains(t));
        if event.target.is_some() && target.is_none() {
            debug!("pointer event for a node that no longer exists");
            return;
        }
        if let (Some(t), Some(surrogate)) = (target, self.editor.surrogate()) {
            if self.host.dom.is_inclusive_descendant(t, surrogate) {
                return;
            }
        }

        let primary_down = event.kind == PointerAction::Down(PointerButton::Primary);
        let in_panel = target.is_some_and(|t| self.host.in_panel(t));
        if primary_down {
            if in_panel {
                self.panel.signal_interaction();
            }
            // a press anywhere else is focus loss for the surrogate
            if let Some(commit) = self.editor.commit(&mut self.host.dom) {
                self.record_commit(commit);
            }
        }

        if event.kind == PointerAction::DoubleClick {
            if let Some(node) = target.and_then(|t| resolve_target(&self.host.dom, self.surface.root(), t)) {
                if let Err(err) = self.begin_inline_edit(node) {
                    debug!(error = %err, "double click did not start an inline edit");
                }
            }
            return;
        }

        let outcome = self.selection.handle_pointer(&mut self.host.dom, self.surface.root(), event);
        match outcome {
            PointerOutcome::Selected(selected) => self.open_inspector(&selected),
            PointerOutcome::OutsideDown => {
                if self.panel.take_interaction() {
                    debug!("press inside the inspector panel, selection kept");
                } else {
                    self.clear_selection();
                }
            }
            PointerOutcome::Ignored => {}
        }

        if primary_down {
            if let Some(t) = target {
                if in_panel {
                    self.activate_control(t);
                } else if self.host.is_refresh(t) {
                    self.refresh();
                }
            }
            self.panel.take_interaction();
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) {
        if self.editor.is_active() {
            match self.editor.handle_key(&mut self.host.dom, key) {
                EditOutcome::Committed(commit) => self.record_commit(commit),
                EditOutcome::Cancelled(_) => self.reflow(),
                EditOutcome::Editing => {}
            }
            return;
        }
        let Some(action) = self.bindings.resolve(key) else {
            return;
        };
        debug!(?action, "key binding");
        match action {
            SessionAction::ClearSelection => self.clear_selection(),
            SessionAction::Refresh => self.refresh(),
            SessionAction::Device(device) => self.set_device(device),
            SessionAction::EditSelected => {
                if let Some(node) = self.selection.selected().map(|s| s.node) {
                    if let Err(err) = self.begin_inline_edit(node) {
                        debug!(error = %err, "selected node is not editable");
                    }
                }
            }
        }
    }

    fn activate_control(&mut self, target: NodeId) {
        match control_at(&self.host.dom, self.host.panel, target) {
            Some(PanelControl::Close) => self.clear_selection(),
            Some(PanelControl::Preset(preset)) => {
                if let Err(err) = self.apply_preset(preset) {
                    debug!(error = %err, "preset ignored");
                }
            }
            // value controls take their input through `change_property`
            Some(PanelControl::Property(_) | PanelControl::GradientStop(_)) | None => {}
        }
    }

    // -- selection and inspector ---------------------------------------------

    /// Select a surface node directly.
    pub fn select(&mut self, node: NodeId) -> Result<SelectedElement, SessionError> {
        let node = resolve_target(&self.host.dom, self.surface.root(), node).ok_or(SessionError::OutsideSurface)?;
        let selected = self
            .selection
            .select(&mut self.host.dom, node)
            .ok_or(SessionError::OutsideSurface)?;
        self.open_inspector(&selected);
        Ok(selected)
    }

    /// Return to Idle and close the inspector.
    pub fn clear_selection(&mut self) {
        self.selection.clear(&mut self.host.dom);
        self.panel.close();
        self.panel.render(&mut self.host.dom, self.host.panel);
    }

    fn open_inspector(&mut self, selected: &SelectedElement) {
        let view = inspector::open(&self.host.dom, &self.surface, selected, &self.config.gradient_angle);
        self.panel.open(view);
        self.panel.render(&mut self.host.dom, self.host.panel);
    }

    /// Re-sample the open inspector after a mutation.
    fn sync_panel(&mut self) {
        match self.selection.selected().cloned() {
            Some(selected) if self.host.dom.contains(selected.node) => self.open_inspector(&selected),
            _ => {
                self.panel.close();
                self.panel.render(&mut self.host.dom, self.host.panel);
            }
        }
    }

    /// Set a property on the selected node, live, and record it.
    pub fn change_property(&mut self, property: EditableProperty, value: StyleValue) -> Result<(), SessionError> {
        let node = self.selected_node()?;
        let writes = inspector::apply(&mut self.host.dom, &self.surface, node, property, &value);
        self.record(node, &writes);
        self.reflow();
        self.sync_panel();
        Ok(())
    }

    /// Replace one color of the selected node's gradient text fill.
    pub fn set_gradient_stop(&mut self, index: usize, color: &str) -> Result<(), SessionError> {
        let mut descriptor: GradientDescriptor = match self
            .panel
            .view()
            .and_then(|view| view.get(EditableProperty::Color))
        {
            Some(StyleValue::Gradient(descriptor)) => descriptor.clone(),
            _ => return Err(SessionError::NoGradient),
        };
        descriptor.set_color(index, color);
        self.change_property(EditableProperty::Color, StyleValue::Gradient(descriptor))
    }

    pub fn apply_preset(&mut self, preset: Preset) -> Result<(), SessionError> {
        let node = self.selected_node()?;
        let writes = inspector::apply_preset(&mut self.host.dom, &self.surface, node, preset);
        self.record(node, &writes);
        self.reflow();
        self.sync_panel();
        Ok(())
    }

    /// Prepend an icon to the selected node. Not recorded.
    pub fn insert_icon(&mut self, glyph: &str) -> Result<NodeId, SessionError> {
        let node = self.selected_node()?;
        let icon = inspector::insert_icon(&mut self.host.dom, node, glyph);
        self.reflow();
        self.sync_panel();
        Ok(icon)
    }

    fn selected_node(&self) -> Result<NodeId, SessionError> {
        let node = self.selection.selected().map(|s| s.node).ok_or(SessionError::NothingSelected)?;
        if !self.surface.contains(&self.host.dom, node) {
            return Err(SessionError::OutsideSurface);
        }
        Ok(node)
    }

    // -- inline editing ------------------------------------------------------

    /// Start an inline edit, clearing selection and hover first.
    pub fn begin_inline_edit(&mut self, node: NodeId) -> Result<(), SessionError> {
        if !self.surface.contains(&self.host.dom, node) {
            return Err(SessionError::OutsideSurface);
        }
        if !InlineEditor::is_editable(&self.host.dom, node) {
            let tag = self.host.dom.get(node).map(|d| d.tag.clone()).unwrap_or_default();
            return Err(InlineEditError::NotEditable(tag).into());
        }
        self.selection.reset(&mut self.host.dom);
        self.panel.close();
        self.panel.render(&mut self.host.dom, self.host.panel);
        // commit first: the pending node's position must be read before a
        // sibling is swapped for its surrogate
        if let Some(previous) = self.editor.commit(&mut self.host.dom) {
            self.record_commit(previous);
        }
        let style = self.surface.compute(&self.host.dom, node);
        if let Some(previous) = self.editor.begin(&mut self.host.dom, node, &style)? {
            self.record_commit(previous);
        }
        Ok(())
    }

    fn record_commit(&mut self, commit: Commit) {
        let write = PropertyWrite {
            key: EditableProperty::TextContent.key().to_string(),
            value: commit.text,
        };
        self.record(commit.node, &[write]);
        self.reflow();
    }

    // -- ledger --------------------------------------------------------------

    /// Record writes for `node` as one logical edit and schedule a persist.
    fn record(&mut self, node: NodeId, writes: &[PropertyWrite]) {
        let Some(selector) = selector::compute(&self.host.dom, node) else {
            debug!("edited node has no selector, not recorded");
            return;
        };
        let at = Utc::now();
        for write in writes {
            self.ledger.record_at(&selector, &write.key, &write.value, at);
        }
        let project_id = self.ledger.project_id().to_string();
        self.scheduler.schedule(&project_id, Instant::now());
    }

    /// Persist every write whose debounce window has elapsed. Returns the
    /// number of store writes.
    pub fn flush_due(&mut self, now: Instant) -> usize {
        let due = self.scheduler.due(now);
        self.persist(due)
    }

    /// Persist everything pending now.
    pub fn flush_all(&mut self) -> usize {
        let pending = self.scheduler.drain();
        self.persist(pending)
    }

    /// Sleep until each pending deadline and flush, until nothing is pending.
    pub async fn run_pending_writes(&mut self) -> usize {
        let mut written = 0;
        while let Some(deadline) = self.scheduler.next_deadline() {
            tokio::time::sleep_until(deadline).await;
            written += self.flush_due(Instant::now());
        }
        written
    }

    fn persist(&mut self, keys: Vec<String>) -> usize {
        let mut written = 0;
        for key in keys {
            if key != self.ledger.project_id() {
                continue;
            }
            match self.store.save(&key, self.ledger.entries()) {
                Ok(()) => written += 1,
                Err(err) => warn!(error = %err, "ledger persist failed, edits remain live"),
            }
        }
        written
    }

    // -- rendering -----------------------------------------------------------

    /// Re-render the last document and replay the ledger.
    pub fn refresh(&mut self) {
        if self.editor.cancel(&mut self.host.dom).is_some() {
            debug!("inline edit cancelled by refresh");
        }
        self.selection.reset(&mut self.host.dom);
        self.panel.close();
        self.surface = render(
            &mut self.host.dom,
            self.host.stage,
            &self.document,
            &self.config,
            self.viewport.width(),
        );
        self.replay_and_reflow();
        self.panel.render(&mut self.host.dom, self.host.panel);
    }

    /// Apply the outcome of a generation request. A failure is shown as a
    /// message and leaves the surface and ledger untouched.
    pub fn load_generation(&mut self, result: Result<GenerationResponse, GenerationError>) {
        match result {
            Ok(response) => {
                self.message = None;
                self.host.set_status(None);
                self.document = GeneratedDocument::from_html(&response.code);
                self.refresh();
            }
            Err(err) => {
                warn!(error = %err.error, details = ?err.details, "generation failed");
                let message = err.to_string();
                self.host.set_status(Some(&message));
                self.message = Some(message);
            }
        }
    }

    /// Switch the emulated device and reflow. The ledger is not touched.
    pub fn set_device(&mut self, device: DeviceClass) {
        if self.viewport.set_device(device) {
            self.reflow();
            self.sync_panel_if_open();
        }
    }

    fn sync_panel_if_open(&mut self) {
        if self.panel.is_open() {
            self.sync_panel();
        }
    }

    fn replay_and_reflow(&mut self) {
        let _quiet = self.scheduler.suppress();
        self.last_replay = replay(&self.ledger, &mut self.host.dom, &self.surface);
        if self.last_replay.skipped > 0 {
            debug!(skipped = self.last_replay.skipped, "some edits no longer match the document");
        }
        self.reflow();
    }

    fn reflow(&mut self) {
        self.viewport.reflow(&self.host.dom, &mut self.surface);
    }

    /// Serialize the edited surface.
    pub fn to_html(&self) -> String {
        self.surface.to_html(&self.host.dom)
    }

    // -- teardown ------------------------------------------------------------

    /// Flush pending writes and hand back the ledger.
    pub fn close(mut self) -> EditLedger {
        if self.editor.is_active() {
            if let Some(commit) = self.editor.commit(&mut self.host.dom) {
                self.record_commit(commit);
            }
        }
        self.flush_all();
        info!(project = self.ledger.project_id(), "project closed");
        self.ledger
    }

    /// Delete the project's stored ledger along with the session.
    pub fn delete(mut self) -> Result<(), SessionError> {
        self.scheduler.drain();
        self.store.delete(self.ledger.project_id())?;
        Ok(())
    }
}
