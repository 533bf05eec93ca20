//! Gateway model picker — the dialog's state machine.
//!
//! The picker never performs I/O itself. `open`/`refresh` hand the host a
//! [`CatalogFetch`] ticket (fresh cancellation token + epoch); the host runs
//! the catalog fetch and feeds the result back through [`ModelPicker::resolve`].
//! The epoch guard makes a late result from a superseded opening inert, so a
//! stale fetch can never overwrite fresher state.

use std::str::FromStr;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use quillpad_core::{ModelDescriptor, ProviderError, SessionSettings};

/// Dialog lifecycle phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PickerPhase {
    /// Never fetched (or closed with nothing cached).
    Idle,
    /// A catalog fetch is in flight.
    Loading,
    /// Descriptors are available.
    Ready,
    /// The last fetch failed; the message is display text.
    Errored(String),
}

impl Default for PickerPhase {
    fn default() -> Self {
        PickerPhase::Idle
    }
}

/// Sort order for the catalog list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Display name (falling back to id), lexical, case-insensitive.
    #[default]
    Name,
    /// Context length, descending; unknown lengths last.
    Context,
    /// Prompt price, ascending; unknown prices last.
    Price,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortKey::Name),
            "context" => Ok(SortKey::Context),
            "price" => Ok(SortKey::Price),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

/// Ticket for one catalog fetch.
///
/// The host runs the fetch (scoped to the gateway provider) with this token
/// and resolves the picker with the outcome.
pub struct CatalogFetch {
    epoch: u64,
    /// Cancels the fetch; fired automatically when the dialog closes or a
    /// newer fetch starts.
    pub cancel: CancellationToken,
}

/// State machine behind the gateway's model-selection dialog.
#[derive(Default)]
pub struct ModelPicker {
    phase: PickerPhase,
    models: Vec<ModelDescriptor>,
    local_selected: String,
    search: String,
    sort_key: SortKey,
    epoch: u64,
    inflight: Option<CancellationToken>,
}

impl ModelPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the dialog: seed the transient selection from the currently
    /// configured model and start a fresh catalog fetch. Any fetch from a
    /// previous opening is aborted.
    pub fn open(&mut self, current_model: &str) -> CatalogFetch {
        self.local_selected = current_model.to_string();
        self.begin_fetch()
    }

    /// Re-run the catalog fetch without touching the local selection.
    pub fn refresh(&mut self) -> CatalogFetch {
        self.begin_fetch()
    }

    fn begin_fetch(&mut self) -> CatalogFetch {
        if let Some(token) = self.inflight.take() {
            token.cancel();
        }
        self.epoch += 1;
        let token = CancellationToken::new();
        self.inflight = Some(token.clone());
        self.phase = PickerPhase::Loading;
        CatalogFetch {
            epoch: self.epoch,
            cancel: token,
        }
    }

    /// Feed a fetch outcome back into the dialog.
    ///
    /// Results from a superseded opening are ignored. Cancellation leaves the
    /// dialog silently in its prior data state; any other failure stores a
    /// display message but keeps previously fetched descriptors.
    pub fn resolve(
        &mut self,
        fetch: &CatalogFetch,
        result: Result<Vec<ModelDescriptor>, ProviderError>,
    ) {
        if fetch.epoch != self.epoch {
            debug!(epoch = fetch.epoch, current = self.epoch, "stale catalog result ignored");
            return;
        }
        self.inflight = None;
        match result {
            Ok(models) => {
                self.models = models;
                self.phase = PickerPhase::Ready;
            }
            Err(e) if e.is_cancelled() => {
                self.phase = self.settled_phase();
            }
            Err(e) => {
                self.phase = PickerPhase::Errored(e.to_string());
            }
        }
    }

    /// Close the dialog, aborting any in-flight fetch. Cached descriptors
    /// survive for the next opening.
    pub fn close(&mut self) {
        if let Some(token) = self.inflight.take() {
            token.cancel();
        }
        self.phase = self.settled_phase();
    }

    fn settled_phase(&self) -> PickerPhase {
        if self.models.is_empty() {
            PickerPhase::Idle
        } else {
            PickerPhase::Ready
        }
    }

    // ── accessors ──

    pub fn phase(&self) -> &PickerPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == PickerPhase::Loading
    }

    /// Display message of the last failure, if the picker is errored.
    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            PickerPhase::Errored(message) => Some(message),
            _ => None,
        }
    }

    /// The transient selection (not yet committed).
    pub fn selected(&self) -> &str {
        &self.local_selected
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    // ── mutators ──

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn set_sort(&mut self, key: SortKey) {
        self.sort_key = key;
    }

    /// Select an entry. Only the transient selection changes.
    pub fn select(&mut self, model_id: impl Into<String>) {
        self.local_selected = model_id.into();
    }

    /// Commit the transient selection to the shared settings and close.
    pub fn confirm(&mut self, settings: &mut SessionSettings) {
        settings.set_model(self.local_selected.clone());
        self.close();
    }

    /// Discard the transient selection and close.
    pub fn cancel_dialog(&mut self) {
        self.local_selected.clear();
        self.close();
    }

    /// The catalog as the dialog shows it: sorted per [`SortKey`], then
    /// filtered case-insensitively by substring over id and display name.
    pub fn visible_models(&self) -> Vec<&ModelDescriptor> {
        let mut visible: Vec<&ModelDescriptor> = self.models.iter().collect();
        match self.sort_key {
            SortKey::Name => visible.sort_by_key(|m| m.display_name().to_lowercase()),
            SortKey::Context => {
                visible.sort_by(|a, b| {
                    b.context_length
                        .unwrap_or(0)
                        .cmp(&a.context_length.unwrap_or(0))
                });
            }
            SortKey::Price => {
                visible.sort_by(|a, b| {
                    a.prompt_price()
                        .unwrap_or(f64::INFINITY)
                        .total_cmp(&b.prompt_price().unwrap_or(f64::INFINITY))
                });
            }
        }

        if !self.search.is_empty() {
            let term = self.search.to_lowercase();
            visible.retain(|m| {
                m.id.to_lowercase().contains(&term)
                    || m.name
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&term))
            });
        }
        visible
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn model(id: &str) -> ModelDescriptor {
        ModelDescriptor {
            id: id.to_string(),
            ..ModelDescriptor::default()
        }
    }

    fn model_with_context(id: &str, context_length: Option<u64>) -> ModelDescriptor {
        ModelDescriptor {
            id: id.to_string(),
            context_length,
            ..ModelDescriptor::default()
        }
    }

    fn model_with_price(id: &str, prompt: Option<f64>) -> ModelDescriptor {
        ModelDescriptor {
            id: id.to_string(),
            pricing: Some(quillpad_core::ModelPricing {
                prompt,
                completion: None,
            }),
            ..ModelDescriptor::default()
        }
    }

    fn ready_picker(models: Vec<ModelDescriptor>) -> ModelPicker {
        let mut picker = ModelPicker::new();
        let fetch = picker.open("");
        picker.resolve(&fetch, Ok(models));
        picker
    }

    // ── lifecycle ──

    #[test]
    fn test_open_seeds_selection_and_loads() {
        let mut picker = ModelPicker::new();
        assert_eq!(*picker.phase(), PickerPhase::Idle);

        let _fetch = picker.open("gpt-4");
        assert_eq!(picker.selected(), "gpt-4");
        assert!(picker.is_loading());
    }

    #[test]
    fn test_success_transitions_to_ready() {
        let picker = ready_picker(vec![model("a"), model("b")]);
        assert_eq!(*picker.phase(), PickerPhase::Ready);
        assert_eq!(picker.visible_models().len(), 2);
    }

    #[test]
    fn test_failure_stores_message_and_keeps_models() {
        let mut picker = ready_picker(vec![model("cached")]);

        let fetch = picker.refresh();
        picker.resolve(&fetch, Err(ProviderError::Status { status: 500 }));

        assert_eq!(picker.error(), Some("HTTP 500"));
        // Prior catalog survives the failed refresh.
        assert_eq!(picker.visible_models().len(), 1);
    }

    #[test]
    fn test_cancellation_is_silent() {
        let mut picker = ready_picker(vec![model("cached")]);

        let fetch = picker.refresh();
        picker.resolve(&fetch, Err(ProviderError::Cancelled));

        assert_eq!(*picker.phase(), PickerPhase::Ready);
        assert!(picker.error().is_none());
    }

    #[test]
    fn test_stale_fetch_result_is_ignored() {
        let mut picker = ModelPicker::new();

        // First opening; the dialog closes before the fetch lands.
        let first = picker.open("");
        picker.close();
        assert!(first.cancel.is_cancelled());

        // Second opening supersedes the first.
        let second = picker.open("");

        // The first fetch's result arrives late: it must not apply.
        picker.resolve(&first, Ok(vec![model("stale")]));
        assert!(picker.is_loading());
        assert!(picker.visible_models().is_empty());

        picker.resolve(&second, Ok(vec![model("fresh")]));
        assert_eq!(picker.visible_models()[0].id, "fresh");
    }

    #[test]
    fn test_new_fetch_aborts_previous() {
        let mut picker = ModelPicker::new();
        let first = picker.open("");
        assert!(!first.cancel.is_cancelled());

        let _second = picker.refresh();
        assert!(first.cancel.is_cancelled());
    }

    // ── sorting ──

    #[test]
    fn test_sort_by_context_missing_last() {
        let mut picker = ready_picker(vec![
            model_with_context("small", Some(1000)),
            model_with_context("unknown", None),
            model_with_context("big", Some(5000)),
        ]);
        picker.set_sort(SortKey::Context);

        let ids: Vec<&str> = picker.visible_models().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["big", "small", "unknown"]);
    }

    #[test]
    fn test_sort_by_price_missing_last() {
        let mut picker = ready_picker(vec![
            model_with_price("mid", Some(0.002)),
            model("unpriced"),
            model_with_price("cheap", Some(0.001)),
        ]);
        picker.set_sort(SortKey::Price);

        let ids: Vec<&str> = picker.visible_models().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["cheap", "mid", "unpriced"]);
    }

    #[test]
    fn test_sort_by_price_free_sorts_first() {
        let mut picker = ready_picker(vec![
            model_with_price("paid", Some(0.001)),
            model_with_price("free", Some(0.0)),
        ]);
        picker.set_sort(SortKey::Price);

        let ids: Vec<&str> = picker.visible_models().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["free", "paid"]);
    }

    #[test]
    fn test_sort_by_name_uses_display_name() {
        let mut beta = model("zzz-internal-id");
        beta.name = Some("Beta".to_string());
        let mut picker = ready_picker(vec![model("gamma"), beta, model("Alpha")]);
        picker.set_sort(SortKey::Name);

        let names: Vec<&str> = picker
            .visible_models()
            .iter()
            .map(|m| m.display_name())
            .collect();
        assert_eq!(names, ["Alpha", "Beta", "gamma"]);
    }

    // ── filtering ──

    #[test]
    fn test_filter_matches_id_case_insensitively() {
        let mut picker = ready_picker(vec![model("gpt-4"), model("claude-3"), model("GPT-3.5")]);
        picker.set_search("gpt");

        let ids: Vec<&str> = picker.visible_models().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"gpt-4"));
        assert!(ids.contains(&"GPT-3.5"));
    }

    #[test]
    fn test_filter_matches_display_name() {
        let mut named = model("internal-1");
        named.name = Some("Mistral Large".to_string());
        let mut picker = ready_picker(vec![named, model("gpt-4")]);
        picker.set_search("mistral");

        let ids: Vec<&str> = picker.visible_models().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["internal-1"]);
    }

    // ── selection ──

    #[test]
    fn test_select_is_transient_until_confirm() {
        let mut settings = SessionSettings::default();
        settings.set_model("old-model");

        let mut picker = ready_picker(vec![model("new-model")]);
        picker.select("new-model");
        assert_eq!(settings.model(), "old-model");

        picker.confirm(&mut settings);
        assert_eq!(settings.model(), "new-model");
    }

    #[test]
    fn test_cancel_discards_selection() {
        let mut settings = SessionSettings::default();
        settings.set_model("old-model");

        let mut picker = ready_picker(vec![model("new-model")]);
        picker.select("new-model");
        picker.cancel_dialog();

        assert_eq!(settings.model(), "old-model");
        // Reopening reseeds from the configured model.
        let _fetch = picker.open(settings.model());
        assert_eq!(picker.selected(), "old-model");
    }

    // ── sort key parsing ──

    #[test]
    fn test_sort_key_from_str() {
        assert_eq!("name".parse::<SortKey>().unwrap(), SortKey::Name);
        assert_eq!("context".parse::<SortKey>().unwrap(), SortKey::Context);
        assert_eq!("price".parse::<SortKey>().unwrap(), SortKey::Price);
        assert!("kudos".parse::<SortKey>().is_err());
    }
}
