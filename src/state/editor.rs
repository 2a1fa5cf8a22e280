use handball_api::client::FormOptions;
use handball_api::form::{
    Draft, FieldErrors, FieldKind, FieldDef, FormMode, FormPhase, FormState, GameDraft, LeagueDraft, NO,
    NewsDraft, PlayerDraft, RankingDraft, RefereeDraft, TeamDraft, TournamentDraft, YES,
};
use handball_api::stats::RankingPreview;
use handball_api::{Record, Resource};

/// A submit that passed validation, encoded for the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSubmit {
    pub resource: Resource,
    pub mode: FormMode,
    pub body: serde_json::Value,
}

/// `FormState` with the draft type erased so one UI can drive every form.
pub trait Editor: Send {
    fn resource(&self) -> Resource;
    fn mode(&self) -> FormMode;
    fn fields(&self) -> &'static [FieldDef];
    fn value(&self, key: &str) -> &str;
    fn set(&mut self, key: &str, value: String);
    fn errors(&self) -> &FieldErrors;
    fn submit_error(&self) -> Option<&str>;
    fn phase(&self) -> FormPhase;
    fn submit(&mut self) -> Option<EncodedSubmit>;
    fn finish(&mut self, result: Result<(), String>);
    fn preview(&self) -> Option<RankingPreview>;
}

impl<D> Editor for FormState<D>
where
    D: Draft + Send,
{
    fn resource(&self) -> Resource {
        D::RESOURCE
    }

    fn mode(&self) -> FormMode {
        self.mode
    }

    fn fields(&self) -> &'static [FieldDef] {
        D::fields()
    }

    fn value(&self, key: &str) -> &str {
        self.draft.value(key)
    }

    fn set(&mut self, key: &str, value: String) {
        FormState::set(self, key, value);
    }

    fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    fn phase(&self) -> FormPhase {
        FormState::phase(self)
    }

    fn submit(&mut self) -> Option<EncodedSubmit> {
        let submission = FormState::submit(self)?;
        match serde_json::to_value(&submission.payload) {
            Ok(body) => Some(EncodedSubmit { resource: submission.resource, mode: submission.mode, body }),
            Err(e) => {
                FormState::finish(self, Err(format!("Could not prepare the request: {e}")));
                None
            }
        }
    }

    fn finish(&mut self, result: Result<(), String>) {
        FormState::finish(self, result);
    }

    fn preview(&self) -> Option<RankingPreview> {
        self.draft.preview()
    }
}

fn boxed<D: Draft + Send + 'static>(record: Option<&Record>) -> Option<Box<dyn Editor>> {
    let state = match record {
        Some(record) => FormState::<D>::edit(record)?,
        None => FormState::<D>::create(),
    };
    Some(Box::new(state))
}

/// Blank form for `resource`, or one pre-filled from `record`.
pub fn open_editor(resource: Resource, record: Option<&Record>) -> Option<Box<dyn Editor>> {
    match resource {
        Resource::Tournaments => boxed::<TournamentDraft>(record),
        Resource::Leagues => boxed::<LeagueDraft>(record),
        Resource::Teams => boxed::<TeamDraft>(record),
        Resource::Players => boxed::<PlayerDraft>(record),
        Resource::Games => boxed::<GameDraft>(record),
        Resource::Rankings => boxed::<RankingDraft>(record),
        Resource::Referees => boxed::<RefereeDraft>(record),
        Resource::News => boxed::<NewsDraft>(record),
        Resource::Galleries | Resource::Ads | Resource::Users => None,
    }
}

/// Open form plus which field has the cursor.
pub struct EditorState {
    pub form: Box<dyn Editor>,
    pub focus: usize,
    /// Set while the server's copy of the edited record is on its way; input is ignored.
    pub loading: bool,
}

impl EditorState {
    pub fn new(form: Box<dyn Editor>) -> Self {
        Self { form, focus: 0, loading: false }
    }

    /// Edit form showing the list row until `replace_record` brings the server's copy.
    pub fn awaiting_record(form: Box<dyn Editor>) -> Self {
        Self { loading: true, ..Self::new(form) }
    }

    /// Refill the form from `record` if it is the one being edited.
    pub fn replace_record(&mut self, record: &Record) -> bool {
        if !self.loading
            || self.form.resource() != record.resource()
            || self.form.mode() != FormMode::Edit(record.id())
        {
            return false;
        }
        if let Some(form) = open_editor(record.resource(), Some(record)) {
            self.form = form;
        }
        self.loading = false;
        true
    }

    pub fn title(&self) -> String {
        let noun = self.form.resource().noun();
        match self.form.mode() {
            FormMode::Create => format!(" New {noun} "),
            FormMode::Edit(id) => format!(" Edit {noun} #{id} "),
        }
    }

    pub fn focused(&self) -> Option<&'static FieldDef> {
        self.form.fields().get(self.focus)
    }

    pub fn focus_next(&mut self) {
        let len = self.form.fields().len().max(1);
        self.focus = (self.focus + 1) % len;
    }

    pub fn focus_prev(&mut self) {
        let len = self.form.fields().len().max(1);
        self.focus = (self.focus + len - 1) % len;
    }

    /// Typing only reaches free-text, number and date fields.
    pub fn type_char(&mut self, c: char) {
        let Some(field) = self.focused() else {
            return;
        };
        if !matches!(field.kind, FieldKind::Text | FieldKind::Number | FieldKind::Date) {
            return;
        }
        let mut value = self.form.value(field.key).to_owned();
        value.push(c);
        self.form.set(field.key, value);
    }

    pub fn backspace(&mut self) {
        let Some(field) = self.focused() else {
            return;
        };
        let mut value = self.form.value(field.key).to_owned();
        if value.pop().is_some() {
            self.form.set(field.key, value);
        }
    }

    /// Step a select, choice or flag field through its values.
    pub fn cycle(&mut self, options: &FormOptions, forward: bool) {
        let Some(field) = self.focused() else {
            return;
        };
        let current = self.form.value(field.key).to_owned();
        let values: Vec<String> = match field.kind {
            FieldKind::Select(resource) => {
                let ids = options.for_resource(resource).iter().map(|o| o.id.to_string());
                // Optional foreign keys may be cleared back to empty.
                if field.required { ids.collect() } else { std::iter::once(String::new()).chain(ids).collect() }
            }
            FieldKind::Choice(values) => values.iter().map(|v| (*v).to_owned()).collect(),
            FieldKind::Flag => vec![YES.to_owned(), NO.to_owned()],
            FieldKind::Text | FieldKind::Number | FieldKind::Date => return,
        };
        if let Some(next) = step(&values, &current, forward) {
            self.form.set(field.key, next);
        }
    }

    /// Shown next to a select field: the option label for the current id.
    pub fn display_value(&self, field: &FieldDef, options: &FormOptions) -> String {
        let raw = self.form.value(field.key);
        match field.kind {
            FieldKind::Select(resource) => match raw.parse::<u64>() {
                Ok(id) => options
                    .label(resource, id)
                    .map(|label| label.to_owned())
                    .unwrap_or_else(|| format!("#{id}")),
                Err(_) => "(none)".to_owned(),
            },
            _ => raw.to_owned(),
        }
    }
}

fn step(values: &[String], current: &str, forward: bool) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    let next = match values.iter().position(|v| v == current) {
        Some(idx) if forward => (idx + 1) % values.len(),
        Some(idx) => (idx + values.len() - 1) % values.len(),
        None if forward => 0,
        None => values.len() - 1,
    };
    values.get(next).cloned()
}
