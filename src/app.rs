use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, InputMode};
use crate::state::editor::{EncodedSubmit, EditorState, open_editor};
use crate::state::messages::NetworkRequest;
use handball_api::client::FormOptions;
use handball_api::form::FormPhase;
use handball_api::{Record, Resource};
use log::debug;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Dashboard,
    Fixtures,
    Rankings,
    Teams,
    Players,
    News,
    Admin,
    Help,
}

impl MenuItem {
    pub const TABS: [MenuItem; 7] = [
        MenuItem::Dashboard,
        MenuItem::Fixtures,
        MenuItem::Rankings,
        MenuItem::Teams,
        MenuItem::Players,
        MenuItem::News,
        MenuItem::Admin,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            MenuItem::Dashboard => "Dashboard",
            MenuItem::Fixtures => "Fixtures",
            MenuItem::Rankings => "Rankings",
            MenuItem::Teams => "Teams",
            MenuItem::Players => "Players",
            MenuItem::News => "News",
            MenuItem::Admin => "Admin",
            MenuItem::Help => "Help",
        }
    }
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        Self { settings, state: AppState::new() }
    }

    /// What to fetch so the active tab shows fresh data.
    pub fn load_request(&self) -> Option<NetworkRequest> {
        match self.state.active_tab {
            MenuItem::Dashboard => Some(NetworkRequest::LoadDashboard),
            MenuItem::Fixtures => Some(NetworkRequest::LoadFixtures),
            MenuItem::Rankings => Some(NetworkRequest::LoadStandings),
            MenuItem::Teams | MenuItem::Players => Some(NetworkRequest::LoadRosters),
            MenuItem::News => Some(NetworkRequest::LoadNews),
            MenuItem::Admin => Some(NetworkRequest::LoadCollection { resource: self.state.admin.resource }),
            MenuItem::Help => None,
        }
    }

    /// Background refresh never touches an open form.
    pub fn refresh_request(&self) -> Option<NetworkRequest> {
        if self.state.editor.is_some() {
            return None;
        }
        self.load_request()
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    /// Returns the load request for the new tab, if it changed.
    pub fn update_tab(&mut self, next: MenuItem) -> Option<NetworkRequest> {
        if self.state.active_tab == next {
            return None;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        self.state.input_mode = InputMode::Normal;
        self.state.admin.pending_delete = None;
        self.load_request()
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Admin
    // -----------------------------------------------------------------------

    pub fn admin_switch_resource(&mut self, forward: bool) -> NetworkRequest {
        let current = self.state.admin.resource;
        let next = if forward { current.next() } else { current.prev() };
        self.state.admin.switch_to(next);
        NetworkRequest::LoadCollection { resource: next }
    }

    /// Open a blank form, or one for the selected row when `edit` is set.
    /// Editing also fetches the server's copy of the row before input is accepted.
    pub fn open_editor(&mut self, edit: bool) -> Option<NetworkRequest> {
        let resource = self.state.admin.resource;
        if !resource.is_editable() {
            self.state.admin.notice = Some(format!("{} are read-only here", resource.label()));
            return None;
        }
        let (editor, request) = if edit {
            let record = self.state.admin.selected_record()?;
            let id = record.id();
            let form = open_editor(resource, Some(record))?;
            (EditorState::awaiting_record(form), NetworkRequest::LoadRecord { resource, id })
        } else {
            (EditorState::new(open_editor(resource, None)?), NetworkRequest::LoadFormOptions)
        };
        self.state.editor = Some(editor);
        self.state.input_mode = InputMode::Form;
        self.state.admin.notice = None;
        Some(request)
    }

    pub fn on_record_loaded(&mut self, record: Record, options: FormOptions) {
        self.state.form_options = options;
        if let Some(editor) = self.state.editor.as_mut()
            && !editor.replace_record(&record)
        {
            debug!("ignoring stale {} #{}", record.resource().noun(), record.id());
        }
    }

    pub fn close_editor(&mut self) {
        if self.state.editor.as_ref().is_some_and(|e| e.form.phase() == FormPhase::Submitting) {
            return;
        }
        self.state.editor = None;
        self.state.input_mode = InputMode::Normal;
    }

    /// A `Save` request when the form validates; field errors stay on the form otherwise.
    pub fn submit_editor(&mut self) -> Option<NetworkRequest> {
        let editor = self.state.editor.as_mut().filter(|e| !e.loading)?;
        let EncodedSubmit { resource, mode, body } = editor.form.submit()?;
        Some(NetworkRequest::Save { resource, mode, body })
    }

    pub fn request_delete(&mut self) {
        self.state.admin.pending_delete = self.state.admin.selected_record().map(|r| r.id());
    }

    pub fn confirm_delete(&mut self) -> Option<NetworkRequest> {
        let id = self.state.admin.pending_delete.take()?;
        Some(NetworkRequest::Delete { resource: self.state.admin.resource, id })
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    /// Close the form and reload the list it came from.
    pub fn on_saved(&mut self, resource: Resource) -> Option<NetworkRequest> {
        if let Some(editor) = self.state.editor.as_mut() {
            editor.form.finish(Ok(()));
        }
        self.state.editor = None;
        self.state.input_mode = InputMode::Normal;
        self.state.admin.notice = Some(format!("Saved {}", resource.noun()));
        self.reload_admin(resource)
    }

    pub fn on_deleted(&mut self, resource: Resource, id: u64) -> Option<NetworkRequest> {
        self.state.admin.notice = Some(format!("Deleted {} #{id}", resource.noun()));
        self.reload_admin(resource)
    }

    fn reload_admin(&self, resource: Resource) -> Option<NetworkRequest> {
        (self.state.admin.resource == resource).then_some(NetworkRequest::LoadCollection { resource })
    }

    /// Route a failure message to the view that made the request.
    pub fn on_request_failed(&mut self, request: NetworkRequest, message: String) {
        let state = &mut self.state;
        match request {
            NetworkRequest::LoadDashboard => state.dashboard.failed(message),
            NetworkRequest::LoadFixtures => state.fixtures.remote.failed(message),
            NetworkRequest::LoadStandings => state.rankings.remote.failed(message),
            NetworkRequest::LoadRosters => state.rosters.remote.failed(message),
            NetworkRequest::LoadNews => state.news.remote.failed(message),
            NetworkRequest::LoadCollection { resource } => {
                if state.admin.resource == resource {
                    state.admin.remote.failed(message);
                }
            }
            NetworkRequest::LoadFormOptions => state.admin.notice = Some(message),
            NetworkRequest::LoadRecord { resource, id } => {
                if state.editor.as_ref().is_some_and(|e| e.loading) {
                    state.editor = None;
                    state.input_mode = InputMode::Normal;
                }
                state.admin.notice = Some(format!("Could not open {} #{id}: {message}", resource.noun()));
            }
            NetworkRequest::Save { .. } => match state.editor.as_mut() {
                Some(editor) => editor.form.finish(Err(message)),
                None => state.admin.notice = Some(message),
            },
            NetworkRequest::Delete { .. } => state.admin.notice = Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handball_api::{Record, Team};

    fn admin_app(resource: Resource) -> App {
        let mut app = App::new(AppSettings::default());
        app.update_tab(MenuItem::Admin);
        app.state.admin.switch_to(resource);
        app
    }

    #[test]
    fn switching_tab_asks_for_its_data() {
        let mut app = App::new(AppSettings::default());
        assert_eq!(app.update_tab(MenuItem::Fixtures), Some(NetworkRequest::LoadFixtures));
        assert_eq!(app.update_tab(MenuItem::Fixtures), None);
        assert_eq!(app.update_tab(MenuItem::Help), None);
        app.exit_help();
        assert_eq!(app.state.active_tab, MenuItem::Fixtures);
    }

    #[test]
    fn read_only_collections_refuse_editor() {
        let mut app = admin_app(Resource::Users);
        assert!(app.open_editor(false).is_none());
        assert!(app.state.editor.is_none());
        assert!(app.state.admin.notice.is_some());
    }

    #[test]
    fn failed_save_keeps_form_open_with_message() {
        let mut app = admin_app(Resource::Teams);
        assert_eq!(app.open_editor(false), Some(NetworkRequest::LoadFormOptions));
        {
            let editor = app.state.editor.as_mut().expect("editor open");
            editor.form.set("name", "Sharks".into());
            editor.form.set("league_id", "2".into());
        }
        let request = app.submit_editor().expect("valid team");
        assert!(app.submit_editor().is_none(), "second submit while in flight");

        app.on_request_failed(request, "Failed to save. Please try again.".into());
        let editor = app.state.editor.as_ref().expect("still open");
        assert_eq!(editor.form.submit_error(), Some("Failed to save. Please try again."));
        assert_eq!(editor.form.value("name"), "Sharks");
    }

    #[test]
    fn successful_save_closes_form_and_reloads() {
        let mut app = admin_app(Resource::Teams);
        app.open_editor(false);
        let reload = app.on_saved(Resource::Teams);
        assert!(app.state.editor.is_none());
        assert_eq!(reload, Some(NetworkRequest::LoadCollection { resource: Resource::Teams }));
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut app = admin_app(Resource::Teams);
        app.state.on_collection_loaded(
            Resource::Teams,
            vec![Record::Team(Team { id: 8, name: "Wolves".into(), ..Default::default() })],
        );
        assert!(app.confirm_delete().is_none());
        app.request_delete();
        assert_eq!(
            app.confirm_delete(),
            Some(NetworkRequest::Delete { resource: Resource::Teams, id: 8 })
        );
        assert!(app.state.admin.pending_delete.is_none());
    }

    fn wolves(name: &str) -> Record {
        Record::Team(Team { id: 8, name: name.into(), league_id: Some(2), ..Default::default() })
    }

    #[test]
    fn edit_waits_for_the_server_copy() {
        let mut app = admin_app(Resource::Teams);
        app.state.on_collection_loaded(Resource::Teams, vec![wolves("Wolves")]);
        assert_eq!(app.open_editor(true), Some(NetworkRequest::LoadRecord { resource: Resource::Teams, id: 8 }));
        assert!(app.submit_editor().is_none(), "no submit before the record arrives");

        app.on_record_loaded(wolves("Wolves HC"), FormOptions::default());
        let editor = app.state.editor.as_ref().expect("editor open");
        assert!(!editor.loading);
        assert_eq!(editor.form.value("name"), "Wolves HC");
        assert!(matches!(app.submit_editor(), Some(NetworkRequest::Save { .. })));
    }

    #[test]
    fn record_for_another_row_is_ignored() {
        let mut app = admin_app(Resource::Teams);
        app.state.on_collection_loaded(Resource::Teams, vec![wolves("Wolves")]);
        app.open_editor(true);
        app.on_record_loaded(
            Record::Team(Team { id: 9, name: "Sharks".into(), ..Default::default() }),
            FormOptions::default(),
        );
        let editor = app.state.editor.as_ref().expect("editor open");
        assert!(editor.loading);
        assert_eq!(editor.form.value("name"), "Wolves");
    }

    #[test]
    fn failed_record_load_closes_editor() {
        let mut app = admin_app(Resource::Teams);
        app.state.on_collection_loaded(Resource::Teams, vec![wolves("Wolves")]);
        let request = app.open_editor(true).expect("load request");
        app.on_request_failed(request, "Failed to load data (HTTP 404).".into());
        assert!(app.state.editor.is_none());
        assert_eq!(app.state.input_mode, InputMode::Normal);
        assert_eq!(
            app.state.admin.notice.as_deref(),
            Some("Could not open team #8: Failed to load data (HTTP 404).")
        );
    }

    #[test]
    fn refresh_pauses_while_editing() {
        let mut app = admin_app(Resource::Leagues);
        assert!(app.refresh_request().is_some());
        app.open_editor(false);
        assert!(app.refresh_request().is_none());
    }
}
