use clap::ValueEnum;
use ratatui::widgets::TableState;

use crate::commands::{activity_tasks, cmd_activity_add, cmd_aval_approve, cmd_aval_reject, cmd_letter, DEFAULT_REJECTION_REASON};
use crate::error::Error;
use crate::models::{Activity, ActivityType, Aval, AvalStatus, DocumentType, InternalDocument, Task};
use crate::storage::Store;

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
    Adding,
}

#[derive(PartialEq)]
pub enum ViewMode {
    Activities,
    Tasks,
    Avales,
    Documents,
}

#[derive(PartialEq)]
pub enum InputField {
    None,
    RejectReason,
}

pub struct App {
    pub store: Store,
    pub activities: Vec<Activity>,
    pub tasks: Vec<Task>,
    pub avales: Vec<Aval>,
    pub documents: Vec<InternalDocument>,
    pub state: TableState,
    pub task_state: TableState,
    pub aval_state: TableState,
    pub document_state: TableState,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    pub target_id: Option<u64>,
    /// Activity whose tasks are shown in the Tasks view.
    pub task_activity: Option<Activity>,
    pub add_state: AddState,
    /// Last action result or error, shown above the help line.
    pub status: Option<String>,
}

/// State for the multi-step "Add Activity" wizard.
#[derive(Default)]
pub struct AddState {
    pub title: String,
    pub kind: Option<ActivityType>,
    pub date: String,
    pub step: usize, // 0: Title, 1: Type, 2: Date, 3: Hours
}

fn select_next(state: &mut TableState, len: usize) {
    if len == 0 { return; }
    let i = match state.selected() {
        Some(i) if i + 1 < len => i + 1,
        _ => 0,
    };
    state.select(Some(i));
}

fn select_previous(state: &mut TableState, len: usize) {
    if len == 0 { return; }
    let i = match state.selected() {
        Some(0) | None => len - 1,
        Some(i) => i - 1,
    };
    state.select(Some(i));
}

fn clamp_selection(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
    } else if let Some(i) = state.selected() {
        if i >= len {
            state.select(Some(len - 1));
        }
    } else {
        state.select(Some(0));
    }
}

impl App {
    /// Creates a new App instance and loads initial data.
    pub fn new(store: Store) -> App {
        let mut app = App {
            store,
            activities: Vec::new(),
            tasks: Vec::new(),
            avales: Vec::new(),
            documents: Vec::new(),
            state: TableState::default(),
            task_state: TableState::default(),
            aval_state: TableState::default(),
            document_state: TableState::default(),
            view_mode: ViewMode::Activities,
            input_mode: InputMode::Normal,
            input_field: InputField::None,
            input_buffer: String::new(),
            target_id: None,
            task_activity: None,
            add_state: AddState::default(),
            status: None,
        };
        app.reload();
        app
    }

    fn report(&mut self, result: Result<String, Error>) {
        match result {
            Ok(msg) => self.status = Some(msg),
            Err(e) => {
                tracing::warn!(error = %e, "dashboard action failed");
                self.status = Some(format!("Error: {}", e));
            }
        }
    }

    fn load(&mut self) -> Result<(), Error> {
        self.activities = self.store.list_recent()?;
        self.avales = self.store.list_recent()?;
        self.documents = self.store.list_recent()?;
        self.tasks = match &self.task_activity {
            Some(a) => activity_tasks(&self.store, a.id)?,
            None => Vec::new(),
        };
        Ok(())
    }

    /// Reloads every collection from storage and refreshes selections.
    pub fn reload(&mut self) {
        if let Err(e) = self.load() {
            self.report(Err(e));
        }

        clamp_selection(&mut self.state, self.activities.len());
        clamp_selection(&mut self.task_state, self.tasks.len());
        clamp_selection(&mut self.aval_state, self.avales.len());
        clamp_selection(&mut self.document_state, self.documents.len());
    }

    /// Selects the next item in the current list.
    pub fn next(&mut self) {
        match self.view_mode {
            ViewMode::Activities => select_next(&mut self.state, self.activities.len()),
            ViewMode::Tasks => select_next(&mut self.task_state, self.tasks.len()),
            ViewMode::Avales => select_next(&mut self.aval_state, self.avales.len()),
            ViewMode::Documents => select_next(&mut self.document_state, self.documents.len()),
        }
    }

    /// Selects the previous item in the current list.
    pub fn previous(&mut self) {
        match self.view_mode {
            ViewMode::Activities => select_previous(&mut self.state, self.activities.len()),
            ViewMode::Tasks => select_previous(&mut self.task_state, self.tasks.len()),
            ViewMode::Avales => select_previous(&mut self.aval_state, self.avales.len()),
            ViewMode::Documents => select_previous(&mut self.document_state, self.documents.len()),
        }
    }

    /// Cycles Activities -> Avales -> Documents. The Tasks view returns to Activities.
    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Activities => ViewMode::Avales,
            ViewMode::Tasks => ViewMode::Activities,
            ViewMode::Avales => ViewMode::Documents,
            ViewMode::Documents => ViewMode::Activities,
        };
    }

    fn selected_activity(&self) -> Option<&Activity> {
        self.state.selected().and_then(|i| self.activities.get(i))
    }

    fn selected_aval(&self) -> Option<&Aval> {
        self.aval_state.selected().and_then(|i| self.avales.get(i))
    }

    /// Shows the tasks generated for the selected activity.
    pub fn open_tasks(&mut self) {
        if self.view_mode != ViewMode::Activities { return; }
        if let Some(a) = self.selected_activity().cloned() {
            self.task_activity = Some(a);
            self.task_state.select(None);
            self.view_mode = ViewMode::Tasks;
            self.reload();
        }
    }

    /// Generates a letter of the given type for the selected activity.
    pub fn letter_selected(&mut self, kind: DocumentType) {
        if self.view_mode != ViewMode::Activities { return; }
        if let Some(id) = self.selected_activity().map(|a| a.id) {
            let result = cmd_letter(&self.store, id, kind, None, true)
                .map(|(doc, _)| format!("Letter '{}' registered (id = {}).", doc.kind, doc.id));
            self.report(result);
            self.reload();
        }
    }

    /// Approves the selected aval.
    pub fn approve_selected(&mut self) {
        if self.view_mode != ViewMode::Avales { return; }
        if let Some(id) = self.selected_aval().map(|a| a.id) {
            let result = cmd_aval_approve(&self.store, id, true)
                .map(|a| format!("Aval {} marked as {}.", a.id, a.status));
            self.report(result);
            self.reload();
        }
    }

    /// Opens the reason prompt for rejecting the selected aval.
    pub fn start_reject(&mut self) {
        if self.view_mode != ViewMode::Avales { return; }
        let Some((id, status)) = self.selected_aval().map(|a| (a.id, a.status)) else { return; };
        if status != AvalStatus::Pendiente {
            self.status = Some(format!("Aval {} is already {}.", id, status));
            return;
        }
        self.target_id = Some(id);
        self.input_mode = InputMode::Editing;
        self.input_field = InputField::RejectReason;
        self.input_buffer = DEFAULT_REJECTION_REASON.to_string();
    }

    /// Initiates the "Add Activity" wizard.
    pub fn start_add(&mut self) {
        if self.view_mode != ViewMode::Activities { return; }
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_field = InputField::None;
        self.input_buffer.clear();
    }

    /// Handles text input based on the current mode.
    pub fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::Editing => self.handle_editing_input(),
            InputMode::Normal => {}
        }
    }

    /// Handles input for the "Add Activity" wizard.
    fn handle_adding_input(&mut self) {
        match self.add_state.step {
            0 => { // Title
                if !self.input_buffer.trim().is_empty() {
                    self.add_state.title = self.input_buffer.clone();
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
            }
            1 => { // Type
                let kind = if self.input_buffer.trim().is_empty() {
                    Some(ActivityType::Diplomado)
                } else {
                    ActivityType::from_str(self.input_buffer.trim(), true).ok()
                };
                if let Some(k) = kind {
                    self.add_state.kind = Some(k);
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
            }
            2 => { // Date
                if !self.input_buffer.trim().is_empty() {
                    self.add_state.date = self.input_buffer.clone();
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
            }
            3 => { // Hours
                let input = self.input_buffer.trim();
                let hours = if input.is_empty() {
                    None
                } else {
                    match input.parse::<f64>() {
                        Ok(h) => Some(h),
                        Err(_) => {
                            // Stay on this step so the value can be corrected.
                            let reason = format!("'{}' is not a number", input);
                            self.report(Err(Error::InvalidInput { field: "hours", reason }));
                            return;
                        }
                    }
                };
                let result = cmd_activity_add(
                    &self.store,
                    self.add_state.title.clone(),
                    self.add_state.kind.unwrap_or(ActivityType::Diplomado),
                    self.add_state.date.clone(),
                    hours,
                    true,
                )
                .map(|(a, tasks)| format!("Activity {} created with {} tasks.", a.id, tasks.len()));
                self.report(result);
                self.cancel_input();
                self.reload();
            }
            _ => {}
        }
    }

    /// Handles input for single-field prompts.
    fn handle_editing_input(&mut self) {
        let target = self.target_id.filter(|_| self.input_field == InputField::RejectReason);
        if let Some(id) = target {
            let result = cmd_aval_reject(&self.store, id, self.input_buffer.clone(), true)
                .map(|a| format!("Aval {} marked as {}.", a.id, a.status));
            self.report(result);
        }
        self.target_id = None;
        self.cancel_input();
        self.reload();
    }
}
