use eframe::egui::{self, Stroke};

use crate::board::Board;
use crate::board::graph::{NodeId, WorkspaceId};
use crate::board::task::Task;
use crate::board::workspace::Workspaces;
use crate::theme::Theme;

pub const PANEL_WIDTH: f32 = 320.0;

#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    SwitchWorkspace(WorkspaceId),
    CreateWorkspace(String),
    RenameWorkspace(WorkspaceId, String),
    DeleteWorkspace(WorkspaceId),
    AddTask { title: String, content: String },
    ToggleTask(NodeId),
    DeleteTask(NodeId),
    FocusTask(NodeId),
    ToggleTheme,
}

impl PanelAction {
    /// Changes the open board rather than the workspace list or the window.
    pub fn edits_board(&self) -> bool {
        matches!(
            self,
            PanelAction::AddTask { .. }
                | PanelAction::ToggleTask(_)
                | PanelAction::DeleteTask(_)
                | PanelAction::FocusTask(_)
        )
    }
}

/// Text typed into the panel that has not been submitted yet.
#[derive(Debug, Default)]
pub struct PanelState {
    pub new_task_title: String,
    pub new_task_content: String,
    /// `Some` while the "new workspace" field is open.
    pub new_workspace: Option<String>,
    pub renaming: Option<(WorkspaceId, String)>,
}

impl PanelState {
    /// The new task, if its title is not blank. Clears both fields on success.
    pub fn take_new_task(&mut self) -> Option<PanelAction> {
        if self.new_task_title.trim().is_empty() {
            return None;
        }
        Some(PanelAction::AddTask {
            title: std::mem::take(&mut self.new_task_title),
            content: std::mem::take(&mut self.new_task_content),
        })
    }

    pub fn take_new_workspace(&mut self) -> Option<PanelAction> {
        let title = self.new_workspace.take()?;
        if title.trim().is_empty() {
            return None;
        }
        Some(PanelAction::CreateWorkspace(title.trim().to_string()))
    }

    /// Blank titles just close the editor.
    pub fn take_rename(&mut self) -> Option<PanelAction> {
        let (id, title) = self.renaming.take()?;
        if title.trim().is_empty() {
            return None;
        }
        Some(PanelAction::RenameWorkspace(id, title.trim().to_string()))
    }
}

pub fn show(
    ui: &mut egui::Ui,
    state: &mut PanelState,
    workspaces: &Workspaces,
    board: &Board,
    saving: bool,
    theme: &Theme,
) -> Vec<PanelAction> {
    let mut actions = Vec::new();

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        ui.heading(egui::RichText::new("Pinboard").strong().color(theme.foreground));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let icon = if theme.is_dark() { "☀" } else { "🌙" };
            if ui.small_button(icon).on_hover_text("Toggle dark mode").clicked() {
                actions.push(PanelAction::ToggleTheme);
            }
        });
    });
    let status = if saving { "Saving…" } else { "All changes saved" };
    ui.label(egui::RichText::new(status).small().color(theme.muted));
    ui.add_space(8.0);

    workspace_section(ui, state, workspaces, theme, &mut actions);
    ui.separator();
    new_task_section(ui, state, &mut actions);
    ui.separator();
    task_list(ui, board, theme, &mut actions);
    actions
}

fn section_label(ui: &mut egui::Ui, text: &str, theme: &Theme) {
    ui.label(egui::RichText::new(text).small().strong().color(theme.muted));
}

fn workspace_section(
    ui: &mut egui::Ui,
    state: &mut PanelState,
    workspaces: &Workspaces,
    theme: &Theme,
    actions: &mut Vec<PanelAction>,
) {
    section_label(ui, "WORKSPACES", theme);
    egui::ScrollArea::vertical()
        .id_salt("workspace-list")
        .max_height(180.0)
        .show(ui, |ui| {
            for workspace in workspaces.list() {
                let active = workspace.id == workspaces.active_id();
                ui.horizontal(|ui| {
                    if let Some((id, title)) = &mut state.renaming {
                        if *id == workspace.id {
                            let response = ui.add(
                                egui::TextEdit::singleline(title).desired_width(180.0),
                            );
                            // Leaving the field saves, like pressing Enter.
                            let escape = ui.input(|i| i.key_pressed(egui::Key::Escape));
                            if escape {
                                state.renaming = None;
                            } else if ui.small_button("✔").clicked() || response.lost_focus() {
                                actions.extend(state.take_rename());
                            } else if !response.has_focus() {
                                response.request_focus();
                            }
                            return;
                        }
                    }

                    let label = egui::RichText::new(&workspace.title).color(if active {
                        theme.accent
                    } else {
                        theme.foreground
                    });
                    if ui.selectable_label(active, label).clicked() && !active {
                        actions.push(PanelAction::SwitchWorkspace(workspace.id.clone()));
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("🗑").on_hover_text("Delete workspace").clicked() {
                            actions.push(PanelAction::DeleteWorkspace(workspace.id.clone()));
                        }
                        if ui.small_button("✏").on_hover_text("Rename workspace").clicked() {
                            state.renaming = Some((workspace.id.clone(), workspace.title.clone()));
                        }
                    });
                });
            }
        });

    match &mut state.new_workspace {
        Some(title) => {
            let mut submit = false;
            let mut cancel = false;
            ui.horizontal(|ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(title)
                        .hint_text("Workspace name...")
                        .desired_width(180.0),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit = true;
                }
                if ui.small_button("✔").clicked() {
                    submit = true;
                }
                if ui.small_button("✕").clicked() || ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    cancel = true;
                }
            });
            if cancel {
                state.new_workspace = None;
            } else if submit {
                actions.extend(state.take_new_workspace());
            }
        }
        None => {
            if ui
                .add(egui::Button::new("+ New workspace").min_size(egui::vec2(ui.available_width(), 0.0)))
                .clicked()
            {
                state.new_workspace = Some(String::new());
            }
        }
    }
}

fn new_task_section(ui: &mut egui::Ui, state: &mut PanelState, actions: &mut Vec<PanelAction>) {
    let title = ui.add(
        egui::TextEdit::singleline(&mut state.new_task_title)
            .hint_text("Add a task...")
            .desired_width(f32::INFINITY),
    );
    let title_submitted = title.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

    let content = ui.add(
        egui::TextEdit::multiline(&mut state.new_task_content)
            .hint_text("Description (optional)")
            .desired_rows(3)
            .desired_width(f32::INFINITY),
    );
    let content_submitted =
        content.has_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter) && i.modifiers.command);

    let button = egui::Button::new("+ Add task").min_size(egui::vec2(ui.available_width(), 28.0));
    if ui.add(button).clicked() || title_submitted || content_submitted {
        actions.extend(state.take_new_task());
    }
}

fn task_list(ui: &mut egui::Ui, board: &Board, theme: &Theme, actions: &mut Vec<PanelAction>) {
    egui::ScrollArea::vertical()
        .id_salt("task-list")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if board.tasks().is_empty() {
                ui.label(
                    egui::RichText::new("No tasks yet. Double-click the canvas to add a card.")
                        .color(theme.muted),
                );
            }
            for task in board.tasks() {
                task_row(ui, task, board.selected() == Some(task.id.as_str()), theme, actions);
                ui.add_space(6.0);
            }
        });
}

fn task_row(
    ui: &mut egui::Ui,
    task: &Task,
    selected: bool,
    theme: &Theme,
    actions: &mut Vec<PanelAction>,
) {
    let border = if selected { theme.accent } else { theme.panel_border };
    egui::Frame::new()
        .fill(theme.panel_background)
        .stroke(Stroke::new(1.0, border))
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::same(8))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                let mut completed = task.completed;
                if ui.checkbox(&mut completed, "").changed() {
                    actions.push(PanelAction::ToggleTask(task.id.clone()));
                }

                let mut title = egui::RichText::new(&task.title).strong();
                title = if task.completed {
                    title.strikethrough().color(theme.muted)
                } else {
                    title.color(theme.foreground)
                };
                let response = ui
                    .add(egui::Label::new(title).sense(egui::Sense::click()).truncate())
                    .on_hover_text("Show on the board");
                if response.clicked() {
                    actions.push(PanelAction::FocusTask(task.id.clone()));
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("🗑").on_hover_text("Delete task and card").clicked() {
                        actions.push(PanelAction::DeleteTask(task.id.clone()));
                    }
                });
            });

            if !task.content.is_empty() {
                ui.add(
                    egui::Label::new(egui::RichText::new(&task.content).small().color(theme.muted))
                        .truncate(),
                );
            }
            let stamp = match &task.completed_at {
                Some(done) => format!("Created {}  ·  Done {}", task.created_at, done),
                None => format!("Created {}", task.created_at),
            };
            ui.label(egui::RichText::new(stamp).small().color(theme.muted));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_task_title_is_not_submitted() {
        let mut state = PanelState {
            new_task_title: "   ".to_string(),
            new_task_content: "notes".to_string(),
            ..PanelState::default()
        };
        assert_eq!(state.take_new_task(), None);
        assert_eq!(state.new_task_content, "notes");
    }

    #[test]
    fn submitted_task_clears_fields() {
        let mut state = PanelState {
            new_task_title: "Write report".to_string(),
            new_task_content: "by Friday".to_string(),
            ..PanelState::default()
        };
        assert_eq!(
            state.take_new_task(),
            Some(PanelAction::AddTask {
                title: "Write report".to_string(),
                content: "by Friday".to_string(),
            })
        );
        assert!(state.new_task_title.is_empty() && state.new_task_content.is_empty());
    }

    #[test]
    fn workspace_editors_close_on_submit() {
        let mut state = PanelState {
            new_workspace: Some("  Roadmap ".to_string()),
            renaming: Some(("ws-1".to_string(), " ".to_string())),
            ..PanelState::default()
        };
        assert_eq!(
            state.take_new_workspace(),
            Some(PanelAction::CreateWorkspace("Roadmap".to_string()))
        );
        assert!(state.new_workspace.is_none());

        // A blank rename closes the editor without renaming.
        assert_eq!(state.take_rename(), None);
        assert!(state.renaming.is_none());
    }
}
