use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use eframe::egui;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::board::Board;
use crate::board::edges::RouteCache;
use crate::board::geometry::{Point, Size, Viewport};
use crate::board::graph::WorkspaceId;
use crate::board::interaction::{BoardKey, InteractionSession, PointerTarget, ZoomCommand};
use crate::board::minimap::MinimapProjection;
use crate::board::workspace::{DeleteOutcome, WorkspaceData, Workspaces};
use crate::commands::Context;
use crate::render::canvas::{self, CardEdit};
use crate::render::image_cache::{ImageCache, png_data_url};
use crate::render::panel::{self, PANEL_WIDTH, PanelAction, PanelState};
use crate::render::toolbars::{self, ToolbarAction};
use crate::render::{self, CanvasTransform};
use crate::store::autosave::{Autosaver, ChangeTracker, WorkspaceSnapshot};
use crate::store::{self, BoardStore, JsonStore, StoreResult};
use crate::theme::Theme;

/// How often to look at pending background work while nothing else wakes the UI.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

type LoadResult = (WorkspaceId, anyhow::Result<WorkspaceData>);
type PasteResult = anyhow::Result<Option<String>>;

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        let duration = 2.5;
        let fade_start = 2.0;
        if elapsed < fade_start {
            1.0
        } else if elapsed < duration {
            1.0 - (elapsed - fade_start) / (duration - fade_start)
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= 2.5
    }
}

/// Raw input for one frame, collected inside `ctx.input` and acted on afterwards.
#[derive(Default)]
struct FrameInput {
    pressed: Option<egui::Pos2>,
    pointer: Option<egui::Pos2>,
    released: bool,
    double_clicked: Option<egui::Pos2>,
    scroll: egui::Vec2,
    alt: bool,
    keys: Vec<BoardKey>,
    paste: bool,
    close_requested: bool,
}

impl FrameInput {
    fn read(i: &egui::InputState, typing: bool) -> Self {
        let mut input = FrameInput {
            pointer: i.pointer.latest_pos(),
            released: i.pointer.primary_released(),
            scroll: i.raw_scroll_delta,
            alt: i.modifiers.alt,
            close_requested: i.viewport().close_requested(),
            ..FrameInput::default()
        };
        if i.pointer.primary_pressed() {
            input.pressed = i.pointer.press_origin();
        }
        if i.pointer.button_double_clicked(egui::PointerButton::Primary) {
            input.double_clicked = i.pointer.interact_pos();
        }

        if i.key_pressed(egui::Key::Escape) {
            input.keys.push(BoardKey::Escape);
        }
        if i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace) {
            input.keys.push(BoardKey::Delete);
        }
        if i.modifiers.alt {
            if i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals) {
                input.keys.push(BoardKey::Zoom(ZoomCommand::In));
            }
            if i.key_pressed(egui::Key::Minus) {
                input.keys.push(BoardKey::Zoom(ZoomCommand::Out));
            }
            if i.key_pressed(egui::Key::Num0) {
                input.keys.push(BoardKey::Zoom(ZoomCommand::Reset));
            }
        }

        // Text pastes into a focused field are the field's business.
        input.paste = !typing
            && i.events.iter().any(|e| match e {
                egui::Event::Paste(_) => true,
                egui::Event::Key {
                    key: egui::Key::V,
                    pressed: true,
                    modifiers,
                    ..
                } => modifiers.command,
                _ => false,
            });
        input
    }
}

/// Everything the widgets asked for during one frame.
#[derive(Default)]
struct FrameActions {
    card_edits: Vec<CardEdit>,
    toolbar: Vec<ToolbarAction>,
    panel: Vec<PanelAction>,
    recentered: Option<Viewport>,
}

struct BoardApp {
    board: Board,
    workspaces: Workspaces,
    store: Arc<JsonStore>,
    runtime: tokio::runtime::Handle,
    autosaver: Autosaver,
    changes: ChangeTracker,
    routes: RouteCache,
    minimap: MinimapProjection,
    images: ImageCache,
    panel: PanelState,
    theme: Theme,
    toast: Option<Toast>,
    loading: Option<oneshot::Receiver<LoadResult>>,
    pasting: Option<oneshot::Receiver<PasteResult>>,
    closing: bool,
}

impl BoardApp {
    fn new(
        board: Board,
        workspaces: Workspaces,
        store: Arc<JsonStore>,
        runtime: tokio::runtime::Handle,
        autosaver: Autosaver,
        autosave_delay: Duration,
        theme: Theme,
    ) -> Self {
        let changes = ChangeTracker::new(autosave_delay, board.revision());
        Self {
            board,
            workspaces,
            store,
            runtime,
            autosaver,
            changes,
            routes: RouteCache::new(),
            minimap: MinimapProjection::default(),
            images: ImageCache::new(),
            panel: PanelState::default(),
            theme,
            toast: None,
            loading: None,
            pasting: None,
            closing: false,
        }
    }

    fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            workspace_id: self.board.workspace_id().to_string(),
            data: self.board.snapshot(),
            workspaces: self.workspaces.list().to_vec(),
        }
    }

    /// Queue the current board right away instead of waiting for the debounce.
    fn save_now(&mut self) {
        self.changes.take_pending();
        self.autosaver.save(self.snapshot());
    }

    fn poll_autosave(&mut self, ctx: &egui::Context) {
        // The board on screen is being replaced; nothing of it may be written back.
        if self.loading.is_some() {
            return;
        }
        let now = Instant::now();
        if self.changes.poll(self.board.revision(), now) {
            self.autosaver.save(self.snapshot());
        }
        if let Some(remaining) = self.changes.remaining(now) {
            ctx.request_repaint_after(remaining);
        }
    }

    /// Run a store update after everything already queued has been written.
    fn persist<F>(&self, what: &'static str, job: F)
    where
        F: Future<Output = StoreResult<()>> + Send + 'static,
    {
        let saver = self.autosaver.clone();
        self.runtime.spawn(async move {
            saver.flush().await;
            if let Err(e) = job.await {
                warn!(error = %e, "{what} failed");
            }
        });
    }

    fn remember_active_workspace(&self) {
        let store = self.store.clone();
        let id = self.workspaces.active_id().to_string();
        self.persist("Remembering the active workspace", async move {
            store.set_current_workspace_id(&id).await
        });
    }

    fn persist_workspace_list(&self) {
        let store = self.store.clone();
        let list = self.workspaces.list().to_vec();
        self.persist("Saving the workspace list", async move {
            store.save_workspace_list(&list).await
        });
    }

    fn install(&mut self, id: WorkspaceId, data: WorkspaceData) {
        self.board.replace(id, data);
        self.changes.reset(self.board.revision());
        self.routes = RouteCache::new();
        self.images.clear();
        info!(workspace = %self.board.workspace_id(), "Workspace opened");
    }

    /// Load `id` in the background once pending saves are on disk.
    fn start_load(&mut self, id: WorkspaceId) {
        let (tx, rx) = oneshot::channel();
        let store = self.store.clone();
        let saver = self.autosaver.clone();
        self.runtime.spawn(async move {
            saver.flush().await;
            let result = store
                .load_workspace_data(&id)
                .await
                .with_context(|| format!("Failed to load workspace {id}"));
            let _ = tx.send((id, result));
        });
        self.loading = Some(rx);
    }

    fn poll_load(&mut self) {
        let Some(rx) = &mut self.loading else {
            return;
        };
        match rx.try_recv() {
            Ok((id, Ok(data))) => {
                self.loading = None;
                if id == self.workspaces.active_id() {
                    self.install(id, data);
                }
            }
            Ok((_, Err(e))) => {
                self.loading = None;
                warn!(error = %e, "Workspace load failed");
                let current = self.board.workspace_id().to_string();
                self.workspaces.set_active(&current);
                self.toast = Some(Toast::new("Could not open that workspace"));
            }
            Err(oneshot::error::TryRecvError::Empty) => {}
            Err(oneshot::error::TryRecvError::Closed) => self.loading = None,
        }
    }

    fn switch_workspace(&mut self, id: &str) {
        if id == self.board.workspace_id() || !self.workspaces.set_active(id) {
            return;
        }
        self.save_now();
        self.changes.reset(self.board.revision());
        self.remember_active_workspace();
        self.start_load(id.to_string());
    }

    fn create_workspace(&mut self, title: &str) {
        self.save_now();
        let workspace = self.workspaces.create(title);
        self.persist_workspace_list();
        self.remember_active_workspace();
        self.install(workspace.id, WorkspaceData::default());
    }

    fn delete_workspace(&mut self, id: &str) {
        match self.workspaces.delete(id) {
            DeleteOutcome::LastWorkspace => {
                self.toast = Some(Toast::new("At least one workspace must remain"));
            }
            DeleteOutcome::Unknown => {}
            DeleteOutcome::Deleted { switch_to } => {
                if switch_to.is_none() {
                    self.save_now();
                } else {
                    // The open board is gone; nothing of it may be written back.
                    self.changes.reset(self.board.revision());
                }
                let store = self.store.clone();
                let deleted = id.to_string();
                let list = self.workspaces.list().to_vec();
                self.persist("Deleting a workspace", async move {
                    store.delete_workspace_data(&deleted).await?;
                    store.save_workspace_list(&list).await
                });
                if let Some(next) = switch_to {
                    self.remember_active_workspace();
                    self.start_load(next);
                }
            }
        }
    }

    fn start_paste(&mut self) {
        if self.pasting.is_some() {
            return;
        }
        let (tx, rx) = oneshot::channel();
        self.runtime.spawn_blocking(move || {
            let _ = tx.send(read_clipboard_image());
        });
        self.pasting = Some(rx);
    }

    /// The clipboard result stays in the channel until the board can take a new card.
    fn poll_paste(&mut self) {
        if self.loading.is_some() || !self.board.session().is_idle() {
            return;
        }
        let Some(rx) = &mut self.pasting else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.pasting = None;
                return;
            }
        };
        self.pasting = None;
        match result {
            Ok(Some(data_url)) => {
                if let Some(id) = self.board.paste_image(data_url) {
                    debug!(node = %id, "Pasted image card");
                }
            }
            Ok(None) => self.toast = Some(Toast::new("No image on the clipboard")),
            Err(e) => {
                warn!(error = %e, "Image paste failed");
                self.toast = Some(Toast::new("Could not paste the image"));
            }
        }
    }

    /// Apply what the widgets reported this frame. While a switch is loading, the board
    /// on screen is about to be replaced, so edits to it are dropped.
    fn apply_actions(&mut self, actions: FrameActions) {
        if self.loading.is_none() {
            for edit in actions.card_edits {
                self.apply_card_edit(edit);
            }
            for action in actions.toolbar {
                self.apply_toolbar(action);
            }
            if let Some(viewport) = actions.recentered {
                self.board.set_viewport(viewport);
            }
        }
        for action in actions.panel {
            if self.loading.is_some() && action.edits_board() {
                debug!(?action, "Ignored while a workspace loads");
                continue;
            }
            self.apply_panel(action);
        }
    }

    fn apply_panel(&mut self, action: PanelAction) {
        match action {
            PanelAction::SwitchWorkspace(id) => self.switch_workspace(&id),
            PanelAction::CreateWorkspace(title) => self.create_workspace(&title),
            PanelAction::RenameWorkspace(id, title) => {
                if self.workspaces.rename(&id, &title) {
                    self.persist_workspace_list();
                }
            }
            PanelAction::DeleteWorkspace(id) => self.delete_workspace(&id),
            PanelAction::AddTask { title, content } => {
                self.board.add_task(&title, &content);
            }
            PanelAction::ToggleTask(id) => {
                self.board.toggle_task(&id);
            }
            PanelAction::DeleteTask(id) => {
                self.board.delete_task(&id);
            }
            PanelAction::FocusTask(id) => {
                self.board.select_and_center(&id);
            }
            PanelAction::ToggleTheme => self.theme = self.theme.toggled(),
        }
    }

    fn apply_toolbar(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::Zoom(command) => self.board.zoom(command),
            ToolbarAction::PasteImage => self.start_paste(),
            ToolbarAction::StartConnecting(id) => self.board.start_connecting(&id),
            ToolbarAction::ResetSize(id) => self.board.reset_node_size(&id),
            ToolbarAction::DeleteNode(id) => {
                self.board.delete_node(&id);
            }
            ToolbarAction::SetColor(id, color) => self.board.set_color(&id, &color),
            ToolbarAction::UpdateEdge(id, patch) => self.board.update_edge(&id, patch),
            ToolbarAction::DeleteEdge(id) => self.board.remove_edge(&id),
            ToolbarAction::CloseEdgeToolbar => self.board.clear_selection(),
        }
    }

    fn apply_card_edit(&mut self, edit: CardEdit) {
        match edit {
            CardEdit::Title(id, title) => self.board.set_title(&id, &title),
            CardEdit::Content(id, content) => self.board.set_content(&id, &content),
        }
    }

    /// Feed this frame's pointer, wheel and key events into the board.
    fn handle_canvas_input(
        &mut self,
        ctx: &egui::Context,
        canvas: egui::Rect,
        input: &FrameInput,
        typing: bool,
    ) {
        // Floating toolbars and the minimap live on their own layers.
        let on_canvas = |pos: egui::Pos2| {
            canvas.contains(pos)
                && ctx
                    .layer_id_at(pos)
                    .is_none_or(|layer| layer.order == egui::Order::Background)
        };
        let transform = CanvasTransform::new(canvas.min, self.board.viewport());

        if let Some(pos) = input.pressed.filter(|p| on_canvas(*p)) {
            let target = render::resolve_target(&self.board, &self.routes, transform.to_world(pos));
            self.board.pointer_down(transform.local(pos), target);
        }
        if let Some(pos) = input.pointer {
            if !self.board.session().is_idle() {
                self.board.pointer_move(transform.local(pos));
            }
        }
        if input.released {
            self.board.pointer_up();
        }
        if let Some(pos) = input.double_clicked.filter(|p| on_canvas(*p)) {
            let target = render::resolve_target(&self.board, &self.routes, transform.to_world(pos));
            if target == PointerTarget::Canvas {
                self.board.double_click_canvas(transform.local(pos));
            }
        }

        let hovering = input.pointer.is_some_and(on_canvas);
        if hovering && input.scroll != egui::Vec2::ZERO {
            // egui reports scroll as content movement; the board expects wheel deltas.
            self.board.wheel(
                Point::new(-input.scroll.x as f64, -input.scroll.y as f64),
                input.alt,
            );
        }

        for key in &input.keys {
            self.board.key_down(*key, typing);
        }
        if input.paste {
            self.start_paste();
        }

        let cursor = match self.board.session() {
            InteractionSession::PanningCanvas { .. } | InteractionSession::DraggingNode { .. } => {
                Some(egui::CursorIcon::Grabbing)
            }
            InteractionSession::ResizingNode { .. } => Some(egui::CursorIcon::ResizeNwSe),
            InteractionSession::Connecting { .. } => Some(egui::CursorIcon::Crosshair),
            InteractionSession::Idle => None,
        };
        if let Some(cursor) = cursor {
            ctx.set_cursor_icon(cursor);
        }
    }

    fn draw_toast(&self, ui: &egui::Ui, rect: egui::Rect) {
        let Some(toast) = &self.toast else {
            return;
        };
        let opacity = toast.opacity();
        if opacity <= 0.0 {
            return;
        }
        let toast_color = Theme::with_opacity(self.theme.foreground, opacity);
        let toast_bg = Theme::with_opacity(self.theme.toolbar_background, opacity * 0.95);
        let galley = ui.painter().layout_no_wrap(
            toast.message.clone(),
            egui::FontId::proportional(16.0),
            toast_color,
        );
        let padding = 12.0;
        let toast_rect = egui::Rect::from_min_size(
            egui::pos2(
                rect.center().x - galley.rect.width() / 2.0 - padding,
                rect.bottom() - 80.0,
            ),
            egui::vec2(
                galley.rect.width() + padding * 2.0,
                galley.rect.height() + padding * 2.0,
            ),
        );
        ui.painter().rect_filled(toast_rect, 8.0, toast_bg);
        ui.painter().rect_stroke(
            toast_rect,
            8.0,
            egui::Stroke::new(1.0, Theme::with_opacity(self.theme.panel_border, opacity)),
            egui::StrokeKind::Outside,
        );
        let text_pos = egui::pos2(toast_rect.left() + padding, toast_rect.top() + padding);
        ui.painter().galley(text_pos, galley, toast_color);
        ui.ctx().request_repaint();
    }
}

impl eframe::App for BoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_load();
        self.poll_paste();
        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }
        if self.loading.is_some() || self.pasting.is_some() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
        ctx.set_visuals(if self.theme.is_dark() {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        let typing = ctx.wants_keyboard_input();
        let input = ctx.input(|i| FrameInput::read(i, typing));

        let panel_actions = egui::SidePanel::left("workspace-panel")
            .exact_width(PANEL_WIDTH)
            .resizable(false)
            .frame(
                egui::Frame::new()
                    .fill(self.theme.panel_background)
                    .inner_margin(egui::Margin::symmetric(16, 8)),
            )
            .show(ctx, |ui| {
                panel::show(
                    ui,
                    &mut self.panel,
                    &self.workspaces,
                    &self.board,
                    self.changes.is_dirty(),
                    &self.theme,
                )
            })
            .inner;

        let bg = self.theme.background;
        let mut card_edits = Vec::new();
        let mut canvas_rect = egui::Rect::ZERO;

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                canvas_rect = rect;
                self.board
                    .set_canvas_size(Size::new(rect.width() as f64, rect.height() as f64));

                if self.loading.is_none() {
                    self.handle_canvas_input(ctx, rect, &input, typing);
                }

                let transform = CanvasTransform::new(rect.min, self.board.viewport());
                let painter = ui.painter_at(rect);
                painter.rect_filled(rect, 0.0, bg);
                canvas::draw_grid(&painter, rect, &transform, &self.theme);

                let routes = self.routes.refresh(&self.board);
                render::edges::draw_edges(
                    &painter,
                    routes,
                    self.board.selected_edge(),
                    &transform,
                    &self.theme,
                );
                if let Some((from, to)) = self.board.connecting_line() {
                    render::edges::draw_connecting_line(&painter, from, to, &transform, &self.theme);
                }

                ui.set_clip_rect(rect);
                card_edits = canvas::draw_cards(ui, &self.board, &transform, &self.theme, &self.images);
                self.draw_toast(ui, rect);
            });

        let transform = CanvasTransform::new(canvas_rect.min, self.board.viewport());
        let mut toolbar_actions = Vec::new();
        toolbars::zoom_toolbar(
            ctx,
            canvas_rect,
            self.board.viewport().scale,
            &self.theme,
            &mut toolbar_actions,
        );
        toolbars::node_toolbar(ctx, &self.board, &transform, &self.theme, &mut toolbar_actions);
        toolbars::edge_toolbar(
            ctx,
            &self.board,
            self.routes.routes(),
            &transform,
            &self.theme,
            &mut toolbar_actions,
        );
        let recentered = render::minimap::show(ctx, canvas_rect, &self.board, &self.minimap, &self.theme);

        self.apply_actions(FrameActions {
            card_edits,
            toolbar: toolbar_actions,
            panel: panel_actions,
            recentered,
        });
        let graph = self.board.graph();
        self.images.retain(|id| graph.contains_node(id));

        if input.close_requested && !self.closing {
            self.closing = true;
            // A half-loaded switch has nothing trustworthy to write.
            if self.loading.is_none() {
                self.save_now();
            }
            info!("Closing; final save queued");
        } else {
            self.poll_autosave(ctx);
        }
    }
}

fn read_clipboard_image() -> PasteResult {
    let mut clipboard = arboard::Clipboard::new().context("Clipboard is unavailable")?;
    match clipboard.get_image() {
        Ok(image) => {
            let data_url = png_data_url(
                image.width as u32,
                image.height as u32,
                image.bytes.into_owned(),
            )?;
            Ok(Some(data_url))
        }
        Err(arboard::Error::ContentNotAvailable) => Ok(None),
        Err(e) => Err(e).context("Failed to read the clipboard"),
    }
}

pub fn run(ctx: Context, workspace: Option<String>, fullscreen: bool) -> anyhow::Result<()> {
    let preferred = workspace.or_else(|| ctx.config.start_workspace().map(str::to_string));
    let (workspaces, data) = ctx.runtime.block_on(async {
        let store = ctx.store();
        let workspaces = store::open_workspaces(store, preferred.as_deref()).await?;
        let data = store.load_workspace_data(workspaces.active_id()).await?;
        store.set_current_workspace_id(workspaces.active_id()).await?;
        anyhow::Ok((workspaces, data))
    })?;
    info!(
        workspace = %workspaces.active().title,
        workspaces = workspaces.list().len(),
        "Opening board"
    );

    let shared: Arc<dyn BoardStore> = ctx.store.clone();
    let autosaver = Autosaver::spawn(ctx.runtime.handle(), shared);
    let board = Board::new(workspaces.active_id().to_string(), data);
    let app = BoardApp::new(
        board,
        workspaces,
        ctx.store.clone(),
        ctx.runtime.handle().clone(),
        autosaver.clone(),
        ctx.config.autosave_delay(),
        Theme::from_name(ctx.config.theme()),
    );

    let title = "Pinboard";
    let windowed = !fullscreen && ctx.config.windowed();
    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 500.0])
            .with_title(title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(title)
    };

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let result = eframe::run_native(title, options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("{e}"));

    // The window is gone; make sure the last snapshot reaches the disk before exiting.
    ctx.runtime.block_on(autosaver.flush());
    debug!("Autosave queue drained");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app(dir: &std::path::Path, autosave_delay: Duration) -> BoardApp {
        let store = Arc::new(JsonStore::new(dir));
        let shared: Arc<dyn BoardStore> = store.clone();
        let runtime = tokio::runtime::Handle::current();
        let autosaver = Autosaver::spawn(&runtime, shared);
        let workspaces = Workspaces::from_stored(Vec::new(), None);
        let board = Board::new(workspaces.active_id().to_string(), WorkspaceData::default());
        BoardApp::new(
            board,
            workspaces,
            store,
            runtime,
            autosaver,
            autosave_delay,
            Theme::dark(),
        )
    }

    fn add_task(title: &str) -> PanelAction {
        PanelAction::AddTask {
            title: title.to_string(),
            content: String::new(),
        }
    }

    #[tokio::test]
    async fn board_edits_wait_for_a_workspace_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path(), Duration::from_secs(1));
        let (_tx, rx) = oneshot::channel();
        app.loading = Some(rx);
        let revision = app.board.revision();

        app.apply_actions(FrameActions {
            panel: vec![add_task("Too early"), PanelAction::ToggleTheme],
            toolbar: vec![ToolbarAction::Zoom(ZoomCommand::In)],
            ..FrameActions::default()
        });
        assert!(app.board.tasks().is_empty());
        assert_eq!(app.board.revision(), revision);
        // Window-level actions still apply.
        assert!(!app.theme.is_dark());

        app.loading = None;
        app.apply_actions(FrameActions {
            panel: vec![add_task("On time")],
            ..FrameActions::default()
        });
        assert_eq!(app.board.tasks().len(), 1);
    }

    #[tokio::test]
    async fn outgoing_board_is_not_autosaved_during_a_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path(), Duration::ZERO);
        let id = app.board.workspace_id().to_string();
        app.board.add_task("Unsaved", "");
        let (_tx, rx) = oneshot::channel();
        app.loading = Some(rx);

        app.poll_autosave(&egui::Context::default());
        app.autosaver.flush().await;
        assert!(app.store.load_workspace_data(&id).await.unwrap().tasks.is_empty());

        app.loading = None;
        app.poll_autosave(&egui::Context::default());
        app.autosaver.flush().await;
        assert_eq!(app.store.load_workspace_data(&id).await.unwrap().tasks.len(), 1);
    }

    #[tokio::test]
    async fn clipboard_image_waits_for_the_gesture_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path(), Duration::from_secs(1));
        let card = app.board.double_click_canvas(Point::new(200.0, 200.0)).unwrap();
        app.board
            .pointer_down(Point::new(200.0, 200.0), PointerTarget::NodeBody(card));

        let (tx, rx) = oneshot::channel();
        tx.send(Ok(Some(png_data_url(1, 1, vec![0; 4]).unwrap()))).unwrap();
        app.pasting = Some(rx);

        app.poll_paste();
        assert_eq!(app.board.graph().node_count(), 1);
        assert!(app.pasting.is_some());

        app.board.pointer_up();
        app.poll_paste();
        assert_eq!(app.board.graph().node_count(), 2);
        assert!(app.pasting.is_none());
        assert!(app.toast.is_none());
    }
}
