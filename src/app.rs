use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::error::ChatError;
use crate::event::UiAction;
use crate::model::{Model, ModelRegistry};
use crate::session::store::SessionStore;
use crate::session::{Message, Session};
use crate::theme::Theme;
use chrono::Local;
use eframe::egui::{self, Align, Layout, RichText, ScrollArea};
use std::time::Duration;
use tracing::{info, warn};

const NOTICE_SECONDS: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Eq)]
struct EditDraft {
    message_id: String,
    /// Pane the editor was opened from; the same user turn shows in every pane.
    pane: String,
    content: String,
}

pub struct MultiChatApp {
    registry: ModelRegistry,
    store: SessionStore,
    dispatcher: Dispatcher,
    theme: Theme,
    narrow_breakpoint: f32,
    input_buffer: String,
    selected_tab: Option<String>,
    editing: Option<EditDraft>,
    notice: Option<(String, f64)>,
    diagnostics_log: Vec<String>,
}

impl MultiChatApp {
    pub fn new(
        registry: ModelRegistry,
        store: SessionStore,
        dispatcher: Dispatcher,
        narrow_breakpoint: f32,
    ) -> Self {
        Self {
            registry,
            store,
            dispatcher,
            theme: Theme::default(),
            narrow_breakpoint,
            input_buffer: String::new(),
            selected_tab: None,
            editing: None,
            notice: None,
            diagnostics_log: Vec::new(),
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log.push(format!(
            "[{}] {}",
            Local::now().format("%H:%M:%S"),
            message.into()
        ));
    }

    fn report(&mut self, action: &str, error: &ChatError) {
        warn!(action, kind = ?error.kind(), %error, "operation rejected");
        self.log_diagnostic(format!("{action}: {error}"));
    }

    /// Models that get a pane: the current session's dispatch targets.
    fn pane_models(&self) -> Vec<&Model> {
        match self.store.current_session() {
            Some(session) => Dispatcher::target_models(&self.registry, session),
            None => self.registry.active_models(),
        }
    }

    fn apply_action(&mut self, ctx: &egui::Context, action: UiAction) {
        match action {
            UiAction::NewChat => {
                self.store.create_session();
                self.editing = None;
            }
            UiAction::NewChatWithModels(model_ids) => {
                match self
                    .store
                    .create_session_with_models(&self.registry, &model_ids)
                {
                    Ok(_) => self.editing = None,
                    Err(err) => self.report("new chat", &err),
                }
            }
            UiAction::SelectSession(session_id) => {
                match self.store.select_session(&session_id) {
                    Ok(()) => self.editing = None,
                    Err(err) => self.report("select session", &err),
                }
            }
            UiAction::ToggleModel(model_id) => {
                if let Err(err) = self.registry.toggle_active(&model_id) {
                    self.report("toggle model", &err);
                }
            }
            UiAction::SelectTab(model_id) => {
                self.selected_tab = Some(model_id);
            }
            UiAction::Send(content) => {
                if self.pane_models().is_empty() {
                    self.log_diagnostic("no AI models selected; message not sent");
                    return;
                }
                match self
                    .dispatcher
                    .send_message(&self.registry, &mut self.store, &content)
                {
                    Ok(DispatchOutcome::Skipped) => {}
                    Ok(DispatchOutcome::SessionCreated { session_id }) => {
                        self.input_buffer.clear();
                        self.log_diagnostic(format!(
                            "no chat was open; started {session_id} without sending the message"
                        ));
                    }
                    Ok(DispatchOutcome::Sent { .. }) => {
                        self.input_buffer.clear();
                    }
                    Err(err) => self.report("send", &err),
                }
            }
            UiAction::BeginEdit { message_id, pane } => {
                let content = self
                    .store
                    .current_session()
                    .and_then(|session| session.message(&message_id))
                    .filter(|message| message.is_user())
                    .map(|message| message.content.clone());
                match content {
                    Some(content) => {
                        self.editing = Some(EditDraft {
                            message_id,
                            pane,
                            content,
                        });
                    }
                    None => self.log_diagnostic(format!(
                        "edit message: '{message_id}' is not an editable message in this chat"
                    )),
                }
            }
            UiAction::CancelEdit => {
                self.editing = None;
            }
            UiAction::CommitEdit {
                message_id,
                content,
            } => {
                let Some(session_id) = self.store.current_session_id().map(str::to_string) else {
                    self.editing = None;
                    return;
                };
                match self.store.edit_message(&session_id, &message_id, &content) {
                    Ok(()) => self.editing = None,
                    Err(err) => self.report("edit message", &err),
                }
            }
            UiAction::CopyToClipboard(content) => {
                ctx.copy_text(content);
                let expires_at = ctx.input(|i| i.time) + NOTICE_SECONDS;
                self.notice = Some(("Copied to clipboard".to_string(), expires_at));
                ctx.request_repaint_after(Duration::from_secs_f64(NOTICE_SECONDS));
                info!("message copied to clipboard");
            }
        }
    }

    fn render_top_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Multi-AI Chat");
                if let Some(session) = self.store.current_session() {
                    ui.separator();
                    ui.label(RichText::new(&session.title).color(self.theme.text_muted));
                }
            });
        });
    }

    fn render_sidebar(&self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        egui::SidePanel::left("sidebar")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.add_space(self.theme.spacing_8);
                ui.horizontal(|ui| {
                    if ui.button("New Chat").clicked() {
                        actions.push(UiAction::NewChat);
                    }
                    ui.menu_button("More", |ui| {
                        if ui.button("New Chat (All Active)").clicked() {
                            let active = self
                                .registry
                                .active_models()
                                .into_iter()
                                .map(|model| model.id.clone())
                                .collect();
                            actions.push(UiAction::NewChatWithModels(active));
                            ui.close_menu();
                        }
                        ui.separator();
                        for model in self.registry.list_models() {
                            if ui.button(format!("New Chat with {}", model.name)).clicked() {
                                actions.push(UiAction::NewChatWithModels(vec![model.id.clone()]));
                                ui.close_menu();
                            }
                        }
                    });
                });

                ui.separator();
                ui.label(RichText::new("AI Models").small().color(self.theme.text_muted));
                for model in self.registry.list_models() {
                    ui.horizontal(|ui| {
                        ui.colored_label(self.theme.model_accent(model.color), "●");
                        let mut active = model.is_active;
                        if ui.checkbox(&mut active, &model.name).changed() {
                            actions.push(UiAction::ToggleModel(model.id.clone()));
                        }
                    });
                }

                ui.separator();
                ui.label(RichText::new("Chat History").small().color(self.theme.text_muted));
                ScrollArea::vertical()
                    .id_salt("chat_history")
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        if self.store.is_empty() {
                            ui.add_space(self.theme.spacing_16);
                            ui.vertical_centered(|ui| {
                                ui.label(RichText::new("No chat history yet").color(self.theme.text_muted));
                            });
                            return;
                        }

                        let current = self.store.current_session_id();
                        for session in self.store.list_sessions() {
                            let date = session.created_at.with_timezone(&Local).format("%x");
                            let label = format!("{}\n{date}", session.title);
                            let selected = current == Some(session.id.as_str());
                            if ui.selectable_label(selected, label).clicked() {
                                actions.push(UiAction::SelectSession(session.id.clone()));
                            }
                        }
                    });
            });
    }

    fn render_composer(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let now = ctx.input(|i| i.time);
        if self.notice.as_ref().is_some_and(|(_, expires_at)| *expires_at <= now) {
            self.notice = None;
        }

        let has_models = !self.pane_models().is_empty();

        egui::TopBottomPanel::bottom("composer").show(ctx, |ui| {
            ui.add_space(self.theme.spacing_8);
            if let Some((notice, _)) = &self.notice {
                ui.label(RichText::new(notice).color(self.theme.success));
            }

            let composer_id = egui::Id::new("composer_input");
            let focused = ui.memory(|memory| memory.has_focus(composer_id));
            let submit_key = focused
                && has_models
                && ui.input_mut(|input| {
                    !input.modifiers.shift && input.consume_key(egui::Modifiers::NONE, egui::Key::Enter)
                });

            self.theme.composer_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    let send_width = 72.0;
                    ui.add_enabled(
                        has_models,
                        egui::TextEdit::multiline(&mut self.input_buffer)
                            .id(composer_id)
                            .desired_rows(1)
                            .desired_width(ui.available_width() - send_width)
                            .hint_text("Type your message here..."),
                    );

                    let can_send = has_models && !self.input_buffer.trim().is_empty();
                    let clicked = ui
                        .add_enabled(can_send, egui::Button::new("Send"))
                        .clicked();
                    if (clicked || submit_key) && can_send {
                        actions.push(UiAction::Send(self.input_buffer.trim().to_string()));
                    }
                });
            });

            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("diagnostics_log")
                        .max_height(90.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            if self.diagnostics_log.is_empty() {
                                ui.label(RichText::new("Nothing to report").color(self.theme.text_muted));
                            }
                            for entry in &self.diagnostics_log {
                                ui.label(entry);
                            }
                        });
                });
        });
    }

    fn render_chat_area(
        &self,
        ctx: &egui::Context,
        editing: &mut Option<EditDraft>,
        actions: &mut Vec<UiAction>,
    ) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let models = self.pane_models();
            if models.is_empty() {
                ui.vertical_centered(|ui| {
                    ui.add_space(ui.available_height() / 3.0);
                    ui.label(RichText::new("No AI models selected").size(18.0));
                    ui.label(
                        RichText::new(
                            "Please enable at least one AI model from the sidebar to start chatting.",
                        )
                        .color(self.theme.text_muted),
                    );
                });
                return;
            }

            let session = self.store.current_session();

            if ui.available_width() < self.narrow_breakpoint {
                let selected = self
                    .selected_tab
                    .as_deref()
                    .and_then(|id| models.iter().find(|model| model.id == id))
                    .unwrap_or(&models[0]);

                ui.horizontal(|ui| {
                    for model in &models {
                        if ui
                            .selectable_label(model.id == selected.id, &model.name)
                            .clicked()
                        {
                            actions.push(UiAction::SelectTab(model.id.clone()));
                        }
                    }
                });
                ui.separator();
                self.render_pane(ui, selected, session, editing, actions);
                return;
            }

            ui.columns(models.len(), |columns| {
                for (column, model) in columns.iter_mut().zip(&models) {
                    self.theme.pane_header().show(column, |ui| {
                        ui.set_width(ui.available_width());
                        ui.strong(&model.name);
                    });
                    self.render_pane(column, model, session, editing, actions);
                }
            });
        });
    }

    fn render_pane(
        &self,
        ui: &mut egui::Ui,
        model: &Model,
        session: Option<&Session>,
        editing: &mut Option<EditDraft>,
        actions: &mut Vec<UiAction>,
    ) {
        ScrollArea::vertical()
            .id_salt(("pane", model.id.as_str()))
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                let mut shown = 0;
                let model_id = model.id.as_str();
                let messages = session
                    .into_iter()
                    .flat_map(move |session| session.messages_for_model(model_id));
                for message in messages {
                    shown += 1;
                    if message.is_user() {
                        self.render_user_message(ui, model, message, editing, actions);
                    } else {
                        self.render_assistant_message(ui, model, message, actions);
                    }
                    ui.add_space(self.theme.spacing_4);
                }

                if shown == 0 {
                    ui.vertical_centered(|ui| {
                        ui.add_space(ui.available_height() / 3.0);
                        ui.label(RichText::new(format!("Welcome to {}", model.name)).size(16.0));
                        ui.label(
                            RichText::new("Start a conversation by typing a message below.")
                                .color(self.theme.text_muted),
                        );
                    });
                }
            });
    }

    fn render_user_message(
        &self,
        ui: &mut egui::Ui,
        pane: &Model,
        message: &Message,
        editing: &mut Option<EditDraft>,
        actions: &mut Vec<UiAction>,
    ) {
        let max_width = ui.available_width() * 0.8;
        ui.with_layout(Layout::right_to_left(Align::TOP), |ui| {
            self.theme.user_bubble().show(ui, |ui| {
                ui.set_max_width(max_width);
                ui.vertical(|ui| {
                    let draft = editing
                        .as_mut()
                        .filter(|draft| draft.message_id == message.id && draft.pane == pane.id);

                    if let Some(draft) = draft {
                        ui.add(
                            egui::TextEdit::multiline(&mut draft.content)
                                .desired_rows(2)
                                .desired_width(max_width),
                        );
                        ui.horizontal(|ui| {
                            let can_save = !draft.content.trim().is_empty();
                            if ui.add_enabled(can_save, egui::Button::new("Save")).clicked() {
                                actions.push(UiAction::CommitEdit {
                                    message_id: draft.message_id.clone(),
                                    content: draft.content.clone(),
                                });
                            }
                            if ui.button("Cancel").clicked() {
                                actions.push(UiAction::CancelEdit);
                            }
                        });
                        return;
                    }

                    ui.add(egui::Label::new(RichText::new(&message.content)).wrap());
                    if ui.small_button("Edit").clicked() {
                        actions.push(UiAction::BeginEdit {
                            message_id: message.id.clone(),
                            pane: pane.id.clone(),
                        });
                    }
                });
            });
        });
    }

    fn render_assistant_message(
        &self,
        ui: &mut egui::Ui,
        model: &Model,
        message: &Message,
        actions: &mut Vec<UiAction>,
    ) {
        let max_width = ui.available_width() * 0.8;
        ui.with_layout(Layout::left_to_right(Align::TOP), |ui| {
            self.theme.assistant_bubble(model.color).show(ui, |ui| {
                ui.set_max_width(max_width);
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(&model.name)
                                .small()
                                .strong()
                                .color(self.theme.model_accent(model.color)),
                        );
                        if ui.small_button("Copy").clicked() {
                            actions.push(UiAction::CopyToClipboard(message.content().to_string()));
                        }
                    });
                    ui.add(egui::Label::new(RichText::new(&message.content)).wrap());
                });
            });
        });
    }
}

impl eframe::App for MultiChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions = Vec::new();
        self.render_top_bar(ctx);
        self.render_sidebar(ctx, &mut actions);
        self.render_composer(ctx, &mut actions);

        let mut editing = self.editing.take();
        self.render_chat_area(ctx, &mut editing, &mut actions);
        self.editing = editing;

        for action in actions {
            self.apply_action(ctx, action);
        }
    }
}
