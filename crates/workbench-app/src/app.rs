//! Main egui application: composes the panels and owns the chat session.
//!
//! Start-up is asynchronous (storage, saved config, knowledge list), so the
//! first frames render a loading screen until the boot task fills its slot.

use std::cell::RefCell;
use std::rc::Rc;

use egui::{self, CentralPanel, RichText, SidePanel, TopBottomPanel};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;

use workbench_core::chat::ChatSession;
use workbench_core::event_bus::EventBus;
use workbench_core::ports::StoragePort;
use workbench_core::stream::StreamConsumer;
use workbench_platform::knowledge::KnowledgeStore;
use workbench_platform::storage::open_storage;
use workbench_platform::transport::{build_transport, fetch_knowledge_list};
use workbench_types::config::{StorageConfig, TransportMode, WorkbenchConfig};
use workbench_ui::panels::{
    chat_panel, knowledge_panel, settings_panel, ChatAction, KnowledgeAction, SaveFeedback,
    SettingsAction,
};
use workbench_ui::state::UiState;
use workbench_ui::theme;

const CONFIG_STORAGE_KEY: &str = "workbench:config";
const CJK_FONT_URL: &str = "NotoSansSC-Regular.otf";

/// Everything the boot task produces
struct Booted {
    config: WorkbenchConfig,
    /// Holds the config itself
    settings_storage: Rc<dyn StoragePort>,
    knowledge: KnowledgeStore,
}

/// Live services once boot has finished
struct Services {
    config: WorkbenchConfig,
    settings_storage: Rc<dyn StoragePort>,
    knowledge: KnowledgeStore,
    chat: ChatSession,
}

pub struct WorkbenchApp {
    ui_state: UiState,
    event_bus: EventBus,
    boot_slot: Rc<RefCell<Option<Booted>>>,
    services: Option<Services>,
    save_feedback: Rc<RefCell<Option<SaveFeedback>>>,
    first_frame: bool,
}

impl WorkbenchApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let boot_slot = Rc::new(RefCell::new(None));
        Self::boot(boot_slot.clone(), cc.egui_ctx.clone());

        Self {
            ui_state: UiState::new(),
            event_bus: EventBus::new(),
            boot_slot,
            services: None,
            save_feedback: Rc::new(RefCell::new(None)),
            first_frame: true,
        }
    }

    /// Open storage, restore the config and load the knowledge list.
    fn boot(slot: Rc<RefCell<Option<Booted>>>, ctx: egui::Context) {
        spawn_local(async move {
            let settings_storage = match open_storage(&StorageConfig::default()).await {
                Ok(storage) => storage,
                Err(e) => {
                    log::error!("No storage available: {}", e);
                    Rc::new(workbench_platform::storage::MemoryStorage::new())
                }
            };

            let config = restore_config(settings_storage.as_ref()).await;

            let knowledge_storage = if config.storage.backend == StorageConfig::default().backend {
                settings_storage.clone()
            } else {
                match open_storage(&config.storage).await {
                    Ok(storage) => storage,
                    Err(e) => {
                        log::warn!("Configured storage unavailable ({}), using default", e);
                        settings_storage.clone()
                    }
                }
            };
            let knowledge = KnowledgeStore::load(knowledge_storage, &config.knowledge.storage_key).await;

            if config.transport.mode == TransportMode::Fetch {
                refresh_knowledge(&knowledge, &config).await;
            }

            *slot.borrow_mut() = Some(Booted {
                config,
                settings_storage,
                knowledge,
            });
            ctx.request_repaint();
        });
    }

    /// Turn a finished boot into live services
    fn take_boot(&mut self) {
        let Some(booted) = self.boot_slot.borrow_mut().take() else {
            return;
        };

        let consumer = StreamConsumer::new(build_transport(&booted.config));
        log::info!("Chat transport: {}", consumer.transport_name());
        let chat = ChatSession::new(
            consumer,
            Rc::new(booted.knowledge.clone()),
            self.event_bus.clone(),
        );
        chat.create_session();

        self.services = Some(Services {
            config: booted.config,
            settings_storage: booted.settings_storage,
            knowledge: booted.knowledge,
            chat,
        });
    }

    /// Fetch a CJK font so titles like 《…》 render, then install it
    fn load_cjk_font(ctx: egui::Context) {
        spawn_local(async move {
            let bytes = match fetch_bytes(CJK_FONT_URL).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::warn!("Failed to fetch CJK font: {:?}", e);
                    return;
                }
            };

            let mut fonts = egui::FontDefinitions::default();
            fonts.font_data.insert(
                "noto_sans_sc".to_owned(),
                egui::FontData::from_owned(bytes).into(),
            );
            for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
                fonts
                    .families
                    .entry(family)
                    .or_default()
                    .push("noto_sans_sc".to_owned());
            }

            ctx.set_fonts(fonts);
            ctx.request_repaint();
            log::info!("CJK font loaded");
        });
    }
}

async fn restore_config(storage: &dyn StoragePort) -> WorkbenchConfig {
    match storage.get(CONFIG_STORAGE_KEY).await {
        Ok(Some(data)) => match serde_json::from_slice::<WorkbenchConfig>(&data) {
            Ok(config) => {
                log::info!("Config restored from storage");
                config
            }
            Err(e) => {
                log::warn!("Ignoring unreadable saved config: {}", e);
                WorkbenchConfig::default()
            }
        },
        Ok(None) => WorkbenchConfig::default(),
        Err(e) => {
            log::warn!("Could not read saved config: {}", e);
            WorkbenchConfig::default()
        }
    }
}

async fn refresh_knowledge(knowledge: &KnowledgeStore, config: &WorkbenchConfig) {
    match fetch_knowledge_list(&config.transport).await {
        Ok(items) => {
            if let Err(e) = knowledge.replace_all(items).await {
                log::warn!("Could not persist fetched knowledge list: {}", e);
            }
        }
        Err(e) => log::warn!("Knowledge list unavailable: {}", e),
    }
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, wasm_bindgen::JsValue> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let window = web_sys::window().ok_or_else(|| wasm_bindgen::JsValue::from_str("no window"))?;
    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(wasm_bindgen::JsValue::from_f64(f64::from(response.status())));
    }
    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

impl eframe::App for WorkbenchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame {
            theme::apply_theme(ctx);
            Self::load_cjk_font(ctx.clone());
            self.first_frame = false;
        }

        if self.services.is_none() {
            self.take_boot();
        }
        let Some(services) = self.services.as_mut() else {
            CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
            });
            return;
        };

        // Drain session events, then refresh the read models
        let events = self.event_bus.drain();
        if !events.is_empty() {
            self.ui_state.process_events(events);
        }
        self.ui_state.set_chat(services.chat.snapshot());
        self.ui_state.set_knowledge(services.knowledge.items());

        let processing = self.ui_state.knowledge.iter().any(|item| !item.is_ready());
        if self.ui_state.is_busy() || processing {
            ctx.request_repaint();
        }

        // ── Top bar ──────────────────────────────────────────
        TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new("Knowledge Workbench")
                        .strong()
                        .color(theme::ACCENT)
                        .size(16.0),
                );
                ui.separator();
                ui.label(
                    RichText::new(format!("Transport: {}", services.config.transport.mode.label()))
                        .color(theme::TEXT_SECONDARY)
                        .small(),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .selectable_label(self.ui_state.show_settings, "Settings")
                        .clicked()
                    {
                        self.ui_state.show_settings = !self.ui_state.show_settings;
                    }
                });
            });
        });

        // ── Settings side panel ──────────────────────────────
        if self.ui_state.show_settings {
            let feedback = self.save_feedback.borrow().clone();
            SidePanel::right("settings_panel")
                .min_width(280.0)
                .max_width(360.0)
                .show(ctx, |ui| {
                    match settings_panel(ui, &mut services.config, feedback.as_ref()) {
                        SettingsAction::None => {}
                        SettingsAction::Changed => {
                            apply_transport(services);
                            *self.save_feedback.borrow_mut() = None;
                        }
                        SettingsAction::SaveClicked => {
                            apply_transport(services);
                            save_config(
                                services.settings_storage.clone(),
                                &services.config,
                                self.save_feedback.clone(),
                                ctx.clone(),
                            );
                        }
                    }
                });
        }

        // ── Knowledge side panel ─────────────────────────────
        SidePanel::left("knowledge_panel")
            .min_width(220.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                let can_refresh = services.config.transport.mode == TransportMode::Fetch;
                if let Some(action) = knowledge_panel(ui, &mut self.ui_state, can_refresh) {
                    dispatch_knowledge(services, action, ctx);
                }
            });

        // ── Chat ─────────────────────────────────────────────
        CentralPanel::default().show(ctx, |ui| {
            if let Some(action) = chat_panel(ui, &mut self.ui_state) {
                let selected = self.ui_state.selected_ids();
                dispatch_chat(&services.chat, action, &selected, ctx);
            }
        });
    }
}

fn apply_transport(services: &Services) {
    let consumer = StreamConsumer::new(build_transport(&services.config));
    log::info!("Chat transport switched to {}", consumer.transport_name());
    services.chat.set_consumer(consumer);
}

/// Persist the config (async); the outcome shows up next to the Save button
fn save_config(
    storage: Rc<dyn StoragePort>,
    config: &WorkbenchConfig,
    feedback: Rc<RefCell<Option<SaveFeedback>>>,
    ctx: egui::Context,
) {
    let json = match serde_json::to_vec(config) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Config serialization failed: {}", e);
            return;
        }
    };
    spawn_local(async move {
        let result = storage.set(CONFIG_STORAGE_KEY, &json).await;
        let fb = match result {
            Ok(()) => {
                log::info!("Config saved to {}", storage.backend_name());
                SaveFeedback { message: "Saved".to_string(), success: true }
            }
            Err(e) => {
                log::error!("Config save failed: {}", e);
                SaveFeedback { message: format!("Save failed: {}", e), success: false }
            }
        };
        *feedback.borrow_mut() = Some(fb);
        ctx.request_repaint();
    });
}

fn dispatch_chat(chat: &ChatSession, action: ChatAction, selected: &[String], ctx: &egui::Context) {
    let turn = match action {
        ChatAction::Ask(question) => chat.ask(&question, selected),
        ChatAction::Retry => chat.retry(selected),
        ChatAction::NewSession => {
            chat.create_session();
            return;
        }
    };
    let ctx = ctx.clone();
    spawn_local(async move {
        turn.await;
        ctx.request_repaint();
    });
}

fn dispatch_knowledge(services: &Services, action: KnowledgeAction, ctx: &egui::Context) {
    let knowledge = services.knowledge.clone();
    let ctx = ctx.clone();
    match action {
        KnowledgeAction::Add(title) => {
            let delay = services.config.knowledge.processing_delay_ms;
            spawn_local(async move {
                let id = match knowledge.add(&title).await {
                    Ok(Some(id)) => id,
                    Ok(None) => return,
                    Err(e) => {
                        log::error!("Could not save knowledge item: {}", e);
                        return;
                    }
                };
                ctx.request_repaint();

                // Stand-in for server-side processing
                TimeoutFuture::new(delay).await;
                match knowledge.mark_ready(&id).await {
                    Ok(true) => log::debug!("Knowledge item {} ready", id),
                    Ok(false) => log::debug!("Knowledge item {} removed before it was ready", id),
                    Err(e) => log::error!("Could not save knowledge item: {}", e),
                }
                ctx.request_repaint();
            });
        }
        KnowledgeAction::Remove(id) => {
            spawn_local(async move {
                if let Err(e) = knowledge.remove(&id).await {
                    log::error!("Could not remove knowledge item: {}", e);
                }
                ctx.request_repaint();
            });
        }
        KnowledgeAction::Refresh => {
            let config = services.config.clone();
            spawn_local(async move {
                refresh_knowledge(&knowledge, &config).await;
                ctx.request_repaint();
            });
        }
    }
}
