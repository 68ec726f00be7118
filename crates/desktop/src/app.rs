//! Yaddoo Desktop — egui app state and UI.

use eframe::egui;
use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Mutex, OnceLock};
use yaddoo::avatar::{Avatar, ASSISTANT_IMAGE, MALE_IMAGE};
use yaddoo::chat::Outgoing;
use yaddoo::profile::Gender;
use yaddoo::reply::{ReplyClient, ReplyError};
use yaddoo::transcript::{Bubble, BubbleStyle};
use yaddoo::{ChatView, ChatWidget};

const LOG_BUFFER_MAX_LINES: usize = 500;
const CHAT_INPUT_ID: &str = "chat_input";
const GATE_NAME_ID: &str = "gate_name";

/// Ring buffer of log lines for the Logs window. Written by DesktopLogger.
static LOG_LINES: OnceLock<Mutex<VecDeque<String>>> = OnceLock::new();

fn log_buffer() -> &'static Mutex<VecDeque<String>> {
    LOG_LINES.get_or_init(|| Mutex::new(VecDeque::new()))
}

fn push_log_line(line: String) {
    if let Ok(mut buf) = log_buffer().lock() {
        buf.push_back(line);
        while buf.len() > LOG_BUFFER_MAX_LINES {
            buf.pop_front();
        }
    }
}

/// Logger that appends to LOG_LINES for display in the Logs window.
struct DesktopLogger;

impl log::Log for DesktopLogger {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        push_log_line(format!("[{}] {}", record.level(), record.args()));
    }

    fn flush(&self) {}
}

static LOGGER: DesktopLogger = DesktopLogger;

pub fn install_logger() {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log::LevelFilter::Info);
}

/// Input box, send button and focus: the parts of the UI the chat controller drives.
struct Composer {
    text: String,
    send_enabled: bool,
    focus: bool,
}

impl ChatView for Composer {
    fn clear_input(&mut self) {
        self.text.clear();
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
    }

    fn focus_input(&mut self) {
        self.focus = true;
    }
}

/// A reply request running on its own thread.
struct PendingReply {
    id: u64,
    receiver: mpsc::Receiver<Result<String, ReplyError>>,
}

pub struct YaddooApp {
    widget: ChatWidget,
    composer: Composer,
    gate_name: String,
    gate_gender: Option<Gender>,
    pending: Option<PendingReply>,
    show_logs: bool,
}

fn avatar_glyph(avatar: &Avatar) -> &'static str {
    match avatar.image {
        ASSISTANT_IMAGE => "👵",
        MALE_IMAGE => "👦",
        _ => "👧",
    }
}

fn avatar_badge(ui: &mut egui::Ui, avatar: &Avatar) {
    ui.label(egui::RichText::new(avatar_glyph(avatar)).size(22.0))
        .on_hover_text(avatar.image);
    ui.label(egui::RichText::new(&avatar.label).strong());
}

/// Run one reply request on a fresh runtime. Blocks the calling (background) thread.
fn run_reply(client: &ReplyClient, out: &Outgoing) -> Result<String, ReplyError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ReplyError::Service(e.to_string()))?;
    rt.block_on(client.send(&out.message, &out.history))
}

impl YaddooApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, widget: ChatWidget) -> Self {
        log::info!("desktop started, reply service at {}", widget.client().base_url());
        Self {
            widget,
            composer: Composer {
                text: String::new(),
                send_enabled: true,
                focus: true,
            },
            gate_name: String::new(),
            gate_gender: None,
            pending: None,
            show_logs: false,
        }
    }

    /// Start a reply request in a background thread if the controller accepts the input.
    fn start_send(&mut self, ctx: &egui::Context) {
        let text = self.composer.text.clone();
        let Some(out) = self.widget.begin_send(&text, &mut self.composer) else {
            return;
        };
        let client = self.widget.client().clone();
        let (tx, rx) = mpsc::channel();
        let id = out.id;
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let result = run_reply(&client, &out);
            let _ = tx.send(result);
            ctx.request_repaint();
        });
        self.pending = Some(PendingReply { id, receiver: rx });
    }

    /// Poll for the reply and hand it to the controller. Call each frame.
    fn poll_reply(&mut self) {
        let Some(pending) = &self.pending else {
            return;
        };
        let id = pending.id;
        let outcome = match pending.receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => {
                Err(ReplyError::Service("reply thread stopped".to_string()))
            }
        };
        self.pending = None;
        self.widget.finish_send(id, outcome, &mut self.composer);
    }

    fn logout(&mut self) {
        self.pending = None;
        self.widget.logout(&mut self.composer);
    }

    fn render_bubble(ui: &mut egui::Ui, b: &Bubble) {
        let visuals = ui.style().visuals.clone();
        let fill = match (b.is_user(), b.style) {
            (_, BubbleStyle::Error) => egui::Color32::from_rgb(0x5a, 0x1e, 0x1e),
            (true, _) => visuals.extreme_bg_color,
            (false, _) => visuals.faint_bg_color,
        };
        let layout = if b.is_user() {
            egui::Layout::right_to_left(egui::Align::TOP)
        } else {
            egui::Layout::left_to_right(egui::Align::TOP)
        };
        ui.with_layout(layout, |ui| {
            egui::Frame::none()
                .fill(fill)
                .stroke(egui::Stroke::new(
                    1.0,
                    visuals.widgets.noninteractive.bg_stroke.color,
                ))
                .rounding(egui::Rounding::same(10.0))
                .inner_margin(egui::Margin::same(8.0))
                .show(ui, |ui| {
                    ui.set_max_width(ui.available_width() * 0.8);
                    ui.vertical(|ui| {
                        if b.is_user() {
                            ui.label(egui::RichText::new(&b.text).strong());
                        } else {
                            ui.label(&b.text);
                        }
                        ui.label(egui::RichText::new(&b.time).small().weak());
                    });
                });
        });
    }

    fn ui_header(&mut self, ui: &mut egui::Ui) {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            avatar_badge(ui, &self.widget.assistant_avatar());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Logout").clicked() {
                    self.logout();
                }
                if ui.button("Switch").clicked() {
                    self.widget.switch_profile();
                }
                ui.hyperlink_to("Health", self.widget.client().health_url());
                ui.toggle_value(&mut self.show_logs, "Logs");
            });
        });
        ui.add_space(8.0);
    }

    fn ui_composer(&mut self, ui: &mut egui::Ui) {
        let can_send = self.composer.send_enabled && !self.widget.gate.is_visible();
        let mut send_now = false;
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            avatar_badge(ui, &self.widget.user_avatar());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add_enabled(can_send, egui::Button::new("Send")).clicked() {
                    send_now = true;
                }
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.composer.text)
                        .id(egui::Id::new(CHAT_INPUT_ID))
                        .hint_text("اكتب رسالتك…")
                        .desired_width(f32::INFINITY),
                );
                if self.composer.focus && !self.widget.gate.is_visible() {
                    self.composer.focus = false;
                    response.request_focus();
                }
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    send_now = can_send;
                }
            });
        });
        ui.add_space(8.0);
        if send_now {
            self.start_send(ui.ctx());
        }
    }

    fn ui_gate(&mut self, ctx: &egui::Context) {
        let mut submit = false;
        egui::Window::new("gate")
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.heading("مرحبا! شو اسمك؟");
                ui.add_space(8.0);
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.gate_name)
                        .id(egui::Id::new(GATE_NAME_ID))
                        .hint_text("الاسم"),
                );
                if self.widget.gate.take_focus_request() {
                    response.request_focus();
                }
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit = true;
                }
                ui.horizontal(|ui| {
                    ui.radio_value(&mut self.gate_gender, Some(Gender::Female), "بنت");
                    ui.radio_value(&mut self.gate_gender, Some(Gender::Male), "ولد");
                });
                ui.add_space(8.0);
                if ui.button("يلا").clicked() {
                    submit = true;
                }
            });
        if submit
            && self
                .widget
                .sign_in(&self.gate_name, self.gate_gender)
                .is_some()
        {
            self.gate_name.clear();
            self.gate_gender = None;
            self.composer.focus = true;
        }
    }

    fn ui_logs(&mut self, ctx: &egui::Context) {
        egui::Window::new("Logs")
            .open(&mut self.show_logs)
            .default_size([420.0, 240.0])
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        if let Ok(buf) = log_buffer().lock() {
                            for line in buf.iter() {
                                ui.monospace(line);
                            }
                        }
                    });
            });
    }
}

impl eframe::App for YaddooApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_reply();

        egui::TopBottomPanel::top("header").show(ctx, |ui| self.ui_header(ui));
        egui::TopBottomPanel::bottom("composer").show(ctx, |ui| self.ui_composer(ui));
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .stick_to_bottom(true)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for b in self.widget.chat.transcript().bubbles() {
                        Self::render_bubble(ui, b);
                        ui.add_space(6.0);
                    }
                });
        });

        if self.widget.gate.is_visible() {
            self.ui_gate(ctx);
        }
        if self.show_logs {
            self.ui_logs(ctx);
        }
    }
}
