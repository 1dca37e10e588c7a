use crate::{
    config::Config,
    playlist::{Playlist, Track},
    presets::{playlist_categories, BreakCategory, PlaylistCategory},
    store::{start_timer, SharedStore},
    timer::{FocusGoal, Session, SettingsPatch},
    utils::format_clock,
    youtube::{FetchError, YouTubeClient},
};
use eframe::egui;
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

const PRESET_WORK_MINUTES: [u32; 4] = [15, 25, 45, 60];
const PRESET_BREAK_MINUTES: [u32; 4] = [5, 10, 15, 20];
const BACKUP_FILE: &str = "focus-dj-backup.json";

pub struct FocusDjApp {
    store: SharedStore,
    config: Config,
    youtube: Option<Arc<YouTubeClient>>,
    categories: Vec<PlaylistCategory>,

    url_input: String,
    api_key_input: String,
    show_categories: bool,
    loading: bool,
    fetch_error: Option<String>,
    notice: Option<String>,

    custom_minutes: String,
    new_task: String,
    goal_main: String,
    goal_how: String,
    new_activity_description: String,
    new_activity_category: BreakCategory,
    new_activity_duration: u32,

    fetch_tx: UnboundedSender<Result<Vec<Track>, FetchError>>,
    fetch_rx: UnboundedReceiver<Result<Vec<Track>, FetchError>>,
}

impl FocusDjApp {
    pub fn new(store: SharedStore, config: Config, youtube: Option<Arc<YouTubeClient>>) -> Self {
        let (fetch_tx, fetch_rx) = unbounded_channel();
        Self {
            store,
            config,
            youtube,
            categories: playlist_categories(),
            url_input: String::new(),
            api_key_input: String::new(),
            show_categories: true,
            loading: false,
            fetch_error: None,
            notice: None,
            custom_minutes: String::new(),
            new_task: String::new(),
            goal_main: String::new(),
            goal_how: String::new(),
            new_activity_description: String::new(),
            new_activity_category: BreakCategory::Energizing,
            new_activity_duration: 5,
            fetch_tx,
            fetch_rx,
        }
    }

    fn request_playlist(&mut self, url: String) {
        let Some(client) = self.youtube.clone() else {
            return;
        };
        self.loading = true;
        self.fetch_error = None;
        self.show_categories = false;
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = client.fetch_items(&url).await;
            let _ = tx.send(result);
        });
    }

    fn poll_fetches(&mut self) {
        while let Ok(result) = self.fetch_rx.try_recv() {
            self.loading = false;
            match result {
                Ok(items) => {
                    info!("Loaded {} tracks", items.len());
                    if let Ok(mut store) = self.store.lock() {
                        store.set_playlist(Playlist::from_tracks(items));
                    }
                    self.url_input.clear();
                }
                Err(e) => {
                    error!("Fetch failed: {}", e);
                    self.fetch_error = Some(e.to_string());
                }
            }
        }
    }

    fn handle_start_click(&mut self) {
        let needs_goal = match self.store.lock() {
            Ok(store) => {
                store.state().current_session == Session::Work && !store.state().focus_goal.is_set()
            }
            Err(_) => false,
        };
        if needs_goal {
            self.goal_main.clear();
            self.goal_how.clear();
            if let Ok(mut store) = self.store.lock() {
                store.toggle_focus_goal_modal(true);
            }
        } else {
            start_timer(&self.store);
        }
    }

    fn set_session_duration(&mut self, minutes: u32) {
        if let Ok(mut store) = self.store.lock() {
            let patch = match store.state().current_session {
                Session::Work => SettingsPatch {
                    work_duration: Some(minutes * 60),
                    ..Default::default()
                },
                Session::Break => SettingsPatch {
                    break_duration: Some(minutes * 60),
                    ..Default::default()
                },
            };
            store.update_settings(patch);
        }
    }

    fn render_timer(&mut self, ui: &mut egui::Ui) {
        let (is_running, session, time_remaining, minutes_today, goal) = {
            let Ok(store) = self.store.lock() else { return };
            let s = store.state();
            (
                s.is_running,
                s.current_session,
                s.time_remaining,
                s.pomodoro_stats.total_minutes_today,
                s.focus_goal.clone(),
            )
        };

        ui.horizontal(|ui| {
            ui.heading(match session {
                Session::Work => "Focus Timer",
                Session::Break => "Break Time",
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("🗑 Clear all data").clicked() {
                    if let Ok(mut store) = self.store.lock() {
                        store.clear_all_data();
                    }
                }
            });
        });

        if session == Session::Work && goal.is_set() {
            ui.group(|ui| {
                ui.label(egui::RichText::new(&goal.main_goal).strong());
                if !goal.how_to_achieve.is_empty() {
                    ui.label(&goal.how_to_achieve);
                }
                if ui.small_button("Edit goal").clicked() {
                    self.goal_main = goal.main_goal.clone();
                    self.goal_how = goal.how_to_achieve.clone();
                    if let Ok(mut store) = self.store.lock() {
                        store.toggle_focus_goal_modal(true);
                    }
                }
            });
        }

        ui.label(format!("✔ {} minutes today", minutes_today));
        ui.add_space(8.0);

        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new(format_clock(time_remaining)).size(56.0));
        });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if is_running {
                if ui.button("⏸ Pause").clicked() {
                    if let Ok(mut store) = self.store.lock() {
                        store.pause();
                    }
                }
            } else if ui.button("▶ Start").clicked() {
                self.handle_start_click();
            }
            if ui.button("⟲ Reset").clicked() {
                if let Ok(mut store) = self.store.lock() {
                    store.reset();
                }
            }
        });

        ui.add_space(8.0);
        let presets = match session {
            Session::Work => PRESET_WORK_MINUTES,
            Session::Break => PRESET_BREAK_MINUTES,
        };
        ui.horizontal(|ui| {
            for minutes in presets {
                if ui.button(format!("{}m", minutes)).clicked() {
                    self.set_session_duration(minutes);
                }
            }
        });
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.custom_minutes)
                    .hint_text("Custom minutes")
                    .desired_width(110.0),
            );
            if ui.button("Set").clicked() {
                if let Ok(minutes) = self.custom_minutes.trim().parse::<u32>() {
                    if minutes > 0 {
                        self.set_session_duration(minutes);
                        self.custom_minutes.clear();
                    }
                }
            }
        });
    }

    fn render_tasks(&mut self, ui: &mut egui::Ui) {
        ui.heading("Tasks");
        ui.horizontal(|ui| {
            let response = ui
                .add(egui::TextEdit::singleline(&mut self.new_task).hint_text("Add a new task..."));
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if (ui.button("＋").clicked() || submitted) && !self.new_task.trim().is_empty() {
                if let Ok(mut store) = self.store.lock() {
                    store.add_task(self.new_task.trim());
                }
                self.new_task.clear();
            }
        });

        let tasks = match self.store.lock() {
            Ok(store) => store.state().tasks.clone(),
            Err(_) => return,
        };
        egui::ScrollArea::vertical()
            .id_source("tasks")
            .max_height(220.0)
            .show(ui, |ui| {
                for task in &tasks {
                    ui.horizontal(|ui| {
                        let mut completed = task.completed;
                        if ui.checkbox(&mut completed, "").changed() {
                            if let Ok(mut store) = self.store.lock() {
                                store.toggle_task(&task.id);
                            }
                        }
                        let text = if task.completed {
                            egui::RichText::new(&task.text).strikethrough().weak()
                        } else {
                            egui::RichText::new(&task.text)
                        };
                        ui.label(text);
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("🗑").clicked() {
                                if let Ok(mut store) = self.store.lock() {
                                    store.delete_task(&task.id);
                                }
                            }
                        });
                    });
                }
            });
    }

    fn render_break_activities(&mut self, ui: &mut egui::Ui) {
        ui.heading("Break Activities");
        let activities = match self.store.lock() {
            Ok(store) => store.state().break_activities.clone(),
            Err(_) => return,
        };

        for category in [BreakCategory::Energizing, BreakCategory::Restorative] {
            ui.label(egui::RichText::new(format!("{} Menu", category.label())).strong());
            for activity in activities.iter().filter(|a| a.category == category) {
                ui.horizontal(|ui| {
                    ui.label(format!(
                        "[{} MINS] {}",
                        activity.duration, activity.description
                    ));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("🗑").clicked() {
                            if let Ok(mut store) = self.store.lock() {
                                store.delete_break_activity(&activity.id);
                            }
                        }
                    });
                });
            }
            ui.add_space(4.0);
        }

        ui.separator();
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.new_activity_description)
                    .hint_text("Add a new break activity...")
                    .desired_width(180.0),
            );
            egui::ComboBox::from_id_source("activity_category")
                .selected_text(self.new_activity_category.label())
                .show_ui(ui, |ui| {
                    for category in [BreakCategory::Energizing, BreakCategory::Restorative] {
                        ui.selectable_value(
                            &mut self.new_activity_category,
                            category,
                            category.label(),
                        );
                    }
                });
            ui.add(
                egui::DragValue::new(&mut self.new_activity_duration)
                    .clamp_range(1..=60)
                    .suffix(" min"),
            );
            if ui.button("Add").clicked() && !self.new_activity_description.trim().is_empty() {
                if let Ok(mut store) = self.store.lock() {
                    store.add_break_activity(
                        self.new_activity_category,
                        self.new_activity_duration,
                        self.new_activity_description.trim(),
                    );
                }
                self.new_activity_description.clear();
            }
        });
        if ui.small_button("Reset to defaults").clicked() {
            if let Ok(mut store) = self.store.lock() {
                store.reset_break_activities();
            }
        }
    }

    fn render_player(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.url_input)
                    .hint_text("Paste YouTube or YouTube Music URL...")
                    .desired_width(280.0),
            );
            if ui.button("Load").clicked() && !self.url_input.trim().is_empty() && !self.loading {
                let url = self.url_input.trim().to_string();
                self.request_playlist(url);
            }
            let label = if self.show_categories {
                "Hide Categories"
            } else {
                "Browse Categories"
            };
            if ui.button(label).clicked() {
                self.show_categories = !self.show_categories;
            }
        });

        if let Some(error) = self.fetch_error.clone() {
            ui.colored_label(egui::Color32::LIGHT_RED, error);
        }
        if self.loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading...");
            });
        }

        if self.show_categories {
            ui.add_space(4.0);
            let categories = self.categories.clone();
            egui::Grid::new("categories").num_columns(2).show(ui, |ui| {
                for (i, category) in categories.iter().enumerate() {
                    if ui
                        .button(format!(
                            "{} {}\n{}",
                            category.icon, category.name, category.description
                        ))
                        .clicked()
                    {
                        self.request_playlist(category.url.to_string());
                    }
                    if i % 2 == 1 {
                        ui.end_row();
                    }
                }
            });
        }

        ui.separator();

        let playlist = match self.store.lock() {
            Ok(store) => store.state().playlist.clone(),
            Err(_) => return,
        };

        let Some(current) = playlist.current_track() else {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                ui.label("No music loaded");
                ui.weak("Select a playlist or paste a YouTube URL above");
                ui.add_space(24.0);
            });
            return;
        };

        ui.label(egui::RichText::new(&current.title).strong());
        ui.weak(&current.duration);
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            let at_start = playlist.current_index == 0;
            let at_end = playlist.current_index + 1 >= playlist.items.len();
            if ui.add_enabled(!at_start, egui::Button::new("⏮")).clicked() {
                if let Ok(mut store) = self.store.lock() {
                    store.previous_track();
                }
            }
            let play_label = if playlist.is_playing { "⏸" } else { "▶" };
            if ui.button(play_label).clicked() {
                if let Ok(mut store) = self.store.lock() {
                    store.set_is_playing(!playlist.is_playing);
                }
            }
            if ui.add_enabled(!at_end, egui::Button::new("⏭")).clicked() {
                if let Ok(mut store) = self.store.lock() {
                    store.next_track();
                }
            }

            if ui
                .selectable_label(playlist.audio_only, "Audio only")
                .clicked()
            {
                if let Ok(mut store) = self.store.lock() {
                    store.set_audio_only(!playlist.audio_only);
                }
            }
            if ui.selectable_label(playlist.shuffle, "🔀").clicked() {
                if let Ok(mut store) = self.store.lock() {
                    store.toggle_shuffle();
                }
            }
            if ui.selectable_label(playlist.repeat, "🔁").clicked() {
                if let Ok(mut store) = self.store.lock() {
                    store.toggle_repeat();
                }
            }

            let mut volume = playlist.volume;
            if ui
                .add(egui::Slider::new(&mut volume, 0..=100).text("🔊"))
                .changed()
            {
                if let Ok(mut store) = self.store.lock() {
                    store.set_volume(volume);
                }
            }
        });

        ui.add_space(4.0);
        egui::ScrollArea::vertical()
            .id_source("playlist")
            .max_height(280.0)
            .show(ui, |ui| {
                for (i, item) in playlist.items.iter().enumerate() {
                    let selected = i == playlist.current_index;
                    let row = format!("{}  ({})", item.title, item.duration);
                    if ui.selectable_label(selected, row).clicked() {
                        if let Ok(mut store) = self.store.lock() {
                            store.set_current_video(i);
                        }
                    }
                }
            });
    }

    fn render_goal_modal(&mut self, ctx: &egui::Context) {
        let open = match self.store.lock() {
            Ok(store) => store.state().is_focus_goal_modal_open,
            Err(_) => false,
        };
        if !open {
            return;
        }

        egui::Window::new("Set Your Focus for this Session")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("Main Goal (Optional)");
                ui.text_edit_multiline(&mut self.goal_main);
                ui.label("How will you achieve this? (Optional)");
                ui.text_edit_multiline(&mut self.goal_how);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Start Focusing").clicked() {
                        if let Ok(mut store) = self.store.lock() {
                            store.set_focus_goal(FocusGoal {
                                main_goal: self.goal_main.trim().to_string(),
                                how_to_achieve: self.goal_how.trim().to_string(),
                            });
                            store.toggle_focus_goal_modal(false);
                        }
                        // Submitting the goal is what kicks off the countdown.
                        start_timer(&self.store);
                    }
                    if ui.button("Cancel").clicked() {
                        if let Ok(mut store) = self.store.lock() {
                            store.toggle_focus_goal_modal(false);
                        }
                    }
                });
            });
    }

    fn render_import_export(&mut self, ui: &mut egui::Ui) {
        if ui.button("⬇ Export").clicked() {
            self.export_to_file();
        }
        if ui.button("⬆ Import").clicked() {
            self.import_from_file();
        }
        if let Some(notice) = self.notice.clone() {
            ui.weak(notice);
        }
    }

    fn export_to_file(&mut self) {
        let json = match self.store.lock() {
            Ok(store) => store.export_json(),
            Err(_) => return,
        };
        let json = match json {
            Ok(json) => json,
            Err(e) => {
                self.notice = Some(format!("Export failed: {}", e));
                return;
            }
        };
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(BACKUP_FILE)
            .save_file()
        {
            match std::fs::write(&path, json) {
                Ok(()) => self.notice = Some("Data exported".to_string()),
                Err(e) => self.notice = Some(format!("Export failed: {}", e)),
            }
        }
    }

    fn import_from_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        else {
            return;
        };
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                self.notice = Some(format!("Import failed: {}", e));
                return;
            }
        };
        let result = match self.store.lock() {
            Ok(mut store) => store.import_json(&raw),
            Err(_) => return,
        };
        match result {
            Ok(()) => self.notice = Some("Data imported successfully".to_string()),
            Err(e) => {
                error!("Import failed: {}", e);
                self.notice =
                    Some("Failed to import data. Please make sure it is a valid backup file"
                        .to_string());
            }
        }
    }

    fn render_missing_key(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(120.0);
            ui.heading("YouTube API key is not configured");
            ui.label("Set FOCUSDJ_YOUTUBE_API_KEY, edit the config file, or paste a key below.");
            ui.label("Playback features are disabled until a key is provided.");
            ui.add_space(12.0);
            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut self.api_key_input)
                        .hint_text("YouTube Data API v3 key")
                        .desired_width(320.0),
                );
                if ui.button("Save").clicked() && !self.api_key_input.trim().is_empty() {
                    let key = self.api_key_input.trim().to_string();
                    self.config.youtube_api_key = Some(key.clone());
                    if let Err(e) = self.config.save() {
                        error!("Failed to save configuration: {}", e);
                    }
                    self.youtube = Some(Arc::new(YouTubeClient::new(key)));
                    self.api_key_input.clear();
                }
            });
        });
    }
}

impl eframe::App for FocusDjApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_fetches();
        // Keep the clock face current while the countdown runs off-thread.
        ctx.request_repaint_after(Duration::from_millis(250));

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Focus DJ");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    self.render_import_export(ui);
                    let logged_in = self
                        .store
                        .lock()
                        .map(|s| s.state().is_logged_in)
                        .unwrap_or(false);
                    let label = if logged_in { "👤 Signed in" } else { "👤 Sign in" };
                    if ui.selectable_label(logged_in, label).clicked() {
                        if let Ok(mut store) = self.store.lock() {
                            store.set_logged_in(!logged_in);
                        }
                    }
                });
            });
        });

        if self.youtube.is_none() {
            egui::CentralPanel::default().show(ctx, |ui| {
                self.render_missing_key(ui);
            });
            return;
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                egui::ScrollArea::vertical()
                    .id_source("left_column")
                    .show(&mut columns[0], |ui| {
                        self.render_timer(ui);
                        ui.separator();
                        self.render_tasks(ui);
                        let in_break = self
                            .store
                            .lock()
                            .map(|s| s.state().current_session == Session::Break)
                            .unwrap_or(false);
                        if in_break {
                            ui.separator();
                            self.render_break_activities(ui);
                        }
                    });
                egui::ScrollArea::vertical()
                    .id_source("right_column")
                    .show(&mut columns[1], |ui| {
                        self.render_player(ui);
                    });
            });
        });

        self.render_goal_modal(ctx);
    }
}
