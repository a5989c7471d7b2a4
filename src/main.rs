#[cfg(feature = "gui")]
use eframe::egui;

#[cfg(feature = "gui")]
use beatgrid::{
    config, draw, handle_click, sequencer, AudioOutput, ClickOutcome, Clock, Color, Layout,
    MidiMirror, MidiOutputDevice, Point, Rect, SharedSequencer, Surface,
};

#[cfg(feature = "gui")]
fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let layout = config::default_layout();
    let (width, height) = layout.canvas_size(config::STEP_COUNT, config::default_kit().len());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width + 40.0, height + 120.0])
            .with_title("BEATGRID - Drum Machine"),
        ..Default::default()
    };

    eframe::run_native(
        "BEATGRID",
        options,
        Box::new(move |_cc| Ok(Box::new(DrumMachineApp::new(layout)))),
    )
}

#[cfg(not(feature = "gui"))]
fn main() {
    env_logger::init();
    log::error!("This binary requires the 'gui' feature to be enabled");
    std::process::exit(1);
}

#[cfg(feature = "gui")]
struct DrumMachineApp {
    state: SharedSequencer,
    layout: Layout,
    audio_output: AudioOutput,
    midi_mirror: MidiMirror,
    _clock: Clock,

    // UI state
    available_midi_ports: Vec<String>,
    selected_port: Option<usize>,
}

#[cfg(feature = "gui")]
impl DrumMachineApp {
    fn new(layout: Layout) -> Self {
        Self::from_parts(layout, AudioOutput::default(), MidiMirror::new(MidiOutputDevice::new()))
    }

    fn from_parts(layout: Layout, audio_output: AudioOutput, midi_mirror: MidiMirror) -> Self {
        let state = config::default_sequencer().into_shared();

        let clock = Clock::start(
            config::TICK_PERIOD,
            state.clone(),
            (audio_output.voice_sender(), midi_mirror.clone()),
        );

        Self {
            state,
            layout,
            audio_output,
            midi_mirror,
            _clock: clock,
            available_midi_ports: MidiOutputDevice::available_ports(),
            selected_port: None,
        }
    }

    /// Every user action goes through here, so each one is also a chance
    /// to start a stream the host held back.
    fn interact(&mut self, action: UiAction) {
        self.audio_output.on_interaction();

        match action {
            UiAction::Canvas(point) => {
                let outcome = handle_click(&mut sequencer::lock(&self.state), &self.layout, point);
                if let ClickOutcome::PauseToggled { paused } = outcome {
                    log::info!("playback {}", if paused { "paused" } else { "running" });
                }
            }
            UiAction::Clear => sequencer::lock(&self.state).clear(),
            UiAction::SelectPort(port_idx) => match self.midi_mirror.connect(port_idx) {
                Ok(()) => self.selected_port = Some(port_idx),
                Err(e) => log::warn!("{}", e),
            },
        }
    }
}

#[cfg(feature = "gui")]
#[derive(Debug, Clone, Copy)]
enum UiAction {
    Canvas(Point),
    Clear,
    SelectPort(usize),
}

/// Adapter painting `Surface` calls into an egui canvas region.
#[cfg(feature = "gui")]
struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    canvas: egui::Rect,
}

#[cfg(feature = "gui")]
fn to_color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgb(color.r, color.g, color.b)
}

#[cfg(feature = "gui")]
impl Surface for PainterSurface<'_> {
    fn clear(&mut self) {
        self.painter
            .rect_filled(self.canvas, 0.0, to_color32(config::BACKGROUND_COLOR));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let min = self.canvas.min + egui::vec2(rect.left, rect.top);
        let cell = egui::Rect::from_min_size(min, egui::vec2(rect.size, rect.size));
        self.painter.rect_filled(cell, 4.0, to_color32(color));
    }
}

#[cfg(feature = "gui")]
impl eframe::App for DrumMachineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Free-running draw loop, independent of the clock.
        ctx.request_repaint();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(6.0);

            // MIDI Port Selection
            let mut selected_port_changed = None;
            let mut clear_clicked = false;
            ui.horizontal(|ui| {
                ui.label("MIDI Output:");
                if self.available_midi_ports.is_empty() {
                    ui.label("No MIDI ports available");
                } else {
                    egui::ComboBox::from_label("")
                        .selected_text(
                            self.selected_port
                                .and_then(|i| self.available_midi_ports.get(i))
                                .map(String::as_str)
                                .unwrap_or("Select port..."),
                        )
                        .show_ui(ui, |ui| {
                            for (i, port_name) in self.available_midi_ports.iter().enumerate() {
                                if ui
                                    .selectable_label(self.selected_port == Some(i), port_name)
                                    .clicked()
                                {
                                    selected_port_changed = Some(i);
                                }
                            }
                        });
                }

                ui.add_space(20.0);

                clear_clicked = ui.button("Clear").clicked();

                let paused = sequencer::lock(&self.state).is_paused();
                ui.label(if paused { "⏸ Paused" } else { "▶ Playing" });
            });

            if clear_clicked {
                self.interact(UiAction::Clear);
            }
            if let Some(port_idx) = selected_port_changed {
                self.interact(UiAction::SelectPort(port_idx));
            }

            if let Some(warning) = self.audio_output.status_warning() {
                ui.colored_label(egui::Color32::YELLOW, format!("⚠ {}", warning));
            }
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let state = self.state.clone();
            let (width, height) = {
                let seq = sequencer::lock(&state);
                self.layout.canvas_size(seq.step_count(), seq.track_count())
            };

            let (response, painter) =
                ui.allocate_painter(egui::vec2(width, height), egui::Sense::click());

            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let local = pos - response.rect.min;
                    self.interact(UiAction::Canvas(Point::new(local.x, local.y)));
                }
            }

            let mut surface = PainterSurface {
                painter: &painter,
                canvas: response.rect,
            };
            draw(&sequencer::lock(&state), &self.layout, &mut surface);

            ui.add_space(10.0);
            ui.label("Click cells to toggle steps, click the bottom row to play/pause");
        });
    }
}

#[cfg(all(test, feature = "gui"))]
mod tests {
    use super::*;

    fn muted_app() -> DrumMachineApp {
        DrumMachineApp::from_parts(
            config::default_layout(),
            AudioOutput::silent(),
            MidiMirror::default(),
        )
    }

    #[test]
    fn test_clear_action_wipes_grid() {
        let mut app = muted_app();
        {
            let mut seq = sequencer::lock(&app.state);
            seq.set_paused(true);
            seq.set_step(0, 0, true);
            seq.set_step(5, 7, true);
        }

        app.interact(UiAction::Clear);

        let seq = sequencer::lock(&app.state);
        assert!(seq.tracks().iter().all(|t| t.steps().iter().all(|&s| !s)));
        assert!(seq.is_paused());
    }

    #[test]
    fn test_canvas_action_reaches_click_handler() {
        let mut app = muted_app();
        sequencer::lock(&app.state).set_paused(true);
        let cell = app.layout.cell(2, 3);

        app.interact(UiAction::Canvas(Point::new(cell.left + 1.0, cell.top + 1.0)));
        assert!(sequencer::lock(&app.state).get_step(2, 3));

        let bar = app.layout.play_bar_top(6);
        app.interact(UiAction::Canvas(Point::new(30.0, bar + 1.0)));
        assert!(!sequencer::lock(&app.state).is_paused());
    }
}
