mod audio;
mod engine;
mod ui;
mod utils;
mod wishes;

use log::{error, info, warn};
use nannou::prelude::*;

use audio::{SourcePipe, VolumeProbe};
use engine::FireworksEngine;
use ui::WishForm;
use utils::Config;
use wishes::{Wish, WishBook, WishEntry};

/// Frames a notification stays on screen (~3 seconds at 60fps)
const NOTIFICATION_FRAMES: u32 = 180;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if let Some(position) = args.iter().position(|arg| arg == "--wish") {
        let id = match args.get(position + 1) {
            Some(id) => id,
            None => {
                eprintln!("usage: wishfire [--wish <id>]");
                std::process::exit(2);
            }
        };
        // Fail fast on a dead link before opening a window
        match WishBook::open().lookup(id) {
            Ok(Some(_)) => {}
            Ok(None) => {
                eprintln!("no wish stored under id {}", id);
                std::process::exit(1);
            }
            Err(err) => {
                eprintln!("failed to read the wish book: {:#}", err);
                std::process::exit(1);
            }
        }
    }

    SourcePipe::list_devices();

    nannou::app(model).update(update).run();
}

struct Model {
    source: SourcePipe,
    probe: VolumeProbe,
    engine: FireworksEngine,
    book: WishBook,
    wishes: Vec<Wish>,
    form: WishForm,
    volume: f32,
    notification_text: Option<String>,
    notification_frames: u32,
}

impl Model {
    fn notify(&mut self, text: String) {
        self.notification_text = Some(text);
        self.notification_frames = NOTIFICATION_FRAMES;
    }
}

fn model(app: &App) -> Model {
    let window = app
        .new_window()
        .title("wishfire")
        .view(view)
        .key_pressed(key_pressed)
        .size(1280, 720)
        .build();
    if let Err(err) = window {
        // No drawing surface means no show for this view; nothing to clean up
        error!("window creation failed: {}", err);
        std::process::exit(1);
    }

    let config = Config::load();
    let book = WishBook::open();
    let wishes = load_wishes(&book);

    Model {
        source: SourcePipe::new(),
        probe: VolumeProbe::new(),
        engine: FireworksEngine::new(config.tuning()),
        book,
        wishes,
        form: WishForm::new(),
        volume: audio::NO_SIGNAL,
        notification_text: None,
        notification_frames: 0,
    }
}

/// Initial wish list: one submission when `--wish <id>` was given, the whole
/// book otherwise. Store failures degrade to an empty list and captions are
/// simply skipped.
fn load_wishes(book: &WishBook) -> Vec<Wish> {
    let args: Vec<String> = std::env::args().collect();
    let loaded = match args
        .iter()
        .position(|arg| arg == "--wish")
        .and_then(|position| args.get(position + 1))
    {
        Some(id) => book.lookup(id).map(|found| found.unwrap_or_default()),
        None => book.all(),
    };

    match loaded {
        Ok(wishes) => {
            info!("{} wishes loaded", wishes.len());
            wishes
        }
        Err(err) => {
            warn!("wish book unavailable: {:#}", err);
            Vec::new()
        }
    }
}

fn update(app: &App, model: &mut Model, _update: Update) {
    let samples = model.source.stream();
    model.volume = model.probe.measure(&samples);

    let mut rng = rand::rng();
    model
        .engine
        .step(&mut rng, model.volume, app.window_rect(), &model.wishes);

    if model.notification_frames > 0 {
        model.notification_frames -= 1;
        if model.notification_frames == 0 {
            model.notification_text = None;
        }
    }
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let bounds = app.window_rect();

    // Hard clear only once; afterwards the engine's veil fades old trails
    if app.elapsed_frames() <= 1 {
        draw.background().color(BLACK);
    }

    model.engine.draw(&draw, bounds);

    if model.form.is_active() {
        model.form.draw(&draw, bounds);
    }

    if let Some(ref text) = model.notification_text {
        let alpha = (model.notification_frames as f32 / NOTIFICATION_FRAMES as f32).min(1.0);
        draw.text(text)
            .x_y(0.0, bounds.top() - 30.0)
            .color(rgba(1.0, 1.0, 1.0, alpha))
            .font_size(24);
    }

    draw.to_frame(app, &frame).unwrap();
}

fn key_pressed(app: &App, model: &mut Model, key: Key) {
    if model.form.is_active() {
        match key {
            Key::Escape => model.form.cancel(),
            Key::Back => model.form.backspace(),
            Key::Return => {
                if let Some(entry) = model.form.confirm() {
                    submit(model, entry);
                }
            }
            Key::Space => model.form.append_char(' '),
            _ => {
                if let Some(c) = key_to_char(key, app.keys.mods.shift()) {
                    model.form.append_char(c);
                }
            }
        }
        return;
    }

    match key {
        Key::Q => app.quit(),
        Key::W => model.form.open(),
        _ => select_device_by_key(app, model, key),
    }
}

fn submit(model: &mut Model, entry: WishEntry) {
    let mut rng = rand::rng();
    match model.book.append(&entry, &mut rng) {
        Ok(receipt) => {
            // Optimistic local append so the new wishes float right away
            for message in &entry.messages {
                let message = message.trim();
                if message.is_empty() {
                    continue;
                }
                model.wishes.push(Wish {
                    sender: entry.sender.clone(),
                    receiver: entry.receiver.clone(),
                    message: message.to_string(),
                });
            }
            info!("wish {} stored", receipt.id);
            model.notify(format!("Wish saved - share it at {}", receipt.link));
        }
        Err(err) => {
            warn!("wish submission failed: {:#}", err);
            model.notify("Could not save the wish".to_string());
        }
    }
}

fn select_device_by_key(app: &App, model: &mut Model, key: Key) {
    if model.source.device_count() == 0 {
        return;
    }

    let shift_offset = if app.keys.mods.shift() { 10 } else { 0 };

    let index = match key {
        Key::Key0 => Some(shift_offset),
        Key::Key1 => Some(1 + shift_offset),
        Key::Key2 => Some(2 + shift_offset),
        Key::Key3 => Some(3 + shift_offset),
        Key::Key4 => Some(4 + shift_offset),
        Key::Key5 => Some(5 + shift_offset),
        Key::Key6 => Some(6 + shift_offset),
        Key::Key7 => Some(7 + shift_offset),
        Key::Key8 => Some(8 + shift_offset),
        Key::Key9 => Some(9 + shift_offset),
        _ => None,
    };

    if let Some(index) = index {
        if let Some((name, success)) = model.source.select_device(index) {
            let message = if success {
                format!("[{}] {}", index, name)
            } else {
                format!("[{}] {} - FAILED", index, name)
            };
            model.notify(message);
        }
    }
}

/// Convert a Key to a character (alphanumeric and basic punctuation)
fn key_to_char(key: Key, shift: bool) -> Option<char> {
    let c = match key {
        Key::A => 'a',
        Key::B => 'b',
        Key::C => 'c',
        Key::D => 'd',
        Key::E => 'e',
        Key::F => 'f',
        Key::G => 'g',
        Key::H => 'h',
        Key::I => 'i',
        Key::J => 'j',
        Key::K => 'k',
        Key::L => 'l',
        Key::M => 'm',
        Key::N => 'n',
        Key::O => 'o',
        Key::P => 'p',
        Key::Q => 'q',
        Key::R => 'r',
        Key::S => 's',
        Key::T => 't',
        Key::U => 'u',
        Key::V => 'v',
        Key::W => 'w',
        Key::X => 'x',
        Key::Y => 'y',
        Key::Z => 'z',
        Key::Key0 => '0',
        Key::Key1 => '1',
        Key::Key2 => '2',
        Key::Key3 => '3',
        Key::Key4 => '4',
        Key::Key5 => '5',
        Key::Key6 => '6',
        Key::Key7 => '7',
        Key::Key8 => '8',
        Key::Key9 => '9',
        Key::Minus => '-',
        Key::Period => '.',
        Key::Comma => ',',
        Key::Apostrophe => '\'',
        Key::Underline => '_',
        _ => return None,
    };

    Some(if shift && c.is_alphabetic() {
        c.to_ascii_uppercase()
    } else {
        c
    })
}
