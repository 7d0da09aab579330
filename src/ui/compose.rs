//! Keyboard-driven wish submission overlay.
//!
//! Collects the sender first, then an optional receiver, then any number of
//! message lines. Enter confirms a field, Enter on an empty message line
//! submits, Escape closes the overlay.

use nannou::prelude::*;

use crate::wishes::WishEntry;

const PADDING: f32 = 20.0;
const LINE_HEIGHT: f32 = 22.0;
const FONT_SIZE: u32 = 18;

/// Which field is currently being typed
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Stage {
    Sender,
    Receiver,
    Message,
}

pub struct WishForm {
    active: bool,
    stage: Stage,
    input: String,
    sender: String,
    receiver: Option<String>,
    messages: Vec<String>,
}

impl WishForm {
    pub fn new() -> Self {
        Self {
            active: false,
            stage: Stage::Sender,
            input: String::new(),
            sender: String::new(),
            receiver: None,
            messages: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Open a fresh form, discarding any half-typed submission.
    pub fn open(&mut self) {
        *self = Self::new();
        self.active = true;
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn append_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Confirm the current field. Returns the finished submission once the
    /// user confirms an empty message line with at least one message queued.
    pub fn confirm(&mut self) -> Option<WishEntry> {
        let text = self.input.trim().to_string();
        match self.stage {
            Stage::Sender => {
                if text.is_empty() {
                    return None;
                }
                self.sender = text;
                self.input.clear();
                self.stage = Stage::Receiver;
                None
            }
            Stage::Receiver => {
                // An empty receiver addresses the wish to everyone
                self.receiver = if text.is_empty() { None } else { Some(text) };
                self.input.clear();
                self.stage = Stage::Message;
                None
            }
            Stage::Message => {
                if !text.is_empty() {
                    self.messages.push(text);
                    self.input.clear();
                    return None;
                }
                if self.messages.is_empty() {
                    return None;
                }
                self.active = false;
                Some(WishEntry {
                    sender: std::mem::take(&mut self.sender),
                    receiver: self.receiver.take(),
                    messages: std::mem::take(&mut self.messages),
                })
            }
        }
    }

    pub fn draw(&self, draw: &Draw, bounds: Rect) {
        let mut lines: Vec<(String, Rgba)> = Vec::new();
        let white = rgba(1.0, 1.0, 1.0, 1.0);
        let dim = rgba(1.0, 1.0, 1.0, 0.5);
        let highlight = rgba(1.0, 0.85, 0.3, 1.0);

        lines.push(("Send a wish".to_string(), highlight));
        lines.push((self.field_line(Stage::Sender, "From", &self.sender), white));
        let receiver = self.receiver.clone().unwrap_or_default();
        lines.push((self.field_line(Stage::Receiver, "To", &receiver), white));
        for (i, message) in self.messages.iter().enumerate() {
            lines.push((format!("  {}. {}", i + 1, message), white));
        }
        if self.stage == Stage::Message {
            lines.push((format!("Wish: {}_", self.input), white));
            lines.push((
                "Enter adds another line, Enter on empty sends, Esc closes".to_string(),
                dim,
            ));
        } else {
            lines.push(("Enter confirms, Esc closes".to_string(), dim));
        }

        let overlay_width = bounds.w() - PADDING * 2.0;
        let overlay_height = LINE_HEIGHT * lines.len() as f32 + PADDING * 2.0;
        let overlay_y = bounds.top() - overlay_height / 2.0 - PADDING;

        draw.rect()
            .x_y(0.0, overlay_y)
            .w_h(overlay_width, overlay_height)
            .color(rgba(0.0, 0.0, 0.0, 0.85));

        let top = overlay_y + overlay_height / 2.0 - PADDING - LINE_HEIGHT / 2.0;
        for (i, (text, color)) in lines.iter().enumerate() {
            draw.text(text)
                .xy(pt2(0.0, top - LINE_HEIGHT * i as f32))
                .wh(pt2(overlay_width, LINE_HEIGHT))
                .left_justify()
                .no_line_wrap()
                .color(*color)
                .font_size(FONT_SIZE);
        }
    }

    fn field_line(&self, stage: Stage, label: &str, value: &str) -> String {
        if self.stage == stage {
            format!("{}: {}_", label, self.input)
        } else {
            format!("{}: {}", label, value)
        }
    }
}
