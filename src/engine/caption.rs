//! Floating wish caption.
//!
//! A caption is anchored where a shell burst and carries one stored wish.
//! It drifts upward, scales in from small, and runs a fade-in / hold /
//! fade-out opacity envelope over a fixed number of frames. Captions are
//! drawn with normal blending so the text stays readable on top of the
//! additively-blended spark light.

use nannou::prelude::*;

use crate::wishes::Wish;

/// Frames of linear fade-in at the start of life
const FADE_IN_FRAMES: u32 = 40;
/// Frames of linear fade-out at the end of life
const FADE_OUT_FRAMES: u32 = 30;
/// Upward drift per frame
const DRIFT: f32 = 0.3;
/// Scale at creation
const INITIAL_SCALE: f32 = 0.2;
/// Scale gained per frame until full size
const SCALE_STEP: f32 = 0.02;
/// Font size of the "sender -> receiver" line
const HEADER_FONT_SIZE: u32 = 18;
/// Font size of the message line
const MESSAGE_FONT_SIZE: u32 = 28;
/// Vertical offset of the header line above the message
const HEADER_OFFSET: f32 = 25.0;
/// Offset of the hue-tinted drop shadow
const SHADOW_OFFSET: f32 = 1.5;

pub struct Caption {
    /// Anchor position, fixed at creation (drifts, never follows sparks)
    x: f32,
    y: f32,
    wish: Wish,
    /// Inherited from the triggering burst
    hue: f32,
    /// Frames lived so far
    life: u32,
    max_life: u32,
    /// Grows from `INITIAL_SCALE` to 1.0 and holds
    scale: f32,
}

impl Caption {
    pub fn new(x: f32, y: f32, wish: Wish, hue: f32, max_life: u32) -> Self {
        Self {
            x,
            y,
            wish,
            hue,
            life: 0,
            max_life,
            scale: INITIAL_SCALE,
        }
    }

    pub fn update(&mut self) {
        self.y += DRIFT;
        self.life += 1;
        if self.scale < 1.0 {
            self.scale = (self.scale + SCALE_STEP).min(1.0);
        }
    }

    pub fn expired(&self) -> bool {
        self.life >= self.max_life
    }

    /// Fade-in, hold, fade-out envelope as a function of frames lived.
    pub fn opacity(&self) -> f32 {
        let alpha = if self.life < FADE_IN_FRAMES {
            self.life as f32 / FADE_IN_FRAMES as f32
        } else if self.life + FADE_OUT_FRAMES > self.max_life {
            self.max_life.saturating_sub(self.life) as f32 / FADE_OUT_FRAMES as f32
        } else {
            1.0
        };
        alpha.clamp(0.0, 1.0)
    }

    pub fn wish(&self) -> &Wish {
        &self.wish
    }

    pub fn draw(&self, draw: &Draw) {
        let alpha = self.opacity();
        let draw = draw.translate(vec3(self.x, self.y, 0.0)).scale(self.scale);

        let header = match &self.wish.receiver {
            Some(receiver) => format!("{} \u{2192} {}", self.wish.sender, receiver),
            None => self.wish.sender.clone(),
        };

        let shadow = hsla(self.hue / 360.0, 1.0, 0.5, alpha * 0.6);
        draw.text(&header)
            .x_y(SHADOW_OFFSET, HEADER_OFFSET - SHADOW_OFFSET)
            .font_size(HEADER_FONT_SIZE)
            .no_line_wrap()
            .color(shadow);
        draw.text(&self.wish.message)
            .x_y(SHADOW_OFFSET, -SHADOW_OFFSET)
            .font_size(MESSAGE_FONT_SIZE)
            .no_line_wrap()
            .color(shadow);

        draw.text(&header)
            .x_y(0.0, HEADER_OFFSET)
            .font_size(HEADER_FONT_SIZE)
            .no_line_wrap()
            .color(hsla(self.hue / 360.0, 1.0, 0.85, alpha));
        draw.text(&self.wish.message)
            .x_y(0.0, 0.0)
            .font_size(MESSAGE_FONT_SIZE)
            .no_line_wrap()
            .color(rgba(1.0, 1.0, 1.0, alpha));
    }
}
