//! SDL2 desktop window standing in for the watch panel

use super::Bitmap;
use crate::geometry::Point;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

/// Streaming texture at panel resolution, stretched to the window
pub struct RenderTarget<'a> {
    texture: Texture<'a>,
    scratch: Vec<u8>,
    width: u32,
    height: u32,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
}

impl Display {
    /// Window of `width * scale` by `height * scale` pixels
    pub fn with_options(
        title: &str,
        width: u32,
        height: u32,
        scale: u32,
    ) -> Result<(Self, TextureCreator<WindowContext>), String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let scale = scale.max(1);
        let window = video_subsystem
            .window(title, width * scale, height * scale)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window
            .into_canvas()
            .accelerated()
            .build()
            .map_err(|e| e.to_string())?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;

        Ok((
            Self {
                canvas,
                event_pump,
                width,
                height,
            },
            texture_creator,
        ))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Expand the 8-bit ARGB bitmap to RGBA8888 and show it
    pub fn present(&mut self, target: &mut RenderTarget, bitmap: &Bitmap<'_>) -> Result<(), String> {
        let bounds = bitmap.bounds();
        let width = target.width.min(bounds.width.max(0) as u32);
        let height = target.height.min(bounds.height.max(0) as u32);

        for y in 0..height {
            for x in 0..width {
                let p = Point::new(bounds.left() + x as i32, bounds.top() + y as i32);
                let (r, g, b) = bitmap.pixel(p).map_or((0, 0, 0), |c| c.to_rgb888());
                let idx = ((y * target.width + x) * 4) as usize;
                // RGBA8888 is ABGR in little-endian byte order
                target.scratch[idx] = 255;
                target.scratch[idx + 1] = b;
                target.scratch[idx + 2] = g;
                target.scratch[idx + 3] = r;
            }
        }

        target
            .texture
            .update(None, &target.scratch, (target.width * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.copy(&target.texture, None, None)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyDown(k)),
                _ => {},
            }
        }

        events
    }
}

impl<'a> RenderTarget<'a> {
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGBA8888, width, height)
            .map_err(|e| e.to_string())?;
        Ok(Self {
            texture,
            scratch: vec![0; (width * height * 4) as usize],
            width,
            height,
        })
    }
}
