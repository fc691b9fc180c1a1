use log::warn;
use minifb::{Window, WindowOptions};

/// Live view of the output buffer while workers fill it in. Tearing is
/// fine: partial frames are transient.
pub struct Preview {
    window: Window,
    argb: Vec<u32>,
    width: usize,
    height: usize,
    alive: bool,
}

impl Preview {
    /// `None` (with a warning) when no window can be created, so a
    /// headless run still renders.
    pub fn create(width: u32, height: u32) -> Option<Preview> {
        match Window::new("prism", width as usize, height as usize, WindowOptions::default()) {
            Ok(mut window) => {
                window.set_target_fps(60);
                Some(Preview {
                    window,
                    argb: vec![0; (width * height) as usize],
                    width: width as usize,
                    height: height as usize,
                    alive: true,
                })
            }
            Err(e) => {
                warn!("cannot open preview window, rendering headless: {e}");
                None
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.alive && self.window.is_open()
    }

    /// Re-upload the RGB byte buffer.
    pub fn update(&mut self, rgb: &[u8]) {
        if !self.alive {
            return;
        }
        for (argb, px) in self.argb.iter_mut().zip(rgb.chunks_exact(3)) {
            *argb = (px[0] as u32) << 16 | (px[1] as u32) << 8 | px[2] as u32;
        }
        if let Err(e) = self.window.update_with_buffer(&self.argb, self.width, self.height) {
            warn!("preview update failed, closing it: {e}");
            self.alive = false;
        }
    }
}
