//! Common renderer trait for emulated video hardware
//!
//! A system keeps its video state (VRAM, palette, caches) in its own
//! components and exposes the finished picture through this trait:
//!
//! ```text
//! System (state management) -> Renderer trait -> Frame
//! ```
//!
//! ```rust,ignore
//! use emu_core::renderer::Renderer;
//! use emu_core::types::Frame;
//!
//! struct Compositor {
//!     frame: Frame,
//! }
//!
//! impl Renderer for Compositor {
//!     fn get_frame(&self) -> &Frame {
//!         &self.frame
//!     }
//!
//!     fn clear(&mut self, color: u32) {
//!         self.frame.pixels.fill(color);
//!     }
//!
//!     fn reset(&mut self) {
//!         self.clear(0xFF000000);
//!     }
//!
//!     fn resize(&mut self, width: u32, height: u32) {
//!         self.frame = Frame::new(width, height);
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Compositor"
//!     }
//! }
//! ```

use crate::types::Frame;

/// Common renderer trait for all emulated graphics hardware
pub trait Renderer {
    /// Get the current framebuffer (read-only)
    fn get_frame(&self) -> &Frame;

    /// Clear the framebuffer with a solid ARGB8888 color (0xAARRGGBB)
    fn clear(&mut self, color: u32);

    /// Reset the renderer to its initial state
    ///
    /// This should clear the framebuffer and drop any cached state
    /// (decoded tiles, palettes, etc.).
    fn reset(&mut self);

    /// Get the name of this renderer (for debugging/UI)
    fn name(&self) -> &str;

    /// Recreate the framebuffer at new dimensions
    fn resize(&mut self, width: u32, height: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockRenderer {
        frame: Frame,
    }

    impl Renderer for MockRenderer {
        fn get_frame(&self) -> &Frame {
            &self.frame
        }

        fn clear(&mut self, color: u32) {
            self.frame.pixels.fill(color);
        }

        fn reset(&mut self) {
            self.clear(0xFF000000);
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.frame = Frame::new(width, height);
        }

        fn name(&self) -> &str {
            "Mock Renderer"
        }
    }

    #[test]
    fn test_renderer_clear_and_reset() {
        let mut renderer = MockRenderer {
            frame: Frame::new(256, 224),
        };
        renderer.clear(0xFFFF0000);
        assert!(renderer.get_frame().pixels.iter().all(|&p| p == 0xFFFF0000));

        renderer.reset();
        assert!(renderer.get_frame().pixels.iter().all(|&p| p == 0xFF000000));
    }

    #[test]
    fn test_renderer_resize() {
        let mut renderer = MockRenderer {
            frame: Frame::new(256, 224),
        };
        renderer.resize(224, 256);

        let frame = renderer.get_frame();
        assert_eq!(frame.width, 224);
        assert_eq!(frame.height, 256);
        assert_eq!(frame.pixels.len(), 224 * 256);
    }
}
