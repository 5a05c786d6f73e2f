//! Core emulator primitives and traits.

pub mod logging;
pub mod m68k_bus;
pub mod ppu;
pub mod renderer;
pub mod types {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Frame {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u32>,
    }

    impl Frame {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![0; (width * height) as usize],
            }
        }

        /// Read one pixel, `None` outside the frame
        pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
            if x >= self.width || y >= self.height {
                return None;
            }
            self.pixels.get((y * self.width + x) as usize).copied()
        }
    }
}

/// Description of a mount point (media slot) that a system supports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPointInfo {
    /// Unique identifier for this mount point (e.g., "maincpu", "gfx1")
    pub id: String,
    /// User-friendly name for display (e.g., "Program ROM")
    pub name: String,
    /// File extensions accepted by this mount point
    pub extensions: Vec<String>,
    /// Whether this mount point is required for the system to function
    pub required: bool,
}

/// A high-level System trait tying components together.
pub trait System {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reset to initial power-on state
    fn reset(&mut self);

    /// Emulate until a frame is produced and return a framebuffer.
    fn step_frame(&mut self) -> Result<types::Frame, Self::Error>;

    /// Get the list of mount points this system supports
    fn mount_points(&self) -> Vec<MountPointInfo>;

    /// Load media into a specific mount point
    fn mount(&mut self, mount_point_id: &str, data: &[u8]) -> Result<(), Self::Error>;

    /// Unload media from a specific mount point
    fn unmount(&mut self, mount_point_id: &str) -> Result<(), Self::Error>;

    /// Check if a mount point has media loaded
    fn is_mounted(&self, mount_point_id: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_initialization() {
        let f = types::Frame::new(10, 10);
        assert_eq!(f.pixels.len(), 100);
        assert_eq!(f.width, 10);
        assert_eq!(f.height, 10);
    }

    #[test]
    fn frame_pixel_bounds() {
        let mut f = types::Frame::new(4, 2);
        f.pixels[5] = 0xFF112233;
        assert_eq!(f.pixel(1, 1), Some(0xFF112233));
        assert_eq!(f.pixel(4, 0), None);
        assert_eq!(f.pixel(0, 2), None);
    }

    struct MockSystem {
        mounted: bool,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("Invalid mount point: {0}")]
    struct MockError(String);

    impl System for MockSystem {
        type Error = MockError;

        fn reset(&mut self) {}

        fn step_frame(&mut self) -> Result<types::Frame, Self::Error> {
            Ok(types::Frame::new(2, 2))
        }

        fn mount_points(&self) -> Vec<MountPointInfo> {
            vec![MountPointInfo {
                id: "maincpu".to_string(),
                name: "Program ROM".to_string(),
                extensions: vec!["bin".to_string()],
                required: true,
            }]
        }

        fn mount(&mut self, mount_point_id: &str, _data: &[u8]) -> Result<(), Self::Error> {
            if mount_point_id != "maincpu" {
                return Err(MockError(mount_point_id.to_string()));
            }
            self.mounted = true;
            Ok(())
        }

        fn unmount(&mut self, _mount_point_id: &str) -> Result<(), Self::Error> {
            self.mounted = false;
            Ok(())
        }

        fn is_mounted(&self, mount_point_id: &str) -> bool {
            mount_point_id == "maincpu" && self.mounted
        }
    }

    #[test]
    fn test_system_mount_operations() {
        let mut sys = MockSystem { mounted: false };
        assert!(!sys.is_mounted("maincpu"));

        assert!(sys.mount("maincpu", &[1, 2, 3]).is_ok());
        assert!(sys.is_mounted("maincpu"));

        let err = sys.mount("cartridge", &[]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid mount point: cartridge");

        assert!(sys.unmount("maincpu").is_ok());
        assert!(!sys.is_mounted("maincpu"));
    }

    #[test]
    fn test_system_mount_points() {
        let sys = MockSystem { mounted: false };
        let mount_points = sys.mount_points();

        assert_eq!(mount_points.len(), 1);
        assert_eq!(mount_points[0].id, "maincpu");
        assert!(mount_points[0].required);
    }
}
