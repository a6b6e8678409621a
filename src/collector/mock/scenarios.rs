//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc/modules` states.

use super::filesystem::MockFs;

/// Default location used by the scenarios.
const PROC_MODULES: &str = "/proc/modules";

impl MockFs {
    /// Creates a typical desktop system with filesystem, crypto and a
    /// proprietary GPU driver loaded.
    pub fn typical_system() -> Self {
        let mut fs = Self::new();
        fs.add_file(
            PROC_MODULES,
            "\
nvidia_drm 126976 4 - Live 0xffffffffc2a80000 (POE)
nvidia_uvm 1806336 0 - Live 0xffffffffc2400000 (POE)
nvidia_modeset 1560576 2 nvidia_drm, Live 0xffffffffc2200000 (POE)
nvidia 56807424 96 nvidia_uvm,nvidia_modeset, Live 0xffffffffc0e00000 (POE)
ext4 1015808 1 - Live 0xffffffffc0a00000
jbd2 180224 1 ext4, Live 0xffffffffc09c0000
mbcache 16384 1 ext4, Live 0xffffffffc09b0000
crc32c_intel 24576 2 - Live 0xffffffffc09a0000
",
        );
        fs
    }

    /// Creates a system where a module is in the middle of loading and
    /// another is being removed. Addresses are hidden (kptr_restrict).
    pub fn modules_in_transition() -> Self {
        let mut fs = Self::new();
        fs.add_file(
            PROC_MODULES,
            "\
vboxdrv 696320 0 - Loading 0x0000000000000000 (OE+)
btusb 77824 0 - Unloading 0x0000000000000000 (-)
bluetooth 999424 1 btusb, Live 0x0000000000000000
",
        );
        fs
    }

    /// Creates a listing that is cut off by a read error after two lines.
    pub fn truncated_read() -> Self {
        let mut fs = Self::new();
        fs.add_failing_file(
            PROC_MODULES,
            "\
ext4 1015808 1 - Live 0xffffffffc0a00000
jbd2 180224 1 ext4, Live 0xffffffffc09c0000
",
        );
        fs
    }
}
