use std::path::PathBuf;

pub fn data_dir() -> PathBuf {
    // On macOS and Linux, use ~/.local/share/kiosk/ (XDG standard)
    // instead of macOS Application Support for consistency
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join("kiosk")
    }
    #[cfg(windows)]
    {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kiosk")
    }
}

pub fn config_dir() -> PathBuf {
    // On macOS and Linux, always use ~/.config/kiosk/
    // (avoid macOS Application Support folder for consistency)
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("kiosk")
    }
    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kiosk")
    }
}

/// Where the card-reader daemon and this front end exchange files
/// (status value, purpose fifo).  The original deployment kept them in the
/// web root; we default to a spool directory under the data dir.
pub fn spool_dir() -> PathBuf {
    data_dir().join("spool")
}
