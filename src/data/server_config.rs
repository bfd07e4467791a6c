use std::net::SocketAddr;
use std::path::PathBuf;

/// HTTP-side settings: where annotated images live and how they are published.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub output_dir: PathBuf,
    pub mount_prefix: String,
    pub label_font: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            output_dir: PathBuf::from("output"),
            mount_prefix: "/output".to_string(),
            label_font: None,
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Normalised to a single leading slash and no trailing slash.
    pub fn with_mount_prefix(mut self, prefix: &str) -> Self {
        self.mount_prefix = format!("/{}", prefix.trim_matches('/'));
        self
    }

    pub fn with_label_font(mut self, font: Option<PathBuf>) -> Self {
        self.label_font = font;
        self
    }

    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Saturates at `usize::MAX` bytes.
    pub fn with_max_upload_mb(mut self, mb: usize) -> Self {
        self.max_upload_bytes = mb.saturating_mul(1024 * 1024);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_prefix_is_normalised() {
        assert_eq!(ServerConfig::default().with_mount_prefix("output/").mount_prefix, "/output");
        assert_eq!(ServerConfig::default().with_mount_prefix("/static/out").mount_prefix, "/static/out");
    }

    #[test]
    fn huge_upload_limit_saturates() {
        assert_eq!(ServerConfig::default().with_max_upload_mb(usize::MAX).max_upload_bytes, usize::MAX);
        assert_eq!(ServerConfig::default().with_max_upload_mb(2).max_upload_bytes, 2 * 1024 * 1024);
    }
}
