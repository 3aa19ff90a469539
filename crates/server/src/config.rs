use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use library::{LibraryOptions, DEFAULT_STATIC_PREFIX};
use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: u32 = 1;
const DEFAULT_PORT: u16 = 25884;
const DEFAULT_MUSIC_ROOT: &str = "localmusic";
const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_PLACEHOLDER_COVER: &str = "/images/song.jpg";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub version: u32,
    pub music_root: String,
    pub bind_host: String,
    pub port: u16,
    pub static_prefix: String,
    pub serve_static: bool,
    pub placeholder_cover: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            music_root: DEFAULT_MUSIC_ROOT.to_string(),
            bind_host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_PORT,
            static_prefix: DEFAULT_STATIC_PREFIX.to_string(),
            serve_static: true,
            placeholder_cover: DEFAULT_PLACEHOLDER_COVER.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    pub fn library_options(&self, config_path: &Path) -> LibraryOptions {
        LibraryOptions {
            root: self.music_root_path(config_path),
            static_prefix: self.static_prefix.clone(),
            placeholder_cover: self.placeholder_cover.clone(),
        }
    }

    /// The music root on disk. Relative roots are taken from the directory
    /// holding the config file, so a relocated install keeps its library.
    pub fn music_root_path(&self, config_path: &Path) -> PathBuf {
        let root = Path::new(self.music_root.trim());
        if root.is_absolute() {
            return root.to_path_buf();
        }
        match config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(root),
            _ => root.to_path_buf(),
        }
    }

    fn normalize(&mut self) {
        if self.version < CONFIG_VERSION {
            self.version = CONFIG_VERSION;
        }
        if self.music_root.trim().is_empty() {
            self.music_root = DEFAULT_MUSIC_ROOT.to_string();
        }
        if self.bind_host.trim().is_empty() {
            self.bind_host = DEFAULT_BIND_HOST.to_string();
        }
        if self.port == 0 {
            self.port = DEFAULT_PORT;
        }
        self.static_prefix = normalize_prefix(&self.static_prefix);
        if self.placeholder_cover.trim().is_empty() {
            self.placeholder_cover = DEFAULT_PLACEHOLDER_COVER.to_string();
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {}", err),
            ConfigError::Yaml(err) => write!(f, "yaml error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err)
    }
}

pub fn config_path_from_env() -> PathBuf {
    match env::var("LOCALMUSIC_CONFIG") {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => default_config_path(),
    }
}

fn default_config_path() -> PathBuf {
    match env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(|dir| dir.join("config.yaml"))
            .unwrap_or_else(|| PathBuf::from("config.yaml")),
        Err(_) => PathBuf::from("config.yaml"),
    }
}

/// Loads the config, writing a default one first if none exists. The bool
/// reports whether the file was created.
pub fn load_or_create_config(path: &Path) -> Result<(ServerConfig, bool), ConfigError> {
    if path.exists() {
        let contents = fs::read_to_string(path)?;
        let mut config: ServerConfig = serde_yaml::from_str(&contents)?;
        config.normalize();
        return Ok((config, false));
    }

    Ok((write_default_config(path)?, true))
}

fn write_default_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let config = ServerConfig::default();
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)?,
        _ => {}
    }
    fs::write(path, serde_yaml::to_string(&config)?)?;
    Ok(config)
}

fn normalize_prefix(value: &str) -> String {
    let trimmed = value.trim().trim_matches('/');
    if trimmed.is_empty() {
        DEFAULT_STATIC_PREFIX.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_default_config_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("config.yaml");

        let (config, created) = load_or_create_config(&path).unwrap();
        assert!(created);
        assert!(path.exists());
        assert_eq!(config.port, DEFAULT_PORT);

        let (again, created) = load_or_create_config(&path).unwrap();
        assert!(!created);
        assert_eq!(again.music_root, DEFAULT_MUSIC_ROOT);
    }

    #[test]
    fn fills_blank_fields_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "music_root: ''\nport: 0\nstatic_prefix: 'songs/'\nplaceholder_cover: ' '\n",
        )
        .unwrap();

        let (config, _) = load_or_create_config(&path).unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.music_root, DEFAULT_MUSIC_ROOT);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.static_prefix, "/songs");
        assert_eq!(config.placeholder_cover, DEFAULT_PLACEHOLDER_COVER);
        assert!(config.serve_static);
    }

    #[test]
    fn resolves_music_root_next_to_config() {
        let config = ServerConfig::default();
        let options = config.library_options(Path::new("/srv/app/config.yaml"));
        assert_eq!(options.root, PathBuf::from("/srv/app/localmusic"));
        assert_eq!(options.static_prefix, "/localmusic");
    }

    #[test]
    fn absolute_or_bare_music_roots_are_kept() {
        let config = ServerConfig {
            music_root: " /data/music ".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(
            config.music_root_path(Path::new("/srv/app/config.yaml")),
            PathBuf::from("/data/music")
        );
        assert_eq!(
            ServerConfig::default().music_root_path(Path::new("config.yaml")),
            PathBuf::from("localmusic")
        );
    }
}
