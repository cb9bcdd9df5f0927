use std::path::Path;

use anyhow::Context;
use rand::Rng;
use serde::{Deserialize, Serialize};

const USER_ID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const USER_ID_LEN: usize = 16;

/// The identity the bot plays under, persisted as a JSON file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    pub user_id: String,
    /// Anonymous users have no username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Set once the server has accepted the username, which can only happen once.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_username_been_set: bool,
    /// Any other keys in the file, so that saving doesn't lose them.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserConfig {
    /// Loads a config file, which must contain a `user_id` and a `username`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read '{}'", path.display()))?;
        let config: UserConfig = serde_json::from_str(&contents)
            .with_context(|| format!("'{}' is not a valid user config", path.display()))?;
        if config.user_id.is_empty() {
            anyhow::bail!("user_config must contain user_id");
        }
        if config.username.is_none() {
            anyhow::bail!("custom user_configs must contain username");
        }
        Ok(config)
    }

    /// A fresh anonymous identity with a random user id.
    pub fn anonymous<R: Rng>(rng: &mut R) -> Self {
        let user_id = (0..USER_ID_LEN)
            .map(|_| USER_ID_CHARS[rng.gen_range(0..USER_ID_CHARS.len())] as char)
            .collect();
        Self {
            user_id,
            username: None,
            has_username_been_set: false,
            extra: serde_json::Map::new(),
        }
    }

    /// Whether the username still needs to be registered with the server.
    pub fn needs_username_registration(&self) -> bool {
        self.username.is_some() && !self.has_username_been_set
    }

    /// Writes the config as JSON, indented by four spaces.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        std::fs::write(path, buf)
            .with_context(|| format!("Could not write '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join("user.json");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn load_and_save_keeps_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"{"user_id": "abc", "username": "[Bot] rando", "team": "blue"}"#,
        );
        let mut config = UserConfig::load(&path).unwrap();
        assert_eq!(config.username.as_deref(), Some("[Bot] rando"));
        assert!(config.needs_username_registration());

        config.has_username_been_set = true;
        config.save(&path).unwrap();
        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.contains("\n    \"user_id\": \"abc\""));

        let reloaded = UserConfig::load(&path).unwrap();
        assert!(!reloaded.needs_username_registration());
        assert_eq!(reloaded.extra.get("team"), Some(&serde_json::json!("blue")));
        assert_eq!(reloaded, config);
    }

    #[test]
    fn load_requires_user_id_and_username() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, r#"{"username": "nobody"}"#);
        assert!(UserConfig::load(&path).is_err());
        let path = write_config(&dir, r#"{"user_id": "abc"}"#);
        assert!(UserConfig::load(&path).is_err());
        let path = write_config(&dir, r#"{"user_id": "", "username": "x"}"#);
        assert!(UserConfig::load(&path).is_err());
        assert!(UserConfig::load(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn anonymous_user_id() {
        let config = UserConfig::anonymous(&mut StdRng::seed_from_u64(3));
        assert_eq!(config.user_id.len(), 16);
        assert!(config.user_id.chars().all(|c| c.is_ascii_alphabetic()));
        assert!(!config.needs_username_registration());
    }
}
