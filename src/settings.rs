use anyhow::{bail, Context, Result};
use std::path::PathBuf;

const USAGE: &str = "Usage: soulfarm [--dry-run] [--profile <name>] [--config <path>] [--assets <dir>]";

/// Startup options. Command-line flags win over environment variables,
/// which win over the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Profile store (`SOULFARM_CONFIG`, default `config.json`)
    pub config_path: PathBuf,
    /// Template images (`SOULFARM_ASSETS`, default `assets`)
    pub assets_dir: PathBuf,
    /// Profile to load instead of the store's current one (`SOULFARM_PROFILE`)
    pub profile: Option<String>,
    pub dry_run: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    fn parse<I, E>(args: I, env: E) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings {
            config_path: env("SOULFARM_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("config.json")),
            assets_dir: env("SOULFARM_ASSETS")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("assets")),
            profile: env("SOULFARM_PROFILE").filter(|p| !p.is_empty()),
            dry_run: false,
        };

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--dry-run" => settings.dry_run = true,
                "--profile" => {
                    settings.profile = Some(args.next().context("--profile needs a name")?);
                }
                "--config" => {
                    settings.config_path = args.next().context("--config needs a path")?.into();
                }
                "--assets" => {
                    settings.assets_dir = args.next().context("--assets needs a directory")?.into();
                }
                other => bail!("Unknown argument '{}'\n{}", other, USAGE),
            }
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Settings> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::parse(args.iter().map(|s| s.to_string()), |k| env.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = parse(&[], &[]).unwrap();
        assert_eq!(s.config_path, PathBuf::from("config.json"));
        assert_eq!(s.assets_dir, PathBuf::from("assets"));
        assert_eq!(s.profile, None);
        assert!(!s.dry_run);
    }

    #[test]
    fn test_flags_override_env() {
        let s = parse(
            &["--profile", "1440p", "--dry-run", "--config", "alt.json"],
            &[("SOULFARM_PROFILE", "1080p"), ("SOULFARM_ASSETS", "/srv/assets")],
        )
        .unwrap();
        assert_eq!(s.profile.as_deref(), Some("1440p"));
        assert_eq!(s.config_path, PathBuf::from("alt.json"));
        assert_eq!(s.assets_dir, PathBuf::from("/srv/assets"));
        assert!(s.dry_run);
    }

    #[test]
    fn test_empty_profile_env_is_ignored() {
        let s = parse(&[], &[("SOULFARM_PROFILE", "")]).unwrap();
        assert_eq!(s.profile, None);
    }

    #[test]
    fn test_bad_arguments() {
        assert!(parse(&["--profile"], &[]).is_err());
        let err = parse(&["--fast"], &[]).unwrap_err();
        assert!(err.to_string().contains("--fast"));
    }
}
