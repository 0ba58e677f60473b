use std::path::Path;

use rainfall_core::PagesConfig;
use rainfall_model::Outlook;

const INDEX_FILE: &str = "index.html";
const CHANCE_FILE: &str = "chance.html";
const NO_CHANCE_FILE: &str = "noChance.html";

/// The three static pages, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pages {
    pub index: String,
    pub chance: String,
    pub no_chance: String,
}

impl Default for Pages {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Pages {
    pub fn builtin() -> Self {
        Self {
            index: include_str!("../templates/index.html").to_string(),
            chance: include_str!("../templates/chance.html").to_string(),
            no_chance: include_str!("../templates/noChance.html").to_string(),
        }
    }

    /// Pages from `template_dir`, falling back to the built-in page for any
    /// file that is missing or unreadable.
    pub fn from_config(config: &PagesConfig) -> Self {
        let builtin = Self::builtin();
        let Some(dir) = config.template_dir.as_deref() else {
            return builtin;
        };

        Self {
            index: read_or(dir, INDEX_FILE, builtin.index),
            chance: read_or(dir, CHANCE_FILE, builtin.chance),
            no_chance: read_or(dir, NO_CHANCE_FILE, builtin.no_chance),
        }
    }

    pub fn result_page(&self, outlook: Outlook) -> &str {
        match outlook {
            Outlook::Chance => &self.chance,
            Outlook::NoChance => &self.no_chance,
        }
    }
}

fn read_or(dir: &Path, name: &str, fallback: String) -> String {
    let path = dir.join(name);
    match std::fs::read_to_string(&path) {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("Using built-in {}: cannot read {}: {}", name, path.display(), e);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_pages_differ() {
        let pages = Pages::builtin();
        assert_ne!(pages.chance, pages.no_chance);
        assert!(pages.index.contains("action=\"/predict\""));
    }

    #[test]
    fn test_template_dir_overrides_per_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CHANCE_FILE), "<p>umbrella</p>").unwrap();

        let pages = Pages::from_config(&PagesConfig {
            template_dir: Some(dir.path().to_path_buf()),
        });

        assert_eq!(pages.chance, "<p>umbrella</p>");
        assert_eq!(pages.no_chance, Pages::builtin().no_chance);
    }

    #[test]
    fn test_result_page_by_outlook() {
        let pages = Pages {
            index: String::new(),
            chance: "rain".into(),
            no_chance: "dry".into(),
        };
        assert_eq!(pages.result_page(Outlook::Chance), "rain");
        assert_eq!(pages.result_page(Outlook::NoChance), "dry");
    }
}
