// Startup configuration: CLI arguments and page definition files

pub mod pages;
pub mod yml_settings;

use clap::{Arg, ArgMatches};

pub use pages::{load_queries, PageCatalog};

const DEFAULT_BIND: &str = "127.0.0.1:8000";
const DEFAULT_QUERIES_FILE: &str = "queries.yml";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub pages_path: Option<String>,
    pub queries_path: String,
    pub bind: String,
}

impl AppConfig {
    pub fn command() -> clap::Command {
        clap::Command::new("page-compiler")
            .arg(
                Arg::new("pages")
                    .short('p')
                    .long("pages")
                    .value_name("PAGES")
                    .help("Path to a YAML file containing page definitions"),
            )
            .arg(
                Arg::new("queries")
                    .short('q')
                    .long("queries")
                    .value_name("QUERIES")
                    .help("Path to a YAML or JSON file seeding the query cache")
                    .default_value(DEFAULT_QUERIES_FILE),
            )
            .arg(
                Arg::new("bind")
                    .short('b')
                    .long("bind")
                    .value_name("ADDRESS")
                    .help("Address to listen on")
                    .default_value(DEFAULT_BIND),
            )
    }

    pub fn from_args() -> Self {
        Self::from_matches(&Self::command().get_matches())
    }

    pub fn from_matches(matches: &ArgMatches) -> Self {
        let pages_path = matches.get_one::<String>("pages").cloned();
        let queries_path = matches
            .get_one::<String>("queries")
            .map(|s| s.to_string())
            .unwrap_or_else(|| DEFAULT_QUERIES_FILE.to_string());
        let bind = matches
            .get_one::<String>("bind")
            .map(|s| s.to_string())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        Self {
            pages_path,
            queries_path,
            bind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let matches = AppConfig::command().try_get_matches_from(["page-compiler"]).unwrap();
        assert_eq!(
            AppConfig::from_matches(&matches),
            AppConfig {
                pages_path: None,
                queries_path: "queries.yml".to_string(),
                bind: "127.0.0.1:8000".to_string(),
            }
        );
    }

    #[test]
    fn test_short_flags() {
        let matches = AppConfig::command()
            .try_get_matches_from(["page-compiler", "-p", "site.yml", "-q", "fixtures.json", "-b", "0.0.0.0:3000"])
            .unwrap();
        let config = AppConfig::from_matches(&matches);
        assert_eq!(config.pages_path.as_deref(), Some("site.yml"));
        assert_eq!(config.queries_path, "fixtures.json");
        assert_eq!(config.bind, "0.0.0.0:3000");
    }
}
