//! The monitored targets.
//!
//! The built-in list covers the Maratón Internacional de Mendoza and the
//! Patagonian International Marathon. A YAML file with the same shape as
//! [`Target`] can replace it at runtime via `--targets`.
//!
//! ```yaml
//! - id: mendoza
//!   name: Maratón Internacional de Mendoza
//!   urls: ["https://maratondemendoza.com/"]
//!   positive_keywords: ["inscripciones"]
//!   negative_keywords: ["cerradas"]
//!   must_have_link_patterns: ['eventick\.com\.ar']
//! ```

use crate::models::Target;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Registration year being watched.
pub const DEFAULT_YEAR: &str = "2026";
/// Per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_STATE_FILE: &str = "status.json";
pub const DEFAULT_ALERT_FILE: &str = "alert.md";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Compiled-in targets.
pub static TARGETS: Lazy<Vec<Target>> = Lazy::new(|| {
    vec![
        Target {
            id: "mendoza".to_string(),
            name: "Maratón Internacional de Mendoza".to_string(),
            urls: strings(&[
                "https://maratondemendoza.com/",
                "https://maratondemendoza.com/2026/",
                "https://maratondemendoza.com/2025/",
            ]),
            positive_keywords: strings(&[
                "inscripción",
                "inscripciones",
                "inscribite",
                "registro",
                "regístrese",
                "register",
                "registration",
                "tickets",
                "venta",
                "comprar",
            ]),
            negative_keywords: strings(&[
                "cerradas",
                "cerrada",
                "agotadas",
                "sold out",
                "closed",
                "finalizó",
                "fechadas",
                "encerradas",
            ]),
            require_year: true,
            must_have_link_patterns: Some(strings(&[
                r"eventick\.com\.ar",
                r"/inscripcion",
                r"/inscripciones",
                r"/register",
                r"/registration",
            ])),
        },
        Target {
            id: "patagonia".to_string(),
            name: "Patagonian International Marathon".to_string(),
            urls: strings(&[
                "https://www.patagonianinternationalmarathon.com/en/registration",
                "https://www.patagonianinternationalmarathon.com/en/calendar",
                "https://www.patagonianinternationalmarathon.com/en/",
            ]),
            positive_keywords: strings(&[
                "registration",
                "register",
                "inscripción",
                "inscripciones",
                "inscreva-se",
                "super pre-sale",
                "pre-sale",
                "preventa",
                "venta",
                "tickets",
            ]),
            negative_keywords: strings(&[
                "has closed",
                "closed",
                "cerradas",
                "cerrada",
                "fechadas",
                "sold out",
            ]),
            require_year: true,
            must_have_link_patterns: Some(strings(&[
                r"/en/registration",
                r"/registration",
                r"wetravel\.",
                r"/register",
            ])),
        },
    ]
});

/// Parse a YAML target list, rejecting duplicate ids.
pub fn parse_targets(yaml: &str) -> Result<Vec<Target>, Box<dyn Error>> {
    let targets: Vec<Target> = serde_yaml::from_str(yaml)?;
    let mut seen = HashSet::new();
    for target in &targets {
        if !seen.insert(target.id.as_str()) {
            return Err(format!("duplicate target id `{}`", target.id).into());
        }
    }
    Ok(targets)
}

/// Resolve the target list: the YAML file when given, else the built-in list.
#[instrument(level = "info", skip_all)]
pub async fn load_targets(path: Option<&Path>) -> Result<Vec<Target>, Box<dyn Error>> {
    match path {
        Some(path) => {
            let yaml = fs::read_to_string(path).await?;
            let targets = parse_targets(&yaml)?;
            info!(path = %path.display(), count = targets.len(), "Loaded targets from file");
            Ok(targets)
        }
        None => Ok(TARGETS.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_are_unique() {
        let ids: HashSet<_> = TARGETS.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), TARGETS.len());
        assert!(ids.contains("mendoza"));
        assert!(ids.contains("patagonia"));
    }

    #[test]
    fn test_builtin_patterns_compile() {
        for target in TARGETS.iter() {
            for pattern in target.link_patterns().unwrap_or_default() {
                assert!(regex::Regex::new(pattern).is_ok(), "bad pattern {pattern}");
            }
        }
    }

    #[test]
    fn test_builtin_keywords_are_lowercase() {
        for target in TARGETS.iter() {
            for kw in target.positive_keywords.iter().chain(&target.negative_keywords) {
                assert_eq!(kw, &kw.to_lowercase());
            }
        }
    }

    #[test]
    fn test_parse_targets_defaults() {
        let yaml = r#"
- id: berlin
  name: Berlin Marathon
  urls: ["https://example.com/berlin"]
  positive_keywords: ["anmeldung"]
"#;
        let targets = parse_targets(yaml).unwrap();
        assert_eq!(targets.len(), 1);
        assert!(targets[0].require_year);
        assert!(targets[0].negative_keywords.is_empty());
        assert!(targets[0].must_have_link_patterns.is_none());
    }

    #[test]
    fn test_parse_targets_rejects_duplicates() {
        let yaml = r#"
- { id: a, name: A, urls: [], positive_keywords: [x] }
- { id: a, name: B, urls: [], positive_keywords: [y] }
"#;
        assert!(parse_targets(yaml).is_err());
    }

    #[tokio::test]
    async fn test_load_targets_without_file_uses_builtin() {
        let targets = load_targets(None).await.unwrap();
        assert_eq!(targets, *TARGETS);
    }

    #[tokio::test]
    async fn test_load_targets_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("targets.yaml");
        std::fs::write(
            &path,
            "- { id: rio, name: Rio, urls: [\"https://example.com\"], positive_keywords: [inscrições], require_year: false }\n",
        )
        .unwrap();

        let targets = load_targets(Some(&path)).await.unwrap();
        assert_eq!(targets[0].id, "rio");
        assert!(!targets[0].require_year);
    }
}
