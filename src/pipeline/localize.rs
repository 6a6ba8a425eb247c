//! Translation of the final summary into target locales.

use super::CallPolicy;
use crate::generation::{ContentProvider, Generated};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Produces one localized rendition of a text per requested locale.
pub struct Localizer {
    provider: Arc<dyn ContentProvider>,
    policy: CallPolicy,
    default_locales: Vec<String>,
}

impl Localizer {
    pub fn new(provider: Arc<dyn ContentProvider>, policy: CallPolicy, default_locales: Vec<String>) -> Self {
        Self {
            provider,
            policy,
            default_locales,
        }
    }

    /// The locales that will actually be produced: duplicates and blanks are
    /// removed, and an empty request falls back to the configured defaults.
    pub fn resolve_locales(&self, requested: &[String]) -> Vec<String> {
        let source = if requested.iter().any(|l| !l.trim().is_empty()) {
            requested
        } else {
            self.default_locales.as_slice()
        };

        let mut locales: Vec<String> = Vec::new();
        for locale in source {
            let locale = locale.trim();
            if !locale.is_empty() && !locales.iter().any(|l| l == locale) {
                locales.push(locale.to_string());
            }
        }
        locales
    }

    /// Localize `text` into every locale concurrently. A failed locale carries
    /// its failure; the other locales are unaffected.
    #[instrument(skip_all, fields(chars = text.len()))]
    pub async fn localize_all(&self, text: &str, locales: &[String]) -> HashMap<String, Generated<String>> {
        let locales = self.resolve_locales(locales);
        info!("Localizing summary into {:?}", locales);

        let outcomes = join_all(locales.iter().map(|locale| {
            let operation = format!("localize {}", locale);
            async move {
                self.policy
                    .call(&operation, || self.provider.localize(text, locale))
                    .await
            }
        }))
        .await;

        locales.into_iter().zip(outcomes).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::ScriptedProvider;

    fn localizer(provider: Arc<ScriptedProvider>) -> Localizer {
        Localizer::new(provider, CallPolicy::default(), vec!["hi-IN".to_string()])
    }

    fn locales(list: &[&str]) -> Vec<String> {
        list.iter().map(|l| l.to_string()).collect()
    }

    #[tokio::test]
    async fn test_one_failing_locale_does_not_affect_others() {
        let provider = Arc::new(ScriptedProvider::new().fail_locale("es-ES"));
        let out = localizer(provider)
            .localize_all("Cells divide.", &locales(&["hi-IN", "es-ES"]))
            .await;

        assert_eq!(out.len(), 2);
        assert_eq!(out["hi-IN"], Generated::Ok("hi-IN:Cells divide.".to_string()));
        assert!(out["es-ES"].error().unwrap().contains("es-ES"));
    }

    #[tokio::test]
    async fn test_panicking_locale_does_not_lose_others() {
        let provider = Arc::new(ScriptedProvider::new().panic_on_locale("es-ES"));
        let out = localizer(provider)
            .localize_all("Cells divide.", &locales(&["hi-IN", "es-ES"]))
            .await;

        assert_eq!(out["hi-IN"], Generated::Ok("hi-IN:Cells divide.".to_string()));
        assert!(out["es-ES"].error().unwrap().contains("scripted panic localizing es-ES"));
    }

    #[tokio::test]
    async fn test_empty_request_uses_defaults() {
        let provider = Arc::new(ScriptedProvider::new());
        let out = localizer(provider.clone()).localize_all("Text.", &[]).await;

        assert_eq!(out.len(), 1);
        assert!(out.contains_key("hi-IN"));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_locales_are_called_once() {
        let provider = Arc::new(ScriptedProvider::new());
        let out = localizer(provider.clone())
            .localize_all("Text.", &locales(&["fr-FR", " fr-FR", "fr-FR", "de-DE"]))
            .await;

        assert_eq!(out.len(), 2);
        assert_eq!(provider.calls(), 2);
    }

    #[test]
    fn test_resolve_locales_keeps_request_order() {
        let provider = Arc::new(ScriptedProvider::new());
        let resolved = localizer(provider).resolve_locales(&locales(&["ta-IN", "", "bn-IN", "ta-IN"]));
        assert_eq!(resolved, locales(&["ta-IN", "bn-IN"]));
    }
}
