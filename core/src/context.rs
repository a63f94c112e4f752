use crate::manifest::ManifestDocument;
use serde::{Deserialize, Serialize};
use url::Url;

/// What the page's registered service worker reported, if one was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceWorkerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(
        default,
        alias = "scriptURL",
        alias = "scriptUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub script_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Discovered,
    Generated,
    Edited,
}

/// Snapshot a scan runs against. Built once per scan, never mutated by rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationContext {
    #[serde(default, alias = "manifestUrl")]
    pub manifest_url: Option<String>,
    #[serde(default)]
    pub manifest: Option<ManifestDocument>,
    #[serde(alias = "siteUrl")]
    pub site_url: String,
    #[serde(default, alias = "isGenerated")]
    pub is_generated: bool,
    #[serde(default, alias = "isEdited")]
    pub is_edited: bool,
    #[serde(default, alias = "serviceWorkerInfo", alias = "serviceWorker")]
    pub service_worker: Option<ServiceWorkerInfo>,
}

impl ValidationContext {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
            ..Self::default()
        }
    }

    pub fn with_manifest(mut self, manifest: ManifestDocument) -> Self {
        self.manifest = Some(manifest);
        self
    }

    pub fn with_manifest_url(mut self, url: impl Into<String>) -> Self {
        self.manifest_url = Some(url.into());
        self
    }

    pub fn with_service_worker(mut self, sw: ServiceWorkerInfo) -> Self {
        self.service_worker = Some(sw);
        self
    }

    pub fn generated(mut self, is_generated: bool) -> Self {
        self.is_generated = is_generated;
        self
    }

    pub fn edited(mut self, is_edited: bool) -> Self {
        self.is_edited = is_edited;
        self
    }

    pub fn provenance(&self) -> Provenance {
        if self.is_generated {
            Provenance::Generated
        } else if self.is_edited {
            Provenance::Edited
        } else {
            Provenance::Discovered
        }
    }

    pub fn site(&self) -> Option<Url> {
        Url::parse(self.site_url.trim()).ok()
    }

    pub fn manifest_location(&self) -> Option<Url> {
        self.manifest_url
            .as_deref()
            .and_then(|u| Url::parse(u.trim()).ok())
    }

    /// Base for manifest-relative members: the manifest URL, else the site URL.
    pub fn manifest_base(&self) -> Option<Url> {
        self.manifest_location().or_else(|| self.site())
    }

    pub fn resolve(&self, reference: &str) -> Option<Url> {
        let base = self.manifest_base()?;
        base.join(reference.trim()).ok()
    }

    /// Resolves against the site URL; service worker members are page-relative.
    pub fn resolve_on_site(&self, reference: &str) -> Option<Url> {
        let base = self.site()?;
        base.join(reference.trim()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_camel_case_context() {
        let ctx: ValidationContext = serde_json::from_value(json!({
            "siteUrl": "https://example.com/app/",
            "manifestUrl": "https://example.com/app/manifest.json",
            "isGenerated": true,
            "serviceWorkerInfo": {"scope": "/app/", "scriptURL": "/app/sw.js"},
            "manifest": {"name": "Demo"}
        }))
        .unwrap();
        assert_eq!(ctx.provenance(), Provenance::Generated);
        assert_eq!(
            ctx.service_worker.unwrap().script_url.as_deref(),
            Some("/app/sw.js")
        );
        assert_eq!(ctx.manifest.unwrap().display_name(), "Demo");
    }

    #[test]
    fn relative_members_resolve_against_manifest_then_site() {
        let ctx = ValidationContext::new("https://example.com/page/index.html");
        assert_eq!(
            ctx.resolve("start").unwrap().as_str(),
            "https://example.com/page/start"
        );
        let ctx = ctx.with_manifest_url("https://cdn.example.com/m/manifest.json");
        assert_eq!(
            ctx.resolve("start").unwrap().as_str(),
            "https://cdn.example.com/m/start"
        );
        assert_eq!(
            ctx.resolve_on_site("/sw.js").unwrap().as_str(),
            "https://example.com/sw.js"
        );
    }

    #[test]
    fn unparseable_site_resolves_nothing() {
        let ctx = ValidationContext::new("not a url");
        assert!(ctx.site().is_none());
        assert!(ctx.resolve("/").is_none());
    }
}
