//! Catalog resolver: item URLs, existence checks, download links, and the
//! highest listed identifier.

mod extract;

pub use extract::{trailing_id, Layout};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::fetch_page::fetch_page;
use crate::http::HttpOptions;
use crate::resolver::{Catalog, DownloadDescriptor, ItemId};
use anyhow::Context;
use url::Url;

/// Network-backed `Catalog` for one catalog origin.
#[derive(Debug, Clone)]
pub struct CatalogResolver {
    base_url: String,
    /// `base_url` with a trailing slash, for resolving relative links.
    base: Url,
    http: HttpOptions,
    layout: Layout,
}

impl CatalogResolver {
    pub fn new(cfg: &CatalogConfig, http: HttpOptions) -> anyhow::Result<Self> {
        let base_url = cfg.base_url_trimmed().to_string();
        let base = Url::parse(&format!("{}/", base_url))
            .with_context(|| format!("invalid base URL {:?}", cfg.base_url))?;
        let layout = Layout::new(&cfg.layout.latest_item_selector, &cfg.layout.download_label)?;
        Ok(Self {
            base_url,
            base,
            http,
            layout,
        })
    }

    /// Rebase a download href onto the catalog.
    ///
    /// Root-relative hrefs (`/dl/5`) are appended to the full base URL, path
    /// included; other relative hrefs are joined and absolute ones kept.
    fn download_url(&self, href: &str) -> Result<Url> {
        let joined = if href.starts_with('/') && !href.starts_with("//") {
            Url::parse(&format!("{}{}", self.base_url, href))
        } else {
            self.base.join(href)
        };
        joined.map_err(|e| {
            CatalogError::Structure(format!("unusable download link {:?}: {}", href, e))
        })
    }

    fn item_download_href(&self, id: ItemId) -> Result<Option<String>> {
        let page = fetch_page(&self.item_url(id), &self.http)?;
        Ok(self.layout.download_href(&page.document))
    }
}

impl Catalog for CatalogResolver {
    fn discover_max_id(&self) -> Result<ItemId> {
        let page = fetch_page(&self.base_url, &self.http)?;
        let href = self.layout.latest_item_href(&page.document).ok_or_else(|| {
            CatalogError::Structure(format!("no latest-item link on {}", page.url))
        })?;
        let id = trailing_id(&href).ok_or_else(|| {
            CatalogError::Structure(format!("latest-item link {:?} has no numeric id", href))
        })?;
        tracing::debug!(max_id = id, href = %href, "discovered latest item");
        Ok(id)
    }

    fn item_url(&self, id: ItemId) -> String {
        format!("{}/book/{}", self.base_url, id)
    }

    fn item_exists(&self, id: ItemId) -> Result<bool> {
        Ok(self.item_download_href(id)?.is_some())
    }

    fn resolve_download(&self, id: ItemId) -> Result<DownloadDescriptor> {
        let referer = self.item_url(id);
        let href = self
            .item_download_href(id)?
            .ok_or_else(|| CatalogError::Structure(format!("no download link on {}", referer)))?;
        let url = self.download_url(&href)?;
        tracing::debug!(id, url = %url, "resolved download link");
        Ok(DownloadDescriptor {
            url: url.to_string(),
            referer,
        })
    }
}
