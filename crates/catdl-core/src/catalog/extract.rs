//! Pure extraction of catalog data from parsed pages.

use scraper::{ElementRef, Html, Selector};

/// Compiled selectors for the catalog's page layout.
#[derive(Debug, Clone)]
pub struct Layout {
    latest_item: Selector,
    row: Selector,
    link: Selector,
    download_label: String,
}

impl Layout {
    pub fn new(latest_item_selector: &str, download_label: &str) -> anyhow::Result<Self> {
        Ok(Self {
            latest_item: parse_selector(latest_item_selector)?,
            row: parse_selector("tr")?,
            link: parse_selector("a[href]")?,
            download_label: download_label.trim().to_string(),
        })
    }

    /// href of the most recent item link on the catalog root page.
    pub fn latest_item_href(&self, document: &Html) -> Option<String> {
        document
            .select(&self.latest_item)
            .find_map(|a| a.value().attr("href"))
            .map(|href| href.trim().to_string())
    }

    /// href of the first link in a table row labelled with the download label.
    ///
    /// A row qualifies when its first cell's text is the label; the link is
    /// taken from the cells after it.
    pub fn download_href(&self, document: &Html) -> Option<String> {
        for row in document.select(&self.row) {
            let cells: Vec<ElementRef<'_>> = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|el| el.value().name() == "td")
                .collect();
            let Some((label, rest)) = cells.split_first() else {
                continue;
            };
            if label.text().collect::<String>().trim() != self.download_label {
                continue;
            }
            let href = rest
                .iter()
                .flat_map(|cell| cell.select(&self.link))
                .find_map(|a| a.value().attr("href"))
                .map(|href| href.trim())
                .filter(|href| !href.is_empty());
            if let Some(href) = href {
                return Some(href.to_string());
            }
        }
        None
    }
}

fn parse_selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("invalid selector {:?}: {:?}", css, e))
}

/// The last run of ASCII digits in `href`, e.g. `/book/6123/` → 6123.
pub fn trailing_id(href: &str) -> Option<u64> {
    let end = href.rfind(|c: char| c.is_ascii_digit())? + 1;
    let start = href[..end]
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    href[start..end].parse().ok()
}
