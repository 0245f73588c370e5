//! Site crawler (spec §4.2.2): BFS/DFS exploration over an internal queue,
//! internal/external link classification by host suffix match, form
//! extraction with the GET-or-all-fields-inert retention rule, and halting
//! on queue-empty, `max_pages`, depth limit, or cancellation.

use std::collections::{HashSet, VecDeque};

use scraper::{Html, Selector};
use url::Url;

use crate::collaborators::{BrowserDriver, CollaboratorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueDiscipline {
    Bfs,
    Dfs,
}

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub max_pages: usize,
    pub max_depth: u32,
    pub discipline: QueueDiscipline,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_pages: 50,
            max_depth: 3,
            discipline: QueueDiscipline::Bfs,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub field_type: String,
    pub inert: bool, // hidden, readonly, or disabled
}

#[derive(Debug, Clone)]
pub struct ExtractedForm {
    pub action: Option<String>,
    pub method: String,
    pub fields: Vec<FormField>,
}

impl ExtractedForm {
    /// Spec rule: "GET forms and forms whose every field is
    /// hidden/readonly/disabled are retained; others are elided."
    pub fn should_retain(&self) -> bool {
        self.method.eq_ignore_ascii_case("get") || self.fields.iter().all(|f| f.inert)
    }
}

#[derive(Debug, Clone)]
pub struct CrawledPage {
    pub url: String,
    pub depth: u32,
    pub html: String,
    pub internal_links: Vec<String>,
    pub external_links: Vec<String>,
    pub forms: Vec<ExtractedForm>,
}

#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub pages: Vec<CrawledPage>,
    pub halted_reason: HaltReason,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HaltReason {
    #[default]
    QueueEmpty,
    MaxPagesReached,
    DepthLimitExceeded,
    Cancelled,
}

/// Normalizes a URL for the visited set: strips the fragment, keeps
/// scheme+host+path+query.
fn normalize(url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized.to_string()
}

/// A link's host is internal iff it equals the start host or is a
/// sub/super-domain of it by suffix match.
fn is_internal_host(candidate_host: &str, start_host: &str) -> bool {
    candidate_host == start_host
        || candidate_host.ends_with(&format!(".{start_host}"))
        || start_host.ends_with(&format!(".{candidate_host}"))
}

fn extract_links(base: &Url, html: &Html) -> Vec<Url> {
    let selector = Selector::parse("a[href]").unwrap();
    html.select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .collect()
}

/// Every form on the page, with no retention filtering applied. The URL
/// Exploration phase (spec §4.7) wants every form it can find, not just the
/// ones the content-ingestion path keeps.
pub fn extract_forms_raw(html: &Html) -> Vec<ExtractedForm> {
    let form_selector = Selector::parse("form").unwrap();
    let field_selector = Selector::parse("input, select, textarea").unwrap();

    html.select(&form_selector)
        .map(|form_el| {
            let method = form_el
                .value()
                .attr("method")
                .unwrap_or("get")
                .to_string();
            let action = form_el.value().attr("action").map(str::to_string);
            let fields = form_el
                .select(&field_selector)
                .map(|field_el| {
                    let attrs = field_el.value();
                    let name = attrs.attr("name").unwrap_or_default().to_string();
                    let field_type = attrs.attr("type").unwrap_or("text").to_string();
                    let inert = field_type.eq_ignore_ascii_case("hidden")
                        || attrs.attr("readonly").is_some()
                        || attrs.attr("disabled").is_some();
                    FormField {
                        name,
                        field_type,
                        inert,
                    }
                })
                .collect();
            ExtractedForm {
                action,
                method,
                fields,
            }
        })
        .collect()
}

/// Forms retained for content-ingestion purposes: GET forms and forms whose
/// every field is inert survive, others are elided (spec §4.2.2). The URL
/// Exploration phase wants [`extract_forms_raw`] instead — it is the
/// interactive forms this filter elides that the phase exists to find.
fn extract_forms(html: &Html) -> Vec<ExtractedForm> {
    extract_forms_raw(html).into_iter().filter(ExtractedForm::should_retain).collect()
}

struct Frontier {
    discipline: QueueDiscipline,
    items: VecDeque<(Url, u32)>,
}

impl Frontier {
    fn new(discipline: QueueDiscipline) -> Self {
        Self {
            discipline,
            items: VecDeque::new(),
        }
    }

    fn push(&mut self, url: Url, depth: u32) {
        self.items.push_back((url, depth));
    }

    fn pop(&mut self) -> Option<(Url, u32)> {
        match self.discipline {
            QueueDiscipline::Bfs => self.items.pop_front(),
            QueueDiscipline::Dfs => self.items.pop_back(),
        }
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub async fn crawl(
    start_url: &str,
    browser: &dyn BrowserDriver,
    options: &CrawlOptions,
    control: Option<&pipeline_core::control::WorkflowControl>,
) -> Result<CrawlReport, CollaboratorError> {
    let start = Url::parse(start_url).map_err(|e| CollaboratorError::Failed {
        provider: "site_crawler",
        message: format!("invalid start url: {e}"),
    })?;
    let start_host = start.host_str().unwrap_or_default().to_string();

    let mut frontier = Frontier::new(options.discipline);
    frontier.push(start.clone(), 0);

    let mut visited: HashSet<String> = HashSet::new();
    let mut pages = Vec::new();
    let mut halted_reason = HaltReason::QueueEmpty;

    loop {
        if let Some(control) = control {
            if control.is_cancelled() {
                halted_reason = HaltReason::Cancelled;
                break;
            }
        }
        if pages.len() >= options.max_pages {
            halted_reason = HaltReason::MaxPagesReached;
            break;
        }
        let Some((url, depth)) = frontier.pop() else {
            halted_reason = HaltReason::QueueEmpty;
            break;
        };
        if depth > options.max_depth {
            continue;
        }
        let key = normalize(&url);
        if visited.contains(&key) {
            continue;
        }
        visited.insert(key.clone());

        let fetched = match browser.fetch(url.as_str()).await {
            Ok(page) => page,
            Err(_) => continue, // non-fatal: skip unreachable pages
        };
        let document = Html::parse_document(&fetched.html);
        let links = extract_links(&url, &document);
        let forms = extract_forms(&document);

        let mut internal = Vec::new();
        let mut external = Vec::new();
        for link in links {
            let mut link = link;
            link.set_fragment(None);
            let host = link.host_str().unwrap_or_default().to_string();
            if is_internal_host(&host, &start_host) {
                if depth + 1 <= options.max_depth {
                    frontier.push(link.clone(), depth + 1);
                }
                internal.push(link.to_string());
            } else {
                external.push(link.to_string());
            }
        }

        pages.push(CrawledPage {
            url: key,
            depth,
            html: fetched.html,
            internal_links: internal,
            external_links: external,
            forms,
        });
    }

    Ok(CrawlReport { pages, halted_reason })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::doubles::InMemoryBrowserDriver;
    use crate::collaborators::FetchedPage;

    fn page(html: &str) -> FetchedPage {
        FetchedPage {
            final_url: String::new(),
            html: html.to_string(),
            status: 200,
        }
    }

    #[test]
    fn internal_host_matches_subdomains() {
        assert!(is_internal_host("docs.example.com", "example.com"));
        assert!(is_internal_host("example.com", "docs.example.com"));
        assert!(!is_internal_host("other.com", "example.com"));
    }

    #[tokio::test]
    async fn crawl_follows_internal_links_and_stops_at_external() {
        let browser = InMemoryBrowserDriver::new();
        browser.seed(
            "https://example.com/",
            page(r#"<a href="/about">About</a><a href="https://external.com/">Ext</a>"#),
        );
        browser.seed("https://example.com/about", page("<p>About us</p>"));

        let report = crawl(
            "https://example.com/",
            &browser,
            &CrawlOptions::default(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(report.pages.len(), 2);
        assert_eq!(report.halted_reason, HaltReason::QueueEmpty);
        let home = report.pages.iter().find(|p| p.url.ends_with('/')).unwrap();
        assert!(home.external_links.iter().any(|l| l.contains("external.com")));
    }

    #[tokio::test]
    async fn max_pages_halts_crawl() {
        let browser = InMemoryBrowserDriver::new();
        for i in 0..5 {
            browser.seed(
                format!("https://example.com/page{i}"),
                page(&format!(r#"<a href="/page{}">next</a>"#, i + 1)),
            );
        }
        let options = CrawlOptions {
            max_pages: 2,
            ..CrawlOptions::default()
        };
        let report = crawl("https://example.com/page0", &browser, &options, None)
            .await
            .unwrap();
        assert_eq!(report.pages.len(), 2);
        assert_eq!(report.halted_reason, HaltReason::MaxPagesReached);
    }

    #[test]
    fn get_form_retained_but_post_with_visible_field_elided() {
        let html = Html::parse_document(
            r#"
            <form method="get"><input name="q" type="text"></form>
            <form method="post"><input name="email" type="text"></form>
            <form method="post"><input name="csrf" type="hidden"></form>
            "#,
        );
        let forms = extract_forms(&html);
        assert_eq!(forms.len(), 2);
        assert!(forms.iter().any(|f| f.method.eq_ignore_ascii_case("get")));
        assert!(forms
            .iter()
            .any(|f| f.method.eq_ignore_ascii_case("post") && f.fields.iter().all(|fld| fld.inert)));
    }
}
