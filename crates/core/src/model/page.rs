//! Scraped page content.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the fixed page types scraped from a site, in canonical fetch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageRole {
    Home,
    About,
    Contact,
    Services,
}

impl PageRole {
    pub const ALL: [PageRole; 4] = [PageRole::Home, PageRole::About, PageRole::Contact, PageRole::Services];

    pub fn as_str(self) -> &'static str {
        match self {
            PageRole::Home => "home",
            PageRole::About => "about",
            PageRole::Contact => "contact",
            PageRole::Services => "services",
        }
    }

    /// Candidate paths in priority order.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            PageRole::Home => &["/"],
            PageRole::About => &["/about", "/about-us", "/aboutus", "/company", "/who-we-are", "/our-story"],
            PageRole::Contact => &["/contact", "/contact-us", "/contactus", "/get-in-touch"],
            PageRole::Services => &["/services", "/our-services", "/what-we-do", "/solutions", "/offerings"],
        }
    }
}

impl fmt::Display for PageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of fetching one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchStatus {
    Ok,
    NotFound,
    Blocked,
    Timeout,
    Failed,
}

impl FetchStatus {
    pub fn from_http_status(status: u16) -> Self {
        match status {
            200..=299 => FetchStatus::Ok,
            404 | 410 => FetchStatus::NotFound,
            401 | 403 | 429 => FetchStatus::Blocked,
            408 => FetchStatus::Timeout,
            _ => FetchStatus::Failed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FetchStatus::Ok => "ok",
            FetchStatus::NotFound => "not-found",
            FetchStatus::Blocked => "blocked",
            FetchStatus::Timeout => "timeout",
            FetchStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    pub has_alt: bool,
}

/// Extracted content of one page. Missing elements are empty, never absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    pub role: PageRole,
    pub url: String,
    pub status: FetchStatus,
    pub html_length: usize,
    pub title: String,
    pub meta_description: String,
    pub headings: Vec<Heading>,
    pub images: Vec<Image>,
    pub ctas: Vec<String>,
    pub internal_links: Vec<String>,
    /// Off-site http(s) links, including social profiles.
    #[serde(default)]
    pub external_links: Vec<String>,
    /// `<html lang>`.
    #[serde(default)]
    pub lang: Option<String>,
    /// `<link rel="canonical">`, resolved.
    #[serde(default)]
    pub canonical: Option<String>,
    /// Schema.org types declared via JSON-LD or microdata, e.g. `Organization`.
    #[serde(default)]
    pub structured_data: Vec<String>,
    pub word_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageContent {
    /// A page with no extracted content, used for every non-ok outcome.
    pub fn empty(role: PageRole, url: impl Into<String>, status: FetchStatus) -> Self {
        Self {
            role,
            url: url.into(),
            status,
            html_length: 0,
            title: String::new(),
            meta_description: String::new(),
            headings: Vec::new(),
            images: Vec::new(),
            ctas: Vec::new(),
            internal_links: Vec::new(),
            external_links: Vec::new(),
            lang: None,
            canonical: None,
            structured_data: Vec::new(),
            word_count: 0,
            error: None,
        }
    }

    pub fn failed(role: PageRole, url: impl Into<String>, status: FetchStatus, error: impl Into<String>) -> Self {
        Self { error: Some(error.into()), ..Self::empty(role, url, status) }
    }

    pub fn is_ok(&self) -> bool {
        self.status == FetchStatus::Ok
    }

    pub fn headings_at(&self, level: u8) -> impl Iterator<Item = &Heading> {
        self.headings.iter().filter(move |h| h.level == level)
    }
}
