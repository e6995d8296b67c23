//! Cache keys: a normalized site URL plus a device or page-role category.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::hash::compute_cache_key;
use crate::Error;
use crate::model::{Device, PageRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheCategory {
    Mobile,
    Desktop,
    Home,
    About,
    Contact,
    Services,
}

impl CacheCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheCategory::Mobile => "mobile",
            CacheCategory::Desktop => "desktop",
            CacheCategory::Home => "home",
            CacheCategory::About => "about",
            CacheCategory::Contact => "contact",
            CacheCategory::Services => "services",
        }
    }
}

impl fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Device> for CacheCategory {
    fn from(device: Device) -> Self {
        match device {
            Device::Mobile => CacheCategory::Mobile,
            Device::Desktop => CacheCategory::Desktop,
        }
    }
}

impl From<PageRole> for CacheCategory {
    fn from(role: PageRole) -> Self {
        match role {
            PageRole::Home => CacheCategory::Home,
            PageRole::About => CacheCategory::About,
            PageRole::Contact => CacheCategory::Contact,
            PageRole::Services => CacheCategory::Services,
        }
    }
}

impl FromStr for CacheCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(CacheCategory::Mobile),
            "desktop" => Ok(CacheCategory::Desktop),
            "home" => Ok(CacheCategory::Home),
            "about" => Ok(CacheCategory::About),
            "contact" => Ok(CacheCategory::Contact),
            "services" => Ok(CacheCategory::Services),
            other => Err(Error::InvalidInput(format!("unknown cache category: {other}"))),
        }
    }
}

/// `(normalized url, category)`; the URL must already be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub url: String,
    pub category: CacheCategory,
}

impl CacheKey {
    pub fn new(url: impl Into<String>, category: impl Into<CacheCategory>) -> Self {
        Self { url: url.into(), category: category.into() }
    }

    pub fn hash(&self) -> String {
        compute_cache_key(&self.url, self.category.as_str())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.url, self.category)
    }
}
