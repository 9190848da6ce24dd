//! Companion setup files shipped with PHP sites: `turbosite.json` and `turbodepot.json`
//!
//! Only the keys turbobuilder depends on are modelled. Everything else belongs
//! to the site framework and is carried through untouched.

use serde::Deserialize;

pub const SITE_SETUP_STEM: &str = "turbosite";
pub const DEPOT_SETUP_STEM: &str = "turbodepot";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSetup {
    #[serde(rename = "$schema", default)]
    pub schema: Option<String>,

    pub home_view: String,

    #[serde(rename = "baseURL", default)]
    pub base_url: String,

    #[serde(default)]
    pub single_parameter_view: Option<String>,

    #[serde(default)]
    pub cache_views: bool,

    #[serde(default)]
    pub global_css: Vec<String>,

    #[serde(default)]
    pub global_components: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepotSetup {
    #[serde(rename = "$schema", default)]
    pub schema: Option<String>,

    pub depots: Vec<DepotEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepotEntry {
    pub name: String,
}
