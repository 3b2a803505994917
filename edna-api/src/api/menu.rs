//! Navigation menu
//!
//! GET /api/internal/menu

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Query parameters of a menu link
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MenuQuery {
    pub section: &'static str,
}

/// Entry of a dropdown
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuLink {
    pub label: &'static str,
    pub translate: &'static str,
    pub route: &'static str,
    pub query_params: MenuQuery,
}

/// Top-level menu entry
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MenuSection {
    pub id: &'static str,
    pub label: &'static str,
    pub translate: &'static str,
    pub route: &'static str,
    pub children: &'static [MenuLink],
}

const fn link(
    label: &'static str,
    translate: &'static str,
    route: &'static str,
    section: &'static str,
) -> MenuLink {
    MenuLink {
        label,
        translate,
        route,
        query_params: MenuQuery { section },
    }
}

pub const MENU: &[MenuSection] = &[
    MenuSection {
        id: "about",
        label: "About",
        translate: "MENU.ABOUT.ROOT",
        route: "/about",
        children: &[
            link("Our Vision", "MENU.ABOUT.VISION", "/about", "our-vision"),
            link("Invest in Nature", "MENU.ABOUT.INVEST", "/about", "invest-in-nature"),
            link("Ecosystems", "MENU.ABOUT.ECOSYSTEMS", "/about", "ecosystems"),
            link("Metrics", "MENU.ABOUT.METRICS", "/about", "metrics"),
        ],
    },
    MenuSection {
        id: "community",
        label: "Community",
        translate: "MENU.COMMUNITY.ROOT",
        route: "/community",
        children: &[
            link("The Network", "MENU.COMMUNITY.NETWORK", "/community", "network"),
            link("Laboratories", "MENU.COMMUNITY.LABORATORIES", "/community", "laboratories"),
            link("Forum", "MENU.COMMUNITY.FORUM", "/community", "forum"),
        ],
    },
    MenuSection {
        id: "technology",
        label: "Technology",
        translate: "MENU.TECHNOLOGY.ROOT",
        route: "/technology",
        children: &[
            link("eDNA", "MENU.TECHNOLOGY.EDNA", "/technology", "edna"),
            link("Remote sensing", "MENU.TECHNOLOGY.REMOTE_SENSING", "/technology/", "remote-sensing"),
            link("Protocols", "MENU.TECHNOLOGY.PROTOCOLS", "/technology", "protocols"),
            link("Biobank", "MENU.TECHNOLOGY.BIOBANK", "/technology", "biobank"),
        ],
    },
    MenuSection {
        id: "resources",
        label: "Resources",
        translate: "MENU.RESOURCES.ROOT",
        route: "/resources",
        children: &[
            link("Data sharing", "MENU.RESOURCES.DATA_SHARING", "/resources", "data-sharing"),
            link("Resources", "MENU.RESOURCES.SINEWS", "/resources", "sinews"),
            link("Publications", "MENU.RESOURCES.PUBLICATIONS", "/resources", "publications"),
        ],
    },
    MenuSection {
        id: "actions",
        label: "Actions",
        translate: "MENU.ACTIONS.ROOT",
        route: "/actions",
        children: &[
            link("Endangered species actions", "MENU.ACTIONS.ENDANGERED", "/actions", "endangered"),
            link("Effectiveness of protected areas", "MENU.ACTIONS.EFFECTIVENESS", "/actions", "effectiveness"),
            link("Restoration and rewilding", "MENU.ACTIONS.RESTORATION", "/actions", "restoration"),
            link("Corridors and connectivity", "MENU.ACTIONS.CORRIDORS", "/actions", "corridors"),
            link("Monitoring of genetic diversity", "MENU.ACTIONS.MONITORING", "/actions", "monitoring"),
            link("Long term impact assessment", "MENU.ACTIONS.LONG_TERM", "/actions", "long-term"),
        ],
    },
];

/// GET /menu
pub async fn get_menu() -> Json<&'static [MenuSection]> {
    Json(MENU)
}

/// Build menu routes
pub fn menu_routes() -> Router<AppState> {
    Router::new().route("/menu", get(get_menu))
}
