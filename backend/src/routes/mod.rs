/// Router Module Index
///
/// Routing is segregated by access level. Each gated module is wrapped in its own
/// guard layer when the router is assembled, so a handler can never be reached
/// without the role its module demands.
use crate::{
    guard::RouteRequirement,
    models::RouteDescriptor,
    session::Role,
};

/// Pages and endpoints open to anonymous visitors.
pub mod public;

/// Login, logout, registration and session introspection.
pub mod session;

/// Routes behind the generic signed-in check (any role).
pub mod authenticated;

/// Routes restricted to signed-in households.
pub mod citizen;

/// Routes restricted to waste-collection workers.
pub mod worker;

/// Routes restricted to administrators.
pub mod admin;

/// RouteEntry
///
/// One client-side page: its path, the view rendered there and what the guard
/// demands before rendering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: &'static str,
    pub view: &'static str,
    pub requirement: RouteRequirement,
}

const fn public(path: &'static str, view: &'static str) -> RouteEntry {
    RouteEntry {
        path,
        view,
        requirement: RouteRequirement::PUBLIC,
    }
}

const fn gated(path: &'static str, view: &'static str, role: Role) -> RouteEntry {
    RouteEntry {
        path,
        view,
        requirement: RouteRequirement::role(role),
    }
}

/// View rendered for any path missing from the table.
pub const NOT_FOUND_VIEW: &str = "NotFound";

/// ROUTE_TABLE
///
/// Every page of the portal. Anything not listed here renders `NotFound`.
pub const ROUTE_TABLE: &[RouteEntry] = &[
    public("/", "Home"),
    public("/user-options", "UserOptions"),
    public("/user-login", "UserLogin"),
    public("/complaint", "ComplaintForm"),
    public("/complaint-choice", "ComplaintChoice"),
    public("/admin-login", "AdminLogin"),
    public("/analytics", "Analytics"),
    public("/trackstatus", "TrackStatus"),
    public("/schemes", "Schemes"),
    public("/acts", "Acts"),
    public("/policies", "Policies"),
    public("/help", "Help"),
    public("/about", "About"),
    public("/eco-tips", "EcoTips"),
    public("/women-child-complaint", "WomenChildComplaint"),
    public("/pickup-scheduling", "PickupScheduling"),
    public("/waste-classification", "WasteClassification"),
    public("/compost-makers", "CompostMakers"),
    public("/scrap-shops", "ScrapShops"),
    public("/register-shop", "RegisterShop"),
    public("/worker-login", "WorkerLogin"),
    gated("/citizen-dashboard", "CitizenDashboard", Role::Citizen),
    gated("/admin", "AdminDashboard", Role::Admin),
    gated("/worker-dashboard", "WorkerDashboard", Role::Worker),
    gated("/collection-tasks", "CollectionTasks", Role::Worker),
    gated("/segregation-check", "SegregationCheck", Role::Worker),
    gated("/dropoff-confirmation", "DropoffConfirmation", Role::Worker),
    gated("/report-issues", "ReportIssues", Role::Worker),
    gated("/training-hub", "TrainingHub", Role::Worker),
    gated("/rewards-performance", "RewardsPerformance", Role::Worker),
];

pub fn lookup(path: &str) -> Option<&'static RouteEntry> {
    ROUTE_TABLE.iter().find(|entry| entry.path == path)
}

/// Paths of the table entries carrying exactly `requirement`.
pub fn paths_with(requirement: RouteRequirement) -> impl Iterator<Item = &'static str> {
    ROUTE_TABLE
        .iter()
        .filter(move |entry| entry.requirement == requirement)
        .map(|entry| entry.path)
}

pub fn descriptors() -> Vec<RouteDescriptor> {
    ROUTE_TABLE
        .iter()
        .map(|entry| RouteDescriptor {
            path: entry.path.to_string(),
            view: entry.view.to_string(),
            requirement: entry.requirement,
        })
        .collect()
}
