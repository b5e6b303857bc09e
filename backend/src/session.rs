use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;
use utoipa::ToSchema;

/// Role
///
/// The three roles a portal session can be signed in as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Citizen,
    Worker,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Citizen, Role::Worker, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Worker => "worker",
            Role::Admin => "admin",
        }
    }

    /// Where the route guard sends a visitor who lacks this role.
    pub fn login_path(self) -> &'static str {
        match self {
            Role::Citizen => "/user-login",
            Role::Worker => "/worker-login",
            Role::Admin => "/admin-login",
        }
    }

    /// Landing view after a successful login.
    pub fn dashboard_path(self) -> &'static str {
        match self {
            Role::Citizen => "/citizen-dashboard",
            Role::Worker => "/worker-dashboard",
            Role::Admin => "/admin",
        }
    }

    /// Storage key of the boolean flag mirrored to the browser.
    pub fn flag_key(self) -> &'static str {
        match self {
            Role::Citizen => "isCitizen",
            Role::Worker => "isWorker",
            Role::Admin => "isAdmin",
        }
    }

    /// Storage keys holding this role's profile fields.
    pub fn profile_keys(self) -> &'static [&'static str] {
        match self {
            Role::Citizen => &["citizenId", "homeNumber", "citizenName", "greenPoints", "area"],
            Role::Worker => &["workerId", "workerName", "workerRole", "goldenPoints", "area"],
            Role::Admin => &[],
        }
    }
}

/// CitizenProfile
///
/// Identity of a household signed in through the citizen login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CitizenProfile {
    pub citizen_id: String,
    pub home_number: String,
    pub name: String,
    // Gamification balance, opaque to the portal apart from crediting.
    pub green_points: i32,
    pub area: Option<String>,
}

/// WorkerProfile
///
/// Identity of a waste-collection worker signed in through the worker login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WorkerProfile {
    pub worker_id: String,
    pub name: String,
    // Duty assignment, e.g. `garbage_collector` or `dustbin_monitor`.
    pub worker_role: Option<String>,
    pub golden_points: i32,
    pub area: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminProfile {
    pub admin_id: String,
    pub name: String,
    pub email: String,
}

/// Session
///
/// Who is signed in on one client, and as what. Exactly one variant holds at a time:
/// a write always replaces the previous role, so a browser can never carry two role
/// identities at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "role", content = "profile", rename_all = "lowercase")]
#[ts(export)]
pub enum Session {
    #[default]
    Anonymous,
    Citizen(CitizenProfile),
    Worker(WorkerProfile),
    Admin(AdminProfile),
}

/// RoleFlags
///
/// The three booleans the route guard inspects. Derived from a `Session`, so at most
/// one of them is ever true.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleFlags {
    pub is_admin: bool,
    pub is_worker: bool,
    pub is_citizen: bool,
}

impl RoleFlags {
    pub fn any(self) -> bool {
        self.is_admin || self.is_worker || self.is_citizen
    }

    pub fn get(self, role: Role) -> bool {
        match role {
            Role::Citizen => self.is_citizen,
            Role::Worker => self.is_worker,
            Role::Admin => self.is_admin,
        }
    }
}

impl Session {
    pub fn role(&self) -> Option<Role> {
        match self {
            Session::Anonymous => None,
            Session::Citizen(_) => Some(Role::Citizen),
            Session::Worker(_) => Some(Role::Worker),
            Session::Admin(_) => Some(Role::Admin),
        }
    }

    pub fn holds(&self, role: Role) -> bool {
        self.role() == Some(role)
    }

    pub fn flags(&self) -> RoleFlags {
        RoleFlags {
            is_admin: self.holds(Role::Admin),
            is_worker: self.holds(Role::Worker),
            is_citizen: self.holds(Role::Citizen),
        }
    }

    /// Adds earned points to the citizen's green or the worker's golden balance.
    /// Returns false when the session has no balance to credit.
    pub fn credit_points(&mut self, points: i32) -> bool {
        match self {
            Session::Citizen(profile) => {
                profile.green_points = profile.green_points.saturating_add(points);
                true
            }
            Session::Worker(profile) => {
                profile.golden_points = profile.golden_points.saturating_add(points);
                true
            }
            Session::Anonymous | Session::Admin(_) => false,
        }
    }

    /// storage_entries
    ///
    /// Renders the session as the flat key table the browser client keeps in local
    /// storage (`isCitizen`, `citizenId`, `greenPoints`, ...). Anonymous sessions render
    /// no keys at all; optional fields are omitted when absent.
    pub fn storage_entries(&self) -> BTreeMap<String, String> {
        let mut entries = BTreeMap::new();
        let mut put = |key: &str, value: String| {
            entries.insert(key.to_string(), value);
        };

        match self {
            Session::Anonymous => {}
            Session::Citizen(profile) => {
                put(Role::Citizen.flag_key(), "true".to_string());
                put("citizenId", profile.citizen_id.clone());
                put("homeNumber", profile.home_number.clone());
                put("citizenName", profile.name.clone());
                put("greenPoints", profile.green_points.to_string());
                if let Some(area) = &profile.area {
                    put("area", area.clone());
                }
            }
            Session::Worker(profile) => {
                put(Role::Worker.flag_key(), "true".to_string());
                put("workerId", profile.worker_id.clone());
                put("workerName", profile.name.clone());
                if let Some(worker_role) = &profile.worker_role {
                    put("workerRole", worker_role.clone());
                }
                put("goldenPoints", profile.golden_points.to_string());
                if let Some(area) = &profile.area {
                    put("area", area.clone());
                }
            }
            Session::Admin(_) => {
                put(Role::Admin.flag_key(), "true".to_string());
            }
        }

        entries
    }
}

/// SessionSnapshot
///
/// What the gateway hands back to clients: the current role and the storage key table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionSnapshot {
    pub role: Option<Role>,
    pub keys: BTreeMap<String, String>,
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        Self {
            role: session.role(),
            keys: session.storage_entries(),
        }
    }
}
