use crate::errors::{AppError, AppResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// The four admin-managed lookup lists a project can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MasterKind {
    /// 進捗 – project progress status
    Progress,
    /// 作業区分 – work category
    WorkCategory,
    /// 問い合わせ – inquiry status
    Inquiry,
    /// 機種シリーズ – machine series
    MachineSeries,
}

impl MasterKind {
    pub const ALL: [MasterKind; 4] = [
        MasterKind::Progress,
        MasterKind::WorkCategory,
        MasterKind::Inquiry,
        MasterKind::MachineSeries,
    ];

    /// URL segment used by the HTTP API.
    pub fn slug(&self) -> &'static str {
        match self {
            MasterKind::Progress => "shinchoku",
            MasterKind::WorkCategory => "sagyou-kubun",
            MasterKind::Inquiry => "toiawase",
            MasterKind::MachineSeries => "machine-series",
        }
    }

    pub fn from_slug(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == s)
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            MasterKind::Progress => "progress",
            MasterKind::WorkCategory => "work_category",
            MasterKind::Inquiry => "inquiry",
            MasterKind::MachineSeries => "machine_series",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.to_db_str() == s)
    }
}

impl fmt::Display for MasterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MasterRecord {
    pub id: i64,
    pub kind: MasterKind,
    pub name: String,
    pub color: Option<String>,
    pub sort_order: i64,
    pub is_active: bool,
    // progress only
    pub start_date_trigger: bool,
    pub completion_trigger: bool,
    // machine series only
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl MasterRecord {
    pub fn validate(&self) -> AppResult<()> {
        validate_name(&self.name)?;
        validate_color(self.color.as_deref())?;
        validate_triggers(self.kind, self.start_date_trigger, self.completion_trigger)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMasterRecord {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub start_date_trigger: bool,
    #[serde(default)]
    pub completion_trigger: bool,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

fn default_true() -> bool {
    true
}

impl NewMasterRecord {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            color: None,
            sort_order: 0,
            is_active: true,
            start_date_trigger: false,
            completion_trigger: false,
            display_name: None,
            description: None,
            category: None,
        }
    }

    pub fn validate(&self, kind: MasterKind) -> AppResult<()> {
        validate_name(&self.name)?;
        validate_color(self.color.as_deref())?;
        validate_triggers(kind, self.start_date_trigger, self.completion_trigger)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MasterPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
    pub start_date_trigger: Option<bool>,
    pub completion_trigger: Option<bool>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl MasterPatch {
    pub fn apply_to(&self, current: &MasterRecord) -> MasterRecord {
        let mut next = current.clone();
        if let Some(v) = &self.name {
            next.name = v.trim().to_string();
        }
        if self.color.is_some() {
            next.color = self.color.clone();
        }
        if let Some(v) = self.sort_order {
            next.sort_order = v;
        }
        if let Some(v) = self.is_active {
            next.is_active = v;
        }
        if let Some(v) = self.start_date_trigger {
            next.start_date_trigger = v;
        }
        if let Some(v) = self.completion_trigger {
            next.completion_trigger = v;
        }
        if self.display_name.is_some() {
            next.display_name = self.display_name.clone();
        }
        if self.description.is_some() {
            next.description = self.description.clone();
        }
        if self.category.is_some() {
            next.category = self.category.clone();
        }
        next
    }
}

pub fn validate_name(name: &str) -> AppResult<()> {
    let len = name.trim().chars().count();
    if len == 0 || len > 100 {
        return Err(AppError::Validation(
            "name must be between 1 and 100 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_color(color: Option<&str>) -> AppResult<()> {
    static HEX: OnceLock<Option<Regex>> = OnceLock::new();
    let re = HEX.get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").ok());

    match (color, re) {
        (Some(c), Some(re)) if !re.is_match(c) => Err(AppError::Validation(format!(
            "color must be a #RRGGBB hex code, got '{c}'"
        ))),
        _ => Ok(()),
    }
}

/// Date triggers only make sense on progress statuses.
pub fn validate_triggers(kind: MasterKind, start: bool, completion: bool) -> AppResult<()> {
    if kind != MasterKind::Progress && (start || completion) {
        return Err(AppError::Validation(format!(
            "date triggers are only valid for progress statuses, not {kind}"
        )));
    }
    Ok(())
}
