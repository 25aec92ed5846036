use super::master::MasterKind;
use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stored project row. `actual_hours` is never stored; see [`ProjectView`].
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: i64,
    pub management_no: String,
    pub machine_no: Option<String>,
    pub machine_series_id: Option<i64>,
    pub generation: Option<String>,
    pub tonnage: Option<String>,
    pub spec_tags: Option<String>,
    pub commission_content: Option<String>,
    pub inquiry_id: Option<i64>,
    pub work_category_id: Option<i64>,
    pub progress_id: Option<i64>,
    pub estimated_hours: Option<i64>, // minutes
    pub start_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub drawing_deadline: Option<NaiveDate>,
    pub is_active: bool,
    pub created_by: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl Project {
    /// Master references carried by this project, paired with the kind
    /// each one must point at.
    pub fn master_refs(&self) -> [(MasterKind, Option<i64>); 4] {
        [
            (MasterKind::MachineSeries, self.machine_series_id),
            (MasterKind::Inquiry, self.inquiry_id),
            (MasterKind::WorkCategory, self.work_category_id),
            (MasterKind::Progress, self.progress_id),
        ]
    }

    pub fn validate(&self) -> AppResult<()> {
        let no = self.management_no.trim();
        if no.is_empty() {
            return Err(AppError::Validation("management_no is required".into()));
        }
        if no.chars().count() > 50 {
            return Err(AppError::Validation(
                "management_no must be at most 50 characters".into(),
            ));
        }
        if let Some(est) = self.estimated_hours
            && est < 0
        {
            return Err(AppError::Validation(format!(
                "estimated_hours must not be negative, got {est}"
            )));
        }
        Ok(())
    }
}

/// Project as returned by the API: stored fields, derived actual minutes
/// and the display names of its master references.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub actual_hours: i64,
    pub machine_series_name: Option<String>,
    pub inquiry_name: Option<String>,
    pub work_category_name: Option<String>,
    pub progress_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProject {
    pub management_no: String,
    pub machine_no: Option<String>,
    pub machine_series_id: Option<i64>,
    pub generation: Option<String>,
    pub tonnage: Option<String>,
    pub spec_tags: Option<String>,
    pub commission_content: Option<String>,
    pub inquiry_id: Option<i64>,
    pub work_category_id: Option<i64>,
    pub progress_id: Option<i64>,
    pub estimated_hours: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub drawing_deadline: Option<NaiveDate>,
}

impl NewProject {
    pub fn with_management_no(no: &str) -> Self {
        Self {
            management_no: no.to_string(),
            ..Default::default()
        }
    }

    pub fn into_project(self, created_by: Option<i64>, now: &str) -> Project {
        Project {
            id: 0,
            management_no: self.management_no.trim().to_string(),
            machine_no: self.machine_no,
            machine_series_id: self.machine_series_id,
            generation: self.generation,
            tonnage: self.tonnage,
            spec_tags: self.spec_tags,
            commission_content: self.commission_content,
            inquiry_id: self.inquiry_id,
            work_category_id: self.work_category_id,
            progress_id: self.progress_id,
            estimated_hours: self.estimated_hours,
            start_date: self.start_date,
            completion_date: self.completion_date,
            drawing_deadline: self.drawing_deadline,
            is_active: true,
            created_by,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    pub management_no: Option<String>,
    pub machine_no: Option<String>,
    pub machine_series_id: Option<i64>,
    pub generation: Option<String>,
    pub tonnage: Option<String>,
    pub spec_tags: Option<String>,
    pub commission_content: Option<String>,
    pub inquiry_id: Option<i64>,
    pub work_category_id: Option<i64>,
    pub progress_id: Option<i64>,
    pub estimated_hours: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub drawing_deadline: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

impl ProjectPatch {
    pub fn apply_to(&self, current: &Project) -> Project {
        let mut next = current.clone();
        if let Some(no) = &self.management_no {
            next.management_no = no.trim().to_string();
        }
        if self.machine_no.is_some() {
            next.machine_no = self.machine_no.clone();
        }
        if self.machine_series_id.is_some() {
            next.machine_series_id = self.machine_series_id;
        }
        if self.generation.is_some() {
            next.generation = self.generation.clone();
        }
        if self.tonnage.is_some() {
            next.tonnage = self.tonnage.clone();
        }
        if self.spec_tags.is_some() {
            next.spec_tags = self.spec_tags.clone();
        }
        if self.commission_content.is_some() {
            next.commission_content = self.commission_content.clone();
        }
        if self.inquiry_id.is_some() {
            next.inquiry_id = self.inquiry_id;
        }
        if self.work_category_id.is_some() {
            next.work_category_id = self.work_category_id;
        }
        if self.progress_id.is_some() {
            next.progress_id = self.progress_id;
        }
        if self.estimated_hours.is_some() {
            next.estimated_hours = self.estimated_hours;
        }
        if self.start_date.is_some() {
            next.start_date = self.start_date;
        }
        if self.completion_date.is_some() {
            next.completion_date = self.completion_date;
        }
        if self.drawing_deadline.is_some() {
            next.drawing_deadline = self.drawing_deadline;
        }
        if let Some(active) = self.is_active {
            next.is_active = active;
        }
        next
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    pub progress_id: Option<i64>,
    pub work_category_id: Option<i64>,
    pub machine_no: Option<String>,
    pub management_no: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}
