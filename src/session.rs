//! Per-view session state and role capabilities.
//!
//! One `ViewSession` owns everything a page kept in globals: the filter
//! selections, which filter panel is open, and a request generation
//! counter. The session is process-local, never synchronized across views
//! or persisted.

use crate::filter::{FilterCategory, FilterSelection};

/// Which role the current view serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Browse-only catalog access
    Guest,
    /// Favorite / preselect management on top of browsing
    Student,
    /// Course and account management
    Admin,
}

impl Role {
    /// Maps the backend's role string; anything unrecognized browses as a
    /// guest.
    pub fn from_role_str(role: &str) -> Self {
        match role {
            "student" => Role::Student,
            "admin" => Role::Admin,
            _ => Role::Guest,
        }
    }
}

/// Actions a view can offer on a course row or elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddFavorite,
    AddPreselect,
    DropEnrollment,
    EditCourse,
    DeleteCourse,
    ImportCourses,
    ManageAccounts,
}

impl Role {
    /// Capability check; all three roles share one code path and differ
    /// only here.
    pub fn can(&self, action: Action) -> bool {
        match self {
            Role::Guest => false,
            Role::Student => matches!(
                action,
                Action::AddFavorite | Action::AddPreselect | Action::DropEnrollment
            ),
            Role::Admin => matches!(
                action,
                Action::EditCourse
                    | Action::DeleteCourse
                    | Action::ImportCourses
                    | Action::ManageAccounts
            ),
        }
    }
}

/// Token identifying one search request generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchToken(u64);

/// In-memory state for one page/view.
#[derive(Debug)]
pub struct ViewSession {
    pub role: Role,
    pub filters: FilterSelection,
    open_panel: Option<FilterCategory>,
    generation: u64,
}

impl ViewSession {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            filters: FilterSelection::new(),
            open_panel: None,
            generation: 0,
        }
    }

    /// The currently open filter panel, if any.
    pub fn open_panel(&self) -> Option<FilterCategory> {
        self.open_panel
    }

    /// Opens the panel for `category`, or closes it when it is already
    /// open. Selections are untouched either way; reopening a panel shows
    /// them again.
    pub fn toggle_panel(&mut self, category: FilterCategory) -> Option<FilterCategory> {
        self.open_panel = if self.open_panel == Some(category) {
            None
        } else {
            Some(category)
        };
        self.open_panel
    }

    /// Marks the start of a search and returns its generation token.
    ///
    /// The original pages let whichever response settled last overwrite
    /// the display; callers that check [`ViewSession::accept`] before
    /// rendering get newest-wins instead.
    pub fn begin_search(&mut self) -> SearchToken {
        self.generation += 1;
        SearchToken(self.generation)
    }

    /// True only for the newest outstanding search generation.
    pub fn accept(&self, token: SearchToken) -> bool {
        token.0 == self.generation
    }

    /// Clears filters and closes any open panel.
    pub fn clear_search(&mut self) {
        self.filters.reset();
        self.open_panel = None;
    }
}
