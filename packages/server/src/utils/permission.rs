use enrollment_common::ActivationState;

pub const COURSE_JOIN: &str = "course:join";
pub const SELECTION_SUBMIT: &str = "selection:submit";
pub const STUDENT_MANAGE: &str = "student:manage";
pub const COURSE_MANAGE: &str = "course:manage";
pub const SETTINGS_MANAGE: &str = "settings:manage";

const STUDENT_PERMISSIONS: &[&str] = &[COURSE_JOIN, SELECTION_SUBMIT];

const ADMIN_PERMISSIONS: &[&str] = &[
    COURSE_JOIN,
    SELECTION_SUBMIT,
    STUDENT_MANAGE,
    COURSE_MANAGE,
    SETTINGS_MANAGE,
];

/// Permissions granted by an activation state. Pending accounts get none.
pub fn permissions_for(state: ActivationState) -> Vec<String> {
    let granted: &[&str] = match state {
        ActivationState::Pending => &[],
        ActivationState::Active => STUDENT_PERMISSIONS,
        ActivationState::Promoted => ADMIN_PERMISSIONS,
    };
    granted.iter().map(|p| p.to_string()).collect()
}
