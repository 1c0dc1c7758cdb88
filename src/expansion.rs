use crate::catalog::{task_count, ROLE_TEMPLATES};
use crate::models::{Activity, Member, Role, Task, UNASSIGNED};

/// Resolves who holds a role for task assignment.
///
/// Among the active members with that role, the one with the lowest id wins,
/// so the result does not depend on the order the roster was loaded in.
pub fn assignee_for<'a>(role: Role, members: &'a [Member]) -> Option<&'a Member> {
    members
        .iter()
        .filter(|m| m.active && m.role == role)
        .min_by_key(|m| m.id)
}

/// Expands a freshly created activity into its task checklist.
///
/// One task is produced per catalog entry, walking roles in catalog order.
/// Task ids are left at `0`; the store assigns them on insert.
pub fn expand(activity: &Activity, members: &[Member]) -> Vec<Task> {
    let mut tasks = Vec::with_capacity(task_count());
    for (role, blueprints) in ROLE_TEMPLATES {
        let assigned_to = assignee_for(*role, members)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| UNASSIGNED.to_string());

        for bp in blueprints.iter() {
            tasks.push(Task {
                id: 0, // Placeholder
                activity_id: activity.id,
                title: bp.title.to_string(),
                description: bp.description.to_string(),
                role: *role,
                assigned_to: assigned_to.clone(),
                evidence_required: bp.evidence_required,
            });
        }
    }
    tasks
}
