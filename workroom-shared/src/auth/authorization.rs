/// Project access rules
///
/// All permission decisions are made here, as pure functions over state
/// the caller has already loaded. Keeping the rules free of I/O means the
/// registry can run them against row-locked data and the tests can cover
/// every rule without a database.
///
/// The model has exactly two roles per project:
///
/// - **creator** - the user who created the project. Full control:
///   edit and delete the project, manage the roster, and create, edit,
///   read, and delete its tasks.
/// - **collaborator** - invited by the creator. May view the project
///   and flip task status, nothing else.
///
/// # Example
///
/// ```
/// use workroom_shared::auth::authorization::{ensure_creator, ensure_member};
/// # use workroom_shared::models::project::Project;
/// # use chrono::Utc;
/// # use uuid::Uuid;
///
/// # let creator = Uuid::new_v4();
/// # let collaborator = Uuid::new_v4();
/// # let project = Project {
/// #     id: Uuid::new_v4(),
/// #     name: String::new(),
/// #     description: String::new(),
/// #     client: String::new(),
/// #     delivery_date: Utc::now(),
/// #     creator_id: creator,
/// #     created_at: Utc::now(),
/// #     updated_at: Utc::now(),
/// # };
/// let roster = vec![collaborator];
///
/// assert!(ensure_member(&project, &roster, collaborator).is_ok());
/// assert!(ensure_creator(&project, collaborator).is_err());
/// ```
use thiserror::Error;
use uuid::Uuid;

use crate::models::project::Project;

/// Reasons a project operation is denied
///
/// Every variant maps to HTTP 403 at the API boundary; the messages are
/// what clients display.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The user is neither the creator nor on the roster
    #[error("You do not have permission to view this project")]
    NotMember,

    /// The operation is reserved for the project creator
    #[error("You do not have permission for this project")]
    NotCreator,

    /// The creator tried to add themselves to the roster
    #[error("You cannot add yourself as a collaborator")]
    SelfAdd,

    /// The user is already on the roster
    #[error("User is already a collaborator")]
    AlreadyCollaborator,
}

/// Whether the user is the creator or on the collaborator roster
pub fn is_member(project: &Project, collaborators: &[Uuid], user_id: Uuid) -> bool {
    project.creator_id == user_id || collaborators.contains(&user_id)
}

/// Requires membership: creator or collaborator
///
/// Governs viewing a project and toggling the status of its tasks.
pub fn ensure_member(
    project: &Project,
    collaborators: &[Uuid],
    user_id: Uuid,
) -> Result<(), AccessError> {
    if !is_member(project, collaborators, user_id) {
        return Err(AccessError::NotMember);
    }

    Ok(())
}

/// Requires the project creator
///
/// Governs editing or deleting the project, managing the roster, and
/// every task operation except the status toggle.
pub fn ensure_creator(project: &Project, user_id: Uuid) -> Result<(), AccessError> {
    if project.creator_id != user_id {
        return Err(AccessError::NotCreator);
    }

    Ok(())
}

/// Requires that a user can be added to the roster
///
/// The creator cannot add themselves, and a user already on the roster
/// cannot be added twice. Run after [`ensure_creator`] has cleared the
/// caller.
pub fn ensure_new_collaborator(
    project: &Project,
    collaborators: &[Uuid],
    candidate_id: Uuid,
) -> Result<(), AccessError> {
    if candidate_id == project.creator_id {
        return Err(AccessError::SelfAdd);
    }

    if collaborators.contains(&candidate_id) {
        return Err(AccessError::AlreadyCollaborator);
    }

    Ok(())
}
