// backend/src/domain/lifecycle.rs
//
// draft --save--> draft
// draft --submit--> submitted --approve--> approved
//                             --reject-->  rejected
// draft --delete--> (removed)

use std::fmt;
use uuid::Uuid;

use crate::auth::Actor;
use crate::models::{Role, VisitStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Save,
    Submit,
    Approve,
    Reject,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Create => "create",
            Action::Save => "save",
            Action::Submit => "submit",
            Action::Approve => "approve",
            Action::Reject => "reject",
            Action::Delete => "delete",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Status(VisitStatus),
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("role {role:?} is not allowed to {action} this visit")]
    Forbidden { action: Action, role: Role },
    #[error("cannot {action} a visit that is {from}")]
    InvalidTransition { action: Action, from: VisitStatus },
}

/// Only representatives open visit reports; the creator becomes the owner.
pub fn authorize_create(actor: &Actor) -> Result<VisitStatus, LifecycleError> {
    if actor.role != Role::Bhr {
        return Err(LifecycleError::Forbidden { action: Action::Create, role: actor.role });
    }
    Ok(VisitStatus::Draft)
}

/// Decides whether `actor` may apply `action` to a visit owned by `owner_id`
/// that is currently `current`. No side effects.
pub fn authorize(
    actor: &Actor,
    owner_id: Uuid,
    current: VisitStatus,
    action: Action,
) -> Result<Outcome, LifecycleError> {
    let forbidden = LifecycleError::Forbidden { action, role: actor.role };
    let allowed = match action {
        Action::Create => return authorize_create(actor).map(Outcome::Status),
        Action::Save | Action::Submit | Action::Delete => actor.user_id == owner_id,
        Action::Approve | Action::Reject => actor.role.is_reviewer(),
    };
    if !allowed {
        return Err(forbidden);
    }
    // approved and rejected visits are final; nothing moves them again
    if current.is_terminal() {
        return Err(LifecycleError::InvalidTransition { action, from: current });
    }

    let outcome = match (current, action) {
        (VisitStatus::Draft, Action::Save) => Outcome::Status(VisitStatus::Draft),
        (VisitStatus::Draft, Action::Submit) => Outcome::Status(VisitStatus::Submitted),
        (VisitStatus::Draft, Action::Delete) => Outcome::Removed,
        (VisitStatus::Submitted, Action::Approve) => Outcome::Status(VisitStatus::Approved),
        (VisitStatus::Submitted, Action::Reject) => Outcome::Status(VisitStatus::Rejected),
        (from, action) => return Err(LifecycleError::InvalidTransition { action, from }),
    };
    debug_assert!(match outcome {
        Outcome::Status(next) => current.can_transition_to(next),
        Outcome::Removed => true,
    });
    Ok(outcome)
}

/// Representatives only see their own visits; every other role reads all of them.
pub fn can_read(actor: &Actor, owner_id: Uuid) -> bool {
    actor.role != Role::Bhr || actor.user_id == owner_id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> Actor {
        Actor { user_id: Uuid::new_v4(), role }
    }

    const ALL_ACTIONS: [Action; 5] =
        [Action::Save, Action::Submit, Action::Approve, Action::Reject, Action::Delete];

    #[test]
    fn owner_moves_draft_to_submitted() {
        let owner = actor(Role::Bhr);
        assert_eq!(
            authorize(&owner, owner.user_id, VisitStatus::Draft, Action::Submit),
            Ok(Outcome::Status(VisitStatus::Submitted))
        );
        assert_eq!(
            authorize(&owner, owner.user_id, VisitStatus::Draft, Action::Save),
            Ok(Outcome::Status(VisitStatus::Draft))
        );
        assert_eq!(
            authorize(&owner, owner.user_id, VisitStatus::Draft, Action::Delete),
            Ok(Outcome::Removed)
        );
    }

    #[test]
    fn reviewer_settles_a_submitted_visit() {
        let owner = Uuid::new_v4();
        for reviewer in [actor(Role::Zh), actor(Role::Admin)] {
            assert_eq!(
                authorize(&reviewer, owner, VisitStatus::Submitted, Action::Approve),
                Ok(Outcome::Status(VisitStatus::Approved))
            );
            assert_eq!(
                authorize(&reviewer, owner, VisitStatus::Submitted, Action::Reject),
                Ok(Outcome::Status(VisitStatus::Rejected))
            );
        }
    }

    #[test]
    fn terminal_states_have_no_exit() {
        let owner = actor(Role::Bhr);
        let reviewer = actor(Role::Zh);
        for from in [VisitStatus::Approved, VisitStatus::Rejected] {
            for action in ALL_ACTIONS {
                let who = if matches!(action, Action::Approve | Action::Reject) {
                    &reviewer
                } else {
                    &owner
                };
                assert_eq!(
                    authorize(who, owner.user_id, from, action),
                    Err(LifecycleError::InvalidTransition { action, from })
                );
            }
        }
    }

    #[test]
    fn submitted_visits_are_frozen_for_the_owner() {
        let owner = actor(Role::Bhr);
        for action in [Action::Save, Action::Submit, Action::Delete] {
            assert!(matches!(
                authorize(&owner, owner.user_id, VisitStatus::Submitted, action),
                Err(LifecycleError::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn strangers_are_refused_before_state_is_considered() {
        let owner = Uuid::new_v4();
        let other_rep = actor(Role::Bhr);
        for action in [Action::Save, Action::Submit, Action::Delete] {
            assert!(matches!(
                authorize(&other_rep, owner, VisitStatus::Draft, action),
                Err(LifecycleError::Forbidden { .. })
            ));
        }
        // reviewers cannot edit someone else's draft either
        assert!(matches!(
            authorize(&actor(Role::Zh), owner, VisitStatus::Draft, Action::Save),
            Err(LifecycleError::Forbidden { .. })
        ));
    }

    #[test]
    fn representatives_and_channel_heads_cannot_review() {
        let owner = actor(Role::Bhr);
        for who in [&owner, &actor(Role::Ch)] {
            assert!(matches!(
                authorize(who, owner.user_id, VisitStatus::Submitted, Action::Approve),
                Err(LifecycleError::Forbidden { .. })
            ));
        }
    }

    #[test]
    fn reviewing_a_draft_is_an_invalid_transition() {
        assert_eq!(
            authorize(&actor(Role::Zh), Uuid::new_v4(), VisitStatus::Draft, Action::Approve),
            Err(LifecycleError::InvalidTransition {
                action: Action::Approve,
                from: VisitStatus::Draft
            })
        );
    }

    #[test]
    fn only_representatives_create() {
        assert_eq!(authorize_create(&actor(Role::Bhr)), Ok(VisitStatus::Draft));
        assert!(authorize_create(&actor(Role::Zh)).is_err());
    }

    #[test]
    fn read_access() {
        let rep = actor(Role::Bhr);
        assert!(can_read(&rep, rep.user_id));
        assert!(!can_read(&rep, Uuid::new_v4()));
        assert!(can_read(&actor(Role::Ch), Uuid::new_v4()));
    }
}
