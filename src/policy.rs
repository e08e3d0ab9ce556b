//! Visibility policy: who may read or write a title (and, transitively, its
//! questions). Pure decisions over (principal, title status, owner).
//!
//! Denials distinguish two outcomes: an absent principal on an operation
//! that requires identity is Unauthorized; a known principal without the
//! required relationship to the target is Forbidden.

use crate::database::models::{Title, TitleStatus};
use crate::error::ApiError;
use crate::middleware::Principal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

/// Gate an operation on a title. Questions have no visibility of their own;
/// callers resolve a question to its parent title and gate on that.
pub fn authorize_title(
    principal: Option<&Principal>,
    title: &Title,
    operation: Operation,
) -> Result<(), ApiError> {
    match operation {
        Operation::Write => match principal {
            None => Err(ApiError::unauthorized("Authentication required")),
            Some(p) if p.id == title.owner_id => Ok(()),
            Some(_) => Err(ApiError::forbidden("Only the owner may modify this resource")),
        },
        Operation::Read => {
            if title.status == TitleStatus::Public {
                return Ok(());
            }
            match principal {
                None => Err(ApiError::unauthorized("Authentication required")),
                Some(p) if p.id == title.owner_id => Ok(()),
                Some(_) => Err(ApiError::forbidden("You do not have access to this resource")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn title(status: TitleStatus, owner_id: Uuid) -> Title {
        let now = Utc::now();
        Title {
            id: Uuid::new_v4(),
            name: "Sample deck".to_string(),
            description: String::new(),
            status,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn principal(id: Uuid) -> Principal {
        Principal {
            id,
            username: "someone".to_string(),
        }
    }

    fn assert_unauthorized(result: Result<(), ApiError>) {
        match result {
            Err(ApiError::Unauthorized(_)) => {}
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }

    fn assert_forbidden(result: Result<(), ApiError>) {
        match result {
            Err(ApiError::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn public_title_readable_by_anyone() {
        let t = title(TitleStatus::Public, Uuid::new_v4());
        assert!(authorize_title(None, &t, Operation::Read).is_ok());
        let stranger = principal(Uuid::new_v4());
        assert!(authorize_title(Some(&stranger), &t, Operation::Read).is_ok());
    }

    #[test]
    fn private_and_draft_readable_only_by_owner() {
        for status in [TitleStatus::Private, TitleStatus::Draft] {
            let owner_id = Uuid::new_v4();
            let t = title(status, owner_id);

            let owner = principal(owner_id);
            assert!(authorize_title(Some(&owner), &t, Operation::Read).is_ok());

            let stranger = principal(Uuid::new_v4());
            assert_forbidden(authorize_title(Some(&stranger), &t, Operation::Read));
            assert_unauthorized(authorize_title(None, &t, Operation::Read));
        }
    }

    #[test]
    fn write_is_owner_only_even_on_public_titles() {
        let owner_id = Uuid::new_v4();
        let t = title(TitleStatus::Public, owner_id);

        let owner = principal(owner_id);
        assert!(authorize_title(Some(&owner), &t, Operation::Write).is_ok());

        let stranger = principal(Uuid::new_v4());
        assert_forbidden(authorize_title(Some(&stranger), &t, Operation::Write));
        assert_unauthorized(authorize_title(None, &t, Operation::Write));
    }

    #[test]
    fn anonymous_write_is_unauthorized_not_forbidden() {
        let t = title(TitleStatus::Draft, Uuid::new_v4());
        assert_unauthorized(authorize_title(None, &t, Operation::Write));
    }
}
