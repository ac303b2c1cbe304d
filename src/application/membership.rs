use chrono::Utc;
use thiserror::Error;

use crate::application::ErrorKind;
use crate::application::loan::ServiceDependencies;
use crate::domain::{Member, MemberId};

/// 会員操作のエラー
#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("Member not found")]
    MemberNotFound,

    #[error("Invalid member: {0}")]
    InvalidMember(String),

    #[error("Member repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl MembershipError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MembershipError::MemberNotFound => ErrorKind::NotFound,
            MembershipError::InvalidMember(_) => ErrorKind::PreconditionFailed,
            MembershipError::RepositoryError(_) => ErrorKind::Infrastructure,
        }
    }
}

pub type Result<T> = std::result::Result<T, MembershipError>;

/// 会員の入力値（作成・更新共通）
#[derive(Debug, Clone)]
pub struct MemberInput {
    pub username: String,
    pub email: String,
}

fn validate(input: &MemberInput) -> Result<()> {
    if input.username.trim().is_empty() {
        return Err(MembershipError::InvalidMember(
            "username is required".to_string(),
        ));
    }
    if !input.email.contains('@') {
        return Err(MembershipError::InvalidMember(format!(
            "invalid email address: {}",
            input.email
        )));
    }
    Ok(())
}

pub async fn list_members(deps: &ServiceDependencies) -> Result<Vec<Member>> {
    deps.members
        .list()
        .await
        .map_err(MembershipError::RepositoryError)
}

pub async fn get_member(deps: &ServiceDependencies, member_id: MemberId) -> Result<Member> {
    deps.members
        .get(member_id)
        .await
        .map_err(MembershipError::RepositoryError)?
        .ok_or(MembershipError::MemberNotFound)
}

pub async fn create_member(deps: &ServiceDependencies, input: MemberInput) -> Result<Member> {
    validate(&input)?;

    let member = Member {
        member_id: MemberId::new(),
        username: input.username,
        email: input.email,
        joined_at: Utc::now(),
    };

    deps.members
        .create(&member)
        .await
        .map_err(MembershipError::RepositoryError)?;

    tracing::info!(member_id = %member.member_id.value(), "Member created");
    Ok(member)
}

pub async fn update_member(
    deps: &ServiceDependencies,
    member_id: MemberId,
    input: MemberInput,
) -> Result<Member> {
    validate(&input)?;

    let current = get_member(deps, member_id).await?;
    let member = Member {
        username: input.username,
        email: input.email,
        ..current
    };

    let updated = deps
        .members
        .update(&member)
        .await
        .map_err(MembershipError::RepositoryError)?;

    if !updated {
        return Err(MembershipError::MemberNotFound);
    }
    Ok(member)
}

pub async fn delete_member(deps: &ServiceDependencies, member_id: MemberId) -> Result<()> {
    let deleted = deps
        .members
        .delete(member_id)
        .await
        .map_err(MembershipError::RepositoryError)?;

    if !deleted {
        return Err(MembershipError::MemberNotFound);
    }

    tracing::info!(member_id = %member_id.value(), "Member deleted");
    Ok(())
}
