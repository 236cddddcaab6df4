use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::OnConflict,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Role, Session, profiles, roles};

use super::{Engine, with_tx};

/// Admin view of one account (credentials excluded).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_approved: bool,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Engine {
    /// Resolves credentials to a session.
    ///
    /// Unknown email or wrong password both come back as the same not-found
    /// error; an unapproved account is a distinct `Forbidden` so the caller
    /// can tell the user to wait.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<Session> {
        with_tx!(self, |db_tx| {
            let profile = profiles::Entity::find()
                .filter(profiles::Column::Email.eq(email))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
            if profile.password != password {
                return Err(EngineError::KeyNotFound("account not exists".to_string()));
            }
            if !profile.is_approved {
                return Err(EngineError::Forbidden(
                    "account pending approval".to_string(),
                ));
            }
            let role = self.role_of(&db_tx, profile.id).await?;
            Ok(Session::new(profile.id, role))
        })
    }

    /// Registers a new, unapproved account.
    pub async fn register_account(
        &self,
        name: &str,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            let existing = profiles::Entity::find()
                .filter(profiles::Column::Email.eq(email))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(email.to_string()));
            }

            let id = Uuid::new_v4();
            let model = profiles::ActiveModel {
                id: ActiveValue::Set(id),
                name: ActiveValue::Set(name.trim().to_string()),
                email: ActiveValue::Set(email.trim().to_string()),
                password: ActiveValue::Set(password.to_string()),
                is_approved: ActiveValue::Set(false),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            model.insert(&db_tx).await?;
            Ok(id)
        })
    }

    /// Approves a pending account and grants it the default role. Admin only.
    pub async fn approve_account(
        &self,
        session: &Session,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        self.require_admin(session)?;

        with_tx!(self, |db_tx| {
            self.require_profile(&db_tx, user_id).await?;

            let update = profiles::ActiveModel {
                id: ActiveValue::Set(user_id),
                is_approved: ActiveValue::Set(true),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            update.update(&db_tx).await?;

            let role_row = roles::ActiveModel {
                user_id: ActiveValue::Set(user_id),
                role: ActiveValue::Set(Role::User.as_str().to_string()),
            };
            roles::Entity::insert(role_row)
                .on_conflict(
                    OnConflict::column(roles::Column::UserId)
                        .do_nothing()
                        .to_owned(),
                )
                .do_nothing()
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Changes a user's role. Admin only; admins cannot demote themselves.
    pub async fn set_role(
        &self,
        session: &Session,
        user_id: Uuid,
        role: Role,
    ) -> ResultEngine<()> {
        self.require_admin(session)?;
        if user_id == session.user_id && role != Role::Admin {
            return Err(EngineError::Forbidden(
                "cannot demote own account".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_profile(&db_tx, user_id).await?;

            let row = roles::ActiveModel {
                user_id: ActiveValue::Set(user_id),
                role: ActiveValue::Set(role.as_str().to_string()),
            };
            roles::Entity::insert(row)
                .on_conflict(
                    OnConflict::column(roles::Column::UserId)
                        .update_column(roles::Column::Role)
                        .to_owned(),
                )
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Lists all accounts with their roles. Admin only.
    pub async fn list_profiles(&self, session: &Session) -> ResultEngine<Vec<Account>> {
        self.require_admin(session)?;

        with_tx!(self, |db_tx| {
            let rows = profiles::Entity::find()
                .order_by_asc(profiles::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(rows.len());
            for profile in rows {
                let role = self.role_of(&db_tx, profile.id).await?;
                out.push(Account {
                    id: profile.id,
                    name: profile.name,
                    email: profile.email,
                    is_approved: profile.is_approved,
                    role,
                    created_at: profile.created_at,
                });
            }
            Ok(out)
        })
    }
}
