use chrono::Utc;
use sea_orm::{ActiveValue, Database, DatabaseConnection, EntityTrait};
use uuid::Uuid;

use engine::{Engine, Role, Session, profiles, roles};
use migration::MigratorTrait;

pub struct TestContext {
    pub engine: Engine,
    pub db: DatabaseConnection,
    pub admin: Session,
    pub user: Session,
}

async fn seed_profile(db: &DatabaseConnection, name: &str, role: Role, approved: bool) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let profile = profiles::ActiveModel {
        id: ActiveValue::Set(id),
        name: ActiveValue::Set(name.to_string()),
        email: ActiveValue::Set(format!("{name}@example.com")),
        password: ActiveValue::Set("password".to_string()),
        is_approved: ActiveValue::Set(approved),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    };
    profiles::Entity::insert(profile).exec(db).await.unwrap();

    let role_row = roles::ActiveModel {
        user_id: ActiveValue::Set(id),
        role: ActiveValue::Set(role.as_str().to_string()),
    };
    roles::Entity::insert(role_row).exec(db).await.unwrap();
    id
}

pub async fn setup() -> TestContext {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let admin_id = seed_profile(&db, "asha", Role::Admin, true).await;
    let user_id = seed_profile(&db, "ravi", Role::User, true).await;

    let engine = Engine::builder().database(db.clone()).build();
    TestContext {
        engine,
        db,
        admin: Session::new(admin_id, Role::Admin),
        user: Session::new(user_id, Role::User),
    }
}
