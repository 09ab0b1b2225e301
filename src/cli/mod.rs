//! Administrative tooling behind the `schoolhub-cli` binary.

pub mod seeder;

use schoolhub_core::AppError;
use schoolhub_models::NewPerson;
use schoolhub_models::people::Person;
use schoolhub_models::people_input::CreateAdminDto;
use sqlx::PgPool;

use crate::modules::people::PeopleService;

/// Creates an admin account. This is how the first admin comes to exist,
/// since every account endpoint already requires one.
pub async fn create_admin(
    db: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> Result<Person, AppError> {
    let person = NewPerson::try_from(CreateAdminDto {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        ..Default::default()
    })?;

    PeopleService::create(db, person).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use schoolhub_core::ErrorKind;
    use schoolhub_models::kinds::RoleKind;

    use crate::modules::statistics::service::StatisticsService;

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_admin_leaves_statistics(pool: PgPool) {
        let admin = create_admin(&pool, "Ngozi", "Eze", "ngozi@school.test", "secret123")
            .await
            .unwrap();
        assert_eq!(admin.account.role, RoleKind::Admin);

        let stats = StatisticsService::get(&pool).await.unwrap();
        assert_eq!(stats.total_students, 0);
        assert_eq!(stats.total_teachers, 0);

        let err = create_admin(&pool, "Ngozi", "Eze", "NGOZI@school.test", "secret123")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }
}
