use anyhow::anyhow;
use schoolhub_auth::{TokenSubject, create_access_token};
use schoolhub_config::jwt::JwtConfig;
use schoolhub_core::{AppError, verify_password};
use schoolhub_models::Email;
use schoolhub_models::auth::{LoginRequest, LoginResponse};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::metrics::track_login;
use crate::modules::people::{PeopleService, identity};

pub struct AuthService;

fn invalid_credentials() -> AppError {
    AppError::unauthorized(anyhow!("Invalid email or password"))
}

impl AuthService {
    /// Checks the credentials and issues a bearer token carrying the role
    /// and profile reference.
    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let email = Email::new(&dto.email).map_err(|_| invalid_credentials())?;

        let found = {
            let mut conn = db.acquire().await?;
            identity::find_by_email(&mut conn, &email).await?
        };

        let identity = match found {
            Some(identity) if verify_password(&dto.password, &identity.password)? => identity,
            _ => {
                track_login(false);
                warn!("Failed login attempt");
                return Err(invalid_credentials());
            }
        };

        let role = identity.role()?;
        let access_token = create_access_token(
            TokenSubject {
                identity_id: identity.id.into(),
                email: identity.email.as_str(),
                role: role.as_str(),
                profile_id: identity.profile_id,
                profile_kind: identity.profile_kind.map(|kind| kind.as_str()),
            },
            jwt_config,
        )?;

        let user = PeopleService::get(db, identity.id, None).await?;

        track_login(true);
        info!(user_id = %identity.id, role = %role, "User logged in");

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use schoolhub_auth::verify_token;
    use schoolhub_core::ErrorKind;
    use schoolhub_models::NewPerson;
    use schoolhub_models::kinds::Gender;
    use schoolhub_models::people_input::CreateTeacherDto;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            access_token_expiry: 3600,
        }
    }

    async fn seed_teacher(pool: &PgPool) {
        let dto = CreateTeacherDto {
            username: "mrsade".into(),
            first_name: "Sade".into(),
            last_name: "Bello".into(),
            email: "Sade@School.test".into(),
            password: "secret123".into(),
            phone: "080".into(),
            address: "School Road".into(),
            blood_type: "A+".into(),
            birthday: NaiveDate::from_ymd_opt(1980, 1, 2),
            gender: Some(Gender::Female),
            image: "uploads/sade.png".into(),
        };
        PeopleService::create(pool, NewPerson::try_from(dto).unwrap())
            .await
            .unwrap();
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_login_issues_token_with_profile(pool: PgPool) {
        seed_teacher(&pool).await;
        let config = jwt_config();

        let response = AuthService::login(&pool, login(" SADE@school.test ", "secret123"), &config)
            .await
            .unwrap();

        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 3600);

        let claims = verify_token(&response.access_token, &config).unwrap();
        assert_eq!(claims.role, "teacher");
        assert_eq!(claims.profile_kind.as_deref(), Some("teacher"));
        assert_eq!(claims.profile_id, Some(response.user.profile.id()));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_wrong_password_and_unknown_email_look_alike(pool: PgPool) {
        seed_teacher(&pool).await;
        let config = jwt_config();

        let wrong = AuthService::login(&pool, login("sade@school.test", "nope"), &config)
            .await
            .unwrap_err();
        let unknown = AuthService::login(&pool, login("ghost@school.test", "secret123"), &config)
            .await
            .unwrap_err();

        assert_eq!(wrong.kind, ErrorKind::Unauthorized);
        assert_eq!(unknown.kind, ErrorKind::Unauthorized);
        assert_eq!(wrong.error.to_string(), unknown.error.to_string());
    }
}
