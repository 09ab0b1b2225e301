use schoolhub_core::{AppError, Paginated, PaginationMeta, PaginationParams};
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::parents::model::ParentSummary;

pub struct ParentService;

impl ParentService {
    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        params: PaginationParams,
    ) -> Result<Paginated<ParentSummary>, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM parents")
            .fetch_one(db)
            .await?;

        let parents = sqlx::query_as::<_, ParentSummary>(
            r#"
            SELECT p.*, u.email
            FROM parents p
            JOIN users u ON u.id = p.user_id
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(db)
        .await?;

        Ok(Paginated {
            data: parents,
            pagination: PaginationMeta::from_params(total, &params),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schoolhub_models::NewPerson;
    use schoolhub_models::people_input::CreateParentDto;

    use crate::modules::people::PeopleService;

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_keeps_children_order(pool: PgPool) {
        let dto = CreateParentDto {
            name: "Mrs Bello".into(),
            parent_code: "P-001".into(),
            email: "bello@school.test".into(),
            password: "secret123".into(),
            address: "Market Street".into(),
            children_names: vec![" Tunde ".into(), "".into(), "Kemi".into()],
            image: None,
        };
        PeopleService::create(&pool, NewPerson::try_from(dto).unwrap())
            .await
            .unwrap();

        let page = ParentService::list(&pool, PaginationParams::default())
            .await
            .unwrap();

        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.data[0].parent.children_names, vec!["Tunde", "Kemi"]);
        assert_eq!(page.data[0].email.as_str(), "bello@school.test");
    }
}
