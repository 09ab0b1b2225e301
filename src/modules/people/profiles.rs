//! Queries against the four profile tables, dispatched on [`ProfileKind`].

use anyhow::anyhow;
use schoolhub_core::AppError;
use schoolhub_models::ids::{ParentId, StudentId, TeacherId, UserId};
use schoolhub_models::kinds::ProfileKind;
use schoolhub_models::people::{Admin, Identity, Parent, Profile, Student, Teacher};
use schoolhub_models::people_input::{
    AdminPatch, NewAdmin, NewParent, NewProfile, NewStudent, NewTeacher, ParentPatch,
    StudentPatch, TeacherPatch,
};
use sqlx::PgConnection;
use uuid::Uuid;

fn table(kind: ProfileKind) -> &'static str {
    match kind {
        ProfileKind::Student => "students",
        ProfileKind::Teacher => "teachers",
        ProfileKind::Parent => "parents",
        ProfileKind::Admin => "admins",
    }
}

/// Loads a profile by kind and id. `for_update` row-locks it for the rest
/// of the transaction.
pub async fn load_profile(
    conn: &mut PgConnection,
    kind: ProfileKind,
    id: Uuid,
    for_update: bool,
) -> Result<Option<Profile>, AppError> {
    fetch_where(conn, kind, "id", id, for_update).await
}

/// Resolves an identity's profile: through the stored reference when it is
/// set, otherwise by the owning `user_id` in the table the role implies.
pub async fn load_for_identity(
    conn: &mut PgConnection,
    identity: &Identity,
    for_update: bool,
) -> Result<Option<Profile>, AppError> {
    match identity.profile_ref() {
        Some((kind, id)) => load_profile(conn, kind, id, for_update).await,
        None => {
            let kind = identity.role()?.profile_kind();
            fetch_where(conn, kind, "user_id", identity.id.into_inner(), for_update).await
        }
    }
}

async fn fetch_where(
    conn: &mut PgConnection,
    kind: ProfileKind,
    column: &str,
    value: Uuid,
    for_update: bool,
) -> Result<Option<Profile>, AppError> {
    let sql = format!(
        "SELECT * FROM {} WHERE {} = $1{}",
        table(kind),
        column,
        if for_update { " FOR UPDATE" } else { "" }
    );

    let profile = match kind {
        ProfileKind::Student => sqlx::query_as::<_, Student>(&sql)
            .bind(value)
            .fetch_optional(conn)
            .await?
            .map(Profile::Student),
        ProfileKind::Teacher => sqlx::query_as::<_, Teacher>(&sql)
            .bind(value)
            .fetch_optional(conn)
            .await?
            .map(Profile::Teacher),
        ProfileKind::Parent => sqlx::query_as::<_, Parent>(&sql)
            .bind(value)
            .fetch_optional(conn)
            .await?
            .map(Profile::Parent),
        ProfileKind::Admin => sqlx::query_as::<_, Admin>(&sql)
            .bind(value)
            .fetch_optional(conn)
            .await?
            .map(Profile::Admin),
    };

    Ok(profile)
}

pub async fn insert(
    conn: &mut PgConnection,
    user_id: UserId,
    profile: &NewProfile,
) -> Result<Profile, AppError> {
    let profile = match profile {
        NewProfile::Student(s) => Profile::Student(insert_student(conn, user_id, s).await?),
        NewProfile::Teacher(t) => Profile::Teacher(insert_teacher(conn, user_id, t).await?),
        NewProfile::Parent(p) => Profile::Parent(insert_parent(conn, user_id, p).await?),
        NewProfile::Admin(a) => Profile::Admin(insert_admin(conn, user_id, a).await?),
    };
    Ok(profile)
}

async fn insert_student(
    conn: &mut PgConnection,
    user_id: UserId,
    s: &NewStudent,
) -> Result<Student, AppError> {
    let student = sqlx::query_as::<_, Student>(
        r#"
        INSERT INTO students
            (user_id, username, first_name, last_name, phone, address,
             blood_type, birthday, gender, image, class_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&s.username)
    .bind(&s.first_name)
    .bind(&s.last_name)
    .bind(&s.phone)
    .bind(&s.address)
    .bind(&s.blood_type)
    .bind(s.birthday)
    .bind(s.gender)
    .bind(&s.image)
    .bind(s.class_id)
    .fetch_one(conn)
    .await?;
    Ok(student)
}

async fn insert_teacher(
    conn: &mut PgConnection,
    user_id: UserId,
    t: &NewTeacher,
) -> Result<Teacher, AppError> {
    let teacher = sqlx::query_as::<_, Teacher>(
        r#"
        INSERT INTO teachers
            (user_id, username, first_name, last_name, phone, address,
             blood_type, birthday, gender, image)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&t.username)
    .bind(&t.first_name)
    .bind(&t.last_name)
    .bind(&t.phone)
    .bind(&t.address)
    .bind(&t.blood_type)
    .bind(t.birthday)
    .bind(t.gender)
    .bind(&t.image)
    .fetch_one(conn)
    .await?;
    Ok(teacher)
}

async fn insert_parent(
    conn: &mut PgConnection,
    user_id: UserId,
    p: &NewParent,
) -> Result<Parent, AppError> {
    let parent = sqlx::query_as::<_, Parent>(
        r#"
        INSERT INTO parents (user_id, name, parent_code, address, children_names, image)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&p.name)
    .bind(&p.parent_code)
    .bind(&p.address)
    .bind(&p.children_names)
    .bind(&p.image)
    .fetch_one(conn)
    .await?;
    Ok(parent)
}

async fn insert_admin(
    conn: &mut PgConnection,
    user_id: UserId,
    a: &NewAdmin,
) -> Result<Admin, AppError> {
    let admin = sqlx::query_as::<_, Admin>(
        r#"
        INSERT INTO admins (user_id, first_name, last_name, username, phone, address, image)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&a.first_name)
    .bind(&a.last_name)
    .bind(&a.username)
    .bind(&a.phone)
    .bind(&a.address)
    .bind(&a.image)
    .fetch_one(conn)
    .await?;
    Ok(admin)
}

pub async fn update_student(
    conn: &mut PgConnection,
    id: StudentId,
    patch: &StudentPatch,
) -> Result<Student, AppError> {
    let (set_image, image) = patch.image.as_update();
    let student = sqlx::query_as::<_, Student>(
        r#"
        UPDATE students
        SET username = COALESCE($2, username),
            first_name = COALESCE($3, first_name),
            last_name = COALESCE($4, last_name),
            phone = COALESCE($5, phone),
            address = COALESCE($6, address),
            blood_type = COALESCE($7, blood_type),
            birthday = COALESCE($8, birthday),
            gender = COALESCE($9, gender),
            class_id = COALESCE($10, class_id),
            image = CASE WHEN $11 THEN $12 ELSE image END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&patch.username)
    .bind(&patch.first_name)
    .bind(&patch.last_name)
    .bind(&patch.phone)
    .bind(&patch.address)
    .bind(&patch.blood_type)
    .bind(patch.birthday)
    .bind(patch.gender)
    .bind(patch.class_id)
    .bind(set_image)
    .bind(image)
    .fetch_one(conn)
    .await?;
    Ok(student)
}

pub async fn update_teacher(
    conn: &mut PgConnection,
    id: TeacherId,
    patch: &TeacherPatch,
) -> Result<Teacher, AppError> {
    let (set_image, image) = patch.image.as_update();
    let teacher = sqlx::query_as::<_, Teacher>(
        r#"
        UPDATE teachers
        SET username = COALESCE($2, username),
            first_name = COALESCE($3, first_name),
            last_name = COALESCE($4, last_name),
            phone = COALESCE($5, phone),
            address = COALESCE($6, address),
            blood_type = COALESCE($7, blood_type),
            birthday = COALESCE($8, birthday),
            gender = COALESCE($9, gender),
            image = CASE WHEN $10 THEN $11 ELSE image END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&patch.username)
    .bind(&patch.first_name)
    .bind(&patch.last_name)
    .bind(&patch.phone)
    .bind(&patch.address)
    .bind(&patch.blood_type)
    .bind(patch.birthday)
    .bind(patch.gender)
    .bind(set_image)
    .bind(image)
    .fetch_one(conn)
    .await?;
    Ok(teacher)
}

pub async fn update_parent(
    conn: &mut PgConnection,
    id: ParentId,
    patch: &ParentPatch,
) -> Result<Parent, AppError> {
    let (set_image, image) = patch.image.as_update();
    let parent = sqlx::query_as::<_, Parent>(
        r#"
        UPDATE parents
        SET name = COALESCE($2, name),
            parent_code = COALESCE($3, parent_code),
            address = COALESCE($4, address),
            children_names = COALESCE($5, children_names),
            image = CASE WHEN $6 THEN $7 ELSE image END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&patch.name)
    .bind(&patch.parent_code)
    .bind(&patch.address)
    .bind(&patch.children_names)
    .bind(set_image)
    .bind(image)
    .fetch_one(conn)
    .await?;
    Ok(parent)
}

pub async fn update_admin(
    conn: &mut PgConnection,
    id: schoolhub_models::ids::AdminId,
    patch: &AdminPatch,
) -> Result<Admin, AppError> {
    let (set_image, image) = patch.image.as_update();
    let admin = sqlx::query_as::<_, Admin>(
        r#"
        UPDATE admins
        SET first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            username = COALESCE($4, username),
            phone = COALESCE($5, phone),
            address = COALESCE($6, address),
            image = CASE WHEN $7 THEN $8 ELSE image END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&patch.first_name)
    .bind(&patch.last_name)
    .bind(&patch.username)
    .bind(&patch.phone)
    .bind(&patch.address)
    .bind(set_image)
    .bind(image)
    .fetch_one(conn)
    .await?;
    Ok(admin)
}

pub async fn delete(conn: &mut PgConnection, profile: &Profile) -> Result<(), AppError> {
    let sql = format!("DELETE FROM {} WHERE id = $1", table(profile.kind()));
    let result = sqlx::query(&sql).bind(profile.id()).execute(conn).await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found(anyhow!(
            "{} not found",
            profile.kind().label()
        )));
    }
    Ok(())
}

/// Whether a student or teacher already uses `username`, ignoring the
/// profile `exclude`.
pub async fn username_taken(
    conn: &mut PgConnection,
    kind: ProfileKind,
    username: &str,
    exclude: Option<Uuid>,
) -> Result<bool, AppError> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE username = $1 AND ($2::uuid IS NULL OR id <> $2))",
        table(kind)
    );
    let taken = sqlx::query_scalar::<_, bool>(&sql)
        .bind(username)
        .bind(exclude)
        .fetch_one(conn)
        .await?;
    Ok(taken)
}

pub async fn parent_code_taken(
    conn: &mut PgConnection,
    parent_code: &str,
    exclude: Option<Uuid>,
) -> Result<bool, AppError> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM parents WHERE parent_code = $1 AND ($2::uuid IS NULL OR id <> $2))",
    )
    .bind(parent_code)
    .bind(exclude)
    .fetch_one(conn)
    .await?;
    Ok(taken)
}

/// Whether the teacher is the class teacher of any class.
pub async fn teaches_a_class(conn: &mut PgConnection, id: TeacherId) -> Result<bool, AppError> {
    let teaches = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM classes WHERE teacher_id = $1)",
    )
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(teaches)
}
