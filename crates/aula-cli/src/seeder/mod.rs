//! Tenant seeding for local development and demos.
//!
//! # Module Structure
//!
//! - [`users`] - Fake students and teachers
//! - [`courses`] - Courses with assigned teachers, and enrollments
//! - [`models`] - Seeding configuration and summary
//!
//! # Usage
//!
//! ```ignore
//! use aula_cli::seeder::{SeedConfig, seed_tenant};
//!
//! let summary = seed_tenant(&store, &tenants, SeedConfig::new("upb.edu.bo")).await?;
//! println!("{} students in {}", summary.students, summary.schema);
//! ```
//!
//! Users are generated in parallel with Rayon and written with bulk inserts.

pub mod courses;
pub mod models;
pub mod users;

pub use models::{SeedConfig, SeedSummary};

use std::time::Instant;

use aula_core::{Entity, TenantDirectory};
use aula_models::Role;
use aula_store::Store;

/// Seeds students, teachers, courses and enrollments into one tenant.
pub async fn seed_tenant(
    store: &dyn Store,
    tenants: &TenantDirectory,
    config: SeedConfig,
) -> Result<SeedSummary, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let domain = tenants
        .domain_from_email(&format!("seed@{}", config.domain))
        .ok_or_else(|| format!("Unknown tenant domain: {}", config.domain))?;
    let schema = tenants.schema_for(domain.as_str());

    println!("🌱 Seeding tenant {schema} ({domain})...");
    println!(
        "   - Users: {} students, {} teachers",
        config.students, config.teachers
    );
    println!(
        "   - Courses: {}, enrollments per student: {}",
        config.courses, config.enrollments_per_student
    );

    let users = schema.table(Entity::Users);
    let teachers =
        users::seed_users(store, &users, domain.as_str(), Role::Profesor, config.teachers).await?;
    let students =
        users::seed_users(store, &users, domain.as_str(), Role::Estudiante, config.students)
            .await?;

    let teacher_ids: Vec<i64> = teachers.iter().map(|t| t.id).collect();
    let courses = courses::seed_courses(
        store,
        &schema.table(Entity::Courses),
        config.courses,
        &teacher_ids,
    )
    .await?;

    let student_ids: Vec<i64> = students.iter().map(|s| s.id).collect();
    let course_ids: Vec<i64> = courses.iter().map(|c| c.id).collect();
    let enrollments = courses::seed_enrollments(
        store,
        &schema.table(Entity::Enrollments),
        &student_ids,
        &course_ids,
        config.enrollments_per_student,
    )
    .await?;

    println!("\n✅ Seeding complete in {:?}", start_time.elapsed());

    Ok(SeedSummary {
        schema: schema.to_string(),
        students: students.len(),
        teachers: teachers.len(),
        courses: courses.len(),
        enrollments: enrollments.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aula_store::MemoryStore;

    #[tokio::test]
    async fn seeds_every_table_of_the_tenant() {
        let store = MemoryStore::new();
        let tenants = TenantDirectory::default();
        let config = SeedConfig::new("ucb.edu.bo")
            .with_students(4)
            .with_teachers(2)
            .with_courses(3)
            .with_enrollments_per_student(2);

        let summary = seed_tenant(&store, &tenants, config).await.unwrap();

        assert_eq!(summary.schema, "tenant_ucb");
        assert_eq!(summary.students, 4);
        assert_eq!(summary.teachers, 2);
        assert_eq!(summary.courses, 3);
        assert_eq!(summary.enrollments, 8);

        let schema = tenants.schema_for("ucb.edu.bo");
        assert_eq!(store.rows(&schema.table(Entity::Users)).len(), 6);
        assert!(store.rows(&tenants.schema_for("upb.edu.bo").table(Entity::Users)).is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_domain() {
        let store = MemoryStore::new();
        let result = seed_tenant(&store, &TenantDirectory::default(), SeedConfig::new("example.com")).await;
        assert!(result.is_err());
        assert_eq!(store.write_count(), 0);
    }
}
