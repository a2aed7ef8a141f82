//! Courses and enrollments for a seeded tenant.

use std::time::Instant;

use aula_core::TenantTable;
use aula_models::courses::{Course, CourseDto, Enrollment, EnrollmentDto};
use aula_store::{Store, StoreError, StoreExt};
use fake::Fake;
use fake::faker::lorem::en::Sentence;

const SUBJECTS: [&str; 10] = [
    "Cálculo",
    "Álgebra Lineal",
    "Física",
    "Química",
    "Programación",
    "Estructuras de Datos",
    "Historia",
    "Economía",
    "Estadística",
    "Redacción",
];

/// Generates `count` courses, assigning teachers round-robin.
pub fn generate_courses(count: usize, teacher_ids: &[i64]) -> Vec<CourseDto> {
    (0..count)
        .map(|idx| {
            let subject = SUBJECTS[idx % SUBJECTS.len()];
            let section = idx / SUBJECTS.len() + 1;
            CourseDto {
                nombre: format!("{subject} {section}"),
                codigo: Some(format!("CUR-{:03}", idx + 1)),
                descripcion: Some(Sentence(4..8).fake()),
                profesor_id: (!teacher_ids.is_empty())
                    .then(|| teacher_ids[idx % teacher_ids.len()]),
            }
        })
        .collect()
}

/// Enrolls each student in `per_student` consecutive courses.
pub fn generate_enrollments(
    student_ids: &[i64],
    course_ids: &[i64],
    per_student: usize,
) -> Vec<EnrollmentDto> {
    if course_ids.is_empty() {
        return Vec::new();
    }
    let per_student = per_student.min(course_ids.len());
    student_ids
        .iter()
        .enumerate()
        .flat_map(|(idx, &usuario_id)| {
            (0..per_student).map(move |offset| EnrollmentDto {
                usuario_id,
                curso_id: course_ids[(idx + offset) % course_ids.len()],
            })
        })
        .collect()
}

pub async fn seed_courses(
    store: &dyn Store,
    table: &TenantTable,
    count: usize,
    teacher_ids: &[i64],
) -> Result<Vec<Course>, StoreError> {
    let start_time = Instant::now();
    println!("📚 Seeding {count} courses...");

    let courses = generate_courses(count, teacher_ids);
    let stored: Vec<Course> = store.create_many(table, &courses).await?;

    println!(
        "   ✓ Inserted {} courses in {:?}",
        stored.len(),
        start_time.elapsed()
    );
    Ok(stored)
}

pub async fn seed_enrollments(
    store: &dyn Store,
    table: &TenantTable,
    student_ids: &[i64],
    course_ids: &[i64],
    per_student: usize,
) -> Result<Vec<Enrollment>, StoreError> {
    let start_time = Instant::now();
    let enrollments = generate_enrollments(student_ids, course_ids, per_student);
    println!("📝 Seeding {} enrollments...", enrollments.len());

    let stored: Vec<Enrollment> = store.create_many(table, &enrollments).await?;

    println!(
        "   ✓ Inserted {} enrollments in {:?}",
        stored.len(),
        start_time.elapsed()
    );
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn courses_rotate_teachers() {
        let courses = generate_courses(4, &[7, 9]);
        let teachers: Vec<_> = courses.iter().map(|c| c.profesor_id).collect();
        assert_eq!(teachers, vec![Some(7), Some(9), Some(7), Some(9)]);
        assert_eq!(courses[0].codigo.as_deref(), Some("CUR-001"));
    }

    #[test]
    fn courses_without_teachers_are_unassigned() {
        let courses = generate_courses(2, &[]);
        assert!(courses.iter().all(|c| c.profesor_id.is_none()));
    }

    #[test]
    fn enrollments_never_repeat_a_course_for_one_student() {
        let enrollments = generate_enrollments(&[1, 2], &[10, 11, 12], 5);
        assert_eq!(enrollments.len(), 6);
        let first: Vec<_> = enrollments
            .iter()
            .filter(|e| e.usuario_id == 1)
            .map(|e| e.curso_id)
            .collect();
        assert_eq!(first, vec![10, 11, 12]);
    }
}
