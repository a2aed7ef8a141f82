//! Configuration structures for tenant seeding.

/// How much fake data to create in one tenant.
#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub domain: String,
    pub students: usize,
    pub teachers: usize,
    pub courses: usize,
    /// Enroll every seeded student in this many seeded courses.
    pub enrollments_per_student: usize,
}

impl SeedConfig {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            students: 30,
            teachers: 5,
            courses: 6,
            enrollments_per_student: 2,
        }
    }

    pub fn with_students(mut self, students: usize) -> Self {
        self.students = students;
        self
    }

    pub fn with_teachers(mut self, teachers: usize) -> Self {
        self.teachers = teachers;
        self
    }

    pub fn with_courses(mut self, courses: usize) -> Self {
        self.courses = courses;
        self
    }

    pub fn with_enrollments_per_student(mut self, per_student: usize) -> Self {
        self.enrollments_per_student = per_student;
        self
    }

    pub fn total_users(&self) -> usize {
        self.students + self.teachers
    }
}

/// What a seeding run created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub schema: String,
    pub students: usize,
    pub teachers: usize,
    pub courses: usize,
    pub enrollments: usize,
}
