//! Fake students and teachers.

use std::time::Instant;

use aula_core::TenantTable;
use aula_models::users::NewUser;
use aula_models::{Role, UserProfile};
use aula_store::{Store, StoreError, StoreExt};
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use rayon::prelude::*;

/// Rows per bulk insert.
const BATCH_SIZE: usize = 500;

/// Generates `count` users with the given role, all inside `domain`.
pub fn generate_users(domain: &str, role: Role, count: usize) -> Vec<NewUser> {
    (0..count)
        .into_par_iter()
        .map(|idx| generate_user(domain, role, idx))
        .collect()
}

fn generate_user(domain: &str, role: Role, idx: usize) -> NewUser {
    let nombre: String = FirstName().fake();
    let apellido: String = LastName().fake();

    let email = format!(
        "{}.{}+{}{}@{}",
        slug(&nombre),
        slug(&apellido),
        role.as_str(),
        idx,
        domain
    );

    NewUser {
        nombre,
        apellido,
        email,
        rol: role,
        telefono: Some(PhoneNumber().fake()),
        direccion: None,
        fecha_nacimiento: None,
    }
}

fn slug(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase()
}

/// Inserts users in batches and returns them as stored.
pub async fn insert_users(
    store: &dyn Store,
    table: &TenantTable,
    users: &[NewUser],
) -> Result<Vec<UserProfile>, StoreError> {
    let mut stored = Vec::with_capacity(users.len());
    for chunk in users.chunks(BATCH_SIZE) {
        let rows: Vec<UserProfile> = store.create_many(table, chunk).await?;
        stored.extend(rows);
    }
    Ok(stored)
}

/// Generates and inserts `count` users with the given role.
pub async fn seed_users(
    store: &dyn Store,
    table: &TenantTable,
    domain: &str,
    role: Role,
    count: usize,
) -> Result<Vec<UserProfile>, StoreError> {
    let start_time = Instant::now();
    println!("👥 Seeding {count} {role} users...");

    let users = generate_users(domain, role, count);
    let stored = insert_users(store, table, &users).await?;

    println!(
        "   ✓ Inserted {} {} users in {:?}",
        stored.len(),
        role,
        start_time.elapsed()
    );
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_users_stay_in_domain() {
        let users = generate_users("ucb.edu.bo", Role::Estudiante, 20);
        assert_eq!(users.len(), 20);
        for user in &users {
            assert!(user.email.ends_with("@ucb.edu.bo"), "{}", user.email);
            assert_eq!(user.rol, Role::Estudiante);
        }
    }

    #[test]
    fn generated_emails_are_unique() {
        let users = generate_users("upb.edu.bo", Role::Profesor, 50);
        let mut emails: Vec<_> = users.iter().map(|u| u.email.as_str()).collect();
        emails.sort_unstable();
        emails.dedup();
        assert_eq!(emails.len(), 50);
    }

    #[test]
    fn slug_drops_punctuation() {
        assert_eq!(slug("O'Conner"), "oconner");
        assert_eq!(slug("Mary Ann"), "maryann");
    }
}
