use crate::config::AdminSeed;
use crate::database::UserRepository;
use crate::models::{Role, User};
use crate::services::auth_service::hash_password;

#[derive(Debug, PartialEq)]
pub enum SeedOutcome {
    Created,
    AlreadyPresent,
    Failed,
}

/// Creates the Admin account from `ADMIN_*` settings.
/// Does nothing when a user with that email already exists, whatever its role.
pub async fn seed_admin(users: &dyn UserRepository, seed: &AdminSeed, bcrypt_cost: u32) -> SeedOutcome {
    match users.find_by_email(&seed.email).await {
        Ok(Some(existing)) => {
            log::info!(
                "👑 Admin seed: {} already exists as {}, skipping",
                seed.email,
                existing.role
            );
            return SeedOutcome::AlreadyPresent;
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("   ❌ Admin seed lookup failed: {}", e);
            return SeedOutcome::Failed;
        }
    }

    let hash = match hash_password(&seed.password, bcrypt_cost) {
        Ok(hash) => hash,
        Err(e) => {
            log::error!("   ❌ Admin seed could not hash password: {}", e);
            return SeedOutcome::Failed;
        }
    };

    match users.insert(User::new(&seed.full_name, &seed.email, hash, Role::Admin)).await {
        Ok(user) => {
            log::info!("   ✅ Admin account created: {} ({})", seed.email, user.id_hex());
            SeedOutcome::Created
        }
        Err(e) => {
            log::error!("   ❌ Failed to seed admin account: {}", e);
            SeedOutcome::Failed
        }
    }
}
