use tokio_util::sync::CancellationToken;
use tracing::{error, info, Instrument};

use identity_actors::app_system::{setup_tracing, IdentitySystem};
use identity_actors::config::IdentityStoreConfig;
use identity_actors::domain::{normalize_key, Claim, Role, User, UserLoginInfo};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    info!("Starting identity store demo");

    let system = IdentitySystem::in_memory(IdentityStoreConfig::from_env());
    let cancel = CancellationToken::new();

    let span = tracing::info_span!("user_registration");
    async {
        let user = User::new("user-1", "Alice", "alice@example.com");
        let result = system.users.create(user, &cancel).await.map_err(|e| e.to_string())?;
        if !result.succeeded() {
            return Err(format!("User creation failed: {:?}", result.codes()));
        }
        let result = system
            .users
            .add_login("user-1", UserLoginInfo::new("Google", "alice-google", None), &cancel)
            .await
            .map_err(|e| e.to_string())?;
        if !result.succeeded() {
            return Err(format!("Login registration failed: {:?}", result.codes()));
        }
        info!("User registered with an external login");
        Ok::<(), String>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("lookups");
    async {
        match system.users.find_by_email(&normalize_key("alice@example.com")).await {
            Ok(Some(user)) => info!(user_id = %user.id, "Found user by email"),
            Ok(None) => error!("User not found by email"),
            Err(e) => error!(error = %e, "Email lookup failed"),
        }
        match system.users.find_by_login("Google", "alice-google").await {
            Ok(Some(user)) => info!(user_id = %user.id, "Found user by login"),
            Ok(None) => error!("User not found by login"),
            Err(e) => error!(error = %e, "Login lookup failed"),
        }
        match system.partitions.get_default_partition("alice", &cancel).await {
            Ok(partition) => info!(partition = %partition, "Resolved default partition"),
            Err(e) => error!(error = %e, "Partition lookup failed"),
        }
    }
    .instrument(span)
    .await;

    let span = tracing::info_span!("administration");
    async {
        let role = Role::new("role-1", "Auditors");
        system.roles.create(role, &cancel).await.map_err(|e| e.to_string())?;
        system
            .roles
            .add_claim("role-1", Claim::new("permission", "audit"), &cancel)
            .await
            .map_err(|e| e.to_string())?;

        let mut user = system
            .users
            .find_by_id("user-1")
            .await
            .map_err(|e| e.to_string())?
            .ok_or("User disappeared")?;
        user.set_email("alice@example.org");
        system.users.update(user, &cancel).await.map_err(|e| e.to_string())?;

        let users = system.users.users().await.map_err(|e| e.to_string())?;
        info!(count = users.len(), "Listed users");

        system.users.delete("user-1", &cancel).await.map_err(|e| e.to_string())?;
        info!("User deleted");
        Ok::<(), String>(())
    }
    .instrument(span)
    .await?;

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
