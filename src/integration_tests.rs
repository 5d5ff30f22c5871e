#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio_util::sync::CancellationToken;

    use crate::actor_framework::ActorProxyFactory;
    use crate::app_system::IdentitySystem;
    use crate::config::IdentityStoreConfig;
    use crate::domain::{Claim, Role, User, UserLoginInfo, UserToken};
    use crate::error::IdentityError;
    use crate::keys::{ActorAddress, USER_ACTOR_TYPE};
    use crate::state::InMemoryStateStore;

    fn setup() -> (IdentitySystem, Arc<InMemoryStateStore>) {
        let store = Arc::new(InMemoryStateStore::new());
        let system = IdentitySystem::new(IdentityStoreConfig::default(), store.clone());
        (system, store)
    }

    fn user_one() -> User {
        User::new("U1", "UserOne", "user1@x.com")
    }

    #[tokio::test]
    async fn test_create_is_idempotent_and_indexed() {
        let (system, store) = setup();
        let cancel = CancellationToken::new();

        let result = system.users.create(user_one(), &cancel).await.unwrap();
        assert!(result.succeeded());
        let indexes = system.users.indexes();
        assert_eq!(indexes.collection.all(0, 0).await.unwrap(), vec!["U1"]);
        assert_eq!(indexes.names.find_user_id("USERONE").await.unwrap(), Some("U1".into()));
        assert_eq!(indexes.emails.find_user_id("USER1@X.COM").await.unwrap(), Some("U1".into()));

        // Same id again: no further writes.
        let commits = store.commit_count();
        let result = system.users.create(user_one(), &cancel).await.unwrap();
        assert_eq!(result.codes(), vec!["DuplicateUserId"]);
        assert_eq!(store.commit_count(), commits);
    }

    #[tokio::test]
    async fn test_duplicate_name_and_email_are_rejected() {
        let (system, _store) = setup();
        let cancel = CancellationToken::new();
        system.users.create(user_one(), &cancel).await.unwrap();

        let result = system
            .users
            .create(User::new("U2", "userone", "other@x.com"), &cancel)
            .await
            .unwrap();
        assert_eq!(result.codes(), vec!["DuplicateUserName"]);

        let result = system
            .users
            .create(User::new("U2", "usertwo", "USER1@x.com"), &cancel)
            .await
            .unwrap();
        assert_eq!(result.codes(), vec!["DuplicateEmail"]);
        assert!(system.users.find_by_id("U2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_claims_are_deduplicated_and_indexed_once() {
        let cancel = CancellationToken::new();
        let config = IdentityStoreConfig {
            default_user_claims: Vec::new(),
            ..IdentityStoreConfig::default()
        };
        let system = IdentitySystem::in_memory(config);

        let users = &system.users;
        users.create(user_one(), &cancel).await.unwrap();
        users
            .add_claims("U1", vec![Claim::new("existing", "value")], &cancel)
            .await
            .unwrap();
        users
            .add_claims(
                "U1",
                vec![
                    Claim::new("role", "admin"),
                    Claim::new("permission", "read"),
                    Claim::new("existing", "value"),
                    Claim::new("role", "admin"),
                ],
                &cancel,
            )
            .await
            .unwrap();

        let claims = users.get_claims("U1").await.unwrap();
        assert_eq!(claims.len(), 3);
        for claim in &claims {
            let holders = users
                .indexes()
                .claims
                .find_user_ids(&claim.claim_type, &claim.value)
                .await
                .unwrap();
            assert_eq!(holders, vec!["U1"]);
        }

        let admins = users.get_users_for_claim(&Claim::new("role", "admin")).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].id, "U1");
    }

    #[tokio::test]
    async fn test_delete_cleans_up_every_index() {
        let (system, _store) = setup();
        let cancel = CancellationToken::new();
        let users = &system.users;
        users.create(user_one(), &cancel).await.unwrap();
        users
            .add_login("U1", UserLoginInfo::new("Google", "k1", None), &cancel)
            .await
            .unwrap();
        users
            .set_token_value("U1", "Google", "access_token", Some("t".into()), &cancel)
            .await
            .unwrap();

        assert!(users.delete("U1", &cancel).await.unwrap().succeeded());

        assert!(users.find_by_id("U1").await.unwrap().is_none());
        assert!(users.find_by_name("USERONE").await.unwrap().is_none());
        assert!(users.find_by_email("USER1@X.COM").await.unwrap().is_none());
        assert!(users.find_by_login("Google", "k1").await.unwrap().is_none());
        assert!(users.indexes().collection.all(0, 0).await.unwrap().is_empty());
        assert_eq!(
            users.indexes().tokens.find_user_id("Google", "access_token").await.unwrap(),
            None
        );
        let admin = Claim::role("GlobalAdministrator");
        assert!(users.get_users_for_claim(&admin).await.unwrap().is_empty());
        assert!(users.users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_email_change_is_reindexed() {
        let (system, _store) = setup();
        let cancel = CancellationToken::new();
        let users = &system.users;
        users.create(user_one(), &cancel).await.unwrap();

        let mut user = users.find_by_id("U1").await.unwrap().unwrap();
        user.set_email("renamed@x.com");
        assert!(users.update(user, &cancel).await.unwrap().succeeded());

        assert!(users.find_by_email("USER1@X.COM").await.unwrap().is_none());
        let found = users.find_by_email("RENAMED@X.COM").await.unwrap().unwrap();
        assert_eq!(found.id, "U1");
    }

    #[tokio::test]
    async fn test_update_of_missing_user() {
        let (system, _store) = setup();
        let result = system
            .users
            .update(user_one(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.codes(), vec!["UserNotFound"]);
    }

    #[tokio::test]
    async fn test_login_roundtrip() {
        let (system, _store) = setup();
        let cancel = CancellationToken::new();
        let users = &system.users;
        users.create(user_one(), &cancel).await.unwrap();

        let result = users
            .add_login("U1", UserLoginInfo::new("Google", "k1", Some("Google".into())), &cancel)
            .await
            .unwrap();
        assert!(result.succeeded());
        let login = users.find_login("Google", "k1").await.unwrap().unwrap();
        assert_eq!(login.user_id, "U1");
        assert_eq!(users.find_by_login("Google", "k1").await.unwrap().map(|u| u.id), Some("U1".into()));
        assert_eq!(users.get_logins("U1").await.unwrap().len(), 1);

        users.remove_login("U1", "Google", "k1", &cancel).await.unwrap();
        assert!(users.find_login("Google", "k1").await.unwrap().is_none());
        assert!(users.find_user_login("U1", "Google", "k1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_held_by_another_user_is_refused() {
        let (system, _store) = setup();
        let cancel = CancellationToken::new();
        let users = &system.users;
        users.create(user_one(), &cancel).await.unwrap();
        users
            .create(User::new("U2", "UserTwo", "user2@x.com"), &cancel)
            .await
            .unwrap();
        users
            .add_login("U1", UserLoginInfo::new("Google", "k1", None), &cancel)
            .await
            .unwrap();

        let result = users
            .add_login("U2", UserLoginInfo::new("Google", "k1", None), &cancel)
            .await
            .unwrap();
        assert_eq!(result.codes(), vec!["LoginAlreadyAssociated"]);
        assert!(users.get_logins("U2").await.unwrap().is_empty());
        assert_eq!(users.find_by_login("Google", "k1").await.unwrap().map(|u| u.id), Some("U1".into()));

        // Re-adding to the current holder is fine.
        let result = users
            .add_login("U1", UserLoginInfo::new("Google", "k1", None), &cancel)
            .await
            .unwrap();
        assert!(result.succeeded());

        users.delete("U1", &cancel).await.unwrap();
        assert!(users.find_by_login("Google", "k1").await.unwrap().is_none());
        assert!(users
            .add_login("U2", UserLoginInfo::new("Google", "k1", None), &cancel)
            .await
            .unwrap()
            .succeeded());
        assert_eq!(users.find_by_login("Google", "k1").await.unwrap().map(|u| u.id), Some("U2".into()));
    }

    #[tokio::test]
    async fn test_deleting_user_keeps_shared_token_entry_of_other_user() {
        let (system, _store) = setup();
        let cancel = CancellationToken::new();
        let users = &system.users;
        users.create(user_one(), &cancel).await.unwrap();
        users
            .create(User::new("U2", "UserTwo", "user2@x.com"), &cancel)
            .await
            .unwrap();
        users
            .set_token_value("U1", "Google", "access_token", Some("a".into()), &cancel)
            .await
            .unwrap();
        users
            .set_token_value("U2", "Google", "access_token", Some("b".into()), &cancel)
            .await
            .unwrap();

        users.delete("U1", &cancel).await.unwrap();
        assert_eq!(users.rebuild_indexes(&cancel).await.unwrap(), 1);

        assert_eq!(
            users.indexes().tokens.find_user_id("Google", "access_token").await.unwrap(),
            Some("U2".into())
        );
        assert_eq!(
            users.get_token_value("U2", "Google", "access_token").await.unwrap(),
            Some("b".into())
        );
    }

    #[tokio::test]
    async fn test_token_values() {
        let (system, _store) = setup();
        let cancel = CancellationToken::new();
        let users = &system.users;
        users.create(user_one(), &cancel).await.unwrap();

        users
            .set_token_value("U1", "Google", "refresh_token", Some("r1".into()), &cancel)
            .await
            .unwrap();
        users
            .set_token_value("U1", "Google", "refresh_token", Some("r2".into()), &cancel)
            .await
            .unwrap();
        assert_eq!(
            users.get_token_value("U1", "Google", "refresh_token").await.unwrap(),
            Some("r2".into())
        );

        users.remove_token("U1", "Google", "refresh_token", &cancel).await.unwrap();
        assert!(users.find_token("U1", "Google", "refresh_token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_enumeration_skips_vanished_users() {
        let (system, _store) = setup();
        let cancel = CancellationToken::new();
        let users = &system.users;
        users.create(user_one(), &cancel).await.unwrap();
        // An id listed in the collection whose user never got created.
        users.indexes().collection.add("ghost", &cancel).await.unwrap();

        let all = users.users().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "U1");

        // Repair drops the ghost.
        assert_eq!(users.rebuild_indexes(&cancel).await.unwrap(), 1);
        assert_eq!(users.indexes().collection.all(0, 0).await.unwrap(), vec!["U1"]);
    }

    #[tokio::test]
    async fn test_cancelled_operations_write_nothing() {
        let (system, store) = setup();
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(
            system.users.create(user_one(), &cancel).await,
            Err(IdentityError::Cancelled)
        );
        assert_eq!(
            system
                .roles
                .create(Role::new("R1", "Admin"), &cancel)
                .await,
            Err(IdentityError::Cancelled)
        );
        assert_eq!(store.commit_count(), 0);
        assert!(store.is_empty());

        // Cancelled inside the actor, past the store's own check.
        let result = system.runtime().user_actor("U1").create(user_one(), cancel).await;
        assert_eq!(result, Err(IdentityError::Cancelled));
        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_mutations_of_present_user_write_nothing() {
        let (system, store) = setup();
        let live = CancellationToken::new();
        let users = &system.users;
        users.create(user_one(), &live).await.unwrap();
        users
            .add_login("U1", UserLoginInfo::new("Google", "k1", None), &live)
            .await
            .unwrap();
        users
            .set_token_value("U1", "Google", "access_token", Some("t".into()), &live)
            .await
            .unwrap();
        let commits = store.commit_count();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut renamed = user_one();
        renamed.set_email("renamed@x.com");
        let admin = Claim::role("GlobalAdministrator");
        let read = Claim::new("permission", "read");
        let refresh = UserToken::new("U1", "Google", "refresh_token", Some("r".into()));

        let through_store = vec![
            users.update(renamed.clone(), &cancel).await.map(|_| ()),
            users.delete("U1", &cancel).await.map(|_| ()),
            users.add_claims("U1", vec![read.clone()], &cancel).await,
            users.remove_claims("U1", vec![admin.clone()], &cancel).await,
            users.replace_claim("U1", admin.clone(), read.clone(), &cancel).await,
            users
                .add_login("U1", UserLoginInfo::new("Google", "k2", None), &cancel)
                .await
                .map(|_| ()),
            users.remove_login("U1", "Google", "k1", &cancel).await,
            users.add_token(refresh.clone(), &cancel).await,
            users.remove_token("U1", "Google", "access_token", &cancel).await,
            users.rebuild_indexes(&cancel).await.map(|_| ()),
        ];
        for result in through_store {
            assert_eq!(result, Err(IdentityError::Cancelled));
        }

        // Straight to the actor, past the store's own checks.
        let actor = system.runtime().user_actor("U1");
        let through_actor = vec![
            actor.update(renamed, cancel.clone()).await,
            actor.delete(cancel.clone()).await,
            actor.add_claims(vec![read.clone()], cancel.clone()).await,
            actor.remove_claims(vec![admin.clone()], cancel.clone()).await,
            actor.replace_claim(admin, read, cancel.clone()).await,
            actor
                .add_login(UserLoginInfo::new("Google", "k2", None), cancel.clone())
                .await,
            actor
                .remove_login("Google".into(), "k1".into(), cancel.clone())
                .await,
            actor.add_token(refresh, cancel.clone()).await,
            actor
                .remove_token("Google".into(), "access_token".into(), cancel.clone())
                .await,
            actor.reindex(cancel).await.map(|_| ()),
        ];
        for result in through_actor {
            assert_eq!(result, Err(IdentityError::Cancelled));
        }

        assert_eq!(store.commit_count(), commits);
        let user = users.find_by_id("U1").await.unwrap().unwrap();
        assert_eq!(user.normalized_email.as_deref(), Some("USER1@X.COM"));
        assert_eq!(users.get_claims("U1").await.unwrap(), vec![Claim::role("GlobalAdministrator")]);
        assert_eq!(users.get_logins("U1").await.unwrap().len(), 1);
        assert!(users.find_token("U1", "Google", "refresh_token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_state_is_reloaded_after_deactivation() {
        let (system, _store) = setup();
        let cancel = CancellationToken::new();
        system.users.create(user_one(), &cancel).await.unwrap();
        system
            .users
            .add_claims("U1", vec![Claim::new("permission", "read")], &cancel)
            .await
            .unwrap();

        assert!(system.runtime().deactivate(&ActorAddress::new(USER_ACTOR_TYPE, "U1")));
        let claims = system.users.get_claims("U1").await.unwrap();
        assert!(claims.contains(&Claim::new("permission", "read")));
    }

    #[tokio::test]
    async fn test_partitions_through_system() {
        let (system, _store) = setup();
        let cancel = CancellationToken::new();
        system.users.create(user_one(), &cancel).await.unwrap();

        let partition = system.partitions.get_default_partition("userone", &cancel).await.unwrap();
        assert_eq!(partition, "default");
        assert!(system.partitions.in_partition("UserOne", "default", &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn test_role_flow() {
        let (system, _store) = setup();
        let cancel = CancellationToken::new();
        let roles = &system.roles;
        assert!(roles.create(Role::new("R1", "Admin"), &cancel).await.unwrap().succeeded());

        let mut role = roles.find_by_name("ADMIN").await.unwrap().unwrap();
        role.set_name("Administrators");
        assert!(roles.update(role, &cancel).await.unwrap().succeeded());
        assert!(roles.find_by_name("ADMIN").await.unwrap().is_none());
        assert!(roles.find_by_name("ADMINISTRATORS").await.unwrap().is_some());

        roles
            .add_claim("R1", Claim::new("permission", "all"), &cancel)
            .await
            .unwrap();
        assert_eq!(roles.get_claims("R1").await.unwrap(), vec![Claim::new("permission", "all")]);
        assert_eq!(roles.rebuild_indexes(&cancel).await.unwrap(), 1);

        assert!(roles.delete("R1", &cancel).await.unwrap().succeeded());
        assert!(roles.roles().await.unwrap().is_empty());
        assert!(roles
            .get_roles_for_claim(&Claim::new("permission", "all"))
            .await
            .unwrap()
            .is_empty());
    }
}
