use attenthive_application::{
    CareLogRepository, MembershipRepository, NewCareLog, NewRecipient, NewUser, RecipientChanges,
    RecipientRepository, UserRepository,
};
use attenthive_domain::{CareActivity, MembershipRole, RecipientCategory, UserId};
use chrono::Utc;
use sqlx::PgPool;

use crate::test_database::{test_pool, unique_email};
use crate::{PostgresCareLogRepository, PostgresMembershipRepository, PostgresUserRepository};

use super::PostgresRecipientRepository;

async fn seed_user(pool: &PgPool, prefix: &str) -> UserId {
    let created = PostgresUserRepository::new(pool.clone())
        .create(NewUser {
            email: unique_email(prefix),
            display_name: prefix.to_owned(),
            password_hash: "hash".to_owned(),
        })
        .await;
    match created {
        Ok(record) => record.id,
        Err(error) => panic!("failed to seed user: {error}"),
    }
}

fn biscuit(owner_id: UserId) -> NewRecipient {
    NewRecipient {
        owner_id,
        name: "Biscuit".to_owned(),
        category: RecipientCategory::Pet,
        subtype: Some("dog".to_owned()),
        notes: None,
        attributes: serde_json::json!({ "breed": "beagle" }),
    }
}

#[tokio::test]
async fn access_row_reads_owner_and_membership_together() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let recipients = PostgresRecipientRepository::new(pool.clone());
    let memberships = PostgresMembershipRepository::new(pool.clone());
    let owner = seed_user(&pool, "owner").await;
    let viewer = seed_user(&pool, "viewer").await;
    let outsider = seed_user(&pool, "outsider").await;

    let Ok(recipient) = recipients.create(biscuit(owner)).await else {
        panic!("failed to create recipient");
    };
    assert!(
        memberships
            .upsert(recipient.id, viewer, MembershipRole::Viewer)
            .await
            .is_ok()
    );

    let owner_row = recipients.find_access_row(recipient.id, owner).await;
    assert!(matches!(
        owner_row,
        Ok(Some(ref row)) if row.owner_id == owner && row.membership_role.is_none()
    ));

    let viewer_row = recipients.find_access_row(recipient.id, viewer).await;
    assert!(matches!(
        viewer_row,
        Ok(Some(ref row)) if row.membership_role == Some(MembershipRole::Viewer)
    ));

    let outsider_row = recipients.find_access_row(recipient.id, outsider).await;
    assert!(matches!(
        outsider_row,
        Ok(Some(ref row)) if row.membership_role.is_none()
    ));
}

#[tokio::test]
async fn upsert_keeps_one_row_per_recipient_and_user() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let recipients = PostgresRecipientRepository::new(pool.clone());
    let memberships = PostgresMembershipRepository::new(pool.clone());
    let owner = seed_user(&pool, "owner").await;
    let member = seed_user(&pool, "member").await;
    let Ok(recipient) = recipients.create(biscuit(owner)).await else {
        panic!("failed to create recipient");
    };

    let first = memberships
        .upsert(recipient.id, member, MembershipRole::Viewer)
        .await;
    let second = memberships
        .upsert(recipient.id, member, MembershipRole::Caregiver)
        .await;
    let (Ok(first), Ok(second)) = (first, second) else {
        panic!("upserts should succeed");
    };
    assert_eq!(first.id, second.id);
    assert_eq!(second.role, MembershipRole::Caregiver);

    let rows = memberships
        .list_for_recipient(recipient.id)
        .await
        .unwrap_or_default();
    assert_eq!(rows.len(), 1);

    let shared = recipients
        .list_shared_with(member)
        .await
        .unwrap_or_default();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].role, MembershipRole::Caregiver);

    assert_eq!(
        memberships
            .delete_matching(recipient.id, member, MembershipRole::Viewer)
            .await
            .ok(),
        Some(0)
    );
    assert_eq!(
        memberships
            .delete_matching(recipient.id, member, MembershipRole::Caregiver)
            .await
            .ok(),
        Some(1)
    );
}

#[tokio::test]
async fn partial_update_and_cascading_delete() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let recipients = PostgresRecipientRepository::new(pool.clone());
    let care_logs = PostgresCareLogRepository::new(pool.clone());
    let owner = seed_user(&pool, "owner").await;
    let Ok(recipient) = recipients.create(biscuit(owner)).await else {
        panic!("failed to create recipient");
    };

    let updated = recipients
        .update(
            recipient.id,
            RecipientChanges {
                subtype: Some(None),
                notes: Some(Some("allergic to chicken".to_owned())),
                ..RecipientChanges::default()
            },
        )
        .await;
    let Ok(Some(updated)) = updated else {
        panic!("update should find the recipient");
    };
    assert_eq!(updated.name, "Biscuit");
    assert_eq!(updated.subtype, None);
    assert_eq!(updated.notes.as_deref(), Some("allergic to chicken"));
    assert_eq!(updated.attributes, serde_json::json!({ "breed": "beagle" }));

    let logged = care_logs
        .create(NewCareLog {
            recipient_id: recipient.id,
            user_id: owner,
            activity: CareActivity::Walking,
            notes: None,
            occurred_at: Utc::now(),
        })
        .await;
    assert!(logged.is_ok());

    assert_eq!(recipients.delete(recipient.id).await.ok(), Some(true));
    assert_eq!(
        care_logs
            .list_for_recipient(recipient.id, 10)
            .await
            .map(|entries| entries.len())
            .ok(),
        Some(0)
    );
}
