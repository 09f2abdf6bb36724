//! Schools, profiles, organizations and applications against Postgres.

mod common;

use common::*;
use server_core::domains::organization::{
    Application, ApplicationStatus, ApplicationUpdate, NewApplication, OrgType, Organization,
    OrganizationData, OrganizationUpdate,
};
use server_core::domains::profile::{Profile, ProfileInput, ProfileUpdate};
use server_core::domains::school::School;
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn school_lookup(ctx: &TestHarness) {
    let id = create_test_school(&ctx.db_pool, "Lookup University").await.unwrap();

    let school = School::find_by_id(id, &ctx.db_pool).await.unwrap();
    assert_eq!(school.name, "Lookup University");
    assert_eq!(school.school_type, "university");

    let all = School::find_all(&ctx.db_pool).await.unwrap();
    assert!(all.iter().any(|s| s.id == id));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn profile_create_update_and_join(ctx: &TestHarness) {
    let school_id = create_test_school(&ctx.db_pool, "Profile State").await.unwrap();
    let user_id = new_user();

    assert!(Profile::find_by_user(user_id, &ctx.db_pool).await.unwrap().is_none());

    let input = ProfileInput {
        school_id,
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.edu".into(),
        graduation_year: Some(2027),
        major: None,
    };
    let created = Profile::create_or_update(user_id, &input, &ctx.db_pool).await.unwrap();
    assert!(created.profile_completed);

    // Second submission replaces the first
    let again = Profile::create_or_update(
        user_id,
        &ProfileInput {
            major: Some("Mathematics".into()),
            ..input
        },
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert_eq!(again.id, created.id);
    assert_eq!(again.major.as_deref(), Some("Mathematics"));

    let updated = Profile::update(
        user_id,
        &ProfileUpdate {
            graduation_year: Some(2028),
            ..Default::default()
        },
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert_eq!(updated.graduation_year, Some(2028));
    assert_eq!(updated.first_name.as_deref(), Some("Ada"));

    let joined = Profile::find_with_school(user_id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(joined.school_name.as_deref(), Some("Profile State"));
    assert_eq!(joined.school_domain.as_deref(), Some("example.edu"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn organization_search_is_case_insensitive_and_school_scoped(ctx: &TestHarness) {
    let school_id = create_test_school(&ctx.db_pool, "Search College").await.unwrap();
    let other_school = create_test_school(&ctx.db_pool, "Other College").await.unwrap();

    create_test_organization(&ctx.db_pool, school_id, "Chess Club", OrgType::Recreational)
        .await
        .unwrap();
    create_test_organization(&ctx.db_pool, school_id, "Debate Union", OrgType::Academic)
        .await
        .unwrap();
    create_test_organization(&ctx.db_pool, other_school, "Chess Society", OrgType::Club)
        .await
        .unwrap();

    let found = Organization::search(school_id, "CHESS", &ctx.db_pool).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Chess Club");
    assert_eq!(found[0].org_type, "recreational");

    let all = Organization::find_by_school(school_id, &ctx.db_pool).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn popular_orders_by_application_count(ctx: &TestHarness) {
    let school_id = create_test_school(&ctx.db_pool, "Popular Tech").await.unwrap();
    let quiet = create_test_organization(&ctx.db_pool, school_id, "Astronomy Club", OrgType::Club)
        .await
        .unwrap();
    let busy = create_test_organization(&ctx.db_pool, school_id, "Robotics Team", OrgType::Club)
        .await
        .unwrap();

    for _ in 0..3 {
        let input = NewApplication {
            organization_id: busy.id,
            application_status: ApplicationStatus::Applied,
            application_date: None,
            notes: None,
        };
        Application::create(new_user(), &input, &ctx.db_pool).await.unwrap();
    }

    let popular = Organization::find_popular(school_id, 10, &ctx.db_pool).await.unwrap();
    assert_eq!(popular.len(), 2);
    assert_eq!(popular[0].organization.id, busy.id);
    assert_eq!(popular[0].application_count, 3);
    assert_eq!(popular[1].organization.id, quiet.id);
    assert_eq!(popular[1].application_count, 0);

    let top = Organization::find_popular(school_id, 1, &ctx.db_pool).await.unwrap();
    assert_eq!(top.len(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn upsert_matches_on_name_or_website(ctx: &TestHarness) {
    let school_id = create_test_school(&ctx.db_pool, "Upsert University").await.unwrap();
    let data = OrganizationData {
        school_id,
        name: "Product Club".into(),
        org_type: OrgType::Professional,
        description: None,
        website_url: Some("https://product.example.edu".into()),
        application_deadline: None,
        application_requirements: None,
        contact_email: None,
        is_verified: false,
    };

    let (first, created) = Organization::upsert(&data, &ctx.db_pool).await.unwrap();
    assert!(created);

    // Same website, new name: updates the existing row
    let renamed = OrganizationData {
        name: "Product Management Club".into(),
        description: Some("Builds products".into()),
        ..data.clone()
    };
    let (second, created) = Organization::upsert(&renamed, &ctx.db_pool).await.unwrap();
    assert!(!created);
    assert_eq!(second.id, first.id);
    assert_eq!(second.name, "Product Management Club");
    assert_eq!(second.description.as_deref(), Some("Builds products"));

    let updated = Organization::update(
        first.id,
        &OrganizationUpdate {
            is_verified: Some(true),
            ..Default::default()
        },
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert!(updated.is_verified);
    assert_eq!(updated.name, "Product Management Club");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn application_lifecycle(ctx: &TestHarness) {
    let school_id = create_test_school(&ctx.db_pool, "Application Institute").await.unwrap();
    let org = create_test_organization(&ctx.db_pool, school_id, "Honors Society", OrgType::HonorSociety)
        .await
        .unwrap();
    let user_id = new_user();

    let input: NewApplication = serde_json::from_value(serde_json::json!({
        "organization_id": org.id,
        "notes": "Ask about dues",
    }))
    .unwrap();
    let app = Application::create(user_id, &input, &ctx.db_pool).await.unwrap();
    assert_eq!(app.application_status, "interested");

    let updated = Application::update(
        app.id,
        &ApplicationUpdate {
            application_status: Some(ApplicationStatus::Accepted),
            ..Default::default()
        },
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert_eq!(updated.application_status, "accepted");
    assert_eq!(updated.notes.as_deref(), Some("Ask about dues"));

    let mine = Application::find_by_user(user_id, &ctx.db_pool).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, app.id);
}
