//! Pipeline Integration Tests
//!
//! Drive gateway events through the router over an in-memory archive, a
//! recording platform, and a fake fetcher. No database, no network, no
//! running bot required.
//!
//! Run with: cargo test -p integration-tests --test pipeline_tests

use chrono::Duration;

use gram_core::{Platform, Snowflake, StreakRecord, UserProfile, FAILURE_EMOJI, SUCCESS_EMOJI};
use gram_service::services::ReconcileService;
use integration_tests::{fixtures, PlatformCall, TestWorld};

/// Titles of the discussion threads opened so far
fn thread_titles(world: &TestWorld) -> Vec<String> {
    world
        .platform
        .calls()
        .iter()
        .filter_map(|call| match call {
            PlatformCall::CreateThread { title, .. } => Some(title.clone()),
            _ => None,
        })
        .collect()
}

/// Id of a guild role by name, panicking when it does not exist
async fn role_id(world: &TestWorld, name: &str) -> Snowflake {
    world
        .platform
        .guild_roles()
        .await
        .unwrap()
        .iter()
        .find(|role| role.name == name)
        .unwrap_or_else(|| panic!("role {name} should exist"))
        .id
}

// ============================================================================
// Submission Tests
// ============================================================================

#[tokio::test]
async fn test_first_post_is_archived_and_announced() {
    let world = TestWorld::new();
    let author = fixtures::member(1);

    world
        .handle(fixtures::post_created(
            10,
            &author,
            "Bonjour **tout le monde**",
            &["photo.png"],
        ))
        .await;

    // Archived with rendered content
    let state = world.archive.state();
    let post = state.posts.get(&Snowflake::new(10)).expect("post archived");
    assert_eq!(post.content, "<p>Bonjour <strong>tout le monde</strong></p>\n");
    assert_eq!(post.author_id, Snowflake::new(1));

    // Attachment row and mirrored file
    let attachments = state.attachments.get(&Snowflake::new(10)).unwrap();
    assert_eq!(attachments.len(), 1);
    let mirrored = world.data_dir.join("attachments").join("10_photo.png");
    assert_eq!(attachments[0].path, mirrored.to_string_lossy());
    assert!(mirrored.exists(), "attachment should be mirrored to disk");

    // Profile and streak
    let profile = state.profiles.get(&Snowflake::new(1)).unwrap();
    assert_eq!(profile.username, "membre1");
    assert_eq!(profile.display_name, "Membre 1");
    let streak = state.streaks.get(&Snowflake::new(1)).unwrap();
    assert_eq!(streak.current_streak, 1);
    assert_eq!(streak.last_post_date, world.today());

    // Thread with the three notices, in order
    assert_eq!(
        thread_titles(&world),
        vec!["Nouvelle publication dans l’electrogram de Membre 1".to_string()]
    );
    let messages = world.platform.thread_messages();
    assert_eq!(messages.len(), 3);
    assert!(messages[0].contains("Ouvrir l’electrogram de Membre 1"));
    assert!(messages[0].ends_with("https://gram.test/user/membre1"));
    assert!(messages[1].contains("Bienvenue sur club elec electrogram !"));
    assert!(messages[2].contains("Discutez de cette publication avec Membre 1"));

    // Success marker and the first level role (icon-less; no font on disk)
    assert!(world.platform.added_reactions().contains(&SUCCESS_EMOJI.to_string()));
    assert_eq!(world.platform.created_roles(), vec![("niveau 1".to_string(), false)]);
    let niveau_1 = role_id(&world, "niveau 1").await;
    assert_eq!(world.platform.assigned_roles(), vec![(Snowflake::new(1), niveau_1)]);
}

#[tokio::test]
async fn test_post_without_attachments_is_rejected() {
    let world = TestWorld::new();

    world
        .handle(fixtures::post_created(11, &fixtures::member(1), "Texte seul", &[]))
        .await;

    assert!(world.archive.state().posts.is_empty());
    assert_eq!(world.platform.deleted_posts(), vec![Snowflake::new(11)]);
    assert_eq!(world.platform.threads_created(), 0);

    let messages = world.platform.direct_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("du texte ainsi qu’une ou plusieurs images"));
}

#[tokio::test]
async fn test_post_with_disallowed_file_is_rejected() {
    let world = TestWorld::new();

    world
        .handle(fixtures::post_created(
            12,
            &fixtures::member(1),
            "Regardez ce document",
            &["notes.pdf"],
        ))
        .await;

    assert!(world.archive.state().posts.is_empty());
    assert_eq!(world.platform.deleted_posts(), vec![Snowflake::new(12)]);

    let messages = world.platform.direct_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("n’est pas une image ou une vidéo"));
}

#[tokio::test]
async fn test_blank_content_outranks_the_file_type() {
    let world = TestWorld::new();

    world
        .handle(fixtures::post_created(13, &fixtures::member(1), "   ", &["notes.pdf"]))
        .await;

    let messages = world.platform.direct_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("du texte ainsi qu’une ou plusieurs images"));
}

#[tokio::test]
async fn test_redelivered_post_is_archived_once() {
    let world = TestWorld::new();
    let event = fixtures::post_created(14, &fixtures::member(1), "Une fois", &["a.png"]);

    world.handle(event.clone()).await;
    world.handle(event).await;

    let state = world.archive.state();
    assert_eq!(state.posts.len(), 1);
    assert_eq!(state.streaks.get(&Snowflake::new(1)).unwrap().current_streak, 1);
    // No second announcement either
    assert_eq!(world.platform.threads_created(), 1);
}

// ============================================================================
// Streak and Level Role Tests
// ============================================================================

#[tokio::test]
async fn test_second_post_same_day_keeps_streak_and_role() {
    let world = TestWorld::new();
    let author = fixtures::member(1);

    world
        .handle(fixtures::post_created(20, &author, "Premier", &["a.png"]))
        .await;
    world
        .handle(fixtures::post_created(21, &author, "Deuxième", &["b.png"]))
        .await;

    let state = world.archive.state();
    assert_eq!(state.streaks.get(&Snowflake::new(1)).unwrap().current_streak, 1);

    // Both posts get a thread, but the level is only synced once
    assert_eq!(world.platform.threads_created(), 2);
    assert_eq!(world.platform.created_roles().len(), 1);
    let messages = world.platform.thread_messages();
    assert!(messages[4].contains("ne bouge pas d’un poil"));
    assert!(messages[4].contains("déjà posté aujourd’hui"));
}

#[tokio::test]
async fn test_next_day_post_increments_and_retires_the_old_role() {
    let world = TestWorld::new();
    let yesterday = world.today() - Duration::days(1);

    let old_role = world.platform.seed_role(500, "niveau 3");
    world.platform.grant_role(old_role.id, Snowflake::new(1));
    world.archive.seed_streak(StreakRecord {
        user_id: Snowflake::new(1),
        current_streak: 3,
        max_streak: 5,
        last_post_date: yesterday,
    });

    let author = fixtures::member_with_roles(1, &[old_role.id]);
    world
        .handle(fixtures::post_created(22, &author, "Jour suivant", &["a.png"]))
        .await;

    let streak = world.archive.state().streaks[&Snowflake::new(1)];
    assert_eq!(streak.current_streak, 4);
    assert_eq!(streak.max_streak, 5);

    // niveau 4 granted, niveau 3 unassigned and deleted once memberless
    assert_eq!(world.platform.created_roles(), vec![("niveau 4".to_string(), false)]);
    let niveau_4 = role_id(&world, "niveau 4").await;
    assert_eq!(world.platform.assigned_roles(), vec![(Snowflake::new(1), niveau_4)]);
    assert_eq!(world.platform.unassigned_roles(), vec![(Snowflake::new(1), old_role.id)]);
    assert_eq!(world.platform.deleted_roles(), vec![old_role.id]);

    let messages = world.platform.thread_messages();
    assert!(messages[1].contains("maintenant de 4 jours"));
    assert!(messages[1].contains(":tada:"));
}

#[tokio::test]
async fn test_missed_day_resets_streak_but_keeps_max() {
    let world = TestWorld::new();

    world.archive.seed_streak(StreakRecord {
        user_id: Snowflake::new(1),
        current_streak: 7,
        max_streak: 12,
        last_post_date: world.today() - Duration::days(2),
    });

    world
        .handle(fixtures::post_created(23, &fixtures::member(1), "De retour", &["a.png"]))
        .await;

    let streak = world.archive.state().streaks[&Snowflake::new(1)];
    assert_eq!(streak.current_streak, 1);
    assert_eq!(streak.max_streak, 12);

    assert_eq!(world.platform.created_roles(), vec![("niveau 1".to_string(), false)]);
    let messages = world.platform.thread_messages();
    assert!(messages[1].contains("Remise à zéro"));
}

#[tokio::test]
async fn test_level_role_with_other_holders_survives_retirement() {
    let world = TestWorld::new();
    let yesterday = world.today() - Duration::days(1);

    let shared = world.platform.seed_role(500, "niveau 2");
    world.platform.grant_role(shared.id, Snowflake::new(1));
    world.platform.grant_role(shared.id, Snowflake::new(2));
    world.archive.seed_streak(StreakRecord {
        user_id: Snowflake::new(1),
        current_streak: 2,
        max_streak: 2,
        last_post_date: yesterday,
    });

    let author = fixtures::member_with_roles(1, &[shared.id]);
    world
        .handle(fixtures::post_created(24, &author, "Encore", &["a.png"]))
        .await;

    // Member 1 moved to niveau 3; member 2 still wears niveau 2
    assert_eq!(world.platform.unassigned_roles(), vec![(Snowflake::new(1), shared.id)]);
    assert!(world.platform.deleted_roles().is_empty());
}

// ============================================================================
// Edit Tests
// ============================================================================

#[tokio::test]
async fn test_edit_replaces_content_and_attachments() {
    let world = TestWorld::new();
    let author = fixtures::member(1);

    world
        .handle(fixtures::post_created(30, &author, "Avant", &["a.png"]))
        .await;
    let old_file = world.data_dir.join("attachments").join("30_a.png");
    assert!(old_file.exists());

    world
        .handle(fixtures::post_edited(30, &author, "Après *correction*", &["b.png"]))
        .await;

    let state = world.archive.state();
    let post = state.posts.get(&Snowflake::new(30)).unwrap();
    assert_eq!(post.content, "<p>Après <em>correction</em></p>\n");

    let attachments = state.attachments.get(&Snowflake::new(30)).unwrap();
    assert_eq!(attachments.len(), 1);
    assert!(attachments[0].path.ends_with("30_b.png"));

    // The displaced file is gone, the new one is on disk
    assert!(!old_file.exists(), "stale attachment file should be removed");
    assert!(world.data_dir.join("attachments").join("30_b.png").exists());
}

#[tokio::test]
async fn test_edit_keeping_a_filename_keeps_the_file() {
    let world = TestWorld::new();
    let author = fixtures::member(1);

    world
        .handle(fixtures::post_created(31, &author, "Avant", &["a.png"]))
        .await;
    world
        .handle(fixtures::post_edited(31, &author, "Après", &["a.png"]))
        .await;

    let state = world.archive.state();
    assert_eq!(state.attachments.get(&Snowflake::new(31)).unwrap().len(), 1);
    assert!(world.data_dir.join("attachments").join("31_a.png").exists());
}

#[tokio::test]
async fn test_edit_of_unarchived_post_is_ignored() {
    let world = TestWorld::new();

    world
        .handle(fixtures::post_edited(32, &fixtures::member(1), "Fantôme", &["a.png"]))
        .await;

    assert!(world.archive.state().posts.is_empty());
    assert!(world.platform.calls().is_empty());
}

#[tokio::test]
async fn test_rejected_edit_removes_the_platform_post() {
    let world = TestWorld::new();
    let author = fixtures::member(1);

    world
        .handle(fixtures::post_created(33, &author, "Avant", &["a.png"]))
        .await;
    world
        .handle(fixtures::post_edited(33, &author, "Maintenant en PDF", &["doc.pdf"]))
        .await;

    // The channel post goes and the author hears why; the archived row
    // stands until the deletion event comes back around
    assert_eq!(world.platform.deleted_posts(), vec![Snowflake::new(33)]);
    let messages = world.platform.direct_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("n’est pas une image ou une vidéo"));

    let state = world.archive.state();
    assert_eq!(state.posts.get(&Snowflake::new(33)).unwrap().content, "<p>Avant</p>\n");
}

// ============================================================================
// Deletion Tests
// ============================================================================

#[tokio::test]
async fn test_delete_removes_post_files_and_orphan_profile() {
    let world = TestWorld::new();

    world
        .handle(fixtures::post_created(40, &fixtures::member(3), "Éphémère", &["a.png"]))
        .await;
    let file = world.data_dir.join("attachments").join("40_a.png");
    assert!(file.exists());

    world.handle(fixtures::post_deleted(40)).await;

    let state = world.archive.state();
    assert!(state.posts.is_empty());
    assert!(state.attachments.is_empty());
    assert!(!state.profiles.contains_key(&Snowflake::new(3)), "orphan profile goes");
    assert!(state.streaks.contains_key(&Snowflake::new(3)), "streak survives deletion");
    assert!(!file.exists(), "attachment file should be removed");
}

#[tokio::test]
async fn test_delete_keeps_profile_while_posts_remain() {
    let world = TestWorld::new();
    let author = fixtures::member(3);

    world
        .handle(fixtures::post_created(41, &author, "Garde", &["a.png"]))
        .await;
    world
        .handle(fixtures::post_created(42, &author, "Jette", &["b.png"]))
        .await;

    world.handle(fixtures::post_deleted(42)).await;

    let state = world.archive.state();
    assert!(state.posts.contains_key(&Snowflake::new(41)));
    assert!(state.profiles.contains_key(&Snowflake::new(3)));
    assert!(world.data_dir.join("attachments").join("41_a.png").exists());
}

#[tokio::test]
async fn test_delete_of_unarchived_post_is_a_noop() {
    let world = TestWorld::new();

    world.handle(fixtures::post_deleted(43)).await;

    assert!(world.archive.state().posts.is_empty());
    assert!(world.platform.calls().is_empty());
}

// ============================================================================
// Tag Tests
// ============================================================================

#[tokio::test]
async fn test_member_reaction_becomes_a_tag() {
    let world = TestWorld::new();

    world
        .handle(fixtures::post_created(50, &fixtures::member(1), "Soudure", &["a.png"]))
        .await;
    world.handle(fixtures::reaction_added(50, 5, "\u{1F525}")).await;

    let tags = world.archive.state().tags[&Snowflake::new(50)].clone();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].emoji_key, "\u{1F525}");
    assert_eq!(tags[0].description, "fire");
    assert!(tags[0].icon_path.is_none());
}

#[tokio::test]
async fn test_reserved_and_unarchived_reactions_are_ignored() {
    let world = TestWorld::new();

    world
        .handle(fixtures::post_created(51, &fixtures::member(1), "Statut", &["a.png"]))
        .await;
    world.handle(fixtures::reaction_added(51, 5, SUCCESS_EMOJI)).await;
    world.handle(fixtures::reaction_added(999, 5, "\u{1F525}")).await;

    let state = world.archive.state();
    assert!(state.tags.get(&Snowflake::new(51)).is_none_or(Vec::is_empty));
    assert!(state.tags.get(&Snowflake::new(999)).is_none());
}

#[tokio::test]
async fn test_custom_emoji_tag_mirrors_its_icon() {
    let world = TestWorld::new();

    world
        .handle(fixtures::post_created(52, &fixtures::member(1), "Atelier", &["a.png"]))
        .await;
    world
        .handle(fixtures::reaction_added(52, 5, "<:fer_a_souder:77>"))
        .await;

    let tags = world.archive.state().tags[&Snowflake::new(52)].clone();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].emoji_key, "<:fer_a_souder:77>");
    assert_eq!(tags[0].description, "fer a souder");
    let icon = world.data_dir.join("emoji").join("77.png");
    assert_eq!(tags[0].icon_path.as_deref(), Some(icon.to_string_lossy().as_ref()));
    assert!(icon.exists(), "emoji icon should be cached on disk");
}

#[tokio::test]
async fn test_reaction_removal_deletes_the_tag_only_when_last() {
    let world = TestWorld::new();

    world
        .handle(fixtures::post_created(53, &fixtures::member(1), "Populaire", &["a.png"]))
        .await;
    world.handle(fixtures::reaction_added(53, 5, "\u{1F525}")).await;

    world.handle(fixtures::reaction_removed(53, 5, "\u{1F525}", 2)).await;
    assert_eq!(world.archive.state().tags[&Snowflake::new(53)].len(), 1);

    world.handle(fixtures::reaction_removed(53, 6, "\u{1F525}", 0)).await;
    assert!(world.archive.state().tags[&Snowflake::new(53)].is_empty());
}

#[tokio::test]
async fn test_moderator_clears_drop_tags() {
    let world = TestWorld::new();

    world
        .handle(fixtures::post_created(54, &fixtures::member(1), "Nettoyage", &["a.png"]))
        .await;
    world.handle(fixtures::reaction_added(54, 5, "\u{1F525}")).await;
    world.handle(fixtures::reaction_added(54, 6, "\u{2728}")).await;

    world.handle(fixtures::reaction_cleared_one(54, "\u{1F525}")).await;
    let tags = world.archive.state().tags[&Snowflake::new(54)].clone();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].emoji_key, "\u{2728}");

    world.handle(fixtures::reaction_cleared_all(54)).await;
    assert!(world
        .archive
        .state()
        .tags
        .get(&Snowflake::new(54))
        .is_none_or(Vec::is_empty));
}

#[tokio::test]
async fn test_keyword_reaction_tags_through_its_echo() {
    let world = TestWorld::with_rules("arduino=\u{1F916}\nraspberry=\u{1F353}");

    world
        .handle(fixtures::post_created(
            55,
            &fixtures::member(1),
            "Mon projet arduino avance",
            &["a.png"],
        ))
        .await;

    // The bot reacted, but the tag row only lands once the platform
    // echoes the reaction back
    let added = world.platform.added_reactions();
    assert!(added.contains(&SUCCESS_EMOJI.to_string()));
    assert!(added.contains(&"\u{1F916}".to_string()));
    assert!(!added.contains(&"\u{1F353}".to_string()));
    let state = world.archive.state();
    assert!(state.tags.get(&Snowflake::new(55)).is_none_or(Vec::is_empty));

    world.handle(fixtures::reaction_added(55, 900, "\u{1F916}")).await;
    let tags = world.archive.state().tags[&Snowflake::new(55)].clone();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].emoji_key, "\u{1F916}");
}

#[tokio::test]
async fn test_edit_sweeps_stale_keyword_reactions_but_not_the_marker() {
    let world = TestWorld::with_rules("arduino=\u{1F916}");
    let author = fixtures::member(1);

    world
        .handle(fixtures::post_created(56, &author, "Projet arduino", &["a.png"]))
        .await;
    world
        .handle(fixtures::post_edited(56, &author, "Projet informatique", &["a.png"]))
        .await;

    assert_eq!(world.platform.removed_reactions(), vec!["\u{1F916}".to_string()]);
}

// ============================================================================
// Failure Handling Tests
// ============================================================================

#[tokio::test]
async fn test_commit_failure_triggers_compensation() {
    let world = TestWorld::new();
    world.archive.fail_commits();

    world
        .handle(fixtures::post_created(60, &fixtures::member(1), "Perdu", &["a.png"]))
        .await;

    // Nothing archived, no files left behind
    let state = world.archive.state();
    assert!(state.posts.is_empty());
    assert!(state.streaks.is_empty());
    assert!(!world.data_dir.join("attachments").join("60_a.png").exists());

    // Marked, removed, and explained to the author
    assert!(world.platform.added_reactions().contains(&FAILURE_EMOJI.to_string()));
    assert_eq!(world.platform.deleted_posts(), vec![Snowflake::new(60)]);
    let messages = world.platform.direct_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Une erreur est survenue"));
    assert_eq!(world.platform.threads_created(), 0);
}

#[tokio::test]
async fn test_thread_failure_does_not_undo_the_archival() {
    let world = TestWorld::new();
    world.platform.fail_threads();

    world
        .handle(fixtures::post_created(61, &fixtures::member(1), "Sans fil", &["a.png"]))
        .await;

    // Archived and leveled despite the failed announcement
    let state = world.archive.state();
    assert!(state.posts.contains_key(&Snowflake::new(61)));
    assert_eq!(world.platform.created_roles().len(), 1);

    // No compensation: the post stands
    assert!(world.platform.deleted_posts().is_empty());
    assert!(world.platform.direct_messages().is_empty());
}

#[tokio::test]
async fn test_unreachable_sources_archive_without_artifacts() {
    let world = TestWorld::unreachable_sources();
    let author = fixtures::member_with_avatar(1, "https://cdn.test/avatars/1.png");

    world
        .handle(fixtures::post_created(62, &author, "Hors ligne", &["a.png"]))
        .await;

    let state = world.archive.state();
    assert!(state.posts.contains_key(&Snowflake::new(62)));
    let attachments = state.attachments.get(&Snowflake::new(62)).unwrap();
    assert_eq!(attachments.len(), 1);
    assert!(!world.data_dir.join("attachments").join("62_a.png").exists());
    assert!(state.profiles[&Snowflake::new(1)].avatar_path.is_none());
}

// ============================================================================
// Profile and Reconciliation Tests
// ============================================================================

#[tokio::test]
async fn test_avatar_is_mirrored_next_to_the_profile() {
    let world = TestWorld::new();
    let author = fixtures::member_with_avatar(6, "https://cdn.test/avatars/6.png");

    world
        .handle(fixtures::post_created(70, &author, "Portrait", &["a.png"]))
        .await;

    let avatar = world.data_dir.join("avatars").join("6.png");
    let profile = world.archive.state().profiles[&Snowflake::new(6)].clone();
    assert_eq!(profile.avatar_path.as_deref(), Some(avatar.to_string_lossy().as_ref()));
    assert!(avatar.exists());
}

#[tokio::test]
async fn test_profile_update_refreshes_archived_members_only() {
    let world = TestWorld::new();

    world
        .handle(fixtures::post_created(71, &fixtures::member(6), "Archivé", &["a.png"]))
        .await;

    let mut renamed = fixtures::member(6);
    renamed.display_name = "Nouveau Nom".to_string();
    world.handle(fixtures::profile_updated(&renamed)).await;

    let stranger = fixtures::member(7);
    world.handle(fixtures::profile_updated(&stranger)).await;

    let state = world.archive.state();
    assert_eq!(state.profiles[&Snowflake::new(6)].display_name, "Nouveau Nom");
    assert!(!state.profiles.contains_key(&Snowflake::new(7)), "no posts, no profile");
}

#[tokio::test]
async fn test_snapshot_revokes_stale_roles_and_refreshes_profiles() {
    let world = TestWorld::new();
    let today = world.today();

    // Member 8: stale streak, wears niveau 5
    let stale_role = world.platform.seed_role(500, "niveau 5");
    world.platform.grant_role(stale_role.id, Snowflake::new(8));
    world.archive.seed_streak(StreakRecord {
        user_id: Snowflake::new(8),
        current_streak: 5,
        max_streak: 5,
        last_post_date: today - Duration::days(3),
    });
    world.archive.seed_profile(UserProfile::new(
        Snowflake::new(8),
        "membre8",
        "Vieux Nom",
    ));

    // Member 9: fresh streak, keeps niveau 2
    let fresh_role = world.platform.seed_role(501, "niveau 2");
    world.platform.grant_role(fresh_role.id, Snowflake::new(9));
    world.archive.seed_streak(StreakRecord {
        user_id: Snowflake::new(9),
        current_streak: 2,
        max_streak: 2,
        last_post_date: today - Duration::days(1),
    });

    // Member 10: wears niveau 9 with no streak record at all
    let orphan_role = world.platform.seed_role(502, "niveau 9");
    world.platform.grant_role(orphan_role.id, Snowflake::new(10));

    world
        .handle(fixtures::snapshot(vec![
            fixtures::member_with_roles(8, &[stale_role.id]),
            fixtures::member_with_roles(9, &[fresh_role.id]),
            fixtures::member_with_roles(10, &[orphan_role.id]),
        ]))
        .await;

    let unassigned = world.platform.unassigned_roles();
    assert!(unassigned.contains(&(Snowflake::new(8), stale_role.id)));
    assert!(unassigned.contains(&(Snowflake::new(10), orphan_role.id)));
    assert!(!unassigned.contains(&(Snowflake::new(9), fresh_role.id)));

    let deleted = world.platform.deleted_roles();
    assert!(deleted.contains(&stale_role.id));
    assert!(deleted.contains(&orphan_role.id));
    assert!(!deleted.contains(&fresh_role.id));

    // The startup pass also refreshed the known profile
    let state = world.archive.state();
    assert_eq!(state.profiles[&Snowflake::new(8)].display_name, "Membre 8");
    assert!(!state.profiles.contains_key(&Snowflake::new(9)));
}

#[tokio::test]
async fn test_daily_run_revokes_without_refreshing_profiles() {
    let world = TestWorld::new();

    let role = world.platform.seed_role(600, "niveau 3");
    world.platform.grant_role(role.id, Snowflake::new(11));
    world.archive.seed_streak(StreakRecord {
        user_id: Snowflake::new(11),
        current_streak: 3,
        max_streak: 3,
        last_post_date: world.today() - Duration::days(4),
    });
    world.archive.seed_profile(UserProfile::new(
        Snowflake::new(11),
        "membre11",
        "Vieux Nom",
    ));
    world
        .platform
        .seed_members(vec![fixtures::member_with_roles(11, &[role.id])]);

    let summary = ReconcileService::new(&world.ctx).run().await.unwrap();

    assert_eq!(summary.members_seen, 1);
    assert_eq!(summary.roles_revoked, 1);
    assert_eq!(summary.failures, 0);
    assert_eq!(world.platform.unassigned_roles(), vec![(Snowflake::new(11), role.id)]);

    // The daily pass never touches profiles
    let state = world.archive.state();
    assert_eq!(state.profiles[&Snowflake::new(11)].display_name, "Vieux Nom");
}
