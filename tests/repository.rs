use chrono::{Duration, Utc};
use tempfile::TempDir;
use teadiary_lib::{
    db::{Database, NewTea, TeaItem},
    gateway::{SessionGateway, TeaLookup},
    timer::state::SessionRequest,
};

fn open_db() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let db = Database::new(dir.path().join("teadiary.sqlite3")).unwrap();
    (dir, db)
}

async fn add_tea(db: &Database, name: &str, tea_type: &str, origin: &str, grams: u32) -> TeaItem {
    let tea = TeaItem::create(NewTea {
        name: name.into(),
        tea_type: tea_type.into(),
        color: None,
        year: 2020,
        origin: origin.into(),
        total_grams: grams,
    })
    .unwrap();
    db.insert_tea(&tea).await.unwrap();
    tea
}

fn request(tea_id: &str, grams: u32) -> SessionRequest {
    SessionRequest {
        tea_id: tea_id.to_string(),
        duration_secs: 1_200,
        steeps: 6,
        grams,
        volume_ml: 120,
        rating: 4,
    }
}

#[tokio::test]
async fn recording_a_session_draws_from_the_stash() {
    let (_dir, db) = open_db();
    let tea = add_tea(&db, "Bing Dao", "Sheng", "Lincang", 20).await;

    let record = db.record_session(request(&tea.id, 7)).await.unwrap();
    assert_eq!(record.tea_id.as_deref(), Some(tea.id.as_str()));
    assert_eq!(record.steeps, 6);

    let after = db.get_tea(&tea.id).await.unwrap().unwrap();
    assert_eq!(after.remaining_grams, 13);
    assert_eq!(after.total_grams, 20);

    // Remaining weight never goes below zero.
    db.record_session(request(&tea.id, 50)).await.unwrap();
    let after = db.get_tea(&tea.id).await.unwrap().unwrap();
    assert_eq!(after.remaining_grams, 0);

    let history = db.list_sessions().await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].tea_name.as_deref(), Some("Bing Dao"));
}

#[tokio::test]
async fn unknown_tea_writes_nothing() {
    let (_dir, db) = open_db();
    add_tea(&db, "Dan Cong", "Oolong", "Phoenix", 50).await;

    let err = db.record_session(request("missing", 7)).await.unwrap_err();
    assert!(err.to_string().contains("not found"));
    assert!(db.list_sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_rating_is_rejected() {
    let (_dir, db) = open_db();
    let tea = add_tea(&db, "Dan Cong", "Oolong", "Phoenix", 50).await;

    let mut bad = request(&tea.id, 7);
    bad.rating = 0;
    assert!(db.record_session(bad).await.is_err());
    assert_eq!(db.get_tea(&tea.id).await.unwrap().unwrap().remaining_grams, 50);
}

#[tokio::test]
async fn deleting_a_tea_keeps_its_history() {
    let (_dir, db) = open_db();
    let tea = add_tea(&db, "Liu Bao", "Dark", "Wuzhou", 100).await;
    db.record_session(request(&tea.id, 8)).await.unwrap();

    db.delete_tea(&tea.id).await.unwrap();
    assert!(db.get_tea(&tea.id).await.unwrap().is_none());
    assert!(db.delete_tea(&tea.id).await.is_err());

    let history = db.list_sessions().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].session.tea_id, None);
    assert_eq!(history[0].tea_name, None);
}

#[tokio::test]
async fn search_matches_name_type_and_origin() {
    let (_dir, db) = open_db();
    add_tea(&db, "Yiwu Spring", "Sheng", "Xishuangbanna", 200).await;
    add_tea(&db, "Tie Guan Yin", "Oolong", "Anxi", 100).await;
    add_tea(&db, "anji bai cha", "Green", "Zhejiang", 50).await;

    let names = |teas: Vec<TeaItem>| teas.into_iter().map(|t| t.name).collect::<Vec<_>>();

    assert_eq!(
        names(db.list_teas().await.unwrap()),
        vec!["anji bai cha", "Tie Guan Yin", "Yiwu Spring"]
    );
    assert_eq!(names(db.search_teas("OOLONG").await.unwrap()), vec!["Tie Guan Yin"]);
    assert_eq!(names(db.search_teas("an").await.unwrap()).len(), 3);
    assert_eq!(names(db.search_teas("  ").await.unwrap()).len(), 3);
    assert!(db.search_teas("matcha").await.unwrap().is_empty());
}

#[tokio::test]
async fn history_pages_and_time_window() {
    let (_dir, db) = open_db();
    let tea = add_tea(&db, "Shou Mei", "White", "Fuding", 300).await;
    for _ in 0..3 {
        db.record_session(request(&tea.id, 5)).await.unwrap();
    }

    let page = db.list_sessions_paginated(2, 0).await.unwrap();
    assert_eq!(page.len(), 2);
    let rest = db.list_sessions_paginated(2, 2).await.unwrap();
    assert_eq!(rest.len(), 1);

    let recent = db.list_sessions_since(Utc::now() - Duration::hours(1)).await.unwrap();
    assert_eq!(recent.len(), 3);
    let future = db.list_sessions_since(Utc::now() + Duration::hours(1)).await.unwrap();
    assert!(future.is_empty());

    db.delete_session(&recent[0].id).await.unwrap();
    assert_eq!(db.list_sessions().await.unwrap().len(), 2);
    // Deleting history does not refill the stash.
    assert_eq!(db.get_tea(&tea.id).await.unwrap().unwrap().remaining_grams, 285);
}

#[tokio::test]
async fn schema_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("teadiary.sqlite3");

    let tea_id = {
        let db = Database::new(path.clone()).unwrap();
        add_tea(&db, "Keemun", "Red", "Qimen", 80).await.id
    };

    let db = Database::new(path).unwrap();
    assert_eq!(db.get_tea(&tea_id).await.unwrap().unwrap().name, "Keemun");
}
