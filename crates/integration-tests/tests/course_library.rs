use cb_core::{AppError, BlobKind, BlobStore, Collection, Identity, MaterialKey, MaterialKind, NewMaterial, Role};
use integration_tests::Harness;

fn alice() -> Identity {
    Identity { id: "alice".into(), role: Role::Teacher }
}

#[tokio::test]
async fn upload_flow_records_blob_keys() {
    let h = Harness::new();
    let file = h.blobs.save_upload("darslik.mp4", b"video".to_vec(), BlobKind::Material).await.unwrap();
    let thumb = h.blobs.save_upload("muqova.png", b"png".to_vec(), BlobKind::Thumbnail).await.unwrap();

    let entry = h
        .library
        .add_material(
            &alice(),
            NewMaterial {
                course: "Fizika".into(),
                title: "1-dars: Harakat".into(),
                kind: MaterialKind::Video,
                file_ref: file.clone(),
                image_ref: Some(thumb.clone()),
            },
        )
        .await
        .unwrap();

    assert!(h.blobs.get_url(&entry.file_ref).await.unwrap().is_some());
    assert_eq!(entry.image_ref.as_deref(), Some(thumb.as_str()));

    let text = std::fs::read_to_string(h.store.path_for(Collection::Courses)).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    let video = &doc["Fizika"]["videos"][0];
    assert_eq!(doc["Fizika"]["teacher"], "alice");
    assert_eq!(video["file"], file.as_str());
    assert_eq!(video["image"], thumb.as_str());
    assert_eq!(video["likes"], 0);
    assert_eq!(video["type"], "video");
    assert_eq!(video["title"], "1-dars: Harakat");
}

#[tokio::test]
async fn reload_reproduces_library() {
    let h = Harness::new();
    for title in ["Введение", "第二课", "Lesson 3"] {
        h.library
            .add_material(
                &alice(),
                NewMaterial {
                    course: "Tillar".into(),
                    title: title.into(),
                    kind: MaterialKind::Document,
                    file_ref: format!("{title}.pdf"),
                    image_ref: None,
                },
            )
            .await
            .unwrap();
    }
    let sam = Identity { id: "sam".into(), role: Role::Student };
    h.library.like_material(&sam, "Tillar", MaterialKey::Index(1)).await.unwrap();

    let before = h.library.list_courses().await.unwrap();
    let (_, library) = h.reopen();
    assert_eq!(library.list_courses().await.unwrap(), before);
}

#[tokio::test]
async fn legacy_courses_file_is_readable() {
    let h = Harness::new();
    std::fs::create_dir_all(h.dir.path().join("data")).unwrap();
    std::fs::write(
        h.store.path_for(Collection::Courses),
        r#"{
  "Math101": {
    "videos": [
      {
        "title": "Lecture1",
        "type": "video",
        "file": "f1.mp4",
        "likes": 4,
        "added": "2025-03-01T10:00:00.123456"
      }
    ],
    "teacher": "alice"
  }
}"#,
    )
    .unwrap();

    let sam = Identity { id: "sam".into(), role: Role::Student };
    assert_eq!(h.library.like_material(&sam, "Math101", MaterialKey::Index(0)).await.unwrap(), 5);

    // the id assigned on first read is now persisted
    let math = h.library.course("Math101").await.unwrap().unwrap();
    let id = math.materials[0].id;
    assert_eq!(h.library.like_material(&sam, "Math101", MaterialKey::Id(id)).await.unwrap(), 6);
}

#[tokio::test]
async fn listed_legacy_ids_can_be_liked() {
    let h = Harness::new();
    std::fs::create_dir_all(h.dir.path().join("data")).unwrap();
    std::fs::write(
        h.store.path_for(Collection::Courses),
        r#"{"Art": {"teacher": "alice", "videos": [
            {"title": "Intro", "type": "video", "file": "a.mp4", "likes": 0, "added": "2025-03-01T10:00:00.5"},
            {"title": "Notes", "type": "document", "file": "b.pdf", "likes": 2, "added": "2025-03-02T09:15:00"}
        ]}}"#,
    )
    .unwrap();

    let first = h.library.list_courses().await.unwrap();
    let second = h.library.list_courses().await.unwrap();
    assert_eq!(first, second);

    let notes = first["Art"].materials[1].id;
    let sam = Identity { id: "sam".into(), role: Role::Student };
    assert_eq!(h.library.like_material(&sam, "Art", MaterialKey::Id(notes)).await.unwrap(), 3);

    // liking rewrites the file; the same id must still point at the same material
    let after = h.library.course("Art").await.unwrap().unwrap();
    assert_eq!(after.materials[1].id, notes);
    assert_eq!(after.materials[1].like_count, 3);
}

#[tokio::test]
async fn forbidden_upload_writes_nothing() {
    let h = Harness::new();
    let sam = Identity { id: "sam".into(), role: Role::Student };
    let err = h
        .library
        .add_material(
            &sam,
            NewMaterial {
                course: "Math101".into(),
                title: "x".into(),
                kind: MaterialKind::Video,
                file_ref: "x.mp4".into(),
                image_ref: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert!(!h.store.path_for(Collection::Courses).exists());
}
