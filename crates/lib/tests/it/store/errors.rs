use keysync::{
    Error, ErrorKind, FetchOptions, SaveOptions, Session,
    codec::{self, KdfParams},
    source::Source,
};

use crate::helpers::*;

/// Saves one record and returns the raw blob.
async fn saved_blob() -> Vec<u8> {
    let (source, store) = test_store();
    let (_, mut coll) = test_collection("default");
    coll.add([record_at("a", "mail", 1_000)]).unwrap();
    store
        .save(&mut coll, &unlocked(), SaveOptions::default())
        .await
        .unwrap();
    source.raw("coll_default").await.unwrap()
}

#[tokio::test]
async fn wrong_password_never_yields_records() {
    let blob = saved_blob().await;
    let (source, store) = test_store();
    source.set("coll_default", &blob).await.unwrap();

    for password in ["", "Correct horse battery staple", "wrong"] {
        let (_, mut coll) = test_collection("default");
        let err = store
            .fetch(&mut coll, &Session::unlock(password), FetchOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailed, "{password:?}");
        assert!(coll.is_empty());
    }
}

#[tokio::test]
async fn flipped_ciphertext_byte_fails_authentication() {
    let blob = saved_blob().await;
    let mut envelope: serde_json::Value = serde_json::from_slice(&blob).unwrap();
    let ciphertext = envelope["ciphertext"].as_str().unwrap().to_string();
    // Swap one base64 character for another valid one
    let mut chars: Vec<char> = ciphertext.chars().collect();
    chars[4] = if chars[4] == 'A' { 'B' } else { 'A' };
    envelope["ciphertext"] = chars.into_iter().collect::<String>().into();

    let (source, store) = test_store();
    source
        .set("coll_default", &serde_json::to_vec(&envelope).unwrap())
        .await
        .unwrap();
    let (_, mut coll) = test_collection("default");
    let err = store
        .fetch(&mut coll, &unlocked(), FetchOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
}

#[tokio::test]
async fn garbage_blob_is_corrupted() {
    let (source, store) = test_store();
    source
        .set("coll_default", b"definitely not an envelope")
        .await
        .unwrap();

    let (_, mut coll) = test_collection("default");
    let err = store
        .fetch(&mut coll, &unlocked(), FetchOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataCorrupted);
    assert!(matches!(err, Error::Codec(_)));
}

#[tokio::test]
async fn decrypted_non_records_are_corrupted() {
    let (source, store) = test_store();
    let blob = codec::encrypt(PASSWORD, br#"[{"name": 42}]"#, KdfParams::fast()).unwrap();
    source.set("coll_default", &blob).await.unwrap();

    let (_, mut coll) = test_collection("default");
    let err = store
        .fetch(&mut coll, &unlocked(), FetchOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataCorrupted);
    assert!(err.is_corrupted());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn offline_source_is_retryable() {
    let (source, store) = test_store();
    let (_, mut coll) = test_collection("default");
    source.set_offline(true);

    let err = store
        .save(&mut coll, &unlocked(), SaveOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
    assert!(err.is_retryable());

    let err = store
        .fetch(&mut coll, &unlocked(), FetchOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_unavailable());

    let err = store
        .exists(&coll, FetchOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.module(), "source");
}

#[tokio::test]
async fn absent_collection_is_not_found() {
    let (_, store) = test_store();
    let (_, mut coll) = test_collection("never-saved");
    let err = store
        .fetch(&mut coll, &unlocked(), FetchOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(!store.exists(&coll, FetchOptions::default()).await.unwrap());
}
