mod common;

use common::{fixture_data, FIXTURE_JSON};
use jusho::{
    AddressResolver, Error, FileSource, LoadError, ResolveOptions, StaticSource,
};

#[tokio::test]
async fn test_resolver_loads_on_first_call() {
    let resolver = AddressResolver::new(StaticSource::new(fixture_data()));
    assert!(!resolver.is_loaded());

    let res = resolver
        .resolve("東京都江東区豊洲1丁目2-27", &ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(res.town.as_deref(), Some("豊洲一丁目"));
    assert_eq!(res.level, 8);
    assert!(resolver.is_loaded());
}

#[tokio::test]
async fn test_concurrent_resolutions_share_dictionary() {
    let resolver = AddressResolver::new(StaticSource::new(fixture_data()));
    let options = ResolveOptions::default();

    let addresses = ["石川県七尾市藤橋町亥45番地1", "東京都文京区小石川1", "あいうえお"];
    let results = futures::future::join_all(
        addresses.iter().map(|a| resolver.resolve(a, &options)),
    )
    .await;

    let levels: Vec<u8> = results.into_iter().map(|r| r.unwrap().level).collect();
    assert_eq!(levels, vec![8, 3, 0]);
}

#[tokio::test]
async fn test_batch_preserves_order_and_cap() {
    let resolver = AddressResolver::new(StaticSource::new(fixture_data()));
    let addresses = vec![
        "神奈川県横浜市港北区大豆戸町１７番地１１".to_string(),
        "北海道滝川市一の坂町西".to_string(),
    ];

    let results = resolver
        .resolve_batch(addresses, ResolveOptions::with_level(3))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].other, "17-11");
    assert_eq!(results[0].level, 3);
    assert_eq!(results[1].other, "一の坂町西");
    assert_eq!(results[1].level, 2);
}

#[tokio::test]
async fn test_missing_file_is_retryable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dictionary.json");
    let resolver = AddressResolver::new(FileSource::new(&path));

    let err = resolver
        .resolve("東京都江東区", &ResolveOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DictionaryUnavailable(_)));
    assert!(matches!(err.load_error(), Some(LoadError::Io(_))));
    assert!(!resolver.is_loaded());

    std::fs::write(&path, FIXTURE_JSON).unwrap();

    let res = resolver
        .resolve("東京都江東区", &ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(res.city.as_deref(), Some("江東区"));
    assert_eq!(res.level, 2);
}
