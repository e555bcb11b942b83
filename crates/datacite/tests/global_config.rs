//! Process-wide configuration as seen by collection URLs.
//!
//! Kept in its own test binary: it mutates the global `api_url`, which the
//! unit tests rely on being the default.

use datacite::{config, set_api_url, update_config, DataCiteClient, DataCiteConfig};

#[test]
fn test_api_url_is_read_when_urls_are_built() {
    let client = DataCiteClient::new().unwrap();
    let mut dois = client.dois();
    dois.filter([("prefix", "10.5438")]);
    let built = dois.url();
    assert_eq!(built, "https://api.datacite.org/dois?prefix=10.5438");

    set_api_url("https://api.test.datacite.org/").unwrap();

    assert_eq!(built, "https://api.datacite.org/dois?prefix=10.5438");
    assert_eq!(dois.url(), "https://api.test.datacite.org/dois?prefix=10.5438");
    assert_eq!(
        client.providers().url(),
        "https://api.test.datacite.org/providers"
    );

    let pinned = DataCiteClient::builder()
        .with_api_url("http://localhost:3000")
        .build()
        .unwrap();
    assert_eq!(pinned.events().url(), "http://localhost:3000/events");

    update_config(|config| *config = DataCiteConfig::default()).unwrap();
    assert_eq!(config(), DataCiteConfig::default());
    assert_eq!(client.dois().url(), "https://api.datacite.org/dois");
}
