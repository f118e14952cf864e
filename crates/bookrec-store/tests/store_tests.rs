use std::fs;

use bookrec_core::config::DataSettings;
use bookrec_core::Error;
use bookrec_store::{DataLineage, DataTier, MetadataStore};
use tempfile::TempDir;

const HEADER: &str = "isbn13,title,authors,description,categories,simple_category,dominant_tone,joy,sadness,average_rating,ratings_count,thumbnail";

#[test]
fn load_csv_joins_on_normalized_identifier() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("books.csv");
    fs::write(
        &path,
        format!(
            "{HEADER}\n\
             978-0-13-468599-1,Book One,Author A,A great fiction book.,Fiction,Fiction,joy,0.8,0.1,4.5,100,http://img1.jpg\n\
             9876543210987,Book Two,Author B,A sad non-fiction book.,Biography,Non-Fiction,sadness,0.1,0.6,3.0,50,http://img2.jpg\n"
        ),
    )
    .unwrap();

    let (store, report) = MetadataStore::load_csv(&path).expect("load");
    assert_eq!(report.loaded, 2);
    let one = store.lookup(9_780_134_685_991).expect("book one");
    assert_eq!(one.title, "Book One");
    assert_eq!(one.average_rating, 4.5);
    assert_eq!(one.ratings_count, 100);
    assert_eq!(one.tone_probability, Some(0.8));
    let two = store.lookup(9_876_543_210_987).expect("book two");
    assert_eq!(two.category(), Some("Non-Fiction"));
}

#[test]
fn bad_rows_are_counted_not_fatal() {
    let data = format!(
        "{HEADER}\n\
         1111111111111,Good,A,d,Fiction,Fiction,joy,0.5,0.1,4.0,10,\n\
         not-an-isbn,No Key,A,d,Fiction,Fiction,joy,0.5,0.1,4.0,10,\n\
         2222222222222,Too,Few,Fields\n\
         1111111111111,Duplicate,A,d,Fiction,Fiction,joy,0.5,0.1,1.0,1,\n\
         3333333333333,Unrated,A,d,Fiction,,,,,,,\n"
    );
    let (store, report) = MetadataStore::from_reader(data.as_bytes()).expect("load");
    assert_eq!(report.rows, 5);
    assert_eq!(report.malformed, 1);
    assert_eq!(report.rejected, 1);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.loaded, 2);
    assert_eq!(store.lookup(1_111_111_111_111).map(|b| b.title.as_str()), Some("Good"));
    let unrated = store.lookup(3_333_333_333_333).expect("unrated");
    assert_eq!(unrated.average_rating, 0.0);
    assert_eq!(unrated.ratings_count, 0);
    assert_eq!(unrated.category(), Some("Fiction"));
}

#[test]
fn missing_file_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = MetadataStore::load_csv(&tmp.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn opening_without_a_table_is_a_startup_failure() {
    let tmp = TempDir::new().unwrap();
    let err = MetadataStore::open(&settings_in(&tmp)).unwrap_err();
    assert!(matches!(err, Error::Init(_)));
    assert!(err.is_fatal());

    let mut settings = settings_in(&tmp);
    settings.path = Some("gone/books.csv".into());
    let err = MetadataStore::open(&settings).unwrap_err();
    assert!(matches!(err, Error::Init(ref m) if m.contains("gone")));
}

#[test]
fn opening_a_table_without_identifiers_is_a_startup_failure() {
    let tmp = TempDir::new().unwrap();
    let mut settings = settings_in(&tmp);
    fs::write(tmp.path().join("books.csv"), "title,authors
A,B
").unwrap();
    settings.path = Some("books.csv".into());
    let err = MetadataStore::open(&settings).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn open_reports_the_chosen_snapshot() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    touch(&tmp, &settings.enriched_path);
    let (store, lineage, report) = MetadataStore::open(&settings).expect("open");
    assert_eq!(lineage.tier, DataTier::Enriched);
    assert_eq!(report.loaded, 1);
    assert!(store.contains(1));
}

fn settings_in(tmp: &TempDir) -> DataSettings {
    DataSettings { base_dir: Some(tmp.path().to_string_lossy().to_string()), ..DataSettings::default() }
}

fn touch(tmp: &TempDir, rel: &str) {
    let p = tmp.path().join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, "isbn13\n1\n").unwrap();
}

#[test]
fn lineage_prefers_most_processed_table() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    touch(&tmp, &settings.clean_path);
    assert_eq!(DataLineage::resolve(&settings).unwrap().tier, DataTier::Clean);
    touch(&tmp, &settings.enriched_path);
    assert_eq!(DataLineage::resolve(&settings).unwrap().tier, DataTier::Enriched);
    touch(&tmp, &settings.toned_path);
    let chosen = DataLineage::resolve(&settings).unwrap();
    assert_eq!(chosen.tier, DataTier::Toned);
    assert_eq!(chosen.path, tmp.path().join(&settings.toned_path));
}

#[test]
fn explicit_path_overrides_tiers() {
    let tmp = TempDir::new().unwrap();
    let mut settings = settings_in(&tmp);
    touch(&tmp, &settings.toned_path);
    touch(&tmp, "custom/books.csv");
    settings.path = Some("custom/books.csv".into());
    let chosen = DataLineage::resolve(&settings).unwrap();
    assert_eq!(chosen.tier, DataTier::Explicit);
}

#[test]
fn no_table_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = DataLineage::resolve(&settings_in(&tmp)).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
