//! End-to-end flow: catalog lookup → draft → save → list → invoice → delete.

use chrono::NaiveDate;

use rohrwerk::{
    Catalog, Database, Draft, InvoiceRenderer, JobForm, JobListFilter, JobStore,
};

fn test_store() -> JobStore {
    JobStore::new(Database::open_in_memory().expect("Failed to create test database"))
}

/// Writes a small supplier catalog export to disk and opens it read-only.
fn seeded_catalog(dir: &std::path::Path) -> Catalog {
    let path = dir.join("catalog.db");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE BR_Bauhandel (
            \"ArtikelNr\" TEXT,
            \"AFNr\" TEXT,
            \"AF Bezeichnung\" TEXT,
            \"Preis\" REAL,
            \"Beschreibung\" TEXT
        );
        INSERT INTO BR_Bauhandel VALUES
            ('100234', '01', 'Chrom', 45.50, 'Eckventil 1/2\"'),
            ('100234', '02', 'Messing', 39.90, 'Eckventil 1/2\"');",
    )
    .unwrap();
    drop(conn);

    Catalog::open(&path).unwrap()
}

fn sample_form() -> JobForm {
    JobForm {
        client_name: "A. Muster".to_string(),
        client_address: "Musterstrasse 1\n8000 Zürich".to_string(),
        job_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        notes: "Kitchen sink repair".to_string(),
    }
}

fn extract_all_text(bytes: &[u8]) -> String {
    let doc = lopdf::Document::load_mem(bytes).unwrap();
    let mut text = String::new();
    for (page_num, _) in doc.get_pages() {
        text.push_str(&doc.extract_text(&[page_num]).unwrap());
    }
    text
}

#[test]
fn full_job_lifecycle() {
    let store = test_store();

    // Build the draft: one manual part, one block of labor.
    let mut draft = Draft::new();
    draft.add_manual_item("Pipe repair", 50.0, 2.0).unwrap();
    draft.add_work_item("Labor", 80.0, 1.5).unwrap();
    assert_eq!(draft.total(), 220.0);

    // Save clears the draft and persists atomically.
    let job_id = draft.save(&store, &sample_form()).unwrap();
    assert!(draft.is_empty());

    // Listing returns one row with structured item lines and the total.
    let summaries = store.list_jobs(&JobListFilter::default()).unwrap();
    assert_eq!(summaries.len(), 1);
    let summary = &summaries[0];
    assert_eq!(summary.job.job_id, job_id);
    assert_eq!(summary.job.total_amount, 220.0);
    assert_eq!(summary.items.len(), 2);

    // The invoice shows the items and the stored total.
    let (job, items) = store.get_job_details(&job_id).unwrap().unwrap();
    let renderer = InvoiceRenderer::default();
    let bytes = renderer.render(&[(job, items)]).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let text = extract_all_text(&bytes);
    assert!(text.contains("A. Muster"));
    assert!(text.contains("Pipe repair"));
    assert!(text.contains("Labor"));
    assert!(text.contains("CHF 220.00"));

    // Delete removes job and items; everything reports it gone.
    assert!(store.delete_job(&job_id).unwrap());
    assert!(store.get_job_details(&job_id).unwrap().is_none());
    assert!(store
        .list_jobs(&JobListFilter {
            search: Some(job_id.clone()),
            ..Default::default()
        })
        .unwrap()
        .is_empty());

    // A second delete is a benign no-op.
    assert!(!store.delete_job(&job_id).unwrap());
}

#[test]
fn catalog_item_flows_into_invoice() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = seeded_catalog(dir.path());
    let store = test_store();

    // Lookup: pick a variant, fetch the full row.
    let variants = catalog.search("100234").unwrap();
    assert_eq!(variants.len(), 2);
    let entry = catalog
        .fetch("100234", &variants[1].sub_no)
        .unwrap()
        .unwrap();
    assert_eq!(entry.price, 39.90);

    let mut draft = Draft::new();
    draft.add_catalog_item(entry, 2.0).unwrap();
    assert_eq!(draft.total(), 79.80);

    let job_id = draft.save(&store, &sample_form()).unwrap();
    let (job, items) = store.get_job_details(&job_id).unwrap().unwrap();

    // The catalog metadata is embedded in the item description.
    assert_eq!(items.len(), 1);
    assert!(items[0].description.contains("AFNr: 02 - Messing"));

    let bytes = InvoiceRenderer::default().render(&[(job, items)]).unwrap();
    let text = extract_all_text(&bytes);
    assert!(text.contains("AFNr: 02 - Messing"));
    assert!(text.contains("CHF 79.80"));
}

#[test]
fn list_filters_combine() {
    let store = test_store();

    let mut draft = Draft::new();
    draft.add_manual_item("Valve", 30.0, 1.0).unwrap();
    let mut form = sample_form();
    form.job_date = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
    let january_id = draft.save(&store, &form).unwrap();

    draft.add_manual_item("Siphon", 25.0, 1.0).unwrap();
    let mut form = sample_form();
    form.client_name = "B. Beispiel".to_string();
    form.job_date = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
    draft.save(&store, &form).unwrap();

    // Date range, inclusive bounds.
    let summaries = store
        .list_jobs(&JobListFilter {
            date_from: Some(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()),
            date_to: Some(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()),
            search: None,
        })
        .unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].job.job_id, january_id);

    // Search by client-name substring, case-insensitively.
    let summaries = store
        .list_jobs(&JobListFilter {
            search: Some("beispiel".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].job.client_name, "B. Beispiel");

    // Empty filter returns everything, newest job date first.
    let summaries = store.list_jobs(&JobListFilter::default()).unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].job.client_name, "B. Beispiel");
}

#[test]
fn multi_job_invoice_concatenates_in_input_order() {
    let store = test_store();
    let mut draft = Draft::new();

    draft.add_manual_item("Valve", 30.0, 1.0).unwrap();
    let first = draft.save(&store, &sample_form()).unwrap();

    draft.add_work_item("Install", 80.0, 2.0).unwrap();
    let second = draft.save(&store, &sample_form()).unwrap();

    let a = store.get_job_details(&first).unwrap().unwrap();
    let b = store.get_job_details(&second).unwrap().unwrap();

    let bytes = InvoiceRenderer::default().render(&[a, b]).unwrap();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    // One fresh page per job.
    assert_eq!(doc.get_pages().len(), 2);

    let text = extract_all_text(&bytes);
    let first_pos = text.find(&first).unwrap();
    let second_pos = text.find(&second).unwrap();
    assert!(first_pos < second_pos);
}

#[test]
fn persisted_total_matches_draft_total() {
    let store = test_store();
    let mut draft = Draft::new();
    draft.add_manual_item("Pipe repair", 50.0, 2.0).unwrap();
    draft.add_work_item("Labor", 80.0, 1.5).unwrap();

    let expected = draft.total();
    let job_id = draft.save(&store, &sample_form()).unwrap();

    let (job, items) = store.get_job_details(&job_id).unwrap().unwrap();
    let item_sum: f64 = items.iter().map(|i| i.line_total()).sum();
    assert_eq!(job.total_amount, expected);
    assert_eq!(job.total_amount, item_sum);
}
