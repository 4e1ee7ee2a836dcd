//! Remote Backend Tests
//!
//! Tests verify:
//! - Pagination is followed until the continuation token runs out
//! - Full paths decode into namespaces when listing
//! - Create never overwrites; update overwrites
//! - Complete updates of missing keys upsert (remote-specific behavior)
//! - The secure flag maps to the SecureString value type and back
//! - A failing page fails the whole listing
//! - Partial updates do not resurrect or clobber entries changed after the read

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use paramstore::backend::{Backend, BackendKind, RemoteBackend};
use paramstore::service::{
    ParameterPage, ParameterService, PathQuery, PathStore, PutParameter, RemoteParameter,
};
use paramstore::{NewParameter, ParameterType, ParameterUpdate, StoreError};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_remote(page_size: u32) -> (Arc<PathStore>, RemoteBackend<Arc<PathStore>>) {
    let store = Arc::new(PathStore::new());
    let backend = RemoteBackend::with_page_size(Arc::clone(&store), page_size);
    (store, backend)
}

/// Service that fails every path query after the first `ok_pages`
struct FlakyService {
    inner: PathStore,
    ok_pages: usize,
    calls: AtomicUsize,
}

impl ParameterService for FlakyService {
    fn get_parameters_by_path(&self, query: &PathQuery) -> paramstore::Result<ParameterPage> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.ok_pages {
            return Err(StoreError::BackendUnavailable("connection reset".to_string()));
        }
        self.inner.get_parameters_by_path(query)
    }

    fn get_parameter(&self, name: &str) -> paramstore::Result<Option<RemoteParameter>> {
        self.inner.get_parameter(name)
    }

    fn put_parameter(&self, request: &PutParameter) -> paramstore::Result<u64> {
        self.inner.put_parameter(request)
    }

    fn delete_parameter(&self, name: &str) -> paramstore::Result<()> {
        self.inner.delete_parameter(name)
    }
}

/// Service that counts path queries
struct CountingService {
    inner: PathStore,
    queries: AtomicUsize,
}

impl ParameterService for CountingService {
    fn get_parameters_by_path(&self, query: &PathQuery) -> paramstore::Result<ParameterPage> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.get_parameters_by_path(query)
    }

    fn get_parameter(&self, name: &str) -> paramstore::Result<Option<RemoteParameter>> {
        self.inner.get_parameter(name)
    }

    fn put_parameter(&self, request: &PutParameter) -> paramstore::Result<u64> {
        self.inner.put_parameter(request)
    }

    fn delete_parameter(&self, name: &str) -> paramstore::Result<()> {
        self.inner.delete_parameter(name)
    }
}

/// What happens to the read key between a partial update's read and write
#[derive(Clone, Copy)]
enum Interference {
    Delete,
    Overwrite,
}

/// Service that changes a key right after handing it out
struct InterferingService {
    inner: PathStore,
    interference: Interference,
}

impl ParameterService for InterferingService {
    fn get_parameters_by_path(&self, query: &PathQuery) -> paramstore::Result<ParameterPage> {
        self.inner.get_parameters_by_path(query)
    }

    fn get_parameter(&self, name: &str) -> paramstore::Result<Option<RemoteParameter>> {
        let found = self.inner.get_parameter(name)?;
        if let Some(current) = &found {
            match self.interference {
                Interference::Delete => self.inner.delete_parameter(name)?,
                Interference::Overwrite => {
                    self.inner.put_parameter(&PutParameter {
                        name: name.to_string(),
                        value: "concurrent".to_string(),
                        parameter_type: current.parameter_type,
                        overwrite: true,
                        expected_version: None,
                    })?;
                }
            }
        }
        Ok(found)
    }

    fn put_parameter(&self, request: &PutParameter) -> paramstore::Result<u64> {
        self.inner.put_parameter(request)
    }

    fn delete_parameter(&self, name: &str) -> paramstore::Result<()> {
        self.inner.delete_parameter(name)
    }
}

fn interfering_backend(interference: Interference) -> RemoteBackend<InterferingService> {
    let backend = RemoteBackend::new(InterferingService {
        inner: PathStore::new(),
        interference,
    });
    backend.create("ns", NewParameter::secure("KEY", "old")).unwrap();
    backend
}

// =============================================================================
// Create Tests
// =============================================================================

#[test]
fn test_create_writes_full_path() {
    let (store, backend) = setup_remote(10);

    let created = backend
        .create("ortelius/dev", NewParameter::plain("PORT", "3001"))
        .unwrap();
    assert_eq!(created.version, 1);
    assert_eq!(backend.kind(), BackendKind::Remote);

    let stored = store.get_parameter("/ortelius/dev/PORT").unwrap().unwrap();
    assert_eq!(stored.value, "3001");
    assert_eq!(stored.parameter_type, ParameterType::String);
}

#[test]
fn test_create_existing_fails_without_overwriting() {
    let (store, backend) = setup_remote(10);
    backend.create("ns", NewParameter::plain("A", "1")).unwrap();

    let result = backend.create("ns", NewParameter::plain("A", "2"));
    assert!(matches!(result, Err(StoreError::AlreadyExists(_))));

    let stored = store.get_parameter("/ns/A").unwrap().unwrap();
    assert_eq!(stored.value, "1");
    assert_eq!(stored.version, 1);
}

#[test]
fn test_secure_create_uses_secure_type() {
    let (store, backend) = setup_remote(10);
    backend.create("ns", NewParameter::secure("KEY", "s3cr3t")).unwrap();

    let stored = store.get_parameter("/ns/KEY").unwrap().unwrap();
    assert_eq!(stored.parameter_type, ParameterType::SecureString);

    let listed = backend.list_namespace("ns").unwrap();
    assert!(listed[0].is_secure);
}

// =============================================================================
// Update Tests
// =============================================================================

#[test]
fn test_update_bumps_native_version() {
    let (_store, backend) = setup_remote(10);
    backend.create("ortelius/dev", NewParameter::plain("PORT", "3001")).unwrap();

    let updated = backend
        .update("ortelius/dev", "PORT", ParameterUpdate::value("3002"))
        .unwrap();
    assert_eq!(updated.version, 2);
    assert!(!updated.is_secure);

    let listed = backend.list_namespace("ortelius/dev").unwrap();
    assert_eq!(listed[0].value, "3002");
    assert_eq!(listed[0].version, 2);
}

#[test]
fn test_n_updates_yield_version_one_plus_n() {
    let (_store, backend) = setup_remote(10);
    backend.create("ns", NewParameter::plain("A", "0")).unwrap();

    for i in 1..=5u64 {
        let updated = backend
            .update("ns", "A", ParameterUpdate::value(i.to_string()).with_secure(false))
            .unwrap();
        assert_eq!(updated.version, 1 + i);
    }
}

#[test]
fn test_partial_update_keeps_other_field() {
    let (_store, backend) = setup_remote(10);
    backend.create("ns", NewParameter::secure("KEY", "old")).unwrap();

    let updated = backend.update("ns", "KEY", ParameterUpdate::value("new")).unwrap();
    assert!(updated.is_secure);
    assert_eq!(updated.value, "new");

    let updated = backend
        .update("ns", "KEY", ParameterUpdate::secure_flag(false))
        .unwrap();
    assert!(!updated.is_secure);
    assert_eq!(updated.value, "new");
    assert_eq!(updated.version, 3);
}

#[test]
fn test_partial_update_of_missing_key_fails() {
    let (_store, backend) = setup_remote(10);
    let result = backend.update("ns", "MISSING", ParameterUpdate::value("x"));
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

/// Backend-specific: the remote overwrite-put has no existence precondition,
/// so a complete update of a missing key creates it.
#[test]
fn test_complete_update_of_missing_key_upserts() {
    let (store, backend) = setup_remote(10);

    let upserted = backend
        .update("ns", "NEW", ParameterUpdate::value("v").with_secure(true))
        .unwrap();

    assert_eq!(upserted.version, 1);
    assert!(store.get_parameter("/ns/NEW").unwrap().is_some());
}

#[test]
fn test_update_with_stale_version_conflicts() {
    let (_store, backend) = setup_remote(10);
    backend.create("ns", NewParameter::plain("A", "1")).unwrap();
    backend.update("ns", "A", ParameterUpdate::value("2")).unwrap();

    let result = backend.update(
        "ns",
        "A",
        ParameterUpdate::value("3").with_secure(false).expecting_version(1),
    );
    assert!(matches!(
        result,
        Err(StoreError::VersionConflict { expected: 1, actual: 2, .. })
    ));
}

#[test]
fn test_partial_update_racing_delete_does_not_resurrect() {
    let backend = interfering_backend(Interference::Delete);

    let result = backend.update("ns", "KEY", ParameterUpdate::value("new"));
    assert!(matches!(result, Err(StoreError::NotFound(_))));
    assert!(backend.service().inner.get_parameter("/ns/KEY").unwrap().is_none());
}

#[test]
fn test_partial_update_racing_write_conflicts() {
    let backend = interfering_backend(Interference::Overwrite);

    let result = backend.update("ns", "KEY", ParameterUpdate::secure_flag(false));
    assert!(matches!(
        result,
        Err(StoreError::VersionConflict { expected: 1, actual: 2, .. })
    ));

    let stored = backend.service().inner.get_parameter("/ns/KEY").unwrap().unwrap();
    assert_eq!(stored.value, "concurrent");
    assert_eq!(stored.parameter_type, ParameterType::SecureString);
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_then_list_excludes_entry() {
    let (_store, backend) = setup_remote(10);
    backend.create("ns", NewParameter::plain("A", "1")).unwrap();
    backend.create("ns", NewParameter::plain("B", "2")).unwrap();

    backend.delete("ns", "A").unwrap();

    let all = backend.list().unwrap();
    let names: Vec<_> = all["ns"].iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["B"]);
}

#[test]
fn test_delete_missing_fails_with_not_found() {
    let (_store, backend) = setup_remote(10);
    let result = backend.delete("ns", "MISSING");
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[test]
fn test_recreate_after_delete_restarts_versions() {
    let (_store, backend) = setup_remote(10);
    backend.create("ns", NewParameter::plain("A", "1")).unwrap();
    backend.update("ns", "A", ParameterUpdate::value("2")).unwrap();
    backend.delete("ns", "A").unwrap();

    let recreated = backend.create("ns", NewParameter::plain("A", "3")).unwrap();
    assert_eq!(recreated.version, 1);
}

// =============================================================================
// Listing Tests
// =============================================================================

#[test]
fn test_list_follows_every_page() {
    let service = CountingService {
        inner: PathStore::new(),
        queries: AtomicUsize::new(0),
    };
    let backend = RemoteBackend::with_page_size(service, 3);

    for i in 0..10 {
        backend
            .create("ortelius/dev", NewParameter::plain(format!("KEY_{:02}", i), "v"))
            .unwrap();
    }

    let all = backend.list().unwrap();
    assert_eq!(all["ortelius/dev"].len(), 10);
    // 3 + 3 + 3 + 1
    assert_eq!(backend.service().queries.load(Ordering::SeqCst), 4);
}

#[test]
fn test_list_groups_nested_namespaces() {
    let (_store, backend) = setup_remote(2);
    backend.create("", NewParameter::plain("ROOT", "r")).unwrap();
    backend.create("ortelius/dev", NewParameter::plain("PORT", "3001")).unwrap();
    backend.create("ortelius/prod", NewParameter::plain("PORT", "80")).unwrap();
    backend.create("ortelius", NewParameter::plain("OWNER", "team")).unwrap();

    let all = backend.list().unwrap();

    assert_eq!(all.len(), 4);
    assert_eq!(all[""][0].name, "ROOT");
    assert_eq!(all["ortelius"][0].name, "OWNER");
    assert_eq!(all["ortelius/dev"][0].value, "3001");
    assert_eq!(all["ortelius/prod"][0].value, "80");
}

#[test]
fn test_list_namespace_returns_direct_children_only() {
    let (_store, backend) = setup_remote(2);
    backend.create("ortelius", NewParameter::plain("OWNER", "team")).unwrap();
    backend.create("ortelius/dev", NewParameter::plain("PORT", "3001")).unwrap();

    let listed = backend.list_namespace("ortelius").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "OWNER");
    assert_eq!(listed[0].namespace, "ortelius");
}

#[test]
fn test_ids_are_stable_across_listings() {
    let (_store, backend) = setup_remote(10);
    let created = backend.create("ns", NewParameter::plain("A", "1")).unwrap();

    let first = backend.list_namespace("ns").unwrap();
    let second = backend.list_namespace("ns").unwrap();
    assert_eq!(first[0].id, created.id);
    assert_eq!(second[0].id, created.id);
}

#[test]
fn test_failing_page_fails_whole_list() {
    let service = FlakyService {
        inner: PathStore::new(),
        ok_pages: 1,
        calls: AtomicUsize::new(0),
    };
    let backend = RemoteBackend::with_page_size(service, 2);
    for i in 0..5 {
        backend.create("ns", NewParameter::plain(format!("K{}", i), "v")).unwrap();
    }

    let result = backend.list();
    assert!(matches!(result, Err(StoreError::BackendUnavailable(_))));
}

#[test]
fn test_unreachable_is_not_empty() {
    let service = FlakyService {
        inner: PathStore::new(),
        ok_pages: 0,
        calls: AtomicUsize::new(0),
    };
    let backend = RemoteBackend::new(service);

    assert!(backend.list().unwrap_err().is_unavailable());
}
