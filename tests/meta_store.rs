// ABOUTME: Integration tests for the file-backed cluster metadata store.
// ABOUTME: Uses temporary directories for the clusters root.

mod support;

use clusterops::meta::{FileMetaStore, MetaError, MetaStore};
use clusterops::types::ClusterName;
use std::fs;
use support::cluster_meta;

fn name() -> ClusterName {
    ClusterName::new("prod").unwrap()
}

#[test]
fn save_then_load_returns_same_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileMetaStore::new(dir.path());
    let meta = cluster_meta();

    store.save(&name(), &meta).unwrap();

    assert!(store.exists(&name()));
    assert_eq!(store.load(&name()).unwrap(), meta);
}

#[test]
fn missing_cluster_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileMetaStore::new(dir.path());

    let err = store.load(&name()).unwrap_err();
    assert!(matches!(err, MetaError::NotFound(_)));
    assert_eq!(err.to_string(), "cluster prod does not exist");
}

#[test]
fn overwriting_keeps_a_backup_and_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileMetaStore::new(dir.path());
    let mut meta = cluster_meta();

    store.save(&name(), &meta).unwrap();
    meta.topology.tikv_servers.pop();
    store.save(&name(), &meta).unwrap();

    let cluster_dir = dir.path().join("prod");
    let backups: Vec<_> = fs::read_dir(cluster_dir.join("backup"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(backups.len(), 1);
    assert!(backups[0].starts_with("meta.yaml-"));
    assert!(!cluster_dir.join("meta.yaml.tmp").exists());
    assert_eq!(store.load(&name()).unwrap().topology.tikv_servers.len(), 2);
}

#[test]
fn invalid_topology_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileMetaStore::new(dir.path());
    let path = store.meta_path(&name());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        r#"
user: tidb
version: v4.0.0
topology:
  pd_servers:
    - host: 10.0.1.1
      deploy_dir: /deploy/pd-2379
      data_dir: /data/pd-2379
  tikv_servers:
    - host: 10.0.1.1
      port: 2379
      deploy_dir: /deploy/tikv
      data_dir: /data/tikv
"#,
    )
    .unwrap();

    let err = store.load(&name()).unwrap_err();
    assert!(matches!(err, MetaError::InvalidTopology(_)));
}

#[test]
fn malformed_yaml_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileMetaStore::new(dir.path());
    let path = store.meta_path(&name());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "user: [unterminated\n").unwrap();

    let err = store.load(&name()).unwrap_err();
    assert!(matches!(err, MetaError::Parse { .. }));
    assert!(err.to_string().contains("meta.yaml"));
}

#[test]
fn ssh_keys_live_under_the_cluster_directory() {
    let store = FileMetaStore::new("/home/ops/.clusterops/clusters");
    let (private, public) = store.ssh_key_paths(&name());
    assert_eq!(
        private.to_str().unwrap(),
        "/home/ops/.clusterops/clusters/prod/ssh/id_rsa"
    );
    assert_eq!(
        public.to_str().unwrap(),
        "/home/ops/.clusterops/clusters/prod/ssh/id_rsa.pub"
    );
}
