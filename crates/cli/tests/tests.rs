#[cfg(test)]
mod db_facade {
    use config::{EngineConfig, EngineType};
    use engine::Db;
    use tempfile::tempdir;

    fn config(engine_type: EngineType) -> EngineConfig {
        EngineConfig {
            engine_type,
            memtable_threshold: 2,
            wal_sync: false,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn btree_db_put_get_delete_round_trip() {
        let dir = tempdir().unwrap();
        let mut db = Db::open(dir.path(), &config(EngineType::BTree)).unwrap();

        db.put(b"a".to_vec(), b"1".to_vec()).unwrap();
        assert_eq!(db.get(b"a").unwrap(), Some(b"1".to_vec()));
        db.delete(b"a".to_vec()).unwrap();
        assert_eq!(db.get(b"a").unwrap(), None);
    }

    #[test]
    fn lsm_db_put_get_delete_round_trip_across_a_flush() {
        let dir = tempdir().unwrap();
        let mut db = Db::open(dir.path(), &config(EngineType::LsmTree)).unwrap();

        db.put(b"a".to_vec(), b"1".to_vec()).unwrap();
        db.put(b"b".to_vec(), b"2".to_vec()).unwrap(); // crosses threshold=2, flushes

        assert_eq!(db.get(b"a").unwrap(), Some(b"1".to_vec()));
        db.delete(b"a".to_vec()).unwrap();
        assert_eq!(db.get(b"a").unwrap(), None);
    }

    #[test]
    fn lsm_db_supports_compact_and_force_flush_through_the_facade() {
        let dir = tempdir().unwrap();
        let mut db = Db::open(dir.path(), &config(EngineType::LsmTree)).unwrap();

        db.put(b"x".to_vec(), b"1".to_vec()).unwrap();
        db.force_flush().unwrap();
        db.put(b"x".to_vec(), b"2".to_vec()).unwrap();
        db.force_flush().unwrap();
        db.compact().unwrap();

        assert_eq!(db.get(b"x").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn btree_db_rejects_maintenance_ops_unsupported_on_that_backend() {
        let dir = tempdir().unwrap();
        let mut db = Db::open(dir.path(), &config(EngineType::BTree)).unwrap();

        assert!(db.force_flush().is_err());
        assert!(db.compact().is_err());
        assert!(db.fuzzy_get(b"a", 1).is_err());
    }

    #[test]
    fn lsm_db_fuzzy_get_finds_near_matches() {
        let dir = tempdir().unwrap();
        let mut db = Db::open(dir.path(), &config(EngineType::LsmTree)).unwrap();

        db.put(b"apple".to_vec(), b"fruit".to_vec()).unwrap();
        let results = db.fuzzy_get(b"appel", 2).unwrap();
        assert_eq!(results, vec![(b"apple".to_vec(), b"fruit".to_vec())]);
    }

    #[test]
    fn stats_reports_something_for_both_backends() {
        let dir_a = tempdir().unwrap();
        let db_a = Db::open(dir_a.path(), &config(EngineType::BTree)).unwrap();
        assert!(!db_a.stats().is_empty());

        let dir_b = tempdir().unwrap();
        let db_b = Db::open(dir_b.path(), &config(EngineType::LsmTree)).unwrap();
        assert!(!db_b.stats().is_empty());
    }
}

#[cfg(test)]
mod config_validation {
    use config::EngineConfig;

    #[test]
    fn default_config_validates() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_memtable_threshold_is_rejected() {
        let config = EngineConfig { memtable_threshold: 0, ..EngineConfig::default() };
        assert!(config.validate().is_err());
    }
}
