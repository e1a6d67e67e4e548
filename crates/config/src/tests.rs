use crate::{ConfigError, EngineConfig, EngineType};

#[test]
fn default_matches_documented_defaults() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.engine_type, EngineType::BTree);
    assert_eq!(cfg.directory, "data_dir");
    assert_eq!(cfg.memtable_threshold, 1000);
    assert_eq!(cfg.btree_min_degree, 3);
    assert!((cfg.bloom_false_positive_rate - 0.01).abs() < f64::EPSILON);
    assert_eq!(cfg.sparse_index_stride, 100);
    assert!(cfg.wal_sync);
    assert!(cfg.lsm_wal);
    assert!(cfg.validate().is_ok());
}

#[test]
fn engine_type_parses_both_tags() {
    assert_eq!("btree".parse::<EngineType>().unwrap(), EngineType::BTree);
    assert_eq!("lsmtree".parse::<EngineType>().unwrap(), EngineType::LsmTree);
    assert_eq!("LSM".parse::<EngineType>().unwrap(), EngineType::LsmTree);
    assert!("bogus".parse::<EngineType>().is_err());
}

#[test]
fn validate_rejects_degenerate_knobs() {
    let mut cfg = EngineConfig::default();
    cfg.btree_min_degree = 1;
    assert!(matches!(cfg.validate(), Err(ConfigError::MinDegreeTooSmall(1))));

    let mut cfg = EngineConfig::default();
    cfg.memtable_threshold = 0;
    assert!(matches!(cfg.validate(), Err(ConfigError::MemtableThresholdZero(0))));

    let mut cfg = EngineConfig::default();
    cfg.bloom_false_positive_rate = 0.0;
    assert!(matches!(cfg.validate(), Err(ConfigError::BloomRateOutOfRange(_))));

    let mut cfg = EngineConfig::default();
    cfg.sparse_index_stride = 0;
    assert!(matches!(cfg.validate(), Err(ConfigError::SparseStrideZero(0))));
}

#[test]
fn round_trips_through_json() {
    let cfg = EngineConfig {
        engine_type: EngineType::LsmTree,
        directory: "/tmp/somewhere".to_string(),
        ..EngineConfig::default()
    };
    let json = serde_json::to_string(&cfg).unwrap();
    let back: EngineConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(cfg, back);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let back: EngineConfig = serde_json::from_str(r#"{"engine_type":"lsmtree"}"#).unwrap();
    assert_eq!(back.engine_type, EngineType::LsmTree);
    assert_eq!(back.directory, "data_dir");
    assert_eq!(back.memtable_threshold, 1000);
}
