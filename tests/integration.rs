//! Cuckoo哈希引擎集成测试

use cuckoo_engine::{
    default_engine, ControlState, CuckooEngine, CuckooError, EngineConfig, EngineDriver,
    HashAlgorithm, KeyWord, LookupResponse, OriginKind, PortInputs, SharedDriver, SlotTable,
    SlotWrite, Table, TableCommand, DEFAULT_MAX_TICKS,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::thread;
use test_log::test;

const SEED: u64 = 42;

/// 生成互不相同的随机键
fn generate_keys(count: usize, key_width: u32) -> Vec<KeyWord> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mask = if key_width >= 64 { u64::MAX } else { (1u64 << key_width) - 1 };
    let mut seen = BTreeSet::new();
    let mut keys = Vec::with_capacity(count);
    while keys.len() < count {
        let key = rng.gen::<u64>() & mask;
        if seen.insert(key) {
            keys.push(key);
        }
    }
    keys
}

/// 创建测试用引擎
fn create_test_driver(table_size: usize, table_cnt: usize) -> EngineDriver {
    let config = EngineConfig::new(table_size, table_cnt)
        .with_widths(32, 32)
        .with_hash_algorithm(HashAlgorithm::XxHash);
    EngineDriver::new(CuckooEngine::new(config).unwrap())
}

/// 每个子表只有一个槽位, 所有键都落在槽位0
fn single_slot_engine(table_cnt: usize) -> CuckooEngine {
    let config = EngineConfig::new(table_cnt, table_cnt).with_max_lookup_overlap(4);
    let tables = (0..table_cnt)
        .map(|_| Box::new(SlotTable::new(1, Arc::new(|key: KeyWord| key), 4)) as Box<dyn Table>)
        .collect();
    CuckooEngine::with_tables(config, tables).unwrap()
}

fn lookup(driver: &mut EngineDriver, key: KeyWord) -> LookupResponse {
    driver.lookup(key, DEFAULT_MAX_TICKS).unwrap()
}

#[test]
fn test_insert_then_lookup_round_trip() {
    let mut driver = create_test_driver(256, 4);
    let keys = generate_keys(100, 32);

    for (i, key) in keys.iter().enumerate() {
        driver.insert(*key, i as u64 * 3, DEFAULT_MAX_TICKS).unwrap();
    }
    for (i, key) in keys.iter().enumerate() {
        let res = lookup(&mut driver, *key);
        assert!(res.found, "键 {:#x} 丢失 (第 {} 个)", key, i);
        assert_eq!(res.data, Some(i as u64 * 3));
    }
    assert_eq!(driver.engine().entries().len(), keys.len());
}

#[test]
fn test_delete_effect() {
    let mut driver = create_test_driver(64, 2);
    driver.insert(0x1234, 99, DEFAULT_MAX_TICKS).unwrap();
    assert!(lookup(&mut driver, 0x1234).found);

    driver.delete(0x1234, DEFAULT_MAX_TICKS).unwrap();
    let res = lookup(&mut driver, 0x1234);
    assert!(!res.found);
    assert_eq!(res.data, None);
    assert_eq!(driver.engine().stats().delete_hit, 1);
}

#[test]
fn test_delete_absent_key_is_noop() {
    let mut driver = create_test_driver(64, 2);
    let keys = generate_keys(10, 32);
    for key in &keys {
        driver.insert(*key, *key ^ 0xFF, DEFAULT_MAX_TICKS).unwrap();
    }
    let before = driver.engine().entries();

    driver.delete(0xDEAD_BEEF, DEFAULT_MAX_TICKS).unwrap();
    assert_eq!(driver.engine().entries(), before);
    for key in &keys {
        assert_eq!(lookup(&mut driver, *key).data, Some(*key ^ 0xFF));
    }
}

#[test]
fn test_delete_absent_key_in_saturated_tables() {
    // 所有候选槽位都被占用时, 未命中的删除也不能使其他条目失效
    let mut driver = EngineDriver::new(single_slot_engine(2));
    driver.insert(0xA, 1, DEFAULT_MAX_TICKS).unwrap();
    driver.insert(0xB, 2, DEFAULT_MAX_TICKS).unwrap();
    driver.delete(0xC, DEFAULT_MAX_TICKS).unwrap();
    assert!(lookup(&mut driver, 0xA).found);
    assert!(lookup(&mut driver, 0xB).found);
}

#[test]
fn test_clean_removes_everything() {
    let mut driver = create_test_driver(128, 4);
    let keys = generate_keys(40, 32);
    for key in &keys {
        driver.insert(*key, 1, DEFAULT_MAX_TICKS).unwrap();
    }

    driver.clean(DEFAULT_MAX_TICKS).unwrap();
    assert!(driver.engine().entries().is_empty());
    for key in &keys {
        assert!(!lookup(&mut driver, *key).found);
    }
}

#[test]
fn test_clean_takes_one_tick_per_slot_row() {
    let config = EngineConfig::new(32, 4).with_hash_algorithm(HashAlgorithm::XxHash);
    let mut engine = CuckooEngine::new(config).unwrap();
    let out = engine
        .tick(&PortInputs {
            clean: true,
            ..PortInputs::default()
        })
        .unwrap();
    assert!(out.clean_accepted);

    let mut cleaning_ticks = 0;
    while engine.state() == ControlState::Cleaning {
        engine.tick(&PortInputs::default()).unwrap();
        cleaning_ticks += 1;
    }
    assert_eq!(cleaning_ticks, 8);
    assert!(engine.state().is_idle());
}

#[test]
fn test_exclusive_never_admitted_with_lookups_outstanding() {
    let config = EngineConfig::new(64, 4)
        .with_widths(8, 8)
        .with_max_lookup_overlap(6)
        .with_hash_algorithm(HashAlgorithm::XxHash);
    let mut engine = CuckooEngine::new(config).unwrap();
    let mut rng = StdRng::seed_from_u64(SEED);

    for _ in 0..5_000 {
        let inputs = PortInputs {
            clean: rng.gen_bool(0.01),
            delete: rng.gen_bool(0.05).then(|| rng.gen_range(0..24)),
            insert: rng.gen_bool(0.1).then(|| (rng.gen_range(0..24), rng.gen())),
            lookup: rng.gen_bool(0.6).then(|| rng.gen_range(0..24)),
            lookup_res_ready: rng.gen_bool(0.7),
        };
        let in_flight = engine.lookups_in_flight();
        let stash_is_lookup = engine.stash().origin == OriginKind::Lookup;
        let out = engine.tick(&inputs).unwrap();

        if in_flight > 0 || stash_is_lookup {
            assert!(!out.insert_accepted && !out.delete_accepted && !out.clean_accepted);
        }
        assert!(engine.lookups_in_flight() < 6);
        assert!(engine.target().is_at_most_one());
    }
    assert!(engine.stats().stall_ticks > 0);
}

#[test]
fn test_lookup_pipelining_limit() {
    let config = EngineConfig::new(32, 2)
        .with_max_lookup_overlap(4)
        .with_hash_algorithm(HashAlgorithm::XxHash);
    let mut driver = EngineDriver::new(CuckooEngine::new(config).unwrap());
    driver.insert(1, 10, DEFAULT_MAX_TICKS).unwrap();

    driver.set_lookup_res_ready(false);
    let submitter = driver.submitter();
    for key in 1..=5 {
        submitter.push_lookup(key);
    }
    let mut accepted = 0;
    for _ in 0..20 {
        if driver.step().unwrap().lookup_accepted {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 3);
    assert_eq!(driver.engine().lookups_in_flight(), 3);

    driver.set_lookup_res_ready(true);
    driver.run_until_quiescent(DEFAULT_MAX_TICKS).unwrap();
    let responses = driver.take_responses();
    let order: Vec<KeyWord> = responses.iter().map(|r| r.key).collect();
    assert_eq!(order, vec![1, 2, 3, 4, 5]);
    assert_eq!(responses[0].data, Some(10));
    assert!(responses[1..].iter().all(|r| !r.found));
}

#[test]
fn test_back_to_back_lookups_one_per_tick() {
    let mut driver = create_test_driver(64, 2);
    let submitter = driver.submitter();
    for key in 0..6 {
        submitter.push_lookup(key);
    }
    let ticks = driver.run_until_quiescent(DEFAULT_MAX_TICKS).unwrap();
    // 接收, 探测, 结果各占一个周期, 之后每个周期完成一个
    assert_eq!(ticks, 6 + 2);
    assert_eq!(driver.take_responses().len(), 6);
}

#[test]
fn test_command_priority() {
    let mut engine = single_slot_engine(2);
    let inputs = PortInputs {
        clean: true,
        delete: Some(1),
        insert: Some((2, 2)),
        lookup: Some(3),
        lookup_res_ready: true,
    };
    let out = engine.tick(&inputs).unwrap();
    assert!(out.clean_accepted);
    assert!(!out.delete_accepted && !out.insert_accepted && !out.lookup_accepted);
    assert_eq!(engine.state(), ControlState::Cleaning);
}

#[test]
fn test_two_single_slot_tables_scenario() {
    let mut driver = EngineDriver::new(single_slot_engine(2));

    driver.insert(0xA, 0x1, DEFAULT_MAX_TICKS).unwrap();
    assert_eq!(driver.engine().entries(), vec![(0, 0, 0xA, 0x1)]);
    assert!(driver.engine().insert_final());

    // 子表0被A占用, 子表1为空
    driver.insert(0xB, 0x2, DEFAULT_MAX_TICKS).unwrap();
    assert_eq!(driver.engine().entries(), vec![(0, 0, 0xA, 0x1), (1, 0, 0xB, 0x2)]);
    assert_eq!(driver.engine().target().index(), Some(1));
    assert!(driver.engine().insert_final());

    assert_eq!(lookup(&mut driver, 0xA).data, Some(0x1));
    assert_eq!(lookup(&mut driver, 0xB).data, Some(0x2));
    assert!(!lookup(&mut driver, 0xC).found);
}

#[test]
fn test_saturated_insert_keeps_evicting() {
    let mut driver = EngineDriver::new(single_slot_engine(2));
    driver.insert(0xA, 0x1, DEFAULT_MAX_TICKS).unwrap();
    driver.insert(0xB, 0x2, DEFAULT_MAX_TICKS).unwrap();
    let mut engine = driver.into_engine();

    let out = engine
        .tick(&PortInputs {
            insert: Some((0xC, 0x3)),
            ..PortInputs::default()
        })
        .unwrap();
    assert!(out.insert_accepted);

    // 第一轮: 两个候选槽位都被其他键占用
    while engine.state() != ControlState::LookupResAck {
        engine.tick(&PortInputs::default()).unwrap();
    }
    assert!(!engine.insert_final());
    engine.tick(&PortInputs::default()).unwrap();
    assert_eq!(engine.state(), ControlState::Lookup);
    assert_eq!(engine.eviction_rounds(), 1);
    assert_eq!((engine.stash().key, engine.stash().data), (0xA, 0x1));

    // 三个键争两个槽位, 踢出链永远不会结束
    for _ in 0..300 {
        engine.tick(&PortInputs::default()).unwrap();
        assert!(!engine.state().is_idle());

        let mut keys: Vec<KeyWord> = engine.entries().iter().map(|e| e.2).collect();
        keys.push(engine.stash().key);
        keys.sort_unstable();
        assert_eq!(keys, vec![0xA, 0xB, 0xC]);
    }
    assert!(engine.eviction_rounds() >= 100);
    assert_eq!(engine.stats().max_eviction_chain, engine.eviction_rounds());
}

/// 键7同时存在于两个单槽位子表
fn duplicated_driver() -> EngineDriver {
    let config = EngineConfig::new(2, 2);
    let tables = (0..2)
        .map(|_| {
            let mut table = SlotTable::new(1, Arc::new(|key: KeyWord| key), 4);
            table.commit(TableCommand {
                write: Some(SlotWrite {
                    index: 0,
                    key: 7,
                    data: 0,
                    item_valid: true,
                }),
                ..Default::default()
            });
            Box::new(table) as Box<dyn Table>
        })
        .collect();
    EngineDriver::new(CuckooEngine::with_tables(config, tables).unwrap())
}

#[test]
fn test_duplicate_key_precondition_is_reported() {
    let mut driver = duplicated_driver();

    let err = driver.insert(7, 1, DEFAULT_MAX_TICKS).unwrap_err();
    assert_eq!(
        err,
        CuckooError::DuplicateKey {
            key: 7,
            tables: vec![0, 1]
        }
    );
    assert!(driver.is_quiescent());
    assert_eq!(driver.engine().stats().fault_count, 1);
}

#[test]
fn test_clean_recovers_after_duplicate_key() {
    let mut driver = duplicated_driver();
    let err = driver.lookup(7, DEFAULT_MAX_TICKS).unwrap_err();
    assert!(matches!(err, CuckooError::DuplicateKey { key: 7, .. }));
    assert_eq!(driver.engine().lookups_in_flight(), 0);
    assert!(driver.take_responses().is_empty());

    driver.clean(DEFAULT_MAX_TICKS).unwrap();
    assert!(driver.engine().entries().is_empty());
    assert!(!lookup(&mut driver, 7).found);

    driver.insert(7, 3, DEFAULT_MAX_TICKS).unwrap();
    assert_eq!(lookup(&mut driver, 7).data, Some(3));
}

#[test]
fn test_matches_hashmap_model() {
    let mut driver = create_test_driver(64, 4);
    let mut model: HashMap<KeyWord, u64> = HashMap::new();
    let mut rng = StdRng::seed_from_u64(SEED);

    for step in 0..2_000 {
        let key = rng.gen_range(0..32u64);
        match rng.gen_range(0..100) {
            0..=39 => {
                let data = rng.gen::<u32>() as u64;
                driver.insert(key, data, DEFAULT_MAX_TICKS).unwrap();
                model.insert(key, data);
            }
            40..=59 => {
                driver.delete(key, DEFAULT_MAX_TICKS).unwrap();
                model.remove(&key);
            }
            60..=98 => {
                let res = lookup(&mut driver, key);
                assert_eq!(res.data, model.get(&key).copied(), "step {} key {}", step, key);
            }
            _ => {
                driver.clean(DEFAULT_MAX_TICKS).unwrap();
                model.clear();
            }
        }
    }
    assert_eq!(driver.engine().entries().len(), model.len());
}

#[test]
fn test_key_only_configuration() {
    let config = EngineConfig::new(16, 2)
        .with_widths(12, 0)
        .with_hash_algorithm(HashAlgorithm::XxHash);
    let mut driver = EngineDriver::new(CuckooEngine::new(config).unwrap());
    driver.insert(0x1ABC, 0xFFFF, DEFAULT_MAX_TICKS).unwrap();

    // 键被截断到12位, 数据位宽为0
    let res = lookup(&mut driver, 0xABC);
    assert!(res.found);
    assert_eq!(res.data, Some(0));
}

#[test]
fn test_shared_driver_across_threads() {
    let mut driver = create_test_driver(128, 4);
    let keys = generate_keys(32, 32);
    for key in &keys {
        driver.insert(*key, *key & 0xFFFF, DEFAULT_MAX_TICKS).unwrap();
    }
    let shared = SharedDriver::new(driver);

    let producers: Vec<_> = keys
        .chunks(8)
        .map(|chunk| {
            let submitter = shared.submitter();
            let chunk = chunk.to_vec();
            thread::spawn(move || {
                for key in chunk {
                    submitter.push_lookup(key);
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    shared.run_until_quiescent(DEFAULT_MAX_TICKS).unwrap();
    let responses = shared.take_responses();
    assert_eq!(responses.len(), keys.len());
    for res in responses {
        assert!(res.found);
        assert_eq!(res.data, Some(res.key & 0xFFFF));
    }
    assert_eq!(shared.with_engine(|e| e.stats().lookup_found), keys.len() as u64);
}

#[test]
fn test_default_engine() {
    let engine = default_engine();
    assert_eq!(engine.config().table_size, 32);
    assert_eq!(engine.config().table_cnt, 2);
    assert!(engine.is_quiescent());

    let mut driver = EngineDriver::new(engine);
    driver.insert(0x7F, 0x1234_5678, DEFAULT_MAX_TICKS).unwrap();
    assert_eq!(lookup(&mut driver, 0x7F).data, Some(0x1234_5678));
    let text = driver.engine().stats_recorder().export_prometheus();
    assert!(text.contains("cuckoo_engine_insert_count 1"));
    assert!(text.contains("cuckoo_engine_lookup_found 1"));
}
